//! Categorical weather advisories for a single point-in-time reading.
//!
//! Classification runs in two stages: the temperature picks a
//! [`TemperatureBand`], then wind and precipitation pick an [`Exposure`] leaf
//! inside that band. All thresholds are strict `>` comparisons.

use std::fmt;

use serde::Serialize;

const VERY_HOT_ABOVE_C: f64 = 35.0;
const WARM_ABOVE_C: f64 = 25.0;
const COOL_ABOVE_C: f64 = 15.0;
const COLD_ABOVE_C: f64 = 0.0;
const STRONG_WIND_ABOVE_KMH: f64 = 20.0;
const HIGH_PRECIP_ABOVE_PCT: u8 = 70;

/// Advisory text for one reading. Always one of [`Advisory::all`] or
/// [`Advisory::UNASSESSED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Advisory(&'static str);

impl Advisory {
    /// Returned when the inputs cannot be classified.
    pub const UNASSESSED: Advisory = Advisory("Could not assess weather conditions.");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Every advisory `classify` can produce for valid input, band by band.
    pub fn all() -> impl Iterator<Item = Advisory> {
        ADVISORIES.iter().flatten().map(|text| Advisory(*text))
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    VeryHot,
    Warm,
    Cool,
    Cold,
    Frosty,
}

impl TemperatureBand {
    pub fn from_celsius(temperature_c: f64) -> Self {
        if temperature_c > VERY_HOT_ABOVE_C {
            TemperatureBand::VeryHot
        } else if temperature_c > WARM_ABOVE_C {
            TemperatureBand::Warm
        } else if temperature_c > COOL_ABOVE_C {
            TemperatureBand::Cool
        } else if temperature_c > COLD_ABOVE_C {
            TemperatureBand::Cold
        } else {
            TemperatureBand::Frosty
        }
    }

    fn row(self) -> usize {
        self as usize
    }
}

/// Wind/precipitation leaf within a temperature band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    StrongWindAndPrecip,
    StrongWind,
    Precip,
    Calm,
}

impl Exposure {
    pub fn from_readings(wind_kmh: f64, precip_prob_pct: u8) -> Self {
        let high_precip = precip_prob_pct > HIGH_PRECIP_ABOVE_PCT;

        if wind_kmh > STRONG_WIND_ABOVE_KMH {
            if high_precip { Exposure::StrongWindAndPrecip } else { Exposure::StrongWind }
        } else if high_precip {
            Exposure::Precip
        } else {
            Exposure::Calm
        }
    }

    fn column(self) -> usize {
        self as usize
    }
}

/// Rows follow [`TemperatureBand`], columns follow [`Exposure`].
static ADVISORIES: [[&str; 4]; 5] = [
    [
        "Very hot weather with strong wind and a high chance of precipitation. Avoid staying outdoors for long.",
        "Very hot weather with strong wind. Carry water and avoid direct sunlight.",
        "Very hot weather with a high chance of precipitation. Avoid staying outdoors for long.",
        "Very hot and dry weather. Drink plenty of water and avoid physical exertion at midday.",
    ],
    [
        "Warm weather with strong wind and precipitation. Take an umbrella and a windbreaker.",
        "Warm weather with strong wind. Take a windbreaker.",
        "Warm weather with precipitation. Take an umbrella.",
        "Warm weather without strong wind or a high chance of precipitation. Good for a walk.",
    ],
    [
        "Cool, windy and wet. Bring rain protection.",
        "Cool and windy. Keep the wind in mind when planning.",
        "Cool with precipitation. Take an umbrella.",
        "Cool and calm weather. Good for a walk.",
    ],
    [
        "Cold, windy and wet. Warm clothes and an umbrella are needed.",
        "Cold and windy. Warm clothes are needed.",
        "Cold with precipitation. Warm clothes and an umbrella are a must.",
        "Cold and dry. Warm clothes are needed.",
    ],
    [
        "Frosty with strong wind and precipitation. Very warm clothes are essential.",
        "Frosty and windy. Very warm clothes are essential.",
        "Frosty with precipitation. Warm clothes are a must.",
        "Frosty and dry. Warm clothes are a must.",
    ],
];

/// Classify a reading into an advisory. Never fails: a reading that cannot be
/// compared (NaN) yields [`Advisory::UNASSESSED`].
pub fn classify(temperature_c: f64, wind_kmh: f64, precip_prob_pct: u8) -> Advisory {
    if temperature_c.is_nan() || wind_kmh.is_nan() {
        tracing::error!(temperature_c, wind_kmh, precip_prob_pct, "Cannot classify weather reading");
        return Advisory::UNASSESSED;
    }

    let band = TemperatureBand::from_celsius(temperature_c);
    let exposure = Exposure::from_readings(wind_kmh, precip_prob_pct);

    Advisory(ADVISORIES[band.row()][exposure.column()])
}
