//! In-memory [`WeatherProvider`] for unit tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::{
    error::ProviderError,
    location::{GeoPosition, LocationMatch},
    model::{CurrentConditions, HourlySample},
    normalize::RawDailyEntry,
    provider::WeatherProvider,
};

#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    locations: HashMap<String, Vec<LocationMatch>>,
    current: HashMap<String, CurrentConditions>,
    hourly: HashMap<String, Vec<HourlySample>>,
    daily: HashMap<String, Vec<RawDailyEntry>>,
    failing_keys: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

pub(crate) fn daily_entry(day: u32, min: f64, max: f64) -> RawDailyEntry {
    serde_json::from_value(serde_json::json!({
        "Date": format!("2024-05-{:02}T07:00:00+03:00", day),
        "Temperature": { "Minimum": { "Value": min }, "Maximum": { "Value": max } },
        "Day": {
            "IconPhrase": "Partly sunny",
            "PrecipitationProbability": 25,
            "Wind": { "Speed": { "Value": 11.0 } }
        },
        "Night": { "IconPhrase": "Clear" }
    }))
    .expect("valid daily entry")
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a city with current conditions, a 12 hour forecast whose
    /// first hour carries `precip`, and five days of daily forecast.
    pub(crate) fn with_city(mut self, name: &str, key: &str, temp: f64, wind: f64, precip: u8) -> Self {
        self.locations.insert(
            name.to_string(),
            vec![LocationMatch {
                key: key.to_string(),
                geo_position: Some(GeoPosition { latitude: 50.0, longitude: 10.0 }),
            }],
        );
        self.current
            .insert(key.to_string(), CurrentConditions { temperature_c: temp, wind_speed_kmh: wind });

        let mut hours = vec![HourlySample { precipitation_probability_pct: precip }];
        hours.extend((1..12).map(|_| HourlySample { precipitation_probability_pct: 99 }));
        self.hourly.insert(key.to_string(), hours);

        let days = (1..=5).map(|d| daily_entry(d, temp - 5.0, temp + f64::from(d))).collect();
        self.daily.insert(key.to_string(), days);
        self
    }

    /// A city whose first search match has no coordinates.
    pub(crate) fn with_unlocated_city(mut self, name: &str) -> Self {
        self.locations.insert(
            name.to_string(),
            vec![
                LocationMatch { key: "0".into(), geo_position: None },
                LocationMatch { key: "1".into(), geo_position: Some(GeoPosition { latitude: 1.0, longitude: 1.0 }) },
            ],
        );
        self
    }

    pub(crate) fn with_daily(mut self, key: &str, entries: Vec<RawDailyEntry>) -> Self {
        self.daily.insert(key.to_string(), entries);
        self
    }

    pub(crate) fn with_hourly(mut self, key: &str, hours: Vec<HourlySample>) -> Self {
        self.hourly.insert(key.to_string(), hours);
        self
    }

    /// Forecast calls for `key` answer 503.
    pub(crate) fn failing(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn check(&self, key: &str) -> Result<(), ProviderError> {
        if self.failing_keys.contains(key) {
            Err(ProviderError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, ProviderError> {
        self.record(format!("search:{query}"));
        Ok(self.locations.get(query).cloned().unwrap_or_default())
    }

    async fn current_conditions(&self, location_key: &str) -> Result<CurrentConditions, ProviderError> {
        self.record(format!("current:{location_key}"));
        self.check(location_key)?;
        self.current.get(location_key).copied().ok_or(ProviderError::Empty("current conditions"))
    }

    async fn hourly_forecast(&self, location_key: &str) -> Result<Vec<HourlySample>, ProviderError> {
        self.record(format!("hourly:{location_key}"));
        self.check(location_key)?;
        Ok(self.hourly.get(location_key).cloned().unwrap_or_default())
    }

    async fn daily_forecast(
        &self,
        location_key: &str,
        days: u32,
    ) -> Result<Vec<RawDailyEntry>, ProviderError> {
        self.record(format!("daily:{location_key}:{days}"));
        self.check(location_key)?;
        let entries = self.daily.get(location_key).cloned().unwrap_or_default();
        Ok(entries.into_iter().take(days as usize).collect())
    }
}
