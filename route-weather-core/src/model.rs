use serde::{Deserialize, Serialize};

use crate::{advisory::Advisory, error::RouteError};

/// A geocoded route point as returned by the location resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub name: String,
    pub location_key: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HourlySample {
    pub precipitation_probability_pct: u8,
}

/// One normalized day of forecast for a route point.
///
/// `min_temp_c <= max_temp_c` is not checked: provider anomalies pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub wind_speed_kmh: f64,
    pub precip_prob_pct: u8,
    pub day_condition: String,
    pub night_condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePointResult {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Empty in single-day mode.
    pub records: Vec<DailyRecord>,
}

/// Full per-point forecast data for one route submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAggregate {
    pub points: Vec<RoutePointResult>,
    pub requested_days: u32,
    pub is_multi_day: bool,
}

impl RouteAggregate {
    /// Same as `is_multi_day`, under the flag name web sessions store.
    pub fn is_new_forecast(&self) -> bool {
        self.is_multi_day
    }

    pub fn has_records(&self) -> bool {
        self.points.iter().any(|p| !p.records.is_empty())
    }
}

/// Instantaneous reading and advisory for one point in single-day mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointReading {
    pub city: String,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub precip_prob_pct: u8,
    pub advisory: Advisory,
}

/// Result of a successful route submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub aggregate: RouteAggregate,
    /// One entry per point in single-day mode, empty in multi-day mode.
    pub readings: Vec<PointReading>,
}

/// A validated route submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    pub stops: Vec<String>,
    pub days: u32,
}

impl RouteRequest {
    /// Trims every name, drops blank stops and coerces `days` to at least 1.
    pub fn new(
        start: impl AsRef<str>,
        end: impl AsRef<str>,
        stops: impl IntoIterator<Item = impl AsRef<str>>,
        days: i64,
    ) -> Result<Self, RouteError> {
        let start = start.as_ref().trim();
        let end = end.as_ref().trim();

        if start.is_empty() || end.is_empty() {
            return Err(RouteError::Validation(
                "Please fill in both the start and end points.".to_string(),
            ));
        }

        let stops = stops
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let days = u32::try_from(days.max(1)).unwrap_or(u32::MAX);

        Ok(Self { start: start.to_string(), end: end.to_string(), stops, days })
    }

    /// Builds a request from raw form-style input: stops are a single
    /// whitespace-separated line and `days` is optional text.
    pub fn from_form(
        start: &str,
        end: &str,
        stops_line: &str,
        days: Option<&str>,
    ) -> Result<Self, RouteError> {
        let days = Self::parse_days(days)?;
        Self::new(start, end, stops_line.split_whitespace(), days)
    }

    /// Day count from optional text: absent or blank means 1.
    pub fn parse_days(days: Option<&str>) -> Result<i64, RouteError> {
        match days.map(str::trim).filter(|d| !d.is_empty()) {
            None => Ok(1),
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                RouteError::Validation(format!("Number of days must be a whole number, got '{raw}'."))
            }),
        }
    }

    /// Route order: start, stops in input order, end.
    pub fn points(&self) -> Vec<&str> {
        std::iter::once(self.start.as_str())
            .chain(self.stops.iter().map(String::as_str))
            .chain(std::iter::once(self.end.as_str()))
            .collect()
    }

    /// Any intermediate stop forces the multi-day view, whatever `days` says.
    pub fn is_multi_day(&self) -> bool {
        self.days > 1 || !self.stops.is_empty()
    }
}
