//! Reshapes provider daily forecast entries into [`DailyRecord`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::{error::MalformedRecord, model::DailyRecord};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One `DailyForecasts[]` entry as sent by the provider. Every field is
/// optional here so that presence is checked in [`normalize`], not by serde.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDailyEntry {
    pub date: Option<String>,
    pub temperature: Option<RawTemperatureRange>,
    pub day: Option<RawHalfDay>,
    pub night: Option<RawHalfDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTemperatureRange {
    pub minimum: Option<RawValue>,
    pub maximum: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawValue {
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawWind {
    pub speed: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawHalfDay {
    pub icon_phrase: Option<String>,
    pub wind: Option<RawWind>,
    pub precipitation_probability: Option<u8>,
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedRecord> {
    value.ok_or(MalformedRecord { field })
}

/// Reformat an ISO 8601 date as `YYYY-MM-DD HH:MM` in its own wall-clock
/// time, or hand the input back unchanged if it does not parse.
pub fn format_forecast_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(DATE_FORMAT).to_string();
        }
    }

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

pub fn normalize(entry: &RawDailyEntry) -> Result<DailyRecord, MalformedRecord> {
    let date = format_forecast_date(entry.date.as_deref().unwrap_or_default());

    let temperature = require(entry.temperature.as_ref(), "Temperature")?;
    let min_temp_c = require(
        temperature.minimum.as_ref().and_then(|v| v.value),
        "Temperature.Minimum.Value",
    )?;
    let max_temp_c = require(
        temperature.maximum.as_ref().and_then(|v| v.value),
        "Temperature.Maximum.Value",
    )?;

    let day = require(entry.day.as_ref(), "Day")?;
    let wind_speed_kmh = require(
        day.wind.as_ref().and_then(|w| w.speed.as_ref()).and_then(|s| s.value),
        "Day.Wind.Speed.Value",
    )?;
    let precip_prob_pct = require(day.precipitation_probability, "Day.PrecipitationProbability")?;
    let day_condition = require(day.icon_phrase.clone(), "Day.IconPhrase")?;

    let night = require(entry.night.as_ref(), "Night")?;
    let night_condition = require(night.icon_phrase.clone(), "Night.IconPhrase")?;

    Ok(DailyRecord {
        date,
        min_temp_c,
        max_temp_c,
        wind_speed_kmh,
        precip_prob_pct,
        day_condition,
        night_condition,
    })
}

/// Normalize entries in order. On failure returns the index of the first
/// malformed entry alongside the error.
pub fn normalize_all(entries: &[RawDailyEntry]) -> Result<Vec<DailyRecord>, (usize, MalformedRecord)> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| normalize(entry).map_err(|e| (i, e)))
        .collect()
}
