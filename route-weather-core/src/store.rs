//! Session-scoped storage of the last route aggregate and the time-series
//! queries the chart view runs against it.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::model::{DailyRecord, RouteAggregate};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Forecast field plotted by the chart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    MaxTemp,
    MinTemp,
    WindSpeed,
    PrecipProb,
}

impl Parameter {
    pub const fn all() -> &'static [Parameter] {
        &[Parameter::MaxTemp, Parameter::MinTemp, Parameter::WindSpeed, Parameter::PrecipProb]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::MaxTemp => "maxTemp",
            Parameter::MinTemp => "minTemp",
            Parameter::WindSpeed => "windSpeed",
            Parameter::PrecipProb => "precipProb",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::MaxTemp => "Max. temperature",
            Parameter::MinTemp => "Min. temperature",
            Parameter::WindSpeed => "Wind speed",
            Parameter::PrecipProb => "Precipitation probability",
        }
    }

    pub fn read(&self, record: &DailyRecord) -> f64 {
        match self {
            Parameter::MaxTemp => record.max_temp_c,
            Parameter::MinTemp => record.min_temp_c,
            Parameter::WindSpeed => record.wind_speed_kmh,
            Parameter::PrecipProb => f64::from(record.precip_prob_pct),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown parameter '{0}'. Supported parameters: maxTemp, minTemp, windSpeed, precipProb.")]
pub struct UnknownParameter(pub String);

impl FromStr for Parameter {
    type Err = UnknownParameter;

    /// Accepts `maxTemp`, `max_temp`, `MAX-TEMP` and similar spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded: String = value
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "maxtemp" => Ok(Parameter::MaxTemp),
            "mintemp" => Ok(Parameter::MinTemp),
            "windspeed" => Ok(Parameter::WindSpeed),
            "precipprob" => Ok(Parameter::PrecipProb),
            _ => Err(UnknownParameter(value.to_string())),
        }
    }
}

/// `(date, value)` series for one route point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub city: String,
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    /// Nothing stored for the session, or an aggregate without points.
    Empty,
    /// An aggregate is stored but no point carries daily records.
    NoData,
    Series(Vec<PointSeries>),
}

/// Build the chart series for `parameter`. Points without records are left out.
pub fn chart(aggregate: &RouteAggregate, parameter: Parameter) -> ChartData {
    if aggregate.points.is_empty() {
        return ChartData::Empty;
    }
    if !aggregate.has_records() {
        return ChartData::NoData;
    }

    let series = aggregate
        .points
        .iter()
        .filter(|p| !p.records.is_empty())
        .map(|p| PointSeries {
            city: p.city.clone(),
            points: p.records.iter().map(|r| (r.date.clone(), parameter.read(r))).collect(),
        })
        .collect();

    ChartData::Series(series)
}

#[derive(Debug)]
struct SessionEntry {
    aggregate: Option<Arc<RouteAggregate>>,
    /// Refreshed by writes and reads alike, so readers hold only the read lock.
    touched_at: Mutex<Instant>,
}

impl SessionEntry {
    fn new() -> Self {
        Self { aggregate: None, touched_at: Mutex::new(Instant::now()) }
    }

    fn touch(&self) {
        *self.touched_at.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.touched_at.lock().elapsed()
    }
}

/// Holds at most one aggregate per session. Writers swap a whole `Arc`, so a
/// concurrent reader sees either the previous aggregate or the new one.
#[derive(Debug, Default)]
pub struct AggregateStore {
    sessions: RwLock<HashMap<SessionKey, SessionEntry>>,
    next_id: AtomicU64,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty session and return its key.
    pub fn open_session(&self) -> SessionKey {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let key = SessionKey(format!("session-{id}"));
        self.sessions.write().insert(key.clone(), SessionEntry::new());
        key
    }

    /// Replace the session's aggregate. Unknown keys get a session created on
    /// first use.
    pub fn put(&self, key: &SessionKey, aggregate: RouteAggregate) {
        tracing::info!(
            session = %key,
            points = aggregate.points.len(),
            multi_day = aggregate.is_multi_day,
            "Storing route aggregate"
        );

        let aggregate = Arc::new(aggregate);
        let mut sessions = self.sessions.write();
        let entry = sessions.entry(key.clone()).or_insert_with(SessionEntry::new);
        entry.aggregate = Some(aggregate);
        entry.touch();
    }

    /// The session's aggregate, if any. Counts as activity for `expire_idle`.
    pub fn get(&self, key: &SessionKey) -> Option<Arc<RouteAggregate>> {
        let sessions = self.sessions.read();
        let entry = sessions.get(key)?;
        entry.touch();
        entry.aggregate.clone()
    }

    /// Stored aggregate as JSON text, the session's persisted layout.
    pub fn snapshot(&self, key: &SessionKey) -> Option<String> {
        let aggregate = self.get(key)?;
        match serde_json::to_string(aggregate.as_ref()) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!(session = %key, error = %e, "Failed to serialize aggregate");
                None
            }
        }
    }

    /// Chart series for the session's aggregate. Never fails.
    pub fn query(&self, key: &SessionKey, parameter: Parameter) -> ChartData {
        match self.get(key) {
            Some(aggregate) => chart(&aggregate, parameter),
            None => ChartData::Empty,
        }
    }

    /// Drop a session and its aggregate. Returns whether it existed.
    pub fn expire(&self, key: &SessionKey) -> bool {
        self.sessions.write().remove(key).is_some()
    }

    /// Drop sessions neither read nor written within `max_idle`. Returns how
    /// many went.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_for() <= max_idle);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
