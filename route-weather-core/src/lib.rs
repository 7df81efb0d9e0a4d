//! Core library for the `route-weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the weather provider, with an AccuWeather client
//! - Location resolution, advisory classification and forecast normalization
//! - The route aggregator and the session-scoped aggregate store it writes to
//!
//! It is used by `route-weather-cli`, but can also be embedded in other
//! front-ends (a web handler, a dashboard).

pub mod advisory;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod route;
pub mod store;

#[cfg(test)]
mod fake;

pub use advisory::{Advisory, classify};
pub use config::{Config, ProviderConfig};
pub use error::{GENERIC_FAILURE, MalformedRecord, ProviderError, RouteError};
pub use model::{
    CurrentConditions, DailyRecord, HourlySample, LocationPoint, PointReading, RouteAggregate,
    RoutePointResult, RouteReport, RouteRequest,
};
pub use provider::{WeatherProvider, accuweather::AccuWeatherProvider, provider_from_config};
pub use route::RouteAggregator;
pub use store::{AggregateStore, ChartData, Parameter, PointSeries, SessionKey};
