use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config,
    error::ProviderError,
    location::LocationMatch,
    model::{CurrentConditions, HourlySample},
    normalize::RawDailyEntry,
    provider::accuweather::AccuWeatherProvider,
};

pub mod accuweather;

/// Weather data source queried once per call, without retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Place search, matches in provider order.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, ProviderError>;

    /// Latest observation for a location.
    async fn current_conditions(&self, location_key: &str) -> Result<CurrentConditions, ProviderError>;

    /// Short-range hourly forecast, nearest hour first.
    async fn hourly_forecast(&self, location_key: &str) -> Result<Vec<HourlySample>, ProviderError>;

    /// Daily forecast entries, at most `days` of them.
    async fn daily_forecast(
        &self,
        location_key: &str,
        days: u32,
    ) -> Result<Vec<RawDailyEntry>, ProviderError>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = AccuWeatherProvider::builder(api_key.to_string())
        .language(config.language())
        .base_url(config.base_url())
        .build()?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `route-weather configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
