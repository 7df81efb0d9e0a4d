use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::ProviderError,
    location::LocationMatch,
    model::{CurrentConditions, HourlySample},
    normalize::RawDailyEntry,
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Per-call deadline; there is no request-wide budget on top of it.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    api_key: String,
    language: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct AccuWeatherBuilder {
    api_key: String,
    language: String,
    base_url: String,
    timeout: Duration,
}

impl AccuWeatherBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<AccuWeatherProvider, ProviderError> {
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(AccuWeatherProvider {
            api_key: self.api_key,
            language: self.language,
            base_url: self.base_url,
            http,
        })
    }
}

impl AccuWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: String) -> AccuWeatherBuilder {
        AccuWeatherBuilder {
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "AccuWeather request");

        let res = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwMetric {
    metric: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwWind {
    speed: AwMetric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCurrentConditions {
    temperature: AwMetric,
    wind: AwWind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourly {
    /// Absent and `null` both read as 0.
    #[serde(default)]
    precipitation_probability: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDailyResponse {
    #[serde(default)]
    daily_forecasts: Vec<RawDailyEntry>,
}

#[async_trait]
impl WeatherProvider for AccuWeatherProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, ProviderError> {
        self.get_json("locations/v1/cities/search", &[("q", query)]).await
    }

    async fn current_conditions(&self, location_key: &str) -> Result<CurrentConditions, ProviderError> {
        let path = format!("currentconditions/v1/{location_key}");
        let observations: Vec<AwCurrentConditions> =
            self.get_json(&path, &[("details", "true")]).await?;

        let latest = observations.into_iter().next().ok_or(ProviderError::Empty("current conditions"))?;

        Ok(CurrentConditions {
            temperature_c: latest.temperature.metric.value,
            wind_speed_kmh: latest.wind.speed.metric.value,
        })
    }

    async fn hourly_forecast(&self, location_key: &str) -> Result<Vec<HourlySample>, ProviderError> {
        let path = format!("forecasts/v1/hourly/12hour/{location_key}");
        let hours: Vec<AwHourly> = self.get_json(&path, &[("metric", "true")]).await?;

        Ok(hours
            .into_iter()
            .map(|h| HourlySample {
                precipitation_probability_pct: h.precipitation_probability.unwrap_or(0),
            })
            .collect())
    }

    async fn daily_forecast(
        &self,
        location_key: &str,
        days: u32,
    ) -> Result<Vec<RawDailyEntry>, ProviderError> {
        let path = format!("forecasts/v1/daily/{days}day/{location_key}");
        let parsed: AwDailyResponse =
            self.get_json(&path, &[("metric", "true"), ("details", "true")]).await?;

        Ok(parsed.daily_forecasts)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
