use serde::Deserialize;

use crate::{error::RouteError, model::LocationPoint, provider::WeatherProvider};

/// One match from the provider's place search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationMatch {
    pub key: String,
    #[serde(default)]
    pub geo_position: Option<GeoPosition>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolve a place name to a geocoded point. Only the first match is
/// considered; no cache, so repeated names are looked up again.
pub async fn resolve(provider: &dyn WeatherProvider, city: &str) -> Result<LocationPoint, RouteError> {
    let matches = provider
        .search_locations(city)
        .await
        .map_err(|e| RouteError::provider(format!("location search for '{city}'"), e))?;

    let Some(first) = matches.into_iter().next() else {
        tracing::warn!(city, "No location match");
        return Err(RouteError::NotFound { city: city.to_string() });
    };

    let Some(position) = first.geo_position else {
        tracing::warn!(city, key = %first.key, "First location match has no coordinates");
        return Err(RouteError::NotFound { city: city.to_string() });
    };

    tracing::debug!(city, key = %first.key, "Resolved location");

    Ok(LocationPoint {
        name: city.to_string(),
        location_key: first.key,
        latitude: position.latitude,
        longitude: position.longitude,
    })
}
