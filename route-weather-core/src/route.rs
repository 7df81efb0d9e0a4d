//! Orchestrates location resolution, forecast retrieval, normalization and
//! classification across every point of a route.

use std::{error::Error, future::Future, sync::Arc};

use futures::{StreamExt, future::try_join_all, stream::FuturesUnordered};

use crate::{
    advisory::classify,
    error::{ProviderError, RouteError},
    location,
    model::{
        LocationPoint, PointReading, RouteAggregate, RoutePointResult, RouteReport, RouteRequest,
    },
    normalize::normalize_all,
    provider::WeatherProvider,
    store::{AggregateStore, SessionKey},
};

#[derive(Debug, Clone)]
pub struct RouteAggregator {
    provider: Arc<dyn WeatherProvider>,
}

impl RouteAggregator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Build the aggregate for `request` and store it for `session`, replacing
    /// whatever was there. On failure the store is left untouched.
    pub async fn submit(
        &self,
        store: &AggregateStore,
        session: &SessionKey,
        request: &RouteRequest,
    ) -> Result<RouteReport, RouteError> {
        let report = self.build_aggregate(request).await?;
        store.put(session, report.aggregate.clone());
        Ok(report)
    }

    /// Resolve every point, then fetch either multi-day forecasts or
    /// single-day readings. All or nothing: the first failure aborts the
    /// request and cancels the remaining per-point work.
    pub async fn build_aggregate(&self, request: &RouteRequest) -> Result<RouteReport, RouteError> {
        let result = self.try_build(request).await;

        match &result {
            Ok(report) => tracing::info!(
                points = report.aggregate.points.len(),
                multi_day = report.aggregate.is_multi_day,
                "Route aggregate built"
            ),
            Err(e) if e.is_user_recoverable() => tracing::warn!(error = %e, "Route request rejected"),
            Err(e) => tracing::error!(
                start = %request.start,
                end = %request.end,
                stops = ?request.stops,
                days = request.days,
                error = e as &(dyn Error + 'static),
                "Route aggregation failed"
            ),
        }

        result
    }

    async fn try_build(&self, request: &RouteRequest) -> Result<RouteReport, RouteError> {
        let provider = self.provider.as_ref();

        let points = try_join_in_route_order(
            request.points().into_iter().map(|city| location::resolve(provider, city)),
        )
        .await?;

        if request.is_multi_day() {
            tracing::info!(days = request.days, stops = request.stops.len(), "Multi-day forecast");

            let results =
                try_join_all(points.iter().map(|p| self.daily_point(p, request.days))).await?;

            Ok(RouteReport {
                aggregate: RouteAggregate {
                    points: results,
                    requested_days: request.days,
                    is_multi_day: true,
                },
                readings: Vec::new(),
            })
        } else {
            tracing::info!("Single-day forecast");

            let readings = try_join_all(points.iter().map(|p| self.current_reading(p))).await?;

            let results = points
                .into_iter()
                .map(|p| RoutePointResult {
                    city: p.name,
                    latitude: p.latitude,
                    longitude: p.longitude,
                    records: Vec::new(),
                })
                .collect();

            Ok(RouteReport {
                aggregate: RouteAggregate { points: results, requested_days: 1, is_multi_day: false },
                readings,
            })
        }
    }

    async fn daily_point(&self, point: &LocationPoint, days: u32) -> Result<RoutePointResult, RouteError> {
        let mut entries = self
            .provider
            .daily_forecast(&point.location_key, days)
            .await
            .map_err(|e| RouteError::provider(format!("daily forecast for '{}'", point.name), e))?;

        entries.truncate(days as usize);

        let records = normalize_all(&entries).map_err(|(index, source)| RouteError::Malformed {
            city: point.name.clone(),
            index,
            source,
        })?;

        Ok(RoutePointResult {
            city: point.name.clone(),
            latitude: point.latitude,
            longitude: point.longitude,
            records,
        })
    }

    async fn current_reading(&self, point: &LocationPoint) -> Result<PointReading, RouteError> {
        let key = point.location_key.as_str();

        let current = self
            .provider
            .current_conditions(key)
            .await
            .map_err(|e| RouteError::provider(format!("current conditions for '{}'", point.name), e))?;

        let hourly = self
            .provider
            .hourly_forecast(key)
            .await
            .map_err(|e| RouteError::provider(format!("hourly forecast for '{}'", point.name), e))?;

        let nearest = hourly.first().ok_or_else(|| {
            RouteError::provider(
                format!("hourly forecast for '{}'", point.name),
                ProviderError::Empty("hourly forecast"),
            )
        })?;

        let precip = nearest.precipitation_probability_pct;
        let advisory = classify(current.temperature_c, current.wind_speed_kmh, precip);

        Ok(PointReading {
            city: point.name.clone(),
            temperature_c: current.temperature_c,
            wind_speed_kmh: current.wind_speed_kmh,
            precip_prob_pct: precip,
            advisory,
        })
    }
}

/// Runs `futures` concurrently and collects their outputs in input order.
///
/// When several fail, the error reported is the one earliest in input order:
/// a failure is returned once every future before it has succeeded, and the
/// futures still running at that point are dropped.
async fn try_join_in_route_order<T, E, F>(futures: impl IntoIterator<Item = F>) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let mut running: FuturesUnordered<_> =
        futures.into_iter().enumerate().map(|(i, f)| async move { (i, f.await) }).collect();

    let mut done: Vec<Option<T>> = (0..running.len()).map(|_| None).collect();
    let mut settled = 0;
    let mut earliest_error: Option<(usize, E)> = None;

    while let Some((index, result)) = running.next().await {
        match result {
            Ok(value) => done[index] = Some(value),
            Err(e) => {
                if earliest_error.as_ref().is_none_or(|(at, _)| index < *at) {
                    earliest_error = Some((index, e));
                }
            }
        }

        while settled < done.len() && done[settled].is_some() {
            settled += 1;
        }

        if let Some((at, e)) = earliest_error.take() {
            if at == settled {
                return Err(e);
            }
            earliest_error = Some((at, e));
        }
    }

    Ok(done.into_iter().flatten().collect())
}
