use std::fmt::Write;

use route_weather_core::{ChartData, Parameter, RouteReport};

const BAR_WIDTH: f64 = 30.0;

/// Text for a route report: readings with advisories in single-day mode,
/// one daily table per point otherwise.
pub fn report(report: &RouteReport) -> String {
    let mut out = String::new();
    let aggregate = &report.aggregate;

    if aggregate.is_multi_day {
        let _ = writeln!(out, "Forecast for {} day(s) along the route", aggregate.requested_days);

        for point in &aggregate.points {
            let _ = writeln!(out, "\n{} ({:.2}, {:.2})", point.city, point.latitude, point.longitude);
            for r in &point.records {
                let _ = writeln!(
                    out,
                    "  {:<16}  {:>5.1} .. {:>5.1} °C  wind {:>5.1} km/h  precip {:>3}%  {} / {}",
                    r.date,
                    r.min_temp_c,
                    r.max_temp_c,
                    r.wind_speed_kmh,
                    r.precip_prob_pct,
                    r.day_condition,
                    r.night_condition,
                );
            }
        }
    } else {
        let _ = writeln!(out, "Current conditions");

        for reading in &report.readings {
            let _ = writeln!(
                out,
                "\n{}: {:.1} °C, wind {:.1} km/h, precipitation {}%\n  {}",
                reading.city,
                reading.temperature_c,
                reading.wind_speed_kmh,
                reading.precip_prob_pct,
                reading.advisory,
            );
        }
    }

    out
}

/// The full report as pretty JSON: the aggregate plus single-day readings.
pub fn json(report: &RouteReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Plain-text chart: one block per route point, one bar per day.
pub fn chart(data: &ChartData, parameter: Parameter) -> String {
    let series = match data {
        ChartData::Empty => return "No forecast stored for this session.\n".to_string(),
        ChartData::NoData => return "No data for chart (single-day forecast).\n".to_string(),
        ChartData::Series(series) => series,
    };

    let values = series.iter().flat_map(|s| s.points.iter().map(|(_, v)| *v));
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;

    let mut out = String::new();
    let _ = writeln!(out, "Route forecast: {}", parameter.label());

    for s in series {
        let _ = writeln!(out, "\n{}", s.city);
        for (date, value) in &s.points {
            let filled = if span > 0.0 { ((value - lo) / span * BAR_WIDTH).round() as usize } else { 0 };
            let _ = writeln!(out, "  {:<16} {:>7.1} {}", date, value, "#".repeat(filled + 1));
        }
    }

    out
}
