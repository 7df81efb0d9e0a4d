use std::fmt;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use route_weather_core::{
    AggregateStore, Config, Parameter, RouteAggregator, RouteReport, RouteRequest, SessionKey,
    provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "route-weather", version, about = "Weather advisories and forecasts along a route")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the AccuWeather API key and response language.
    Configure,

    /// Check the weather along a route.
    Route(RouteArgs),
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Starting point.
    #[arg(long)]
    pub start: String,

    /// Destination.
    #[arg(long)]
    pub end: String,

    /// Intermediate stop; repeat for several, in travel order.
    #[arg(long = "stop")]
    pub stops: Vec<String>,

    /// Intermediate stops as one whitespace-separated line.
    #[arg(long)]
    pub stops_line: Option<String>,

    /// Number of forecast days (default 1). Any stop switches to the daily forecast.
    #[arg(long)]
    pub days: Option<String>,

    /// Forecast parameter to chart: maxTemp, minTemp, windSpeed or precipProb.
    #[arg(long, default_value = "maxTemp")]
    pub param: Parameter,

    /// Pick chart parameters interactively after the forecast is shown.
    #[arg(long)]
    pub interactive: bool,

    /// Print the report (aggregate and readings) as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl RouteArgs {
    fn request(&self) -> anyhow::Result<RouteRequest> {
        let stops = self
            .stops
            .iter()
            .map(String::as_str)
            .chain(self.stops_line.iter().flat_map(|line| line.split_whitespace()));

        RouteRequest::parse_days(self.days.as_deref())
            .and_then(|days| RouteRequest::new(&self.start, &self.end, stops, days))
            .map_err(|e| anyhow!(e.user_message()))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Route(args) => route(args).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let current_language = config.language().to_string();

    let api_key = Password::new("AccuWeather API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt aborted")?;

    let language = Text::new("Response language:")
        .with_default(&current_language)
        .prompt()
        .context("Language prompt aborted")?;

    config.set_api_key(api_key.trim().to_string());
    config.set_language(language.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn route(args: RouteArgs) -> anyhow::Result<()> {
    let request = args.request()?;

    let config = Config::load()?.with_env_overrides(|name| std::env::var(name).ok());
    let aggregator = RouteAggregator::new(provider_from_config(&config)?);

    let store = AggregateStore::new();
    let session = store.open_session();
    tracing::debug!(%session, points = request.points().len(), "Submitting route");

    let outcome = match aggregator.submit(&store, &session, &request).await {
        Ok(report) => show(&args, &store, &session, &report),
        Err(e) => Err(anyhow!(e.user_message())),
    };

    store.expire(&session);
    outcome
}

fn show(
    args: &RouteArgs,
    store: &AggregateStore,
    session: &SessionKey,
    report: &RouteReport,
) -> anyhow::Result<()> {
    if args.json {
        println!("{}", render::json(report)?);
        return Ok(());
    }

    print!("{}", render::report(report));
    println!();
    if args.interactive {
        chart_loop(store, session)
    } else {
        print!("{}", render::chart(&store.query(session, args.param), args.param));
        Ok(())
    }
}

/// Menu entry for the interactive chart picker.
struct Choice(Option<Parameter>);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => f.write_str(p.label()),
            None => f.write_str("Quit"),
        }
    }
}

fn chart_loop(store: &AggregateStore, session: &SessionKey) -> anyhow::Result<()> {
    loop {
        let choices: Vec<Choice> = Parameter::all()
            .iter()
            .map(|p| Choice(Some(*p)))
            .chain(std::iter::once(Choice(None)))
            .collect();

        let picked = match Select::new("Parameter to display:", choices).prompt() {
            Ok(Choice(Some(parameter))) => parameter,
            Ok(Choice(None))
            | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        print!("{}", render::chart(&store.query(session, picked), picked));
        println!();
    }
}
