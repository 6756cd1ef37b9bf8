use std::path::{Path, PathBuf};

use crate::error::{DataLoadError, ValidationError};
use crate::portfolio::{format_change, format_currency, Dashboard};
use crate::sample::{load_samples, parse_timestamp, quality_report};
use crate::simulation::InvestmentEvent;
use crate::timeframe::Timeframe;

use chrono::NaiveDateTime;
use clap::{arg, Arg, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod change;
mod cursor;
mod error;
mod portfolio;
mod sample;
mod simulation;
mod timeframe;
mod tui;
mod window;

const APP_NAME: &str = "invest_view";

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct Config {
    data_file: String,
    symbol: String,
    currency: String,
    initial_balance: f64,
    investment_amount: f64,
    investment_date: String,
    display_start: String,
    reference_now: Option<String>,
    seed: Option<u64>,
    default_timeframe: String,
    disabled_components: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "nvidia_intraday_15min_data.csv".to_string(),
            symbol: "NVDA".to_string(),
            currency: "USD".to_string(),
            initial_balance: 28731.62,
            investment_amount: 20000.0,
            investment_date: "2025-03-15".to_string(),
            display_start: "2023-06-01".to_string(),
            reference_now: None,
            seed: None,
            default_timeframe: "ALL".to_string(),
            disabled_components: Vec::new(),
        }
    }
}

/// Validated configuration, with every instant resolved.
#[derive(Debug, Clone)]
pub struct Settings {
    pub event: InvestmentEvent,
    pub display_start: NaiveDateTime,
    pub now: NaiveDateTime,
    pub seed: Option<u64>,
    pub timeframe: Timeframe,
    pub symbol: String,
    pub currency: String,
    pub disabled_components: Vec<String>,
}

fn parse_date_field(field: &'static str, value: &str) -> Result<NaiveDateTime, ValidationError> {
    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl Config {
    // `wall_clock` is only used when the config does not pin the reference instant
    fn settings(&self, wall_clock: NaiveDateTime) -> Result<Settings, ValidationError> {
        if self.initial_balance <= 0.0 {
            return Err(ValidationError::NonPositiveBalance(self.initial_balance));
        }
        if self.investment_amount <= 0.0 {
            return Err(ValidationError::NonPositiveInvestment(self.investment_amount));
        }
        if self.investment_amount > self.initial_balance {
            return Err(ValidationError::InvestmentExceedsBalance {
                amount: self.investment_amount,
                balance: self.initial_balance,
            });
        }

        let now = match &self.reference_now {
            Some(value) => parse_date_field("reference_now", value)?,
            None => wall_clock,
        };

        Ok(Settings {
            event: InvestmentEvent {
                investment_timestamp: parse_date_field("investment_date", &self.investment_date)?,
                investment_amount: self.investment_amount,
                initial_balance: self.initial_balance,
            },
            display_start: parse_date_field("display_start", &self.display_start)?,
            now,
            seed: self.seed,
            timeframe: self.default_timeframe.parse()?,
            symbol: self.symbol.clone(),
            currency: self.currency.clone(),
            disabled_components: self.disabled_components.clone(),
        })
    }
}

fn file_arg() -> Arg {
    arg!(<FILE> "CSV file with timestamped prices")
        .required(false)
        .default_value("")
}

fn timeframe_arg() -> Arg {
    arg!(-t --timeframe <TIMEFRAME> "One of 1D, 1W, 1M, 3M, YTD, 1Y, ALL").required(false)
}

fn cli() -> Command {
    Command::new(APP_NAME)
        .about("A simulated investing screen built from a price series")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("components").about("List screen components that can be disabled"),
        )
        .subcommand(
            Command::new("chart")
                .about("Print the chart points for a timeframe")
                .arg(file_arg())
                .arg(timeframe_arg()),
        )
        .subcommand(
            Command::new("summary")
                .about("Show the portfolio value and change for a timeframe")
                .arg(file_arg())
                .arg(timeframe_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the chart points and header for a timeframe as JSON")
                .arg(file_arg())
                .arg(timeframe_arg()),
        )
        .subcommand(
            Command::new("stats")
                .about("Check the price data: summary statistics and large moves")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("tui")
                .about("Open the interactive investing screen")
                .arg(file_arg()),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

// returns a dashboard built from the price file; the only await in the pipeline
pub async fn load_dashboard(path: &Path, settings: &Settings) -> Result<Dashboard, DataLoadError> {
    let samples = load_samples(path, settings.display_start).await?;
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(Dashboard::from_samples(
        samples,
        settings.event,
        &mut rng,
        settings.now,
        settings.display_start,
    ))
}

// argument first, then the configured file
fn resolve_file(matches: &ArgMatches, cfg: &Config) -> Option<PathBuf> {
    let mut filename = String::new();
    if let Ok(Some(f)) = matches.try_get_one::<String>("FILE") {
        filename = f.to_string();
    }
    if filename.is_empty() {
        filename.clone_from(&cfg.data_file);
    }
    (!filename.is_empty()).then(|| PathBuf::from(filename))
}

fn resolve_timeframe(matches: &ArgMatches, settings: &Settings) -> Result<Timeframe, ValidationError> {
    match matches.try_get_one::<String>("timeframe") {
        Ok(Some(tf)) => tf.parse(),
        _ => Ok(settings.timeframe),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing();

    let cfg: Config = confy::load(APP_NAME, "config")?;
    let matches = cli().get_matches();

    if let Some(_matches) = matches.subcommand_matches("config") {
        println!(
            "Your config file is located here: \n{}",
            confy::get_configuration_file_path(APP_NAME, "config")?.display()
        );
        return Ok(());
    }

    if matches.subcommand_matches("components").is_some() {
        println!("Components that can be listed under disabled_components:");
        for component in tui::Component::all() {
            println!("  {:<14} {}", component.as_str(), component.description());
        }
        return Ok(());
    }

    let settings = cfg.settings(chrono::Local::now().naive_local())?;

    for subcommand in ["chart", "summary", "export", "stats", "tui"].iter() {
        if let Some(matches) = matches.subcommand_matches(subcommand) {
            let Some(path) = resolve_file(matches, &cfg) else {
                cli().print_help()?;
                return Ok(());
            };

            if *subcommand == "stats" {
                let samples = load_samples(&path, settings.display_start).await?;
                quality_report(&samples).print();
                return Ok(());
            }

            if *subcommand == "tui" {
                tui::run_tui(path, settings.clone())
                    .await
                    .map_err(|e| eyre::eyre!("terminal error: {e}"))?;
                return Ok(());
            }

            let timeframe = resolve_timeframe(matches, &settings)?;
            let dashboard = load_dashboard(&path, &settings).await?;
            let view = dashboard.view(timeframe)?;

            match *subcommand {
                "chart" => view.print(&settings.currency),
                "summary" => {
                    view.print_summary(&settings.currency);
                    let cursor = dashboard.latest_price();
                    if let (Some(sample), Some(change)) = (cursor.current(), cursor.day_change()) {
                        println!(
                            "{}: {} {}",
                            settings.symbol,
                            format_currency(sample.price, &settings.currency),
                            format_change(&change, &settings.currency)
                        );
                    }
                }
                "export" => println!("{}", serde_json::to_string_pretty(&view)?),
                _ => (),
            }
        }
    }
    Ok(())
}
