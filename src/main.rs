//! Mortgage Model CLI
//!
//! Runs scenario files through the engine and prints the outcomes as JSON.
//! `RUST_LOG` controls log output; the `APRC_*` variables override the
//! APRC settings.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mortgage_model::money::Cents;
use mortgage_model::rates::load_catalog;
use mortgage_model::{EngineConfig, RateCatalog, ScenarioInputs, ScenarioOutcome, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(
    name = "mortgage-model",
    about = "Mortgage breakeven scenarios: remortgage, rent vs buy, cashback vs rate"
)]
struct Cli {
    #[arg(long, global = true, help = "Rate catalog (.csv or .json)")]
    catalog: Option<PathBuf>,

    #[arg(long, global = true, help = "Engine configuration JSON")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario
    Run {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, help = "Write the yearly series to this CSV file")]
        yearly_csv: Option<PathBuf>,
    },
    /// Run an array of scenarios in parallel
    Batch {
        #[arg(long)]
        input: PathBuf,
    },
}

/// One option's position in a yearly cashback row
#[derive(Serialize)]
struct CashbackCsvRow {
    month: u32,
    option: usize,
    payment: Cents,
    balance: Cents,
    cumulative_interest: Cents,
    cumulative_payments: Cents,
    adjusted_balance: Cents,
    net_cost: Cents,
}

#[derive(Serialize)]
struct BatchEntry {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ScenarioOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_runner(cli: &Cli) -> Result<ScenarioRunner> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path).with_context(|| format!("loading catalog {}", path.display()))?,
        None => RateCatalog::default(),
    };
    log::info!("Loaded {} catalog rates", catalog.len());

    Ok(ScenarioRunner::new(catalog, config))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))
}

fn write_yearly_csv(outcome: &ScenarioOutcome, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    match outcome {
        ScenarioOutcome::Remortgage(result) => {
            for row in &result.projection.yearly {
                writer.serialize(row)?;
            }
        }
        ScenarioOutcome::RentVsBuy(result) => {
            for row in &result.projection.yearly {
                writer.serialize(row)?;
            }
        }
        ScenarioOutcome::Cashback(result) => {
            for month in &result.projection.yearly {
                for (option, position) in month.positions.iter().enumerate() {
                    writer.serialize(CashbackCsvRow {
                        month: month.month,
                        option,
                        payment: position.payment,
                        balance: position.balance,
                        cumulative_interest: position.cumulative_interest,
                        cumulative_payments: position.cumulative_payments,
                        adjusted_balance: position.adjusted_balance,
                        net_cost: position.net_cost,
                    })?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let runner = load_runner(&cli)?;

    match &cli.command {
        Command::Run { input, yearly_csv } => {
            let inputs: ScenarioInputs = read_json(input)?;
            let outcome = runner
                .run(&inputs)
                .with_context(|| format!("running {} scenario", inputs.name()))?;

            if let Some(path) = yearly_csv {
                write_yearly_csv(&outcome, path)?;
                log::info!("Yearly series written to {}", path.display());
            }
            print_json(&outcome)?;
        }
        Command::Batch { input } => {
            let scenarios: Vec<ScenarioInputs> = read_json(input)?;
            let start = Instant::now();
            let outcomes = runner.run_batch(&scenarios);
            log::info!("Ran {} scenarios in {:?}", scenarios.len(), start.elapsed());

            let entries: Vec<BatchEntry> = outcomes
                .into_iter()
                .enumerate()
                .map(|(index, outcome)| match outcome {
                    Ok(outcome) => BatchEntry { index, outcome: Some(outcome), error: None },
                    Err(err) => BatchEntry { index, outcome: None, error: Some(err.to_string()) },
                })
                .collect();
            print_json(&entries)?;
        }
    }

    Ok(())
}
