//! Plan a trip from a JSON request file and print the plan as JSON.
//!
//! ```text
//! plan-trip --request penang.json --config planner.toml
//! plan-trip --request requests.json --batch
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

use trip_planner::catalog::HttpCatalog;
use trip_planner::{CatalogError, ConfigError, ItineraryPlanner, PlanError, PlanRequest, PlannerConfig};

#[derive(Parser)]
#[command(name = "plan-trip", about = "Build a multi-day itinerary from candidate POIs")]
struct Cli {
    /// JSON file holding a request (`candidates` and `context`)
    #[arg(long)]
    request: PathBuf,

    /// TOML planner configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat the request file as an array of requests and plan them in parallel
    #[arg(long)]
    batch: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read request {path}: {source}")]
    ReadRequest { path: PathBuf, source: std::io::Error },

    #[error("failed to parse request {path}: {source}")]
    ParseRequest { path: PathBuf, source: serde_json::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("failed to write plan: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "planning failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let planner = ItineraryPlanner::from_config(&config);
    let catalog = config.catalog.clone().map(HttpCatalog::new).transpose()?;

    let output = if cli.batch {
        let requests: Vec<PlanRequest> = read_json(&cli.request)?;
        tracing::info!(requests = requests.len(), catalog = catalog.is_some(), "planning batch");
        let results = match &catalog {
            Some(catalog) => planner.plan_batch_with_catalog(&requests, catalog),
            None => planner.plan_batch(&requests),
        };
        let plans = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        serde_json::to_value(plans)?
    } else {
        let request: PlanRequest = read_json(&cli.request)?;
        let plan = match &catalog {
            Some(catalog) => planner.plan_with_catalog(&request.candidates, &request.context, catalog)?,
            None => planner.plan(&request.candidates, &request.context)?,
        };
        serde_json::to_value(plan)?
    };

    let stdout = std::io::stdout().lock();
    if cli.compact {
        serde_json::to_writer(stdout, &output)?;
    } else {
        serde_json::to_writer_pretty(stdout, &output)?;
    }
    println!();
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadRequest {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}
