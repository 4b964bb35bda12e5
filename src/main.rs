//! txfeed main entry point

mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use txfeed_api::{start_server, HttpSource};
use txfeed_config::Config;
use txfeed_core::{DatasetSource, SourceRef, ViewController};
use txfeed_data::Dataset;

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(name = "txfeed")]
#[command(version = "0.1.0")]
#[command(about = "Employee transaction feed with paginated and per-employee views", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dataset over the JSON API
    Serve,
    /// Browse transactions in the terminal
    Browse {
        /// Read the local dataset instead of calling the server
        #[arg(long)]
        offline: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, from_file) = load_config(&args.config)?;
    init_logging(&config);
    if !from_file {
        log::warn!("{} not found, using default configuration", args.config.display());
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let rt = Runtime::new()?;
            rt.block_on(serve(config))
        }
        Command::Browse { offline } => {
            let rt = Builder::new_current_thread().enable_all().build()?;
            rt.block_on(browse(config, offline))
        }
    }
}

/// A missing file is only tolerated for the default path
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        return Ok((Config::default(), false));
    }
    let config = Config::load(path).map_err(|e| anyhow::anyhow!("{}", e.report()))?;
    Ok((config, true))
}

fn init_logging(config: &Config) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();
}

async fn load_dataset(config: &Config) -> Result<Dataset> {
    let path = &config.data.path;
    let dataset = Dataset::load(path, config.pagination.page_size)
        .await
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    log::info!(
        "Dataset loaded: {} employees, {} transactions, page size {}",
        dataset.employees().len(),
        dataset.transaction_count(),
        dataset.page_size()
    );
    Ok(dataset)
}

async fn serve(config: Config) -> Result<()> {
    let dataset = load_dataset(&config).await?;
    start_server(config, dataset).await?;
    Ok(())
}

async fn browse(config: Config, offline: bool) -> Result<()> {
    let source: SourceRef = if offline {
        let dataset = load_dataset(&config).await?;
        let latency = Duration::from_millis(config.data.simulated_latency_ms);
        Arc::new(DatasetSource::new(Arc::new(dataset)).with_latency(latency))
    } else {
        log::info!("Using server at {}", config.client.base_url);
        Arc::new(HttpSource::from_config(&config.client)?)
    };

    terminal::run(ViewController::with_source(source)).await
}
