use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use coverage_sheets::common::constants::DEFAULT_CONFIG_PATH;
use coverage_sheets::common::RawRow;
use coverage_sheets::config::Config;
use coverage_sheets::normalize::{self, NoFramePolicy, NormalizeOptions};
use coverage_sheets::observability::{self, metrics};
use coverage_sheets::pipeline::ingestion::{FileRowSource, RowSource, SheetsClient};
use coverage_sheets::pipeline::storage::{InMemoryStorage, Storage};
use coverage_sheets::pipeline::Importer;
use coverage_sheets::server::{self, AppState};

#[derive(Parser)]
#[command(name = "coverage_sheets")]
#[command(about = "Carrier coverage sheet importer and search API")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "COVERAGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Read sheet rows from a JSON fixture file instead of the Sheets API
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the workbook and serve the search API
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Start with an empty snapshot instead of importing first
        #[arg(long)]
        no_import: bool,
    },
    /// Run a single import cycle and print its summary
    Import {
        #[command(flatten)]
        source: SourceArgs,
        /// Also write the imported records as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Normalize a JSON row matrix offline and print the records
    Normalize {
        /// JSON file holding an array of rows (arrays of strings)
        #[arg(long)]
        input: PathBuf,
        /// Category of a state-keyed sheet (FLOOD, PL, APARTMENT)
        #[arg(long, conflicts_with = "jurisdictions")]
        category: Option<String>,
        /// Comma-separated jurisdictions of a commercial-lines sheet
        #[arg(long, value_delimiter = ',')]
        jurisdictions: Option<Vec<String>>,
        /// Emit one record for "IL (no frame)" cells instead of two
        #[arg(long)]
        single_no_frame: bool,
    },
}

fn build_importer(
    config: &Config,
    source: &SourceArgs,
    storage: Arc<dyn Storage>,
) -> Result<Importer> {
    let rows: Arc<dyn RowSource> = match &source.fixtures {
        Some(path) => {
            info!(path = %path.display(), "Using fixture row source");
            Arc::new(FileRowSource::new(path))
        }
        None => {
            config.validate_remote()?;
            Arc::new(SheetsClient::from_config(&config.spreadsheet)?)
        }
    };

    Ok(Importer::new(
        rows,
        storage,
        config.sheets.clone(),
        config.import.no_frame_policy,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = observability::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            source,
            port,
            no_import,
        } => {
            let config = Config::load(&cli.config)?;
            if config.metrics.enabled {
                metrics::init();
            }

            let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
            let importer = Arc::new(build_importer(&config, &source, storage.clone())?);

            if !no_import {
                if let Err(e) = importer.run_once().await {
                    warn!("Initial import failed, serving an empty snapshot: {}", e);
                }
            }

            if let Some(secs) = config.import.refresh_interval_secs.filter(|s| *s > 0) {
                info!(interval_secs = secs, "Scheduling periodic re-import");
                importer.clone().spawn_refresh(Duration::from_secs(secs));
            }

            let state = AppState {
                storage,
                importer: Some(importer),
            };
            server::start_server(state, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Import { source, output } => {
            let config = Config::load(&cli.config)?;
            let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
            let importer = build_importer(&config, &source, storage.clone())?;

            let summary = importer.run_once().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if let Some(path) = output {
                let snapshot = storage.current().await;
                let json = serde_json::to_string_pretty(&snapshot.records)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing records to {}", path.display()))?;
                info!(path = %path.display(), records = snapshot.records.len(), "Wrote records");
            }
        }
        Commands::Normalize {
            input,
            category,
            jurisdictions,
            single_no_frame,
        } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let rows: Vec<RawRow> = serde_json::from_str(&content)
                .with_context(|| format!("parsing {} as a row matrix", input.display()))?;

            let options = NormalizeOptions {
                category,
                jurisdictions,
                no_frame: if single_no_frame {
                    NoFramePolicy::Single
                } else {
                    NoFramePolicy::Duplicate
                },
            };
            let records = normalize::normalize(&rows, &options)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
