use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use csv_gate::config::Config;
use csv_gate::constants;
use csv_gate::infra;
use csv_gate::logging;
use csv_gate::observability;
use csv_gate::pipeline::ingestion::EventBatch;
use csv_gate::pipeline::validation::FileValidator;
use csv_gate::server;

#[derive(Parser)]
#[command(name = "csv_gate")]
#[command(about = "Validates uploaded CSV files and alerts on the first defect")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a local CSV file and print the outcome as JSON
    Validate {
        /// Path of the CSV file
        path: PathBuf,
    },
    /// Process one notification batch read from a file, or stdin with `-`
    Handle {
        /// Path of the batch JSON
        event: String,
    },
    /// Receive notification batches over HTTP
    Serve {
        #[arg(long, default_value_t = constants::DEFAULT_SERVER_PORT)]
        port: u16,
    },
}

fn read_batch(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Validate { path } => {
            let outcome = FileValidator::new(&config.schema).validate_path(&path);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.is_valid() {
                info!(path = %path.display(), "File validation PASSED");
                Ok(ExitCode::SUCCESS)
            } else {
                error!(path = %path.display(), error = ?outcome.error(), "File validation FAILED");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Handle { event } => {
            let body = read_batch(&event)?;
            let batch = match EventBatch::from_json(&body) {
                Ok(batch) => batch,
                Err(e) => {
                    error!(error = %e, "Could not read notification batch");
                    return Err(e.into());
                }
            };
            info!(entries = batch.len(), "Received notification batch");
            let dispatcher = infra::build_dispatcher(&config)?;
            let ack = dispatcher.handle(&batch).await;
            println!("{}", serde_json::to_string(&ack)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { port } => {
            if let Err(e) = observability::init() {
                error!(error = %e, "Metrics disabled");
            }
            let dispatcher = Arc::new(infra::build_dispatcher(&config)?);
            server::start_server(dispatcher, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
