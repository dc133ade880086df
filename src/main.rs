//! Cardiorisk: heart-attack risk inference from the command line.
//!
//! Results are printed to stdout as JSON; logs go to stderr (or a file) so
//! the two never mix.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::adapters::read_csv_records;
use cardiorisk::{CardioRiskError, InferencePipeline, PipelineConfig, Record};

/// Exit code when no model can be loaded.
const EXIT_UNAVAILABLE: u8 = 3;

#[derive(Parser)]
#[command(
    name = "cardiorisk",
    version,
    about = "Heart-attack risk inference from a pre-trained classifier"
)]
struct Cli {
    /// Directory holding model_v2.json, threshold_v2.json and fill_values.json
    #[arg(long, global = true, value_name = "DIR")]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every row of a CSV table
    Predict {
        /// CSV file with a header row, or `-` for stdin
        #[arg(long, short, default_value = "-")]
        input: String,

        /// Include risk level, percentage and threshold for every row
        #[arg(long)]
        detailed: bool,
    },

    /// Score a single record given as a JSON object
    PredictOne {
        /// e.g. '{"Age": 0.62, "Gender": "Male", "Smoking": 1}'
        #[arg(long)]
        json: String,
    },

    /// Load the model and describe it
    Info,
}

fn init_logging() -> Result<WorkerGuard> {
    let log_mode = std::env::var("CARDIORISK_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, guard) = match log_mode.as_str() {
        "file" => {
            let log_file = std::env::var("CARDIORISK_LOG_FILE")
                .unwrap_or_else(|_| "cardiorisk.log".to_string());
            if let Some(parent) = std::path::Path::new(&log_file).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .with_context(|| format!("opening log file {log_file}"))?;
            tracing_appender::non_blocking(file)
        }
        "stdout" => tracing_appender::non_blocking(std::io::stdout()),
        _ => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    Ok(guard)
}

fn read_records(input: &str) -> Result<Vec<Record>> {
    let records = if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        read_csv_records(buf.as_slice())?
    } else {
        let file = std::fs::File::open(input).with_context(|| format!("opening {input}"))?;
        read_csv_records(file)?
    };
    Ok(records)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(dir) = cli.models_dir {
        config = PipelineConfig {
            default_threshold: config.default_threshold,
            batch_chunk_size: config.batch_chunk_size,
            ..PipelineConfig::with_models_dir(dir)
        };
    }
    let pipeline = InferencePipeline::new(config);

    let output = match cli.command {
        Commands::Predict { input, detailed } => {
            let records = read_records(&input)?;
            tracing::info!("Read {} records", records.len());
            if detailed {
                json!({ "predictions": pipeline.predict_batch_detailed(&records)? })
            } else {
                json!({ "predictions": pipeline.predict_batch(&records)? })
            }
        }
        Commands::PredictOne { json } => {
            let record: Record = serde_json::from_str(&json).context("parsing --json record")?;
            serde_json::to_value(pipeline.predict_single(&record)?)?
        }
        Commands::Info => {
            pipeline.load()?;
            serde_json::to_value(pipeline.model_info())?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let unavailable = e
                .downcast_ref::<CardioRiskError>()
                .is_some_and(CardioRiskError::is_unavailable);
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            if unavailable {
                ExitCode::from(EXIT_UNAVAILABLE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
