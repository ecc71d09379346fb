use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use qsift::config::load_config;
use qsift::harness::{HarnessOptions, run_harness};
use qsift::pipeline::{BatchOptions, load_parser_config, parse_email_file, run_batch};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qsift", about = "HARO bulk-email query extraction pipeline")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one saved email body and print the result as JSON
    Parse {
        input: PathBuf,
        #[arg(long)]
        received_at: Option<DateTime<Utc>>,
    },
    /// Parse a directory of saved email bodies and write JSON results
    Batch {
        #[arg(long, default_value = "data/emails")]
        input_dir: PathBuf,
        #[arg(long, default_value = "data/out")]
        out_dir: PathBuf,
        #[arg(long)]
        received_at: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Re-parse fixtures twice and report determinism metrics
    Harness {
        #[arg(long, default_value = "tests/fixtures/emails")]
        input_dir: PathBuf,
    },
    /// Check a parser config file
    Validate { config_file: PathBuf },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input, received_at } => {
            let config = load_parser_config(cli.config.as_deref())?;
            let result =
                parse_email_file(&config, &input, received_at.unwrap_or_else(Utc::now))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Batch {
            input_dir,
            out_dir,
            received_at,
            dry_run,
        } => {
            let reports = run_batch(&BatchOptions {
                input_dir,
                out_dir,
                config_path: cli.config,
                received_at,
                dry_run,
            })?;

            for report in reports {
                info!(
                    email = %report.email_id,
                    queries = report.queries_extracted,
                    errors = report.parse_errors,
                    ai_detections = report.ai_detections,
                    direct = report.direct_emails,
                    defaulted_deadlines = report.defaulted_deadlines,
                    "email batch summary"
                );
            }
        }
        Commands::Harness { input_dir } => {
            let report = run_harness(&HarnessOptions {
                input_dir,
                config_path: cli.config,
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Validate { config_file } => {
            let config = load_config(&config_file)?;
            println!(
                "OK: relay domain {} ({} category headers)",
                config.relay_domain,
                config.category_headers.len()
            );
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
