//! Profit & loss reporting for a small-business bookkeeping backend
//!
//! Pulls income records, expense records, and the expense catalog for a
//! date range from the bookkeeping API, aggregates them into a Schedule C
//! shaped statement, and renders it as a console summary, JSON, or a CSV
//! export.

mod aggregate;
mod client;
mod config;
mod constants;
mod expenses;
mod income;
mod money;
mod reports;
mod service;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use client::ApiClient;
use config::{Config, FileConfig};
use service::{DateRange, ReportService};

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

/// Load config file or exit with helpful message
fn load_config_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Config file '{}' not found.\n\n\
            To get started:\n\
            1. Copy config.toml.example to config.toml\n\
            2. Fill in your backend URL and API token\n\n\
            See config.toml.example for the required format.",
            path.display()
        );
    }

    FileConfig::load(path)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, constants::DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

#[derive(Parser, Debug)]
#[command(name = "business-finances")]
#[command(about = "Profit & loss reporting for a small-business bookkeeping backend")]
struct Args {
    /// Start of the reporting period (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: String,

    /// End of the reporting period (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: String,

    /// Config file path
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Output directory for exported CSV statements
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Backend base URL (overrides config.toml)
    #[arg(long)]
    base_url: Option<String>,

    /// Print the report as JSON instead of the console summary
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the statement as a Schedule C shaped CSV file
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let range = DateRange::new(parse_date(&args.from)?, parse_date(&args.to)?)?;
    let file_config = load_config_file(&args.config)?;
    let config = Config::from_file(&file_config, args.base_url);

    let client = ApiClient::new(&config)?;
    let service = ReportService::new(client);

    println!("Fetching records from {} to {}...", range.from, range.to);
    let report = service.refresh(&range).await?;

    match args.command {
        Some(Command::Export) => {
            std::fs::create_dir_all(&args.output_dir).with_context(|| {
                format!("Failed to create output directory: {}", args.output_dir.display())
            })?;
            println!("Exporting profit & loss statement...");
            let path = reports::export_csv(&report, &range, &args.output_dir)?;
            println!("\nDone! Statement written to: {}", path.display());
        }
        None => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                reports::print_summary(&report, &range);
            }
        }
    }

    Ok(())
}
