use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use localmind_core::config::Settings;
use localmind_core::error::IntelError;
use localmind_core::service::{CompetitorRequest, HoursRequest, IntelService, MarketScanRequest};
use localmind_core::telemetry::{self, Console};

mod export;

#[derive(Debug, Parser)]
#[command(name = "localmind", about = "Location intelligence from the places API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a one-result search to confirm the API key and upstream are working.
    Check {
        #[arg(long, default_value = "New York, NY")]
        location: String,
    },

    /// Nearby competitors of one business type, with density and competition labels.
    Competitors {
        #[arg(long)]
        location: String,
        #[arg(long)]
        business_type: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Recommended weekly opening hours.
    Hours {
        #[arg(long)]
        location: String,
        #[arg(long)]
        business_type: String,
        #[arg(long)]
        current_hours: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Market score and under-served categories around a location.
    Scan {
        #[arg(long)]
        location: String,
        /// Search radius in meters.
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<i64>,
        #[arg(long)]
        focus_industry: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, clap::Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    // Logs go to stderr so stdout stays clean for report output.
    let _telemetry = telemetry::init(&settings, "cli", Console::Stderr);

    let cli = Cli::parse();
    let service = IntelService::from_settings(&settings)?;

    match cli.command {
        Command::Check { location } => {
            let found = service
                .check_connection(&location)
                .await
                .map_err(into_cli_error)?;
            tracing::info!(%location, found, "places connection ok");
            println!("ok: places search near \"{location}\" returned {found} result(s)");
        }
        Command::Competitors {
            location,
            business_type,
            output,
        } => {
            let req = CompetitorRequest {
                location: Some(location),
                business_type: Some(business_type),
            };
            let report = service.analyze_competitors(&req).await.map_err(into_cli_error)?;
            emit(&output, &report, export::write_competitors_csv)?;
        }
        Command::Hours {
            location,
            business_type,
            current_hours,
            output,
        } => {
            let req = HoursRequest {
                location: Some(location),
                business_type: Some(business_type),
                current_hours,
            };
            let report = service.optimize_hours(&req).await.map_err(into_cli_error)?;
            emit(&output, &report, export::write_schedule_csv)?;
        }
        Command::Scan {
            location,
            radius,
            focus_industry,
            output,
        } => {
            let req = MarketScanRequest {
                location: Some(location),
                radius: radius.map(serde_json::Value::from),
                focus_industry,
            };
            let report = service.scan_market(&req).await.map_err(into_cli_error)?;
            emit(&output, &report, export::write_opportunities_csv)?;
        }
    }

    Ok(())
}

/// Sends non-validation failures to Sentry before handing the full error back to the operator.
fn into_cli_error(err: IntelError) -> anyhow::Error {
    if let Some(source) = err.report_source() {
        sentry_anyhow::capture_anyhow(source);
    }
    tracing::error!(kind = err.kind(), error = %err, "command failed");
    anyhow::Error::new(err)
}

fn emit<T: Serialize>(
    args: &OutputArgs,
    value: &T,
    csv: fn(Box<dyn Write>, &T) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let out = open_output(args.output.as_deref())?;
    match args.format {
        Format::Json => export::write_json(out, value),
        Format::Csv => csv(out, value),
    }?;
    if let Some(path) = &args.output {
        tracing::info!(path = %path.display(), format = ?args.format, "report written");
    }
    Ok(())
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    })
}
