//! # Size Chart CLI
//!
//! Headless size chart driver.

use std::io::Write as _;

use clap::Parser;
use sizechart_cli::{commands, CliArgs, CliConfig, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels.
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,sizechart_core=debug,sizechart_renderer=debug,sizechart_extract=debug")
    });

    // Logs go to stderr so stdout stays clean for JSON output.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CliConfig::from(CliArgs::parse());
    tracing::debug!(ocr_url = %config.extractor.base_url, "Starting size-chart");

    match &config.command {
        Command::Extract { image, output } => {
            let result = commands::extract(&config.extractor, image).await?;
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => writeln!(std::io::stdout(), "{json}")?,
            }
        }
        Command::Render(args) => {
            let data = commands::chart_data(&config.extractor, &args.input).await?;
            let store = commands::preset_store(config.data_dir.as_deref())?;
            let session = commands::build_session(store, data, args)?;
            let today = chrono::Local::now().date_naive();
            let path = commands::write_export(&session, args, today)?;
            writeln!(std::io::stdout(), "{}", path.display())?;
        }
        Command::Brands => {
            let mut out = std::io::stdout().lock();
            for line in commands::brand_lines() {
                writeln!(out, "{line}")?;
            }
        }
        Command::Presets => {
            let store = commands::preset_store(config.data_dir.as_deref())?;
            let mut out = std::io::stdout().lock();
            for line in commands::preset_lines(&store) {
                writeln!(out, "{line}")?;
            }
        }
    }

    Ok(())
}
