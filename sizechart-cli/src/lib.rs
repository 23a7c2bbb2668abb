//! # Size Chart CLI
//!
//! Headless driver for the size chart editor: extract a chart from a photo,
//! apply brand and colours, and export the canonical JPEG.
//!
//! ## Usage
//!
//! ```bash
//! size-chart extract photo.jpg > chart.json
//! size-chart render chart.json --brand gmax --sku AB-12 --output-dir out/
//! size-chart render photo.jpg --preset ocean --format svg
//! size-chart brands
//! size-chart presets
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved settings for the extraction client and presets
//! - `commands` - The work behind each subcommand

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sizechart_extract::{ExtractorConfig, DEFAULT_BASE_URL};

/// Command-line arguments for size-chart.
#[derive(Debug, Clone, Parser)]
#[command(name = "size-chart")]
#[command(about = "Turn size chart photos into branded 1080x1080 graphics")]
#[command(version)]
pub struct CliArgs {
    /// OCR/vision service URL
    #[arg(long, global = true, env = "SIZECHART_OCR_URL", default_value = DEFAULT_BASE_URL)]
    pub ocr_url: String,

    /// API key for the OCR service
    #[arg(long, global = true, env = "SIZECHART_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory where custom presets are stored
    #[arg(long, global = true, env = "SIZECHART_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Extraction timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout_secs: u64,

    /// Do not retry with basic OCR when the AI endpoint fails
    #[arg(long, global = true)]
    pub no_fallback: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Extract chart data from an image and print it as JSON
    Extract {
        /// Image file (JPEG, PNG, WebP)
        image: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Build a chart from an image or extraction JSON and export it
    Render(RenderArgs),
    /// List the brand catalog
    Brands,
    /// List colour and background presets
    Presets,
}

/// Output format for `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 2160x2160 JPEG
    Jpeg,
    /// Vector document at canonical size
    Svg,
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Image to extract from, or a `.json` extraction result
    pub input: PathBuf,

    /// Directory the export is written to
    #[arg(long, short = 'o', default_value = ".")]
    pub output_dir: PathBuf,

    /// Brand id from the catalog
    #[arg(long)]
    pub brand: Option<String>,

    /// Logo file for the custom brand
    #[arg(long)]
    pub logo: Option<String>,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,

    /// Article number (overrides the extracted one)
    #[arg(long)]
    pub sku: Option<String>,

    /// Colour or background preset, by id or name
    #[arg(long)]
    pub preset: Option<String>,

    /// Background template image
    #[arg(long)]
    pub background: Option<String>,

    /// Save the resulting colours as a custom preset with this name
    #[arg(long)]
    pub save_preset: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "jpeg")]
    pub format: OutputFormat,

    /// Supersampling factor
    #[arg(long, default_value = "2.0")]
    pub pixel_ratio: f32,

    /// JPEG quality (0-1)
    #[arg(long, default_value = "0.95")]
    pub quality: f32,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Extraction client settings.
    pub extractor: ExtractorConfig,
    /// Custom preset directory; presets are not persisted when unset.
    pub data_dir: Option<PathBuf>,
    /// Subcommand to run.
    pub command: Command,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        let mut extractor = ExtractorConfig::with_base_url(args.ocr_url)
            .timeout(Duration::from_secs(args.timeout_secs.max(1)))
            .fallback(!args.no_fallback);
        if let Some(key) = args.api_key {
            extractor = extractor.api_key(key);
        }
        Self {
            extractor,
            data_dir: args.data_dir,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["size-chart", "brands"]).expect("parse");
        let config = CliConfig::from(args);
        assert_eq!(config.extractor.timeout, Duration::from_secs(30));
        assert!(config.extractor.fallback);
        assert!(matches!(config.command, Command::Brands));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "size-chart",
            "render",
            "chart.json",
            "--sku",
            "AB-1",
            "--format",
            "svg",
            "--no-fallback",
            "--api-key",
            "k",
            "--timeout-secs",
            "5",
        ])
        .expect("parse");
        let config = CliConfig::from(args);
        assert!(!config.extractor.fallback);
        assert_eq!(config.extractor.api_key.as_deref(), Some("k"));
        assert_eq!(config.extractor.timeout, Duration::from_secs(5));
        match config.command {
            Command::Render(render) => {
                assert_eq!(render.sku.as_deref(), Some("AB-1"));
                assert_eq!(render.format, OutputFormat::Svg);
                assert_eq!(render.output_dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
