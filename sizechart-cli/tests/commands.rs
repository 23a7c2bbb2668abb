//! Integration tests for the CLI commands (sizechart-cli).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use sizechart_cli::commands::{
    brand_lines, build_session, chart_data, preset_lines, preset_store, write_export,
};
use sizechart_cli::{CliArgs, Command, OutputFormat, RenderArgs};
use sizechart_core::{ColorPreset, ExtractionResult, PresetStore};
use sizechart_extract::ExtractorConfig;

const CHART_JSON: &str = r#"{
    "headers": ["SIZE", "CHEST"],
    "rows": [{"SIZE": "S", "CHEST": "38"}, {"SIZE": "M", "CHEST": "40"}],
    "sku": "TS-01"
}"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
}

fn render_args(argv: &[&str]) -> RenderArgs {
    let mut full = vec!["size-chart", "render"];
    full.extend_from_slice(argv);
    match CliArgs::try_parse_from(full).expect("parse").command {
        Command::Render(args) => args,
        other => panic!("unexpected command: {other:?}"),
    }
}

fn write_chart(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("chart.json");
    std::fs::write(&path, CHART_JSON).expect("write chart");
    path
}

// ==========================================================================
// Session building
// ==========================================================================

#[tokio::test]
async fn test_json_input_skips_extraction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_chart(&dir);
    // Unreachable service: only a JSON input can succeed here.
    let config = ExtractorConfig::with_base_url("http://127.0.0.1:9");
    let data = chart_data(&config, &input).await.expect("chart data");
    assert_eq!(data.headers, vec!["SIZE", "CHEST"]);
    assert_eq!(data.sku.as_deref(), Some("TS-01"));
}

#[test]
fn test_session_options_are_applied() {
    let args = render_args(&[
        "chart.json",
        "--brand",
        "custom",
        "--title",
        "Kids Tee",
        "--sku",
        "OVERRIDE-2",
        "--preset",
        "ocean",
    ]);
    let data = serde_json::from_str(CHART_JSON).expect("json");
    let session = build_session(PresetStore::in_memory(), data, &args).expect("session");

    assert_eq!(session.sku(), Some("OVERRIDE-2"));
    assert_eq!(session.style().title, "Kids Tee");
    assert_eq!(session.brand().map(|b| b.id.as_str()), Some("custom"));
    assert_eq!(session.style().header_color.as_deref(), Some("#0ea5e9"));
    assert_eq!(session.table().published().cell(1, "CHEST"), Some("40"));
}

#[test]
fn test_unknown_brand_and_preset_are_errors() {
    let data = || serde_json::from_str::<ExtractionResult>(CHART_JSON).expect("json");
    let err = build_session(
        PresetStore::in_memory(),
        data(),
        &render_args(&["c.json", "--brand", "nope"]),
    )
    .expect_err("unknown brand");
    assert!(err.to_string().contains("unknown brand"));

    let err = build_session(
        PresetStore::in_memory(),
        data(),
        &render_args(&["c.json", "--preset", "Plaid"]),
    )
    .expect_err("unknown preset");
    assert!(err.to_string().contains("unknown preset"));
}

#[test]
fn test_saved_preset_persists_in_data_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = render_args(&["c.json", "--preset", "forest", "--save-preset", "My Forest"]);
    let store = preset_store(Some(dir.path())).expect("store");
    build_session(store, serde_json::from_str(CHART_JSON).expect("json"), &args).expect("session");

    let reopened = preset_store(Some(dir.path())).expect("store");
    let saved = reopened.list::<ColorPreset>();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "My Forest");
    assert!(preset_lines(&reopened).iter().any(|l| l.contains("My Forest")));

    // The saved preset can be applied by name.
    let args = render_args(&["c.json", "--preset", "my forest"]);
    build_session(reopened, serde_json::from_str(CHART_JSON).expect("json"), &args)
        .expect("apply saved");
}

// ==========================================================================
// Export
// ==========================================================================

#[test]
fn test_svg_export_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");
    let out_str = out.to_string_lossy().to_string();
    let args = render_args(&["c.json", "--format", "svg", "--output-dir", &out_str]);
    assert_eq!(args.format, OutputFormat::Svg);

    let session = build_session(
        PresetStore::in_memory(),
        serde_json::from_str(CHART_JSON).expect("json"),
        &args,
    )
    .expect("session");
    let path = write_export(&session, &args, date()).expect("export");

    assert_eq!(path, out.join("TS-01-2024-03-09.svg"));
    let svg = std::fs::read_to_string(path).expect("read");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(">40</text>"));
}

#[test]
fn test_svg_export_keeps_jpeg_in_sku() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_str = dir.path().to_string_lossy().to_string();
    let args = render_args(&[
        "c.json",
        "--sku",
        "A.jpeg",
        "--format",
        "svg",
        "--output-dir",
        &out_str,
    ]);
    let session = build_session(
        PresetStore::in_memory(),
        serde_json::from_str(CHART_JSON).expect("json"),
        &args,
    )
    .expect("session");
    let path = write_export(&session, &args, date()).expect("export");

    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("A.jpeg-2024-03-09.svg"));
}

#[test]
fn test_jpeg_export_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_str = dir.path().to_string_lossy().to_string();
    let args = render_args(&["c.json", "--pixel-ratio", "0.25", "--output-dir", &out_str]);
    let session = build_session(
        PresetStore::in_memory(),
        serde_json::from_str(CHART_JSON).expect("json"),
        &args,
    )
    .expect("session");
    let path = write_export(&session, &args, date()).expect("export");

    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("TS-01-2024-03-09.jpeg"));
    let bytes = std::fs::read(path).expect("read");
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
}

// ==========================================================================
// Listings
// ==========================================================================

#[test]
fn test_listings() {
    assert!(brand_lines().iter().any(|l| l.starts_with("custom\t")));
    let lines = preset_lines(&PresetStore::in_memory());
    assert!(lines.iter().any(|l| l.starts_with("colour\tclassic\tClassic")));
    assert!(lines.iter().any(|l| l.starts_with("background\t")));
}
