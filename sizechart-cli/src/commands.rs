//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use sizechart_core::{
    catalog, find_brand, BackgroundPreset, ChartSession, ColorPreset, ExtractionResult,
    ImagePayload, PresetStore,
};
use sizechart_extract::{build_extractor, ExtractorConfig};
use sizechart_renderer::{ExportConfig, ExportNormalizer};

use crate::{OutputFormat, RenderArgs};

/// Read an image file into a payload.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_image(path: &Path) -> Result<ImagePayload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Ok(ImagePayload::new(bytes, ImagePayload::mime_for_extension(ext)))
}

/// Run the configured extractor on an image.
///
/// # Errors
///
/// Returns an error if the image cannot be read or extraction fails.
pub async fn extract(config: &ExtractorConfig, image_path: &Path) -> Result<ExtractionResult> {
    let image = load_image(image_path)?;
    let extractor = build_extractor(config)?;
    tracing::info!(extractor = extractor.name(), image = %image_path.display(), "Extracting");
    let result = extractor.extract(&image).await?;
    tracing::info!(
        headers = result.headers.len(),
        rows = result.rows.len(),
        "Extraction finished"
    );
    Ok(result)
}

/// Obtain chart data for `input`: parse it when it is extraction JSON,
/// otherwise send it to the extraction service.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or extraction fails.
pub async fn chart_data(config: &ExtractorConfig, input: &Path) -> Result<ExtractionResult> {
    let is_json = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("reading {}", input.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))
    } else {
        extract(config, input).await
    }
}

/// Open the preset store, on disk when a data directory is configured.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub fn preset_store(data_dir: Option<&Path>) -> Result<PresetStore> {
    match data_dir {
        Some(dir) => PresetStore::with_data_dir(dir)
            .with_context(|| format!("opening preset directory {}", dir.display())),
        None => Ok(PresetStore::in_memory()),
    }
}

/// Build a session from chart data and render options.
///
/// # Errors
///
/// Returns an error for an unknown brand or preset.
pub fn build_session(
    store: PresetStore,
    data: ExtractionResult,
    args: &RenderArgs,
) -> Result<ChartSession> {
    let mut session = ChartSession::with_presets(store);
    session.load_extraction(data);

    if let Some(id) = &args.brand {
        let brand = find_brand(id).ok_or_else(|| anyhow!("unknown brand: {id}"))?;
        session.set_brand(Some(brand));
    }
    if let Some(logo) = &args.logo {
        session.set_custom_logo(logo.clone());
    }
    if let Some(title) = &args.title {
        session.set_title(title);
    }
    if let Some(sku) = &args.sku {
        session.set_sku(sku);
    }
    if let Some(name) = &args.preset {
        apply_preset(&mut session, name)?;
    }
    if let Some(background) = &args.background {
        session.set_background(Some(background.clone()));
    }
    if let Some(name) = &args.save_preset {
        let saved = session.save_color_preset(name)?;
        tracing::info!(id = %saved.id, name = %saved.name, "Saved colour preset");
    }
    Ok(session)
}

fn matches_preset(id: &str, name: &str, wanted: &str) -> bool {
    id.eq_ignore_ascii_case(wanted) || name.eq_ignore_ascii_case(wanted)
}

/// Apply a colour or background preset, built-in or saved.
///
/// # Errors
///
/// Returns an error if no preset has that id or name.
pub fn apply_preset(session: &mut ChartSession, wanted: &str) -> Result<()> {
    let colors = ColorPreset::builtin()
        .into_iter()
        .chain(session.presets().list::<ColorPreset>())
        .find(|p| matches_preset(&p.id, &p.name, wanted));
    if let Some(preset) = colors {
        session.apply_color_preset(&preset);
        return Ok(());
    }

    let background = BackgroundPreset::builtin()
        .into_iter()
        .chain(session.presets().list::<BackgroundPreset>())
        .find(|p| matches_preset(&p.id, &p.name, wanted));
    match background {
        Some(preset) => {
            session.apply_background_preset(&preset);
            Ok(())
        }
        None => bail!("unknown preset: {wanted}"),
    }
}

/// Export a session into `output_dir`, returning the written path.
///
/// # Errors
///
/// Returns an error if export or writing the file fails.
pub fn write_export(
    session: &ChartSession,
    args: &RenderArgs,
    date: NaiveDate,
) -> Result<PathBuf> {
    let config = ExportConfig {
        pixel_ratio: args.pixel_ratio,
        quality: args.quality,
        resources_dir: std::env::current_dir().ok(),
        ..ExportConfig::default()
    };
    let normalizer = ExportNormalizer::from_config(config);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let (file_name, bytes) = match args.format {
        OutputFormat::Jpeg => {
            let image = normalizer.export(session, date)?;
            (image.file_name, image.bytes)
        }
        OutputFormat::Svg => {
            let svg = normalizer.export_svg(session)?;
            let name = sizechart_renderer::export_file_name(session.brand(), session.sku(), date);
            let stem = name.strip_suffix(".jpeg").unwrap_or(&name);
            (format!("{stem}.svg"), svg.into_bytes())
        }
    };

    let path = args.output_dir.join(file_name);
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Export written");
    Ok(path)
}

/// Catalog lines: `id<TAB>name`.
#[must_use]
pub fn brand_lines() -> Vec<String> {
    catalog()
        .into_iter()
        .map(|b| format!("{}\t{}", b.id, b.name))
        .collect()
}

/// Preset lines, built-ins first, tagged by kind.
#[must_use]
pub fn preset_lines(store: &PresetStore) -> Vec<String> {
    let colors = ColorPreset::builtin()
        .into_iter()
        .chain(store.list::<ColorPreset>())
        .map(|p| {
            format!(
                "colour\t{}\t{}\t{} {} {}",
                p.id, p.name, p.header_color, p.row_color, p.text_color
            )
        });
    let backgrounds = BackgroundPreset::builtin()
        .into_iter()
        .chain(store.list::<BackgroundPreset>())
        .map(|p| format!("background\t{}\t{}\t{}", p.id, p.name, p.background_path));
    colors.chain(backgrounds).collect()
}
