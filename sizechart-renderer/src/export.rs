//! Canonical-size export of a chart session.
//!
//! Export composes the session on the [`RenderMode::Export`] path, so the live
//! session is only ever borrowed immutably: there is nothing to snapshot and
//! nothing to restore, whether rasterization succeeds or fails.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use sizechart_core::{Brand, ChartSession};

use crate::compose::{compose, ComposeInput, LogoBox, RenderMode, VisualTree};
use crate::error::{RenderError, RenderResult};
use crate::raster::{RasterOptions, Rasterizer, SvgRasterizer};
use crate::svg::{exclude_ui, to_svg};

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Canonical output size in logical units (square).
    pub size: u32,
    /// Supersampling factor.
    pub pixel_ratio: f32,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// Box logos are fitted into.
    pub logo_box: LogoBox,
    /// Directory relative image references resolve against.
    pub resources_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: 1080,
            pixel_ratio: 2.0,
            quality: 0.95,
            logo_box: LogoBox::default(),
            resources_dir: None,
        }
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Encoded JPEG.
    pub bytes: Vec<u8>,
    /// Suggested download name.
    pub file_name: String,
    /// Physical width in pixels.
    pub width: u32,
    /// Physical height in pixels.
    pub height: u32,
}

impl ExportedImage {
    /// MIME type of the bytes.
    pub const MIME: &'static str = "image/jpeg";

    /// Encode as a base64 data URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MIME, STANDARD.encode(&self.bytes))
    }
}

/// Renders a session at canonical size and encodes it.
pub struct ExportNormalizer<R = SvgRasterizer> {
    config: ExportConfig,
    rasterizer: R,
}

impl ExportNormalizer<SvgRasterizer> {
    /// Create a normalizer with the resvg rasterizer.
    #[must_use]
    pub fn from_config(config: ExportConfig) -> Self {
        let rasterizer = SvgRasterizer::new(config.resources_dir.clone());
        Self::new(config, rasterizer)
    }

    /// Create a normalizer with default settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_config(ExportConfig::default())
    }
}

impl<R: Rasterizer> ExportNormalizer<R> {
    /// Create a normalizer with a custom rasterizer.
    #[must_use]
    pub fn new(config: ExportConfig, rasterizer: R) -> Self {
        Self { config, rasterizer }
    }

    /// Export settings.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The rasterizer in use.
    #[must_use]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Compose the export tree for a session.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoChart`] if the session has no chart yet.
    pub fn compose(&self, session: &ChartSession) -> RenderResult<VisualTree> {
        if !session.has_chart() {
            return Err(RenderError::NoChart);
        }
        let mut input = ComposeInput::from_session(session);
        input.logo_box = self.config.logo_box;
        Ok(compose(&input, RenderMode::Export))
    }

    /// Rasterizer options for a session.
    #[must_use]
    pub fn raster_options(&self, session: &ChartSession) -> RasterOptions {
        RasterOptions {
            width: self.config.size,
            height: self.config.size,
            pixel_ratio: self.config.pixel_ratio,
            quality: self.config.quality,
            // A template must show through unobstructed.
            background_color: if session.has_template() {
                None
            } else {
                Some("#ffffff".to_string())
            },
        }
    }

    /// Export the session as a JPEG named for `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no chart or rasterization fails.
    pub fn export(&self, session: &ChartSession, date: NaiveDate) -> RenderResult<ExportedImage> {
        let tree = self.compose(session)?;
        let options = self.raster_options(session);
        let (width, height) = options.physical_size();

        let bytes = self
            .rasterizer
            .rasterize(&tree, &options, &exclude_ui)
            .inspect_err(|e| tracing::warn!("Export failed: {e}"))?;

        let file_name = export_file_name(session.brand(), session.sku(), date);
        tracing::info!(%file_name, width, height, bytes = bytes.len(), "Chart exported");

        Ok(ExportedImage {
            bytes,
            file_name,
            width,
            height,
        })
    }

    /// Export the session as an SVG document at the canonical size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoChart`] if the session has no chart yet.
    #[allow(clippy::cast_precision_loss)]
    pub fn export_svg(&self, session: &ChartSession) -> RenderResult<String> {
        let tree = self.compose(session)?;
        let size = self.config.size as f32;
        Ok(to_svg(&tree, size, size, &exclude_ui))
    }
}

/// Download name: `{brand-}{sku-}{date}.jpeg`, or `size-chart-{date}.jpeg`
/// when neither brand nor SKU is set.
#[must_use]
pub fn export_file_name(brand: Option<&Brand>, sku: Option<&str>, date: NaiveDate) -> String {
    let mut name = String::new();
    if let Some(brand) = brand.filter(|b| !b.name.trim().is_empty()) {
        name.push_str(&file_safe(&brand.name));
        name.push('-');
    }
    if let Some(sku) = sku.map(str::trim).filter(|s| !s.is_empty()) {
        name.push_str(&file_safe(sku));
        name.push('-');
    }
    if name.is_empty() {
        name.push_str("size-chart-");
    }
    name.push_str(&date.format("%Y-%m-%d").to_string());
    name.push_str(".jpeg");
    name
}

fn file_safe(part: &str) -> String {
    part.trim().replace(['/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizechart_core::find_brand;
    use sizechart_core::TableData;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    fn acme() -> Brand {
        let mut brand = find_brand("custom").expect("custom brand");
        brand.name = "Acme".to_string();
        brand
    }

    #[test]
    fn test_file_name_rule() {
        assert_eq!(
            export_file_name(Some(&acme()), Some("123"), date()),
            "Acme-123-2024-01-01.jpeg"
        );
        assert_eq!(export_file_name(None, None, date()), "size-chart-2024-01-01.jpeg");
        assert_eq!(export_file_name(None, Some("123"), date()), "123-2024-01-01.jpeg");
        assert_eq!(export_file_name(Some(&acme()), Some("  "), date()), "Acme-2024-01-01.jpeg");
        assert_eq!(export_file_name(None, Some("A/B"), date()), "A-B-2024-01-01.jpeg");
    }

    #[test]
    fn test_no_chart_is_rejected() {
        let normalizer = ExportNormalizer::with_defaults();
        let err = normalizer
            .export(&ChartSession::new(), date())
            .expect_err("no chart");
        assert!(matches!(err, RenderError::NoChart));
    }

    #[test]
    fn test_backdrop_depends_on_template() {
        let normalizer = ExportNormalizer::with_defaults();
        let mut session = ChartSession::new();
        session.load_table(TableData::placeholder());
        assert_eq!(
            normalizer.raster_options(&session).background_color.as_deref(),
            Some("#ffffff")
        );
        session.set_background(Some("bg.jpg".to_string()));
        assert_eq!(normalizer.raster_options(&session).background_color, None);
    }

    #[test]
    fn test_data_uri() {
        let image = ExportedImage {
            bytes: vec![0xFF, 0xD8],
            file_name: "x.jpeg".to_string(),
            width: 1,
            height: 1,
        };
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9g=");
    }
}
