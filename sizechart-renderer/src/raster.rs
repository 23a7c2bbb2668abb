//! Rasterization of visual trees into JPEG bytes.
//!
//! [`SvgRasterizer`] serialises the tree to SVG (applying the node filter),
//! renders it with resvg into a tiny-skia pixmap at `size × pixel_ratio`,
//! flattens alpha onto the backdrop and encodes a JPEG.

use std::path::PathBuf;
use std::sync::Arc;

use image::ImageEncoder;

use crate::compose::VisualTree;
use crate::error::{RenderError, RenderResult};
use crate::svg::{to_svg, NodeFilter};

/// What the rasterizer is asked to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Output width in logical units.
    pub width: u32,
    /// Output height in logical units.
    pub height: u32,
    /// Supersampling factor. Physical size is `width × pixel_ratio`.
    pub pixel_ratio: f32,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// Opaque backdrop, or `None` for a transparent one.
    pub background_color: Option<String>,
}

impl RasterOptions {
    /// Physical output size in pixels.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        let w = (self.width as f32 * ratio).round() as u32;
        let h = (self.height as f32 * ratio).round() as u32;
        (w.max(1), h.max(1))
    }

    /// JPEG quality on the encoder's 1-100 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

/// Turns a visual tree into image bytes.
pub trait Rasterizer {
    /// Rasterize `tree`, keeping only the nodes `filter` accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be drawn or encoded.
    fn rasterize(
        &self,
        tree: &VisualTree,
        options: &RasterOptions,
        filter: NodeFilter<'_>,
    ) -> RenderResult<Vec<u8>>;
}

/// resvg/tiny-skia rasterizer producing JPEG.
#[derive(Debug, Clone)]
pub struct SvgRasterizer {
    resources_dir: Option<PathBuf>,
    fontdb: Arc<fontdb::Database>,
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SvgRasterizer {
    /// Create a rasterizer resolving relative image references against
    /// `resources_dir`. System fonts are loaded once here.
    #[must_use]
    pub fn new(resources_dir: Option<PathBuf>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "Loaded system fonts");
        Self {
            resources_dir,
            fontdb: Arc::new(db),
        }
    }

    /// Render to a pixmap without encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is empty or the SVG cannot be parsed.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_pixmap(
        &self,
        tree: &VisualTree,
        options: &RasterOptions,
        filter: NodeFilter<'_>,
    ) -> RenderResult<tiny_skia::Pixmap> {
        if tree.width <= 0.0 || tree.height <= 0.0 {
            return Err(RenderError::MissingCanvasRoot(format!(
                "canvas is {}x{}",
                tree.width, tree.height
            )));
        }
        if options.width == 0 || options.height == 0 {
            return Err(RenderError::MissingCanvasRoot(format!(
                "requested {}x{}",
                options.width, options.height
            )));
        }

        let svg = to_svg(
            tree,
            options.width as f32,
            options.height as f32,
            filter,
        );

        let mut opt = usvg::Options {
            resources_dir: self.resources_dir.clone(),
            ..usvg::Options::default()
        };
        opt.fontdb = Arc::clone(&self.fontdb);
        let parsed = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let (px_w, px_h) = options.physical_size();
        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Rasterize(format!("cannot allocate {px_w}x{px_h} pixmap")))?;

        if let Some(color) = options.background_color.as_deref() {
            let [r, g, b] = parse_hex_color(color).ok_or_else(|| {
                RenderError::Rasterize(format!("unsupported background color: {color}"))
            })?;
            pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
        }

        let sx = px_w as f32 / parsed.size().width();
        let sy = px_h as f32 / parsed.size().height();
        resvg::render(
            &parsed,
            tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );

        Ok(pixmap)
    }
}

impl Rasterizer for SvgRasterizer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(
        &self,
        tree: &VisualTree,
        options: &RasterOptions,
        filter: NodeFilter<'_>,
    ) -> RenderResult<Vec<u8>> {
        let pixmap = self.render_pixmap(tree, options, filter)?;
        let (width, height) = (pixmap.width(), pixmap.height());

        // JPEG has no alpha; anything left transparent lands on white.
        let bg = options
            .background_color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or([255, 255, 255]);
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            let alpha = f32::from(c.alpha()) / 255.0;
            let inv = 1.0 - alpha;
            rgb.push(f32::from(c.red()).mul_add(alpha, f32::from(bg[0]) * inv) as u8);
            rgb.push(f32::from(c.green()).mul_add(alpha, f32::from(bg[1]) * inv) as u8);
            rgb.push(f32::from(c.blue()).mul_add(alpha, f32::from(bg[2]) * inv) as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality());
        encoder
            .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        tracing::debug!(width, height, bytes = buf.get_ref().len(), "JPEG encoded");
        Ok(buf.into_inner())
    }
}

/// Parse `#rgb` or `#rrggbb`.
#[must_use]
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0; 3];
            for (slot, c) in out.iter_mut().zip(hex.chars()) {
                let v = channel(&c.to_string())?;
                *slot = v * 17;
            }
            Some(out)
        }
        6 => Some([
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose, ComposeInput, RenderMode};
    use crate::svg::{exclude_ui, include_all};
    use sizechart_core::{ChartSession, TableData};

    fn tree() -> VisualTree {
        let mut session = ChartSession::new();
        session.load_table(TableData::placeholder());
        compose(&ComposeInput::from_session(&session), RenderMode::Export)
    }

    fn options(width: u32, ratio: f32) -> RasterOptions {
        RasterOptions {
            width,
            height: width,
            pixel_ratio: ratio,
            quality: 0.95,
            background_color: Some("#ffffff".to_string()),
        }
    }

    #[test]
    fn test_physical_size() {
        assert_eq!(options(1080, 2.0).physical_size(), (2160, 2160));
        assert_eq!(options(100, 0.0).physical_size(), (100, 100));
        assert_eq!(options(1080, 2.0).jpeg_quality(), 95);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffffff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#000"), Some([0, 0, 0]));
        assert_eq!(parse_hex_color("#f3f4f6"), Some([0xf3, 0xf4, 0xf6]));
        assert_eq!(parse_hex_color("rgba(0,0,0,0.5)"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_pixmap_size_follows_ratio() {
        let rasterizer = SvgRasterizer::default();
        let pixmap = rasterizer
            .render_pixmap(&tree(), &options(200, 1.5), &exclude_ui)
            .expect("render");
        assert_eq!((pixmap.width(), pixmap.height()), (300, 300));
    }

    #[test]
    fn test_jpeg_magic_bytes() {
        let rasterizer = SvgRasterizer::default();
        let jpeg = rasterizer
            .rasterize(&tree(), &options(120, 1.0), &include_all)
            .expect("jpeg");
        assert!(jpeg.len() > 2);
        assert_eq!(jpeg[0], 0xFF);
        assert_eq!(jpeg[1], 0xD8);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let rasterizer = SvgRasterizer::default();
        let err = rasterizer
            .rasterize(&tree(), &options(0, 2.0), &include_all)
            .expect_err("empty canvas");
        assert!(matches!(err, RenderError::MissingCanvasRoot(_)));
    }
}
