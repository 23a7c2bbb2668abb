//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while composing or exporting a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Export was requested before any chart was generated.
    #[error("No active chart to export")]
    NoChart,

    /// The composed tree has no drawable canvas.
    #[error("Canvas root missing or empty: {0}")]
    MissingCanvasRoot(String),

    /// The serialized SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// The rasterizer failed to produce pixels.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Encoding the output image failed.
    #[error("Export failed: {0}")]
    Export(String),
}
