//! # Size Chart Renderer
//!
//! Turns a chart session into a visual tree and, for export, into a
//! canonical-size JPEG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   compose(mode)   ┌─────────────┐
//! │ ChartSession │ ────────────────▶ │ VisualTree  │──▶ HitMap (interactive)
//! └──────────────┘                   └──────┬──────┘
//!                                           │ to_svg(filter)
//!                                           ▼
//!                         usvg ─▶ resvg/tiny-skia ─▶ JPEG
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compose;
pub mod error;
pub mod export;
pub mod raster;
pub mod svg;

pub use compose::{
    compose, ChartLayout, ComposeInput, LogoBox, Node, NodeKind, NodeRole, NodeTransform,
    RenderMode, VisualTree,
};
pub use error::{RenderError, RenderResult};
pub use export::{export_file_name, ExportConfig, ExportNormalizer, ExportedImage};
pub use raster::{RasterOptions, Rasterizer, SvgRasterizer};
pub use svg::{exclude_ui, include_all, to_svg, NodeFilter};
