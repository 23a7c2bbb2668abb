//! # Size Chart Core
//!
//! Editing engine behind the size chart designer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                sizechart-core               │
//! ├─────────────────────────────────────────────┤
//! │  Transform Model   │  Gesture Controller    │
//! │  - Element ids     │  - Move + center snap  │
//! │  - x/y/scale/rot   │  - Handle scale/rotate │
//! │  - Alignment       │  - Frame coalescing    │
//! ├─────────────────────────────────────────────┤
//! │  Table Store       │  Inline Text Editor    │
//! │  - Headers + rows  │  - Display / Editing   │
//! │  - Undo / redo     │  - Commit / revert     │
//! ├─────────────────────────────────────────────┤
//! │  Chart Session (single owner of all state)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and single-owner. The only suspension
//! points live behind the [`Extractor`] contract.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod brand;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod extraction;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod notes;
pub mod presets;
pub mod scene;
pub mod session;
pub mod store;
pub mod style;
pub mod table;
pub mod transform;

pub use brand::{catalog, find_brand, Brand, BrandColors, CUSTOM_BRAND_ID};
pub use editor::{EditOutcome, EditorState, InlineTextEditor, TextTarget};
pub use element::{ElementId, ElementTransform, TransformPatch};
pub use error::{ChartError, ChartResult};
pub use event::{InputEvent, Key, KeyEvent, KeyModifiers, PointerEvent, PointerPhase};
pub use extraction::{
    ExtractionError, ExtractionErrorKind, ExtractionResult, Extractor, FallbackExtractor,
    ImagePayload,
};
pub use geometry::{Point, Rect};
pub use gesture::{
    DragKind, GestureController, GestureState, PressOutcome, SnapGuide, SNAP_THRESHOLD,
};
pub use history::EditHistory;
pub use notes::NotesBlock;
pub use presets::{
    BackgroundPreset, ColorPreset, FileStorage, KeyValueStorage, MemoryStorage, Preset, PresetStore,
};
pub use scene::{ControlKind, HandlePosition, HitMap, HitRegion, HitRole};
pub use session::{ChartSession, ExtractionStatus, ExtractionTicket, SessionAction, ViewState};
pub use store::TableStore;
pub use style::ChartStyle;
pub use table::{Row, RowId, TableData};
pub use transform::{Alignment, TransformModel};

/// Side length of the canonical square canvas, in logical units.
pub const CANVAS_SIZE: f32 = 1080.0;

/// Size chart core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
