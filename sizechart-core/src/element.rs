//! Manipulable chart elements and their transforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChartError;

/// Smallest scale a transform may hold. Non-positive requests clamp here.
pub const MIN_SCALE: f32 = 0.01;

/// The fixed set of elements a user can move, scale and rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementId {
    /// Brand logo image.
    Logo,
    /// Optional chart title.
    Title,
    /// The size table.
    Table,
    /// The notes block under the table.
    Note,
}

impl ElementId {
    /// Every element, in document order.
    pub const ALL: [ElementId; 4] = [
        ElementId::Logo,
        ElementId::Title,
        ElementId::Table,
        ElementId::Note,
    ];

    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Title => "title",
            Self::Table => "table",
            Self::Note => "note",
        }
    }

    /// Human readable name for layout controls.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Logo => "Logo",
            Self::Title => "Title",
            Self::Table => "Table",
            Self::Note => "Note",
        }
    }

    /// Transform an element starts with when a chart is generated.
    #[must_use]
    pub const fn default_transform(self) -> ElementTransform {
        ElementTransform::IDENTITY
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementId {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChartError::Validation(format!("unknown element: {s}")))
    }
}

/// Position, scale and rotation of one element.
///
/// `x`/`y` are offsets from the element's laid-out position, so `(0, 0)`
/// means "where the layout put it" and the canvas center guides snap to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementTransform {
    /// Horizontal offset in logical units.
    pub x: f32,
    /// Vertical offset in logical units.
    pub y: f32,
    /// Uniform scale factor (always > 0).
    pub scale: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
}

impl ElementTransform {
    /// The untransformed state.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotation: 0.0,
    };

    /// Merge a partial update, leaving unspecified fields as they are.
    ///
    /// Non-finite values are ignored and non-positive scales clamp to
    /// [`MIN_SCALE`].
    pub fn apply(&mut self, patch: &TransformPatch) {
        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = y;
        }
        if let Some(scale) = patch.scale.filter(|v| !v.is_nan()) {
            self.scale = if scale > 0.0 && scale.is_finite() {
                scale.max(MIN_SCALE)
            } else if scale > 0.0 {
                self.scale
            } else {
                tracing::debug!(scale, "Clamping non-positive scale");
                MIN_SCALE
            };
        }
        if let Some(rotation) = patch.rotation.filter(|v| v.is_finite()) {
            self.rotation = rotation;
        }
    }
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A partial transform update. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    /// New horizontal offset.
    pub x: Option<f32>,
    /// New vertical offset.
    pub y: Option<f32>,
    /// New scale.
    pub scale: Option<f32>,
    /// New rotation in degrees.
    pub rotation: Option<f32>,
}

impl TransformPatch {
    /// Patch that moves to `(x, y)`.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets the scale.
    #[must_use]
    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Patch that sets the rotation.
    #[must_use]
    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.scale.is_none() && self.rotation.is_none()
    }

    /// Overlay `later` on top of `self`, later fields winning.
    #[must_use]
    pub fn merged(self, later: TransformPatch) -> Self {
        Self {
            x: later.x.or(self.x),
            y: later.y.or(self.y),
            scale: later.scale.or(self.scale),
            rotation: later.rotation.or(self.rotation),
        }
    }
}
