//! Typed hit-test map of the composed chart.
//!
//! The renderer records one [`HitRegion`] per interactive part of the visual
//! tree, in paint order. Input handling classifies a pointer position against
//! this map instead of inspecting node attributes, so editable text and
//! buttons never start a drag.

use serde::{Deserialize, Serialize};

use crate::editor::TextTarget;
use crate::element::{ElementId, ElementTransform};
use crate::geometry::{Point, Rect};

/// The eight scale handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    /// Top-left corner.
    Nw,
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
}

impl HandlePosition {
    /// All handles, clockwise from top-left.
    pub const ALL: [HandlePosition; 8] = [
        HandlePosition::Nw,
        HandlePosition::N,
        HandlePosition::Ne,
        HandlePosition::E,
        HandlePosition::Se,
        HandlePosition::S,
        HandlePosition::Sw,
        HandlePosition::W,
    ];

    /// Anchor of the handle on `bounds`.
    #[must_use]
    pub fn anchor(self, bounds: &Rect) -> Point {
        let cx = bounds.x + bounds.width / 2.0;
        let cy = bounds.y + bounds.height / 2.0;
        match self {
            Self::Nw => Point::new(bounds.x, bounds.y),
            Self::N => Point::new(cx, bounds.y),
            Self::Ne => Point::new(bounds.right(), bounds.y),
            Self::E => Point::new(bounds.right(), cy),
            Self::Se => Point::new(bounds.right(), bounds.bottom()),
            Self::S => Point::new(cx, bounds.bottom()),
            Self::Sw => Point::new(bounds.x, bounds.bottom()),
            Self::W => Point::new(bounds.x, cy),
        }
    }
}

/// Buttons rendered inside an element that are not part of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "control", content = "index", rename_all = "snake_case")]
pub enum ControlKind {
    /// "Add line" button under the notes block.
    AddNoteLine,
    /// Remove button next to a note line.
    RemoveNoteLine(usize),
}

/// What a region means to input handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum HitRole {
    /// Empty canvas.
    Canvas,
    /// Body of a manipulable element.
    Element {
        /// Element id.
        element: ElementId,
    },
    /// A scale handle of the selected element.
    ScaleHandle {
        /// Element id.
        element: ElementId,
        /// Which handle.
        handle: HandlePosition,
    },
    /// The rotate handle of the selected element.
    RotateHandle {
        /// Element id.
        element: ElementId,
    },
    /// Text that can be edited in place.
    EditableText {
        /// Element the text belongs to, if any.
        element: Option<ElementId>,
        /// What the text edits.
        target: TextTarget,
    },
    /// A button or other form control.
    Control {
        /// Element the control belongs to, if any.
        element: Option<ElementId>,
        /// Which control.
        control: ControlKind,
    },
}

impl HitRole {
    /// Element this role belongs to.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Canvas => None,
            Self::Element { element }
            | Self::ScaleHandle { element, .. }
            | Self::RotateHandle { element } => Some(*element),
            Self::EditableText { element, .. } | Self::Control { element, .. } => *element,
        }
    }
}

/// One interactive region in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRegion {
    /// Role of the region.
    pub role: HitRole,
    /// Bounds before the owning element's transform is applied.
    pub rect: Rect,
    /// Owning element transform and the pivot it is applied about.
    pub transform: Option<(Point, ElementTransform)>,
}

impl HitRegion {
    /// Region that is not affected by any element transform.
    #[must_use]
    pub fn fixed(role: HitRole, rect: Rect) -> Self {
        Self {
            role,
            rect,
            transform: None,
        }
    }

    /// Region drawn inside an element group transformed about `pivot`.
    #[must_use]
    pub fn transformed(role: HitRole, rect: Rect, pivot: Point, transform: ElementTransform) -> Self {
        Self {
            role,
            rect,
            transform: Some((pivot, transform)),
        }
    }

    /// Map a canvas point into the region's untransformed space.
    #[must_use]
    pub fn to_local(&self, point: Point) -> Point {
        let Some((pivot, t)) = self.transform else {
            return point;
        };
        let translated = Point::new(point.x - t.x, point.y - t.y);
        let unrotated = translated.rotate_around(pivot, -t.rotation);
        Point::new(
            pivot.x + (unrotated.x - pivot.x) / t.scale,
            pivot.y + (unrotated.y - pivot.y) / t.scale,
        )
    }

    /// Whether a canvas point falls inside the region.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.rect.contains(self.to_local(point))
    }

    /// Center of the region after its transform.
    #[must_use]
    pub fn visual_center(&self) -> Point {
        let center = self.rect.center();
        match self.transform {
            Some((pivot, t)) => {
                let scaled = Point::new(
                    pivot.x + (center.x - pivot.x) * t.scale,
                    pivot.y + (center.y - pivot.y) * t.scale,
                );
                let rotated = scaled.rotate_around(pivot, t.rotation);
                Point::new(rotated.x + t.x, rotated.y + t.y)
            }
            None => center,
        }
    }
}

/// Interactive regions in paint order (later regions sit on top).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitMap {
    regions: Vec<HitRegion>,
}

impl HitMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a region above everything already recorded.
    pub fn push(&mut self, region: HitRegion) {
        self.regions.push(region);
    }

    /// All regions in paint order.
    #[must_use]
    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    /// Topmost role under a canvas point.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> HitRole {
        self.regions
            .iter()
            .rev()
            .find(|region| region.contains(point))
            .map_or(HitRole::Canvas, |region| region.role.clone())
    }

    /// On-canvas center of an element body, if it was laid out.
    #[must_use]
    pub fn element_center(&self, id: ElementId) -> Option<Point> {
        self.regions
            .iter()
            .find(|region| region.role == HitRole::Element { element: id })
            .map(HitRegion::visual_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_region(transform: ElementTransform) -> HitRegion {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        HitRegion::transformed(
            HitRole::Element {
                element: ElementId::Table,
            },
            rect,
            rect.center(),
            transform,
        )
    }

    #[test]
    fn test_empty_map_is_canvas() {
        assert_eq!(HitMap::new().hit_test(Point::new(1.0, 1.0)), HitRole::Canvas);
    }

    #[test]
    fn test_topmost_region_wins() {
        let mut map = HitMap::new();
        map.push(table_region(ElementTransform::IDENTITY));
        map.push(HitRegion::fixed(
            HitRole::EditableText {
                element: Some(ElementId::Table),
                target: TextTarget::Header { index: 0 },
            },
            Rect::new(100.0, 100.0, 50.0, 20.0),
        ));

        assert!(matches!(
            map.hit_test(Point::new(110.0, 110.0)),
            HitRole::EditableText { .. }
        ));
        assert_eq!(
            map.hit_test(Point::new(250.0, 150.0)),
            HitRole::Element {
                element: ElementId::Table
            }
        );
    }

    #[test]
    fn test_translated_region() {
        let region = table_region(ElementTransform {
            x: 500.0,
            ..ElementTransform::IDENTITY
        });
        assert!(!region.contains(Point::new(150.0, 150.0)));
        assert!(region.contains(Point::new(650.0, 150.0)));
    }

    #[test]
    fn test_scaled_region() {
        let region = table_region(ElementTransform {
            scale: 2.0,
            ..ElementTransform::IDENTITY
        });
        // Center (200,150); doubled width reaches x = 0..400.
        assert!(region.contains(Point::new(5.0, 150.0)));
        assert!(!region.contains(Point::new(5.0, 260.0)));
    }

    #[test]
    fn test_rotated_region() {
        let region = table_region(ElementTransform {
            rotation: 90.0,
            ..ElementTransform::IDENTITY
        });
        // After a quarter turn the box spans y = 50..250, x = 150..250.
        assert!(region.contains(Point::new(200.0, 60.0)));
        assert!(!region.contains(Point::new(110.0, 150.0)));
    }

    #[test]
    fn test_element_center_includes_offset() {
        let mut map = HitMap::new();
        map.push(table_region(ElementTransform {
            x: 10.0,
            y: -20.0,
            ..ElementTransform::IDENTITY
        }));
        let center = map.element_center(ElementId::Table).expect("center");
        assert!((center.x - 210.0).abs() < 1e-4);
        assert!((center.y - 130.0).abs() < 1e-4);
        assert!(map.element_center(ElementId::Logo).is_none());
    }
}
