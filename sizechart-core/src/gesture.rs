//! Direct-manipulation gestures on chart elements.
//!
//! ```text
//! Idle ──press(element)──▶ Dragging{Move}
//!      ──press(handle)───▶ Dragging{Scale | Rotate}
//! Dragging ──motion──▶ pending patch (coalesced) ──frame──▶ TransformModel
//! Dragging ──release─▶ flush + clear guides ──▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, TransformPatch};
use crate::event::KeyModifiers;
use crate::geometry::Point;
use crate::scene::{HandlePosition, HitMap, HitRole};
use crate::transform::TransformModel;

/// Distance from center (logical units) within which a moved element snaps.
pub const SNAP_THRESHOLD: f32 = 10.0;

/// Scale change per unit of pointer displacement on a scale handle.
pub const SCALE_SENSITIVITY: f32 = 0.005;

/// Lower bound on scale produced by the scale handles.
pub const MIN_GESTURE_SCALE: f32 = 0.1;

/// Rotation increment used while Shift is held.
pub const ROTATION_SNAP_DEG: f32 = 45.0;

/// Active center alignment guides during a move.
///
/// `horizontal` is set while the y offset is snapped, `vertical` while the x
/// offset is snapped. The value is the snapped offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    /// Horizontal guide line (y axis snapped).
    pub horizontal: Option<f32>,
    /// Vertical guide line (x axis snapped).
    pub vertical: Option<f32>,
}

impl SnapGuide {
    /// Whether any guide is showing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// What kind of drag is in progress, with the state captured on press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DragKind {
    /// Moving the element.
    Move {
        /// Pointer position minus the element offset at press time.
        grab: (f32, f32),
    },
    /// Scaling with one of the eight handles.
    Scale {
        /// Handle that was grabbed.
        handle: HandlePosition,
        /// Pointer position at press time.
        start: Point,
        /// Element scale at press time.
        start_scale: f32,
    },
    /// Rotating with the rotate handle.
    Rotate {
        /// Element center on the canvas.
        center: Point,
        /// Pointer angle (degrees) relative to `center` at press time.
        start_angle: f32,
        /// Element rotation at press time.
        start_rotation: f32,
    },
}

/// Gesture state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A drag is in progress.
    Dragging {
        /// Target element.
        element: ElementId,
        /// Drag kind and captured origin.
        kind: DragKind,
    },
}

/// How a pointer press was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// A drag started on this element; it becomes the selection.
    Started(ElementId),
    /// Text or a control was hit. No drag; the owning element (if any) is selected.
    Interactive(Option<ElementId>),
    /// Empty canvas was hit.
    Deselect,
}

/// Interprets pointer input into transform mutations.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
    snap: SnapGuide,
    pending: Option<(ElementId, TransformPatch)>,
}

impl GestureController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Active snap guides.
    #[must_use]
    pub fn snap_guide(&self) -> SnapGuide {
        self.snap
    }

    /// Whether a motion is waiting for the next frame.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Classify a press at canvas position `point` and start a drag if it
    /// hit an element body or handle.
    pub fn press(
        &mut self,
        role: &HitRole,
        point: Point,
        hits: &HitMap,
        model: &TransformModel,
    ) -> PressOutcome {
        let (element, kind) = match *role {
            HitRole::Canvas => return PressOutcome::Deselect,
            HitRole::EditableText { element, .. } | HitRole::Control { element, .. } => {
                return PressOutcome::Interactive(element);
            }
            HitRole::Element { element } => {
                let current = model.get(element);
                (
                    element,
                    DragKind::Move {
                        grab: (point.x - current.x, point.y - current.y),
                    },
                )
            }
            HitRole::ScaleHandle { element, handle } => (
                element,
                DragKind::Scale {
                    handle,
                    start: point,
                    start_scale: model.get(element).scale,
                },
            ),
            HitRole::RotateHandle { element } => {
                let center = hits.element_center(element).unwrap_or(point);
                (
                    element,
                    DragKind::Rotate {
                        center,
                        start_angle: angle_deg(center, point),
                        start_rotation: model.get(element).rotation,
                    },
                )
            }
        };

        tracing::debug!(%element, ?kind, "Gesture started");
        self.state = GestureState::Dragging { element, kind };
        self.pending = None;
        self.snap = SnapGuide::default();
        PressOutcome::Started(element)
    }

    /// Feed a pointer move. The resulting patch is held until the next
    /// [`flush_frame`](Self::flush_frame); later moves in the same frame
    /// replace earlier ones.
    pub fn motion(&mut self, point: Point, modifiers: KeyModifiers) -> bool {
        let GestureState::Dragging { element, kind } = self.state else {
            return false;
        };

        let patch = match kind {
            DragKind::Move { grab } => {
                let (x, vertical) = snap_axis(point.x - grab.0);
                let (y, horizontal) = snap_axis(point.y - grab.1);
                self.snap = SnapGuide {
                    horizontal,
                    vertical,
                };
                TransformPatch::position(x, y)
            }
            DragKind::Scale {
                start, start_scale, ..
            } => TransformPatch::scale(scale_for_drag(start, point, start_scale)),
            DragKind::Rotate {
                center,
                start_angle,
                start_rotation,
            } => {
                let mut rotation = start_rotation + (angle_deg(center, point) - start_angle);
                if modifiers.shift {
                    rotation = (rotation / ROTATION_SNAP_DEG).round() * ROTATION_SNAP_DEG;
                }
                TransformPatch::rotation(rotation)
            }
        };

        self.pending = Some(match self.pending {
            Some((id, earlier)) if id == element => (element, earlier.merged(patch)),
            _ => (element, patch),
        });
        true
    }

    /// Commit the coalesced motion of this frame, if any.
    pub fn flush_frame(&mut self, model: &mut TransformModel) -> bool {
        match self.pending.take() {
            Some((element, patch)) => {
                model.set(element, &patch);
                true
            }
            None => false,
        }
    }

    /// End the drag: commit pending motion, clear guides, return to idle.
    pub fn release(&mut self, model: &mut TransformModel) -> Option<ElementId> {
        self.flush_frame(model);
        self.snap = SnapGuide::default();
        match std::mem::take(&mut self.state) {
            GestureState::Dragging { element, .. } => {
                tracing::debug!(%element, "Gesture ended");
                Some(element)
            }
            GestureState::Idle => None,
        }
    }

    /// Abandon the drag without committing pending motion.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.snap = SnapGuide::default();
        self.state = GestureState::Idle;
    }
}

/// Snap an offset to 0 when it is within [`SNAP_THRESHOLD`].
#[must_use]
pub fn snap_axis(candidate: f32) -> (f32, Option<f32>) {
    if candidate.abs() < SNAP_THRESHOLD {
        (0.0, Some(0.0))
    } else {
        (candidate, None)
    }
}

/// Scale produced by dragging a scale handle from `start` to `current`.
///
/// Direction comes from the sign of `dx + dy` and magnitude from the
/// straight-line distance, whichever handle was grabbed.
#[must_use]
pub fn scale_for_drag(start: Point, current: Point, start_scale: f32) -> f32 {
    let (dx, dy) = current.delta_from(start);
    let direction = if dx + dy > 0.0 { 1.0 } else { -1.0 };
    let distance = dx.hypot(dy);
    (start_scale + direction * distance * SCALE_SENSITIVITY).max(MIN_GESTURE_SCALE)
}

fn angle_deg(center: Point, point: Point) -> f32 {
    let (dx, dy) = point.delta_from(center);
    dy.atan2(dx).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementTransform;
    use crate::geometry::Rect;
    use crate::scene::HitRegion;

    fn table_role() -> HitRole {
        HitRole::Element {
            element: ElementId::Table,
        }
    }

    fn hits_with_table() -> HitMap {
        let rect = Rect::new(440.0, 490.0, 200.0, 100.0);
        let mut hits = HitMap::new();
        hits.push(HitRegion::transformed(
            table_role(),
            rect,
            rect.center(),
            ElementTransform::IDENTITY,
        ));
        hits
    }

    #[test]
    fn test_move_coalesces_until_frame() {
        let mut model = TransformModel::new();
        let mut gestures = GestureController::new();
        let hits = hits_with_table();

        let outcome = gestures.press(&table_role(), Point::new(500.0, 500.0), &hits, &model);
        assert_eq!(outcome, PressOutcome::Started(ElementId::Table));

        gestures.motion(Point::new(550.0, 500.0), KeyModifiers::default());
        gestures.motion(Point::new(600.0, 530.0), KeyModifiers::default());
        assert_eq!(model.get(ElementId::Table), ElementTransform::IDENTITY);

        assert!(gestures.flush_frame(&mut model));
        let t = model.get(ElementId::Table);
        assert!((t.x - 100.0).abs() < f32::EPSILON);
        assert!((t.y - 30.0).abs() < f32::EPSILON);
        assert!(!gestures.flush_frame(&mut model));
    }

    #[test]
    fn test_move_snaps_near_center() {
        let mut model = TransformModel::new();
        let mut gestures = GestureController::new();
        gestures.press(&table_role(), Point::new(500.0, 500.0), &hits_with_table(), &model);

        gestures.motion(Point::new(507.0, 560.0), KeyModifiers::default());
        let guide = gestures.snap_guide();
        assert_eq!(guide.vertical, Some(0.0));
        assert_eq!(guide.horizontal, None);

        gestures.release(&mut model);
        let t = model.get(ElementId::Table);
        assert!(t.x.abs() < f32::EPSILON);
        assert!((t.y - 60.0).abs() < f32::EPSILON);
        assert!(!gestures.snap_guide().is_active());
        assert_eq!(gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_scale_formula() {
        let start = Point::new(0.0, 0.0);
        // dx + dy > 0 grows by hypot * 0.005
        let grown = scale_for_drag(start, Point::new(30.0, 40.0), 1.0);
        assert!((grown - 1.25).abs() < 1e-5);
        // Negative direction shrinks
        let shrunk = scale_for_drag(start, Point::new(-30.0, -40.0), 1.0);
        assert!((shrunk - 0.75).abs() < 1e-5);
        // Floor
        let floored = scale_for_drag(start, Point::new(-3000.0, 0.0), 1.0);
        assert!((floored - MIN_GESTURE_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scale_handle_gesture() {
        let mut model = TransformModel::new();
        let mut gestures = GestureController::new();
        let role = HitRole::ScaleHandle {
            element: ElementId::Logo,
            handle: HandlePosition::Nw,
        };
        gestures.press(&role, Point::new(10.0, 10.0), &HitMap::new(), &model);
        gestures.motion(Point::new(110.0, 10.0), KeyModifiers::default());
        gestures.release(&mut model);
        assert!((model.get(ElementId::Logo).scale - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_with_shift_snaps() {
        let mut model = TransformModel::new();
        let mut gestures = GestureController::new();
        let hits = hits_with_table();
        let center = hits.element_center(ElementId::Table).expect("center");
        let role = HitRole::RotateHandle {
            element: ElementId::Table,
        };

        // Start straight above the center (-90 degrees).
        gestures.press(&role, Point::new(center.x, center.y - 100.0), &hits, &model);
        // Move to roughly 50 degrees clockwise.
        let target = Point::new(center.x, center.y - 100.0).rotate_around(center, 50.0);
        gestures.motion(target, KeyModifiers::default());
        gestures.flush_frame(&mut model);
        assert!((model.get(ElementId::Table).rotation - 50.0).abs() < 1e-3);

        gestures.motion(target, KeyModifiers::SHIFT);
        gestures.release(&mut model);
        assert!((model.get(ElementId::Table).rotation - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_text_and_controls_do_not_drag() {
        let model = TransformModel::new();
        let mut gestures = GestureController::new();
        let role = HitRole::EditableText {
            element: Some(ElementId::Note),
            target: crate::editor::TextTarget::NoteTitle,
        };
        let outcome = gestures.press(&role, Point::default(), &HitMap::new(), &model);
        assert_eq!(outcome, PressOutcome::Interactive(Some(ElementId::Note)));
        assert!(!gestures.is_dragging());

        let outcome = gestures.press(&HitRole::Canvas, Point::default(), &HitMap::new(), &model);
        assert_eq!(outcome, PressOutcome::Deselect);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut model = TransformModel::new();
        let mut gestures = GestureController::new();
        gestures.press(&table_role(), Point::new(0.0, 0.0), &hits_with_table(), &model);
        gestures.motion(Point::new(300.0, 300.0), KeyModifiers::default());
        gestures.cancel();
        assert!(!gestures.flush_frame(&mut model));
        assert_eq!(model.get(ElementId::Table), ElementTransform::IDENTITY);
    }
}
