//! Per-element transform state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementTransform, TransformPatch};

/// Offset used by the left/right/top/bottom alignment commands.
pub const ALIGN_OFFSET: f32 = 200.0;

/// Programmatic alignment commands from the layout panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Shift left of center.
    Left,
    /// Center horizontally.
    Center,
    /// Shift right of center.
    Right,
    /// Shift above center.
    Top,
    /// Center vertically.
    Middle,
    /// Shift below center.
    Bottom,
}

impl Alignment {
    /// The partial transform this alignment writes.
    #[must_use]
    pub fn patch(self) -> TransformPatch {
        let (x, y) = match self {
            Self::Left => (Some(-ALIGN_OFFSET), None),
            Self::Center => (Some(0.0), None),
            Self::Right => (Some(ALIGN_OFFSET), None),
            Self::Top => (None, Some(-ALIGN_OFFSET)),
            Self::Middle => (None, Some(0.0)),
            Self::Bottom => (None, Some(ALIGN_OFFSET)),
        };
        TransformPatch {
            x,
            y,
            ..TransformPatch::default()
        }
    }
}

/// Transform state for every element of the active chart.
///
/// [`TransformModel::set`] is the single write path; gestures and alignment
/// commands both go through it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformModel {
    transforms: HashMap<ElementId, ElementTransform>,
}

impl TransformModel {
    /// Create a model where every element sits at its default transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transform of an element (identity if never set).
    #[must_use]
    pub fn get(&self, id: ElementId) -> ElementTransform {
        self.transforms
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.default_transform())
    }

    /// Merge a partial update into an element's transform.
    pub fn set(&mut self, id: ElementId, patch: &TransformPatch) {
        if patch.is_empty() {
            return;
        }
        let entry = self
            .transforms
            .entry(id)
            .or_insert_with(|| id.default_transform());
        entry.apply(patch);
        tracing::trace!(element = %id, ?entry, "Transform updated");
    }

    /// Apply an alignment command to an element.
    pub fn align(&mut self, id: ElementId, alignment: Alignment) {
        self.set(id, &alignment.patch());
    }

    /// Reset every element back to its default transform.
    pub fn reset(&mut self) {
        self.transforms.clear();
    }

    /// Iterate over every element with its effective transform.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, ElementTransform)> + '_ {
        ElementId::ALL.into_iter().map(|id| (id, self.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_is_identity() {
        let model = TransformModel::new();
        for id in ElementId::ALL {
            assert_eq!(model.get(id), ElementTransform::IDENTITY);
        }
    }

    #[test]
    fn test_set_merges_partial() {
        let mut model = TransformModel::new();
        model.set(ElementId::Table, &TransformPatch::position(10.0, 20.0));
        model.set(ElementId::Table, &TransformPatch::scale(1.5));

        let t = model.get(ElementId::Table);
        assert!((t.x - 10.0).abs() < f32::EPSILON);
        assert!((t.y - 20.0).abs() < f32::EPSILON);
        assert!((t.scale - 1.5).abs() < f32::EPSILON);
        assert_eq!(model.get(ElementId::Logo), ElementTransform::IDENTITY);
    }

    #[test]
    fn test_alignment_touches_one_axis() {
        let mut model = TransformModel::new();
        model.set(ElementId::Note, &TransformPatch::position(33.0, 44.0));
        model.align(ElementId::Note, Alignment::Right);
        let t = model.get(ElementId::Note);
        assert!((t.x - ALIGN_OFFSET).abs() < f32::EPSILON);
        assert!((t.y - 44.0).abs() < f32::EPSILON);

        model.align(ElementId::Note, Alignment::Top);
        assert!((model.get(ElementId::Note).y + ALIGN_OFFSET).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut model = TransformModel::new();
        model.set(ElementId::Logo, &TransformPatch::rotation(45.0));
        model.reset();
        assert_eq!(model.get(ElementId::Logo), ElementTransform::IDENTITY);
    }
}
