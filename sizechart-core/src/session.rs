//! The chart session: single owner of all editing state.
//!
//! A [`ChartSession`] is created once per chart and passed by reference to
//! whatever needs to read or write it. Input events come in through
//! [`ChartSession::handle_input`]; commands from panels (alignment, colors,
//! presets, brand) are plain methods.

use serde::{Deserialize, Serialize};

use crate::brand::{Brand, BrandColors, CUSTOM_BRAND_ID};
use crate::editor::{EditOutcome, InlineTextEditor, TextTarget};
use crate::element::{ElementId, TransformPatch};
use crate::error::{ChartError, ChartResult};
use crate::event::{InputEvent, Key, KeyEvent, PointerEvent, PointerPhase};
use crate::extraction::{ExtractionError, ExtractionResult, Extractor, ImagePayload};
use crate::geometry::Point;
use crate::gesture::{GestureController, GestureState, PressOutcome, SnapGuide};
use crate::notes::NotesBlock;
use crate::presets::{BackgroundPreset, ColorPreset, PresetStore};
use crate::scene::{ControlKind, HitMap, HitRole};
use crate::store::TableStore;
use crate::style::ChartStyle;
use crate::table::TableData;
use crate::transform::{Alignment, TransformModel};

/// Default display zoom of the interactive preview.
pub const DEFAULT_ZOOM: f32 = 0.8;

/// Display-only zoom and scroll of the interactive preview.
///
/// Never affects composition; the renderer applies it as an outer
/// transform in interactive mode only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Zoom factor (screen units per canvas unit).
    pub zoom: f32,
    /// Screen position of the canvas origin.
    pub scroll_offset: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            scroll_offset: Point::default(),
        }
    }
}

impl ViewState {
    /// Convert a screen position to canvas coordinates.
    #[must_use]
    pub fn to_canvas(&self, screen: Point) -> Point {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Point::new(
            (screen.x - self.scroll_offset.x) / zoom,
            (screen.y - self.scroll_offset.y) / zoom,
        )
    }

    /// Convert a canvas position to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.scroll_offset.x,
            canvas.y * self.zoom + self.scroll_offset.y,
        )
    }
}

/// Handle for one extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractionTicket(u64);

/// What happened to a completed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// The result was loaded into the session.
    Applied,
    /// The request was cancelled or superseded; the result was dropped.
    Discarded,
    /// Extraction failed; the source image is kept for a retry.
    Failed(ExtractionError),
}

#[derive(Debug, Default)]
struct ExtractionState {
    next_ticket: u64,
    active: Option<ExtractionTicket>,
    source: Option<ImagePayload>,
    last_error: Option<ExtractionError>,
}

/// Something the host should react to after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Selection moved to a new element (or none).
    SelectionChanged(Option<ElementId>),
    /// Hovered element changed.
    HoverChanged(Option<ElementId>),
    /// A transform was committed to the model.
    TransformCommitted(ElementId),
    /// Snap guides changed during a move.
    SnapChanged(SnapGuide),
    /// An inline input opened.
    EditStarted(TextTarget),
    /// An inline edit was written back.
    TextCommitted(TextTarget),
    /// An inline edit closed without changes.
    EditClosed(TextTarget),
    /// A note line was added at this index.
    NoteLineAdded(usize),
    /// A note line was removed at this index.
    NoteLineRemoved(usize),
    /// Table data changed through a shortcut.
    TableChanged,
    /// A local validation failure to show inline.
    Rejected(String),
}

/// All editing state for one chart.
#[derive(Debug)]
pub struct ChartSession {
    transforms: TransformModel,
    style: ChartStyle,
    table: TableStore,
    brand: Option<Brand>,
    background: Option<String>,
    sku: Option<String>,
    selection: Option<ElementId>,
    hovered: Option<ElementId>,
    gestures: GestureController,
    editor: InlineTextEditor,
    view: ViewState,
    presets: PresetStore,
    extraction: ExtractionState,
    has_chart: bool,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSession {
    /// Create an empty session with in-memory presets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_presets(PresetStore::in_memory())
    }

    /// Create an empty session using the given preset store.
    #[must_use]
    pub fn with_presets(presets: PresetStore) -> Self {
        Self {
            transforms: TransformModel::new(),
            style: ChartStyle::default(),
            table: TableStore::default(),
            brand: None,
            background: None,
            sku: None,
            selection: None,
            hovered: None,
            gestures: GestureController::new(),
            editor: InlineTextEditor::new(),
            view: ViewState::default(),
            presets,
            extraction: ExtractionState::default(),
            has_chart: false,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Element transforms.
    #[must_use]
    pub fn transforms(&self) -> &TransformModel {
        &self.transforms
    }

    /// Chart style.
    #[must_use]
    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Table store.
    #[must_use]
    pub fn table(&self) -> &TableStore {
        &self.table
    }

    /// Mutable table store, for the data grid.
    pub fn table_mut(&mut self) -> &mut TableStore {
        &mut self.table
    }

    /// Selected brand.
    #[must_use]
    pub fn brand(&self) -> Option<&Brand> {
        self.brand.as_ref()
    }

    /// Palette of the selected brand, or the neutral palette.
    #[must_use]
    pub fn brand_colors(&self) -> BrandColors {
        self.brand
            .as_ref()
            .map_or_else(BrandColors::neutral, |b| b.colors.clone())
    }

    /// Background template reference.
    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Whether a background template is active.
    #[must_use]
    pub fn has_template(&self) -> bool {
        self.background.is_some()
    }

    /// SKU label.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    /// Selected element.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// Hovered element.
    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Active snap guides.
    #[must_use]
    pub fn snap_guide(&self) -> SnapGuide {
        self.gestures.snap_guide()
    }

    /// Gesture state.
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// Inline editor.
    #[must_use]
    pub fn editor(&self) -> &InlineTextEditor {
        &self.editor
    }

    /// Display zoom and scroll.
    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Preset store.
    #[must_use]
    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    /// Whether a chart has been generated.
    #[must_use]
    pub fn has_chart(&self) -> bool {
        self.has_chart
    }

    /// Whether an extraction is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.extraction.active.is_some()
    }

    /// Error of the last failed extraction.
    #[must_use]
    pub fn last_extraction_error(&self) -> Option<&ExtractionError> {
        self.extraction.last_error.as_ref()
    }

    /// Image of the last extraction request.
    #[must_use]
    pub fn extraction_source(&self) -> Option<&ImagePayload> {
        self.extraction.source.as_ref()
    }

    // ------------------------------------------------------------------
    // Chart lifecycle
    // ------------------------------------------------------------------

    /// Generate a chart from an extraction result.
    ///
    /// Transforms reset to defaults and table history restarts.
    pub fn load_extraction(&mut self, result: ExtractionResult) {
        self.load_table(result.to_table());
        self.style.notes_content = Some(result.notes.unwrap_or_default());
        if let Some(sku) = result.sku.filter(|s| !s.trim().is_empty()) {
            self.sku = Some(sku);
        }
    }

    /// Generate a chart from a table.
    pub fn load_table(&mut self, table: TableData) {
        self.gestures.cancel();
        self.editor = InlineTextEditor::new();
        self.transforms.reset();
        self.selection = None;
        self.hovered = None;
        self.table.load(table);
        self.has_chart = true;
    }

    // ------------------------------------------------------------------
    // Extraction lifecycle
    // ------------------------------------------------------------------

    /// Start an extraction. Any earlier request is superseded.
    pub fn begin_extraction(&mut self, image: ImagePayload) -> ExtractionTicket {
        self.extraction.next_ticket += 1;
        let ticket = ExtractionTicket(self.extraction.next_ticket);
        tracing::info!(ticket = ticket.0, ?image, "Extraction started");
        self.extraction.active = Some(ticket);
        self.extraction.source = Some(image);
        self.extraction.last_error = None;
        ticket
    }

    /// Stop waiting for the active extraction. A late result is dropped.
    pub fn cancel_extraction(&mut self) {
        if let Some(ticket) = self.extraction.active.take() {
            tracing::info!(ticket = ticket.0, "Extraction cancelled");
        }
    }

    /// Deliver the outcome of an extraction request.
    pub fn complete_extraction(
        &mut self,
        ticket: ExtractionTicket,
        outcome: Result<ExtractionResult, ExtractionError>,
    ) -> ExtractionStatus {
        if self.extraction.active != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "Dropping stale extraction result");
            return ExtractionStatus::Discarded;
        }
        self.extraction.active = None;
        match outcome {
            Ok(result) => {
                self.load_extraction(result);
                ExtractionStatus::Applied
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, "Extraction failed: {e}");
                self.extraction.last_error = Some(e.clone());
                ExtractionStatus::Failed(e)
            }
        }
    }

    /// Start a new request for the last source image.
    pub fn retry_extraction(&mut self) -> Option<(ExtractionTicket, ImagePayload)> {
        let image = self.extraction.source.clone()?;
        let ticket = self.begin_extraction(image.clone());
        Some((ticket, image))
    }

    /// Run one extraction to completion.
    pub async fn extract_with<E: Extractor + ?Sized>(
        &mut self,
        extractor: &E,
        image: ImagePayload,
    ) -> ExtractionStatus {
        let ticket = self.begin_extraction(image.clone());
        let outcome = extractor.extract(&image).await;
        self.complete_extraction(ticket, outcome)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Select an element, or clear the selection.
    pub fn select(&mut self, element: Option<ElementId>) -> bool {
        if self.selection == element {
            return false;
        }
        tracing::debug!(?element, "Selection changed");
        self.selection = element;
        true
    }

    /// Merge a partial transform into an element.
    pub fn set_transform(&mut self, element: ElementId, patch: &TransformPatch) {
        self.transforms.set(element, patch);
    }

    /// Align the selected element. No-op without a selection.
    pub fn align(&mut self, alignment: Alignment) -> bool {
        let Some(element) = self.selection else {
            return false;
        };
        self.transforms.align(element, alignment);
        true
    }

    /// Set the scale of the selected element. No-op without a selection.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let Some(element) = self.selection else {
            return false;
        };
        self.transforms.set(element, &TransformPatch::scale(scale));
        true
    }

    /// Change the zoom and scroll of the preview.
    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    /// Choose a brand, or none.
    pub fn set_brand(&mut self, brand: Option<Brand>) {
        tracing::debug!(brand = ?brand.as_ref().map(|b| &b.id), "Brand changed");
        self.brand = brand;
    }

    /// Use an uploaded logo with the custom brand.
    pub fn set_custom_logo(&mut self, logo: impl Into<String>) {
        let brand = crate::brand::find_brand(CUSTOM_BRAND_ID)
            .map(|b| b.with_logo(logo));
        self.brand = brand;
    }

    /// Choose a background template, or none.
    pub fn set_background(&mut self, background: Option<String>) {
        self.background = background;
    }

    /// Set the SKU label. Blank clears it.
    pub fn set_sku(&mut self, sku: &str) {
        let sku = sku.trim();
        self.sku = (!sku.is_empty()).then(|| sku.to_string());
    }

    /// Set the chart title. Blank hides the title element.
    pub fn set_title(&mut self, title: &str) {
        self.style.title = title.to_string();
    }

    /// Set the table colors.
    pub fn set_colors(&mut self, header: &str, row: &str, text: &str) {
        self.style.apply_colors(header, row, text);
    }

    /// Replace the whole style.
    pub fn set_style(&mut self, style: ChartStyle) {
        self.style = style;
    }

    /// Apply a color preset.
    pub fn apply_color_preset(&mut self, preset: &ColorPreset) {
        tracing::debug!(preset = %preset.name, "Applying color preset");
        self.style
            .apply_colors(&preset.header_color, &preset.row_color, &preset.text_color);
    }

    /// Apply a background preset, including any colors and scale it carries.
    pub fn apply_background_preset(&mut self, preset: &BackgroundPreset) {
        tracing::debug!(preset = %preset.name, "Applying background preset");
        self.background = Some(preset.background_path.clone());
        if let Some(color) = &preset.header_color {
            self.style.header_color = Some(color.clone());
        }
        if let Some(color) = &preset.row_color {
            self.style.row_color = Some(color.clone());
        }
        if let Some(color) = &preset.text_color {
            self.style.text_color = Some(color.clone());
        }
        if let Some(scale) = preset.scale {
            self.transforms
                .set(ElementId::Table, &TransformPatch::scale(scale));
        }
    }

    /// Built-in color presets followed by saved ones.
    #[must_use]
    pub fn color_presets(&self) -> Vec<ColorPreset> {
        let mut presets = ColorPreset::builtin();
        presets.extend(self.presets.list::<ColorPreset>());
        presets
    }

    /// Built-in background presets followed by saved ones.
    #[must_use]
    pub fn background_presets(&self) -> Vec<BackgroundPreset> {
        let mut presets = BackgroundPreset::builtin();
        presets.extend(self.presets.list::<BackgroundPreset>());
        presets
    }

    /// Save the current colors as a named preset.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name and a storage error if
    /// the preset could not be written.
    pub fn save_color_preset(&self, name: &str) -> ChartResult<ColorPreset> {
        if name.trim().is_empty() {
            return Err(ChartError::Validation(
                "Please enter a preset name".to_string(),
            ));
        }
        let colors = self.brand_colors();
        let preset = ColorPreset::new(
            name.trim(),
            self.style.header_fill(&colors),
            self.style.row_fill(1, self.has_template()),
            self.style.text_fill(&colors),
        );
        self.presets
            .save(preset)
            .ok_or_else(|| ChartError::Storage("could not save color preset".to_string()))
    }

    /// Save the current background, colors and table scale as a preset.
    ///
    /// # Errors
    ///
    /// Returns a validation error without an active background or with a
    /// blank name, and a storage error if the preset could not be written.
    pub fn save_background_preset(&self, name: &str) -> ChartResult<BackgroundPreset> {
        let Some(background) = self.background.as_deref() else {
            return Err(ChartError::Validation(
                "Please select a background first".to_string(),
            ));
        };
        if name.trim().is_empty() {
            return Err(ChartError::Validation(
                "Please enter a preset name".to_string(),
            ));
        }
        let preset = BackgroundPreset {
            header_color: self.style.header_color.clone(),
            row_color: self.style.row_color.clone(),
            text_color: self.style.text_color.clone(),
            scale: Some(self.transforms.get(ElementId::Table).scale),
            ..BackgroundPreset::new(name.trim(), background)
        };
        self.presets
            .save(preset)
            .ok_or_else(|| ChartError::Storage("could not save background preset".to_string()))
    }

    /// Delete a saved color preset.
    pub fn delete_color_preset(&self, id: &str) -> bool {
        self.presets.delete::<ColorPreset>(id)
    }

    /// Delete a saved background preset.
    pub fn delete_background_preset(&self, id: &str) -> bool {
        self.presets.delete::<BackgroundPreset>(id)
    }

    /// Show or hide the notes block.
    pub fn set_notes(&mut self, notes: Option<NotesBlock>) {
        self.style.notes_content = notes;
    }

    /// Append a note line. Returns its index, or `None` without a notes block.
    pub fn add_note_line(&mut self) -> Option<usize> {
        self.style.notes_content.as_mut().map(NotesBlock::add_item)
    }

    /// Remove a note line. The last remaining line is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no notes block or the index is out of range.
    pub fn remove_note_line(&mut self, index: usize) -> ChartResult<bool> {
        self.style
            .notes_content
            .as_mut()
            .ok_or_else(|| ChartError::Validation("no notes block".to_string()))?
            .remove_item(index)
    }

    /// Undo the last table edit.
    pub fn undo(&mut self) -> bool {
        self.table.undo()
    }

    /// Redo the next table edit.
    pub fn redo(&mut self) -> bool {
        self.table.redo()
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Current value of a piece of chart text.
    #[must_use]
    pub fn text_for(&self, target: &TextTarget) -> Option<String> {
        match target {
            TextTarget::Header { index } => self.table.published().headers().get(*index).cloned(),
            TextTarget::Cell { row, header } => self
                .table
                .published()
                .cell(*row, header)
                .map(str::to_string),
            TextTarget::NoteTitle => self
                .style
                .notes_content
                .as_ref()
                .map(|n| n.title().to_string()),
            TextTarget::NoteItem { index } => self
                .style
                .notes_content
                .as_ref()
                .and_then(|n| n.items().get(*index).cloned()),
            TextTarget::Sku => Some(self.sku.clone().unwrap_or_default()),
        }
    }

    /// Write an edited value back and publish it to the preview.
    ///
    /// # Errors
    ///
    /// Returns an error if the target no longer exists or the value is
    /// rejected (for example a duplicate header).
    pub fn commit_text(&mut self, target: &TextTarget, value: &str) -> ChartResult<()> {
        match target {
            TextTarget::Header { index } => {
                self.table.rename_header(*index, value)?;
                self.table.save();
            }
            TextTarget::Cell { row, header } => {
                let header = self.working_header(header);
                self.table.set_cell(*row, &header, value)?;
                self.table.save();
            }
            TextTarget::NoteTitle => {
                self.style
                    .notes_content
                    .get_or_insert_with(NotesBlock::default)
                    .set_title(value);
            }
            TextTarget::NoteItem { index } => {
                self.style
                    .notes_content
                    .as_mut()
                    .ok_or_else(|| ChartError::Validation("no notes block".to_string()))?
                    .set_item(*index, value)?;
            }
            TextTarget::Sku => self.set_sku(value),
        }
        tracing::debug!(?target, "Text committed");
        Ok(())
    }

    /// Map a header name from the preview onto the working table.
    ///
    /// Structural edits publish at once, so both views share column order
    /// and only names can differ while a rename is unsaved.
    fn working_header(&self, header: &str) -> String {
        self.table
            .published()
            .headers()
            .iter()
            .position(|h| h == header)
            .and_then(|index| self.table.working().headers().get(index))
            .cloned()
            .unwrap_or_else(|| header.to_string())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Handle one input event against the hit map of the current frame.
    pub fn handle_input(&mut self, event: &InputEvent, hits: &HitMap) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer, hits, &mut actions),
            InputEvent::DoubleClick { position } => {
                let point = self.view.to_canvas(*position);
                if let HitRole::EditableText { element, target } = hits.hit_test(point) {
                    if self.editor.active().is_some_and(|(active, _)| *active == target) {
                        return actions;
                    }
                    if let Some(element) = element {
                        self.select_into(Some(element), &mut actions);
                    }
                    let current = self.text_for(&target).unwrap_or_default();
                    let previous = self.editor.begin(target.clone(), &current);
                    self.apply_edit(previous, &mut actions);
                    actions.push(SessionAction::EditStarted(target));
                }
            }
            InputEvent::Key(key) => self.handle_key(key, &mut actions),
            InputEvent::TextInput(text) => self.editor.set_buffer(text),
            InputEvent::Blur => {
                let outcome = self.editor.blur();
                self.apply_edit(outcome, &mut actions);
            }
            InputEvent::Frame => {
                if let GestureState::Dragging { element, .. } = self.gestures.state() {
                    if self.gestures.flush_frame(&mut self.transforms) {
                        actions.push(SessionAction::TransformCommitted(element));
                    }
                }
            }
        }
        actions
    }

    fn handle_pointer(
        &mut self,
        pointer: &PointerEvent,
        hits: &HitMap,
        actions: &mut Vec<SessionAction>,
    ) {
        let point = self.view.to_canvas(pointer.position);
        match pointer.phase {
            PointerPhase::Down => {
                let role = hits.hit_test(point);

                // Pressing anywhere outside the open input blurs it.
                if self.editor.is_editing() && !matches!(role, HitRole::EditableText { .. }) {
                    let outcome = self.editor.blur();
                    self.apply_edit(outcome, actions);
                }

                if let HitRole::Control { element, control } = role {
                    self.select_into(element.or(self.selection), actions);
                    self.run_control(control, actions);
                    return;
                }

                match self.gestures.press(&role, point, hits, &self.transforms) {
                    PressOutcome::Started(element) => self.select_into(Some(element), actions),
                    PressOutcome::Interactive(Some(element)) => {
                        self.select_into(Some(element), actions);
                    }
                    PressOutcome::Interactive(None) => {}
                    PressOutcome::Deselect => self.select_into(None, actions),
                }
            }
            PointerPhase::Move => {
                if self.gestures.is_dragging() {
                    let before = self.gestures.snap_guide();
                    self.gestures.motion(point, pointer.modifiers);
                    let after = self.gestures.snap_guide();
                    if before != after {
                        actions.push(SessionAction::SnapChanged(after));
                    }
                } else {
                    let hovered = hits.hit_test(point).element();
                    if hovered != self.hovered {
                        self.hovered = hovered;
                        actions.push(SessionAction::HoverChanged(hovered));
                    }
                }
            }
            PointerPhase::Up => {
                let had_guides = self.gestures.snap_guide().is_active();
                if let Some(element) = self.gestures.release(&mut self.transforms) {
                    actions.push(SessionAction::TransformCommitted(element));
                    if had_guides {
                        actions.push(SessionAction::SnapChanged(SnapGuide::default()));
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, actions: &mut Vec<SessionAction>) {
        if self.editor.is_editing() {
            let outcome = self.editor.key(key);
            self.apply_edit(outcome, actions);
            return;
        }
        if self.table.handle_shortcut(key) {
            actions.push(SessionAction::TableChanged);
            return;
        }
        if key.key == Key::Escape {
            self.select_into(None, actions);
        }
    }

    fn run_control(&mut self, control: ControlKind, actions: &mut Vec<SessionAction>) {
        match control {
            ControlKind::AddNoteLine => {
                if let Some(index) = self.add_note_line() {
                    actions.push(SessionAction::NoteLineAdded(index));
                }
            }
            ControlKind::RemoveNoteLine(index) => match self.remove_note_line(index) {
                Ok(true) => actions.push(SessionAction::NoteLineRemoved(index)),
                Ok(false) => {}
                Err(e) => actions.push(SessionAction::Rejected(e.to_string())),
            },
        }
    }

    fn select_into(&mut self, element: Option<ElementId>, actions: &mut Vec<SessionAction>) {
        if self.select(element) {
            actions.push(SessionAction::SelectionChanged(element));
        }
    }

    fn apply_edit(&mut self, outcome: EditOutcome, actions: &mut Vec<SessionAction>) {
        match outcome {
            EditOutcome::Ignored => {}
            EditOutcome::Reverted { target } => actions.push(SessionAction::EditClosed(target)),
            EditOutcome::Commit { target, value } => match self.commit_text(&target, &value) {
                Ok(()) => actions.push(SessionAction::TextCommitted(target)),
                Err(e) => {
                    tracing::debug!(?target, "Edit rejected: {e}");
                    actions.push(SessionAction::Rejected(e.to_string()));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementTransform;
    use crate::event::KeyModifiers;
    use crate::extraction::ExtractionErrorKind;
    use crate::geometry::Rect;
    use crate::scene::HitRegion;
    use std::collections::BTreeMap;

    fn result() -> ExtractionResult {
        let mut row = BTreeMap::new();
        row.insert("SIZE".to_string(), "S".to_string());
        row.insert("CHEST".to_string(), "38".to_string());
        ExtractionResult {
            headers: vec!["SIZE".to_string(), "CHEST".to_string()],
            rows: vec![row],
            sku: Some("SKU-1".to_string()),
            notes: None,
        }
    }

    fn session() -> ChartSession {
        let mut session = ChartSession::new();
        session.set_view(ViewState {
            zoom: 1.0,
            scroll_offset: Point::default(),
        });
        session.load_extraction(result());
        session
    }

    fn hits() -> HitMap {
        let rect = Rect::new(400.0, 400.0, 280.0, 200.0);
        let mut hits = HitMap::new();
        hits.push(HitRegion::transformed(
            HitRole::Element {
                element: ElementId::Table,
            },
            rect,
            rect.center(),
            ElementTransform::IDENTITY,
        ));
        hits.push(HitRegion::transformed(
            HitRole::EditableText {
                element: Some(ElementId::Table),
                target: TextTarget::Cell {
                    row: 0,
                    header: "CHEST".to_string(),
                },
            },
            Rect::new(540.0, 500.0, 140.0, 40.0),
            rect.center(),
            ElementTransform::IDENTITY,
        ));
        hits
    }

    fn pointer(phase: PointerPhase, x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(phase, x, y))
    }

    #[test]
    fn test_load_extraction_resets() {
        let mut session = session();
        session.set_transform(ElementId::Table, &TransformPatch::position(5.0, 5.0));
        session.table_mut().add_row();
        session.load_extraction(result());

        assert_eq!(
            session.transforms().get(ElementId::Table),
            ElementTransform::IDENTITY
        );
        assert!(!session.table().can_undo());
        assert_eq!(session.sku(), Some("SKU-1"));
        assert!(session.style().notes_content.is_some());
        assert!(session.has_chart());
    }

    #[test]
    fn test_drag_selects_and_moves() {
        let mut session = session();
        let hits = hits();

        let actions = session.handle_input(&pointer(PointerPhase::Down, 420.0, 420.0), &hits);
        assert_eq!(
            actions,
            vec![SessionAction::SelectionChanged(Some(ElementId::Table))]
        );

        session.handle_input(&pointer(PointerPhase::Move, 470.0, 480.0), &hits);
        let actions = session.handle_input(&InputEvent::Frame, &hits);
        assert_eq!(actions, vec![SessionAction::TransformCommitted(ElementId::Table)]);

        session.handle_input(&pointer(PointerPhase::Up, 470.0, 480.0), &hits);
        let t = session.transforms().get(ElementId::Table);
        assert!((t.x - 50.0).abs() < f32::EPSILON);
        assert!((t.y - 60.0).abs() < f32::EPSILON);
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_click_on_canvas_deselects() {
        let mut session = session();
        session.select(Some(ElementId::Logo));
        let actions = session.handle_input(&pointer(PointerPhase::Down, 5.0, 5.0), &hits());
        assert_eq!(actions, vec![SessionAction::SelectionChanged(None)]);
    }

    #[test]
    fn test_click_on_text_does_not_drag() {
        let mut session = session();
        let hits = hits();
        session.handle_input(&pointer(PointerPhase::Down, 600.0, 510.0), &hits);
        assert_eq!(session.selection(), Some(ElementId::Table));
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_display_zoom_maps_pointer() {
        let mut session = session();
        session.set_view(ViewState {
            zoom: 0.5,
            scroll_offset: Point::new(10.0, 10.0),
        });
        // Screen (220, 220) is canvas (420, 420), inside the table.
        session.handle_input(&pointer(PointerPhase::Down, 220.0, 220.0), &hits());
        assert_eq!(session.selection(), Some(ElementId::Table));
    }

    #[test]
    fn test_inline_cell_edit_publishes() {
        let mut session = session();
        let hits = hits();
        let dbl = InputEvent::DoubleClick {
            position: Point::new(600.0, 510.0),
        };
        session.handle_input(&dbl, &hits);
        assert!(session.editor().is_editing());

        session.handle_input(&InputEvent::TextInput("40".to_string()), &hits);
        let actions = session.handle_input(
            &InputEvent::Key(KeyEvent::plain(Key::Enter)),
            &hits,
        );
        assert!(matches!(actions[0], SessionAction::TextCommitted(_)));
        assert_eq!(session.table().published().cell(0, "CHEST"), Some("40"));
        assert_eq!(session.table().working().cell(0, "CHEST"), Some("40"));
        assert!(session.table().can_undo());
    }

    #[test]
    fn test_unchanged_edit_adds_no_history() {
        let mut session = session();
        let hits = hits();
        session.handle_input(
            &InputEvent::DoubleClick {
                position: Point::new(600.0, 510.0),
            },
            &hits,
        );
        let actions = session.handle_input(&InputEvent::Blur, &hits);
        assert!(matches!(actions[0], SessionAction::EditClosed(_)));
        assert!(!session.table().can_undo());
    }

    #[test]
    fn test_cell_commit_after_unsaved_header_rename() {
        let mut session = session();
        session.table_mut().rename_header(1, "BUST").expect("rename");
        assert_eq!(session.table().published().headers()[1], "CHEST");

        let target = TextTarget::Cell {
            row: 0,
            header: "CHEST".to_string(),
        };
        assert_eq!(session.text_for(&target).as_deref(), Some("38"));
        session.commit_text(&target, "40").expect("commit");
        assert_eq!(session.table().working().cell(0, "BUST"), Some("40"));
        assert_eq!(session.table().published().cell(0, "BUST"), Some("40"));
    }

    #[test]
    fn test_double_click_on_edited_cell_keeps_buffer() {
        let mut session = session();
        let hits = hits();
        let dbl = InputEvent::DoubleClick {
            position: Point::new(600.0, 510.0),
        };
        session.handle_input(&dbl, &hits);
        session.handle_input(&InputEvent::TextInput("40".to_string()), &hits);

        let actions = session.handle_input(&dbl, &hits);
        assert!(actions.is_empty());
        let (target, buffer) = session.editor().active().expect("still editing");
        assert!(matches!(target, TextTarget::Cell { row: 0, .. }));
        assert_eq!(buffer, "40");

        session.handle_input(&InputEvent::Key(KeyEvent::plain(Key::Enter)), &hits);
        assert_eq!(session.table().published().cell(0, "CHEST"), Some("40"));
    }

    #[test]
    fn test_loaded_notes_without_items_keep_one_line() {
        let json = r#"{
            "headers": ["SIZE"],
            "rows": [{"SIZE": "S"}],
            "notes": {"title": "N", "items": []}
        }"#;
        let result: ExtractionResult = serde_json::from_str(json).expect("json");
        let mut session = ChartSession::new();
        session.load_extraction(result);

        let notes = session.style().notes_content.as_ref().expect("notes");
        assert_eq!(notes.title(), "N");
        assert_eq!(notes.items().len(), 1);
        assert!(session.remove_note_line(0).is_ok());
        assert_eq!(session.style().notes_content.as_ref().expect("notes").items().len(), 1);
    }

    #[test]
    fn test_shortcut_undo_when_not_editing() {
        let mut session = session();
        session.table_mut().add_row();
        let actions = session.handle_input(
            &InputEvent::Key(KeyEvent::with(Key::Char('z'), KeyModifiers::CTRL)),
            &HitMap::new(),
        );
        assert_eq!(actions, vec![SessionAction::TableChanged]);
        assert_eq!(session.table().published().len(), 1);
    }

    #[test]
    fn test_note_controls() {
        let mut session = session();
        let mut hits = HitMap::new();
        hits.push(HitRegion::fixed(
            HitRole::Control {
                element: Some(ElementId::Note),
                control: ControlKind::AddNoteLine,
            },
            Rect::new(0.0, 0.0, 50.0, 50.0),
        ));
        let actions = session.handle_input(&pointer(PointerPhase::Down, 10.0, 10.0), &hits);
        assert!(actions.contains(&SessionAction::NoteLineAdded(3)));
        assert_eq!(session.selection(), Some(ElementId::Note));
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_alignment_requires_selection() {
        let mut session = session();
        assert!(!session.align(Alignment::Left));
        session.select(Some(ElementId::Logo));
        assert!(session.align(Alignment::Left));
        assert!(session.set_scale(2.0));
        let t = session.transforms().get(ElementId::Logo);
        assert!((t.x + 200.0).abs() < f32::EPSILON);
        assert!((t.scale - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extraction_cancel_drops_late_result() {
        let mut session = ChartSession::new();
        let ticket = session.begin_extraction(ImagePayload::new(vec![1], "image/png"));
        assert!(session.is_busy());
        session.cancel_extraction();
        assert!(!session.is_busy());
        assert_eq!(
            session.complete_extraction(ticket, Ok(result())),
            ExtractionStatus::Discarded
        );
        assert!(!session.has_chart());
    }

    #[test]
    fn test_extraction_failure_then_retry() {
        let mut session = ChartSession::new();
        let ticket = session.begin_extraction(ImagePayload::new(vec![7], "image/png"));
        let err = ExtractionError::new(ExtractionErrorKind::Timeout, "slow");
        assert_eq!(
            session.complete_extraction(ticket, Err(err.clone())),
            ExtractionStatus::Failed(err)
        );
        assert!(session.last_extraction_error().is_some());

        let (retry, image) = session.retry_extraction().expect("source kept");
        assert_eq!(image.bytes, vec![7]);
        assert_ne!(retry, ticket);
        assert_eq!(
            session.complete_extraction(retry, Ok(result())),
            ExtractionStatus::Applied
        );
        assert!(session.has_chart());
    }

    #[test]
    fn test_superseded_ticket_discarded() {
        let mut session = ChartSession::new();
        let first = session.begin_extraction(ImagePayload::new(vec![1], "image/png"));
        let second = session.begin_extraction(ImagePayload::new(vec![2], "image/png"));
        assert_eq!(
            session.complete_extraction(first, Ok(result())),
            ExtractionStatus::Discarded
        );
        assert_eq!(
            session.complete_extraction(second, Ok(result())),
            ExtractionStatus::Applied
        );
    }

    #[test]
    fn test_preset_validation() {
        let mut session = session();
        assert!(matches!(
            session.save_color_preset(" "),
            Err(ChartError::Validation(_))
        ));
        assert!(matches!(
            session.save_background_preset("bg"),
            Err(ChartError::Validation(_))
        ));

        session.set_background(Some("/backgrounds/G-max.jpg".to_string()));
        let saved = session.save_background_preset("bg").expect("saved");
        assert_eq!(saved.background_path, "/backgrounds/G-max.jpg");
        assert_eq!(session.background_presets().len(), 5);

        session.set_background(None);
        session.apply_background_preset(&saved);
        assert_eq!(session.background(), Some("/backgrounds/G-max.jpg"));
    }

    #[test]
    fn test_color_preset_applies() {
        let mut session = session();
        let ocean = ColorPreset::builtin()
            .into_iter()
            .find(|p| p.id == "ocean")
            .expect("ocean");
        session.apply_color_preset(&ocean);
        assert_eq!(session.style().header_color.as_deref(), Some("#0ea5e9"));
    }

    #[test]
    fn test_custom_logo() {
        let mut session = session();
        session.set_custom_logo("data:image/png;base64,AAAA");
        let brand = session.brand().expect("brand");
        assert!(brand.is_custom());
        assert!(brand.logo.is_some());
    }

    #[test]
    fn test_view_round_trip() {
        let view = ViewState {
            zoom: 0.5,
            scroll_offset: Point::new(20.0, 30.0),
        };
        let screen = view.to_screen(Point::new(100.0, 100.0));
        assert_eq!(screen, Point::new(70.0, 80.0));
        assert_eq!(view.to_canvas(screen), Point::new(100.0, 100.0));
    }
}
