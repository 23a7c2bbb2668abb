//! Composition of a chart into a visual tree.
//!
//! [`compose`] is a pure function of a [`ComposeInput`]. The chart is always
//! laid out on the fixed 1080×1080 canvas. Display zoom and scroll only show
//! up as the outer transform of an [`RenderMode::Interactive`] tree, and an
//! [`RenderMode::Export`] tree contains no UI-only nodes, so exporting never
//! has to touch the live view.
//!
//! Interactive trees also carry the [`HitMap`] input handling classifies
//! pointer positions against.

use serde::Serialize;
use sizechart_core::element::MIN_SCALE;
use sizechart_core::{
    Brand, BrandColors, ChartSession, ChartStyle, ControlKind, ElementId, ElementTransform,
    HandlePosition, HitMap, HitRegion, HitRole, Point, Rect, SnapGuide, TableData, TextTarget,
    TransformModel, ViewState, CANVAS_SIZE,
};

/// Font stack of the chart container.
pub const FONT_FAMILY: &str = "'Gotham Narrow', sans-serif";

const BLANK_PADDING: f32 = 64.0;
const TEMPLATE_COLUMN_WIDTH: f32 = 760.0;

const LOGO_GAP: f32 = 24.0;

const TITLE_FONT: f32 = 48.0;
const TITLE_HEIGHT: f32 = 60.0;
const TITLE_GAP: f32 = 32.0;

const TABLE_FONT: f32 = 30.0;
const HEADER_ROW_HEIGHT: f32 = 84.0;
const BODY_ROW_HEIGHT: f32 = 76.0;

const NOTE_GAP: f32 = 32.0;
const NOTE_PADDING: f32 = 16.0;
const NOTE_RADIUS: f32 = 8.0;
const NOTE_TITLE_FONT: f32 = 16.0;
const NOTE_TITLE_HEIGHT: f32 = 24.0;
const NOTE_TITLE_GAP: f32 = 8.0;
const NOTE_ITEM_FONT: f32 = 14.0;
const NOTE_ITEM_HEIGHT: f32 = 20.0;
const NOTE_ITEM_SPACING: f32 = 4.0;
const NOTE_REMOVE_SIZE: f32 = 20.0;
const ADD_NOTE_WIDTH: f32 = 112.0;
const ADD_NOTE_HEIGHT: f32 = 28.0;

const SKU_FONT: f32 = 12.0;
const SKU_MARGIN: f32 = 16.0;
const SKU_HEIGHT: f32 = 24.0;
const SKU_PADDING: f32 = 8.0;
const SKU_PLACEHOLDER: &str = "Enter SKU";

/// Screen size of scale handles at scale 1.
pub const HANDLE_SIZE: f32 = 10.0;
/// Distance of the rotate handle above the element at scale 1.
pub const ROTATE_HANDLE_OFFSET: f32 = 30.0;

const SELECTION_COLOR: &str = "#3b82f6";
const HOVER_COLOR: &str = "rgba(59,130,246,0.4)";
const GUIDE_COLOR: &str = "#00d9ff";
const HEADER_DIVIDER: &str = "rgba(255,255,255,0.2)";
const BODY_DIVIDER: &str = "#e5e7eb";

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;

/// Which path the tree is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Live preview: selection chrome, handles, controls and display zoom.
    Interactive,
    /// Canonical-size output with chart content only.
    Export,
}

/// What a node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Part of the chart itself.
    Content,
    /// Selection and hover outlines.
    Decoration,
    /// Scale and rotate handles.
    Handle,
    /// Buttons such as "add note".
    Control,
    /// Snap guide lines.
    Guide,
}

impl NodeRole {
    /// Whether nodes with this role belong to the editing UI only.
    #[must_use]
    pub fn is_ui_only(self) -> bool {
        self != Self::Content
    }
}

/// Outline paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    /// CSS color.
    pub color: String,
    /// Width in logical units.
    pub width: f32,
}

impl Stroke {
    fn new(color: &str, width: f32) -> Self {
        Self {
            color: color.to_string(),
            width,
        }
    }
}

/// Horizontal alignment of a text run relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Origin is the left edge.
    Start,
    /// Origin is the center.
    Middle,
    /// Origin is the right edge.
    End,
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Scale to fit inside the box, keeping aspect ratio.
    Contain,
    /// Scale to cover the box, cropping overflow.
    Cover,
}

/// Transform applied by a group node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeTransform {
    /// Element transform: scale and rotate about `pivot`, then translate.
    Element {
        /// Center of the element's laid-out bounds.
        pivot: Point,
        /// The element transform.
        transform: ElementTransform,
    },
    /// Display-only zoom and scroll of the interactive preview.
    View {
        /// Zoom factor.
        zoom: f32,
        /// Scroll offset in screen units.
        offset: Point,
    },
}

/// Drawable content of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Container for child nodes.
    Group {
        /// Optional transform applied to the children.
        transform: Option<NodeTransform>,
    },
    /// Filled and/or stroked rectangle.
    Rect {
        /// Bounds.
        rect: Rect,
        /// Fill color.
        fill: Option<String>,
        /// Outline.
        stroke: Option<Stroke>,
        /// Corner radius.
        radius: f32,
    },
    /// Single line of text.
    Text {
        /// Baseline origin.
        origin: Point,
        /// Text to draw.
        content: String,
        /// Font size in logical units.
        font_size: f32,
        /// CSS font weight.
        font_weight: u16,
        /// Fill color.
        fill: String,
        /// Alignment relative to `origin`.
        anchor: TextAnchor,
    },
    /// Raster or vector image reference.
    Image {
        /// Box the image is fitted into.
        rect: Rect,
        /// Path or data URI.
        href: String,
        /// Fit mode.
        fit: ImageFit,
    },
    /// Straight line.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Paint.
        stroke: Stroke,
    },
}

/// A node of the visual tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// What to draw.
    pub kind: NodeKind,
    /// What the node is for.
    pub role: NodeRole,
    /// Element the node belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementId>,
    /// Children (groups only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a leaf node.
    #[must_use]
    pub fn new(kind: NodeKind, role: NodeRole) -> Self {
        Self {
            kind,
            role,
            element: None,
            children: Vec::new(),
        }
    }

    /// Create an empty group.
    #[must_use]
    pub fn group(role: NodeRole, transform: Option<NodeTransform>) -> Self {
        Self::new(NodeKind::Group { transform }, role)
    }

    /// Tag the node with its owning element.
    #[must_use]
    pub fn for_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    /// Append a child.
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// This node and every descendant, depth first.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }

    fn rect(rect: Rect, fill: Option<&str>, stroke: Option<Stroke>, radius: f32, role: NodeRole) -> Self {
        Self::new(
            NodeKind::Rect {
                rect,
                fill: fill.map(str::to_string),
                stroke,
                radius,
            },
            role,
        )
    }

    fn text(origin: Point, content: String, font: Font<'_>, anchor: TextAnchor, role: NodeRole) -> Self {
        Self::new(
            NodeKind::Text {
                origin,
                content,
                font_size: font.size,
                font_weight: font.weight,
                fill: font.fill.to_string(),
                anchor,
            },
            role,
        )
    }
}

#[derive(Clone, Copy)]
struct Font<'a> {
    size: f32,
    weight: u16,
    fill: &'a str,
}

/// Maximum box a logo is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogoBox {
    /// Maximum width.
    pub width: f32,
    /// Maximum height.
    pub height: f32,
}

impl Default for LogoBox {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 120.0,
        }
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone)]
pub struct ComposeInput<'a> {
    /// Published table.
    pub table: &'a TableData,
    /// Colors, title and notes.
    pub style: &'a ChartStyle,
    /// Element transforms.
    pub transforms: &'a TransformModel,
    /// Active brand.
    pub brand: Option<&'a Brand>,
    /// Background template reference.
    pub background: Option<&'a str>,
    /// SKU label.
    pub sku: Option<&'a str>,
    /// Selected element.
    pub selection: Option<ElementId>,
    /// Hovered element.
    pub hovered: Option<ElementId>,
    /// Active snap guides.
    pub snap: SnapGuide,
    /// Display zoom and scroll.
    pub view: ViewState,
    /// Text being edited in place and its live buffer.
    pub editing: Option<(&'a TextTarget, &'a str)>,
    /// Box the logo is fitted into.
    pub logo_box: LogoBox,
}

impl<'a> ComposeInput<'a> {
    /// Read everything from a session.
    #[must_use]
    pub fn from_session(session: &'a ChartSession) -> Self {
        Self {
            table: session.table().published(),
            style: session.style(),
            transforms: session.transforms(),
            brand: session.brand(),
            background: session.background(),
            sku: session.sku(),
            selection: session.selection(),
            hovered: session.hovered(),
            snap: session.snap_guide(),
            view: session.view(),
            editing: session.editor().active(),
            logo_box: LogoBox::default(),
        }
    }

    /// Whether a background template is showing.
    #[must_use]
    pub fn has_template(&self) -> bool {
        self.background.is_some()
    }

    /// Brand palette, or the neutral palette without a brand.
    #[must_use]
    pub fn colors(&self) -> BrandColors {
        self.brand
            .map_or_else(BrandColors::neutral, |brand| brand.colors.clone())
    }

    fn logo(&self) -> Option<&'a str> {
        self.brand.and_then(|brand| brand.logo.as_deref())
    }

    fn has_title(&self) -> bool {
        !self.style.title.trim().is_empty()
    }
}

/// Laid-out bounds of each element before its transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    /// Logo box, if the brand has a logo.
    pub logo: Option<Rect>,
    /// Title line, if the title is set.
    pub title: Option<Rect>,
    /// The whole table.
    pub table: Rect,
    /// Width of each table column.
    pub column_width: f32,
    /// Notes block, if present.
    pub note: Option<Rect>,
    /// SKU label in the bottom-right corner.
    pub sku: Rect,
}

impl ChartLayout {
    /// Lay out the content column, centered on the canvas.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(input: &ComposeInput<'_>) -> Self {
        let column = if input.has_template() {
            TEMPLATE_COLUMN_WIDTH
        } else {
            CANVAS_SIZE - BLANK_PADDING * 2.0
        };
        let left = (CANVAS_SIZE - column) / 2.0;

        let table_height = HEADER_ROW_HEIGHT + BODY_ROW_HEIGHT * input.table.len() as f32;
        let note_height = input
            .style
            .notes_content
            .as_ref()
            .map(|notes| note_height(notes.items().len()));
        let logo_box = input.logo_box;

        let mut total = table_height;
        if input.logo().is_some() {
            total += logo_box.height + LOGO_GAP;
        }
        if input.has_title() {
            total += TITLE_HEIGHT + TITLE_GAP;
        }
        if let Some(height) = note_height {
            total += NOTE_GAP + height;
        }

        let mut y = (CANVAS_SIZE - total) / 2.0;
        let mut logo = None;
        if input.logo().is_some() {
            logo = Some(Rect::new(
                (CANVAS_SIZE - logo_box.width) / 2.0,
                y,
                logo_box.width,
                logo_box.height,
            ));
            y += logo_box.height + LOGO_GAP;
        }
        let mut title = None;
        if input.has_title() {
            title = Some(Rect::new(left, y, column, TITLE_HEIGHT));
            y += TITLE_HEIGHT + TITLE_GAP;
        }
        let table = Rect::new(left, y, column, table_height);
        y += table_height;
        let note = note_height.map(|height| Rect::new(left, y + NOTE_GAP, column, height));

        let columns = input.table.headers().len().max(1) as f32;
        let label = sku_label(input.sku);
        let sku_width = text_width(&label, SKU_FONT) + SKU_PADDING * 2.0;
        let sku = Rect::new(
            CANVAS_SIZE - SKU_MARGIN - sku_width,
            CANVAS_SIZE - SKU_MARGIN - SKU_HEIGHT,
            sku_width,
            SKU_HEIGHT,
        );

        Self {
            logo,
            title,
            table,
            column_width: column / columns,
            note,
            sku,
        }
    }

    /// Bounds of an element, if it is shown.
    #[must_use]
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        match id {
            ElementId::Logo => self.logo,
            ElementId::Title => self.title,
            ElementId::Table => Some(self.table),
            ElementId::Note => self.note,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn note_height(items: usize) -> f32 {
    let items = items.max(1) as f32;
    NOTE_PADDING * 2.0
        + NOTE_TITLE_HEIGHT
        + NOTE_TITLE_GAP
        + items * NOTE_ITEM_HEIGHT
        + (items - 1.0) * NOTE_ITEM_SPACING
}

fn sku_label(sku: Option<&str>) -> String {
    format!("SKU: {}", sku.unwrap_or(SKU_PLACEHOLDER))
}

/// Rough advance width of a text run.
#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_ADVANCE
}

fn baseline(rect: &Rect, font_size: f32) -> f32 {
    rect.y + rect.height / 2.0 + font_size * 0.35
}

/// A composed chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualTree {
    /// Mode the tree was composed for.
    pub mode: RenderMode,
    /// Canvas width in logical units.
    pub width: f32,
    /// Canvas height in logical units.
    pub height: f32,
    /// Font stack for all text.
    pub font_family: String,
    /// Root node.
    pub root: Node,
    /// Element bounds.
    pub layout: ChartLayout,
    /// Interactive regions (empty in export mode).
    #[serde(skip)]
    pub hit_map: HitMap,
}

impl VisualTree {
    /// All nodes, depth first.
    #[must_use]
    pub fn nodes(&self) -> Vec<&Node> {
        self.root.descendants()
    }
}

/// Compose a chart into a visual tree.
#[must_use]
pub fn compose(input: &ComposeInput<'_>, mode: RenderMode) -> VisualTree {
    let layout = ChartLayout::compute(input);
    let mut composer = Composer::new(input, mode);

    let mut canvas = Node::group(NodeRole::Content, None);
    canvas.push(composer.background());
    for id in ElementId::ALL {
        if let Some(bounds) = layout.bounds(id) {
            canvas.push(composer.element(id, bounds));
        }
    }
    if let Some(sku) = composer.sku(layout.sku) {
        canvas.push(sku);
    }
    if composer.interactive() {
        for guide in composer.guides() {
            canvas.push(guide);
        }
    }

    let root = if composer.interactive() {
        let mut view = Node::group(
            NodeRole::Content,
            Some(NodeTransform::View {
                zoom: input.view.zoom,
                offset: input.view.scroll_offset,
            }),
        );
        view.push(canvas);
        view
    } else {
        canvas
    };

    tracing::trace!(?mode, regions = composer.hits.regions().len(), "Chart composed");

    VisualTree {
        mode,
        width: CANVAS_SIZE,
        height: CANVAS_SIZE,
        font_family: FONT_FAMILY.to_string(),
        root,
        layout,
        hit_map: composer.into_hit_map(),
    }
}

/// Element transform in effect while composing an element group.
#[derive(Clone, Copy)]
struct Frame {
    pivot: Point,
    transform: ElementTransform,
}

impl Frame {
    fn region(self, role: HitRole, rect: Rect) -> HitRegion {
        HitRegion::transformed(role, rect, self.pivot, self.transform)
    }

    /// Length that stays constant on screen regardless of element scale.
    fn unscaled(self, length: f32) -> f32 {
        length / self.transform.scale.max(MIN_SCALE)
    }
}

struct Composer<'i, 'a> {
    input: &'i ComposeInput<'a>,
    mode: RenderMode,
    colors: BrandColors,
    hits: HitMap,
    top_hits: Vec<HitRegion>,
}

impl<'i, 'a> Composer<'i, 'a> {
    fn new(input: &'i ComposeInput<'a>, mode: RenderMode) -> Self {
        Self {
            input,
            mode,
            colors: input.colors(),
            hits: HitMap::new(),
            top_hits: Vec::new(),
        }
    }

    fn interactive(&self) -> bool {
        self.mode == RenderMode::Interactive
    }

    fn hit(&mut self, region: HitRegion) {
        if self.interactive() {
            self.hits.push(region);
        }
    }

    fn into_hit_map(mut self) -> HitMap {
        for region in self.top_hits.drain(..) {
            self.hits.push(region);
        }
        self.hits
    }

    /// Live buffer if `target` is being edited, else `value`.
    fn display_text(&self, target: &TextTarget, value: &'a str) -> (&'a str, bool) {
        match self.input.editing {
            Some((editing, buffer)) if self.interactive() && editing == target => (buffer, true),
            _ => (value, false),
        }
    }

    fn background(&self) -> Node {
        let canvas = Rect::new(0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE);
        match self.input.background {
            Some(href) => Node::new(
                NodeKind::Image {
                    rect: canvas,
                    href: href.to_string(),
                    fit: ImageFit::Cover,
                },
                NodeRole::Content,
            ),
            None => Node::rect(canvas, Some(&self.colors.secondary), None, 0.0, NodeRole::Content),
        }
    }

    fn element(&mut self, id: ElementId, bounds: Rect) -> Node {
        let frame = Frame {
            pivot: bounds.center(),
            transform: self.input.transforms.get(id),
        };
        let mut group = Node::group(
            NodeRole::Content,
            Some(NodeTransform::Element {
                pivot: frame.pivot,
                transform: frame.transform,
            }),
        )
        .for_element(id);
        self.hit(frame.region(HitRole::Element { element: id }, bounds));

        match id {
            ElementId::Logo => self.logo(&mut group, bounds),
            ElementId::Title => self.title(&mut group, bounds),
            ElementId::Table => self.table(&mut group, bounds, frame),
            ElementId::Note => self.note(&mut group, bounds, frame),
        }

        if self.interactive() {
            if self.input.selection == Some(id) {
                self.selection_chrome(&mut group, id, bounds, frame);
            } else if self.input.hovered == Some(id) {
                group.push(Node::rect(
                    bounds,
                    None,
                    Some(Stroke::new(HOVER_COLOR, frame.unscaled(1.0))),
                    0.0,
                    NodeRole::Decoration,
                ));
            }
        }
        group
    }

    fn logo(&self, group: &mut Node, bounds: Rect) {
        if let Some(href) = self.input.logo() {
            group.push(Node::new(
                NodeKind::Image {
                    rect: bounds,
                    href: href.to_string(),
                    fit: ImageFit::Contain,
                },
                NodeRole::Content,
            ));
        }
    }

    fn title(&self, group: &mut Node, bounds: Rect) {
        let font = Font {
            size: TITLE_FONT,
            weight: 700,
            fill: self.input.style.text_fill(&self.colors),
        };
        group.push(Node::text(
            Point::new(bounds.center().x, baseline(&bounds, TITLE_FONT)),
            self.input.style.title.to_uppercase(),
            font,
            TextAnchor::Middle,
            NodeRole::Content,
        ));
    }

    #[allow(clippy::cast_precision_loss)]
    fn table(&mut self, group: &mut Node, bounds: Rect, frame: Frame) {
        let style = self.input.style;
        let table = self.input.table;
        let colors = self.colors.clone();
        let has_template = self.input.has_template();
        let columns = table.headers().len().max(1) as f32;
        let cell_width = bounds.width / columns;

        let header_row = Rect::new(bounds.x, bounds.y, bounds.width, HEADER_ROW_HEIGHT);
        group.push(Node::rect(
            header_row,
            Some(style.header_fill(&colors)),
            None,
            0.0,
            NodeRole::Content,
        ));
        let header_font = Font {
            size: TABLE_FONT,
            weight: 700,
            fill: "#ffffff",
        };
        for (index, header) in table.headers().iter().enumerate() {
            let cell = Rect::new(
                bounds.x + cell_width * index as f32,
                header_row.y,
                cell_width,
                HEADER_ROW_HEIGHT,
            );
            let target = TextTarget::Header { index };
            self.cell_text(group, cell, &target, header, header_font, true, frame);
            if index > 0 {
                group.push(divider(cell, HEADER_DIVIDER));
            }
        }

        let body_font = Font {
            size: TABLE_FONT,
            weight: 500,
            fill: style.text_fill(&colors),
        };
        for (row_index, row) in table.rows().iter().enumerate() {
            let row_rect = Rect::new(
                bounds.x,
                bounds.y + HEADER_ROW_HEIGHT + BODY_ROW_HEIGHT * row_index as f32,
                bounds.width,
                BODY_ROW_HEIGHT,
            );
            group.push(Node::rect(
                row_rect,
                Some(style.row_fill(row_index, has_template)),
                None,
                0.0,
                NodeRole::Content,
            ));
            for (index, header) in table.headers().iter().enumerate() {
                let cell = Rect::new(
                    bounds.x + cell_width * index as f32,
                    row_rect.y,
                    cell_width,
                    BODY_ROW_HEIGHT,
                );
                let target = TextTarget::Cell {
                    row: row_index,
                    header: header.clone(),
                };
                let value = row.get(header).unwrap_or_default();
                self.cell_text(group, cell, &target, value, body_font, false, frame);
                if index > 0 {
                    group.push(divider(cell, BODY_DIVIDER));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cell_text(
        &mut self,
        group: &mut Node,
        cell: Rect,
        target: &TextTarget,
        value: &'a str,
        font: Font<'_>,
        uppercase: bool,
        frame: Frame,
    ) {
        let (text, editing) = self.display_text(target, value);
        let content = if uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        group.push(Node::text(
            Point::new(cell.center().x, baseline(&cell, font.size)),
            content,
            font,
            TextAnchor::Middle,
            NodeRole::Content,
        ));
        if editing {
            group.push(edit_outline(cell, frame));
        }
        self.hit(frame.region(
            HitRole::EditableText {
                element: target.element(),
                target: target.clone(),
            },
            cell,
        ));
    }

    fn note(&mut self, group: &mut Node, bounds: Rect, frame: Frame) {
        let style = self.input.style;
        let Some(notes) = style.notes_content.as_ref() else {
            return;
        };
        group.push(Node::rect(
            bounds,
            Some(style.header_fill(&self.colors)),
            None,
            NOTE_RADIUS,
            NodeRole::Content,
        ));

        let inner_x = bounds.x + NOTE_PADDING;
        let inner_width = bounds.width - NOTE_PADDING * 2.0;
        let title_rect = Rect::new(inner_x, bounds.y + NOTE_PADDING, inner_width, NOTE_TITLE_HEIGHT);
        let title_font = Font {
            size: NOTE_TITLE_FONT,
            weight: 600,
            fill: "#ffffff",
        };
        self.note_line(group, title_rect, &TextTarget::NoteTitle, notes.title(), title_font, frame);

        let item_font = Font {
            size: NOTE_ITEM_FONT,
            weight: 400,
            fill: "#ffffff",
        };
        let show_controls = self.interactive()
            && (self.input.selection == Some(ElementId::Note)
                || self.input.hovered == Some(ElementId::Note));
        let mut y = title_rect.bottom() + NOTE_TITLE_GAP;
        for (index, item) in notes.items().iter().enumerate() {
            let line = Rect::new(inner_x, y, inner_width, NOTE_ITEM_HEIGHT);
            self.note_line(group, line, &TextTarget::NoteItem { index }, item, item_font, frame);
            if show_controls && notes.items().len() > 1 {
                self.remove_line_control(group, line, index, frame);
            }
            y += NOTE_ITEM_HEIGHT + NOTE_ITEM_SPACING;
        }

        if self.interactive() && self.input.selection == Some(ElementId::Note) {
            self.add_line_control(group, bounds, frame);
        }
    }

    fn note_line(
        &mut self,
        group: &mut Node,
        line: Rect,
        target: &TextTarget,
        value: &'a str,
        font: Font<'_>,
        frame: Frame,
    ) {
        let (text, editing) = self.display_text(target, value);
        group.push(Node::text(
            Point::new(line.x, baseline(&line, font.size)),
            text.to_string(),
            font,
            TextAnchor::Start,
            NodeRole::Content,
        ));
        if editing {
            group.push(edit_outline(line, frame));
        }
        self.hit(frame.region(
            HitRole::EditableText {
                element: Some(ElementId::Note),
                target: target.clone(),
            },
            line,
        ));
    }

    fn remove_line_control(&mut self, group: &mut Node, line: Rect, index: usize, frame: Frame) {
        let rect = Rect::new(
            line.right() - NOTE_REMOVE_SIZE,
            line.y,
            NOTE_REMOVE_SIZE,
            NOTE_REMOVE_SIZE,
        );
        let mut button = Node::group(NodeRole::Control, None).for_element(ElementId::Note);
        button.push(Node::rect(
            rect,
            Some("rgba(239,68,68,0.2)"),
            None,
            4.0,
            NodeRole::Control,
        ));
        button.push(Node::text(
            Point::new(rect.center().x, baseline(&rect, 12.0)),
            "×".to_string(),
            Font {
                size: 12.0,
                weight: 700,
                fill: "#fca5a5",
            },
            TextAnchor::Middle,
            NodeRole::Control,
        ));
        group.push(button);
        self.hit(frame.region(
            HitRole::Control {
                element: Some(ElementId::Note),
                control: ControlKind::RemoveNoteLine(index),
            },
            rect,
        ));
    }

    fn add_line_control(&mut self, group: &mut Node, bounds: Rect, frame: Frame) {
        let rect = Rect::new(
            bounds.center().x - ADD_NOTE_WIDTH / 2.0,
            bounds.bottom() + 8.0,
            ADD_NOTE_WIDTH,
            ADD_NOTE_HEIGHT,
        );
        let mut button = Node::group(NodeRole::Control, None).for_element(ElementId::Note);
        button.push(Node::rect(
            rect,
            Some("rgba(139,92,246,0.8)"),
            None,
            ADD_NOTE_HEIGHT / 2.0,
            NodeRole::Control,
        ));
        button.push(Node::text(
            Point::new(rect.center().x, baseline(&rect, 12.0)),
            "+ Add Note".to_string(),
            Font {
                size: 12.0,
                weight: 500,
                fill: "#ffffff",
            },
            TextAnchor::Middle,
            NodeRole::Control,
        ));
        group.push(button);
        self.hit(frame.region(
            HitRole::Control {
                element: Some(ElementId::Note),
                control: ControlKind::AddNoteLine,
            },
            rect,
        ));
    }

    fn selection_chrome(&mut self, group: &mut Node, id: ElementId, bounds: Rect, frame: Frame) {
        group.push(Node::rect(
            bounds,
            None,
            Some(Stroke::new(SELECTION_COLOR, frame.unscaled(2.0))),
            0.0,
            NodeRole::Decoration,
        ));

        let size = frame.unscaled(HANDLE_SIZE);
        for handle in HandlePosition::ALL {
            let rect = Rect::centered(handle.anchor(&bounds), size, size);
            group.push(Node::rect(
                rect,
                Some("#ffffff"),
                Some(Stroke::new(SELECTION_COLOR, frame.unscaled(1.0))),
                0.0,
                NodeRole::Handle,
            ));
            self.top_hits.push(frame.region(
                HitRole::ScaleHandle {
                    element: id,
                    handle,
                },
                rect,
            ));
        }

        let top = Point::new(bounds.center().x, bounds.y);
        let knob_center = Point::new(top.x, top.y - frame.unscaled(ROTATE_HANDLE_OFFSET));
        let knob_size = size * 2.5;
        group.push(Node::new(
            NodeKind::Line {
                from: top,
                to: knob_center,
                stroke: Stroke::new(SELECTION_COLOR, frame.unscaled(1.0)),
            },
            NodeRole::Decoration,
        ));
        let knob = Rect::centered(knob_center, knob_size, knob_size);
        group.push(Node::rect(
            knob,
            Some("#ffffff"),
            Some(Stroke::new(SELECTION_COLOR, frame.unscaled(1.0))),
            knob_size / 2.0,
            NodeRole::Handle,
        ));
        self.top_hits
            .push(frame.region(HitRole::RotateHandle { element: id }, knob));
    }

    fn sku(&mut self, rect: Rect) -> Option<Node> {
        let sku = self.input.sku.filter(|s| !s.trim().is_empty());
        if sku.is_none() && !self.interactive() {
            return None;
        }
        let role = if sku.is_some() {
            NodeRole::Content
        } else {
            NodeRole::Decoration
        };
        let (text, editing) = self.display_text(&TextTarget::Sku, sku.unwrap_or(SKU_PLACEHOLDER));

        let mut group = Node::group(role, None);
        group.push(Node::rect(rect, Some("rgba(0,0,0,0.6)"), None, 4.0, role));
        group.push(Node::text(
            Point::new(rect.x + SKU_PADDING, baseline(&rect, SKU_FONT)),
            format!("SKU: {text}"),
            Font {
                size: SKU_FONT,
                weight: 500,
                fill: "#ffffff",
            },
            TextAnchor::Start,
            role,
        ));
        if editing {
            group.push(Node::rect(
                rect.inflate(2.0),
                None,
                Some(Stroke::new(SELECTION_COLOR, 1.0)),
                4.0,
                NodeRole::Decoration,
            ));
        }
        self.hit(HitRegion::fixed(
            HitRole::EditableText {
                element: None,
                target: TextTarget::Sku,
            },
            rect,
        ));
        Some(group)
    }

    fn guides(&self) -> Vec<Node> {
        let center = CANVAS_SIZE / 2.0;
        let mut guides = Vec::new();
        if self.input.snap.vertical.is_some() {
            guides.push(Node::new(
                NodeKind::Line {
                    from: Point::new(center, 0.0),
                    to: Point::new(center, CANVAS_SIZE),
                    stroke: Stroke::new(GUIDE_COLOR, 1.0),
                },
                NodeRole::Guide,
            ));
        }
        if self.input.snap.horizontal.is_some() {
            guides.push(Node::new(
                NodeKind::Line {
                    from: Point::new(0.0, center),
                    to: Point::new(CANVAS_SIZE, center),
                    stroke: Stroke::new(GUIDE_COLOR, 1.0),
                },
                NodeRole::Guide,
            ));
        }
        guides
    }
}

fn divider(cell: Rect, color: &str) -> Node {
    Node::new(
        NodeKind::Line {
            from: Point::new(cell.x, cell.y),
            to: Point::new(cell.x, cell.bottom()),
            stroke: Stroke::new(color, 1.0),
        },
        NodeRole::Content,
    )
}

fn edit_outline(rect: Rect, frame: Frame) -> Node {
    Node::rect(
        rect.inflate(frame.unscaled(2.0)),
        None,
        Some(Stroke::new(SELECTION_COLOR, frame.unscaled(2.0))),
        4.0,
        NodeRole::Decoration,
    )
}
