//! SVG serialisation of a visual tree.
//!
//! Every node is passed through a filter before it is written; a rejected
//! node is skipped together with its subtree.

use std::fmt::Write;

use crate::compose::{ImageFit, Node, NodeKind, NodeTransform, TextAnchor, VisualTree};

/// Per-node inclusion filter.
pub type NodeFilter<'a> = &'a dyn Fn(&Node) -> bool;

/// Keep every node.
#[must_use]
pub fn include_all(_node: &Node) -> bool {
    true
}

/// Keep chart content, drop selection chrome, handles, controls and guides.
#[must_use]
pub fn exclude_ui(node: &Node) -> bool {
    !node.role.is_ui_only()
}

/// Serialise a tree to an SVG document of `width`×`height` output units.
///
/// The view box is always the logical canvas, so a larger output size
/// scales the drawing instead of revealing more of it.
#[must_use]
pub fn to_svg(tree: &VisualTree, width: f32, height: f32, filter: NodeFilter<'_>) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {} {}\" font-family=\"{}\">",
        tree.width,
        tree.height,
        escape_xml(&tree.font_family),
    );
    write_node(&mut svg, &tree.root, filter);
    svg.push_str("</svg>");
    svg
}

fn write_node(svg: &mut String, node: &Node, filter: NodeFilter<'_>) {
    if !filter(node) {
        return;
    }

    match &node.kind {
        NodeKind::Group { transform } => {
            match transform {
                Some(transform) => {
                    let _ = write!(svg, "<g transform=\"{}\">", transform_attr(transform));
                }
                None => svg.push_str("<g>"),
            }
            for child in &node.children {
                write_node(svg, child, filter);
            }
            svg.push_str("</g>");
        }

        NodeKind::Rect {
            rect,
            fill,
            stroke,
            radius,
        } => {
            let fill = fill.as_deref().map_or_else(|| "none".to_string(), escape_xml);
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\"",
                rect.x, rect.y, rect.width, rect.height,
            );
            if *radius > 0.0 {
                let _ = write!(svg, " rx=\"{radius}\"");
            }
            if let Some(stroke) = stroke {
                let _ = write!(
                    svg,
                    " stroke=\"{}\" stroke-width=\"{}\"",
                    escape_xml(&stroke.color),
                    stroke.width
                );
            }
            svg.push_str("/>");
        }

        NodeKind::Text {
            origin,
            content,
            font_size,
            font_weight,
            fill,
            anchor,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"{font_size}\" font-weight=\"{font_weight}\" fill=\"{}\" text-anchor=\"{anchor}\">{}</text>",
                origin.x,
                origin.y,
                escape_xml(fill),
                escape_xml(content),
            );
        }

        NodeKind::Image { rect, href, fit } => {
            let aspect = match fit {
                ImageFit::Contain => "xMidYMid meet",
                ImageFit::Cover => "xMidYMid slice",
            };
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"{aspect}\" xlink:href=\"{}\"/>",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                escape_xml(href),
            );
        }

        NodeKind::Line { from, to, stroke } => {
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                from.x,
                from.y,
                to.x,
                to.y,
                escape_xml(&stroke.color),
                stroke.width,
            );
        }
    }
}

/// SVG transform list for a group. The rightmost entry applies first.
fn transform_attr(transform: &NodeTransform) -> String {
    match transform {
        NodeTransform::Element { pivot, transform } => format!(
            "translate({} {}) rotate({} {} {}) translate({} {}) scale({}) translate({} {})",
            transform.x,
            transform.y,
            transform.rotation,
            pivot.x,
            pivot.y,
            pivot.x,
            pivot.y,
            transform.scale,
            -pivot.x,
            -pivot.y,
        ),
        NodeTransform::View { zoom, offset } => {
            format!("translate({} {}) scale({zoom})", offset.x, offset.y)
        }
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose, ComposeInput, RenderMode};
    use sizechart_core::{ChartSession, ElementId, TableData, TransformPatch};

    fn session() -> ChartSession {
        let mut session = ChartSession::new();
        session.load_table(TableData::placeholder());
        session
    }

    #[test]
    fn test_svg_document_shape() {
        let session = session();
        let tree = compose(&ComposeInput::from_session(&session), RenderMode::Export);
        let svg = to_svg(&tree, 2160.0, 2160.0, &include_all);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"2160\""));
        assert!(svg.contains("viewBox=\"0 0 1080 1080\""));
        assert!(svg.contains(">UKURAN</text>"));
    }

    #[test]
    fn test_filter_drops_subtrees() {
        let mut session = session();
        session.select(Some(ElementId::Note));
        let tree = compose(&ComposeInput::from_session(&session), RenderMode::Interactive);

        let all = to_svg(&tree, 1080.0, 1080.0, &include_all);
        let filtered = to_svg(&tree, 1080.0, 1080.0, &exclude_ui);
        assert!(all.contains("+ Add Note"));
        assert!(!filtered.contains("+ Add Note"));
        assert!(!filtered.contains("#3b82f6"));
        assert!(filtered.contains("Please note:"));
    }

    #[test]
    fn test_element_transform_attr() {
        let mut session = session();
        session.set_transform(ElementId::Table, &TransformPatch::position(12.0, -8.0));
        session.set_transform(ElementId::Table, &TransformPatch::rotation(45.0));
        let tree = compose(&ComposeInput::from_session(&session), RenderMode::Export);
        let svg = to_svg(&tree, 1080.0, 1080.0, &include_all);
        assert!(svg.contains("translate(12 -8) rotate(45 540"));
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(escape_xml("S&M <XL>"), "S&amp;M &lt;XL&gt;");
        assert_eq!(escape_xml("\"a\" 'b'"), "&quot;a&quot; &apos;b&apos;");
    }
}
