//! Global chart style.

use serde::{Deserialize, Serialize};

use crate::brand::BrandColors;
use crate::notes::NotesBlock;

/// Colors, title and notes for the active chart.
///
/// A `None` color falls back to a layout default at render time: header and
/// text take the brand's primary color, rows depend on whether a background
/// template is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStyle {
    /// Header row fill.
    pub header_color: Option<String>,
    /// Tint of odd body rows.
    pub row_color: Option<String>,
    /// Body text color.
    pub text_color: Option<String>,
    /// Chart title. Empty hides the title element.
    pub title: String,
    /// Notes block, or `None` to hide the note element.
    pub notes_content: Option<NotesBlock>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            header_color: Some("#000000".to_string()),
            row_color: Some("#f3f4f6".to_string()),
            text_color: Some("#000000".to_string()),
            title: String::new(),
            notes_content: Some(NotesBlock::default()),
        }
    }
}

impl ChartStyle {
    /// Style with every color left to the layout defaults.
    #[must_use]
    pub fn unstyled() -> Self {
        Self {
            header_color: None,
            row_color: None,
            text_color: None,
            ..Self::default()
        }
    }

    /// Effective header fill.
    #[must_use]
    pub fn header_fill<'a>(&'a self, brand: &'a BrandColors) -> &'a str {
        self.header_color.as_deref().unwrap_or(&brand.primary)
    }

    /// Effective body text color.
    #[must_use]
    pub fn text_fill<'a>(&'a self, brand: &'a BrandColors) -> &'a str {
        self.text_color.as_deref().unwrap_or(&brand.primary)
    }

    /// Body fill for the row at `index`.
    ///
    /// Even rows are always white. Odd rows use the configured tint, or the
    /// layout default: white over a background template, a faint grey on a
    /// blank canvas.
    #[must_use]
    pub fn row_fill(&self, index: usize, has_template: bool) -> &str {
        if index % 2 == 0 {
            return "#ffffff";
        }
        match &self.row_color {
            Some(color) => color,
            None if has_template => "#ffffff",
            None => "rgba(0,0,0,0.05)",
        }
    }

    /// Apply the three colors of a preset.
    pub fn apply_colors(&mut self, header: &str, row: &str, text: &str) {
        self.header_color = Some(header.to_string());
        self.row_color = Some(row.to_string());
        self.text_color = Some(text.to_string());
    }
}
