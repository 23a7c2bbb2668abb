//! Turning service payloads into [`ExtractionResult`]s.
//!
//! The AI endpoint answers with a JSON document describing sizes and
//! measurements, sometimes wrapped in a markdown fence and sometimes as
//! free text. The basic OCR endpoint only returns raw text. Both end up
//! here; anything unusable becomes the placeholder table.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use sizechart_core::{ExtractionResult, NotesBlock};

use crate::error::{ExtractError, ExtractResult};

const PLACEHOLDER_HEADERS: [&str; 2] = ["SIZE", "UKURAN"];
const NOTES_TITLE: &str = "Please note:";

const AI_HEADER_KEYWORDS: [&str; 8] = [
    "size", "ukuran", "chest", "bust", "waist", "length", "cm", "inch",
];
const OCR_HEADER_KEYWORDS: [&str; 11] = [
    "size", "ukuran", "eu", "us", "uk", "cm", "mm", "inch", "len", "foot", "panjang",
];

/// Result used when nothing usable came back.
#[must_use]
pub fn placeholder_result() -> ExtractionResult {
    let headers: Vec<String> = PLACEHOLDER_HEADERS.iter().map(ToString::to_string).collect();
    let row = headers.iter().map(|h| (h.clone(), "-".to_string())).collect();
    ExtractionResult {
        headers,
        rows: vec![row],
        sku: None,
        notes: None,
    }
}

/// Compiled patterns for text payloads.
#[derive(Debug, Clone)]
pub struct ChartTextParser {
    sku: Regex,
    sku_loose: Regex,
    size_line: Regex,
    value_split: Regex,
    ocr_noise: Regex,
}

impl ChartTextParser {
    /// Compile the patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Parse`] if a pattern fails to compile.
    pub fn new() -> ExtractResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ExtractError::Parse(format!("bad pattern: {e}")))
        };
        Ok(Self {
            sku: compile(r"(?i)(?:SKU|Article|Model|Kode)[:\s]+([A-Z0-9\-]+)")?,
            sku_loose: compile(r"(?i)(?:SKU|Article|Art|Model|Kode|Code|Style)[:\s]+([A-Z0-9\-]+)")?,
            size_line: compile(r"(?i)^(XS|S|M|L|XL|XXL|XXXL|2XL|3XL|4XL|\d{1,2})[\s:.\-]+(.+)$")?,
            value_split: compile(r"[\s,\-]+")?,
            ocr_noise: compile(r"[|\[\]_]")?,
        })
    }

    /// Parse the `result` field of an AI understand response.
    #[must_use]
    pub fn parse_understand(&self, result: &Value) -> ExtractionResult {
        match result {
            Value::Null => placeholder_result(),
            Value::String(text) if text.trim().is_empty() => placeholder_result(),
            Value::String(text) => match json_document(text) {
                Some(doc) => from_measurement_document(&doc)
                    .unwrap_or_else(|| self.parse_text_response(text)),
                None => {
                    tracing::debug!("AI response is not JSON, falling back to text parsing");
                    self.parse_text_response(text)
                }
            },
            Value::Object(doc) => from_measurement_document(doc).unwrap_or_else(placeholder_result),
            other => self.parse_text_response(&other.to_string()),
        }
    }

    /// Parse free text from the AI endpoint.
    ///
    /// Lines starting with a size label (`XS`, `M`, `2XL`, `38`...) become
    /// rows; their remaining values fill `COL1`, `COL2`... Longer lines
    /// following the table are collected as notes.
    #[must_use]
    pub fn parse_text_response(&self, text: &str) -> ExtractionResult {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return placeholder_result();
        }

        let mut headers = vec!["SIZE".to_string()];
        let mut rows: Vec<BTreeMap<String, String>> = Vec::new();
        let mut sku = None;
        let mut notes: Vec<String> = Vec::new();

        for line in &lines {
            if let Some(caps) = self.sku.captures(line) {
                sku = Some(caps[1].to_string());
                continue;
            }

            if let Some(caps) = self.size_line.captures(line) {
                let values: Vec<&str> = self
                    .value_split
                    .split(&caps[2])
                    .filter(|v| !v.is_empty())
                    .collect();
                while headers.len() < values.len() + 1 {
                    headers.push(format!("COL{}", headers.len()));
                }
                let mut row = BTreeMap::new();
                row.insert("SIZE".to_string(), caps[1].to_uppercase());
                for (idx, value) in values.iter().enumerate() {
                    row.insert(headers[idx + 1].clone(), (*value).to_string());
                }
                rows.push(row);
            } else if !rows.is_empty()
                && !line.to_lowercase().contains("size")
                && line.chars().count() > 10
            {
                notes.push((*line).to_string());
            }
        }

        if rows.is_empty() {
            if let Some(found) = header_line(&lines[..lines.len().min(3)], &AI_HEADER_KEYWORDS) {
                headers = found;
            }
        }

        finish(headers, rows, sku, notes_block(notes))
    }

    /// Parse raw text from the basic OCR endpoint.
    ///
    /// The first line mentioning a measurement keyword becomes the header
    /// row; lines starting with a digit or a size letter become data rows,
    /// with any surplus tokens joined into the last column.
    #[must_use]
    pub fn parse_ocr_output(&self, text: &str) -> ExtractionResult {
        let lines: Vec<String> = text
            .lines()
            .map(|line| {
                let cleaned = self.ocr_noise.replace_all(line, " ");
                cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return placeholder_result();
        }

        let mut sku: Option<String> = None;
        let mut headers: Vec<String> = PLACEHOLDER_HEADERS.iter().map(ToString::to_string).collect();
        let mut header_found = false;
        let mut rows = Vec::new();

        for line in &lines {
            let lower = line.to_lowercase();

            if sku.is_none() {
                if let Some(caps) = self.sku_loose.captures(line) {
                    sku = Some(caps[1].to_string());
                    continue;
                }
            }

            if !header_found && OCR_HEADER_KEYWORDS.iter().any(|k| lower.contains(k)) {
                let candidates: Vec<String> = line
                    .split_whitespace()
                    .filter(|h| h.len() > 1 || h.chars().any(|c| c.is_ascii_digit()))
                    .map(|h| trim_symbols(h).to_uppercase())
                    .filter(|h| !h.is_empty())
                    .collect();
                if candidates.len() >= 2 {
                    headers = candidates;
                    header_found = true;
                    continue;
                }
            }

            let tokens: Vec<&str> = line
                .split_whitespace()
                .map(trim_symbols)
                .filter(|t| !t.is_empty())
                .collect();
            let is_data_row = tokens.first().is_some_and(|first| {
                first
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit() || "SMLX".contains(c.to_ascii_uppercase()))
            });

            if is_data_row && !lower.contains("sku") && !lower.contains("size") {
                let last = headers.len() - 1;
                let row: BTreeMap<String, String> = headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let value = if idx == last {
                            tokens.get(idx..).map(|rest| rest.join(" ")).unwrap_or_default()
                        } else {
                            tokens.get(idx).map(ToString::to_string).unwrap_or_default()
                        };
                        (header.clone(), value)
                    })
                    .collect();
                if row.values().any(|v| !v.is_empty()) {
                    rows.push(row);
                }
            }
        }

        finish(headers, rows, sku, None)
    }
}

/// Strip markdown fences and return the outermost `{...}` object.
fn json_document(text: &str) -> Option<Map<String, Value>> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("AI response JSON did not parse: {e}");
            None
        }
    }
}

/// Build a result from `{sizes, measurements, sku?, notes?}`.
///
/// Two measurement shapes are understood:
/// - keyed by size: `{"chest": {"S": "38", "M": "40"}}`
/// - one entry per value: `{"chest_s": {"size": "S", "value": "38"}}`
///
/// Returns `None` when there is no `sizes` array.
fn from_measurement_document(doc: &Map<String, Value>) -> Option<ExtractionResult> {
    let sizes: Vec<String> = doc.get("sizes")?.as_array()?.iter().map(cell_text).collect();
    let empty = Map::new();
    let measurements = doc
        .get("measurements")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let per_value = measurements
        .values()
        .next()
        .and_then(Value::as_object)
        .is_some_and(|m| m.contains_key("value"));

    let mut headers = vec!["SIZE".to_string()];
    for key in measurements.keys() {
        let header = header_name(key);
        if !headers.contains(&header) {
            headers.push(header);
        }
    }

    let mut rows: Vec<BTreeMap<String, String>> = sizes
        .iter()
        .map(|size| {
            headers
                .iter()
                .map(|h| {
                    let value = if h == "SIZE" { size.clone() } else { String::new() };
                    (h.clone(), value)
                })
                .collect()
        })
        .collect();

    for (key, measurement) in measurements {
        let header = header_name(key);
        let Some(measurement) = measurement.as_object() else {
            continue;
        };
        if per_value {
            let size = measurement.get("size").map(cell_text).unwrap_or_default();
            let value = measurement.get("value").map(cell_text).unwrap_or_default();
            if size.is_empty() || value.is_empty() {
                continue;
            }
            if let Some(idx) = sizes.iter().position(|s| *s == size) {
                rows[idx].insert(header, value);
            }
        } else {
            for (idx, size) in sizes.iter().enumerate() {
                let value = measurement.get(size).map(cell_text).unwrap_or_default();
                rows[idx].insert(header.clone(), value);
            }
        }
    }

    let sku = doc
        .get("sku")
        .map(cell_text)
        .filter(|s| !s.trim().is_empty());
    let notes = doc.get("notes").and_then(notes_value);

    if rows.is_empty() {
        let placeholder = placeholder_result();
        headers = placeholder.headers;
        rows = placeholder.rows;
    }

    Some(ExtractionResult {
        headers,
        rows,
        sku,
        notes,
    })
}

fn finish(
    headers: Vec<String>,
    rows: Vec<BTreeMap<String, String>>,
    sku: Option<String>,
    notes: Option<NotesBlock>,
) -> ExtractionResult {
    let placeholder = placeholder_result();
    ExtractionResult {
        headers: if headers.len() > 1 {
            headers
        } else {
            placeholder.headers
        },
        rows: if rows.is_empty() { placeholder.rows } else { rows },
        sku: sku.filter(|s| !s.is_empty()),
        notes,
    }
}

/// First line in `lines` that mentions a keyword and splits into at least
/// two header names.
fn header_line(lines: &[&str], keywords: &[&str]) -> Option<Vec<String>> {
    lines.iter().find_map(|line| {
        let lower = line.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k)) {
            return None;
        }
        let names: Vec<String> = line
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '|' | '-'))
            .filter(|h| h.chars().count() > 1)
            .map(str::to_uppercase)
            .collect();
        (names.len() >= 2).then_some(names)
    })
}

fn header_name(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

fn trim_symbols(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn notes_block(lines: Vec<String>) -> Option<NotesBlock> {
    if lines.is_empty() {
        None
    } else {
        Some(NotesBlock::new(NOTES_TITLE, lines))
    }
}

/// Notes may arrive as a string, a list of lines or `{title, items}`.
fn notes_value(value: &Value) -> Option<NotesBlock> {
    match value {
        Value::String(text) => notes_block(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect(),
        ),
        Value::Array(items) => notes_block(
            items
                .iter()
                .map(cell_text)
                .filter(|l| !l.is_empty())
                .collect(),
        ),
        Value::Object(map) => {
            let items: Vec<String> = map
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(cell_text).filter(|l| !l.is_empty()).collect())
                .unwrap_or_default();
            if items.is_empty() {
                return None;
            }
            let title = map
                .get("title")
                .map(cell_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| NOTES_TITLE.to_string());
            Some(NotesBlock::new(title, items))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> ChartTextParser {
        ChartTextParser::new().expect("patterns compile")
    }

    fn cell<'a>(result: &'a ExtractionResult, row: usize, header: &str) -> Option<&'a str> {
        result.rows.get(row)?.get(header).map(String::as_str)
    }

    #[test]
    fn test_size_keyed_measurements() {
        let payload = json!(
            "```json\n{\"sizes\": [\"S\", \"M\"], \"measurements\": {\"chest_width\": {\"S\": \"38\", \"M\": 40}, \"length\": {\"S\": \"60\"}}, \"sku\": \"AB-12\"}\n```"
        );
        let result = parser().parse_understand(&payload);
        assert_eq!(result.headers, vec!["SIZE", "CHEST WIDTH", "LENGTH"]);
        assert_eq!(cell(&result, 0, "SIZE"), Some("S"));
        assert_eq!(cell(&result, 0, "CHEST WIDTH"), Some("38"));
        assert_eq!(cell(&result, 1, "CHEST WIDTH"), Some("40"));
        assert_eq!(cell(&result, 1, "LENGTH"), Some(""));
        assert_eq!(result.sku.as_deref(), Some("AB-12"));
        assert!(result.notes.is_none());
    }

    #[test]
    fn test_value_per_entry_measurements() {
        let payload = json!({
            "sizes": ["S", "M"],
            "measurements": {
                "chest": {"size": "M", "value": "40", "unit": "cm"},
                "waist": {"size": "S", "value": "30"}
            },
            "notes": "Measured flat\nTolerance 1cm"
        });
        let result = parser().parse_understand(&payload);
        assert_eq!(result.headers, vec!["SIZE", "CHEST", "WAIST"]);
        assert_eq!(cell(&result, 0, "CHEST"), Some(""));
        assert_eq!(cell(&result, 1, "CHEST"), Some("40"));
        assert_eq!(cell(&result, 0, "WAIST"), Some("30"));
        let notes = result.notes.expect("notes");
        assert_eq!(notes.title(), "Please note:");
        assert_eq!(notes.items().len(), 2);
    }

    #[test]
    fn test_empty_sizes_give_placeholder_rows() {
        let result = parser().parse_understand(&json!("{\"sizes\": []}"));
        assert_eq!(result.headers, vec!["SIZE", "UKURAN"]);
        assert_eq!(cell(&result, 0, "SIZE"), Some("-"));
    }

    #[test]
    fn test_missing_result_is_placeholder() {
        assert_eq!(parser().parse_understand(&Value::Null), placeholder_result());
        assert_eq!(parser().parse_understand(&json!("   ")), placeholder_result());
    }

    #[test]
    fn test_text_response_rows_and_sku() {
        let text = "Size chart\nSKU: ZX-900\nS: 38 - 60\nM: 40 - 62\nxl 44, 66\nWash cold, do not tumble dry";
        let result = parser().parse_understand(&json!(text));
        assert_eq!(result.sku.as_deref(), Some("ZX-900"));
        assert_eq!(result.headers, vec!["SIZE", "COL1", "COL2"]);
        assert_eq!(result.rows.len(), 3);
        assert_eq!(cell(&result, 2, "SIZE"), Some("XL"));
        assert_eq!(cell(&result, 2, "COL2"), Some("66"));
        let notes = result.notes.expect("notes");
        assert_eq!(notes.items(), &["Wash cold, do not tumble dry"]);
    }

    #[test]
    fn test_text_response_header_detection() {
        let result = parser().parse_text_response("SIZE | CHEST | LENGTH\nnothing useful here");
        assert_eq!(result.headers, vec!["SIZE", "CHEST", "LENGTH"]);
        assert_eq!(cell(&result, 0, "SIZE"), Some("-"));
    }

    #[test]
    fn test_ocr_output_table() {
        let text = "Kode: SH-77\n| SIZE | EU | CM |\n| S | 38 | 24.5 |\nM 39 25 cm\nrandom footer text";
        let result = parser().parse_ocr_output(text);
        assert_eq!(result.sku.as_deref(), Some("SH-77"));
        assert_eq!(result.headers, vec!["SIZE", "EU", "CM"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(cell(&result, 0, "CM"), Some("24.5"));
        assert_eq!(cell(&result, 1, "CM"), Some("25 cm"));
        assert!(result.notes.is_none());
    }

    #[test]
    fn test_ocr_output_without_rows() {
        let result = parser().parse_ocr_output("hello world");
        assert_eq!(result.headers, vec!["SIZE", "UKURAN"]);
        assert_eq!(cell(&result, 0, "UKURAN"), Some("-"));
        assert_eq!(parser().parse_ocr_output(""), placeholder_result());
    }

    #[test]
    fn test_notes_object_form() {
        let notes = notes_value(&json!({"title": "Care", "items": ["Hand wash", 2]})).expect("notes");
        assert_eq!(notes.title(), "Care");
        assert_eq!(notes.items(), &["Hand wash", "2"]);
        assert!(notes_value(&json!({"items": []})).is_none());
    }
}
