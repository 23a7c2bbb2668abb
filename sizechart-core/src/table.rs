//! Tabular size data: ordered unique headers and rows keyed by header.
//!
//! Every row's key set equals `headers` at all times. The operations here
//! keep that invariant explicitly; there is no implicit map mutation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ChartError, ChartResult};

/// Stable identity of a row across edits and reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identity.
    pub id: RowId,
    /// Cell values keyed by header.
    pub cells: BTreeMap<String, String>,
}

impl Row {
    /// Row with every header mapped to an empty string.
    #[must_use]
    pub fn blank(headers: &[String]) -> Self {
        Self {
            id: RowId::new(),
            cells: headers.iter().map(|h| (h.clone(), String::new())).collect(),
        }
    }

    /// Cell value for a header.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }
}

/// Headers plus rows of a size chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl TableData {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from loosely shaped input.
    ///
    /// Duplicate headers get a numeric suffix. Rows are normalised so their
    /// key set equals the headers: missing keys become empty strings and
    /// unknown keys are dropped.
    #[must_use]
    pub fn from_parts(headers: Vec<String>, rows: Vec<BTreeMap<String, String>>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(headers.len());
        for header in headers {
            let mut candidate = header.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{header} {n}");
                n += 1;
            }
            unique.push(candidate);
        }

        let rows = rows
            .into_iter()
            .map(|mut cells| Row {
                id: RowId::new(),
                cells: unique
                    .iter()
                    .map(|h| (h.clone(), cells.remove(h).unwrap_or_default()))
                    .collect(),
            })
            .collect();

        Self {
            headers: unique,
            rows,
        }
    }

    /// Table shown when extraction produced nothing usable.
    #[must_use]
    pub fn placeholder() -> Self {
        let headers = vec!["SIZE".to_string(), "UKURAN".to_string()];
        let row = headers.iter().map(|h| (h.clone(), "-".to_string())).collect();
        Self::from_parts(headers, vec![row])
    }

    /// Ordered headers.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Ordered rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has neither headers nor rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Cell value at a row index and header.
    #[must_use]
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(header))
    }

    /// Index of the row with this id.
    #[must_use]
    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Whether every row's key set equals the headers.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.rows.iter().all(|row| {
            row.cells.len() == self.headers.len()
                && self.headers.iter().all(|h| row.cells.contains_key(h))
        })
    }

    /// Rename the header at `index`, moving the key in every row.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or `new_name` already
    /// names another column.
    pub fn rename_header(&mut self, index: usize, new_name: &str) -> ChartResult<()> {
        let len = self.headers.len();
        let old = self
            .headers
            .get(index)
            .cloned()
            .ok_or(ChartError::ColumnOutOfRange { index, len })?;
        if old == new_name {
            return Ok(());
        }
        if self.headers.iter().any(|h| h == new_name) {
            return Err(ChartError::DuplicateHeader(new_name.to_string()));
        }

        for row in &mut self.rows {
            let value = row.cells.remove(&old).unwrap_or_default();
            row.cells.insert(new_name.to_string(), value);
        }
        self.headers[index] = new_name.to_string();
        Ok(())
    }

    /// Set one cell. `row == len` appends a new blank row first; any row
    /// further out is rejected rather than padded with blank rows, so use
    /// [`TableData::add_row`] to grow the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is unknown or `row > len`.
    pub fn set_cell(&mut self, row: usize, header: &str, value: &str) -> ChartResult<()> {
        if !self.headers.iter().any(|h| h == header) {
            return Err(ChartError::UnknownHeader(header.to_string()));
        }
        let len = self.rows.len();
        if row > len {
            return Err(ChartError::RowOutOfRange { index: row, len });
        }
        if row == len {
            self.rows.push(Row::blank(&self.headers));
        }
        self.rows[row]
            .cells
            .insert(header.to_string(), value.to_string());
        Ok(())
    }

    /// Append a blank row, returning its id.
    pub fn add_row(&mut self) -> RowId {
        let row = Row::blank(&self.headers);
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Remove the row at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_row(&mut self, index: usize) -> ChartResult<Row> {
        let len = self.rows.len();
        if index >= len {
            return Err(ChartError::RowOutOfRange { index, len });
        }
        Ok(self.rows.remove(index))
    }

    /// Append a column named `Col {n+1}` and give every row an empty cell.
    pub fn add_column(&mut self) -> String {
        let mut n = self.headers.len() + 1;
        let mut name = format!("Col {n}");
        while self.headers.contains(&name) {
            n += 1;
            name = format!("Col {n}");
        }
        for row in &mut self.rows {
            row.cells.insert(name.clone(), String::new());
        }
        self.headers.push(name.clone());
        name
    }

    /// Remove the column at `index` from the headers and from every row.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_column(&mut self, index: usize) -> ChartResult<String> {
        let len = self.headers.len();
        if index >= len {
            return Err(ChartError::ColumnOutOfRange { index, len });
        }
        let name = self.headers.remove(index);
        for row in &mut self.rows {
            row.cells.remove(&name);
        }
        Ok(name)
    }

    /// Reorder rows to match `order`, which must be a permutation of the
    /// current row ids.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidPermutation`] if `order` has the wrong
    /// length, repeats an id or names an unknown row.
    pub fn reorder_rows(&mut self, order: &[RowId]) -> ChartResult<()> {
        if order.len() != self.rows.len() {
            return Err(ChartError::InvalidPermutation(format!(
                "expected {} rows, got {}",
                self.rows.len(),
                order.len()
            )));
        }
        let unique: HashSet<RowId> = order.iter().copied().collect();
        if unique.len() != order.len() || self.rows.iter().any(|r| !unique.contains(&r.id)) {
            return Err(ChartError::InvalidPermutation(
                "row ids missing or repeated".to_string(),
            ));
        }

        let mut by_id: HashMap<RowId, Row> = self.rows.drain(..).map(|r| (r.id, r)).collect();
        self.rows = order.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    /// Move the row at `from` so it ends up at index `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if either index is out of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> ChartResult<()> {
        let len = self.rows.len();
        if from >= len {
            return Err(ChartError::RowOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(ChartError::RowOutOfRange { index: to, len });
        }
        let mut order: Vec<RowId> = self.rows.iter().map(|r| r.id).collect();
        let id = order.remove(from);
        order.insert(to, id);
        self.reorder_rows(&order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableData {
        let row = [("A", "1"), ("B", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TableData::from_parts(vec!["A".into(), "B".into()], vec![row])
    }

    #[test]
    fn test_from_parts_normalises_keys() {
        let mut row = BTreeMap::new();
        row.insert("A".to_string(), "1".to_string());
        row.insert("Z".to_string(), "stray".to_string());
        let table = TableData::from_parts(vec!["A".into(), "B".into(), "A".into()], vec![row]);

        assert_eq!(table.headers(), &["A", "B", "A 2"]);
        assert!(table.is_consistent());
        assert_eq!(table.cell(0, "A"), Some("1"));
        assert_eq!(table.cell(0, "B"), Some(""));
        assert_eq!(table.cell(0, "Z"), None);
    }

    #[test]
    fn test_rename_header_moves_values() {
        let mut table = sample();
        table.rename_header(0, "X").expect("rename");
        assert_eq!(table.headers(), &["X", "B"]);
        assert_eq!(table.cell(0, "X"), Some("1"));
        assert_eq!(table.cell(0, "A"), None);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_rename_to_existing_rejected() {
        let mut table = sample();
        let before = table.clone();
        assert!(matches!(
            table.rename_header(0, "B"),
            Err(ChartError::DuplicateHeader(_))
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn test_set_cell_appends_at_end_only() {
        let mut table = sample();
        table.set_cell(1, "B", "x").expect("append");
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "A"), Some(""));
        assert!(matches!(
            table.set_cell(5, "A", "y"),
            Err(ChartError::RowOutOfRange { index: 5, len: 2 })
        ));
        assert!(matches!(
            table.set_cell(0, "Q", "y"),
            Err(ChartError::UnknownHeader(_))
        ));
    }

    #[test]
    fn test_add_column_names() {
        let mut table = sample();
        assert_eq!(table.add_column(), "Col 3");
        table.rename_header(0, "Col 4").expect("rename");
        assert_eq!(table.add_column(), "Col 5");
        assert!(table.is_consistent());
    }

    #[test]
    fn test_remove_column_is_total() {
        let mut table = sample();
        table.add_row();
        table.remove_column(1).expect("remove");
        assert_eq!(table.headers(), &["A"]);
        assert!(table.rows().iter().all(|r| !r.cells.contains_key("B")));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_reorder_keeps_ids() {
        let mut table = sample();
        let second = table.add_row();
        let first = table.rows()[0].id;

        table.reorder_rows(&[second, first]).expect("reorder");
        assert_eq!(table.row_index(second), Some(0));
        assert_eq!(table.row_index(first), Some(1));
        assert_eq!(table.cell(1, "A"), Some("1"));
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut table = sample();
        let second = table.add_row();
        let before = table.clone();

        assert!(table.reorder_rows(&[second, second]).is_err());
        assert_eq!(table, before);
        assert!(table.reorder_rows(&[second]).is_err());
        assert!(table.reorder_rows(&[second, RowId::new()]).is_err());
        assert_eq!(table, before);
    }

    #[test]
    fn test_move_row() {
        let mut table = sample();
        let a = table.rows()[0].id;
        let b = table.add_row();
        let c = table.add_row();
        table.move_row(0, 2).expect("move");
        let ids: Vec<RowId> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, c, a]);
    }

    #[test]
    fn test_placeholder() {
        let table = TableData::placeholder();
        assert_eq!(table.headers(), &["SIZE", "UKURAN"]);
        assert_eq!(table.cell(0, "UKURAN"), Some("-"));
    }
}
