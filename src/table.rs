use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};

/// In-memory stand-in for a loaded spreadsheet: one header row plus a grid
/// of optional string cells. File parsing lives with the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The cell count must match the header count.
    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(ReconcileError::RowLengthMismatch {
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value at (row, column name). `None` for missing columns, empty
    /// cells, and whitespace-only cells.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)?
            .get(idx)?
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.headers[idx] = to.to_string();
        }
    }

    /// Copies an existing column under a new header name.
    pub fn duplicate_column(&mut self, source: &str, new_name: &str) {
        if let Some(idx) = self.column_index(source) {
            self.headers.push(new_name.to_string());
            for row in &mut self.rows {
                let cell = row[idx].clone();
                row.push(cell);
            }
        }
    }

    /// Distinct non-empty values of a column, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for row in 0..self.rows.len() {
            if let Some(v) = self.value(row, column) {
                if !seen.iter().any(|s| s == v) {
                    seen.push(v.to_string());
                }
            }
        }
        seen
    }
}
