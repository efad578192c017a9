//! In-memory tables: the typed result table and the untyped sheet it is
//! written as.

use crate::domain::{Column, TrackRecord};

use super::layout::ColumnHeaders;

/// Deduplicated catalog rows, ready for export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<TrackRecord>,
}

impl ResultTable {
    pub fn new(records: Vec<TrackRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lay the records out in canonical column order.
    ///
    /// Every column is emitted for every row, whatever the records carried,
    /// so the sheet shape never depends on the source data.
    pub fn to_sheet(&self, headers: &ColumnHeaders) -> Sheet {
        let rows = self
            .records
            .iter()
            .map(|record| {
                Column::ALL
                    .iter()
                    .map(|column| record.field(*column).to_string())
                    .collect()
            })
            .collect();

        Sheet {
            headers: headers.as_slice().to_vec(),
            rows,
        }
    }
}

/// A header row plus string rows, as read from or written to a workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Index of `header`, appending an empty column if it is missing
    pub fn ensure_column(&mut self, header: &str) -> usize {
        if let Some(index) = self.column_index(header) {
            return index;
        }
        self.headers.push(header.to_string());
        self.headers.len() - 1
    }

    /// Cell text; short rows read as empty
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= column {
                cells.resize(column + 1, String::new());
            }
            cells[column] = value.into();
        }
    }
}
