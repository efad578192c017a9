//! Header text for each catalog column.

use std::collections::{HashMap, HashSet};

use crate::domain::Column;

use super::ExportError;

/// Header row of the exported sheet, one entry per [`Column`] in canonical order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeaders {
    headers: Vec<String>,
}

impl Default for ColumnHeaders {
    fn default() -> Self {
        Self {
            headers: Column::ALL
                .iter()
                .map(|c| c.default_header().to_string())
                .collect(),
        }
    }
}

impl ColumnHeaders {
    /// Apply `column key -> header` overrides on top of the defaults
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, ExportError> {
        let mut layout = Self::default();

        for (key, header) in overrides {
            let column =
                Column::from_key(key).ok_or_else(|| ExportError::UnknownColumn(key.clone()))?;
            layout.headers[column.index()] = header.clone();
        }

        let mut seen = HashSet::new();
        for header in &layout.headers {
            if !seen.insert(header.as_str()) {
                return Err(ExportError::DuplicateHeader(header.clone()));
            }
        }

        Ok(layout)
    }

    pub fn header(&self, column: Column) -> &str {
        &self.headers[column.index()]
    }

    /// All headers in export order
    pub fn as_slice(&self) -> &[String] {
        &self.headers
    }

    /// Reverse lookup from header text
    pub fn column_for(&self, header: &str) -> Option<Column> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| Column::ALL[i])
    }
}
