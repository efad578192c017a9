//! Tabular export of the catalog.
//!
//! - `layout`: header text per column
//! - `table`: typed result table and untyped sheet
//! - `workbook`: `.xlsx` encoding/decoding and atomic file writes

pub mod layout;
pub mod table;
pub mod workbook;

use thiserror::Error;

pub use layout::ColumnHeaders;
pub use table::{ResultTable, Sheet};

/// Errors from laying out, encoding or reading workbooks
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown column key: {0}")]
    UnknownColumn(String),

    #[error("Header used for more than one column: {0}")]
    DuplicateHeader(String),

    #[error("Sheet too large for a workbook: {rows} rows x {columns} columns")]
    TooLarge { rows: usize, columns: usize },

    #[error("Failed to encode workbook: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Decode(#[from] calamine::XlsxError),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
