#![deny(unsafe_code)]

//! Budget spreadsheet ingestion.
//!
//! Finds input files, reads one sheet per workbook (or a whole CSV) into a
//! raw grid, locates the header row and extracts a rectangular table, and
//! converts predominantly numeric text columns. Title rows above the header
//! can supply extra columns through [`TitlePattern`].

pub mod coerce;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod grid;
pub mod title;

pub use coerce::{NumericCoercion, coerce_numeric_columns};
pub use discovery::{InputKind, SUPPORTED_EXTENSIONS, discover_inputs, list_input_files};
pub use error::{ExtractError, IngestError, Result};
pub use extract::{
    ExtractOptions, ExtractedTable, default_hints, detect_header_row, extract,
};
pub use grid::{LoadedSheet, RawGrid, read_csv_grid, read_grid, read_reference_rows, select_sheet};
pub use title::{TitlePattern, capture_titles};
