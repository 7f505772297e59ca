#![deny(unsafe_code)]

//! Shared utilities for the budget consolidation crates.
//!
//! This crate provides the text normalizer every comparison in the workspace
//! goes through, plus small numeric helpers used by ingestion, classification
//! and output.

pub mod numeric;
pub mod text;

// Re-export commonly used functions at crate root for convenience
pub use numeric::{format_numeric, parse_amount, parse_f64, strip_thousands};
pub use text::{fold_key, is_blank, normalize_text};
