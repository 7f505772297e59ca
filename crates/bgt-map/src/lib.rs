#![deny(unsafe_code)]

//! Header resolution: maps raw spreadsheet headers onto canonical field names
//! through an ordered synonym dictionary, substring and pattern fallbacks,
//! final renames and positional de-duplication.

pub mod dictionary;
pub mod error;
pub mod resolve;

pub use dictionary::{SynonymDictionary, SynonymEntry};
pub use error::{MapError, Result};
pub use resolve::{
    HeaderPattern, MatchDirection, MatchKind, ResolveOptions, ResolvedHeader, dedupe_names,
    resolve, resolve_detailed, unknown_headers,
};
