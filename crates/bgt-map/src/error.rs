//! Error types for header resolution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid header pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, MapError>;
