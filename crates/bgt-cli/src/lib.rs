#![deny(unsafe_code)]

//! Batch consolidation of budget request spreadsheets.

pub mod logging;
pub mod pipeline;
pub mod types;

pub use pipeline::{load_pipeline_config, process_file, run_batch, run_batch_with_env};
pub use types::{BatchOptions, BatchResult, BatchStatus};
