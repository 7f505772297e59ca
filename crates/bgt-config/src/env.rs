//! Environment overrides for the quality gate thresholds.

use bgt_common::parse_f64;
use bgt_model::QualityThresholds;
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::settings::check_ratio;

pub const UNKNOWN_MAX_ENV: &str = "UNKNOWN_MAX";
pub const NONNULL_MIN_ENV: &str = "NONNULL_MIN";

fn read_override<F>(lookup: &F, name: &str) -> Result<Option<f64>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let value = parse_f64(&raw).ok_or_else(|| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: raw.clone(),
    })?;
    check_ratio(name, value).map(Some)
}

/// Applies `UNKNOWN_MAX` / `NONNULL_MIN` through `lookup`, returning the names
/// of the variables that took effect. Blank values are ignored.
pub fn apply_env_overrides<F>(thresholds: &mut QualityThresholds, lookup: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    if let Some(value) = read_override(&lookup, UNKNOWN_MAX_ENV)? {
        thresholds.unknown_max = value;
        applied.push(UNKNOWN_MAX_ENV.to_string());
    }
    if let Some(value) = read_override(&lookup, NONNULL_MIN_ENV)? {
        thresholds.nonnull_min = value;
        applied.push(NONNULL_MIN_ENV.to_string());
    }
    if !applied.is_empty() {
        info!(
            unknown_max = thresholds.unknown_max,
            nonnull_min = thresholds.nonnull_min,
            "quality thresholds overridden from environment"
        );
    }
    Ok(applied)
}
