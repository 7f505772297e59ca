#![deny(unsafe_code)]

//! Pipeline configuration.
//!
//! YAML documents are layered over the built-in defaults (scalars override,
//! lists append, maps merge), validated once, and turned into the option types
//! of the ingestion, mapping, classification and validation crates.

pub mod defaults;
pub mod env;
pub mod error;
pub mod file;
pub mod settings;

use std::path::Path;

use tracing::info;

pub use defaults::{UPPER_LEVEL_COLUMN, builtin};
pub use env::{NONNULL_MIN_ENV, UNKNOWN_MAX_ENV, apply_env_overrides};
pub use error::{ConfigError, Result};
pub use file::{ConfigFile, FileOverride, OrderedMap, TitlePatternSpec};
pub use settings::{DatadictSource, OutputSettings, PipelineConfig};

/// Layers `files` in order and, unless a layer sets `use_defaults: false`,
/// puts the built-in defaults underneath.
pub fn layer_files<I>(files: I) -> ConfigFile
where
    I: IntoIterator<Item = ConfigFile>,
{
    let user = files
        .into_iter()
        .fold(ConfigFile::default(), ConfigFile::layer);
    if user.use_defaults == Some(false) {
        user
    } else {
        builtin().layer(user)
    }
}

/// Loads, layers and validates the configuration files at `paths`.
pub fn load_config<P: AsRef<Path>>(paths: &[P]) -> Result<PipelineConfig> {
    let files = paths
        .iter()
        .map(|path| ConfigFile::load(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let config = PipelineConfig::from_file(layer_files(files))?;
    info!(
        files = paths.len(),
        canonical_fields = config.synonyms.len(),
        rules = config.classifier.rules.len(),
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = PipelineConfig::from_file(layer_files(Vec::new())).expect("defaults are valid");
        assert_eq!(config.classifier.amount_field, "p_total_bud");
        assert!(config.synonyms.get("หน่วยงาน").is_some());
        assert_eq!(config.classifier.fallback.len(), 3);
        assert_eq!(config.quality.unknown_value, "ไม่ทราบหมวด");
    }

    #[test]
    fn defaults_can_be_disabled() {
        let file = ConfigFile::from_yaml("use_defaults: false\n").expect("parse");
        let config = PipelineConfig::from_file(layer_files([file])).expect("build");
        assert!(config.synonyms.is_empty());
        assert!(config.classifier.fallback.is_empty());
    }
}
