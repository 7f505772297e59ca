use std::path::PathBuf;

use bgt_map::MapError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid rule {rule}: {message}")]
    InvalidRule { rule: String, message: String },

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    #[error(transparent)]
    InvalidPattern(#[from] MapError),

    #[error("invalid derived column `{name}`: {message}")]
    InvalidDerived { name: String, message: String },

    #[error("environment variable {name}={value:?} is not a number")]
    InvalidEnv { name: String, value: String },

    #[error("threshold {name} = {value} must lie within 0..=1")]
    InvalidThreshold { name: String, value: f64 },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub(crate) fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn derived(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDerived {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
