//! The on-disk YAML document and layering of several documents.

use std::path::{Path, PathBuf};

use bgt_map::MatchDirection;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// A YAML mapping that keeps its keys in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges `other` into `self`; existing keys are combined with `combine`,
    /// new keys are appended in `other`'s order.
    fn merge_with(&mut self, other: Self, mut combine: impl FnMut(&mut V, V)) {
        for (key, value) in other.0 {
            match self.0.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => combine(existing, value),
                None => self.0.push((key, value)),
            }
        }
    }

    fn merge_replacing(&mut self, other: Self) {
        self.merge_with(other, |existing, value| *existing = value);
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de, V: DeserializeOwned> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(mapping) = Option::<Mapping>::deserialize(deserializer)? else {
            return Ok(Self::default());
        };
        mapping
            .into_iter()
            .map(|(key, value)| -> std::result::Result<(String, V), D::Error> {
                let key = match key {
                    Value::String(text) => text,
                    Value::Number(number) => number.to_string(),
                    Value::Bool(flag) => flag.to_string(),
                    _ => return Err(D::Error::custom("mapping keys must be scalars")),
                };
                let value = serde_yaml::from_value(value)
                    .map_err(|err| D::Error::custom(format!("{key}: {err}")))?;
                Ok((key, value))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }
}

fn override_with<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderSection {
    pub match_direction: Option<MatchDirection>,
    pub contains_fallback: Option<bool>,
    pub patterns: Vec<PatternSpec>,
    pub rename: OrderedMap<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    pub pattern: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatadictSection {
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
}

/// Per-file extraction settings keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOverride {
    pub sheet: Option<String>,
    /// 0-based grid row of the header.
    pub header_row: Option<usize>,
    pub header_span: Option<usize>,
}

/// Regex over the rows above the header; group 1 fills `code_column`,
/// group 2 fills `name_column`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitlePatternSpec {
    pub pattern: String,
    pub code_column: String,
    pub name_column: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractSection {
    pub hints: Vec<String>,
    pub hint_bonus: Option<usize>,
    pub max_scan_rows: Option<usize>,
    pub header_span: Option<usize>,
    pub preferred_sheets: Vec<String>,
    pub numeric_min_count: Option<usize>,
    pub numeric_min_ratio: Option<f64>,
    pub percent_columns: Vec<String>,
    pub ignore_files: Vec<String>,
    pub file_overrides: OrderedMap<FileOverride>,
    pub title_patterns: Vec<TitlePatternSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClauseSpec {
    pub field: Option<String>,
    pub equals: Option<serde_yaml::Value>,
    pub equals_any: Vec<serde_yaml::Value>,
    pub contains_any: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSpec {
    pub name: Option<String>,
    pub when: Option<ClauseSpec>,
    pub when_any: Vec<ClauseSpec>,
    pub set: OrderedMap<serde_yaml::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedKind {
    Concat,
    Sum,
    Ratio,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedSpec {
    pub name: String,
    pub kind: DerivedKind,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub numerator: Option<String>,
    #[serde(default)]
    pub denominator: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationSection {
    pub decimal_places: OrderedMap<u32>,
    pub non_negative: Vec<String>,
    pub not_null: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualitySection {
    pub category_field: Option<String>,
    pub unknown_value: Option<String>,
    pub unknown_max: Option<f64>,
    pub nonnull_min: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Master schema: these columns lead the master table in this order.
    pub columns: Vec<String>,
    /// Columns whose absence from the merged table is worth a warning.
    pub expected_core: Vec<String>,
}

/// One configuration document.
///
/// Every field is optional so that documents can be layered: later scalars
/// override, lists append and maps merge key by key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Set to `false` to start from an empty configuration instead of the
    /// built-in defaults.
    pub use_defaults: Option<bool>,
    pub synonyms: OrderedMap<Vec<String>>,
    pub header: HeaderSection,
    pub datadict: DatadictSection,
    pub extract: ExtractSection,
    pub rules: Vec<RuleSpec>,
    pub fallback: OrderedMap<serde_yaml::Value>,
    pub amount_field: Option<String>,
    pub required_columns: Vec<String>,
    pub derived_columns: Vec<DerivedSpec>,
    pub validation: ValidationSection,
    pub quality: QualitySection,
    pub output: OutputSection,
}

impl ConfigFile {
    /// Parses a YAML document. An empty document is an empty configuration.
    pub fn from_yaml(content: &str) -> serde_yaml::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Reads and parses `path`. A relative data dictionary path is resolved
    /// against the directory of the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let mut file = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(datadict) = file.datadict.path.as_mut()
            && datadict.is_relative()
            && let Some(parent) = path.parent()
        {
            *datadict = parent.join(&*datadict);
        }
        debug!(path = %path.display(), rules = file.rules.len(), "parsed config file");
        Ok(file)
    }

    /// Layers `other` on top of `self`.
    pub fn layer(mut self, other: Self) -> Self {
        override_with(&mut self.use_defaults, other.use_defaults);
        self.synonyms.merge_with(other.synonyms, |aliases, more| {
            for alias in more {
                if !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
        });

        let header = other.header;
        override_with(&mut self.header.match_direction, header.match_direction);
        override_with(&mut self.header.contains_fallback, header.contains_fallback);
        self.header.patterns.extend(header.patterns);
        self.header.rename.merge_replacing(header.rename);

        override_with(&mut self.datadict.path, other.datadict.path);
        override_with(&mut self.datadict.sheet, other.datadict.sheet);

        let extract = other.extract;
        self.extract.hints.extend(extract.hints);
        override_with(&mut self.extract.hint_bonus, extract.hint_bonus);
        override_with(&mut self.extract.max_scan_rows, extract.max_scan_rows);
        override_with(&mut self.extract.header_span, extract.header_span);
        self.extract.preferred_sheets.extend(extract.preferred_sheets);
        override_with(&mut self.extract.numeric_min_count, extract.numeric_min_count);
        override_with(&mut self.extract.numeric_min_ratio, extract.numeric_min_ratio);
        self.extract.percent_columns.extend(extract.percent_columns);
        self.extract.ignore_files.extend(extract.ignore_files);
        self.extract.title_patterns.extend(extract.title_patterns);
        self.extract
            .file_overrides
            .merge_with(extract.file_overrides, |existing, value| {
                override_with(&mut existing.sheet, value.sheet);
                override_with(&mut existing.header_row, value.header_row);
                override_with(&mut existing.header_span, value.header_span);
            });

        self.rules.extend(other.rules);
        self.fallback.merge_replacing(other.fallback);
        override_with(&mut self.amount_field, other.amount_field);
        self.required_columns.extend(other.required_columns);
        self.derived_columns.extend(other.derived_columns);

        self.validation
            .decimal_places
            .merge_replacing(other.validation.decimal_places);
        self.validation
            .non_negative
            .extend(other.validation.non_negative);
        self.validation.not_null.extend(other.validation.not_null);

        let quality = other.quality;
        override_with(&mut self.quality.category_field, quality.category_field);
        override_with(&mut self.quality.unknown_value, quality.unknown_value);
        override_with(&mut self.quality.unknown_max, quality.unknown_max);
        override_with(&mut self.quality.nonnull_min, quality.nonnull_min);

        self.output.columns.extend(other.output.columns);
        self.output.expected_core.extend(other.output.expected_core);
        self
    }
}
