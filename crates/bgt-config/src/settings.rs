//! Resolved, validated settings built from the layered configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use bgt_classify::ClassifierSettings;
use bgt_common::{format_numeric, normalize_text};
use bgt_ingest::{ExtractOptions, NumericCoercion, TitlePattern};
use bgt_map::{HeaderPattern, ResolveOptions, SynonymDictionary};
use bgt_model::{
    Assignment, CellValue, ClassificationRule, Clause, Condition, DerivedColumn, DerivedOp,
    FallbackDefaults, Matcher, QualityThresholds,
};
use bgt_validate::{QualityGateSettings, ValidationChecks};
use serde_yaml::Value;

use crate::error::{ConfigError, Result};
use crate::file::{ClauseSpec, ConfigFile, DerivedKind, DerivedSpec, FileOverride, RuleSpec};

/// Reference table merged into the synonym dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatadictSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub columns: Vec<String>,
    pub expected_core: Vec<String>,
}

/// Everything a pipeline run needs, validated.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub synonyms: SynonymDictionary,
    pub resolve: ResolveOptions,
    pub datadict: Option<DatadictSource>,
    pub extract: ExtractOptions,
    pub preferred_sheets: Vec<String>,
    pub ignore_files: Vec<String>,
    pub file_overrides: BTreeMap<String, FileOverride>,
    pub coercion: NumericCoercion,
    pub classifier: ClassifierSettings,
    pub validation: ValidationChecks,
    pub quality: QualityGateSettings,
    pub output: OutputSettings,
}

impl PipelineConfig {
    /// Extraction options for one input file, with its overrides applied.
    pub fn extract_options_for(&self, file_name: &str) -> ExtractOptions {
        let mut options = self.extract.clone();
        if let Some(file) = self.file_overrides.get(file_name) {
            if file.header_row.is_some() {
                options.header_row = file.header_row;
            }
            if let Some(span) = file.header_span {
                options.header_span = span;
            }
        }
        options
    }

    pub fn sheet_override_for(&self, file_name: &str) -> Option<&str> {
        self.file_overrides
            .get(file_name)
            .and_then(|file| file.sheet.as_deref())
    }

    /// Merges data dictionary rows into the synonyms, returning how many
    /// rows contributed.
    pub fn merge_reference(&mut self, rows: &[Vec<String>]) -> usize {
        let synonyms = std::mem::take(&mut self.synonyms);
        let (merged, count) = synonyms.merge_reference(rows);
        self.synonyms = merged;
        count
    }
}

fn names(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = normalize_text(&value);
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Text of a scalar YAML value used as a match target.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(normalize_text(text)),
        Value::Number(number) if number.is_f64() => number.as_f64().map(format_numeric),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Cell value of a scalar YAML value used as an assignment or default.
fn scalar_cell(value: &Value) -> Option<CellValue> {
    match value {
        Value::String(text) => Some(CellValue::Text(normalize_text(text))),
        Value::Number(number) => number.as_f64().map(CellValue::Number),
        Value::Bool(flag) => Some(CellValue::Text(flag.to_string())),
        Value::Null => Some(CellValue::Missing),
        _ => None,
    }
}

fn build_clause(label: &str, spec: &ClauseSpec) -> Result<Clause> {
    let field = spec
        .field
        .as_deref()
        .map(normalize_text)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| ConfigError::rule(label, "clause has no field"))?;

    let mut matchers = Vec::new();
    if let Some(equals) = &spec.equals {
        let value = scalar_text(equals)
            .ok_or_else(|| ConfigError::rule(label, "`equals` must be a scalar"))?;
        matchers.push(Matcher::Equals { value });
    }
    if !spec.equals_any.is_empty() {
        let values = spec
            .equals_any
            .iter()
            .map(|value| {
                scalar_text(value)
                    .ok_or_else(|| ConfigError::rule(label, "`equals_any` must list scalars"))
            })
            .collect::<Result<Vec<_>>>()?;
        matchers.push(Matcher::EqualsAny { values });
    }
    let keywords: Vec<String> = spec
        .contains_any
        .iter()
        .map(|keyword| normalize_text(keyword))
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if !keywords.is_empty() {
        matchers.push(Matcher::ContainsAny { keywords });
    }
    if matchers.is_empty() {
        return Err(ConfigError::rule(
            label,
            format!("clause on `{field}` has no equals, equals_any or contains_any"),
        ));
    }
    Ok(Clause::new(field, matchers))
}

fn build_rule(index: usize, spec: &RuleSpec) -> Result<ClassificationRule> {
    let label = spec.name.clone().unwrap_or_else(|| format!("#{index}"));
    let condition = match (&spec.when, spec.when_any.is_empty()) {
        (Some(_), false) => {
            return Err(ConfigError::rule(
                label,
                "use either `when` or `when_any`, not both",
            ));
        }
        (Some(clause), true) => Condition::Clause(build_clause(&label, clause)?),
        (None, false) => Condition::AnyOf(
            spec.when_any
                .iter()
                .map(|clause| build_clause(&label, clause))
                .collect::<Result<_>>()?,
        ),
        (None, true) => return Err(ConfigError::rule(label, "missing `when` or `when_any`")),
    };
    if spec.set.is_empty() {
        return Err(ConfigError::rule(label, "`set` is empty"));
    }
    let assignments = spec
        .set
        .iter()
        .map(|(field, value)| {
            let field = normalize_text(field);
            if field.is_empty() {
                return Err(ConfigError::rule(&label, "`set` has a blank field name"));
            }
            let value = scalar_cell(value).ok_or_else(|| {
                ConfigError::rule(&label, format!("value for `{field}` must be a scalar"))
            })?;
            Ok(Assignment { field, value })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ClassificationRule {
        name: spec.name.clone(),
        condition,
        assignments,
    })
}

fn build_derived(spec: &DerivedSpec) -> Result<DerivedColumn> {
    let name = normalize_text(&spec.name);
    if name.is_empty() {
        return Err(ConfigError::derived(&spec.name, "name is blank"));
    }
    let fields = names(spec.fields.clone());
    let op = match spec.kind {
        DerivedKind::Concat | DerivedKind::Sum if fields.is_empty() => {
            return Err(ConfigError::derived(name, "`fields` is empty"));
        }
        DerivedKind::Concat => DerivedOp::Concat {
            fields,
            separator: spec.separator.clone().unwrap_or_default(),
        },
        DerivedKind::Sum => DerivedOp::Sum { fields },
        DerivedKind::Ratio => {
            let operand = |value: &Option<String>, key: &str| {
                value
                    .as_deref()
                    .map(normalize_text)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ConfigError::derived(&name, format!("`{key}` is required")))
            };
            DerivedOp::Ratio {
                numerator: operand(&spec.numerator, "numerator")?,
                denominator: operand(&spec.denominator, "denominator")?,
            }
        }
    };
    Ok(DerivedColumn {
        name,
        op,
        round: spec.round,
    })
}

pub(crate) fn check_ratio(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold {
            name: name.to_string(),
            value,
        })
    }
}

fn check_span(field: &str, span: usize) -> Result<usize> {
    if (1..=2).contains(&span) {
        Ok(span)
    } else {
        Err(ConfigError::value(field, format!("{span} (expected 1 or 2)")))
    }
}

impl PipelineConfig {
    /// Validates a fully layered configuration document.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let synonyms = SynonymDictionary::from_pairs(
            file.synonyms
                .iter()
                .map(|(canonical, aliases)| (normalize_text(canonical), aliases)),
        );

        let patterns = file
            .header
            .patterns
            .iter()
            .map(|spec| HeaderPattern::new(&spec.pattern, &spec.canonical))
            .collect::<bgt_map::Result<Vec<_>>>()?;
        let resolve = ResolveOptions {
            contains_fallback: file.header.contains_fallback.unwrap_or(true),
            direction: file.header.match_direction.unwrap_or_default(),
            patterns,
            rename: file
                .header
                .rename
                .iter()
                .map(|(from, to)| (normalize_text(from), normalize_text(to)))
                .collect(),
        };

        let datadict = file.datadict.path.clone().map(|path| DatadictSource {
            path,
            sheet: file.datadict.sheet.clone(),
        });

        let defaults = ExtractOptions::default();
        let extract_section = &file.extract;
        let extract = ExtractOptions {
            hints: names(extract_section.hints.clone()),
            hint_bonus: extract_section.hint_bonus.unwrap_or(defaults.hint_bonus),
            max_scan_rows: extract_section
                .max_scan_rows
                .unwrap_or(defaults.max_scan_rows),
            header_span: check_span(
                "extract.header_span",
                extract_section.header_span.unwrap_or(defaults.header_span),
            )?,
            header_row: None,
            title_patterns: extract_section
                .title_patterns
                .iter()
                .map(|spec| {
                    TitlePattern::new(
                        &spec.pattern,
                        &normalize_text(&spec.code_column),
                        &normalize_text(&spec.name_column),
                    )
                    .map_err(|err| ConfigError::value("extract.title_patterns", err.to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        let mut file_overrides = BTreeMap::new();
        for (name, value) in extract_section.file_overrides.iter() {
            if let Some(span) = value.header_span {
                check_span(&format!("extract.file_overrides.{name}.header_span"), span)?;
            }
            file_overrides.insert(name.to_string(), value.clone());
        }

        let coercion_defaults = NumericCoercion::default();
        let coercion = NumericCoercion {
            min_count: extract_section
                .numeric_min_count
                .unwrap_or(coercion_defaults.min_count),
            min_ratio: check_ratio(
                "extract.numeric_min_ratio",
                extract_section
                    .numeric_min_ratio
                    .unwrap_or(coercion_defaults.min_ratio),
            )?,
            percent_columns: names(extract_section.percent_columns.clone()),
        };

        let rules = file
            .rules
            .iter()
            .enumerate()
            .map(|(index, spec)| build_rule(index, spec))
            .collect::<Result<Vec<_>>>()?;
        let mut fallback = FallbackDefaults::new();
        for (field, value) in file.fallback.iter() {
            let cell = scalar_cell(value).ok_or_else(|| {
                ConfigError::value(format!("fallback.{field}"), "must be a scalar")
            })?;
            fallback.insert(normalize_text(field), cell);
        }
        let amount_field = file
            .amount_field
            .as_deref()
            .map(normalize_text)
            .filter(|field| !field.is_empty())
            .unwrap_or_else(|| bgt_classify::DEFAULT_AMOUNT_FIELD.to_string());
        let derived_columns = file
            .derived_columns
            .iter()
            .map(build_derived)
            .collect::<Result<Vec<_>>>()?;
        let classifier = ClassifierSettings {
            rules,
            fallback,
            amount_field: amount_field.clone(),
            required_columns: names(file.required_columns.clone()),
            derived_columns,
        };

        let validation = ValidationChecks {
            decimal_places: file
                .validation
                .decimal_places
                .iter()
                .map(|(column, places)| (normalize_text(column), *places))
                .collect(),
            non_negative: names(file.validation.non_negative.clone()),
            not_null: names(file.validation.not_null.clone()),
        };

        let gate_defaults = QualityGateSettings::default();
        let quality = QualityGateSettings {
            amount_field,
            category_field: file
                .quality
                .category_field
                .as_deref()
                .map(normalize_text)
                .unwrap_or(gate_defaults.category_field),
            unknown_value: file
                .quality
                .unknown_value
                .as_deref()
                .map(normalize_text)
                .unwrap_or(gate_defaults.unknown_value),
            thresholds: QualityThresholds {
                unknown_max: check_ratio(
                    "quality.unknown_max",
                    file.quality
                        .unknown_max
                        .unwrap_or(gate_defaults.thresholds.unknown_max),
                )?,
                nonnull_min: check_ratio(
                    "quality.nonnull_min",
                    file.quality
                        .nonnull_min
                        .unwrap_or(gate_defaults.thresholds.nonnull_min),
                )?,
            },
        };

        Ok(Self {
            synonyms,
            resolve,
            datadict,
            extract,
            preferred_sheets: names(file.extract.preferred_sheets.clone()),
            ignore_files: names(file.extract.ignore_files.clone()),
            file_overrides,
            coercion,
            classifier,
            validation,
            quality,
            output: OutputSettings {
                columns: names(file.output.columns),
                expected_core: names(file.output.expected_core),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigFile {
        ConfigFile::from_yaml(yaml).expect("parse yaml")
    }

    #[test]
    fn rule_targets_are_normalized_and_sorted() {
        let file = parse(
            "rules:\n  - name: invest\n    when:\n      field: cap_ncap\n      contains_any: [' ลงทุน ']\n      equals: 'ค่า\u{200B}ลงทุน'\n    set:\n      budget_group: งบลงทุน\n",
        );
        let config = PipelineConfig::from_file(file).expect("build config");
        let rule = &config.classifier.rules[0];
        let Condition::Clause(clause) = &rule.condition else {
            panic!("expected single clause");
        };
        assert_eq!(
            clause.matchers,
            [
                Matcher::Equals {
                    value: "ค่าลงทุน".to_string()
                },
                Matcher::ContainsAny {
                    keywords: vec!["ลงทุน".to_string()]
                },
            ]
        );
    }

    #[test]
    fn numeric_equals_target_matches_rendered_number() {
        let file = parse("rules:\n  - when: {field: objc, equals: 1}\n    set: {group: a}\n");
        let config = PipelineConfig::from_file(file).expect("build config");
        let Condition::Clause(clause) = &config.classifier.rules[0].condition else {
            panic!("expected single clause");
        };
        assert_eq!(
            clause.matchers[0],
            Matcher::Equals {
                value: "1".to_string()
            }
        );
    }

    #[test]
    fn rule_without_condition_is_rejected() {
        let err = PipelineConfig::from_file(parse("rules:\n  - set: {a: b}\n"))
            .expect_err("rule without condition");
        assert!(err.to_string().contains("#0"));
    }

    #[test]
    fn header_span_is_bounded() {
        let err = PipelineConfig::from_file(parse("extract:\n  header_span: 3\n"))
            .expect_err("span 3");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn file_override_applies_to_one_file() {
        let file = parse(
            "extract:\n  file_overrides:\n    a.xlsx: {sheet: data, header_row: 4, header_span: 2}\n",
        );
        let config = PipelineConfig::from_file(file).expect("build config");
        let a = config.extract_options_for("a.xlsx");
        assert_eq!(a.header_row, Some(4));
        assert_eq!(a.header_span, 2);
        assert_eq!(config.sheet_override_for("a.xlsx"), Some("data"));
        assert_eq!(config.extract_options_for("b.xlsx").header_row, None);
    }

    #[test]
    fn title_patterns_are_compiled() {
        let file = parse(
            "extract:\n  title_patterns:\n    - pattern: 'จังหวัด\\s*(\\d+)\\s+(.+)'\n      code_column: province_code\n      name_column: province_name\n",
        );
        let config = PipelineConfig::from_file(file).expect("build config");
        let patterns = &config.extract_options_for("a.xlsx").title_patterns;
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].code_column(), "province_code");
        assert_eq!(patterns[0].name_column(), "province_name");

        let err = PipelineConfig::from_file(parse(
            "extract:\n  title_patterns:\n    - {pattern: 'x(\\d+)', code_column: a, name_column: b}\n",
        ))
        .expect_err("one capture group");
        assert!(err.to_string().contains("extract.title_patterns"));
    }
}
