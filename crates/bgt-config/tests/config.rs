use std::fs;
use std::path::Path;

use bgt_config::{ConfigError, apply_env_overrides, load_config};
use bgt_model::{CellValue, Condition, QualityThresholds};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write config");
    path
}

const BASE: &str = r#"
datadict:
  path: dict/datadict.xlsx
rules:
  - name: personnel
    when:
      field: plan_name
      contains_any: [บุคลากร]
    set:
      budget_group: งบบุคลากร
quality:
  unknown_max: 0.05
validation:
  not_null: [item_name]
"#;

const SITE: &str = r#"
rules:
  - name: investment
    when_any:
      - field: cap_ncap
        equals: ลงทุน
      - field: item_name
        contains_any: [ครุภัณฑ์, สิ่งก่อสร้าง]
    set:
      budget_group: งบลงทุน
      expenditure_type: ลงทุน
fallback:
  plan_group: อื่นๆ
quality:
  nonnull_min: 0.9
header:
  rename:
    ปี2569: FY69
"#;

#[test]
fn files_layer_over_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let base = write(dir.path(), "base.yaml", BASE);
    let site = write(dir.path(), "site.yaml", SITE);

    let config = load_config(&[base, site]).expect("load config");

    let labels: Vec<String> = config
        .classifier
        .rules
        .iter()
        .enumerate()
        .map(|(i, rule)| rule.label(i))
        .collect();
    assert_eq!(labels, ["personnel", "investment"]);
    assert!(matches!(
        &config.classifier.rules[1].condition,
        Condition::AnyOf(clauses) if clauses.len() == 2
    ));

    assert_eq!(
        config.classifier.fallback.get("plan_group"),
        Some(&CellValue::text("อื่นๆ"))
    );
    assert_eq!(
        config.classifier.fallback.get("budget_group"),
        Some(&CellValue::text("ไม่ทราบหมวด"))
    );
    assert_eq!(
        config.quality.thresholds,
        QualityThresholds {
            unknown_max: 0.05,
            nonnull_min: 0.9,
        }
    );
    assert_eq!(config.validation.not_null, ["item_name"]);
    assert_eq!(config.validation.non_negative, ["p_total_bud"]);
    assert_eq!(config.resolve.rename.get("ปี2569").map(String::as_str), Some("FY69"));

    let datadict = config.datadict.expect("datadict configured");
    assert_eq!(datadict.path, dir.path().join("dict/datadict.xlsx"));
}

#[test]
fn environment_overrides_config() {
    let dir = TempDir::new().expect("temp dir");
    let base = write(dir.path(), "base.yaml", BASE);
    let mut config = load_config(&[base]).expect("load config");

    let applied = apply_env_overrides(&mut config.quality.thresholds, |name| {
        (name == "UNKNOWN_MAX").then(|| "0.1".to_string())
    })
    .expect("valid override");
    assert_eq!(applied, ["UNKNOWN_MAX"]);
    assert_eq!(config.quality.thresholds.unknown_max, 0.1);
    assert_eq!(config.quality.thresholds.nonnull_min, 0.95);
}

#[test]
fn invalid_environment_value_is_an_error() {
    let mut thresholds = QualityThresholds::default();
    let err = apply_env_overrides(&mut thresholds, |name| {
        (name == "NONNULL_MIN").then(|| "ninety".to_string())
    })
    .expect_err("non-numeric");
    assert!(matches!(err, ConfigError::InvalidEnv { ref name, .. } if name == "NONNULL_MIN"));

    let err = apply_env_overrides(&mut thresholds, |_| Some("1.5".to_string()))
        .expect_err("out of range");
    assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
}

#[test]
fn malformed_yaml_reports_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let bad = write(dir.path(), "bad.yaml", "rules: [\n");
    let err = load_config(&[bad.clone()]).expect_err("malformed yaml");
    assert!(matches!(err, ConfigError::Yaml { ref path, .. } if *path == bad));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_config(&[dir.path().join("absent.yaml")]).expect_err("missing file");
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn invalid_pattern_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "patterns.yaml",
        "header:\n  patterns:\n    - pattern: '(unclosed'\n      canonical: x\n",
    );
    let err = load_config(&[path]).expect_err("bad regex");
    assert!(matches!(err, ConfigError::InvalidPattern(_)));
}

#[test]
fn derived_ratio_requires_operands() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "derived.yaml",
        "derived_columns:\n  - name: share\n    kind: ratio\n    numerator: p_total_bud\n",
    );
    let err = load_config(&[path]).expect_err("missing denominator");
    assert!(err.to_string().contains("denominator"));
}
