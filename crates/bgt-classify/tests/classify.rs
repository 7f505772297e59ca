use bgt_classify::{ClassifierSettings, classify, classify_table};
use bgt_model::{
    Assignment, CellValue, ClassificationRule, Clause, Condition, DerivedColumn, DerivedOp,
    FallbackDefaults, Matcher, Row, Table,
};
use proptest::prelude::*;

fn assign(field: &str, value: &str) -> Assignment {
    Assignment {
        field: field.to_string(),
        value: CellValue::text(value),
    }
}

fn contains_rule(name: &str, field: &str, keyword: &str, set: Vec<Assignment>) -> ClassificationRule {
    ClassificationRule {
        name: Some(name.to_string()),
        condition: Condition::Clause(Clause::new(
            field,
            vec![Matcher::ContainsAny {
                keywords: vec![keyword.to_string()],
            }],
        )),
        assignments: set,
    }
}

fn fallback() -> FallbackDefaults {
    FallbackDefaults::from([
        ("budget_group".to_string(), CellValue::text("ไม่ทราบหมวด")),
        ("plan_group".to_string(), CellValue::text("ไม่ทราบแผน")),
        ("expenditure_type".to_string(), CellValue::text("ประจำ")),
    ])
}

#[test]
fn later_matching_rule_wins_per_field() {
    let rules = vec![
        contains_rule(
            "personnel",
            "plan_name",
            "บุคลากร",
            vec![assign("budget_group", "งบบุคลากร"), assign("plan_group", "แผนบุคลากร")],
        ),
        contains_rule(
            "investment",
            "cap_ncap",
            "ลงทุน",
            vec![assign("budget_group", "งบลงทุน")],
        ),
    ];
    let row = Row::from_iter([
        ("plan_name", CellValue::text("แผนงานบุคลากรภาครัฐ")),
        ("cap_ncap", CellValue::text("ลงทุน")),
    ]);
    let (classified, outcome) = classify(row, &rules, &fallback());
    assert_eq!(outcome.matched_rules, [0, 1]);
    assert_eq!(classified.get("budget_group"), &CellValue::text("งบลงทุน"));
    assert_eq!(classified.get("plan_group"), &CellValue::text("แผนบุคลากร"));
    assert_eq!(classified.get("expenditure_type"), &CellValue::text("ประจำ"));
    assert_eq!(outcome.fallback_fields, ["expenditure_type"]);
}

#[test]
fn fallback_applies_when_nothing_matches() {
    let (classified, outcome) = classify(Row::new(), &[], &fallback());
    assert_eq!(classified.get("budget_group"), &CellValue::text("ไม่ทราบหมวด"));
    assert_eq!(outcome.fallback_fields.len(), 3);
}

#[test]
fn explicit_empty_assignment_blocks_fallback() {
    let rules = vec![contains_rule(
        "clear",
        "item_name",
        "ค่า",
        vec![assign("plan_group", "")],
    )];
    let row = Row::from_iter([("item_name", CellValue::text("ค่าเช่า"))]);
    let (classified, outcome) = classify(row, &rules, &fallback());
    assert_eq!(classified.get("plan_group"), &CellValue::text(""));
    assert!(!outcome.fallback_fields.contains(&"plan_group".to_string()));
}

#[test]
fn classify_table_adds_columns_and_coerces_amounts() {
    let mut table = Table::new(vec!["item_name".to_string(), "p_total_bud".to_string()]);
    table.push_row(Row::from_iter([
        ("item_name", CellValue::text("ค่าเช่า")),
        ("p_total_bud", CellValue::text("1,234.50")),
    ]));
    table.push_row(Row::from_iter([
        ("item_name", CellValue::text("อื่นๆ")),
        ("p_total_bud", CellValue::text("N/A")),
    ]));
    let settings = ClassifierSettings {
        rules: vec![contains_rule(
            "rent",
            "item_name",
            "ค่าเช่า",
            vec![assign("budget_group", "งบดำเนินงาน")],
        )],
        fallback: fallback(),
        amount_field: "p_total_bud".to_string(),
        required_columns: vec!["agc_name".to_string()],
        derived_columns: vec![DerivedColumn {
            name: "ล้านบาท".to_string(),
            op: DerivedOp::Ratio {
                numerator: "p_total_bud".to_string(),
                denominator: "หน่วย".to_string(),
            },
            round: None,
        }],
    };

    let summary = classify_table(&mut table, &settings);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.unmatched_rows, 1);
    assert_eq!(summary.rule_hits.get("rent"), Some(&1));
    assert!(table.has_column("agc_name"));
    assert!(table.has_column("budget_group"));
    assert!(table.has_column("ล้านบาท"));
    assert_eq!(table.rows[0].get("p_total_bud"), &CellValue::Number(1234.5));
    assert!(table.rows[1].get("p_total_bud").is_missing());
    assert_eq!(table.rows[1].get("budget_group"), &CellValue::text("ไม่ทราบหมวด"));
}

proptest! {
    #[test]
    fn fallback_never_overrides_rule_assignments(value in "[ก-ฮa-z]{1,8}") {
        let rules = vec![ClassificationRule {
            name: None,
            condition: Condition::AnyOf(vec![Clause::new(
                "missing",
                vec![Matcher::Equals { value: String::new() }],
            )]),
            assignments: vec![assign("budget_group", &value)],
        }];
        let (classified, _) = classify(Row::new(), &rules, &fallback());
        prop_assert_eq!(classified.get("budget_group"), &CellValue::text(value));
    }
}
