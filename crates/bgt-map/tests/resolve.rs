use std::collections::BTreeMap;

use bgt_map::{
    HeaderPattern, MatchDirection, MatchKind, ResolveOptions, SynonymDictionary, resolve,
    resolve_detailed, unknown_headers,
};

fn synonyms() -> SynonymDictionary {
    SynonymDictionary::from_pairs([
        ("หน่วยงาน", vec!["หน่วยงาน", "กรม", "สถาบัน"]),
        ("แผนงาน", vec!["แผนงาน", "แผน"]),
        ("รายการ", vec!["รายการ", "รายละเอียดรายการ"]),
        ("ปี2569", vec!["ปี2569", "ปี 2569", "FY2569"]),
    ])
}

#[test]
fn aliases_resolve_to_canonical_names() {
    let headers = ["กรม", "แผน", " FY2569 "];
    let resolved = resolve(&headers, &synonyms(), &ResolveOptions::default());
    assert_eq!(resolved, ["หน่วยงาน", "แผนงาน", "ปี2569"]);
}

#[test]
fn duplicate_canonical_names_get_suffixes() {
    let headers = ["รายการ", "รายละเอียดรายการ"];
    let resolved = resolve(&headers, &synonyms(), &ResolveOptions::default());
    assert_eq!(resolved, ["รายการ", "รายการ_1"]);
}

#[test]
fn substring_fallback_uses_alias_inside_header() {
    let headers = ["งบประมาณ ปี 2569 (บาท)", "ชื่อกรมเจ้าของงบ"];
    let detailed = resolve_detailed(&headers, &synonyms(), &ResolveOptions::default());
    assert_eq!(detailed[0].name, "ปี2569");
    assert_eq!(detailed[0].kind, MatchKind::Contains);
    assert_eq!(detailed[1].name, "หน่วยงาน");
}

#[test]
fn substring_fallback_can_be_disabled() {
    let options = ResolveOptions {
        contains_fallback: false,
        ..ResolveOptions::default()
    };
    let resolved = resolve(&["ชื่อกรมเจ้าของงบ"], &synonyms(), &options);
    assert_eq!(resolved, ["ชื่อกรมเจ้าของงบ"]);
}

#[test]
fn header_in_alias_direction() {
    let options = ResolveOptions {
        direction: MatchDirection::HeaderInAlias,
        ..ResolveOptions::default()
    };
    let resolved = resolve(&["ละเอียด"], &synonyms(), &options);
    assert_eq!(resolved, ["รายการ"]);
}

#[test]
fn first_registered_canonical_wins_ties() {
    let dict = SynonymDictionary::from_pairs([("A", vec!["shared"]), ("B", vec!["shared"])]);
    let resolved = resolve(&["shared"], &dict, &ResolveOptions::default());
    assert_eq!(resolved, ["A"]);
}

#[test]
fn patterns_apply_after_synonyms() {
    let options = ResolveOptions {
        patterns: vec![
            HeaderPattern::new(r"(บัญชี|account|หมวด)\s*2", "บัญชี2").expect("pattern"),
            HeaderPattern::new("fy70|2570", "ปี2570").expect("pattern"),
        ],
        ..ResolveOptions::default()
    };
    let detailed = resolve_detailed(&["Account 2", "งบ FY70"], &synonyms(), &options);
    assert_eq!(detailed[0].name, "บัญชี2");
    assert_eq!(detailed[0].kind, MatchKind::Pattern);
    assert_eq!(detailed[1].name, "ปี2570");
}

#[test]
fn rename_runs_before_dedupe() {
    let options = ResolveOptions {
        rename: BTreeMap::from([("แผนงาน".to_string(), "plan_name".to_string())]),
        ..ResolveOptions::default()
    };
    let resolved = resolve(&["แผน", "plan_name"], &synonyms(), &options);
    assert_eq!(resolved, ["plan_name", "plan_name_1"]);
}

#[test]
fn unknown_headers_pass_through_normalized() {
    let detailed = resolve_detailed(
        &["หมายเหตุ\n(ถ้ามี)", "", "กรม"],
        &synonyms(),
        &ResolveOptions::default(),
    );
    assert_eq!(detailed[0].name, "หมายเหตุ (ถ้ามี)");
    assert_eq!(unknown_headers(&detailed), ["หมายเหตุ (ถ้ามี)"]);
}

#[test]
fn reference_table_extends_resolution() {
    let rows = vec![vec!["รหัสงบประมาณ".to_string(), "budget code".to_string()]];
    let (dict, _) = synonyms().merge_reference(&rows);
    let resolved = resolve(&["Budget Code"], &dict, &ResolveOptions::default());
    assert_eq!(resolved, ["รหัสงบประมาณ"]);
}
