//! Built-in configuration layered underneath user files.

use bgt_classify::DEFAULT_AMOUNT_FIELD;
use bgt_ingest::default_hints;
use bgt_validate::{DEFAULT_CATEGORY_FIELD, DEFAULT_UNKNOWN_VALUE};

use crate::file::{
    ConfigFile, DerivedKind, DerivedSpec, ExtractSection, HeaderSection, OrderedMap, OutputSection,
    PatternSpec, ValidationSection,
};

const SYNONYMS: &[(&str, &[&str])] = &[
    ("หน่วยงาน", &["หน่วยงาน", "กรม", "สถาบัน"]),
    ("แผนงาน", &["แผนงาน", "แผน"]),
    ("ผลผลิต/โครงการ", &["ผลผลิต", "โครงการ", "โครงการ/ผลผลิต"]),
    ("กิจกรรม", &["กิจกรรม", "งาน"]),
    ("รายการ", &["รายการ", "รายละเอียดรายการ"]),
    (
        "ประจำ/ลงทุน",
        &["ประจำ/ลงทุน", "ลักษณะค่าใช้จ่าย", "ประเภทค่าใช้จ่าย"],
    ),
    ("ปีเดียว/ผูกพัน", &["ปีเดียว/ผูกพัน", "ลักษณะผูกพัน"]),
    ("ปี2569", &["ปี2569", "ปี 2569", "FY2569"]),
    ("ปี2570", &["ปี2570", "ปี 2570", "FY2570"]),
    ("บัญชี1", &["บัญชี1", "บัญชี 1"]),
    ("บัญชี2", &["บัญชี2", "บัญชี 2"]),
    ("บัญชี3", &["บัญชี3", "บัญชี 3"]),
];

/// Fallback header heuristics, tried in order after the dictionary.
const PATTERNS: &[(&str, &str)] = &[
    (r"2569|fy69|[^0-9]69[^0-9]", "ปี2569"),
    (r"2570|fy70|[^0-9]70[^0-9]", "ปี2570"),
    (r"(บัญชี|account|หมวด)\s*1", "บัญชี1"),
    (r"(บัญชี|account|หมวด)\s*2", "บัญชี2"),
    (r"(บัญชี|account|หมวด)\s*3", "บัญชี3"),
    (r"หน่วยงาน|หน่วยรับงบ|สำนัก|กอง", "หน่วยงาน"),
    (r"กิจกรรม|activity|งาน", "กิจกรรม"),
    (r"ประจำ|ลงทุน|ประเภทค่าใช้จ่าย|ลักษณะค่าใช้จ่าย", "ประจำ/ลงทุน"),
    (r"ผูกพัน|ปีเดียว", "ปีเดียว/ผูกพัน"),
    (r"ผลผลิต|โครงการ", "ผลผลิต/โครงการ"),
];

const PREFERRED_SHEETS: &[&str] = &["5รายละเอียด", "รายละเอียด5", "รายละเอียด"];

/// Reference tables and earlier outputs that sit next to the inputs.
const IGNORE_FILES: &[&str] = &[
    "datadict_FULL.xlsx",
    "datadic.xlsx",
    "national_budget_datadict.xlsx",
    "แบบฟอร์ม_2569.xlsx",
    "แบบฟอร์ม_2569_filled.xlsx",
    "clean_data.xlsx",
    "clean_with_formulas.xlsx",
    "clean_with_formulas_agg.xlsx",
    "MasterData.xlsx",
    "MasterData.csv",
    "DataIssues.xlsx",
    "DataIssues.csv",
];

const REQUIRED_COLUMNS: &[&str] = &[
    "min",
    "min_name",
    "agc",
    "agc_name",
    "group_budget",
    "plan_name",
    "output_name",
    "act_name",
    "objc",
    "objc_8",
    "cap_ncap",
    "item_name",
    "p_total_bud",
];

const FALLBACK: &[(&str, &str)] = &[
    (DEFAULT_CATEGORY_FIELD, DEFAULT_UNKNOWN_VALUE),
    ("plan_group", "ไม่ทราบแผน"),
    ("expenditure_type", "ประจำ"),
];

/// Name of the built-in concatenation of programme and output/project.
pub const UPPER_LEVEL_COLUMN: &str = "ระดับบน(ผลผลิตหรือโครงการ)";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// The built-in configuration.
pub fn builtin() -> ConfigFile {
    let mut master_columns = strings(&REQUIRED_COLUMNS[..REQUIRED_COLUMNS.len() - 1]);
    master_columns.extend(FALLBACK.iter().map(|(field, _)| (*field).to_string()));
    master_columns.push(DEFAULT_AMOUNT_FIELD.to_string());

    ConfigFile {
        use_defaults: None,
        synonyms: SYNONYMS
            .iter()
            .map(|(canonical, aliases)| (*canonical, strings(aliases)))
            .collect(),
        header: HeaderSection {
            patterns: PATTERNS
                .iter()
                .map(|(pattern, canonical)| PatternSpec {
                    pattern: (*pattern).to_string(),
                    canonical: (*canonical).to_string(),
                })
                .collect(),
            ..HeaderSection::default()
        },
        extract: ExtractSection {
            hints: default_hints(),
            preferred_sheets: strings(PREFERRED_SHEETS),
            ignore_files: strings(IGNORE_FILES),
            ..ExtractSection::default()
        },
        fallback: FALLBACK
            .iter()
            .map(|(field, value)| (*field, serde_yaml::Value::from(*value)))
            .collect(),
        amount_field: Some(DEFAULT_AMOUNT_FIELD.to_string()),
        required_columns: strings(REQUIRED_COLUMNS),
        derived_columns: vec![DerivedSpec {
            name: UPPER_LEVEL_COLUMN.to_string(),
            kind: DerivedKind::Concat,
            fields: strings(&["แผนงาน", "ผลผลิต/โครงการ"]),
            separator: Some(":".to_string()),
            numerator: None,
            denominator: None,
            round: None,
        }],
        validation: ValidationSection {
            decimal_places: OrderedMap(vec![(DEFAULT_AMOUNT_FIELD.to_string(), 2)]),
            non_negative: vec![DEFAULT_AMOUNT_FIELD.to_string()],
            not_null: Vec::new(),
        },
        output: OutputSection {
            columns: master_columns,
            expected_core: Vec::new(),
        },
        ..ConfigFile::default()
    }
}
