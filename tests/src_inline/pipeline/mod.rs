use std::path::Path;

use super::*;
use crate::input::{ColumnNames, Table};
use crate::model::{Cell, GroupKey};
use crate::pipeline::stage1_reference::{ReferenceCache, ReferenceSettings};

fn rec(p: &str, d: &str, c: &str) -> ReferenceRecord {
    ReferenceRecord::new(p, d, c)
}

#[test]
fn test_build_is_idempotent() {
    let reference = vec![
        rec("P2", "D2", "1"),
        rec("P1", "D1", "2"),
        rec("P2", "D2", "2"),
        rec("P3", "D3", "3"),
        rec("P2", "D2", "1"),
    ];
    assert_eq!(build(&reference), build(&reference));
}

#[test]
fn test_build_single_category_collapses() {
    let reference = vec![rec("P1", "D1", "2"), rec("P1", "D1", "2"), rec("P1", "D1", "2")];
    let map = build(&reference);
    assert_eq!(map.get(&GroupKey::new("P1", "D1")).unwrap().as_str(), "2");
}

#[test]
fn test_build_split_distribution() {
    let reference = vec![
        rec("P2", "D2", "1"),
        rec("P2", "D2", "1"),
        rec("P2", "D2", "2"),
        rec("P2", "D2", "1"),
    ];
    let map = build(&reference);
    assert_eq!(map.lookup("P2", "D2").unwrap().as_str(), "1:75%,2:25%");
}

#[test]
fn test_build_ignores_malformed_categories() {
    let reference = vec![rec("P1", "D1", "1"), rec("P1", "D1", "x")];
    let built = build_with(&reference, &BuildOptions::default());
    assert_eq!(built.map.lookup("P1", "D1").unwrap().as_str(), "1");
    assert_eq!(built.records_used, 1);
    assert_eq!(built.dropped_bad_category, 1);
}

#[test]
fn test_build_group_with_only_malformed_rows_is_absent() {
    let reference = vec![rec("P1", "D1", "x"), rec("P2", "D2", "4")];
    let map = build(&reference);
    assert_eq!(map.len(), 1);
    assert!(map.lookup("P1", "D1").is_none());
}

#[test]
fn test_build_empty_reference() {
    assert!(build(&[]).is_empty());
}

#[test]
fn test_build_with_balanced_ascending_options() {
    let reference = vec![rec("P1", "D1", "3"), rec("P1", "D1", "2"), rec("P1", "D1", "1")];
    let options = BuildOptions {
        rounding: RoundingPolicy::HalfEven,
        percent: PercentPolicy::LargestRemainder,
        order: SegmentOrder::Ascending,
    };
    let map = build_with(&reference, &options).map;
    assert_eq!(map.lookup("P1", "D1").unwrap().as_str(), "1:33%,2:33%,3:34%");
    assert_eq!(build(&reference).lookup("P1", "D1").unwrap().as_str(), "3:33%,2:33%,1:33%");
}

#[test]
fn test_build_then_join_duplicate_and_unmatched_rows() {
    let map = build(&[rec("P1", "D1", "2"), rec("P2", "D2", "1"), rec("P2", "D2", "3")]);
    let mut input = Table::new(vec![
        "diagnosis_name".to_string(),
        "procedure_code".to_string(),
        "note".to_string(),
    ]);
    for (p, d, note) in [("P2", "D2", "a"), ("P7", "D7", "b"), ("P2", "D2", "c")] {
        input.push_row(vec![Cell::from(d), Cell::from(p), Cell::from(note)]);
    }
    let keys = KeyColumns::resolve(&input, &ColumnNames::default()).unwrap();
    let out = join(&input, keys, "wound_category_ratio", &map);

    assert_eq!(out.table.n_rows(), 3);
    assert_eq!(out.table.rows[0][3], Cell::from("1:50%,3:50%"));
    assert_eq!(out.table.rows[0][3], out.table.rows[2][3]);
    assert_eq!(out.table.rows[1][3], Cell::Empty);
    assert_eq!(out.table.rows[1][2], Cell::from("b"));
}

fn write_file(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_run_input_with_zh_headers() {
    let dir = tempfile::tempdir().unwrap();
    let reference_path = dir.path().join("对照表.csv");
    write_file(
        &reference_path,
        "手术编码,诊断名称,切口类别\n47.0901,急性阑尾炎,2\n47.0901,急性阑尾炎,3\n",
    );
    let input_path = dir.path().join("待处理.csv");
    write_file(&input_path, "序号,手术编码,诊断名称\n1,47.0901,急性阑尾炎\n");
    let output_path = dir.path().join("切口分类.csv");

    let columns = ColumnNames::preset(crate::input::HeaderPreset::Zh);
    let settings = ReferenceSettings {
        columns: columns.clone(),
        sheet: None,
        options: BuildOptions::default(),
        persist_cache: false,
    };
    let reference = ReferenceCache::new().load(&reference_path, &settings).unwrap();
    let summary = run_input(
        &InputJob {
            input_path: &input_path,
            output_path: &output_path,
            sheet: None,
            columns: &columns,
            options: &settings.options,
        },
        &reference,
    )
    .unwrap();

    assert_eq!(summary.input.matched, 1);
    assert_eq!(
        std::fs::read_to_string(&output_path).unwrap(),
        "序号,手术编码,诊断名称,切口类别比例\n1,47.0901,急性阑尾炎,\"2:50%,3:50%\"\n"
    );

    let summary_path = dir.path().join("out").join("summary.json");
    write_summaries(&summary_path, &[summary]).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(json[0]["options"]["rounding"], "half-even");
    assert_eq!(json[0]["reference"]["map_source"], "built");
}
