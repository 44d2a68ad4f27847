use super::*;

use wound_ratio::input::InputError;

fn parse(args: &[&str]) -> RunConfig {
    let cli = Cli::try_parse_from(std::iter::once("wound-ratio").chain(args.iter().copied()))
        .unwrap();
    RunConfig::from_cli(cli)
}

#[test]
fn test_parse_args_run_defaults() {
    let parsed = parse(&["run", "--input", "待处理.xlsx"]);
    assert_eq!(parsed.run_mode, RunMode::Annotate);
    assert_eq!(parsed.inputs, vec![PathBuf::from("待处理.xlsx")]);
    assert_eq!(parsed.reference, None);
    assert_eq!(parsed.settings.columns, ColumnNames::default());
    assert_eq!(parsed.settings.options, BuildOptions::default());
    assert!(!parsed.settings.persist_cache);
}

#[test]
fn test_parse_args_zh_headers_with_override() {
    let parsed = parse(&[
        "run",
        "--input",
        "a.csv",
        "b.csv",
        "--headers",
        "zh",
        "--ratio-column",
        "ratio",
        "--out",
        "out",
    ]);
    assert_eq!(parsed.inputs.len(), 2);
    assert_eq!(parsed.settings.columns.procedure_code, "手术编码");
    assert_eq!(parsed.settings.columns.ratio, "ratio");
    assert_eq!(parsed.out, Some(PathBuf::from("out")));
}

#[test]
fn test_parse_args_build_options() {
    let parsed = parse(&[
        "ratios",
        "--reference",
        "ref.csv",
        "--rounding",
        "half-up",
        "--balance-percent",
        "--segment-order",
        "ascending",
        "--cache-ratios",
    ]);
    assert_eq!(parsed.run_mode, RunMode::ExportRatios);
    assert_eq!(parsed.reference, Some(PathBuf::from("ref.csv")));
    assert_eq!(parsed.out, Some(PathBuf::from("-")));
    assert_eq!(
        parsed.settings.options,
        BuildOptions {
            rounding: RoundingPolicy::HalfUp,
            percent: PercentPolicy::LargestRemainder,
            order: SegmentOrder::Ascending,
        }
    );
    assert!(parsed.settings.persist_cache);
}

#[test]
fn test_parse_args_run_requires_input() {
    assert!(Cli::try_parse_from(["wound-ratio", "run"]).is_err());
}

#[test]
fn test_run_missing_reference_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    std::fs::write(&input, "procedure_code,diagnosis_name\nP1,D1\n").unwrap();
    let mut config = parse(&["run", "--input", input.to_str().unwrap()]);
    config.reference = Some(dir.path().join("missing.csv"));

    let err = run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Input(InputError::ReferenceUnavailable { .. })
    ));
    assert!(!dir.path().join("input.ratio.csv").exists());
}

#[test]
fn test_run_end_to_end_csv() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.csv");
    std::fs::write(
        &reference,
        "procedure_code,diagnosis_name,wound_category\n\
         P2,D2,1\nP2,D2,1\nP2,D2,2\nP2,D2,1\nP1,D1,2\n",
    )
    .unwrap();
    let input = dir.path().join("input.csv");
    std::fs::write(
        &input,
        "id,procedure_code,diagnosis_name\n1,P1,D1\n2,P9,D9\n3,P2,D2\n",
    )
    .unwrap();
    let summary = dir.path().join("summary.json");

    let mut config = parse(&["run", "--input", input.to_str().unwrap()]);
    config.reference = Some(reference);
    config.summary = Some(summary.clone());
    run(&config).unwrap();

    let out = std::fs::read_to_string(dir.path().join("input.ratio.csv")).unwrap();
    assert_eq!(
        out,
        "id,procedure_code,diagnosis_name,wound_category_ratio\n\
         1,P1,D1,2\n\
         2,P9,D9,\n\
         3,P2,D2,\"1:75%,2:25%\"\n"
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(summary).unwrap()).unwrap();
    assert_eq!(json[0]["input"]["rows"], 3);
    assert_eq!(json[0]["input"]["matched"], 2);
    assert_eq!(json[0]["input"]["unmatched"], 1);
    assert_eq!(json[0]["reference"]["groups"], 2);
}

#[test]
fn test_run_exports_ratio_table() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.csv");
    std::fs::write(
        &reference,
        "procedure_code,diagnosis_name,wound_category\nP1,D1,3\nP1,D1,x\n",
    )
    .unwrap();
    let out = dir.path().join("ratios.csv");

    let mut config = parse(&["ratios", "--out", out.to_str().unwrap()]);
    config.reference = Some(reference);
    run(&config).unwrap();

    assert_eq!(
        std::fs::read_to_string(out).unwrap(),
        "procedure_code,diagnosis_name,wound_category_ratio\nP1,D1,3\n"
    );
}

#[test]
fn test_run_refuses_batch_with_colliding_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.csv");
    std::fs::write(
        &reference,
        "procedure_code,diagnosis_name,wound_category\nP1,D1,2\n",
    )
    .unwrap();
    let mut inputs = Vec::new();
    for ward in ["ward_a", "ward_b"] {
        let ward_dir = dir.path().join(ward);
        std::fs::create_dir_all(&ward_dir).unwrap();
        let input = ward_dir.join("data.csv");
        std::fs::write(&input, "procedure_code,diagnosis_name\nP1,D1\n").unwrap();
        inputs.push(input);
    }
    let out_dir = dir.path().join("out");

    let mut config = parse(&[
        "run",
        "--input",
        inputs[0].to_str().unwrap(),
        inputs[1].to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
    ]);
    config.reference = Some(reference);

    let err = run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Input(InputError::DuplicateOutput { .. })
    ));
    assert!(!out_dir.join("data.ratio.csv").exists());
}
