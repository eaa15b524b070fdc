use std::path::Path;

use ft_api::ArgCheckSession;
use ft_argcheck::DenseContract;
use ft_conformance::{
    HarnessConfig, Suite, emit_conformance_report, run_conformance, run_generator_conformance,
    run_intlist_conformance, run_smoke, run_tensor_contract_conformance,
};
use ft_core::{DType, Device, DeviceType, Tensor, TensorMeta};
use ft_runtime::EvidenceKind;

#[test]
fn smoke_report_is_stable() {
    let cfg = HarnessConfig::default_paths();
    let report = run_smoke(&cfg);
    assert_eq!(report.suite, "smoke");
    assert!(report.fixture_count >= 3);
    assert!(report.cases_total > 0);
    assert_eq!(report.cases_total, report.cases_passed);

    for suite in Suite::ALL {
        assert!(Path::new(&cfg.fixture_root.join(suite.fixture_file())).exists());
    }
}

#[test]
fn intlist_fixture_is_green() {
    let cfg = HarnessConfig::default_paths();
    let (report, cases) = run_intlist_conformance(&cfg).expect("intlist conformance should run");

    assert_eq!(report.cases_total, cases.len());
    let failed: Vec<&str> = cases
        .iter()
        .filter(|case| !case.passed())
        .map(|case| case.name.as_str())
        .collect();
    assert!(failed.is_empty(), "failing intlist cases: {failed:?}");
}

#[test]
fn tensor_contract_fixture_is_green() {
    let cfg = HarnessConfig::default_paths();
    let (report, cases) =
        run_tensor_contract_conformance(&cfg).expect("tensor contract conformance should run");

    assert_eq!(report.cases_total, cases.len());
    let failed: Vec<&str> = cases
        .iter()
        .filter(|case| !case.passed())
        .map(|case| case.name.as_str())
        .collect();
    assert!(failed.is_empty(), "failing tensor contract cases: {failed:?}");
}

#[test]
fn generator_fixture_is_green() {
    let cfg = HarnessConfig::default_paths();
    let (report, cases) =
        run_generator_conformance(&cfg).expect("generator conformance should run");

    assert_eq!(report.cases_total, cases.len());
    let failed: Vec<&str> = cases
        .iter()
        .filter(|case| !case.passed())
        .map(|case| case.name.as_str())
        .collect();
    assert!(failed.is_empty(), "failing generator cases: {failed:?}");
}

#[test]
fn failing_cases_carry_observed_reason_codes() {
    let cfg = HarnessConfig::default_paths();
    let report = run_conformance(&cfg, &Suite::ALL).expect("all suites should run");
    assert_eq!(report.suites.len(), 3);
    assert_eq!(report.cases_failed(), 0);

    let rejected = report
        .cases
        .iter()
        .find(|case| case.name == "too_many_strides_rejected")
        .expect("arity rejection case should be present");
    assert_eq!(
        rejected.forensic_log.extra_fields["observed_reason_code"],
        "arity_mismatch"
    );
    assert_eq!(rejected.forensic_log.outcome, "pass");
}

#[test]
fn emitted_report_round_trips_through_disk() {
    let cfg = HarnessConfig::default_paths();
    let output = std::env::temp_dir().join(format!(
        "ft_conformance_report_{}.json",
        std::process::id()
    ));
    let report = emit_conformance_report(&cfg, &output, &[Suite::Generator])
        .expect("report should be emitted");
    let raw = std::fs::read_to_string(&output).expect("report file should exist");
    let _ = std::fs::remove_file(&output);

    let value: serde_json::Value = serde_json::from_str(&raw).expect("report should be JSON");
    assert_eq!(value["suites"][0]["suite"], "generator");
    assert_eq!(
        value["cases"].as_array().map(Vec::len),
        Some(report.cases.len())
    );
}

#[test]
fn session_evidence_names_the_failing_argument() {
    let mut session = ArgCheckSession::for_api("_th_addmm");
    let mat1 = Tensor::from_meta(TensorMeta::from_shape(vec![2, 2], DType::F64, Device::cpu()));
    let err = session
        .unwrap(&mat1, "mat1", 2, false, DenseContract::new(DeviceType::Cpu, DType::F32))
        .expect_err("double tensor must not satisfy float contract");
    assert_eq!(err.reason_code(), "dtype_mismatch");

    let entry = session
        .evidence()
        .iter()
        .find(|entry| entry.kind == EvidenceKind::Check)
        .expect("check evidence should be present");
    assert!(entry.summary.contains("api=_th_addmm"));
    assert!(entry.summary.contains("'mat1'"));
}
