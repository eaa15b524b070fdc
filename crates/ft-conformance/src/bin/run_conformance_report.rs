#![forbid(unsafe_code)]

use std::path::PathBuf;

use ft_conformance::{HarnessConfig, Suite, emit_conformance_report, run_conformance};
use serde_json::json;

fn main() -> Result<(), String> {
    let mut suite = String::from("all");
    let mut output: Option<PathBuf> = None;
    let mut print_full_report = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--suite" => {
                let value = args.next().ok_or_else(|| {
                    "--suite requires one of: intlist|tensor_contract|generator|all".to_string()
                })?;
                suite = value;
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--output requires a file path".to_string())?;
                output = Some(PathBuf::from(value));
            }
            "--print-full-report" => {
                print_full_report = true;
            }
            other => {
                return Err(format!(
                    "unknown arg '{other}'. usage: run_conformance_report [--suite intlist|tensor_contract|generator|all] [--output path] [--print-full-report]"
                ));
            }
        }
    }

    let suites = Suite::parse_selection(suite.as_str())?;
    let config = HarnessConfig::default_paths();
    let report = match output.as_deref() {
        Some(path) => emit_conformance_report(&config, path, suites.as_slice())?,
        None => run_conformance(&config, suites.as_slice())?,
    };

    if print_full_report {
        let raw = serde_json::to_string_pretty(&report)
            .map_err(|error| format!("failed to serialize conformance report: {error}"))?;
        println!("{raw}");
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "suites": report.suites,
                "cases_failed": report.cases_failed(),
                "output_path": output.as_ref().map(|path| path.display().to_string()),
            }))
            .map_err(|error| format!("failed to serialize conformance summary: {error}"))?
        );
    }

    if report.cases_failed() > 0 {
        return Err(format!(
            "{} conformance case(s) failed",
            report.cases_failed()
        ));
    }
    Ok(())
}
