#![forbid(unsafe_code)]

mod logging;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ft_api::{ArgCheckSession, CheckError};
use ft_argcheck::{ArgLocation, DenseContract, checked_prod_intlist, prod_intlist, sum_intlist};
use ft_core::{DType, Device, DeviceType, Layout, Tensor, TensorMeta};
use ft_generator::{CpuGenerator, CudaGenerator, DEFAULT_RNG_SEED, Generator, GeneratorBackend};
use ft_runtime::{EvidenceEntry, EvidenceKind};
use logging::det64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use logging::{LOG_SCHEMA_VERSION, StructuredCaseLog};

pub const FIXTURE_ROOT_ENV: &str = "FT_CONFORMANCE_FIXTURE_ROOT";
const MAX_FIXTURE_BYTES: u64 = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub fixture_root: PathBuf,
}

impl HarnessConfig {
    /// Fixtures shipped with this crate, unless `FT_CONFORMANCE_FIXTURE_ROOT`
    /// points elsewhere.
    #[must_use]
    pub fn default_paths() -> Self {
        let fixture_root = std::env::var_os(FIXTURE_ROOT_ENV).map_or_else(
            || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"),
            PathBuf::from,
        );
        Self { fixture_root }
    }

    #[must_use]
    pub fn with_fixture_root(fixture_root: impl Into<PathBuf>) -> Self {
        Self {
            fixture_root: fixture_root.into(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    Intlist,
    TensorContract,
    Generator,
}

impl Suite {
    pub const ALL: [Self; 3] = [Self::Intlist, Self::TensorContract, Self::Generator];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Intlist => "intlist",
            Self::TensorContract => "tensor_contract",
            Self::Generator => "generator",
        }
    }

    #[must_use]
    pub const fn fixture_file(self) -> &'static str {
        match self {
            Self::Intlist => "intlist_cases.json",
            Self::TensorContract => "tensor_contract_cases.json",
            Self::Generator => "generator_cases.json",
        }
    }

    const fn replay_test(self) -> &'static str {
        match self {
            Self::Intlist => "intlist_fixture_is_green",
            Self::TensorContract => "tensor_contract_fixture_is_green",
            Self::Generator => "generator_fixture_is_green",
        }
    }

    /// Accepts a suite id or `all`.
    pub fn parse_selection(raw: &str) -> Result<Vec<Self>, String> {
        if raw == "all" {
            return Ok(Self::ALL.to_vec());
        }
        Self::ALL
            .into_iter()
            .find(|suite| suite.id() == raw)
            .map(|suite| vec![suite])
            .ok_or_else(|| {
                format!("unknown suite '{raw}', expected one of: intlist|tensor_contract|generator|all")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub suite: Suite,
    pub value_ok: bool,
    pub error_ok: bool,
    pub message_ok: bool,
    pub forensic_log: StructuredCaseLog,
}

impl CaseReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.value_ok && self.error_ok && self.message_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessReport {
    pub suite: &'static str,
    pub fixture_count: usize,
    pub cases_total: usize,
    pub cases_passed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConformanceReport {
    pub suites: Vec<HarnessReport>,
    pub cases: Vec<CaseReport>,
}

impl ConformanceReport {
    #[must_use]
    pub fn cases_failed(&self) -> usize {
        self.cases.iter().filter(|case| !case.passed()).count()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct IntlistFixtureFile {
    cases: Vec<IntlistCase>,
}

#[derive(Debug, Clone, Deserialize)]
struct IntlistCase {
    name: String,
    op: String,
    #[serde(default)]
    list: Vec<i64>,
    arity: Option<usize>,
    arg: Option<String>,
    pos: Option<usize>,
    expected: Option<Value>,
    expected_error: Option<String>,
    expected_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TensorContractFixtureFile {
    cases: Vec<TensorContractCase>,
}

#[derive(Debug, Clone, Deserialize)]
struct TensorContractCase {
    name: String,
    op: String,
    api: Option<String>,
    arg: String,
    pos: usize,
    #[serde(default)]
    allow_null: bool,
    required_device: String,
    required_dtype: String,
    tensors: Vec<TensorInput>,
    #[serde(default)]
    expect_null: bool,
    expected_error: Option<String>,
    expected_message: Option<String>,
    expected_index: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct TensorInput {
    #[serde(default = "default_defined")]
    defined: bool,
    #[serde(default = "default_layout")]
    layout: String,
    #[serde(default = "default_device")]
    device: String,
    #[serde(default = "default_dtype")]
    dtype: String,
    #[serde(default)]
    shape: Vec<usize>,
}

fn default_defined() -> bool {
    true
}

fn default_layout() -> String {
    "Strided".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_dtype() -> String {
    "Float".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratorFixtureFile {
    cases: Vec<GeneratorCase>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratorCase {
    name: String,
    op: String,
    backend: String,
    generator: Option<GeneratorInput>,
    default: Option<GeneratorInput>,
    expected_seed: Option<u64>,
    expected_error: Option<String>,
    expected_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratorInput {
    kind: String,
    #[serde(default = "default_rng_seed")]
    seed: u64,
    #[serde(default)]
    device_index: u16,
}

fn default_rng_seed() -> u64 {
    DEFAULT_RNG_SEED
}

pub fn run_smoke(config: &HarnessConfig) -> HarnessReport {
    let fixture_count = fs::read_dir(&config.fixture_root)
        .ok()
        .into_iter()
        .flat_map(|it| it.filter_map(Result::ok))
        .count();

    let (cases_total, cases_passed) = Suite::ALL
        .into_iter()
        .map(|suite| {
            run_suite(config, suite).map_or((0, 0), |(_, cases)| {
                summarize_passes(cases.iter().map(CaseReport::passed))
            })
        })
        .fold((0, 0), |(total, passed), (t, p)| (total + t, passed + p));

    HarnessReport {
        suite: "smoke",
        fixture_count,
        cases_total,
        cases_passed,
    }
}

pub fn run_suite(
    config: &HarnessConfig,
    suite: Suite,
) -> Result<(HarnessReport, Vec<CaseReport>), String> {
    match suite {
        Suite::Intlist => run_intlist_conformance(config),
        Suite::TensorContract => run_tensor_contract_conformance(config),
        Suite::Generator => run_generator_conformance(config),
    }
}

pub fn run_intlist_conformance(
    config: &HarnessConfig,
) -> Result<(HarnessReport, Vec<CaseReport>), String> {
    let fixture: IntlistFixtureFile =
        load_fixture(&config.fixture_root.join(Suite::Intlist.fixture_file()))?;
    let cases = fixture
        .cases
        .iter()
        .map(run_intlist_case)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((suite_report(Suite::Intlist, &cases), cases))
}

pub fn run_tensor_contract_conformance(
    config: &HarnessConfig,
) -> Result<(HarnessReport, Vec<CaseReport>), String> {
    let fixture: TensorContractFixtureFile =
        load_fixture(&config.fixture_root.join(Suite::TensorContract.fixture_file()))?;
    let cases = fixture
        .cases
        .iter()
        .map(run_tensor_contract_case)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((suite_report(Suite::TensorContract, &cases), cases))
}

pub fn run_generator_conformance(
    config: &HarnessConfig,
) -> Result<(HarnessReport, Vec<CaseReport>), String> {
    let fixture: GeneratorFixtureFile =
        load_fixture(&config.fixture_root.join(Suite::Generator.fixture_file()))?;
    let cases = fixture
        .cases
        .iter()
        .map(run_generator_case)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((suite_report(Suite::Generator, &cases), cases))
}

pub fn run_conformance(
    config: &HarnessConfig,
    suites: &[Suite],
) -> Result<ConformanceReport, String> {
    let mut report = ConformanceReport {
        suites: Vec::with_capacity(suites.len()),
        cases: Vec::new(),
    };
    for &suite in suites {
        let (summary, cases) = run_suite(config, suite)?;
        report.suites.push(summary);
        report.cases.extend(cases);
    }
    Ok(report)
}

/// Runs `suites` and writes the full report as pretty JSON to `output`.
pub fn emit_conformance_report(
    config: &HarnessConfig,
    output: &Path,
    suites: &[Suite],
) -> Result<ConformanceReport, String> {
    let report = run_conformance(config, suites)?;
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| {
            format!("failed creating report dir {}: {error}", parent.display())
        })?;
    }
    let raw = serde_json::to_string_pretty(&report)
        .map_err(|error| format!("failed serializing conformance report: {error}"))?;
    fs::write(output, raw)
        .map_err(|error| format!("failed writing report {}: {error}", output.display()))?;
    Ok(report)
}

fn run_intlist_case(case: &IntlistCase) -> Result<CaseReport, String> {
    let mut session = ArgCheckSession::for_api("intlist_conformance");
    let name = case.arg.as_deref().unwrap_or("list");
    let pos = case.pos.unwrap_or(1);

    let observed: Result<Value, CheckError> = match case.op.as_str() {
        "check_intlist" => {
            let arity = case
                .arity
                .ok_or_else(|| format!("intlist case '{}' is missing arity", case.name))?;
            match arity {
                0 => session.intlist::<0>(&case.list, name, pos).map(|out| json!(out)),
                1 => session.intlist::<1>(&case.list, name, pos).map(|out| json!(out)),
                2 => session.intlist::<2>(&case.list, name, pos).map(|out| json!(out)),
                3 => session.intlist::<3>(&case.list, name, pos).map(|out| json!(out)),
                4 => session.intlist::<4>(&case.list, name, pos).map(|out| json!(out)),
                other => {
                    return Err(format!(
                        "intlist case '{}' has unsupported arity {other}",
                        case.name
                    ));
                }
            }
        }
        "sum_intlist" => Ok(json!(sum_intlist(&case.list))),
        "prod_intlist" => Ok(json!(prod_intlist(&case.list))),
        "checked_prod_intlist" => Ok(checked_prod_intlist(&case.list)
            .map_or_else(|| json!("overflow"), |product| json!(product))),
        "check_size_nonnegative" => session.sizes(&case.list).map(|()| Value::Null),
        "numel" => session.numel(&case.list).map(|numel| json!(numel)),
        other => return Err(format!("unsupported intlist op '{other}'")),
    };

    let value_ok = match &observed {
        Ok(value) => case.expected.as_ref().is_none_or(|expected| expected == value),
        Err(_) => case.expected.is_none(),
    };
    let (error_ok, message_ok) = judge_error(
        observed.as_ref().err(),
        case.expected_error.as_deref(),
        case.expected_message.as_deref(),
    );

    let mut extra_fields = BTreeMap::new();
    extra_fields.insert("op".to_string(), json!(case.op));
    extra_fields.insert(
        "input_digest".to_string(),
        json!(format!("det64:{:016x}", det64(format!("{:?}", case.list).as_bytes()))),
    );
    if let Ok(value) = &observed {
        extra_fields.insert("observed_value".to_string(), value.clone());
    }

    Ok(finish_case(
        Suite::Intlist,
        &case.name,
        Verdict {
            value_ok,
            error_ok,
            message_ok,
        },
        observed.as_ref().err(),
        &session,
        extra_fields,
    ))
}

fn run_tensor_contract_case(case: &TensorContractCase) -> Result<CaseReport, String> {
    let tensors = case
        .tensors
        .iter()
        .map(build_tensor)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| format!("tensor contract case '{}': {error}", case.name))?;
    let contract = DenseContract::new(
        parse_device_type(&case.required_device)?,
        parse_dtype(&case.required_dtype)?,
    );
    let mut session = ArgCheckSession::for_api(case.api.as_deref().unwrap_or("conformance"));

    let (value_ok, observed_error) = match case.op.as_str() {
        "unwrap" => {
            let tensor = tensors
                .first()
                .ok_or_else(|| format!("tensor contract case '{}' has no tensor", case.name))?;
            match session.unwrap(tensor, &case.arg, case.pos, case.allow_null, contract) {
                Ok(Some(inner)) => (
                    !case.expect_null
                        && tensor
                            .as_impl()
                            .is_some_and(|expected| std::ptr::eq(expected, inner)),
                    None,
                ),
                Ok(None) => (case.expect_null, None),
                Err(error) => (true, Some(error)),
            }
        }
        "unwrap_list" => match session.unwrap_list(&tensors, &case.arg, case.pos, contract) {
            Ok(unwrapped) => (
                unwrapped.len() == tensors.len()
                    && unwrapped.iter().zip(&tensors).all(|(inner, tensor)| {
                        tensor
                            .as_impl()
                            .is_some_and(|expected| std::ptr::eq(expected, *inner))
                    }),
                None,
            ),
            Err(error) => (true, Some(error)),
        },
        other => return Err(format!("unsupported tensor contract op '{other}'")),
    };

    let (error_ok, message_ok) = judge_error(
        observed_error.as_ref(),
        case.expected_error.as_deref(),
        case.expected_message.as_deref(),
    );
    let observed_index = observed_error.as_ref().and_then(observed_sequence_index);
    let index_ok = case
        .expected_index
        .is_none_or(|expected| observed_index == Some(expected));

    let input_digest = tensors
        .iter()
        .filter_map(Tensor::as_impl)
        .fold(0u64, |acc, inner| {
            acc.rotate_left(7) ^ inner.meta().fingerprint64()
        });
    let mut extra_fields = BTreeMap::new();
    extra_fields.insert("op".to_string(), json!(case.op));
    extra_fields.insert("arg".to_string(), json!(case.arg));
    extra_fields.insert("pos".to_string(), json!(case.pos));
    extra_fields.insert("tensor_count".to_string(), json!(tensors.len()));
    extra_fields.insert(
        "input_digest".to_string(),
        json!(format!("det64:{input_digest:016x}")),
    );
    if let Some(index) = observed_index {
        extra_fields.insert("observed_sequence_index".to_string(), json!(index));
    }

    Ok(finish_case(
        Suite::TensorContract,
        &case.name,
        Verdict {
            value_ok,
            error_ok: error_ok && index_ok,
            message_ok,
        },
        observed_error.as_ref(),
        &session,
        extra_fields,
    ))
}

fn run_generator_case(case: &GeneratorCase) -> Result<CaseReport, String> {
    let generator = case.generator.as_ref().map(build_generator).transpose()?;
    let default_generator = case.default.as_ref().map(build_generator).transpose()?;
    let mut session = ArgCheckSession::for_api("generator_conformance");

    let observed = match case.backend.as_str() {
        "cpu" => resolve_seed::<CpuGenerator>(
            &mut session,
            &case.op,
            generator.as_ref(),
            default_generator.as_ref(),
            CpuGenerator::current_seed,
        )?,
        "cuda" => resolve_seed::<CudaGenerator>(
            &mut session,
            &case.op,
            generator.as_ref(),
            default_generator.as_ref(),
            CudaGenerator::current_seed,
        )?,
        other => return Err(format!("unsupported generator backend '{other}'")),
    };

    let value_ok = match &observed {
        Ok(seed) => case.expected_seed.is_none_or(|expected| expected == *seed),
        Err(_) => case.expected_seed.is_none(),
    };
    let (error_ok, message_ok) = judge_error(
        observed.as_ref().err(),
        case.expected_error.as_deref(),
        case.expected_message.as_deref(),
    );

    let mut extra_fields = BTreeMap::new();
    extra_fields.insert("op".to_string(), json!(case.op));
    extra_fields.insert("backend".to_string(), json!(case.backend));
    extra_fields.insert(
        "generator_device".to_string(),
        json!(generator.as_ref().and_then(Generator::device).map(|d| d.to_string())),
    );
    if let Ok(seed) = &observed {
        extra_fields.insert("observed_seed".to_string(), json!(seed));
    }

    Ok(finish_case(
        Suite::Generator,
        &case.name,
        Verdict {
            value_ok,
            error_ok,
            message_ok,
        },
        observed.as_ref().err(),
        &session,
        extra_fields,
    ))
}

fn resolve_seed<B>(
    session: &mut ArgCheckSession,
    op: &str,
    generator: Option<&Generator>,
    default_generator: Option<&Generator>,
    seed_of: fn(&B) -> u64,
) -> Result<Result<u64, CheckError>, String>
where
    B: GeneratorBackend,
{
    match op {
        "check_generator" => Ok(session.generator::<B>(generator).map(seed_of)),
        "get_generator_or_default" => {
            let default_generator = default_generator
                .ok_or_else(|| "get_generator_or_default needs a default generator".to_string())?;
            Ok(session
                .generator_or_default::<B>(generator, default_generator)
                .map(seed_of))
        }
        other => Err(format!("unsupported generator op '{other}'")),
    }
}

struct Verdict {
    value_ok: bool,
    error_ok: bool,
    message_ok: bool,
}

fn finish_case(
    suite: Suite,
    case_name: &str,
    verdict: Verdict,
    observed_error: Option<&CheckError>,
    session: &ArgCheckSession,
    mut extra_fields: BTreeMap<String, Value>,
) -> CaseReport {
    let passed = verdict.value_ok && verdict.error_ok && verdict.message_ok;
    let (outcome, reason_code) = if passed {
        ("pass", format!("{}_parity_ok", suite.id()))
    } else {
        ("fail", format!("{}_expectation_mismatch", suite.id()))
    };
    extra_fields.insert(
        "observed_reason_code".to_string(),
        json!(observed_error.map_or("none", CheckError::reason_code)),
    );
    if let Some(error) = observed_error {
        extra_fields.insert("observed_message".to_string(), json!(error.to_string()));
    }
    extra_fields.insert(
        "runtime_evidence".to_string(),
        runtime_evidence_field(session.evidence()),
    );

    CaseReport {
        name: case_name.to_string(),
        suite,
        value_ok: verdict.value_ok,
        error_ok: verdict.error_ok,
        message_ok: verdict.message_ok,
        forensic_log: StructuredCaseLog::new(
            suite.id(),
            suite.fixture_file(),
            case_name,
            vec![format!("crates/ft-conformance/fixtures/{}", suite.fixture_file())],
            format!(
                "cargo test -p ft-conformance {} -- --nocapture",
                suite.replay_test()
            ),
            outcome,
            reason_code,
        )
        .with_extra_fields(extra_fields),
    }
}

/// Whether `observed` matches the expected reason code and, when given, the
/// exact message.
fn judge_error(
    observed: Option<&CheckError>,
    expected_error: Option<&str>,
    expected_message: Option<&str>,
) -> (bool, bool) {
    match (observed, expected_error) {
        (None, None) => (true, true),
        (Some(error), Some(code)) => (
            error.reason_code() == code,
            expected_message.is_none_or(|message| error.to_string() == message),
        ),
        _ => (false, false),
    }
}

fn observed_sequence_index(error: &CheckError) -> Option<usize> {
    match error {
        CheckError::Arg(error) => error.location().and_then(ArgLocation::sequence_index),
        CheckError::Generator(_) => None,
    }
}

fn runtime_evidence_field(entries: &[EvidenceEntry]) -> Value {
    let mut kind_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entry in entries {
        *kind_counts
            .entry(runtime_evidence_kind_label(entry.kind))
            .or_insert(0) += 1;
    }

    json!({
        "total_entries": entries.len(),
        "kind_counts": kind_counts,
        "entries": entries
            .iter()
            .map(|entry| {
                json!({
                    "ts_unix_ms": entry.ts_unix_ms,
                    "kind": runtime_evidence_kind_label(entry.kind),
                    "summary": entry.summary,
                })
            })
            .collect::<Vec<_>>(),
    })
}

fn runtime_evidence_kind_label(kind: EvidenceKind) -> &'static str {
    match kind {
        EvidenceKind::Policy => "policy",
        EvidenceKind::Check => "check",
        EvidenceKind::Generator => "generator",
    }
}

fn build_tensor(input: &TensorInput) -> Result<Tensor, String> {
    if !input.defined {
        return Ok(Tensor::undefined());
    }
    let meta = TensorMeta::from_shape(
        input.shape.clone(),
        parse_dtype(&input.dtype)?,
        parse_device(&input.device)?,
    )
    .with_layout(parse_layout(&input.layout)?);
    Ok(Tensor::from_meta(meta))
}

fn build_generator(input: &GeneratorInput) -> Result<Generator, String> {
    match input.kind.as_str() {
        "cpu" => Ok(Generator::cpu(input.seed)),
        "cuda" => Ok(Generator::cuda(input.device_index, input.seed)),
        "undefined" => Ok(Generator::undefined()),
        other => Err(format!("unsupported generator kind '{other}'")),
    }
}

/// Parses an upstream scalar type name such as `Float` or `Long`.
pub fn parse_dtype(raw: &str) -> Result<DType, String> {
    [
        DType::U8,
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::F16,
        DType::F32,
        DType::F64,
        DType::Bool,
        DType::BF16,
    ]
    .into_iter()
    .find(|dtype| dtype.name() == raw)
    .ok_or_else(|| format!("unsupported dtype '{raw}'"))
}

pub fn parse_device_type(raw: &str) -> Result<DeviceType, String> {
    match raw {
        "cpu" => Ok(DeviceType::Cpu),
        "cuda" => Ok(DeviceType::Cuda),
        "mps" => Ok(DeviceType::Mps),
        "meta" => Ok(DeviceType::Meta),
        other => Err(format!("unsupported device type '{other}'")),
    }
}

/// Parses `cpu`, `cuda` or an indexed form like `cuda:1`.
pub fn parse_device(raw: &str) -> Result<Device, String> {
    let (kind, index) = match raw.split_once(':') {
        Some((kind, index)) => {
            let index = index
                .parse::<u16>()
                .map_err(|error| format!("invalid device index in '{raw}': {error}"))?;
            (kind, Some(index))
        }
        None => (raw, None),
    };
    Ok(Device::new(parse_device_type(kind)?, index))
}

pub fn parse_layout(raw: &str) -> Result<Layout, String> {
    [Layout::Strided, Layout::Sparse, Layout::SparseCsr, Layout::Mkldnn]
        .into_iter()
        .find(|layout| layout.name() == raw)
        .ok_or_else(|| format!("unsupported layout '{raw}'"))
}

fn suite_report(suite: Suite, cases: &[CaseReport]) -> HarnessReport {
    let (cases_total, cases_passed) = summarize_passes(cases.iter().map(CaseReport::passed));
    HarnessReport {
        suite: suite.id(),
        fixture_count: 1,
        cases_total,
        cases_passed,
    }
}

fn load_fixture<T>(path: &Path) -> Result<T, String>
where
    T: for<'de> Deserialize<'de>,
{
    let metadata = fs::metadata(path).map_err(|error| {
        format!(
            "failed reading fixture metadata {}: {error}",
            path.display()
        )
    })?;
    let size = metadata.len();
    if size > MAX_FIXTURE_BYTES {
        return Err(format!(
            "fixture {} exceeds max bytes: actual={size} max={MAX_FIXTURE_BYTES}",
            path.display()
        ));
    }

    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed reading fixture {}: {error}", path.display()))?;
    serde_json::from_str::<T>(&raw)
        .map_err(|error| format!("failed parsing fixture {}: {error}", path.display()))
}

fn summarize_passes<I>(iter: I) -> (usize, usize)
where
    I: Iterator<Item = bool>,
{
    iter.fold((0, 0), |(total, passed), is_passed| {
        (total + 1, passed + usize::from(is_passed))
    })
}
