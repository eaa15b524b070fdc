use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub const LOG_SCHEMA_VERSION: &str = "ft-conformance-log-v1";

/// One replayable record per fixture case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredCaseLog {
    pub schema_version: &'static str,
    pub ts_unix_ms: u128,
    pub suite_id: &'static str,
    pub scenario_id: String,
    pub fixture_id: &'static str,
    pub seed: u64,
    pub env_fingerprint: String,
    pub artifact_refs: Vec<String>,
    pub replay_command: String,
    pub outcome: &'static str,
    pub reason_code: String,
    #[serde(flatten)]
    pub extra_fields: BTreeMap<String, Value>,
}

impl StructuredCaseLog {
    #[must_use]
    pub fn new(
        suite_id: &'static str,
        fixture_id: &'static str,
        case_name: &str,
        artifact_refs: Vec<String>,
        replay_command: String,
        outcome: &'static str,
        reason_code: impl Into<String>,
    ) -> Self {
        let scenario_id = format!("{suite_id}/{}", canonical_case_name(case_name));
        Self {
            schema_version: LOG_SCHEMA_VERSION,
            ts_unix_ms: now_unix_ms(),
            seed: det64(scenario_id.as_bytes()),
            env_fingerprint: env_fingerprint(),
            suite_id,
            scenario_id,
            fixture_id,
            artifact_refs,
            replay_command,
            outcome,
            reason_code: reason_code.into(),
            extra_fields: BTreeMap::new(),
        }
    }

    /// Extra keys are flattened into the envelope, so envelope names are
    /// dropped rather than allowed to shadow it.
    #[must_use]
    pub fn with_extra_fields(mut self, extra_fields: BTreeMap<String, Value>) -> Self {
        for (key, value) in extra_fields {
            if ENVELOPE_KEYS.contains(&key.as_str()) {
                continue;
            }
            self.extra_fields.insert(key, value);
        }
        self
    }

    pub fn to_json_line(&self) -> Result<String, String> {
        serde_json::to_string(self)
            .map_err(|error| format!("failed serializing case log {}: {error}", self.scenario_id))
    }
}

const ENVELOPE_KEYS: [&str; 11] = [
    "schema_version",
    "ts_unix_ms",
    "suite_id",
    "scenario_id",
    "fixture_id",
    "seed",
    "env_fingerprint",
    "artifact_refs",
    "replay_command",
    "outcome",
    "reason_code",
];

fn canonical_case_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn env_fingerprint() -> String {
    let raw = format!(
        "os={} arch={} pkg={}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        env!("CARGO_PKG_VERSION")
    );
    format!("det64:{:016x}", det64(raw.as_bytes()))
}

/// FNV-1a over the raw bytes.
pub(crate) fn det64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn now_unix_ms() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{Value, json};

    use super::{LOG_SCHEMA_VERSION, StructuredCaseLog, canonical_case_name, det64};

    fn sample_log() -> StructuredCaseLog {
        StructuredCaseLog::new(
            "intlist",
            "intlist_cases.json",
            "Broadcast Single Stride",
            vec!["crates/ft-conformance/fixtures/intlist_cases.json".to_string()],
            "cargo test -p ft-conformance intlist_fixture_is_green".to_string(),
            "pass",
            "intlist_parity_ok",
        )
    }

    #[test]
    fn scenario_id_is_canonicalized() {
        let log = sample_log();
        assert_eq!(log.schema_version, LOG_SCHEMA_VERSION);
        assert_eq!(log.scenario_id, "intlist/broadcast_single_stride");
        assert!(log.env_fingerprint.starts_with("det64:"));
        assert_eq!(canonical_case_name("a-B c"), "a_b_c");
    }

    #[test]
    fn seed_is_deterministic_per_scenario() {
        assert_eq!(sample_log().seed, sample_log().seed);
        assert_ne!(det64(b"intlist/a"), det64(b"intlist/b"));
    }

    #[test]
    fn extra_fields_flatten_without_shadowing_envelope() {
        let log = sample_log().with_extra_fields(BTreeMap::from([
            ("op".to_string(), json!("check_intlist")),
            ("outcome".to_string(), json!("forged")),
        ]));
        let value: Value =
            serde_json::from_str(&log.to_json_line().expect("log should serialize"))
                .expect("log line should parse back");
        assert_eq!(value["op"], "check_intlist");
        assert_eq!(value["outcome"], "pass");
        assert_eq!(value["suite_id"], "intlist");
    }
}
