#![forbid(unsafe_code)]

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    Policy,
    Check,
    Generator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceEntry {
    pub ts_unix_ms: u128,
    pub kind: EvidenceKind,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceLedger {
    entries: Vec<EvidenceEntry>,
}

impl EvidenceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EvidenceKind, summary: impl Into<String>) {
        self.entries.push(EvidenceEntry {
            ts_unix_ms: now_unix_ms(),
            kind,
            summary: summary.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[EvidenceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_of(&self, kind: EvidenceKind) -> impl Iterator<Item = &EvidenceEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}

/// Per-session knobs. `api` names the kernel entry point the session
/// validates arguments for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api: String,
    pub record_passes: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn for_api(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_record_passes(mut self, record_passes: bool) -> Self {
        self.record_passes = record_passes;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api: "unknown_api".to_string(),
            record_passes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    config: SessionConfig,
    ledger: EvidenceLedger,
}

impl RuntimeContext {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut ledger = EvidenceLedger::new();
        ledger.record(
            EvidenceKind::Policy,
            format!(
                "session initialized api={} record_passes={}",
                config.api, config.record_passes
            ),
        );
        Self { config, ledger }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_record_passes(&mut self, record_passes: bool) {
        self.config.record_passes = record_passes;
        self.ledger.record(
            EvidenceKind::Policy,
            format!("record_passes switched to {record_passes}"),
        );
    }

    #[must_use]
    pub fn ledger(&self) -> &EvidenceLedger {
        &self.ledger
    }

    /// `detail` is only rendered when passes are being recorded.
    pub fn record_check_pass<D>(&mut self, kind: EvidenceKind, check: &str, detail: D)
    where
        D: FnOnce() -> String,
    {
        if !self.config.record_passes {
            return;
        }
        self.ledger.record(
            kind,
            format!("api={} check={check} outcome=pass {}", self.config.api, detail()),
        );
    }

    pub fn record_check_failure<E>(&mut self, kind: EvidenceKind, check: &str, reason_code: &str, error: &E)
    where
        E: fmt::Display + ?Sized,
    {
        self.ledger.record(
            kind,
            format!(
                "api={} check={check} outcome=fail reason_code={reason_code}: {error}",
                self.config.api
            ),
        );
    }
}

fn now_unix_ms() -> u128 {
    let now = std::time::SystemTime::now();
    now.duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
