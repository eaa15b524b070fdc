#![forbid(unsafe_code)]

use std::fmt;

use ft_argcheck::{
    ArgCheckError, DenseContract, check_intlist, check_size_nonnegative, checked_numel,
};
use ft_core::{Tensor, TensorImpl};
use ft_generator::{
    Generator, GeneratorBackend, GeneratorError, check_generator, get_generator_or_default,
};
use ft_runtime::{EvidenceEntry, EvidenceKind, RuntimeContext, SessionConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    Arg(ArgCheckError),
    Generator(GeneratorError),
}

impl CheckError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Arg(error) => error.reason_code(),
            Self::Generator(error) => error.reason_code(),
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arg(error) => write!(f, "{error}"),
            Self::Generator(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Arg(error) => Some(error),
            Self::Generator(error) => Some(error),
        }
    }
}

impl From<ArgCheckError> for CheckError {
    fn from(value: ArgCheckError) -> Self {
        Self::Arg(value)
    }
}

impl From<GeneratorError> for CheckError {
    fn from(value: GeneratorError) -> Self {
        Self::Generator(value)
    }
}

/// Validates the arguments of one kernel entry point and keeps an evidence
/// trail of every rejection.
#[derive(Debug, Clone)]
pub struct ArgCheckSession {
    runtime: RuntimeContext,
}

impl ArgCheckSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            runtime: RuntimeContext::new(config),
        }
    }

    #[must_use]
    pub fn for_api(api: impl Into<String>) -> Self {
        Self::new(SessionConfig::for_api(api))
    }

    #[must_use]
    pub fn api(&self) -> &str {
        &self.runtime.config().api
    }

    pub fn set_record_passes(&mut self, record_passes: bool) {
        self.runtime.set_record_passes(record_passes);
    }

    pub fn intlist<const N: usize>(
        &mut self,
        list: &[i64],
        name: &str,
        pos: usize,
    ) -> Result<[i64; N], CheckError> {
        let result = check_intlist::<N>(list, name, pos);
        self.observe(EvidenceKind::Check, "check_intlist", result, || {
            format!("arg={name} pos={pos} arity={N} len={}", list.len())
        })
    }

    pub fn sizes(&mut self, sizes: &[i64]) -> Result<(), CheckError> {
        let result = check_size_nonnegative(sizes);
        self.observe(EvidenceKind::Check, "check_size_nonnegative", result, || {
            format!("sizes={sizes:?}")
        })
    }

    /// Element count of a shape about to back an allocation.
    pub fn numel(&mut self, sizes: &[i64]) -> Result<i64, CheckError> {
        let result = checked_numel(sizes);
        self.observe(EvidenceKind::Check, "checked_numel", result, || {
            format!("sizes={sizes:?}")
        })
    }

    pub fn unwrap<'t>(
        &mut self,
        tensor: &'t Tensor,
        name: &str,
        pos: usize,
        allow_null: bool,
        contract: DenseContract,
    ) -> Result<Option<&'t TensorImpl>, CheckError> {
        let result = contract.unwrap(tensor, name, pos, self.api(), allow_null);
        self.observe(EvidenceKind::Check, "checked_dense_tensor_unwrap", result, || {
            format!(
                "arg={name} pos={pos} allow_null={allow_null} defined={}",
                tensor.defined()
            )
        })
    }

    pub fn unwrap_list<'t>(
        &mut self,
        tensors: &'t [Tensor],
        name: &str,
        pos: usize,
        contract: DenseContract,
    ) -> Result<Vec<&'t TensorImpl>, CheckError> {
        let result = contract.unwrap_list(tensors, name, pos);
        self.observe(
            EvidenceKind::Check,
            "checked_dense_tensor_list_unwrap",
            result,
            || format!("arg={name} pos={pos} len={}", tensors.len()),
        )
    }

    pub fn generator<'g, B>(&mut self, generator: Option<&'g Generator>) -> Result<&'g B, CheckError>
    where
        B: GeneratorBackend,
    {
        let result = check_generator::<B>(generator);
        self.observe(EvidenceKind::Generator, "check_generator", result, || {
            format!("backend={}", B::device_type())
        })
    }

    pub fn generator_or_default<'g, B>(
        &mut self,
        generator: Option<&'g Generator>,
        default_generator: &'g Generator,
    ) -> Result<&'g B, CheckError>
    where
        B: GeneratorBackend,
    {
        let used_default = !generator.is_some_and(Generator::defined);
        let result = get_generator_or_default::<B>(generator, default_generator);
        self.observe(
            EvidenceKind::Generator,
            "get_generator_or_default",
            result,
            || format!("backend={} used_default={used_default}", B::device_type()),
        )
    }

    #[must_use]
    pub fn evidence(&self) -> &[EvidenceEntry] {
        self.runtime.ledger().entries()
    }

    #[must_use]
    pub fn evidence_len(&self) -> usize {
        self.runtime.ledger().len()
    }

    fn observe<T, E, D>(
        &mut self,
        kind: EvidenceKind,
        check: &str,
        result: Result<T, E>,
        detail: D,
    ) -> Result<T, CheckError>
    where
        E: Into<CheckError>,
        D: FnOnce() -> String,
    {
        match result {
            Ok(value) => {
                self.runtime.record_check_pass(kind, check, detail);
                Ok(value)
            }
            Err(error) => {
                let error = error.into();
                self.runtime
                    .record_check_failure(kind, check, error.reason_code(), &error);
                Err(error)
            }
        }
    }
}
