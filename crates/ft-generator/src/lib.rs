#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ft_core::{Device, DeviceType};
use ft_device::{DeviceError, DeviceTypeGuard};

/// Seed a freshly constructed default generator starts from.
pub const DEFAULT_RNG_SEED: u64 = 67_280_421_310_721;

/// Host-side generator state.
#[derive(Debug)]
pub struct CpuGenerator {
    seed: AtomicU64,
}

impl CpuGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed: AtomicU64::new(seed),
        }
    }

    #[must_use]
    pub fn current_seed(&self) -> u64 {
        self.seed.load(Ordering::Relaxed)
    }

    pub fn set_current_seed(&self, seed: u64) {
        self.seed.store(seed, Ordering::Relaxed);
    }
}

/// Accelerator generator state, bound to one device index.
#[derive(Debug)]
pub struct CudaGenerator {
    device_index: u16,
    seed: AtomicU64,
    philox_offset: AtomicU64,
}

impl CudaGenerator {
    #[must_use]
    pub fn new(device_index: u16, seed: u64) -> Self {
        Self {
            device_index,
            seed: AtomicU64::new(seed),
            philox_offset: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn device_index(&self) -> u16 {
        self.device_index
    }

    #[must_use]
    pub fn current_seed(&self) -> u64 {
        self.seed.load(Ordering::Relaxed)
    }

    /// Reseeding restarts the offset stream.
    pub fn set_current_seed(&self, seed: u64) {
        self.seed.store(seed, Ordering::Relaxed);
        self.philox_offset.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn philox_offset(&self) -> u64 {
        self.philox_offset.load(Ordering::Relaxed)
    }

    pub fn set_philox_offset(&self, offset: u64) {
        self.philox_offset.store(offset, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub enum GeneratorImpl {
    Cpu(CpuGenerator),
    Cuda(CudaGenerator),
}

impl GeneratorImpl {
    #[must_use]
    pub fn device(&self) -> Device {
        match self {
            Self::Cpu(_) => Device::cpu(),
            Self::Cuda(generator) => Device::cuda(generator.device_index()),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::CpuGenerator {}
    impl Sealed for super::CudaGenerator {}
}

/// Concrete backend a kernel can ask a [`Generator`] to narrow to.
pub trait GeneratorBackend: sealed::Sealed + fmt::Debug + Send + Sync + 'static {
    fn device_type() -> DeviceType;

    fn downcast(generator: &GeneratorImpl) -> Option<&Self>;
}

impl GeneratorBackend for CpuGenerator {
    fn device_type() -> DeviceType {
        DeviceType::Cpu
    }

    fn downcast(generator: &GeneratorImpl) -> Option<&Self> {
        match generator {
            GeneratorImpl::Cpu(inner) => Some(inner),
            GeneratorImpl::Cuda(_) => None,
        }
    }
}

impl GeneratorBackend for CudaGenerator {
    fn device_type() -> DeviceType {
        DeviceType::Cuda
    }

    fn downcast(generator: &GeneratorImpl) -> Option<&Self> {
        match generator {
            GeneratorImpl::Cuda(inner) => Some(inner),
            GeneratorImpl::Cpu(_) => None,
        }
    }
}

/// Type-erased generator handle. Clones share backend state.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    inner: Option<Arc<GeneratorImpl>>,
}

impl Generator {
    #[must_use]
    pub fn undefined() -> Self {
        Self { inner: None }
    }

    #[must_use]
    pub fn from_impl(generator: GeneratorImpl) -> Self {
        Self {
            inner: Some(Arc::new(generator)),
        }
    }

    #[must_use]
    pub fn cpu(seed: u64) -> Self {
        Self::from_impl(GeneratorImpl::Cpu(CpuGenerator::new(seed)))
    }

    #[must_use]
    pub fn cuda(device_index: u16, seed: u64) -> Self {
        Self::from_impl(GeneratorImpl::Cuda(CudaGenerator::new(device_index, seed)))
    }

    #[must_use]
    pub fn defined(&self) -> bool {
        self.inner.is_some()
    }

    #[must_use]
    pub fn as_impl(&self) -> Option<&GeneratorImpl> {
        self.inner.as_deref()
    }

    #[must_use]
    pub fn device(&self) -> Option<Device> {
        self.as_impl().map(GeneratorImpl::device)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorError {
    MissingGenerator,
    UndefinedGenerator,
    DeviceTypeMismatch {
        expected: DeviceType,
        actual: DeviceType,
    },
}

impl GeneratorError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::MissingGenerator => "missing_generator",
            Self::UndefinedGenerator => "undefined_generator",
            Self::DeviceTypeMismatch { .. } => "generator_device_type_mismatch",
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGenerator => write!(f, "Expected Generator but received nullopt"),
            Self::UndefinedGenerator => {
                write!(f, "Generator with undefined implementation is not allowed")
            }
            Self::DeviceTypeMismatch { expected, actual } => write!(
                f,
                "Expected a '{expected}' device type for generator but found '{actual}'"
            ),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl From<DeviceError> for GeneratorError {
    fn from(value: DeviceError) -> Self {
        match value {
            DeviceError::TypeMismatch { expected, actual } => {
                Self::DeviceTypeMismatch { expected, actual }
            }
        }
    }
}

/// Narrows an optional generator to backend `B`.
///
/// Presence is checked first, then definedness, then device type; the
/// returned reference borrows from `generator`.
pub fn check_generator<'a, B>(generator: Option<&'a Generator>) -> Result<&'a B, GeneratorError>
where
    B: GeneratorBackend,
{
    let generator = generator.ok_or(GeneratorError::MissingGenerator)?;
    let inner = generator
        .as_impl()
        .ok_or(GeneratorError::UndefinedGenerator)?;
    let device = inner.device();
    DeviceTypeGuard::new(B::device_type()).ensure_device(device)?;
    // Unreachable while each backend owns exactly one device type; the guard
    // above has already matched it.
    B::downcast(inner).ok_or(GeneratorError::DeviceTypeMismatch {
        expected: B::device_type(),
        actual: device.device_type(),
    })
}

/// Like [`check_generator`], but an absent or undefined `generator` falls
/// back to `default_generator`, which must itself satisfy `B`.
pub fn get_generator_or_default<'a, B>(
    generator: Option<&'a Generator>,
    default_generator: &'a Generator,
) -> Result<&'a B, GeneratorError>
where
    B: GeneratorBackend,
{
    match generator {
        Some(candidate) if candidate.defined() => check_generator(Some(candidate)),
        _ => check_generator(Some(default_generator)),
    }
}
