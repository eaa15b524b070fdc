#![forbid(unsafe_code)]

use std::fmt;

use ft_core::{Device, DeviceType, TensorImpl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    TypeMismatch {
        expected: DeviceType,
        actual: DeviceType,
    },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, actual } => {
                write!(
                    f,
                    "device type mismatch: expected {expected}, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for DeviceError {}

/// Pins a required device type. Device indices are not compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTypeGuard {
    device_type: DeviceType,
}

impl DeviceTypeGuard {
    #[must_use]
    pub fn new(device_type: DeviceType) -> Self {
        Self { device_type }
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn ensure_device(&self, device: Device) -> Result<(), DeviceError> {
        let actual = device.device_type();
        if actual != self.device_type {
            return Err(DeviceError::TypeMismatch {
                expected: self.device_type,
                actual,
            });
        }
        Ok(())
    }

    pub fn ensure_tensor(&self, tensor: &TensorImpl) -> Result<(), DeviceError> {
        self.ensure_device(tensor.device())
    }
}

#[cfg(test)]
mod tests {
    use ft_core::{DType, Device, DeviceType, Tensor, TensorMeta};

    use super::{DeviceError, DeviceTypeGuard};

    fn tensor_on(device: Device) -> Tensor {
        Tensor::from_meta(TensorMeta::scalar(DType::F32, device))
    }

    #[test]
    fn guard_accepts_matching_device_type() {
        let tensor = tensor_on(Device::cpu());
        let guard = DeviceTypeGuard::new(DeviceType::Cpu);
        let imp = tensor.as_impl().expect("defined tensor");
        assert!(guard.ensure_tensor(imp).is_ok());
    }

    #[test]
    fn guard_ignores_device_index() {
        let guard = DeviceTypeGuard::new(DeviceType::Cuda);
        assert!(guard.ensure_device(Device::cuda(0)).is_ok());
        assert!(guard.ensure_device(Device::cuda(3)).is_ok());
    }

    #[test]
    fn guard_rejects_mismatched_device_type() {
        let tensor = tensor_on(Device::cuda(0));
        let guard = DeviceTypeGuard::new(DeviceType::Cpu);
        let err = guard
            .ensure_tensor(tensor.as_impl().expect("defined tensor"))
            .expect_err("mismatched device type should fail closed");
        assert_eq!(
            err,
            DeviceError::TypeMismatch {
                expected: DeviceType::Cpu,
                actual: DeviceType::Cuda
            }
        );
    }

    #[test]
    fn guard_device_type_accessor() {
        assert_eq!(
            DeviceTypeGuard::new(DeviceType::Mps).device_type(),
            DeviceType::Mps
        );
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::TypeMismatch {
            expected: DeviceType::Cpu,
            actual: DeviceType::Cuda,
        };
        let msg = err.to_string();
        assert!(msg.contains("cpu"));
        assert!(msg.contains("cuda"));
        assert!(msg.contains("mismatch"));
    }
}
