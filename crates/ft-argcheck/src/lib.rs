#![forbid(unsafe_code)]

use std::fmt;

use ft_core::{DType, DeviceType, Layout, Tensor, TensorImpl};
use ft_device::{DeviceError, DeviceTypeGuard};

/// Where a rejected tensor sat in the kernel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgLocation {
    /// A single tensor argument; `pos` is 1-based.
    Argument {
        name: String,
        pos: usize,
        api: String,
    },
    /// Element `index` (0-based) of a sequence argument at 1-based `pos`.
    SequenceElement {
        name: String,
        pos: usize,
        index: usize,
    },
}

impl ArgLocation {
    #[must_use]
    pub fn argument(name: impl Into<String>, pos: usize, api: impl Into<String>) -> Self {
        Self::Argument {
            name: name.into(),
            pos,
            api: api.into(),
        }
    }

    #[must_use]
    pub fn sequence_element(name: impl Into<String>, pos: usize, index: usize) -> Self {
        Self::SequenceElement {
            name: name.into(),
            pos,
            index,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Argument { name, .. } | Self::SequenceElement { name, .. } => name,
        }
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        match self {
            Self::Argument { pos, .. } | Self::SequenceElement { pos, .. } => *pos,
        }
    }

    #[must_use]
    pub fn sequence_index(&self) -> Option<usize> {
        match self {
            Self::Argument { .. } => None,
            Self::SequenceElement { index, .. } => Some(*index),
        }
    }
}

impl fmt::Display for ArgLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument { name, pos, api } => {
                write!(f, "for argument #{pos} '{name}' in call to {api}")
            }
            Self::SequenceElement { name, pos, index } => write!(
                f,
                "for sequence element {index} in sequence argument at position #{pos} '{name}'"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgCheckError {
    ArityMismatch {
        expected: usize,
        actual: usize,
        name: String,
        pos: usize,
    },
    InvalidSize {
        value: i64,
        sizes: Vec<i64>,
    },
    NumelOverflow {
        sizes: Vec<i64>,
    },
    UndefinedTensor {
        location: ArgLocation,
    },
    LayoutMismatch {
        actual: Layout,
        location: ArgLocation,
    },
    DeviceMismatch {
        expected: DeviceType,
        actual: DeviceType,
        location: ArgLocation,
    },
    DtypeMismatch {
        expected: DType,
        actual: DType,
        location: ArgLocation,
    },
}

impl ArgCheckError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::InvalidSize { .. } => "invalid_size",
            Self::NumelOverflow { .. } => "numel_overflow",
            Self::UndefinedTensor { .. } => "undefined_tensor",
            Self::LayoutMismatch { .. } => "layout_mismatch",
            Self::DeviceMismatch { .. } => "device_mismatch",
            Self::DtypeMismatch { .. } => "dtype_mismatch",
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&ArgLocation> {
        match self {
            Self::ArityMismatch { .. }
            | Self::InvalidSize { .. }
            | Self::NumelOverflow { .. } => None,
            Self::UndefinedTensor { location }
            | Self::LayoutMismatch { location, .. }
            | Self::DeviceMismatch { location, .. }
            | Self::DtypeMismatch { location, .. } => Some(location),
        }
    }
}

impl fmt::Display for ArgCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                expected,
                actual,
                name,
                pos,
            } => write!(
                f,
                "Expected a list of {expected} ints but got {actual} for argument #{pos} '{name}'"
            ),
            Self::InvalidSize { value, sizes } => write!(
                f,
                "Trying to create tensor with negative dimension {value}: {sizes:?}"
            ),
            Self::NumelOverflow { sizes } => {
                write!(f, "Number of elements of shape {sizes:?} overflows int64")
            }
            Self::UndefinedTensor { location } => {
                write!(f, "Expected a defined tensor but got an undefined one {location}")
            }
            Self::LayoutMismatch { actual, location } => {
                write!(f, "Expected dense tensor but got {actual} {location}")
            }
            Self::DeviceMismatch {
                expected,
                actual,
                location,
            } => write!(
                f,
                "Expected object of device type {expected} but got device type {actual} {location}"
            ),
            Self::DtypeMismatch {
                expected,
                actual,
                location,
            } => write!(
                f,
                "Expected object of scalar type {expected} but got scalar type {actual} {location}"
            ),
        }
    }
}

impl std::error::Error for ArgCheckError {}

/// Normalizes `list` to exactly `N` ints.
///
/// A single value is repeated into every slot when `N > 1`; any other length
/// must equal `N`. The empty list is just a list of length 0.
pub fn check_intlist<const N: usize>(
    list: &[i64],
    name: &str,
    pos: usize,
) -> Result<[i64; N], ArgCheckError> {
    if let [value] = list
        && N > 1
    {
        return Ok([*value; N]);
    }
    <[i64; N]>::try_from(list).map_err(|_| ArgCheckError::ArityMismatch {
        expected: N,
        actual: list.len(),
        name: name.to_string(),
        pos,
    })
}

#[must_use]
pub fn sum_intlist(list: &[i64]) -> i64 {
    list.iter().fold(0i64, |acc, &value| acc.wrapping_add(value))
}

/// Integral element that widens to `i64` before accumulation.
pub trait IntElement: Copy {
    fn to_i64(self) -> i64;
}

macro_rules! impl_int_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntElement for $ty {
                #[allow(clippy::cast_possible_wrap, clippy::cast_lossless)]
                fn to_i64(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_int_element!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: IntElement> IntElement for &T {
    fn to_i64(self) -> i64 {
        (*self).to_i64()
    }
}

/// Product of `items` accumulated in `i64`, whatever the element width.
#[must_use]
pub fn prod_intlist<I>(items: I) -> i64
where
    I: IntoIterator,
    I::Item: IntElement,
{
    items
        .into_iter()
        .fold(1i64, |acc, value| acc.wrapping_mul(value.to_i64()))
}

/// Like [`prod_intlist`], but `None` when the product leaves the `i64` range.
#[must_use]
pub fn checked_prod_intlist<I>(items: I) -> Option<i64>
where
    I: IntoIterator,
    I::Item: IntElement,
{
    items
        .into_iter()
        .try_fold(1i64, |acc, value| acc.checked_mul(value.to_i64()))
}

pub fn check_size_nonnegative(size: &[i64]) -> Result<(), ArgCheckError> {
    if let Some(&value) = size.iter().find(|&&dim| dim < 0) {
        return Err(ArgCheckError::InvalidSize {
            value,
            sizes: size.to_vec(),
        });
    }
    Ok(())
}

/// Element count of `sizes`, rejecting negative dims and counts past `i64::MAX`.
///
/// A zero-sized dim makes the count zero even when the other dims alone
/// would overflow.
pub fn checked_numel(sizes: &[i64]) -> Result<i64, ArgCheckError> {
    check_size_nonnegative(sizes)?;
    if sizes.contains(&0) {
        return Ok(0);
    }
    checked_prod_intlist(sizes).ok_or_else(|| ArgCheckError::NumelOverflow {
        sizes: sizes.to_vec(),
    })
}

/// Device type and dtype a kernel binding requires of its dense arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseContract {
    device_type: DeviceType,
    dtype: DType,
}

impl DenseContract {
    #[must_use]
    pub fn new(device_type: DeviceType, dtype: DType) -> Self {
        Self { device_type, dtype }
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Narrows `expr` to its backing implementation.
    ///
    /// With `allow_null`, an undefined tensor yields `Ok(None)` without any
    /// further inspection. Otherwise layout, device type and dtype are
    /// checked in that order and the first failure is returned.
    pub fn unwrap<'a>(
        &self,
        expr: &'a Tensor,
        name: &str,
        pos: usize,
        api: &str,
        allow_null: bool,
    ) -> Result<Option<&'a TensorImpl>, ArgCheckError> {
        if allow_null && !expr.defined() {
            return Ok(None);
        }
        self.check_dense(expr, || ArgLocation::argument(name, pos, api))
            .map(Some)
    }

    /// Narrows every element of a sequence argument, preserving order.
    pub fn unwrap_list<'a>(
        &self,
        tensors: &'a [Tensor],
        name: &str,
        pos: usize,
    ) -> Result<Vec<&'a TensorImpl>, ArgCheckError> {
        let mut unwrapped = Vec::with_capacity(tensors.len());
        for (index, expr) in tensors.iter().enumerate() {
            let inner =
                self.check_dense(expr, || ArgLocation::sequence_element(name, pos, index))?;
            unwrapped.push(inner);
        }
        Ok(unwrapped)
    }

    fn check_dense<'a, F>(&self, expr: &'a Tensor, location: F) -> Result<&'a TensorImpl, ArgCheckError>
    where
        F: FnOnce() -> ArgLocation,
    {
        let Some(inner) = expr.as_impl() else {
            return Err(ArgCheckError::UndefinedTensor {
                location: location(),
            });
        };

        if inner.layout() != Layout::Strided {
            return Err(ArgCheckError::LayoutMismatch {
                actual: inner.layout(),
                location: location(),
            });
        }

        if let Err(DeviceError::TypeMismatch { expected, actual }) =
            DeviceTypeGuard::new(self.device_type).ensure_tensor(inner)
        {
            return Err(ArgCheckError::DeviceMismatch {
                expected,
                actual,
                location: location(),
            });
        }

        if inner.dtype() != self.dtype {
            return Err(ArgCheckError::DtypeMismatch {
                expected: self.dtype,
                actual: inner.dtype(),
                location: location(),
            });
        }

        Ok(inner)
    }
}

pub fn checked_dense_tensor_unwrap<'a>(
    expr: &'a Tensor,
    name: &str,
    pos: usize,
    api: &str,
    allow_null: bool,
    device_type: DeviceType,
    dtype: DType,
) -> Result<Option<&'a TensorImpl>, ArgCheckError> {
    DenseContract::new(device_type, dtype).unwrap(expr, name, pos, api, allow_null)
}

pub fn checked_dense_tensor_list_unwrap<'a>(
    tensors: &'a [Tensor],
    name: &str,
    pos: usize,
    device_type: DeviceType,
    dtype: DType,
) -> Result<Vec<&'a TensorImpl>, ArgCheckError> {
    DenseContract::new(device_type, dtype).unwrap_list(tensors, name, pos)
}
