#![forbid(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Element type tag of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
    Bool,
    BF16,
}

impl DType {
    /// Upstream scalar type name, as it appears in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "Byte",
            Self::I8 => "Char",
            Self::I16 => "Short",
            Self::I32 => "Int",
            Self::I64 => "Long",
            Self::F16 => "Half",
            Self::F32 => "Float",
            Self::F64 => "Double",
            Self::Bool => "Bool",
            Self::BF16 => "BFloat16",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hardware/backend family a tensor or generator lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Cpu,
    Cuda,
    Mps,
    Meta,
}

impl DeviceType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Mps => "mps",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device {
    device_type: DeviceType,
    index: Option<u16>,
}

impl Device {
    #[must_use]
    pub const fn new(device_type: DeviceType, index: Option<u16>) -> Self {
        Self { device_type, index }
    }

    #[must_use]
    pub const fn cpu() -> Self {
        Self::new(DeviceType::Cpu, None)
    }

    #[must_use]
    pub const fn cuda(index: u16) -> Self {
        Self::new(DeviceType::Cuda, Some(index))
    }

    #[must_use]
    pub const fn device_type(self) -> DeviceType {
        self.device_type
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{index}", self.device_type),
            None => write!(f, "{}", self.device_type),
        }
    }
}

/// Memory organization of a tensor's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Strided,
    Sparse,
    SparseCsr,
    Mkldnn,
}

impl Layout {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strided => "Strided",
            Self::Sparse => "Sparse",
            Self::SparseCsr => "SparseCsr",
            Self::Mkldnn => "Mkldnn",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorMeta {
    shape: Vec<usize>,
    strides: Vec<usize>,
    dtype: DType,
    device: Device,
    layout: Layout,
}

impl TensorMeta {
    #[must_use]
    pub fn scalar(dtype: DType, device: Device) -> Self {
        Self::from_shape(Vec::new(), dtype, device)
    }

    #[must_use]
    pub fn from_shape(shape: Vec<usize>, dtype: DType, device: Device) -> Self {
        let strides = contiguous_strides(&shape);
        Self {
            shape,
            strides,
            dtype,
            device,
            layout: Layout::Strided,
        }
    }

    /// Non-strided layouts carry no strides.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        if layout != Layout::Strided {
            self.strides.clear();
        } else if self.strides.len() != self.shape.len() {
            self.strides = contiguous_strides(&self.shape);
        }
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn fingerprint64(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.shape.hash(&mut hasher);
        self.strides.hash(&mut hasher);
        self.dtype.hash(&mut hasher);
        self.device.hash(&mut hasher);
        self.layout.hash(&mut hasher);
        hasher.finish()
    }
}

/// Backing implementation behind a [`Tensor`] handle.
///
/// Kernels receive `&TensorImpl` once a contract check has narrowed the
/// handle; the reference never outlives the `Tensor` it was taken from.
#[derive(Debug, PartialEq, Eq)]
pub struct TensorImpl {
    meta: TensorMeta,
}

impl TensorImpl {

    #[must_use]
    pub fn meta(&self) -> &TensorMeta {
        &self.meta
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.meta.layout()
    }

    #[must_use]
    pub fn device(&self) -> Device {
        self.meta.device()
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        self.meta.dtype()
    }
}

/// Type-erased tensor value as handed to kernel entry points.
///
/// An undefined tensor stands in for an omitted optional argument. Clones
/// share the same [`TensorImpl`].
#[derive(Debug, Clone, Default)]
pub struct Tensor {
    inner: Option<Arc<TensorImpl>>,
}

impl Tensor {
    #[must_use]
    pub fn undefined() -> Self {
        Self { inner: None }
    }

    #[must_use]
    pub fn from_meta(meta: TensorMeta) -> Self {
        Self {
            inner: Some(Arc::new(TensorImpl { meta })),
        }
    }

    #[must_use]
    pub fn defined(&self) -> bool {
        self.inner.is_some()
    }

    #[must_use]
    pub fn as_impl(&self) -> Option<&TensorImpl> {
        self.inner.as_deref()
    }

    #[must_use]
    pub fn layout(&self) -> Option<Layout> {
        self.as_impl().map(TensorImpl::layout)
    }

    #[must_use]
    pub fn device(&self) -> Option<Device> {
        self.as_impl().map(TensorImpl::device)
    }

    #[must_use]
    pub fn dtype(&self) -> Option<DType> {
        self.as_impl().map(TensorImpl::dtype)
    }
}

#[must_use]
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    let mut running = 1usize;
    for idx in (0..shape.len()).rev() {
        strides[idx] = running;
        running = running.saturating_mul(shape[idx]);
    }
    strides
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{DType, Device, DeviceType, Layout, Tensor, TensorMeta, contiguous_strides};

    #[test]
    fn scalar_meta_is_strided_without_dims() {
        let meta = TensorMeta::scalar(DType::F64, Device::cpu());
        assert!(meta.shape().is_empty());
        assert!(meta.strides().is_empty());
        assert_eq!(meta.layout(), Layout::Strided);
    }

    #[test]
    fn shape_builds_contiguous_strides() {
        let meta = TensorMeta::from_shape(vec![2, 3, 4], DType::F32, Device::cpu());
        assert_eq!(meta.shape(), &[2, 3, 4]);
        assert_eq!(meta.strides(), &[12, 4, 1]);
    }

    #[test]
    fn sparse_layout_drops_strides_and_strided_restores_them() {
        let sparse = TensorMeta::from_shape(vec![2, 3], DType::F32, Device::cpu())
            .with_layout(Layout::Sparse);
        assert_eq!(sparse.layout(), Layout::Sparse);
        assert!(sparse.strides().is_empty());

        let dense = sparse.with_layout(Layout::Strided);
        assert_eq!(dense.strides(), &[3, 1]);
    }

    #[test]
    fn display_names_follow_upstream_spelling() {
        assert_eq!(DType::F32.to_string(), "Float");
        assert_eq!(DType::F64.to_string(), "Double");
        assert_eq!(DType::I64.to_string(), "Long");
        assert_eq!(DType::BF16.to_string(), "BFloat16");
        assert_eq!(DeviceType::Cuda.to_string(), "cuda");
        assert_eq!(Device::cpu().to_string(), "cpu");
        assert_eq!(Device::cuda(1).to_string(), "cuda:1");
        assert_eq!(Layout::Sparse.to_string(), "Sparse");
        assert_eq!(Layout::SparseCsr.to_string(), "SparseCsr");
    }

    #[test]
    fn undefined_tensor_exposes_no_attributes() {
        let tensor = Tensor::undefined();
        assert!(!tensor.defined());
        assert!(tensor.as_impl().is_none());
        assert_eq!(tensor.layout(), None);
        assert_eq!(tensor.device(), None);
        assert_eq!(tensor.dtype(), None);
        assert!(!Tensor::default().defined());
    }

    #[test]
    fn clones_share_the_backing_impl() {
        let tensor = Tensor::from_meta(TensorMeta::from_shape(
            vec![4],
            DType::I64,
            Device::cuda(0),
        ));
        let alias = tensor.clone();

        let lhs = tensor.as_impl().expect("defined tensor has an impl");
        let rhs = alias.as_impl().expect("alias has an impl");
        assert!(std::ptr::eq(lhs, rhs));
        assert_eq!(lhs.device().device_type(), DeviceType::Cuda);
    }

    #[test]
    fn distinct_tensors_have_distinct_impls() {
        let meta = TensorMeta::scalar(DType::F32, Device::cpu());
        let a = Tensor::from_meta(meta.clone());
        let b = Tensor::from_meta(meta);
        let a_impl = a.as_impl().expect("defined");
        let b_impl = b.as_impl().expect("defined");
        assert!(!std::ptr::eq(a_impl, b_impl));
        assert_eq!(a_impl.meta().fingerprint64(), b_impl.meta().fingerprint64());
    }

    #[test]
    fn meta_fingerprint_changes_with_layout() {
        let a = TensorMeta::from_shape(vec![2, 2], DType::F64, Device::cpu());
        let b = a.clone().with_layout(Layout::Mkldnn);
        assert_ne!(a.fingerprint64(), b.fingerprint64());
    }

    proptest! {
        #[test]
        fn prop_contiguous_stride_contract(shape in prop::collection::vec(1usize..=4, 1..=4)) {
            let strides = contiguous_strides(shape.as_slice());
            prop_assert_eq!(strides.len(), shape.len());
            prop_assert_eq!(strides.last().copied(), Some(1));
        }

        #[test]
        fn prop_layout_round_trip_restores_strides(shape in prop::collection::vec(0usize..=6, 0..=4)) {
            let meta = TensorMeta::from_shape(shape.clone(), DType::F64, Device::cpu());
            let restored = meta.clone().with_layout(Layout::Sparse).with_layout(Layout::Strided);
            let expected_strides = contiguous_strides(&shape);
            prop_assert_eq!(restored.strides(), expected_strides.as_slice());
            prop_assert_eq!(restored.fingerprint64(), meta.fingerprint64());
        }
    }
}
