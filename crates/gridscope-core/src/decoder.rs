//! # Container Decoder
//!
//! One engine for every dense container family. A [`ContainerLayout`] says
//! where a family keeps its data pointer and where its dimensions come from; [`decode`]
//! runs the descriptor parser, shape resolver and storage locator against a
//! value and returns an immutable [`DecodedContainer`].
//!
//! Decoding is pure: it reads the value, builds a new result and keeps no
//! state. Re-decode whenever the host reports that the value changed.
//!
//! ## Example
//!
//! ```rust
//! use gridscope_core::config::DecodeOptions;
//! use gridscope_core::decoder::{decode, ContainerLayout};
//! use gridscope_core::snapshot::{f64_bytes, SnapshotBuilder};
//! use gridscope_core::summary::ContainerKind;
//!
//! let mut builder = SnapshotBuilder::new();
//! let double = builder.type_id("double")?;
//! let array = builder.array(double, 3)?;
//! let plain = builder.structure("plain_array<double, 3, 0, 16>", &[("array", array)])?;
//! let storage = builder.structure("DenseStorage<double, 3, 3, 1, 0>", &[("m_data", plain)])?;
//! let matrix = builder.structure("Eigen::Matrix<double, 3, 1, 0, 3, 1>", &[("m_storage", storage)])?;
//! builder.map(0x1000u64, f64_bytes(&[1.0, 2.0, 3.0]))?;
//! let snapshot = builder.build();
//!
//! let value = snapshot.value("v", matrix, 0x1000u64)?;
//! let decoded = decode(&value, &ContainerLayout::dense(ContainerKind::Matrix), &DecodeOptions::default());
//! assert_eq!(decoded.summary(), "Vector [3 x 1] ColMajor");
//! assert_eq!(decoded.num_children(), 3);
//! # Ok::<(), gridscope_core::error::GridscopeError>(())
//! ```

use tracing::{debug, trace};

use crate::config::DecodeOptions;
use crate::descriptor::TypeDescriptor;
use crate::fields::resolve_field;
use crate::host::{TypeHandle, ValueHandle};
use crate::index::{child_ref, name_to_index, ChildRef};
use crate::shape::resolve_shape;
use crate::storage::{locate_storage, StorageHandle};
use crate::summary::{render_summary, ContainerKind};
use crate::types::{ResolvedShape, StorageOrder};

/// Data pointer spellings across dense storage layouts
pub const DENSE_DATA_PATHS: &[&str] = &["m_data", "m_storage.m_data"];
/// Runtime row count spellings
pub const DENSE_ROWS_PATHS: &[&str] = &["m_rows", "m_storage.m_rows"];
/// Runtime column count spellings
pub const DENSE_COLS_PATHS: &[&str] = &["m_cols", "m_storage.m_cols"];
/// Inline array member of fixed-size storage wrappers
pub const ARRAY_MEMBER: &str = "array";

/// Where the storage order comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy
{
    /// Bit 0 of the descriptor's options flag
    FromDescriptor,
    /// The family only has one layout
    AlwaysRowMajor,
}

impl OrderPolicy
{
    pub fn resolve(self, descriptor: &TypeDescriptor) -> StorageOrder
    {
        match self {
            OrderPolicy::FromDescriptor => descriptor.order(),
            OrderPolicy::AlwaysRowMajor => StorageOrder::RowMajor,
        }
    }
}

/// Where a family's dimensions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSource
{
    /// Descriptor extents, with dynamic axes read from the object
    Descriptor,
    /// Length of the fixed data array, as an `N x 1` column
    DataArray,
}

/// Member paths and conventions of one container family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLayout
{
    pub kind: ContainerKind,
    /// Candidate data members, most common first
    pub data_paths: &'static [&'static str],
    pub rows_paths: &'static [&'static str],
    pub cols_paths: &'static [&'static str],
    /// Member holding the inline array inside a storage wrapper
    pub array_member: &'static str,
    pub order: OrderPolicy,
    pub shape: ShapeSource,
}

impl ContainerLayout
{
    /// Dense storage with optional runtime dimensions
    pub const fn dense(kind: ContainerKind) -> Self
    {
        Self {
            kind,
            data_paths: DENSE_DATA_PATHS,
            rows_paths: DENSE_ROWS_PATHS,
            cols_paths: DENSE_COLS_PATHS,
            array_member: ARRAY_MEMBER,
            order: OrderPolicy::FromDescriptor,
            shape: ShapeSource::Descriptor,
        }
    }

    /// Small fixed matrices: a row-major `val` array and nothing else
    pub const fn matx() -> Self
    {
        Self {
            kind: ContainerKind::Matx,
            data_paths: &["val"],
            rows_paths: &[],
            cols_paths: &[],
            array_member: ARRAY_MEMBER,
            order: OrderPolicy::AlwaysRowMajor,
            shape: ShapeSource::Descriptor,
        }
    }

    /// Short fixed vectors: a `val` array whose length is the element count
    pub const fn fixed_vec() -> Self
    {
        Self {
            kind: ContainerKind::Vec,
            data_paths: &["val"],
            rows_paths: &[],
            cols_paths: &[],
            array_member: ARRAY_MEMBER,
            order: OrderPolicy::FromDescriptor,
            shape: ShapeSource::DataArray,
        }
    }
}

/// Everything known about one container value at one stop
#[derive(Debug, Clone)]
pub struct DecodedContainer<V: ValueHandle>
{
    kind: ContainerKind,
    descriptor: TypeDescriptor,
    shape: ResolvedShape,
    storage: StorageHandle<V>,
}

/// Decode `value` according to `layout`
///
/// Never fails. Missing pieces degrade to a zero shape or invalid storage,
/// both of which expose zero children.
pub fn decode<V: ValueHandle>(value: &V, layout: &ContainerLayout, options: &DecodeOptions) -> DecodedContainer<V>
{
    let descriptor = TypeDescriptor::parse(&value.canonical_type_name());
    let shape = match layout.shape {
        ShapeSource::Descriptor => resolve_shape(value, &descriptor, layout, options),
        ShapeSource::DataArray => ResolvedShape::new(data_array_len(value, layout), 1, StorageOrder::ColumnMajor),
    };
    let storage = locate_storage(value, layout, &descriptor, shape.element_count(), options);
    let shape = shape.with_element_size(storage.element_byte_size());
    debug!(
        type_name = descriptor.raw(),
        rows = shape.rows,
        cols = shape.cols,
        order = %shape.order,
        base = %storage.base_address(),
        "decoded container"
    );
    DecodedContainer {
        kind: layout.kind,
        descriptor,
        shape,
        storage,
    }
}

/// Element count of the layout's data member when it is a fixed array, else 0
fn data_array_len<V: ValueHandle>(value: &V, layout: &ContainerLayout) -> u64
{
    let field = match resolve_field(value, layout.data_paths) {
        Ok(field) => field.member(layout.array_member).unwrap_or(field),
        Err(err) => {
            debug!(error = %err, "no data array");
            return 0;
        }
    };
    if !field.value_type().is_array() {
        return 0;
    }
    let element_size = field.child_at_index(0).map_or(0, |first| first.value_type().byte_size());
    field.value_type().byte_size().checked_div(element_size).unwrap_or(0)
}

impl<V: ValueHandle> DecodedContainer<V>
{
    pub fn kind(&self) -> ContainerKind
    {
        self.kind
    }

    pub fn descriptor(&self) -> &TypeDescriptor
    {
        &self.descriptor
    }

    pub fn shape(&self) -> &ResolvedShape
    {
        &self.shape
    }

    pub fn storage(&self) -> &StorageHandle<V>
    {
        &self.storage
    }

    /// Element count, or 0 when storage could not be resolved
    pub fn num_children(&self) -> u64
    {
        if self.storage.is_valid() {
            self.shape.element_count()
        } else {
            0
        }
    }

    /// Linear index named by `[i]`, `i`, `[r, c]` or `r,c`
    pub fn index_of_child(&self, name: &str) -> Option<u64>
    {
        name_to_index(&self.shape, name).filter(|index| *index < self.num_children())
    }

    /// Position and name of child `index`, `None` out of range
    pub fn child_ref(&self, index: u64) -> Option<ChildRef>
    {
        if index >= self.num_children() {
            debug!(index, count = self.num_children(), "child index out of range");
            return None;
        }
        child_ref(&self.shape, index)
            .map_err(|err| debug!(error = %err, "child lookup failed"))
            .ok()
    }

    /// Materialize child `index` under its display name
    pub fn child_at_index(&self, index: u64) -> Option<V>
    {
        let child = self.child_ref(index)?;
        self.storage.element_at(&child.display_name, child.byte_offset)
    }

    /// Materialize child `index` under a caller-chosen name
    pub fn child_named(&self, index: u64, name: &str) -> Option<V>
    {
        let child = self.child_ref(index)?;
        trace!(index, name, "renamed child");
        self.storage.element_at(name, child.byte_offset)
    }

    /// One-line description, computed from the shape alone
    pub fn summary(&self) -> String
    {
        render_summary(self.kind, Some(&self.shape))
    }
}
