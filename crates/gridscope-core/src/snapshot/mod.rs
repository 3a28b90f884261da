//! # In-Memory Host
//!
//! A concrete [`ValueHandle`](crate::host::ValueHandle) implementation over a
//! captured memory image and a hand-declared type table.
//!
//! Real debuggers answer member lookups from DWARF and reads from the stopped
//! task. A snapshot answers them from a [`TypeTable`] and a [`MemoryImage`],
//! which makes it possible to replay a container's exact byte layout without
//! a live process. The CLI's `inspect` command and the integration tests run
//! the decoder against snapshots.
//!
//! ## Semantics
//!
//! - Reads are little-endian; reads that leave every mapped region fail
//! - Pointers are 8 bytes
//! - [`SnapshotValue::address_of`](crate::host::ValueHandle::address_of) yields
//!   an immediate pointer value that is not itself stored in memory

mod builder;
mod memory;
mod types;
mod value;

use std::sync::Arc;

pub use builder::SnapshotBuilder;
pub use memory::{f32_bytes, f64_bytes, i32_bytes, u64_bytes, MappedRegion, MemoryImage};
pub use types::{FieldDef, Scalar, ScalarKind, TypeDef, TypeId, TypeKind, TypeTable, POINTER_SIZE};
pub use value::{Location, SnapshotType, SnapshotValue};

use crate::error::{GridscopeError, GridscopeResult};
use crate::types::Address;

/// Frozen type table and memory image
#[derive(Debug)]
pub struct Snapshot
{
    types: TypeTable,
    memory: MemoryImage,
}

impl Snapshot
{
    pub fn types(&self) -> &TypeTable
    {
        &self.types
    }

    pub fn memory(&self) -> &MemoryImage
    {
        &self.memory
    }

    /// A root value of type `ty` living at `address`
    ///
    /// ## Errors
    ///
    /// `UnknownType` if `ty` is not in the table, `UnmappedAddress` if the
    /// value's bytes are not entirely mapped.
    pub fn value(self: &Arc<Self>, name: &str, ty: TypeId, address: impl Into<Address>) -> GridscopeResult<SnapshotValue>
    {
        let address = address.into();
        let size = self.types.get(ty)?.size;
        if size > 0 && !self.memory.is_mapped(address, size) {
            return Err(GridscopeError::UnmappedAddress(address));
        }
        Ok(SnapshotValue::new(
            Arc::clone(self),
            SnapshotType::new(Arc::clone(self), ty),
            name.to_string(),
            Location::Memory(address),
        ))
    }
}
