//! Value and type handles backed by a [`Snapshot`].

use std::fmt;
use std::sync::Arc;

use super::types::{Scalar, TypeDef, TypeId, TypeKind, POINTER_SIZE};
use super::Snapshot;
use crate::host::{TypeHandle, ValueHandle};
use crate::types::Address;

/// A type in a snapshot, possibly with extra levels of pointer indirection
///
/// `pointer_to` must not mutate the frozen type table, so pointer types made
/// on the fly are represented as `indirection` on top of a declared type.
#[derive(Clone)]
pub struct SnapshotType
{
    snapshot: Arc<Snapshot>,
    id: TypeId,
    indirection: u8,
}

impl SnapshotType
{
    pub(crate) fn new(snapshot: Arc<Snapshot>, id: TypeId) -> Self
    {
        Self {
            snapshot,
            id,
            indirection: 0,
        }
    }

    fn def(&self) -> Option<&TypeDef>
    {
        self.snapshot.types().get(self.id).ok()
    }

    /// Whether values of this type hold an address
    pub fn is_pointer(&self) -> bool
    {
        self.indirection > 0 || matches!(self.def().map(|d| &d.kind), Some(TypeKind::Pointer(_)))
    }

    fn decorate(&self, base: &str) -> String
    {
        let mut name = base.to_string();
        for _ in 0..self.indirection {
            name.push_str(" *");
        }
        name
    }
}

impl fmt::Debug for SnapshotType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_tuple("SnapshotType").field(&self.name()).finish()
    }
}

impl TypeHandle for SnapshotType
{
    fn name(&self) -> String
    {
        self.decorate(self.def().map_or("<unknown>", |d| d.name.as_str()))
    }

    fn canonical_name(&self) -> String
    {
        self.decorate(self.def().map_or("<unknown>", |d| d.canonical.as_str()))
    }

    fn byte_size(&self) -> u64
    {
        if self.indirection > 0 {
            return POINTER_SIZE;
        }
        self.def().map_or(0, |d| d.size)
    }

    fn is_array(&self) -> bool
    {
        self.indirection == 0 && matches!(self.def().map(|d| &d.kind), Some(TypeKind::Array { .. }))
    }

    fn pointee(&self) -> Option<Self>
    {
        if self.indirection > 0 {
            return Some(Self {
                indirection: self.indirection - 1,
                ..self.clone()
            });
        }
        match self.def()?.kind {
            TypeKind::Pointer(target) => Some(Self::new(Arc::clone(&self.snapshot), target)),
            _ => None,
        }
    }

    fn pointer_to(&self) -> Self
    {
        Self {
            indirection: self.indirection.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Where a snapshot value's bits come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location
{
    /// Stored in the memory image at this address
    Memory(Address),
    /// Computed (an address taken with `address_of`)
    Immediate(u64),
}

/// A value in a snapshot
#[derive(Clone)]
pub struct SnapshotValue
{
    snapshot: Arc<Snapshot>,
    ty: SnapshotType,
    name: String,
    location: Location,
}

impl SnapshotValue
{
    pub(crate) fn new(snapshot: Arc<Snapshot>, ty: SnapshotType, name: String, location: Location) -> Self
    {
        Self {
            snapshot,
            ty,
            name,
            location,
        }
    }

    pub fn location(&self) -> Location
    {
        self.location
    }

    /// Address of the value in the memory image, if it lives there
    pub fn address(&self) -> Option<Address>
    {
        match self.location {
            Location::Memory(address) => Some(address),
            Location::Immediate(_) => None,
        }
    }

    /// Decode a scalar value
    pub fn scalar(&self) -> Option<Scalar>
    {
        if self.ty.indirection > 0 {
            return None;
        }
        let TypeKind::Scalar(kind) = self.ty.def()?.kind else {
            return None;
        };
        match self.location {
            Location::Memory(address) => kind.decode(self.snapshot.memory().read(address, kind.size())?),
            Location::Immediate(bits) => kind.decode(&bits.to_le_bytes()[..usize::try_from(kind.size()).ok()?]),
        }
    }

    /// Scalar value as `f64` (integers are converted)
    pub fn read_f64(&self) -> Option<f64>
    {
        self.scalar().map(Scalar::as_f64)
    }

    fn pointer_bits(&self) -> Option<u64>
    {
        match self.location {
            Location::Immediate(bits) => Some(bits),
            Location::Memory(address) => {
                let bytes = self.snapshot.memory().read(address, POINTER_SIZE)?;
                Some(u64::from_le_bytes(bytes.try_into().ok()?))
            }
        }
    }

    fn with(&self, ty: SnapshotType, name: String, location: Location) -> Self
    {
        Self::new(Arc::clone(&self.snapshot), ty, name, location)
    }
}

impl fmt::Debug for SnapshotValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SnapshotValue")
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("location", &self.location)
            .finish()
    }
}

impl ValueHandle for SnapshotValue
{
    type Type = SnapshotType;

    fn name(&self) -> String
    {
        self.name.clone()
    }

    fn value_type(&self) -> SnapshotType
    {
        self.ty.clone()
    }

    fn member(&self, name: &str) -> Option<Self>
    {
        let Location::Memory(address) = self.location else {
            return None;
        };
        if self.ty.indirection > 0 {
            return None;
        }
        let TypeKind::Struct(fields) = &self.ty.def()?.kind else {
            return None;
        };
        let field = fields.iter().find(|f| f.name == name)?;
        let ty = SnapshotType::new(Arc::clone(&self.snapshot), field.ty);
        Some(self.with(ty, field.name.clone(), Location::Memory(address.checked_add(field.offset)?)))
    }

    fn expression_path(&self, path: &str) -> Option<Self>
    {
        let path = path.strip_prefix('.').unwrap_or(path);
        if path.is_empty() {
            return None;
        }
        path.split('.').try_fold(self.clone(), |value, segment| value.member(segment))
    }

    fn child_at_index(&self, index: usize) -> Option<Self>
    {
        let Location::Memory(address) = self.location else {
            return None;
        };
        if self.ty.indirection > 0 {
            return None;
        }
        let TypeKind::Array { element, len } = self.ty.def()?.kind else {
            return None;
        };
        let index = u64::try_from(index).ok()?;
        if index >= len {
            return None;
        }
        let ty = SnapshotType::new(Arc::clone(&self.snapshot), element);
        let offset = index.checked_mul(ty.byte_size())?;
        Some(self.with(ty, format!("[{index}]"), Location::Memory(address.checked_add(offset)?)))
    }

    fn as_unsigned(&self) -> Option<u64>
    {
        if self.ty.is_pointer() {
            return self.pointer_bits();
        }
        self.scalar()?.as_unsigned()
    }

    fn value_string(&self) -> Option<String>
    {
        if self.ty.is_pointer() {
            return self.pointer_bits().map(|bits| format!("0x{bits:016x}"));
        }
        self.scalar().map(|s| s.to_string())
    }

    fn address_of(&self) -> Option<Self>
    {
        let address = self.address()?;
        Some(self.with(self.ty.pointer_to(), format!("&{}", self.name), Location::Immediate(address.value())))
    }

    fn cast(&self, ty: &SnapshotType) -> Option<Self>
    {
        Some(self.with(ty.clone(), self.name.clone(), self.location))
    }

    fn child_at_offset(&self, name: &str, offset: u64, ty: &SnapshotType) -> Option<Self>
    {
        let base = if self.ty.is_pointer() {
            let bits = self.pointer_bits()?;
            if bits == 0 {
                return None;
            }
            Address::new(bits)
        } else {
            self.address()?
        };
        Some(self.with(ty.clone(), name.to_string(), Location::Memory(base.checked_add(offset)?)))
    }

    fn find_type(&self, name: &str) -> Option<SnapshotType>
    {
        let id = self.snapshot.types().find(name.trim())?;
        Some(SnapshotType::new(Arc::clone(&self.snapshot), id))
    }
}
