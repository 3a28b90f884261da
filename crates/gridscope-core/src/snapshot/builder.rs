//! Incremental construction of a [`Snapshot`].

use std::sync::Arc;

use super::memory::MemoryImage;
use super::types::{FieldDef, ScalarKind, TypeDef, TypeId, TypeKind, TypeTable, POINTER_SIZE};
use super::Snapshot;
use crate::error::{GridscopeError, GridscopeResult};
use crate::types::Address;

/// Scalar names every snapshot starts with
const STANDARD_SCALARS: &[(&str, ScalarKind)] = &[
    ("uint8_t", ScalarKind::U8),
    ("unsigned char", ScalarKind::U8),
    ("int8_t", ScalarKind::I8),
    ("signed char", ScalarKind::I8),
    ("char", ScalarKind::I8),
    ("uint16_t", ScalarKind::U16),
    ("unsigned short", ScalarKind::U16),
    ("int16_t", ScalarKind::I16),
    ("short", ScalarKind::I16),
    ("uint32_t", ScalarKind::U32),
    ("unsigned int", ScalarKind::U32),
    ("int32_t", ScalarKind::I32),
    ("int", ScalarKind::I32),
    ("uint64_t", ScalarKind::U64),
    ("unsigned long", ScalarKind::U64),
    ("int64_t", ScalarKind::I64),
    ("long", ScalarKind::I64),
    ("float", ScalarKind::F32),
    ("double", ScalarKind::F64),
];

/// Builder for a type table plus memory image
///
/// ## Example
///
/// ```rust
/// use gridscope_core::snapshot::{f64_bytes, SnapshotBuilder};
///
/// let mut builder = SnapshotBuilder::new();
/// let double = builder.type_id("double")?;
/// let storage = builder.array(double, 3)?;
/// let vector = builder.structure("Vec3", &[("array", storage)])?;
/// builder.map(0x1000u64, f64_bytes(&[1.0, 2.0, 3.0]))?;
///
/// let snapshot = builder.build();
/// let value = snapshot.value("v", vector, 0x1000u64)?;
/// assert_eq!(value.address().map(|a| a.value()), Some(0x1000));
/// # Ok::<(), gridscope_core::error::GridscopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotBuilder
{
    types: TypeTable,
    memory: MemoryImage,
}

impl Default for SnapshotBuilder
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl SnapshotBuilder
{
    /// Empty memory, standard scalar types declared
    pub fn new() -> Self
    {
        let mut types = TypeTable::default();
        for (name, kind) in STANDARD_SCALARS {
            // Names in STANDARD_SCALARS are distinct
            let _ = types.insert(TypeDef {
                name: (*name).to_string(),
                canonical: (*name).to_string(),
                size: kind.size(),
                align: kind.size(),
                kind: TypeKind::Scalar(*kind),
            });
        }
        Self {
            types,
            memory: MemoryImage::new(),
        }
    }

    /// Id of an already declared type
    ///
    /// ## Errors
    ///
    /// `UnknownType` if nothing is declared under `name`.
    pub fn type_id(&self, name: &str) -> GridscopeResult<TypeId>
    {
        self.types
            .find(name)
            .ok_or_else(|| GridscopeError::UnknownType(name.to_string()))
    }

    /// Encoding of a scalar type
    ///
    /// ## Errors
    ///
    /// `UnknownType` if `id` is not declared, `InvalidLayout` if it is not a scalar.
    pub fn scalar_kind(&self, id: TypeId) -> GridscopeResult<ScalarKind>
    {
        let def = self.types.get(id)?;
        match def.kind {
            TypeKind::Scalar(kind) => Ok(kind),
            _ => Err(GridscopeError::InvalidLayout {
                name: def.name.clone(),
                reason: "not a scalar type".to_string(),
            }),
        }
    }

    /// Declare an additional scalar type
    ///
    /// ## Errors
    ///
    /// `DuplicateType` if the name is taken.
    pub fn scalar(&mut self, name: &str, kind: ScalarKind) -> GridscopeResult<TypeId>
    {
        self.types.insert(TypeDef {
            name: name.to_string(),
            canonical: name.to_string(),
            size: kind.size(),
            align: kind.size(),
            kind: TypeKind::Scalar(kind),
        })
    }

    /// Pointer to `target`, reusing an existing declaration
    ///
    /// ## Errors
    ///
    /// `UnknownType` if `target` is not declared.
    pub fn pointer(&mut self, target: TypeId) -> GridscopeResult<TypeId>
    {
        let def = self.types.get(target)?;
        let name = format!("{} *", def.name);
        if let Some(existing) = self.types.find(&name) {
            return Ok(existing);
        }
        let canonical = format!("{} *", def.canonical);
        self.types.insert(TypeDef {
            name,
            canonical,
            size: POINTER_SIZE,
            align: POINTER_SIZE,
            kind: TypeKind::Pointer(target),
        })
    }

    /// Fixed array of `len` elements, reusing an existing declaration
    ///
    /// ## Errors
    ///
    /// `UnknownType` if `element` is not declared, `InvalidLayout` if the size overflows.
    pub fn array(&mut self, element: TypeId, len: u64) -> GridscopeResult<TypeId>
    {
        let def = self.types.get(element)?;
        let name = format!("{}[{len}]", def.name);
        if let Some(existing) = self.types.find(&name) {
            return Ok(existing);
        }
        let size = def.size.checked_mul(len).ok_or_else(|| GridscopeError::InvalidLayout {
            name: name.clone(),
            reason: "array size overflows".to_string(),
        })?;
        let canonical = format!("{}[{len}]", def.canonical);
        let align = def.align;
        self.types.insert(TypeDef {
            name,
            canonical,
            size,
            align,
            kind: TypeKind::Array { element, len },
        })
    }

    /// Struct with naturally aligned, sequentially placed fields
    ///
    /// ## Errors
    ///
    /// `UnknownType` for undeclared field types, `DuplicateType` if the name is taken.
    pub fn structure(&mut self, name: &str, fields: &[(&str, TypeId)]) -> GridscopeResult<TypeId>
    {
        let mut offset = 0u64;
        let mut align = 1u64;
        let mut placed = Vec::with_capacity(fields.len());
        for (field_name, ty) in fields {
            let def = self.types.get(*ty)?;
            let field_align = def.align.max(1);
            offset = offset.next_multiple_of(field_align);
            placed.push(FieldDef {
                name: (*field_name).to_string(),
                ty: *ty,
                offset,
            });
            offset += def.size;
            align = align.max(field_align);
        }
        self.types.insert(TypeDef {
            name: name.to_string(),
            canonical: name.to_string(),
            size: offset.next_multiple_of(align),
            align,
            kind: TypeKind::Struct(placed),
        })
    }

    /// Struct with explicit size and field offsets
    ///
    /// ## Errors
    ///
    /// `InvalidLayout` if a field extends past `size`.
    pub fn structure_with_offsets(&mut self, name: &str, size: u64, fields: &[(&str, TypeId, u64)]) -> GridscopeResult<TypeId>
    {
        let mut placed = Vec::with_capacity(fields.len());
        let mut align = 1u64;
        for (field_name, ty, offset) in fields {
            let def = self.types.get(*ty)?;
            if offset.checked_add(def.size).is_none_or(|end| end > size) {
                return Err(GridscopeError::InvalidLayout {
                    name: name.to_string(),
                    reason: format!("field {field_name} extends past {size} bytes"),
                });
            }
            align = align.max(def.align);
            placed.push(FieldDef {
                name: (*field_name).to_string(),
                ty: *ty,
                offset: *offset,
            });
        }
        self.types.insert(TypeDef {
            name: name.to_string(),
            canonical: name.to_string(),
            size,
            align,
            kind: TypeKind::Struct(placed),
        })
    }

    /// Typedef: a new name with the target's layout and canonical name
    ///
    /// ## Errors
    ///
    /// `UnknownType` if `target` is not declared, `DuplicateType` if the name is taken.
    pub fn alias(&mut self, name: &str, target: TypeId) -> GridscopeResult<TypeId>
    {
        let mut def = self.types.get(target)?.clone();
        def.name = name.to_string();
        self.types.insert(def)
    }

    /// Map `bytes` at `address`
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the region is empty or overlaps an earlier one.
    pub fn map(&mut self, address: impl Into<Address>, bytes: Vec<u8>) -> GridscopeResult<()>
    {
        self.memory.map(address.into(), bytes)
    }

    /// Freeze the snapshot
    pub fn build(self) -> Arc<Snapshot>
    {
        Arc::new(Snapshot {
            types: self.types,
            memory: self.memory,
        })
    }
}
