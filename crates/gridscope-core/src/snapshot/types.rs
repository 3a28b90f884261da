//! Type table for the in-memory host.

use std::collections::HashMap;
use std::fmt;

use crate::error::{GridscopeError, GridscopeResult};

/// Size of a pointer in the captured target
pub const POINTER_SIZE: u64 = 8;

/// Index of a type in a [`TypeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) usize);

/// Primitive encodings the snapshot can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind
{
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarKind
{
    pub const fn size(self) -> u64
    {
        match self {
            ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::U64 | ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool
    {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    /// Decode `bytes` (exactly [`ScalarKind::size`] long, little-endian)
    pub fn decode(self, bytes: &[u8]) -> Option<Scalar>
    {
        let scalar = match self {
            ScalarKind::U8 => Scalar::Unsigned(u64::from(*bytes.first()?)),
            ScalarKind::I8 => Scalar::Signed(i64::from(i8::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::U16 => Scalar::Unsigned(u64::from(u16::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::I16 => Scalar::Signed(i64::from(i16::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::U32 => Scalar::Unsigned(u64::from(u32::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::I32 => Scalar::Signed(i64::from(i32::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::U64 => Scalar::Unsigned(u64::from_le_bytes(bytes.try_into().ok()?)),
            ScalarKind::I64 => Scalar::Signed(i64::from_le_bytes(bytes.try_into().ok()?)),
            ScalarKind::F32 => Scalar::Float(f64::from(f32::from_le_bytes(bytes.try_into().ok()?))),
            ScalarKind::F64 => Scalar::Float(f64::from_le_bytes(bytes.try_into().ok()?)),
        };
        Some(scalar)
    }

    /// Little-endian bytes of `value` converted to this kind
    ///
    /// Integer conversions saturate and drop the fraction.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode(self, value: f64) -> Vec<u8>
    {
        match self {
            ScalarKind::U8 => vec![value as u8],
            ScalarKind::I8 => (value as i8).to_le_bytes().to_vec(),
            ScalarKind::U16 => (value as u16).to_le_bytes().to_vec(),
            ScalarKind::I16 => (value as i16).to_le_bytes().to_vec(),
            ScalarKind::U32 => (value as u32).to_le_bytes().to_vec(),
            ScalarKind::I32 => (value as i32).to_le_bytes().to_vec(),
            ScalarKind::U64 => (value as u64).to_le_bytes().to_vec(),
            ScalarKind::I64 => (value as i64).to_le_bytes().to_vec(),
            ScalarKind::F32 => (value as f32).to_le_bytes().to_vec(),
            ScalarKind::F64 => value.to_le_bytes().to_vec(),
        }
    }
}

/// A decoded primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar
{
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Scalar
{
    /// Two's complement bit pattern for integers, `None` for floats
    #[allow(clippy::cast_sign_loss)]
    pub const fn as_unsigned(self) -> Option<u64>
    {
        match self {
            Scalar::Unsigned(v) => Some(v),
            Scalar::Signed(v) => Some(v as u64),
            Scalar::Float(_) => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64
    {
        match self {
            Scalar::Unsigned(v) => v as f64,
            Scalar::Signed(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl fmt::Display for Scalar
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Scalar::Unsigned(v) => write!(f, "{v}"),
            Scalar::Signed(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A named member of a struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef
{
    pub name: String,
    pub ty: TypeId,
    pub offset: u64,
}

/// Shape of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind
{
    Scalar(ScalarKind),
    Pointer(TypeId),
    Array
    {
        element: TypeId,
        len: u64,
    },
    Struct(Vec<FieldDef>),
}

/// One entry of the type table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef
{
    /// Name as written (typedef name for aliases)
    pub name: String,
    /// Name with aliases resolved
    pub canonical: String,
    pub size: u64,
    pub align: u64,
    pub kind: TypeKind,
}

/// All types known to a snapshot, addressable by id or by name
#[derive(Debug, Clone, Default)]
pub struct TypeTable
{
    types: Vec<TypeDef>,
    by_name: HashMap<String, TypeId>,
}

impl TypeTable
{
    /// Register a type under its name
    ///
    /// ## Errors
    ///
    /// `DuplicateType` if the name is already taken.
    pub fn insert(&mut self, def: TypeDef) -> GridscopeResult<TypeId>
    {
        if self.by_name.contains_key(&def.name) {
            return Err(GridscopeError::DuplicateType(def.name));
        }
        let id = TypeId(self.types.len());
        self.by_name.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Look up a type by id
    ///
    /// ## Errors
    ///
    /// `UnknownType` if the id does not belong to this table.
    pub fn get(&self, id: TypeId) -> GridscopeResult<&TypeDef>
    {
        self.types
            .get(id.0)
            .ok_or_else(|| GridscopeError::UnknownType(format!("#{}", id.0)))
    }

    /// Look up a type by exact name
    pub fn find(&self, name: &str) -> Option<TypeId>
    {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize
    {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.types.is_empty()
    }
}
