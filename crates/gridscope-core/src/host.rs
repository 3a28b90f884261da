//! # Host Value Contract
//!
//! The interface the decoder needs from a debugger's value and type objects.
//!
//! The decoder never touches process memory directly. Everything it learns
//! comes through these two traits, which mirror the small subset of a
//! debugger scripting API that container formatters rely on:
//!
//! - look up a member by name or by dotted path
//! - read an integer or a display string
//! - ask a value for its declared type, and a type for its size and pointee
//! - take an address, reinterpret a value as another type
//! - materialize a child value at a byte offset
//!
//! ## Why use a trait?
//!
//! Traits allow us to:
//! - Run the same decoder inside any debugger that can implement these calls
//! - Swap in an in-memory host for tests and the CLI ([`crate::snapshot`])
//! - Keep the decoder free of any one debugger's object model
//!
//! ## Validity
//!
//! Debugger APIs usually return an object with an `IsValid()` flag. Here an
//! invalid lookup is simply `None`. A pointer that exists but is null is a
//! valid value whose [`ValueHandle::as_unsigned`] is `Some(0)`.

use std::fmt;

/// A type as seen by the host's type system
pub trait TypeHandle: Clone + fmt::Debug
{
    /// Type name as written in the program (may be a typedef such as `Vector3d`)
    fn name(&self) -> String;

    /// Fully resolved name with typedefs expanded and all generic parameters spelled out
    fn canonical_name(&self) -> String;

    /// Size of one value of this type in bytes
    fn byte_size(&self) -> u64;

    /// Whether this is a fixed-size array type such as `double[9]`
    fn is_array(&self) -> bool;

    /// Target type of a pointer type, `None` for non-pointers
    fn pointee(&self) -> Option<Self>;

    /// The pointer type whose pointee is `self`
    #[must_use]
    fn pointer_to(&self) -> Self;
}

/// A value in the stopped target process
///
/// Implementations must not mutate the target. Every method is a read.
pub trait ValueHandle: Clone + fmt::Debug
{
    /// The host's type representation
    type Type: TypeHandle;

    /// Display name of this value in the variables tree
    fn name(&self) -> String;

    /// Declared type of this value
    fn value_type(&self) -> Self::Type;

    /// Direct member lookup (`GetChildMemberWithName`)
    fn member(&self, name: &str) -> Option<Self>;

    /// Dotted member path lookup relative to this value, e.g. `m_storage.m_data`
    fn expression_path(&self, path: &str) -> Option<Self>;

    /// Element `index` of an array value
    fn child_at_index(&self, index: usize) -> Option<Self>;

    /// Integer interpretation of a scalar or pointer value
    fn as_unsigned(&self) -> Option<u64>;

    /// The host's display string for a scalar value
    fn value_string(&self) -> Option<String>;

    /// A pointer value holding the address of this value
    fn address_of(&self) -> Option<Self>;

    /// Reinterpret this value as `ty` without moving it
    fn cast(&self, ty: &Self::Type) -> Option<Self>;

    /// Materialize a value of type `ty` named `name` at `offset` bytes
    ///
    /// For pointer values the offset is relative to the address the pointer
    /// holds; for every other value it is relative to the value's own location.
    /// A null pointer base yields `None`.
    fn child_at_offset(&self, name: &str, offset: u64, ty: &Self::Type) -> Option<Self>;

    /// Look up a type by name in the target's debug information
    fn find_type(&self, name: &str) -> Option<Self::Type>;

    /// Canonical type name of this value (convenience over [`TypeHandle::canonical_name`])
    fn canonical_type_name(&self) -> String
    {
        self.value_type().canonical_name()
    }
}
