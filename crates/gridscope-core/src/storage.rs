//! # Storage Locator
//!
//! Finds where a container's elements live and what type they are.
//!
//! Strategies, in order:
//!
//! 1. **Direct pointer**: a data member such as `m_data` or `m_storage.m_data`
//!    holding a non-null pointer (heap storage, views).
//! 2. **Array wrapper**: the data member is a struct wrapping an `array`
//!    member, or is itself a fixed array (`double[9]`). Arrays have no pointer
//!    value of their own, so the base is the address of element 0.
//! 3. **Object address**: fixed-size containers store their elements inline,
//!    starting at offset 0 of the object. When 1 and 2 fail and the container
//!    is fixed-size and non-empty, the object's own address is reinterpreted
//!    as a pointer to the element type.
//!
//! Element types for strategy 3 are looked up by the first generic
//! parameter's name, then by the configured scalar names found as substrings
//! of the type name. Element types that are themselves generic (such as
//! `std::complex<double>`) are never guessed.
//!
//! When every strategy fails the result is [`StorageHandle::invalid`], which
//! callers display as "no children".

use tracing::{debug, trace};

use crate::config::DecodeOptions;
use crate::decoder::ContainerLayout;
use crate::descriptor::TypeDescriptor;
use crate::error::DecodeError;
use crate::fields::resolve_field;
use crate::host::{TypeHandle, ValueHandle};
use crate::types::Address;

/// Resolved data pointer and element type of a container
#[derive(Debug, Clone)]
pub struct StorageHandle<V: ValueHandle>
{
    pointer: Option<V>,
    base_address: Address,
    element_type: Option<V::Type>,
}

impl<V: ValueHandle> StorageHandle<V>
{
    /// The "cannot display" handle
    pub fn invalid() -> Self
    {
        Self {
            pointer: None,
            base_address: Address::ZERO,
            element_type: None,
        }
    }

    /// Handle for a pointer value, typed by its pointee
    ///
    /// ## Errors
    ///
    /// `UnresolvedStorage` if `pointer` is not of pointer type.
    pub fn from_pointer(pointer: V) -> Result<Self, DecodeError>
    {
        let element_type = pointer
            .value_type()
            .pointee()
            .ok_or(DecodeError::UnresolvedStorage("data field is not a pointer"))?;
        let base_address = pointer.as_unsigned().map_or(Address::ZERO, Address::new);
        Ok(Self {
            pointer: Some(pointer),
            base_address,
            element_type: Some(element_type),
        })
    }

    /// Non-null base with a sized element type
    pub fn is_valid(&self) -> bool
    {
        self.pointer.is_some() && !self.base_address.is_null() && self.element_byte_size() > 0
    }

    /// Base address, [`Address::ZERO`] when unresolved
    pub fn base_address(&self) -> Address
    {
        self.base_address
    }

    pub fn element_type(&self) -> Option<&V::Type>
    {
        self.element_type.as_ref()
    }

    /// Byte size of one element, 0 when the element type is unknown
    pub fn element_byte_size(&self) -> u64
    {
        self.element_type.as_ref().map_or(0, TypeHandle::byte_size)
    }

    /// Materialize the element at `byte_offset` from the base
    ///
    /// Returns `None` for an invalid handle; address zero is never dereferenced.
    pub fn element_at(&self, name: &str, byte_offset: u64) -> Option<V>
    {
        if !self.is_valid() {
            return None;
        }
        let pointer = self.pointer.as_ref()?;
        let element_type = self.element_type.as_ref()?;
        trace!(name, byte_offset, base = %self.base_address, "materializing element");
        pointer.child_at_offset(name, byte_offset, element_type)
    }
}

/// Run the strategy chain for `value`
///
/// `element_count` is the resolved shape's count; the object-address fallback
/// only applies to non-empty fixed-size containers.
pub fn locate_storage<V: ValueHandle>(
    value: &V,
    layout: &ContainerLayout,
    descriptor: &TypeDescriptor,
    element_count: u64,
    options: &DecodeOptions,
) -> StorageHandle<V>
{
    match try_locate_storage(value, layout, descriptor, element_count, options) {
        Ok(handle) => handle,
        Err(err) => {
            debug!(type_name = descriptor.raw(), error = %err, "storage unresolved");
            StorageHandle::invalid()
        }
    }
}

fn try_locate_storage<V: ValueHandle>(
    value: &V,
    layout: &ContainerLayout,
    descriptor: &TypeDescriptor,
    element_count: u64,
    options: &DecodeOptions,
) -> Result<StorageHandle<V>, DecodeError>
{
    match resolve_field(value, layout.data_paths).and_then(|field| decay_to_pointer(field, layout.array_member)) {
        Ok(handle) if handle.is_valid() => return Ok(handle),
        Ok(_) => debug!(type_name = descriptor.raw(), "data member is null"),
        Err(err) => debug!(type_name = descriptor.raw(), error = %err, "no usable data member"),
    }

    if element_count == 0 {
        return Err(DecodeError::UnresolvedStorage("empty container without a data pointer"));
    }
    if !descriptor.is_fixed_size() {
        return Err(DecodeError::UnresolvedStorage("runtime-sized container without a data pointer"));
    }
    object_address_storage(value, descriptor, options)
}

/// Strategies 1 and 2: turn a resolved data member into a typed pointer
fn decay_to_pointer<V: ValueHandle>(field: V, array_member: &str) -> Result<StorageHandle<V>, DecodeError>
{
    let mut field = field;
    if let Some(inner) = field.member(array_member) {
        field = inner;
    }
    if field.value_type().is_array() {
        field = field
            .child_at_index(0)
            .and_then(|first| first.address_of())
            .ok_or(DecodeError::UnresolvedStorage("array has no addressable first element"))?;
    }
    StorageHandle::from_pointer(field)
}

/// Strategy 3: the object's own address, reinterpreted as `element *`
fn object_address_storage<V: ValueHandle>(
    value: &V,
    descriptor: &TypeDescriptor,
    options: &DecodeOptions,
) -> Result<StorageHandle<V>, DecodeError>
{
    let element_type = element_type_for(value, descriptor, options)
        .ok_or(DecodeError::UnresolvedStorage("element type not found in target"))?;
    let pointer = value
        .address_of()
        .and_then(|address| address.cast(&element_type.pointer_to()))
        .ok_or(DecodeError::UnresolvedStorage("object has no address"))?;
    debug!(type_name = descriptor.raw(), "using the object's own address as inline storage");
    StorageHandle::from_pointer(pointer)
}

/// Element type named by the descriptor, or a configured scalar found in the type name
pub fn element_type_for<V: ValueHandle>(value: &V, descriptor: &TypeDescriptor, options: &DecodeOptions) -> Option<V::Type>
{
    let name = descriptor.element_type_name();
    if !name.is_empty() {
        if let Some(ty) = value.find_type(name) {
            return Some(ty);
        }
    }
    if name.contains('<') {
        return None;
    }
    let type_name = descriptor.raw();
    options
        .scalar_fallbacks
        .iter()
        .filter(|scalar| type_name.contains(scalar.as_str()))
        .find_map(|scalar| value.find_type(scalar))
}
