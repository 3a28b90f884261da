//! # Error Types
//!
//! Error handling for the layout decoder and the in-memory host.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Two families live here:
//!
//! - [`GridscopeError`]: failures the caller should see, such as building a
//!   memory snapshot with an unknown type or parsing CLI input.
//! - [`DecodeError`]: the internal decode taxonomy. These never cross the
//!   formatter boundary; every decode step that produces one is recovered by
//!   a fallback and logged at debug level.

use thiserror::Error;

use crate::types::Address;

/// Main error type for library operations
///
/// ## Error Categories
///
/// 1. **Snapshot errors**: UnknownType, DuplicateType, UnmappedAddress, InvalidLayout
/// 2. **Input errors**: InvalidArgument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridscopeError
{
    /// A type id or type name was used before it was declared
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A type name was declared twice in the same snapshot
    #[error("Type already declared: {0}")]
    DuplicateType(String),

    /// A read or a value was requested at an address outside every mapped region
    #[error("Address {0} is not mapped in the snapshot")]
    UnmappedAddress(Address),

    /// A type definition is inconsistent (zero-sized scalar, field past the end, ...)
    #[error("Invalid layout for {name}: {reason}")]
    InvalidLayout
    {
        /// Name of the offending type
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Invalid argument passed to a library or CLI function
    ///
    /// Examples:
    /// - A child name that is neither `[i]` nor `[r, c]`
    /// - A flags value that does not parse as hex or decimal
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for `Result<T, GridscopeError>`
///
/// ```rust
/// use gridscope_core::error::GridscopeResult;
/// fn foo() -> GridscopeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type GridscopeResult<T> = std::result::Result<T, GridscopeError>;

/// Reasons a single decode step gave up.
///
/// These are swallowed by the decoder; they exist so each step can say why it
/// failed and the fallback chain can log it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError
{
    /// The type descriptor had no usable generic parameter list
    #[error("malformed type descriptor: {0}")]
    MalformedDescriptor(String),

    /// None of the candidate member paths exist on this value
    #[error("no field matched any of {candidates:?}")]
    FieldNotFound
    {
        /// The paths that were tried, in order
        candidates: Vec<String>,
    },

    /// A field exists but its value could not be read as an integer
    #[error("field {0} exists but could not be read")]
    UnreadableField(String),

    /// No storage strategy produced a non-null base address and element type
    #[error("storage could not be resolved: {0}")]
    UnresolvedStorage(&'static str),

    /// A child index or name outside the resolved shape
    #[error("child {index} out of range (count {count})")]
    ChildOutOfRange
    {
        /// Requested linear index
        index: usize,
        /// Number of children the shape exposes
        count: usize,
    },
}
