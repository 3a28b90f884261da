//! # Field Resolver
//!
//! Container libraries rename and re-nest their members between releases
//! (`m_data` vs `m_storage.m_data`, `m_rows` vs `m_rows.m_value`). Callers pass
//! every known spelling, newest or most common first, and take whichever
//! exists on the value at hand.

use tracing::trace;

use crate::error::DecodeError;
use crate::host::ValueHandle;

/// First candidate path that resolves on `value`
///
/// Each candidate is tried as a direct member name, then (if it contains a
/// dot) as a nested member path.
///
/// ## Errors
///
/// `DecodeError::FieldNotFound` if no candidate resolves. A field that exists
/// but holds zero is still found.
pub fn resolve_field<V: ValueHandle>(value: &V, candidates: &[&str]) -> Result<V, DecodeError>
{
    for path in candidates {
        if let Some(child) = value.member(path) {
            trace!(path, "resolved member");
            return Ok(child);
        }
        if path.contains('.') {
            if let Some(child) = value.expression_path(path) {
                trace!(path, "resolved member path");
                return Ok(child);
            }
        }
    }
    Err(DecodeError::FieldNotFound {
        candidates: candidates.iter().map(ToString::to_string).collect(),
    })
}

/// Integer value of the first candidate path that resolves on `value`
///
/// If the resolved field is a single-field wrapper exposing `wrapper_member`,
/// the wrapped value is read instead.
///
/// ## Errors
///
/// `DecodeError::FieldNotFound` if no candidate resolves, and
/// `DecodeError::UnreadableField` if the field exists but has no integer value.
pub fn resolve_unsigned<V: ValueHandle>(value: &V, candidates: &[&str], wrapper_member: &str) -> Result<u64, DecodeError>
{
    let field = resolve_field(value, candidates)?;
    let field = field.member(wrapper_member).unwrap_or(field);
    field.as_unsigned().ok_or_else(|| DecodeError::UnreadableField(field.name()))
}
