//! # Index Mapper
//!
//! Converts between child display names and linear storage indices.
//!
//! Children are served in storage order: linear index `i` is the `i`-th
//! element in memory. Its display coordinate depends on the storage order:
//!
//! | order        | `(r, c)` from `i`          | `i` from `(r, c)` |
//! |--------------|----------------------------|-------------------|
//! | row-major    | `(i / cols, i % cols)`     | `r * cols + c`    |
//! | column-major | `(i % rows, i / rows)`     | `c * rows + r`    |
//!
//! Vectors (`rows == 1` or `cols == 1`) display as `[i]`, everything else as
//! `[r, c]`. The coordinate is cosmetic; memory offsets come only from the
//! linear index.

use crate::error::DecodeError;
use crate::types::ResolvedShape;

/// A child name as typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildName
{
    /// `[i]` or `i`
    Linear(u64),
    /// `[r, c]` or `r,c`
    Coordinate(u64, u64),
}

impl ChildName
{
    /// Parse `[i]`, `i`, `[r, c]` or `r,c`; anything else is `None`
    pub fn parse(name: &str) -> Option<Self>
    {
        let trimmed = name.trim();
        let inner = match trimmed.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']')?,
            None => trimmed,
        };
        let mut parts = inner.split(',');
        let first = parts.next()?.trim().parse::<u64>().ok()?;
        match (parts.next(), parts.next()) {
            (None, _) => Some(ChildName::Linear(first)),
            (Some(second), None) => Some(ChildName::Coordinate(first, second.trim().parse::<u64>().ok()?)),
            (Some(_), Some(_)) => None,
        }
    }
}

/// One child of a decoded container, computed on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef
{
    pub display_name: String,
    pub linear_index: u64,
    pub row: u64,
    pub col: u64,
    /// `linear_index * element_byte_size`
    pub byte_offset: u64,
}

/// `(row, col)` of linear index `index`, `None` when out of range
pub fn coordinates(shape: &ResolvedShape, index: u64) -> Option<(u64, u64)>
{
    if index >= shape.element_count() {
        return None;
    }
    if shape.order.is_row_major() {
        Some((index / shape.cols, index % shape.cols))
    } else {
        Some((index % shape.rows, index / shape.rows))
    }
}

/// Linear index of `(row, col)`, `None` when out of range
pub fn linear_index(shape: &ResolvedShape, row: u64, col: u64) -> Option<u64>
{
    if row >= shape.rows || col >= shape.cols {
        return None;
    }
    if shape.order.is_row_major() {
        row.checked_mul(shape.cols)?.checked_add(col)
    } else {
        col.checked_mul(shape.rows)?.checked_add(row)
    }
}

/// Linear index for a child name, `None` for bad syntax or out-of-range values
pub fn name_to_index(shape: &ResolvedShape, name: &str) -> Option<u64>
{
    match ChildName::parse(name)? {
        ChildName::Linear(i) => (i < shape.element_count()).then_some(i),
        ChildName::Coordinate(r, c) => linear_index(shape, r, c),
    }
}

/// Display name of linear index `index`
pub fn display_name(shape: &ResolvedShape, index: u64) -> Option<String>
{
    let (row, col) = coordinates(shape, index)?;
    if shape.is_vector() {
        Some(format!("[{index}]"))
    } else {
        Some(format!("[{row}, {col}]"))
    }
}

/// Everything needed to materialize child `index`
///
/// ## Errors
///
/// `DecodeError::ChildOutOfRange` when `index` is not below the element count.
pub fn child_ref(shape: &ResolvedShape, index: u64) -> Result<ChildRef, DecodeError>
{
    let out_of_range = || DecodeError::ChildOutOfRange {
        index: usize::try_from(index).unwrap_or(usize::MAX),
        count: usize::try_from(shape.element_count()).unwrap_or(usize::MAX),
    };
    let (row, col) = coordinates(shape, index).ok_or_else(out_of_range)?;
    let byte_offset = index.checked_mul(shape.element_byte_size).ok_or_else(out_of_range)?;
    let display_name = display_name(shape, index).ok_or_else(out_of_range)?;
    Ok(ChildRef {
        display_name,
        linear_index: index,
        row,
        col,
        byte_offset,
    })
}
