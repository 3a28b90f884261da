//! Dimension and storage-order types.

use std::fmt;

/// A compile-time dimension parameter.
///
/// Containers encode each axis either as a literal integer or as a sentinel
/// meaning "sized at runtime". The sentinel (and anything that is not a
/// non-negative integer) becomes [`Extent::Dynamic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent
{
    /// Size fixed by the type itself
    Fixed(u64),
    /// Size stored in the object and read at runtime
    Dynamic,
}

impl Extent
{
    /// The fixed size, if this axis has one
    pub const fn fixed(self) -> Option<u64>
    {
        match self {
            Extent::Fixed(n) => Some(n),
            Extent::Dynamic => None,
        }
    }

    pub const fn is_dynamic(self) -> bool
    {
        matches!(self, Extent::Dynamic)
    }
}

impl fmt::Display for Extent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Extent::Fixed(n) => write!(f, "{n}"),
            Extent::Dynamic => write!(f, "Dynamic"),
        }
    }
}

/// Memory order of a two-dimensional container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageOrder
{
    /// First index varies fastest (the default for most numeric libraries)
    #[default]
    ColumnMajor,
    /// Last index varies fastest
    RowMajor,
}

impl StorageOrder
{
    /// Decode the storage-order bit of an options flag (bit 0 set means row-major)
    pub const fn from_flag(flag: i64) -> Self
    {
        if flag & 1 == 1 {
            StorageOrder::RowMajor
        } else {
            StorageOrder::ColumnMajor
        }
    }

    pub const fn is_row_major(self) -> bool
    {
        matches!(self, StorageOrder::RowMajor)
    }

    /// Label used in summaries
    pub const fn label(self) -> &'static str
    {
        match self {
            StorageOrder::ColumnMajor => "ColMajor",
            StorageOrder::RowMajor => "RowMajor",
        }
    }
}

impl fmt::Display for StorageOrder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.label())
    }
}

/// Final dimensions of a decoded container.
///
/// `rows` and `cols` are resolved (compile-time or read from the object);
/// `element_byte_size` is the stride between consecutive elements and is zero
/// when the element type could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedShape
{
    pub rows: u64,
    pub cols: u64,
    pub order: StorageOrder,
    pub element_byte_size: u64,
}

impl ResolvedShape
{
    pub const fn new(rows: u64, cols: u64, order: StorageOrder) -> Self
    {
        Self {
            rows,
            cols,
            order,
            element_byte_size: 0,
        }
    }

    /// Same shape with a known element stride
    #[must_use]
    pub const fn with_element_size(mut self, element_byte_size: u64) -> Self
    {
        self.element_byte_size = element_byte_size;
        self
    }

    /// `rows * cols`, saturating instead of overflowing on garbage reads
    pub const fn element_count(&self) -> u64
    {
        self.rows.saturating_mul(self.cols)
    }

    /// A 1×N or N×1 shape; children are named `[i]` instead of `[r, c]`
    pub const fn is_vector(&self) -> bool
    {
        self.rows == 1 || self.cols == 1
    }
}
