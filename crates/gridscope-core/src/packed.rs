//! # Packed-Field Decoder
//!
//! Grids that describe their element type with one integer instead of a
//! template parameter. The low bits of `flags` select the element depth, the
//! next thirteen bits hold the channel count minus one:
//!
//! ```text
//!  31            15 14        3 2   0
//! +----------------+-----------+-----+
//! |   other bits   | channels-1|depth|
//! +----------------+-----------+-----+
//! ```
//!
//! The grid's `data` member is an untyped byte pointer; it is reinterpreted
//! as a pointer to the decoded depth's element type.

use tracing::debug;

use crate::config::DecodeOptions;
use crate::error::DecodeError;
use crate::fields::{resolve_field, resolve_unsigned};
use crate::host::{TypeHandle, ValueHandle};
use crate::index::ChildName;
use crate::storage::StorageHandle;
use crate::summary::render_grid_summary;

const DEPTH_MASK: u64 = 0x7;
const CHANNEL_SHIFT: u32 = 3;
const CHANNEL_MASK: u64 = 0x1FFF;

/// Element type selected by the depth bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth
{
    U8,
    I8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

/// Depth table in bit order
pub const DEPTH_TABLE: [Depth; 7] = [Depth::U8, Depth::I8, Depth::U16, Depth::I16, Depth::I32, Depth::F32, Depth::F64];

/// Summary labels in bit order; bit pattern 7 is a user type
const DEPTH_LABELS: [&str; 8] = ["UINT8", "INT8", "UINT16", "INT16", "INT32", "FLOAT32", "FLOAT64", "USER"];

impl Depth
{
    /// Table lookup; anything outside the table reads as bytes
    pub fn from_bits(bits: u64) -> Self
    {
        usize::try_from(bits)
            .ok()
            .and_then(|i| DEPTH_TABLE.get(i))
            .copied()
            .unwrap_or(Depth::U8)
    }

    /// Element type name to look up in the target
    pub const fn type_name(self) -> &'static str
    {
        match self {
            Depth::U8 => "uint8_t",
            Depth::I8 => "int8_t",
            Depth::U16 => "uint16_t",
            Depth::I16 => "int16_t",
            Depth::I32 => "int32_t",
            Depth::F32 => "float",
            Depth::F64 => "double",
        }
    }
}

/// The packed `flags` integer of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackedFlags(pub u64);

impl PackedFlags
{
    pub const fn depth_bits(self) -> u64
    {
        self.0 & DEPTH_MASK
    }

    pub fn depth(self) -> Depth
    {
        Depth::from_bits(self.depth_bits())
    }

    /// Channel count, at least 1
    pub const fn channels(self) -> u64
    {
        ((self.0 >> CHANNEL_SHIFT) & CHANNEL_MASK) + 1
    }

    /// Summary label, including `USER` for the out-of-table depth
    pub fn depth_label(self) -> &'static str
    {
        usize::try_from(self.depth_bits())
            .ok()
            .and_then(|i| DEPTH_LABELS.get(i))
            .copied()
            .unwrap_or("UINT8")
    }
}

/// A packed grid value decoded at one stop
#[derive(Debug, Clone)]
pub struct DecodedGrid<V: ValueHandle>
{
    pub rows: u64,
    pub cols: u64,
    pub flags: PackedFlags,
    storage: StorageHandle<V>,
}

/// Read `rows`, `cols`, `flags` and `data` from a grid value
///
/// Missing or negative dimensions read as 0; a missing element type or a null
/// data pointer leaves the grid without children.
pub fn decode_grid<V: ValueHandle>(value: &V, options: &DecodeOptions) -> DecodedGrid<V>
{
    let rows = read_dimension(value, "rows", options);
    let cols = read_dimension(value, "cols", options);
    let flags = PackedFlags(resolve_unsigned(value, &["flags"], &options.wrapper_member).unwrap_or_else(|err| {
        debug!(error = %err, "grid flags unreadable");
        0
    }));
    let storage = typed_data(value, flags.depth()).unwrap_or_else(|err| {
        debug!(error = %err, "grid data unresolved");
        StorageHandle::invalid()
    });
    DecodedGrid {
        rows,
        cols,
        flags,
        storage,
    }
}

/// A signed dimension field; negative values are treated as unset
fn read_dimension<V: ValueHandle>(value: &V, name: &str, options: &DecodeOptions) -> u64
{
    match resolve_unsigned(value, &[name], &options.wrapper_member) {
        Ok(n) if n <= u64::from(i32::MAX.unsigned_abs()) => n,
        Ok(n) => {
            debug!(field = name, raw = n, "negative grid dimension");
            0
        }
        Err(err) => {
            debug!(field = name, error = %err, "grid dimension unresolved");
            0
        }
    }
}

fn typed_data<V: ValueHandle>(value: &V, depth: Depth) -> Result<StorageHandle<V>, DecodeError>
{
    let data = resolve_field(value, &["data"])?;
    let element_type = value
        .find_type(depth.type_name())
        .ok_or(DecodeError::UnresolvedStorage("grid element type not found in target"))?;
    let typed = data
        .cast(&element_type.pointer_to())
        .ok_or(DecodeError::UnresolvedStorage("grid data pointer cannot be cast"))?;
    StorageHandle::from_pointer(typed)
}

impl<V: ValueHandle> DecodedGrid<V>
{
    /// `rows * cols * channels`
    pub fn element_count(&self) -> u64
    {
        self.rows.saturating_mul(self.cols).saturating_mul(self.flags.channels())
    }

    /// Element count, or 0 when the data view could not be built
    pub fn num_children(&self) -> u64
    {
        if self.storage.is_valid() {
            self.element_count()
        } else {
            0
        }
    }

    /// Children of the data view are only addressed linearly
    pub fn index_of_child(&self, name: &str) -> Option<u64>
    {
        match ChildName::parse(name)? {
            ChildName::Linear(i) if i < self.num_children() => Some(i),
            _ => None,
        }
    }

    pub fn child_at_index(&self, index: u64) -> Option<V>
    {
        if index >= self.num_children() {
            return None;
        }
        let offset = index.checked_mul(self.storage.element_byte_size())?;
        self.storage.element_at(&format!("[{index}]"), offset)
    }

    pub fn summary(&self) -> String
    {
        render_grid_summary(self.flags.depth_label(), self.flags.channels(), self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_flags_0x1a()
    {
        let flags = PackedFlags(0x1A);
        assert_eq!(flags.depth_bits(), 2);
        assert_eq!(flags.depth(), Depth::U16);
        assert_eq!(flags.depth().type_name(), "uint16_t");
        assert_eq!(flags.channels(), 4);
        assert_eq!(flags.depth_label(), "UINT16");
    }

    #[test]
    fn test_user_depth_falls_back_to_bytes()
    {
        let flags = PackedFlags(0x7);
        assert_eq!(flags.depth(), Depth::U8);
        assert_eq!(flags.depth_label(), "USER");
        assert_eq!(flags.channels(), 1);
    }

    #[test]
    fn test_upper_bits_are_ignored()
    {
        // Signature bits sit above the channel field
        let flags = PackedFlags(0x4240_0006);
        assert_eq!(flags.depth(), Depth::F64);
        assert_eq!(flags.channels(), 1);
    }

    #[test]
    fn test_channel_field_is_thirteen_bits()
    {
        assert_eq!(PackedFlags(0x1FFF << 3).channels(), 0x2000);
        assert_eq!(PackedFlags(0x2000 << 3).channels(), 1);
    }
}
