//! Captured memory regions.

use crate::error::{GridscopeError, GridscopeResult};
use crate::types::Address;

/// One contiguous run of captured target memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRegion
{
    /// First address of the region
    pub start: Address,
    /// Region contents, `bytes[0]` lives at `start`
    pub bytes: Vec<u8>,
}

impl MappedRegion
{
    /// Number of bytes in this region
    pub fn size(&self) -> u64
    {
        self.bytes.len() as u64
    }

    /// One past the last address of this region (saturating)
    pub fn end(&self) -> u64
    {
        self.start.value().saturating_add(self.size())
    }

    /// Check whether `[address, address + len)` lies entirely in this region
    pub fn contains_range(&self, address: Address, len: u64) -> bool
    {
        let Some(end) = address.value().checked_add(len) else {
            return false;
        };
        address >= self.start && end <= self.end()
    }

    fn overlaps(&self, other: &MappedRegion) -> bool
    {
        self.start.value() < other.end() && other.start.value() < self.end()
    }
}

/// Sparse memory image made of non-overlapping regions
///
/// Reads are little-endian and must fall entirely inside one region; anything
/// else reads as unmapped.
#[derive(Debug, Clone, Default)]
pub struct MemoryImage
{
    regions: Vec<MappedRegion>,
}

impl MemoryImage
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add a region
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the region is empty, wraps past the end of the
    /// address space, or overlaps an existing region.
    pub fn map(&mut self, start: Address, bytes: Vec<u8>) -> GridscopeResult<()>
    {
        let region = MappedRegion { start, bytes };
        if region.bytes.is_empty() {
            return Err(GridscopeError::InvalidArgument(format!("empty region at {start}")));
        }
        if start.checked_add(region.size()).is_none() {
            return Err(GridscopeError::InvalidArgument(format!("region at {start} wraps the address space")));
        }
        if self.regions.iter().any(|existing| existing.overlaps(&region)) {
            return Err(GridscopeError::InvalidArgument(format!("region at {start} overlaps a mapped region")));
        }
        self.regions.push(region);
        self.regions.sort_by_key(|r| r.start);
        Ok(())
    }

    /// Borrow `len` bytes starting at `address`
    pub fn read(&self, address: Address, len: u64) -> Option<&[u8]>
    {
        let region = self.regions.iter().find(|r| r.contains_range(address, len))?;
        let start = usize::try_from(address.offset_from(region.start)?).ok()?;
        let len = usize::try_from(len).ok()?;
        region.bytes.get(start..start + len)
    }

    /// Whether `[address, address + len)` is readable
    pub fn is_mapped(&self, address: Address, len: u64) -> bool
    {
        self.regions.iter().any(|r| r.contains_range(address, len))
    }

    pub fn regions(&self) -> &[MappedRegion]
    {
        &self.regions
    }
}

/// Little-endian bytes of a slice of `f64`
pub fn f64_bytes(values: &[f64]) -> Vec<u8>
{
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a slice of `f32`
pub fn f32_bytes(values: &[f32]) -> Vec<u8>
{
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a slice of `u64`
pub fn u64_bytes(values: &[u64]) -> Vec<u8>
{
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a slice of `i32`
pub fn i32_bytes(values: &[i32]) -> Vec<u8>
{
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
