//! # Shape Resolver
//!
//! Merges compile-time dimensions from the descriptor with runtime dimensions
//! read out of the object.

use tracing::debug;

use crate::config::DecodeOptions;
use crate::decoder::ContainerLayout;
use crate::descriptor::TypeDescriptor;
use crate::fields::resolve_unsigned;
use crate::host::ValueHandle;
use crate::types::{Extent, ResolvedShape};

/// Rows, columns and storage order of `value`
///
/// Dynamic axes are read through the layout's candidate paths and default to
/// zero when unreadable. The element stride is left at zero; the decoder fills
/// it in once storage is located.
pub fn resolve_shape<V: ValueHandle>(
    value: &V,
    descriptor: &TypeDescriptor,
    layout: &ContainerLayout,
    options: &DecodeOptions,
) -> ResolvedShape
{
    let rows = resolve_extent(value, descriptor.rows(), layout.rows_paths, options);
    let cols = resolve_extent(value, descriptor.cols(), layout.cols_paths, options);
    ResolvedShape::new(rows, cols, layout.order.resolve(descriptor))
}

/// One axis: the fixed size, or the first readable runtime field, or zero
///
/// Runtime dimensions are signed in the target; a negative one reads as zero.
pub fn resolve_extent<V: ValueHandle>(value: &V, extent: Extent, candidates: &[&str], options: &DecodeOptions) -> u64
{
    let Extent::Fixed(n) = extent else {
        return read_runtime_extent(value, candidates, options);
    };
    n
}

fn read_runtime_extent<V: ValueHandle>(value: &V, candidates: &[&str], options: &DecodeOptions) -> u64
{
    match resolve_unsigned(value, candidates, &options.wrapper_member) {
        Ok(n) if i64::try_from(n).is_ok() => n,
        Ok(n) => {
            debug!(raw = n, "negative runtime dimension, using 0");
            0
        }
        Err(err) => {
            debug!(error = %err, "runtime dimension unresolved, using 0");
            0
        }
    }
}
