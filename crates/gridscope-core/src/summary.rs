//! # Summary Renderer
//!
//! One-line descriptions shown next to a value before it is expanded.
//!
//! Renderers are pure functions of already-decoded data and never fail: with
//! nothing decoded they still return the bare kind label.

use std::fmt;

use crate::types::ResolvedShape;

/// Label family of a dense container summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind
{
    Matrix,
    Array,
    Map,
    Matx,
    Vec,
}

impl ContainerKind
{
    /// Label for `shape`; a one-row or one-column `Matrix` reads as `Vector`
    pub fn label(self, shape: Option<&ResolvedShape>) -> &'static str
    {
        match self {
            ContainerKind::Matrix if shape.is_some_and(ResolvedShape::is_vector) => "Vector",
            ContainerKind::Matrix => "Matrix",
            ContainerKind::Array => "Array",
            ContainerKind::Map => "Map",
            ContainerKind::Matx => "Matx",
            ContainerKind::Vec => "Vec",
        }
    }
}

impl fmt::Display for ContainerKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.label(None))
    }
}

/// `"<Kind> [<rows> x <cols>] <RowMajor|ColMajor>"`, or just the kind without a shape
///
/// ```rust
/// use gridscope_core::summary::{render_summary, ContainerKind};
/// use gridscope_core::types::{ResolvedShape, StorageOrder};
///
/// let shape = ResolvedShape::new(3, 1, StorageOrder::ColumnMajor);
/// assert_eq!(render_summary(ContainerKind::Matrix, Some(&shape)), "Vector [3 x 1] ColMajor");
/// assert_eq!(render_summary(ContainerKind::Array, None), "Array");
/// ```
pub fn render_summary(kind: ContainerKind, shape: Option<&ResolvedShape>) -> String
{
    let label = kind.label(shape);
    match shape {
        Some(shape) => format!("{label} [{} x {}] {}", shape.rows, shape.cols, shape.order),
        None => label.to_string(),
    }
}

/// `"SparseMatrix [<rows> x <cols>]"` when both dimensions were read
pub fn render_sparse_summary(dims: Option<(u64, u64)>) -> String
{
    match dims {
        Some((rows, cols)) => format!("SparseMatrix [{rows} x {cols}]"),
        None => "SparseMatrix".to_string(),
    }
}

/// `"(x=.., y=.., z=.., w=..)"` from the coefficient display strings
pub fn render_quaternion_summary(coeffs: Option<&[String; 4]>) -> String
{
    match coeffs {
        Some([x, y, z, w]) => format!("(x={x}, y={y}, z={z}, w={w})"),
        None => "Quaternion".to_string(),
    }
}

/// `"{<DEPTH>, <channels> x <cols> x <rows>}"` for a packed grid
pub fn render_grid_summary(depth_label: &str, channels: u64, rows: u64, cols: u64) -> String
{
    format!("{{{depth_label}, {channels} x {cols} x {rows}}}")
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::StorageOrder;

    #[test]
    fn test_matrix_and_vector_labels()
    {
        let square = ResolvedShape::new(3, 3, StorageOrder::RowMajor);
        assert_eq!(render_summary(ContainerKind::Matrix, Some(&square)), "Matrix [3 x 3] RowMajor");

        let row = ResolvedShape::new(1, 4, StorageOrder::ColumnMajor);
        assert_eq!(render_summary(ContainerKind::Matrix, Some(&row)), "Vector [1 x 4] ColMajor");
        // Only Matrix is relabelled
        assert_eq!(render_summary(ContainerKind::Array, Some(&row)), "Array [1 x 4] ColMajor");
    }

    #[test]
    fn test_empty_shape_renders()
    {
        let empty = ResolvedShape::default();
        assert_eq!(render_summary(ContainerKind::Matrix, Some(&empty)), "Matrix [0 x 0] ColMajor");
        assert_eq!(render_summary(ContainerKind::Map, None), "Map");
    }

    #[test]
    fn test_family_summaries()
    {
        assert_eq!(render_sparse_summary(Some((10, 20))), "SparseMatrix [10 x 20]");
        assert_eq!(render_sparse_summary(None), "SparseMatrix");

        let coeffs = ["0".to_string(), "0".to_string(), "0".to_string(), "1".to_string()];
        assert_eq!(render_quaternion_summary(Some(&coeffs)), "(x=0, y=0, z=0, w=1)");
        assert_eq!(render_quaternion_summary(None), "Quaternion");

        assert_eq!(render_grid_summary("FLOAT64", 1, 480, 640), "{FLOAT64, 1 x 640 x 480}");
    }
}
