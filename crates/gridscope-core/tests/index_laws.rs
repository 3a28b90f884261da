//! Properties of the name/index mapping over arbitrary shapes

use gridscope_core::index::{child_ref, coordinates, display_name, linear_index, name_to_index};
use gridscope_core::types::{ResolvedShape, StorageOrder};
use proptest::prelude::*;

fn order() -> impl Strategy<Value = StorageOrder>
{
    prop_oneof![Just(StorageOrder::ColumnMajor), Just(StorageOrder::RowMajor)]
}

fn shape() -> impl Strategy<Value = ResolvedShape>
{
    (0u64..24, 0u64..24, order()).prop_map(|(rows, cols, order)| ResolvedShape::new(rows, cols, order))
}

/// A non-empty shape with a cell inside it
fn shape_and_cell() -> impl Strategy<Value = (ResolvedShape, u64, u64)>
{
    (1u64..24, 1u64..24, order()).prop_flat_map(|(rows, cols, order)| {
        (Just(ResolvedShape::new(rows, cols, order)), 0..rows, 0..cols)
    })
}

proptest! {
    #[test]
    fn test_every_name_maps_back_to_its_index(shape in shape())
    {
        for index in 0..shape.element_count() {
            let name = display_name(&shape, index).unwrap();
            prop_assert_eq!(name_to_index(&shape, &name), Some(index));
        }
        prop_assert!(display_name(&shape, shape.element_count()).is_none());
    }

    #[test]
    fn test_offset_formula((shape, r, c) in shape_and_cell())
    {
        let expected = if shape.order.is_row_major() {
            r * shape.cols + c
        } else {
            c * shape.rows + r
        };
        prop_assert_eq!(linear_index(&shape, r, c), Some(expected));
        prop_assert_eq!(coordinates(&shape, expected), Some((r, c)));
    }

    #[test]
    fn test_vectors_use_linear_names(len in 1u64..32, order in order(), row_vector in any::<bool>())
    {
        let shape = if row_vector {
            ResolvedShape::new(1, len, order)
        } else {
            ResolvedShape::new(len, 1, order)
        };
        for index in 0..len {
            prop_assert_eq!(display_name(&shape, index), Some(format!("[{index}]")));
        }
    }

    #[test]
    fn test_byte_offset_is_index_times_stride(shape in shape(), stride in 1u64..16)
    {
        let shape = shape.with_element_size(stride);
        for index in 0..shape.element_count() {
            prop_assert_eq!(child_ref(&shape, index).unwrap().byte_offset, index * stride);
        }
    }
}
