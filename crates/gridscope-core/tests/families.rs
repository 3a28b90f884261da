//! Registry dispatch and the supplemented container families

mod common;

use common::{grid, heap_matrix, plain_array_matrix, OBJECT};
use gridscope_core::prelude::*;
use gridscope_core::snapshot::{f32_bytes, f64_bytes, u64_bytes};

#[test]
fn test_formatters_ignore_unknown_types()
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    builder.map(OBJECT, f64_bytes(&[1.0])).unwrap();
    let value = builder.build().value("x", double, OBJECT).unwrap();

    let formatters = Formatters::default();
    assert!(formatters.summary(&value).is_none());
    assert!(formatters.synthetic_children(&value).is_none());
}

#[test]
fn test_typedef_resolves_through_canonical_name()
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let array = builder.array(double, 3).unwrap();
    let matrix = builder
        .structure("Eigen::Matrix<double, 3, 1, 0, 3, 1>", &[("array", array)])
        .unwrap();
    let alias = builder.alias("Eigen::Vector3d", matrix).unwrap();
    builder.map(OBJECT, f64_bytes(&[1.0, 2.0, 3.0])).unwrap();
    let value = builder.build().value("v", alias, OBJECT).unwrap();

    assert_eq!(value.canonical_type_name(), "Eigen::Matrix<double, 3, 1, 0, 3, 1>");
    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("Vector [3 x 1] ColMajor"));
    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 3);
    assert_eq!(children.child_at_index(2).and_then(|c| c.read_f64()), Some(3.0));
}

#[test]
fn test_array_and_map_kinds()
{
    let formatters = Formatters::default();
    let array = plain_array_matrix("Eigen::Array<double, 2, 2, 0, 2, 2>", &[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(formatters.summary(&array).as_deref(), Some("Array [2 x 2] ColMajor"));

    let map = heap_matrix(
        "Eigen::Map<Eigen::Matrix<double, -1, 1, 0, -1, 1>, 0, Eigen::Stride<0, 0> >",
        3,
        1,
        Some(&[4.0, 5.0, 6.0]),
    );
    assert_eq!(formatters.summary(&map).as_deref(), Some("Map [3 x 1] ColMajor"));
    let children = formatters.synthetic_children(&map).unwrap();
    assert_eq!(children.child_at_index(0).and_then(|c| c.read_f64()), Some(4.0));
}

#[test]
fn test_wrapped_runtime_dimensions()
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let ptr = builder.pointer(double).unwrap();
    let long = builder.type_id("long").unwrap();
    let wrapper = builder
        .structure("variable_if_dynamic<long, -1>", &[("m_value", long)])
        .unwrap();
    let ty = builder
        .structure(
            "Eigen::Map<Eigen::Matrix<double, -1, -1, 0, -1, -1>, 0, Eigen::Stride<0, 0> >",
            &[("m_data", ptr), ("m_rows", wrapper), ("m_cols", wrapper)],
        )
        .unwrap();
    builder.map(OBJECT, u64_bytes(&[0x8000, 2, 2])).unwrap();
    builder.map(0x8000u64, f64_bytes(&[1.0, 2.0, 3.0, 4.0])).unwrap();
    let value = builder.build().value("map", ty, OBJECT).unwrap();

    assert_eq!(Formatters::default().summary(&value).as_deref(), Some("Map [2 x 2] ColMajor"));
}

#[test]
fn test_matx_is_row_major()
{
    let mut builder = SnapshotBuilder::new();
    let float = builder.type_id("float").unwrap();
    let array = builder.array(float, 6).unwrap();
    let ty = builder.structure("cv::Matx<float, 2, 3>", &[("val", array)]).unwrap();
    builder.map(OBJECT, f32_bytes(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
    let value = builder.build().value("m", ty, OBJECT).unwrap();

    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("Matx [2 x 3] RowMajor"));
    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.index_of_child("[1, 0]"), Some(3));
    let child = children.child_at_index(3).unwrap();
    assert_eq!(child.name(), "[1, 0]");
    assert_eq!(child.read_f64(), Some(3.0));
}

#[test]
fn test_quaternion_children_and_summary()
{
    let value = {
        let mut builder = SnapshotBuilder::new();
        let double = builder.type_id("double").unwrap();
        let array = builder.array(double, 4).unwrap();
        let plain = builder.structure("plain_array", &[("array", array)]).unwrap();
        let storage = builder.structure("DenseStorage", &[("m_data", plain)]).unwrap();
        let coeffs = builder
            .structure("Eigen::Matrix<double, 4, 1, 0, 4, 1>", &[("m_storage", storage)])
            .unwrap();
        let ty = builder.structure("Eigen::Quaternion<double, 0>", &[("m_coeffs", coeffs)]).unwrap();
        builder.map(OBJECT, f64_bytes(&[0.0, 0.5, 0.0, 1.0])).unwrap();
        builder.build().value("q", ty, OBJECT).unwrap()
    };

    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("(x=0, y=0.5, z=0, w=1)"));

    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 4);
    assert_eq!(children.index_of_child("w"), Some(3));
    assert_eq!(children.index_of_child("v"), None);
    let y = children.child_at_index(1).unwrap();
    assert_eq!(y.name(), "y");
    assert_eq!(y.read_f64(), Some(0.5));
}

#[test]
fn test_quaternion_without_coefficients()
{
    let mut builder = SnapshotBuilder::new();
    let ty = builder.structure_with_offsets("Eigen::Quaternion<float, 0>", 16, &[]).unwrap();
    builder.map(OBJECT, vec![0; 16]).unwrap();
    let value = builder.build().value("q", ty, OBJECT).unwrap();

    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("Quaternion"));
    assert_eq!(formatters.synthetic_children(&value).unwrap().num_children(), 0);
}

#[test]
fn test_sparse_matrix_summary_only()
{
    let mut builder = SnapshotBuilder::new();
    let long = builder.type_id("long").unwrap();
    let ty = builder
        .structure("Eigen::SparseMatrix<double, 0, int>", &[("m_rows", long), ("m_cols", long)])
        .unwrap();
    builder.map(OBJECT, u64_bytes(&[100, 50])).unwrap();
    let value = builder.build().value("s", ty, OBJECT).unwrap();

    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("SparseMatrix [100 x 50]"));
    assert!(formatters.synthetic_children(&value).is_none());
}

#[test]
fn test_sparse_matrix_without_dimensions()
{
    let mut builder = SnapshotBuilder::new();
    let ty = builder.structure_with_offsets("Eigen::SparseMatrix<float, 1, int>", 8, &[]).unwrap();
    builder.map(OBJECT, vec![0; 8]).unwrap();
    let value = builder.build().value("s", ty, OBJECT).unwrap();
    assert_eq!(Formatters::default().summary(&value).as_deref(), Some("SparseMatrix"));
}

#[test]
fn test_packed_grid_data_view()
{
    // FLOAT64, 2 channels
    let flags = 0x4240_0000 | (1 << 3) | 6;
    let value = grid(flags, 2, 1, Some(&[1.0, 2.0, 3.0, 4.0]));

    let formatters = Formatters::default();
    assert_eq!(formatters.summary(&value).as_deref(), Some("{FLOAT64, 2 x 1 x 2}"));

    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 4);
    assert_eq!(children.index_of_child("[3]"), Some(3));
    assert_eq!(children.index_of_child("[0, 1]"), None);
    let last = children.child_at_index(3).unwrap();
    assert_eq!(last.name(), "[3]");
    assert_eq!(last.read_f64(), Some(4.0));
}

#[test]
fn test_packed_grid_null_data()
{
    let value = grid(6, 3, 3, None);
    let children = Formatters::default().synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 0);
    assert!(children.child_at_index(0).is_none());
}

#[test]
fn test_packed_grid_negative_dimensions()
{
    // Grids with more than two dimensions report -1 rows and columns
    let value = grid(6, -1, -1, Some(&[1.0]));
    assert_eq!(Formatters::default().summary(&value).as_deref(), Some("{FLOAT64, 1 x 0 x 0}"));
    assert_eq!(Formatters::default().synthetic_children(&value).unwrap().num_children(), 0);
}

#[test]
fn test_fixed_vec_children_from_val_array()
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let val3 = builder.array(double, 3).unwrap();
    let vec3 = builder.structure("cv::Vec<double, 3>", &[("val", val3)]).unwrap();
    let val4 = builder.array(double, 4).unwrap();
    let scalar = builder.structure("cv::Scalar_<double>", &[("val", val4)]).unwrap();
    builder.map(OBJECT, f64_bytes(&[1.0, 2.0, 3.0])).unwrap();
    builder.map(0x2000u64, f64_bytes(&[4.0, 5.0, 6.0, 7.0])).unwrap();
    let snapshot = builder.build();

    let formatters = Formatters::default();
    let value = snapshot.value("v", vec3, OBJECT).unwrap();
    assert_eq!(Family::of_value(&value), Some(Family::FixedVec));
    assert!(formatters.summary(&value).is_none());
    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 3);
    let last = children.child_at_index(2).unwrap();
    assert_eq!(last.name(), "[2]");
    assert_eq!(last.read_f64(), Some(3.0));
    assert_eq!(children.index_of_child("[1]"), Some(1));
    assert!(children.child_at_index(3).is_none());

    // Scalar_ names no length; the array says 4
    let value = snapshot.value("s", scalar, 0x2000u64).unwrap();
    let children = formatters.synthetic_children(&value).unwrap();
    assert_eq!(children.num_children(), 4);
    assert_eq!(children.child_at_index(3).and_then(|c| c.read_f64()), Some(7.0));
}
