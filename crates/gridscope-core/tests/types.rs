//! Tests for host-agnostic types

use gridscope_core::descriptor::TypeDescriptor;
use gridscope_core::types::{Address, Extent, ResolvedShape, StorageOrder};

#[test]
fn test_address_from_u64()
{
    let addr = Address::from(0x1000);
    assert_eq!(addr.value(), 0x1000);
    let raw: u64 = addr.into();
    assert_eq!(raw, 0x1000);
}

#[test]
fn test_address_null_sentinel()
{
    assert!(Address::ZERO.is_null());
    assert!(!Address::new(8).is_null());
    assert_eq!(Address::default(), Address::ZERO);
}

#[test]
fn test_address_arithmetic()
{
    let base = Address::new(0x1000);
    assert_eq!(base.checked_add(0x18), Some(Address::new(0x1018)));
    assert_eq!(Address::new(u64::MAX).checked_add(1), None);
    assert_eq!(Address::new(0x1018).offset_from(base), Some(0x18));
    assert_eq!(base.offset_from(Address::new(0x1018)), None);
}

#[test]
fn test_address_display()
{
    assert_eq!(format!("{}", Address::new(0xdead_beef)), "0x00000000deadbeef");
}

#[test]
fn test_descriptor_shapes()
{
    let fixed = TypeDescriptor::parse("Eigen::Matrix<float, 4, 4, 1, 4, 4>");
    assert_eq!(fixed.element_type_name(), "float");
    assert_eq!((fixed.rows(), fixed.cols()), (Extent::Fixed(4), Extent::Fixed(4)));
    assert_eq!(fixed.order(), StorageOrder::RowMajor);

    let dynamic = TypeDescriptor::parse("Eigen::Array<int, Dynamic, 1>");
    assert_eq!(dynamic.rows(), Extent::Dynamic);
    assert_eq!(dynamic.cols(), Extent::Fixed(1));
    assert_eq!(dynamic.order(), StorageOrder::ColumnMajor);
    assert!(!dynamic.is_fixed_size());
}

#[test]
fn test_resolved_shape_defaults()
{
    let shape = ResolvedShape::default();
    assert_eq!(shape.element_count(), 0);
    assert_eq!(shape.order, StorageOrder::ColumnMajor);
    assert_eq!(shape.element_byte_size, 0);
}
