//! Tests for error handling

use gridscope_core::error::{DecodeError, GridscopeError, GridscopeResult};
use gridscope_core::types::Address;

#[test]
fn test_unmapped_address_message()
{
    let error = GridscopeError::UnmappedAddress(Address::new(0x1000));
    let message = format!("{error}");
    assert!(message.contains("0x0000000000001000"));
    assert!(message.contains("not mapped"));
}

#[test]
fn test_invalid_layout_message()
{
    let error = GridscopeError::InvalidLayout {
        name: "DenseStorage".to_string(),
        reason: "field m_data extends past 8 bytes".to_string(),
    };
    let message = format!("{error}");
    assert!(message.contains("DenseStorage"));
    assert!(message.contains("m_data"));
}

#[test]
fn test_unknown_type_message()
{
    let error = GridscopeError::UnknownType("Eigen::half".to_string());
    assert_eq!(format!("{error}"), "Unknown type: Eigen::half");
}

#[test]
fn test_child_out_of_range_message()
{
    let error = DecodeError::ChildOutOfRange { index: 9, count: 4 };
    let message = format!("{error}");
    assert!(message.contains('9'));
    assert!(message.contains('4'));
}

#[test]
fn test_field_not_found_lists_candidates()
{
    let error = DecodeError::FieldNotFound {
        candidates: vec!["m_data".to_string(), "m_storage.m_data".to_string()],
    };
    assert!(format!("{error}").contains("m_storage.m_data"));
}

#[test]
fn test_result_type()
{
    fn returns_result() -> GridscopeResult<u32>
    {
        Ok(42)
    }

    fn returns_error() -> GridscopeResult<u32>
    {
        Err(GridscopeError::InvalidArgument("test".to_string()))
    }

    assert_eq!(returns_result().unwrap(), 42);
    assert!(returns_error().is_err());
}

#[test]
fn test_error_equality()
{
    assert_eq!(
        GridscopeError::DuplicateType("double".to_string()),
        GridscopeError::DuplicateType("double".to_string())
    );
    assert_ne!(
        DecodeError::UnresolvedStorage("null data pointer"),
        DecodeError::UnresolvedStorage("no data member")
    );
}
