//! Container layouts shared by the integration tests

#![allow(dead_code)]

use gridscope_core::snapshot::{f64_bytes, i32_bytes, u64_bytes, SnapshotBuilder, SnapshotValue};

pub const OBJECT: u64 = 0x1000;
pub const HEAP: u64 = 0x8000;

/// Fixed-size matrix as `m_storage.m_data.array`
pub fn plain_array_matrix(type_name: &str, values: &[f64]) -> SnapshotValue
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let array = builder.array(double, values.len() as u64).unwrap();
    let plain = builder.structure("plain_array", &[("array", array)]).unwrap();
    let storage = builder.structure("DenseStorage", &[("m_data", plain)]).unwrap();
    let ty = builder.structure(type_name, &[("m_storage", storage)]).unwrap();
    builder.map(OBJECT, f64_bytes(values)).unwrap();
    builder.build().value("m", ty, OBJECT).unwrap()
}

/// Fixed-size matrix whose members the host cannot see
pub fn opaque_matrix(type_name: &str, values: &[f64]) -> SnapshotValue
{
    let mut builder = SnapshotBuilder::new();
    let size = 8 * values.len() as u64;
    let ty = builder.structure_with_offsets(type_name, size, &[]).unwrap();
    builder.map(OBJECT, f64_bytes(values)).unwrap();
    builder.build().value("m", ty, OBJECT).unwrap()
}

/// Fixed-size matrix with inline elements and a trailing null `m_data` pointer
pub fn null_pointer_matrix(type_name: &str, values: &[f64]) -> SnapshotValue
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let ptr = builder.pointer(double).unwrap();
    let inline = 8 * values.len() as u64;
    let ty = builder
        .structure_with_offsets(type_name, inline + 8, &[("m_data", ptr, inline)])
        .unwrap();
    let mut bytes = f64_bytes(values);
    bytes.extend(u64_bytes(&[0]));
    builder.map(OBJECT, bytes).unwrap();
    builder.build().value("m", ty, OBJECT).unwrap()
}

/// Heap storage with runtime `m_storage.m_rows` / `m_storage.m_cols`
pub fn heap_matrix(type_name: &str, rows: u64, cols: u64, data: Option<&[f64]>) -> SnapshotValue
{
    let mut builder = SnapshotBuilder::new();
    let double = builder.type_id("double").unwrap();
    let ptr = builder.pointer(double).unwrap();
    let long = builder.type_id("long").unwrap();
    let storage = builder
        .structure("DenseStorage", &[("m_data", ptr), ("m_rows", long), ("m_cols", long)])
        .unwrap();
    let ty = builder.structure(type_name, &[("m_storage", storage)]).unwrap();
    let pointer = if data.is_some() { HEAP } else { 0 };
    builder.map(OBJECT, u64_bytes(&[pointer, rows, cols])).unwrap();
    if let Some(values) = data {
        builder.map(HEAP, f64_bytes(values)).unwrap();
    }
    builder.build().value("m", ty, OBJECT).unwrap()
}

/// `cv::Mat`-shaped grid header with a double payload
pub fn grid(flags: i32, rows: i32, cols: i32, data: Option<&[f64]>) -> SnapshotValue
{
    let mut builder = SnapshotBuilder::new();
    let int = builder.type_id("int").unwrap();
    let uchar = builder.type_id("unsigned char").unwrap();
    let ptr = builder.pointer(uchar).unwrap();
    let ty = builder
        .structure(
            "cv::Mat",
            &[("flags", int), ("dims", int), ("rows", int), ("cols", int), ("data", ptr)],
        )
        .unwrap();
    let pointer = if data.is_some() { HEAP } else { 0 };
    let mut header = i32_bytes(&[flags, 2, rows, cols]);
    header.extend(u64_bytes(&[pointer]));
    builder.map(OBJECT, header).unwrap();
    if let Some(values) = data {
        builder.map(HEAP, f64_bytes(values)).unwrap();
    }
    builder.build().value("image", ty, OBJECT).unwrap()
}
