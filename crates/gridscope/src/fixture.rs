//! In-memory container layouts for `gridscope inspect`.
//!
//! Each family is laid out the way its library stores it in a debug build, so
//! the decoder sees the same member paths it would see in a live session.

use clap::ValueEnum;
use gridscope_core::descriptor::{generic_args, TypeDescriptor};
use gridscope_core::error::{GridscopeError, GridscopeResult};
use gridscope_core::registry::Family;
use gridscope_core::snapshot::{i32_bytes, u64_bytes, ScalarKind, SnapshotBuilder, SnapshotValue, TypeId};

/// Where the container object lives
pub const OBJECT_ADDRESS: u64 = 0x1000;
/// Where heap-allocated elements live
pub const HEAP_ADDRESS: u64 = 0x10_0000;

/// Flags signature the grid family carries above the depth and channel bits
const GRID_SIGNATURE: i32 = 0x4240_0000;

/// How a dense container's elements are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FixtureLayout
{
    /// `m_storage.m_data.array`, a fixed array inside the object
    PlainArray,
    /// Elements at the start of an object with no visible members
    #[default]
    Inline,
    /// `m_storage.m_data` pointing at a separate allocation
    Heap,
    /// Like `heap`, with a null data pointer
    Null,
}

/// What to lay out
#[derive(Debug, Clone)]
pub struct FixtureRequest
{
    pub type_name: String,
    pub layout: FixtureLayout,
    pub values: Vec<f64>,
    /// Runtime rows for dynamic axes and runtime-sized families
    pub rows: Option<u64>,
    pub cols: Option<u64>,
}

/// Build a snapshot holding the requested container and return its root value
///
/// ## Errors
///
/// `InvalidArgument` if no family matches the type name or the values do not
/// fit its shape, `UnknownType` if the element type is not a known scalar.
pub fn build_value(request: &FixtureRequest) -> GridscopeResult<SnapshotValue>
{
    let family = Family::match_type_name(&request.type_name)
        .ok_or_else(|| GridscopeError::InvalidArgument(format!("no container family matches {}", request.type_name)))?;

    let mut builder = SnapshotBuilder::new();
    let root = match family {
        Family::DenseMatrix | Family::DenseArray => dense(&mut builder, request, false)?,
        Family::MapView => dense(&mut builder, request, true)?,
        Family::FixedMatx => matx(&mut builder, request)?,
        Family::Quaternion => quaternion(&mut builder, request)?,
        Family::SparseMatrix => sparse(&mut builder, request)?,
        Family::PackedGrid => grid(&mut builder, request)?,
        Family::FixedVec => fixed_vec(&mut builder, request)?,
    };
    builder.build().value("value", root, OBJECT_ADDRESS)
}

fn value_count(request: &FixtureRequest) -> GridscopeResult<u64>
{
    u64::try_from(request.values.len()).map_err(|_| GridscopeError::InvalidArgument("too many values".to_string()))
}

/// Rows and columns: fixed axes from the type, dynamic ones from the request or the value count
fn dimensions(descriptor: &TypeDescriptor, request: &FixtureRequest) -> GridscopeResult<(u64, u64)>
{
    let len = value_count(request)?;
    let rows = descriptor.rows().fixed().or(request.rows);
    let cols = descriptor.cols().fixed().or(request.cols);
    let (rows, cols) = match (rows, cols) {
        (Some(r), Some(c)) => (r, c),
        (Some(r), None) => (r, len.checked_div(r).unwrap_or(0)),
        (None, Some(c)) => (len.checked_div(c).unwrap_or(0), c),
        (None, None) => (len, 1),
    };
    if rows.saturating_mul(cols) != len {
        return Err(GridscopeError::InvalidArgument(format!(
            "{len} values do not fill a {rows} x {cols} container"
        )));
    }
    Ok((rows, cols))
}

fn element(builder: &SnapshotBuilder, name: &str) -> GridscopeResult<(TypeId, ScalarKind)>
{
    let id = builder.type_id(name)?;
    Ok((id, builder.scalar_kind(id)?))
}

fn encode(kind: ScalarKind, values: &[f64]) -> Vec<u8>
{
    values.iter().flat_map(|v| kind.encode(*v)).collect()
}

fn map_if_any(builder: &mut SnapshotBuilder, address: u64, bytes: Vec<u8>) -> GridscopeResult<()>
{
    if bytes.is_empty() {
        return Ok(());
    }
    builder.map(address, bytes)
}

/// `plain_array { array: T[n] }`
fn plain_array(builder: &mut SnapshotBuilder, element_name: &str, element_ty: TypeId, len: u64) -> GridscopeResult<TypeId>
{
    let array = builder.array(element_ty, len)?;
    builder.structure(&format!("Eigen::internal::plain_array<{element_name}, {len}, 0, 16>"), &[("array", array)])
}

fn dense(builder: &mut SnapshotBuilder, request: &FixtureRequest, wrapped_dims: bool) -> GridscopeResult<TypeId>
{
    let descriptor = TypeDescriptor::parse(&request.type_name);
    let (rows, cols) = dimensions(&descriptor, request)?;
    let element_name = descriptor.element_type_name().to_string();
    let (element_ty, kind) = element(builder, &element_name)?;
    let data = encode(kind, &request.values);
    let len = rows * cols;

    match request.layout {
        FixtureLayout::PlainArray => {
            let plain = plain_array(builder, &element_name, element_ty, len)?;
            let storage = builder.structure(
                &format!("Eigen::DenseStorage<{element_name}, {len}, {rows}, {cols}, 0>"),
                &[("m_data", plain)],
            )?;
            let root = builder.structure(&request.type_name, &[("m_storage", storage)])?;
            map_if_any(builder, OBJECT_ADDRESS, data)?;
            Ok(root)
        }
        FixtureLayout::Inline => {
            let size = len * kind.size();
            let root = builder.structure_with_offsets(&request.type_name, size, &[])?;
            map_if_any(builder, OBJECT_ADDRESS, data)?;
            Ok(root)
        }
        FixtureLayout::Heap | FixtureLayout::Null => {
            let pointer = builder.pointer(element_ty)?;
            let long = builder.type_id("long")?;
            let dim_ty = if wrapped_dims {
                builder.structure("Eigen::internal::variable_if_dynamic<long, -1>", &[("m_value", long)])?
            } else {
                long
            };

            let mut fields = vec![("m_data", pointer)];
            let mut words = vec![if request.layout == FixtureLayout::Heap { HEAP_ADDRESS } else { 0 }];
            if descriptor.rows().is_dynamic() {
                fields.push(("m_rows", dim_ty));
                words.push(rows);
            }
            if descriptor.cols().is_dynamic() {
                fields.push(("m_cols", dim_ty));
                words.push(cols);
            }
            let storage = builder.structure(&format!("Eigen::DenseStorage<{element_name}, -1, -1, -1, 0>"), &fields)?;
            let root = builder.structure(&request.type_name, &[("m_storage", storage)])?;
            builder.map(OBJECT_ADDRESS, u64_bytes(&words))?;
            if request.layout == FixtureLayout::Heap {
                map_if_any(builder, HEAP_ADDRESS, data)?;
            }
            Ok(root)
        }
    }
}

fn matx(builder: &mut SnapshotBuilder, request: &FixtureRequest) -> GridscopeResult<TypeId>
{
    let descriptor = TypeDescriptor::parse(&request.type_name);
    let (rows, cols) = dimensions(&descriptor, request)?;
    let (element_ty, kind) = element(builder, descriptor.element_type_name())?;
    let array = builder.array(element_ty, rows * cols)?;
    let root = builder.structure(&request.type_name, &[("val", array)])?;
    map_if_any(builder, OBJECT_ADDRESS, encode(kind, &request.values))?;
    Ok(root)
}

/// `{ val: T[n] }`, with `n` from the type when it names one
fn fixed_vec(builder: &mut SnapshotBuilder, request: &FixtureRequest) -> GridscopeResult<TypeId>
{
    let args = generic_args(&request.type_name)
        .ok_or_else(|| GridscopeError::InvalidArgument(format!("no scalar type in {}", request.type_name)))?;
    let len = value_count(request)?;
    if let Some(declared) = args.get(1).and_then(|arg| arg.parse::<u64>().ok()) {
        if declared != len {
            return Err(GridscopeError::InvalidArgument(format!("{len} values do not fill a {declared}-vector")));
        }
    }
    let (element_ty, kind) = element(builder, args[0])?;
    let array = builder.array(element_ty, len)?;
    let root = builder.structure(&request.type_name, &[("val", array)])?;
    map_if_any(builder, OBJECT_ADDRESS, encode(kind, &request.values))?;
    Ok(root)
}

fn quaternion(builder: &mut SnapshotBuilder, request: &FixtureRequest) -> GridscopeResult<TypeId>
{
    if request.values.len() != 4 {
        return Err(GridscopeError::InvalidArgument("a quaternion takes x,y,z,w".to_string()));
    }
    let element_name = generic_args(&request.type_name)
        .and_then(|args| args.first().map(ToString::to_string))
        .ok_or_else(|| GridscopeError::InvalidArgument(format!("no scalar type in {}", request.type_name)))?;
    let (element_ty, kind) = element(builder, &element_name)?;

    let plain = plain_array(builder, &element_name, element_ty, 4)?;
    let storage = builder.structure(&format!("Eigen::DenseStorage<{element_name}, 4, 4, 1, 0>"), &[("m_data", plain)])?;
    let coeffs = builder.structure(
        &format!("Eigen::Matrix<{element_name}, 4, 1, 0, 4, 1>"),
        &[("m_storage", storage)],
    )?;
    let root = builder.structure(&request.type_name, &[("m_coeffs", coeffs)])?;
    builder.map(OBJECT_ADDRESS, encode(kind, &request.values))?;
    Ok(root)
}

fn sparse(builder: &mut SnapshotBuilder, request: &FixtureRequest) -> GridscopeResult<TypeId>
{
    let long = builder.type_id("long")?;
    let root = builder.structure(&request.type_name, &[("m_rows", long), ("m_cols", long)])?;
    let rows = request.rows.unwrap_or(0);
    let cols = request.cols.unwrap_or(0);
    builder.map(OBJECT_ADDRESS, u64_bytes(&[rows, cols]))?;
    Ok(root)
}

/// A `double` grid; channels are whatever is left after rows and columns
fn grid(builder: &mut SnapshotBuilder, request: &FixtureRequest) -> GridscopeResult<TypeId>
{
    let len = value_count(request)?;
    let rows = request.rows.unwrap_or(len);
    let cols = request.cols.unwrap_or(1);
    let cells = rows.saturating_mul(cols);
    let channels = len.checked_div(cells).unwrap_or(0);
    if channels == 0 || cells.saturating_mul(channels) != len || channels > 512 {
        return Err(GridscopeError::InvalidArgument(format!(
            "{len} values do not fill a {rows} x {cols} grid"
        )));
    }
    let to_int = |n: u64| i32::try_from(n).map_err(|_| GridscopeError::InvalidArgument(format!("{n} is too large")));
    let channel_bits = to_int(channels - 1)? << 3;
    let flags = GRID_SIGNATURE | channel_bits | 6;

    let int = builder.type_id("int")?;
    let uchar = builder.type_id("unsigned char")?;
    let data = builder.pointer(uchar)?;
    let root = builder.structure(
        &request.type_name,
        &[("flags", int), ("dims", int), ("rows", int), ("cols", int), ("data", data)],
    )?;

    let pointer = if request.layout == FixtureLayout::Null { 0 } else { HEAP_ADDRESS };
    let mut header = i32_bytes(&[flags, 2, to_int(rows)?, to_int(cols)?]);
    header.extend(u64_bytes(&[pointer]));
    builder.map(OBJECT_ADDRESS, header)?;
    if pointer != 0 {
        map_if_any(builder, HEAP_ADDRESS, encode(ScalarKind::F64, &request.values))?;
    }
    Ok(root)
}

#[cfg(test)]
mod tests
{
    use gridscope_core::prelude::*;

    use super::*;

    fn request(type_name: &str, layout: FixtureLayout, values: &[f64]) -> FixtureRequest
    {
        FixtureRequest {
            type_name: type_name.to_string(),
            layout,
            values: values.to_vec(),
            rows: None,
            cols: None,
        }
    }

    #[test]
    fn test_every_dense_layout_decodes()
    {
        let formatters = Formatters::default();
        for layout in [FixtureLayout::PlainArray, FixtureLayout::Inline, FixtureLayout::Heap] {
            let value = build_value(&request("Eigen::Matrix<double, 2, 2, 0, 2, 2>", layout, &[1.0, 2.0, 3.0, 4.0]))
                .unwrap();
            assert_eq!(formatters.summary(&value).as_deref(), Some("Matrix [2 x 2] ColMajor"), "{layout:?}");
            let children = formatters.synthetic_children(&value).unwrap();
            assert_eq!(children.num_children(), 4, "{layout:?}");
        }
    }

    #[test]
    fn test_null_layout_has_no_children()
    {
        let value = build_value(&request("Eigen::Matrix<float, -1, 1, 0, -1, 1>", FixtureLayout::Null, &[1.0, 2.0]))
            .unwrap();
        let children = Formatters::default().synthetic_children(&value).unwrap();
        assert_eq!(children.num_children(), 0);
    }

    #[test]
    fn test_shape_mismatch_is_rejected()
    {
        let err = build_value(&request("Eigen::Matrix<double, 3, 1>", FixtureLayout::Inline, &[1.0])).unwrap_err();
        assert!(matches!(err, GridscopeError::InvalidArgument(_)));
        assert!(build_value(&request("std::vector<double>", FixtureLayout::Inline, &[1.0])).is_err());
    }

    #[test]
    fn test_grid_fixture()
    {
        let mut req = request("cv::Mat", FixtureLayout::Heap, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        req.rows = Some(1);
        req.cols = Some(2);
        let value = build_value(&req).unwrap();
        assert_eq!(Formatters::default().summary(&value).as_deref(), Some("{FLOAT64, 3 x 2 x 1}"));
    }

    #[test]
    fn test_vec_fixture()
    {
        let value = build_value(&request("cv::Vec<float, 3>", FixtureLayout::Inline, &[0.5, 1.5, 2.5])).unwrap();
        let formatters = Formatters::default();
        assert_eq!(formatters.summary(&value), None);
        let children = formatters.synthetic_children(&value).unwrap();
        assert_eq!(children.num_children(), 3);
        assert_eq!(children.child_at_index(2).and_then(|c| c.read_f64()), Some(2.5));

        assert!(build_value(&request("cv::Vec<float, 3>", FixtureLayout::Inline, &[1.0])).is_err());
    }
}
