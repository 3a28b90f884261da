//! # Type-Descriptor Parser
//!
//! Recovers the element type, compile-time dimensions and options flag from a
//! canonical generic type name such as `Eigen::Matrix<double, 3, 1, 0, 3, 1>`.
//!
//! The parameter list is split on top-level commas only, so nested generics in
//! the element type (`std::complex<double>`) or in trailing parameters
//! (`Eigen::Stride<0, 0>`) stay intact. The first parameter after the element
//! type that is an integer or a `Dynamic` sentinel starts the shape: rows, then
//! columns, then an optional options flag.
//!
//! Views and aliases wrap another container as their first parameter
//! (`Eigen::Map<Eigen::Matrix<float, -1, 1>, 0, Eigen::Stride<0, 0>>`). When
//! the outer list has no row and column pair of its own and that first
//! parameter parses as a container, the wrapped container's element type and
//! shape are used.
//!
//! Parsing never fails from the caller's point of view: [`TypeDescriptor::parse`]
//! falls back to an empty `0 × 0` column-major descriptor.

use smallvec::SmallVec;
use tracing::debug;

use crate::error::DecodeError;
use crate::types::{Extent, StorageOrder};

/// Token that marks a runtime-sized axis
pub const DYNAMIC_TOKEN: &str = "Dynamic";

/// Parsed form of a container's canonical type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor
{
    raw: String,
    element_type: String,
    rows: Extent,
    cols: Extent,
    storage_flag: i64,
}

impl TypeDescriptor
{
    /// Parse a type name, falling back to an empty descriptor on any error
    pub fn parse(raw: &str) -> Self
    {
        match Self::try_parse(raw) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                debug!(type_name = raw, error = %err, "falling back to empty shape");
                Self::empty(raw)
            }
        }
    }

    /// Parse a type name, reporting why it could not be understood
    ///
    /// ## Errors
    ///
    /// `DecodeError::MalformedDescriptor` when the name has no generic parameter
    /// list, or when neither it nor its first parameter carries row and column
    /// parameters.
    pub fn try_parse(raw: &str) -> Result<Self, DecodeError>
    {
        let args = generic_args(raw).ok_or_else(|| DecodeError::MalformedDescriptor(raw.to_string()))?;
        let start = args.iter().skip(1).position(|arg| is_shape_token(arg)).map(|i| i + 1);

        // Views carry the shape on the wrapped container. A list with its own
        // rows and columns keeps them, even when its element is a container.
        let own_shape = start.is_some_and(|i| args.get(i + 1).is_some_and(|token| is_shape_token(token)));
        if !own_shape {
            if let Ok(mut nested) = Self::try_parse(args[0]) {
                nested.raw = raw.to_string();
                return Ok(nested);
            }
        }

        let start = start.ok_or_else(|| DecodeError::MalformedDescriptor(raw.to_string()))?;
        let cols_token = args
            .get(start + 1)
            .ok_or_else(|| DecodeError::MalformedDescriptor(raw.to_string()))?;

        let storage_flag = args
            .get(start + 2)
            .and_then(|token| token.parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Self {
            raw: raw.to_string(),
            element_type: args[0].to_string(),
            rows: parse_extent(args[start]),
            cols: parse_extent(cols_token),
            storage_flag,
        })
    }

    /// Descriptor used when parsing fails: `0 × 0`, column-major
    pub fn empty(raw: &str) -> Self
    {
        Self {
            raw: raw.to_string(),
            element_type: String::new(),
            rows: Extent::Fixed(0),
            cols: Extent::Fixed(0),
            storage_flag: 0,
        }
    }

    /// The type name this descriptor was parsed from
    pub fn raw(&self) -> &str
    {
        &self.raw
    }

    /// Name of the first generic parameter, e.g. `double`
    pub fn element_type_name(&self) -> &str
    {
        &self.element_type
    }

    pub fn rows(&self) -> Extent
    {
        self.rows
    }

    pub fn cols(&self) -> Extent
    {
        self.cols
    }

    /// Raw options parameter (0 when absent)
    pub fn storage_flag(&self) -> i64
    {
        self.storage_flag
    }

    /// Storage order encoded in the options parameter
    pub fn order(&self) -> StorageOrder
    {
        StorageOrder::from_flag(self.storage_flag)
    }

    /// Both axes known at compile time
    pub fn is_fixed_size(&self) -> bool
    {
        !self.rows.is_dynamic() && !self.cols.is_dynamic()
    }
}

/// Top-level generic parameters of `raw`, trimmed
///
/// `None` if `raw` is not of the form `Name<...>` or the brackets do not balance.
pub fn generic_args(raw: &str) -> Option<SmallVec<[&str; 8]>>
{
    let raw = raw.trim();
    let open = raw.find('<')?;
    if !raw.ends_with('>') || open == 0 {
        return None;
    }
    let inner = &raw[open + 1..raw.len() - 1];

    let mut args = SmallVec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }
    if args.is_empty() {
        return None;
    }
    Some(args)
}

fn is_shape_token(token: &str) -> bool
{
    token.contains(DYNAMIC_TOKEN) || token.parse::<i64>().is_ok()
}

fn parse_extent(token: &str) -> Extent
{
    if token.contains(DYNAMIC_TOKEN) {
        return Extent::Dynamic;
    }
    match token.parse::<i64>() {
        Ok(n) => u64::try_from(n).map_or(Extent::Dynamic, Extent::Fixed),
        Err(_) => Extent::Dynamic,
    }
}
