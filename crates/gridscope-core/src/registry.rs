//! # Family Registry
//!
//! Maps type names to container families and families to the two surfaces a
//! debugger registers: a one-line summary and a synthetic-children provider.
//!
//! Patterns are anchored regular expressions over the canonical type name,
//! checked in table order. The first match wins.
//!
//! | family          | pattern                     | summary | children |
//! |-----------------|-----------------------------|---------|----------|
//! | `DenseMatrix`   | `^Eigen::Matrix<.+>$`       | yes     | yes      |
//! | `DenseArray`    | `^Eigen::Array<.+>$`        | yes     | yes      |
//! | `MapView`       | `^Eigen::Map<.+>$`          | yes     | yes      |
//! | `Quaternion`    | `^Eigen::Quaternion<.+>$`   | yes     | yes      |
//! | `SparseMatrix`  | `^Eigen::SparseMatrix<.+>$` | yes     | no       |
//! | `FixedMatx`     | `^cv::Matx<.+>$`            | yes     | yes      |
//! | `FixedMatx`     | `^.*TMatrix<.+>$`           | yes     | yes      |
//! | `PackedGrid`    | `^cv::Mat$`                 | yes     | yes      |
//! | `FixedVec`      | `^cv::Vec<.+>$`             | no      | yes      |
//! | `FixedVec`      | `^cv::Scalar_<.+>$`         | no      | yes      |

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::config::DecodeOptions;
use crate::decoder::{decode, ContainerLayout, DENSE_COLS_PATHS, DENSE_ROWS_PATHS};
use crate::fields::resolve_unsigned;
use crate::host::{TypeHandle, ValueHandle};
use crate::packed::decode_grid;
use crate::provider::{
    decode_quaternion, ContainerProvider, PackedGridProvider, Provider, QuaternionProvider, SyntheticChildren,
};
use crate::summary::{render_quaternion_summary, render_sparse_summary, ContainerKind};

/// A group of types decoded the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family
{
    DenseMatrix,
    DenseArray,
    MapView,
    Quaternion,
    SparseMatrix,
    FixedMatx,
    PackedGrid,
    FixedVec,
}

/// Source patterns in match order
pub const FAMILY_PATTERNS: &[(Family, &str)] = &[
    (Family::DenseMatrix, r"^Eigen::Matrix<.+>$"),
    (Family::DenseArray, r"^Eigen::Array<.+>$"),
    (Family::MapView, r"^Eigen::Map<.+>$"),
    (Family::Quaternion, r"^Eigen::Quaternion<.+>$"),
    (Family::SparseMatrix, r"^Eigen::SparseMatrix<.+>$"),
    (Family::FixedMatx, r"^cv::Matx<.+>$"),
    (Family::FixedMatx, r"^.*TMatrix<.+>$"),
    (Family::PackedGrid, r"^cv::Mat$"),
    (Family::FixedVec, r"^cv::Vec<.+>$"),
    (Family::FixedVec, r"^cv::Scalar_<.+>$"),
];

static COMPILED_PATTERNS: Lazy<Vec<(Family, Regex)>> = Lazy::new(|| {
    FAMILY_PATTERNS
        .iter()
        .map(|(family, pattern)| (*family, Regex::new(pattern).expect("family pattern")))
        .collect()
});

impl Family
{
    /// Family of a type name, `None` for types no family handles
    pub fn match_type_name(type_name: &str) -> Option<Self>
    {
        let type_name = type_name.trim();
        COMPILED_PATTERNS
            .iter()
            .find(|(_, regex)| regex.is_match(type_name))
            .map(|(family, _)| *family)
    }

    /// Family of a value, trying its canonical type name before its display name
    pub fn of_value<V: ValueHandle>(value: &V) -> Option<Self>
    {
        Self::match_type_name(&value.canonical_type_name()).or_else(|| Self::match_type_name(&value.value_type().name()))
    }

    pub const fn name(self) -> &'static str
    {
        match self {
            Family::DenseMatrix => "DenseMatrix",
            Family::DenseArray => "DenseArray",
            Family::MapView => "MapView",
            Family::Quaternion => "Quaternion",
            Family::SparseMatrix => "SparseMatrix",
            Family::FixedMatx => "FixedMatx",
            Family::PackedGrid => "PackedGrid",
            Family::FixedVec => "FixedVec",
        }
    }

    pub const fn has_summary(self) -> bool
    {
        !matches!(self, Family::FixedVec)
    }

    pub const fn has_synthetic_children(self) -> bool
    {
        !matches!(self, Family::SparseMatrix)
    }

    /// Engine layout for families decoded by the dense container engine
    pub const fn layout(self) -> Option<ContainerLayout>
    {
        match self {
            Family::DenseMatrix => Some(ContainerLayout::dense(ContainerKind::Matrix)),
            Family::DenseArray => Some(ContainerLayout::dense(ContainerKind::Array)),
            Family::MapView => Some(ContainerLayout::dense(ContainerKind::Map)),
            Family::FixedMatx => Some(ContainerLayout::matx()),
            Family::FixedVec => Some(ContainerLayout::fixed_vec()),
            Family::Quaternion | Family::SparseMatrix | Family::PackedGrid => None,
        }
    }
}

/// Entry point a debugger integration calls for every value it displays
#[derive(Debug, Clone, Default)]
pub struct Formatters
{
    options: DecodeOptions,
}

impl Formatters
{
    pub fn new(options: DecodeOptions) -> Self
    {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions
    {
        &self.options
    }

    /// Summary string, `None` when no family handles the value's type or the family has none
    pub fn summary<V: ValueHandle>(&self, value: &V) -> Option<String>
    {
        let family = Family::of_value(value)?;
        trace!(family = family.name(), "rendering summary");
        let summary = match family {
            Family::FixedVec => return None,
            Family::Quaternion => self.quaternion_summary(value),
            Family::SparseMatrix => self.sparse_summary(value),
            Family::PackedGrid => decode_grid(value, &self.options).summary(),
            Family::DenseMatrix | Family::DenseArray | Family::MapView | Family::FixedMatx => {
                let layout = family.layout()?;
                decode(value, &layout, &self.options).summary()
            }
        };
        Some(summary)
    }

    /// A fresh provider already updated with `value`
    pub fn synthetic_children<V: ValueHandle>(&self, value: &V) -> Option<Provider<V>>
    {
        let family = Family::of_value(value)?;
        let mut provider = match family {
            Family::SparseMatrix => return None,
            Family::Quaternion => Provider::Quaternion(QuaternionProvider::new(self.options.clone())),
            Family::PackedGrid => Provider::PackedGrid(PackedGridProvider::new(self.options.clone())),
            Family::DenseMatrix | Family::DenseArray | Family::MapView | Family::FixedMatx | Family::FixedVec => {
                Provider::Container(ContainerProvider::new(family.layout()?, self.options.clone()))
            }
        };
        provider.update(value);
        Some(provider)
    }

    fn quaternion_summary<V: ValueHandle>(&self, value: &V) -> String
    {
        let coeffs = decode_quaternion(value, &self.options).and_then(|decoded| {
            let mut strings: [String; 4] = Default::default();
            for (index, slot) in (0u64..).zip(strings.iter_mut()) {
                *slot = decoded.child_at_index(index)?.value_string()?;
            }
            Some(strings)
        });
        render_quaternion_summary(coeffs.as_ref())
    }

    fn sparse_summary<V: ValueHandle>(&self, value: &V) -> String
    {
        let wrapper = &self.options.wrapper_member;
        let rows = resolve_unsigned(value, DENSE_ROWS_PATHS, wrapper).ok();
        let cols = resolve_unsigned(value, DENSE_COLS_PATHS, wrapper).ok();
        render_sparse_summary(rows.zip(cols))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_match_type_name()
    {
        let cases = [
            ("Eigen::Matrix<double, 3, 1, 0, 3, 1>", Some(Family::DenseMatrix)),
            ("Eigen::Array<float, -1, -1, 0, -1, -1>", Some(Family::DenseArray)),
            ("Eigen::Map<Eigen::Matrix<float, -1, 1, 0, -1, 1>, 0, Eigen::Stride<0, 0> >", Some(Family::MapView)),
            ("Eigen::Quaternion<double, 0>", Some(Family::Quaternion)),
            ("Eigen::SparseMatrix<double, 0, int>", Some(Family::SparseMatrix)),
            ("cv::Matx<float, 3, 3>", Some(Family::FixedMatx)),
            ("my::TMatrix<double, 2, 2>", Some(Family::FixedMatx)),
            ("cv::Mat", Some(Family::PackedGrid)),
            ("cv::Vec<double, 3>", Some(Family::FixedVec)),
            ("cv::Scalar_<double>", Some(Family::FixedVec)),
            ("cv::Mat_<float>", None),
            ("Eigen::Matrix", None),
            ("std::vector<double>", None),
            ("Eigen::MatrixXd", None),
        ];
        for (name, expected) in cases {
            assert_eq!(Family::match_type_name(name), expected, "{name}");
        }
    }

    #[test]
    fn test_surfaces()
    {
        assert!(Family::SparseMatrix.has_summary());
        assert!(!Family::SparseMatrix.has_synthetic_children());
        assert!(Family::PackedGrid.has_synthetic_children());
        assert!(!Family::FixedVec.has_summary());
        assert!(Family::FixedVec.has_synthetic_children());
        assert_eq!(Family::FixedMatx.layout(), Some(ContainerLayout::matx()));
        assert_eq!(Family::Quaternion.layout(), None);
    }
}
