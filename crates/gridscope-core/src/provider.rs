//! # Synthetic Value Tree Provider
//!
//! Adapts decoded containers to the expandable-tree contract a debugger's
//! variables view uses: how many children, which index a name refers to, and
//! the child value at an index.
//!
//! ## Lifecycle
//!
//! 1. Create a provider for a family: `ContainerProvider::new(layout, options)`
//! 2. Call `update(value)` whenever the host reports a new or changed value
//! 3. Answer `num_children()`, `index_of_child(name)`, `child_at_index(i)`
//!
//! `update` replaces the decoded state wholesale; nothing carries over from
//! the previous stop. Before the first `update` every query answers "empty".

use tracing::debug;

use crate::config::DecodeOptions;
use crate::decoder::{decode, ContainerLayout, DecodedContainer};
use crate::fields::resolve_field;
use crate::host::ValueHandle;
use crate::packed::{decode_grid, DecodedGrid};
use crate::summary::ContainerKind;

/// Member holding a quaternion's four coefficients
pub const QUATERNION_COEFFS_MEMBER: &str = "m_coeffs";
/// Child names of a quaternion, in storage order
pub const QUATERNION_NAMES: [&str; 4] = ["x", "y", "z", "w"];

/// Expandable-tree contract implemented by every provider
pub trait SyntheticChildren<V: ValueHandle>
{
    /// Re-decode from `value`, discarding previous state
    fn update(&mut self, value: &V);

    /// Number of children; 0 before the first update
    fn num_children(&self) -> usize;

    /// Index of the child called `name`, `None` for unknown names
    fn index_of_child(&self, name: &str) -> Option<usize>;

    /// Child value at `index`, `None` when out of range or unreadable
    fn child_at_index(&self, index: usize) -> Option<V>;
}

/// Provider state between host notifications
#[derive(Debug, Clone)]
pub enum ProviderState<T>
{
    Uninitialized,
    Updated(T),
}

impl<T> ProviderState<T>
{
    pub fn get(&self) -> Option<&T>
    {
        match self {
            ProviderState::Uninitialized => None,
            ProviderState::Updated(inner) => Some(inner),
        }
    }

    pub const fn is_updated(&self) -> bool
    {
        matches!(self, ProviderState::Updated(_))
    }
}

fn count_to_usize(count: u64) -> usize
{
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// Children of a dense container
#[derive(Debug, Clone)]
pub struct ContainerProvider<V: ValueHandle>
{
    layout: ContainerLayout,
    options: DecodeOptions,
    state: ProviderState<DecodedContainer<V>>,
}

impl<V: ValueHandle> ContainerProvider<V>
{
    pub fn new(layout: ContainerLayout, options: DecodeOptions) -> Self
    {
        Self {
            layout,
            options,
            state: ProviderState::Uninitialized,
        }
    }

    pub fn decoded(&self) -> Option<&DecodedContainer<V>>
    {
        self.state.get()
    }
}

impl<V: ValueHandle> SyntheticChildren<V> for ContainerProvider<V>
{
    fn update(&mut self, value: &V)
    {
        self.state = ProviderState::Updated(decode(value, &self.layout, &self.options));
    }

    fn num_children(&self) -> usize
    {
        self.decoded().map_or(0, |c| count_to_usize(c.num_children()))
    }

    fn index_of_child(&self, name: &str) -> Option<usize>
    {
        let index = self.decoded()?.index_of_child(name)?;
        usize::try_from(index).ok()
    }

    fn child_at_index(&self, index: usize) -> Option<V>
    {
        self.decoded()?.child_at_index(u64::try_from(index).ok()?)
    }
}

/// Decode the coefficient vector of a quaternion value
pub fn decode_quaternion<V: ValueHandle>(value: &V, options: &DecodeOptions) -> Option<DecodedContainer<V>>
{
    match resolve_field(value, &[QUATERNION_COEFFS_MEMBER]) {
        Ok(coeffs) => Some(decode(&coeffs, &ContainerLayout::dense(ContainerKind::Matrix), options)),
        Err(err) => {
            debug!(error = %err, "quaternion without coefficients");
            None
        }
    }
}

/// Children `x`, `y`, `z`, `w` of a quaternion
#[derive(Debug, Clone)]
pub struct QuaternionProvider<V: ValueHandle>
{
    options: DecodeOptions,
    state: ProviderState<Option<DecodedContainer<V>>>,
}

impl<V: ValueHandle> QuaternionProvider<V>
{
    pub fn new(options: DecodeOptions) -> Self
    {
        Self {
            options,
            state: ProviderState::Uninitialized,
        }
    }

    fn coeffs(&self) -> Option<&DecodedContainer<V>>
    {
        self.state.get()?.as_ref()
    }
}

impl<V: ValueHandle> SyntheticChildren<V> for QuaternionProvider<V>
{
    fn update(&mut self, value: &V)
    {
        self.state = ProviderState::Updated(decode_quaternion(value, &self.options));
    }

    fn num_children(&self) -> usize
    {
        self.coeffs()
            .map_or(0, |c| count_to_usize(c.num_children()).min(QUATERNION_NAMES.len()))
    }

    fn index_of_child(&self, name: &str) -> Option<usize>
    {
        QUATERNION_NAMES
            .iter()
            .position(|n| *n == name.trim())
            .filter(|index| *index < self.num_children())
    }

    fn child_at_index(&self, index: usize) -> Option<V>
    {
        let name = QUATERNION_NAMES.get(index)?;
        self.coeffs()?.child_named(u64::try_from(index).ok()?, name)
    }
}

/// Typed data view of a packed grid
#[derive(Debug, Clone)]
pub struct PackedGridProvider<V: ValueHandle>
{
    options: DecodeOptions,
    state: ProviderState<DecodedGrid<V>>,
}

impl<V: ValueHandle> PackedGridProvider<V>
{
    pub fn new(options: DecodeOptions) -> Self
    {
        Self {
            options,
            state: ProviderState::Uninitialized,
        }
    }

    pub fn decoded(&self) -> Option<&DecodedGrid<V>>
    {
        self.state.get()
    }
}

impl<V: ValueHandle> SyntheticChildren<V> for PackedGridProvider<V>
{
    fn update(&mut self, value: &V)
    {
        self.state = ProviderState::Updated(decode_grid(value, &self.options));
    }

    fn num_children(&self) -> usize
    {
        self.decoded().map_or(0, |g| count_to_usize(g.num_children()))
    }

    fn index_of_child(&self, name: &str) -> Option<usize>
    {
        usize::try_from(self.decoded()?.index_of_child(name)?).ok()
    }

    fn child_at_index(&self, index: usize) -> Option<V>
    {
        self.decoded()?.child_at_index(u64::try_from(index).ok()?)
    }
}

/// Any provider the registry can hand out
#[derive(Debug, Clone)]
pub enum Provider<V: ValueHandle>
{
    Container(ContainerProvider<V>),
    Quaternion(QuaternionProvider<V>),
    PackedGrid(PackedGridProvider<V>),
}

impl<V: ValueHandle> SyntheticChildren<V> for Provider<V>
{
    fn update(&mut self, value: &V)
    {
        match self {
            Provider::Container(p) => p.update(value),
            Provider::Quaternion(p) => p.update(value),
            Provider::PackedGrid(p) => p.update(value),
        }
    }

    fn num_children(&self) -> usize
    {
        match self {
            Provider::Container(p) => p.num_children(),
            Provider::Quaternion(p) => p.num_children(),
            Provider::PackedGrid(p) => p.num_children(),
        }
    }

    fn index_of_child(&self, name: &str) -> Option<usize>
    {
        match self {
            Provider::Container(p) => p.index_of_child(name),
            Provider::Quaternion(p) => p.index_of_child(name),
            Provider::PackedGrid(p) => p.index_of_child(name),
        }
    }

    fn child_at_index(&self, index: usize) -> Option<V>
    {
        match self {
            Provider::Container(p) => p.child_at_index(index),
            Provider::Quaternion(p) => p.child_at_index(index),
            Provider::PackedGrid(p) => p.child_at_index(index),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::snapshot::{f64_bytes, SnapshotBuilder, SnapshotValue};

    fn inline_vector(values: &[f64]) -> SnapshotValue
    {
        let mut builder = SnapshotBuilder::new();
        let double = builder.type_id("double").unwrap();
        let len = values.len() as u64;
        let array = builder.array(double, len).unwrap();
        let name = format!("Eigen::Matrix<double, {len}, 1, 0, {len}, 1>");
        let ty = builder.structure(&name, &[("array", array)]).unwrap();
        builder.map(0x1000u64, f64_bytes(values)).unwrap();
        builder.build().value("v", ty, 0x1000u64).unwrap()
    }

    #[test]
    fn test_uninitialized_provider_is_empty()
    {
        let provider: ContainerProvider<SnapshotValue> =
            ContainerProvider::new(ContainerLayout::dense(ContainerKind::Matrix), DecodeOptions::default());
        assert!(!provider.state.is_updated());
        assert_eq!(provider.num_children(), 0);
        assert_eq!(provider.index_of_child("[0]"), None);
        assert!(provider.child_at_index(0).is_none());
    }

    #[test]
    fn test_update_replaces_state()
    {
        let mut provider = ContainerProvider::new(ContainerLayout::dense(ContainerKind::Matrix), DecodeOptions::default());
        provider.update(&inline_vector(&[1.0, 2.0]));
        assert_eq!(provider.num_children(), 2);

        provider.update(&inline_vector(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(provider.num_children(), 4);
        assert_eq!(provider.index_of_child("[3]"), Some(3));
        assert_eq!(provider.child_at_index(3).and_then(|v| v.read_f64()), Some(4.0));
        assert!(provider.child_at_index(4).is_none());
    }

    #[test]
    fn test_provider_enum_delegates()
    {
        let mut provider = Provider::Container(ContainerProvider::new(
            ContainerLayout::dense(ContainerKind::Array),
            DecodeOptions::default(),
        ));
        provider.update(&inline_vector(&[5.0]));
        assert_eq!(provider.num_children(), 1);
        assert_eq!(provider.child_at_index(0).map(|v| v.name()), Some("[0]".to_string()));
    }
}
