//! Common module for library exports

pub use crate::config::DecodeOptions;
pub use crate::decoder::{decode, ContainerLayout, DecodedContainer, OrderPolicy, ShapeSource};
pub use crate::descriptor::TypeDescriptor;
pub use crate::error::{DecodeError, GridscopeError, GridscopeResult};
pub use crate::host::{TypeHandle, ValueHandle};
pub use crate::index::{ChildName, ChildRef};
pub use crate::packed::{Depth, PackedFlags};
pub use crate::provider::{ContainerProvider, PackedGridProvider, Provider, QuaternionProvider, SyntheticChildren};
pub use crate::registry::{Family, Formatters};
pub use crate::snapshot::{Snapshot, SnapshotBuilder, SnapshotType, SnapshotValue};
pub use crate::summary::ContainerKind;
pub use crate::types::{Address, Extent, ResolvedShape, StorageOrder};
