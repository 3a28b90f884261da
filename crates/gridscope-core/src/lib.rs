//! # gridscope-core
//!
//! Layout recovery for numeric container objects in a stopped process.
//!
//! Given only a value's canonical type name and read access to its memory,
//! this crate works out a container's shape, element type, storage order and
//! where its elements live, then exposes the elements as navigable children
//! and renders a one-line summary. It provides:
//! - Type-name parsing of compile-time dimensions and options flags
//! - A fallback chain for locating inline or heap storage
//! - Name/index mapping for `[i]` and `[r, c]` children
//! - Synthetic-children providers and summaries per container family
//! - An in-memory host for replaying captured layouts
//!
//! ## Host integration
//!
//! The decoder talks to the debugger only through the
//! [`ValueHandle`](host::ValueHandle) and [`TypeHandle`](host::TypeHandle)
//! traits. A debugger plugin implements those for its own value objects and
//! routes every displayed value through [`Formatters`](registry::Formatters).
//!
//! ## Failure model
//!
//! Decoding is best effort and never fails outward. Anything that cannot be
//! recovered degrades to an empty shape or to zero children, and the reason is
//! logged through `tracing` at debug level.

pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod fields;
pub mod host;
pub mod index;
pub mod packed;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod shape;
pub mod snapshot;
pub mod storage;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use config::DecodeOptions;
pub use decoder::{decode, ContainerLayout, DecodedContainer};
pub use descriptor::TypeDescriptor;
pub use error::{DecodeError, GridscopeError, GridscopeResult};
pub use host::{TypeHandle, ValueHandle};
pub use provider::{Provider, SyntheticChildren};
pub use registry::{Family, Formatters};
pub use types::{Address, Extent, ResolvedShape, StorageOrder};
