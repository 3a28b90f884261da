//! # Types
//!
//! Host-agnostic types shared by every decoder stage.
//!
//! These types describe what was recovered about a container (where its data
//! lives, how big it is, which order it is stored in) without referring to
//! any particular debugger's value representation.

pub mod address;
pub mod shape;

// Re-export all public types
pub use address::Address;
pub use shape::{Extent, ResolvedShape, StorageOrder};
