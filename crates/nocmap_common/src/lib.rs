//! Shared foundational types used across the nocmap workspace.
//!
//! This crate provides the opaque node, link and core identifiers, the
//! epsilon-tolerant floating point comparisons used by every cost decision,
//! and the internal error type that signals a bug rather than bad input.

#![warn(missing_docs)]

pub mod float;
pub mod ids;
pub mod result;

pub use float::{approximately_equal, definitely_greater, definitely_less};
pub use ids::{CoreId, LinkId, NodeId};
pub use result::{InternalError, MapResult};
