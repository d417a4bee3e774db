//! Opaque ID newtypes for mesh entities.
//!
//! [`NodeId`], [`LinkId`], and [`CoreId`] are thin `u32` wrappers used as
//! dense indices into the topology and the task graph. They are `Copy`,
//! `Hash`, ordered, and `Serialize`/`Deserialize` (as plain integers).

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Creates an ID from a `usize` index.
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize`, for indexing dense vectors.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a mesh node (tile).
    NodeId
);

define_id!(
    /// Opaque, copyable ID for a unidirectional link.
    LinkId
);

define_id!(
    /// Opaque, copyable ID for a core (one task).
    CoreId
);
