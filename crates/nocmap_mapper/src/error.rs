//! Error type for mapping runs.

use crate::thermal::ThermalError;
use nocmap_common::{CoreId, InternalError};
use nocmap_config::ConfigError;

/// Errors that abort a mapping run.
///
/// Input problems (`TooFewNodes`, `MalformedRate`, `EmptyMesh`,
/// `MeshTooLarge`, `Config`) are
/// raised while the problem is built, before any search starts.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The mesh cannot host every core.
    #[error("too few nodes: {nodes} nodes cannot host {cores} cores")]
    TooFewNodes {
        /// Nodes in the mesh.
        nodes: usize,
        /// Cores to place.
        cores: usize,
    },

    /// A communication rate lies outside `[0, 1]`.
    #[error("malformed communication rate {rate} from core {src} to core {dst}: must lie in [0, 1]")]
    MalformedRate {
        /// Sending core.
        src: CoreId,
        /// Receiving core.
        dst: CoreId,
        /// The offending rate.
        rate: f64,
    },

    /// A mesh with zero rows or columns was requested.
    #[error("mesh must have at least one row and one column, got {rows}x{cols}")]
    EmptyMesh {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
    },

    /// The mesh has more nodes than routing tables can be built for.
    #[error("mesh {rows}x{cols} exceeds the {limit} node limit")]
    MeshTooLarge {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
        /// Largest accepted node count.
        limit: u32,
    },

    /// The configuration could not be turned into a mapping problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Topology or routing construction is inconsistent.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// The external thermal simulator failed.
    #[error("thermal simulation failed: {0}")]
    Thermal(#[from] ThermalError),
}
