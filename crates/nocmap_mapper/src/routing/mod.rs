//! Routing strategies for the mesh.
//!
//! A mapping run uses exactly one [`RoutingStrategy`]:
//!
//! - **Static** dimension-order XY routing. Paths depend only on the
//!   topology, so they are computed once ([`XyRoutes`]) and every cost
//!   evaluation projects traffic onto the same link usage lists.
//! - **Adaptive** turn-model routing ([`TurnModel::WestFirst`] or
//!   [`TurnModel::OddEven`]). Paths are chosen hop by hop during each cost
//!   evaluation, steering away from links that already carry more bandwidth.
//!   The decisions for the final placement are recorded in an
//!   [`AdaptiveTable`] and programmed into the nodes' routing tables.

mod adaptive;
mod turn_model;
mod xy;

pub use adaptive::{route_adaptive, AdaptiveTable};
pub use turn_model::{choose_direction, legal_directions, Candidates};
pub use xy::{xy_direction, XyRoutes};

use serde::{Deserialize, Serialize};

/// A deadlock-free turn restriction policy for adaptive routing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TurnModel {
    /// All westward hops first, then adaptive among east and north/south.
    WestFirst,
    /// Chiu's odd-even model: turn restrictions depend on column parity.
    OddEven,
}

impl std::fmt::Display for TurnModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnModel::WestFirst => write!(f, "west-first"),
            TurnModel::OddEven => write!(f, "odd-even"),
        }
    }
}

/// How traffic is routed during one mapping run.
#[derive(Debug, Clone)]
pub enum RoutingStrategy {
    /// Precomputed XY paths, shared by every placement.
    Static(XyRoutes),
    /// Per-placement turn-model paths.
    Adaptive(TurnModel),
}

impl RoutingStrategy {
    /// Returns the turn model when routing adaptively.
    pub fn turn_model(&self) -> Option<TurnModel> {
        match self {
            RoutingStrategy::Static(_) => None,
            RoutingStrategy::Adaptive(model) => Some(*model),
        }
    }

    /// Returns `true` when a routing table must be programmed after the search.
    pub fn builds_routing_table(&self) -> bool {
        matches!(self, RoutingStrategy::Adaptive(_))
    }
}
