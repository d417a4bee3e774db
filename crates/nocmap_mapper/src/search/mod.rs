//! Placement search engines.
//!
//! Both engines score placements with the same [`Problem`] cost model and
//! report a [`SearchOutcome`]. [`search`] runs the selected engine and, when
//! adaptive routing was requested, programs the routing tables for the final
//! placement.

mod anneal;
mod exhaustive;
mod permutations;

pub use anneal::{accept_move, Acceptance, AnnealParams, AnnealState, Annealer};
pub use exhaustive::exhaustive_search;
pub use permutations::{permutation_count, KPermutations};

use crate::assignment::Assignment;
use crate::error::MapError;
use crate::problem::Problem;
use crate::rng::Lcg;
use nocmap_common::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation flag.
///
/// Engines poll it between annealing rounds and between permutations, never
/// inside a cost evaluation. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Creates a flag that is not yet raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the running search stop at its next check.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The placement search to run.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAlgorithm {
    /// Simulated annealing with the given schedule.
    Anneal(AnnealParams),
    /// Exhaustive enumeration of every placement.
    Exhaustive,
}

impl Default for SearchAlgorithm {
    fn default() -> Self {
        SearchAlgorithm::Anneal(AnnealParams::default())
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Termination {
    /// The annealing schedule reached its frozen state.
    Frozen,
    /// Every placement was enumerated.
    Exhausted,
    /// Cancellation was requested; the best placement so far is returned.
    Cancelled,
    /// Annealing hit its round limit before freezing.
    RoundLimit,
}

/// One annealing swap attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    /// First swapped node slot.
    pub a: NodeId,
    /// Second swapped node slot.
    pub b: NodeId,
    /// Whether the swap was kept.
    pub accepted: bool,
}

/// Summary of one annealing round.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct RoundStats {
    /// Round number, starting at 1.
    pub round: u32,
    /// Temperature the round ran at.
    pub temperature: f64,
    /// Cost at the end of the round.
    pub cost: f64,
    /// Accepted moves divided by attempts.
    pub accept_ratio: f64,
    /// Accepted moves.
    pub accepted: u64,
    /// Accepted moves that left the cost unchanged.
    pub zero_cost_accepted: u64,
}

/// The result of a placement search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The chosen placement.
    pub assignment: Assignment,
    /// Its total cost, or `None` when no placement was scored.
    pub cost: Option<f64>,
    /// Why the search stopped.
    pub termination: Termination,
    /// Per-round history (annealing only).
    pub rounds: Vec<RoundStats>,
    /// Every swap attempt, when move recording was enabled.
    pub moves: Vec<MoveRecord>,
    /// Number of cost evaluations performed.
    pub evaluations: u64,
}

/// Runs `algorithm` on `problem` and programs adaptive routing for the result.
///
/// `seed` drives every random decision, so equal inputs give equal outcomes.
/// Routing tables are only programmed for a complete placement; a search
/// cancelled before scoring one leaves them unprogrammed.
pub fn search(
    problem: &mut Problem,
    algorithm: &SearchAlgorithm,
    seed: u64,
    cancel: &Cancellation,
) -> Result<SearchOutcome, MapError> {
    let outcome = match algorithm {
        SearchAlgorithm::Anneal(params) => {
            log::info!("annealing with seed {seed}");
            Annealer::new(problem, params.clone(), Lcg::new(seed)).run(cancel)?
        }
        SearchAlgorithm::Exhaustive => exhaustive_search(problem, cancel)?,
    };
    log::info!(
        "search finished ({:?}) after {} evaluations, cost {:?}",
        outcome.termination,
        outcome.evaluations,
        outcome.cost
    );
    if problem.routing().builds_routing_table() && outcome.assignment.is_complete() {
        problem.program_routes(&outcome.assignment)?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::EnergyModel;
    use crate::routing::TurnModel;
    use crate::task::{TaskGraph, Traffic};
    use crate::topology::{Mesh, MeshSpec};
    use nocmap_common::CoreId;

    #[test]
    fn cancellation_shared_between_clones() {
        let flag = Cancellation::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn cancelled_before_first_placement_skips_adaptive_programming() {
        let mesh = Mesh::build(&MeshSpec::square(2, 100.0, 1.0, 1.0)).unwrap();
        let mut tasks = TaskGraph::new();
        tasks.add_core("app");
        tasks.add_core("app");
        tasks
            .add_traffic(CoreId::from_raw(0), CoreId::from_raw(1), Traffic::new(10.0, 5.0))
            .unwrap();
        let mut problem =
            Problem::new(mesh, tasks, Some(TurnModel::WestFirst), EnergyModel::default()).unwrap();
        let cancel = Cancellation::new();
        cancel.cancel();

        let outcome = search(&mut problem, &SearchAlgorithm::Exhaustive, 1, &cancel).unwrap();
        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.cost, None);
        assert!(!outcome.assignment.is_complete());
        assert!(!problem.mesh().nodes().iter().any(|n| n.is_programmed()));
    }

    #[test]
    fn default_algorithm_is_annealing() {
        assert!(matches!(
            SearchAlgorithm::default(),
            SearchAlgorithm::Anneal(_)
        ));
    }
}
