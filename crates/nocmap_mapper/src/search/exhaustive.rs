//! Exhaustive placement search over every k-permutation of the node slots.

use super::permutations::{permutation_count, KPermutations};
use super::{Cancellation, SearchOutcome, Termination};
use crate::problem::Problem;
use nocmap_common::{definitely_less, MapResult};

/// Evaluates every placement of the problem's cores and returns the cheapest.
///
/// Placements are visited in lexicographic order of their node slots; only a
/// strictly cheaper placement replaces the best, so ties keep the earliest.
/// Cancellation is checked between permutations and returns the best
/// placement found so far.
pub fn exhaustive_search(problem: &Problem, cancel: &Cancellation) -> MapResult<SearchOutcome> {
    let nodes = problem.mesh().node_count();
    let cores = problem.tasks().core_count();
    let total = permutation_count(nodes, cores);
    match total {
        Some(total) => log::info!("enumerating {total} placements"),
        None => log::warn!("enumerating more than 2^128 placements; this will not finish"),
    }
    let step = total.map(|t| (t / 10).max(1));

    let generator = KPermutations::new(nodes, cores);
    let mut candidate = problem.empty_assignment();
    let mut best = None;
    let mut evaluations: u64 = 0;
    let mut termination = Termination::Exhausted;

    for slots in generator {
        if cancel.is_cancelled() {
            log::info!("exhaustive search cancelled after {evaluations} placements");
            termination = Termination::Cancelled;
            break;
        }
        candidate.apply_permutation(&slots)?;
        let cost = problem.evaluate(&candidate)?;
        evaluations += 1;

        let improved = match &best {
            None => true,
            Some((_, best_cost)) => definitely_less(cost, *best_cost),
        };
        if improved {
            best = Some((candidate.clone(), cost));
        }

        if let (Some(step), Some(total)) = (step, total) {
            let done = u128::from(evaluations);
            if done % step == 0 {
                log::info!("{}% of placements evaluated", done * 100 / total);
            }
        }
    }

    let (assignment, cost) = match best {
        Some((assignment, cost)) => (assignment, Some(cost)),
        None => (problem.empty_assignment(), None),
    };
    Ok(SearchOutcome {
        assignment,
        cost,
        termination,
        rounds: Vec::new(),
        moves: Vec::new(),
        evaluations,
    })
}
