//! Simulated annealing placement search.
//!
//! The engine moves through `Init -> Cooling -> Frozen`. Initialization places
//! cores on a seeded random permutation of the node slots. Every cooling round
//! performs `nodes² * attempts_factor` swap attempts between two distinct node
//! slots (either may be empty), accepting with the Metropolis criterion on the
//! percentage cost change, then cools the temperature geometrically.
//!
//! The search freezes once the relative cost change of the last two rounds is
//! below `tolerance`, at least `min_rounds` rounds have run, and either the
//! accept ratio fell under `min_accept` or `max_free_rounds` consecutive
//! rounds accepted nothing but zero-cost moves.

use super::{Cancellation, MoveRecord, RoundStats, SearchOutcome, Termination};
use crate::assignment::Assignment;
use crate::problem::Problem;
use nocmap_common::{approximately_equal, definitely_less, MapResult, NodeId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Annealing schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealParams {
    /// Temperature of the first round.
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every round.
    pub cooling_rate: f64,
    /// Attempts per round, as a multiple of the squared node count.
    pub attempts_factor: u64,
    /// Accept ratio under which the search may freeze.
    pub min_accept: f64,
    /// Relative cost change under which the search may freeze.
    pub tolerance: f64,
    /// Rounds that must run before the search may freeze.
    pub min_rounds: u32,
    /// Consecutive zero-cost-only rounds that trigger the early stop.
    pub max_free_rounds: u32,
    /// Hard cap on the number of rounds.
    pub max_rounds: u32,
    /// Keep a [`MoveRecord`] of every attempt.
    pub record_moves: bool,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.9,
            attempts_factor: 100,
            min_accept: 0.001,
            tolerance: 0.01,
            min_rounds: 5,
            max_free_rounds: 10,
            max_rounds: 1000,
            record_moves: false,
        }
    }
}

/// Lifecycle of an [`Annealer`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnnealState {
    /// No placement yet.
    Init,
    /// Running rounds.
    Cooling,
    /// Terminal.
    Frozen,
}

/// The verdict on one proposed move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Acceptance {
    /// The cost definitely decreased.
    Improved,
    /// The cost did not change.
    Free,
    /// The cost increased but the Metropolis draw accepted it.
    Uphill,
    /// The move is undone.
    Rejected,
}

impl Acceptance {
    /// Returns `true` unless the move was rejected.
    pub fn is_accepted(self) -> bool {
        self != Acceptance::Rejected
    }
}

/// Decides whether to move from a placement costing `current` to one costing
/// `candidate` at `temperature`.
///
/// Improvements and cost-neutral moves are always taken without consuming a
/// random number. Otherwise the move is taken with probability
/// `exp(-Δpct / temperature)`, where `Δpct` is the increase in percent of
/// `current`.
pub fn accept_move<R: Rng + ?Sized>(
    current: f64,
    candidate: f64,
    temperature: f64,
    rng: &mut R,
) -> Acceptance {
    if definitely_less(candidate, current) {
        return Acceptance::Improved;
    }
    if approximately_equal(candidate, current) {
        return Acceptance::Free;
    }
    let delta_pct = 100.0 * (candidate - current) / current;
    let probability = (-delta_pct / temperature).exp();
    if rng.gen::<f64>() < probability {
        Acceptance::Uphill
    } else {
        Acceptance::Rejected
    }
}

fn relative_change(previous: f64, next: f64) -> f64 {
    if approximately_equal(previous, next) {
        0.0
    } else if previous == 0.0 {
        f64::INFINITY
    } else {
        ((next - previous) / previous).abs()
    }
}

/// One simulated annealing run over a [`Problem`].
pub struct Annealer<'p, R> {
    problem: &'p Problem,
    params: AnnealParams,
    rng: R,
    state: AnnealState,
    assignment: Assignment,
    cost: f64,
    temperature: f64,
    round: u32,
    free_rounds: u32,
    early_stop: bool,
    /// Cost after initialization and after every round.
    costs: Vec<f64>,
    rounds: Vec<RoundStats>,
    moves: Vec<MoveRecord>,
    evaluations: u64,
}

impl<'p, R: Rng> Annealer<'p, R> {
    /// Creates an annealer in the `Init` state.
    pub fn new(problem: &'p Problem, params: AnnealParams, rng: R) -> Self {
        let temperature = params.initial_temperature;
        Self {
            problem,
            params,
            rng,
            state: AnnealState::Init,
            assignment: problem.empty_assignment(),
            cost: 0.0,
            temperature,
            round: 0,
            free_rounds: 0,
            early_stop: false,
            costs: Vec::new(),
            rounds: Vec::new(),
            moves: Vec::new(),
            evaluations: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> AnnealState {
        self.state
    }

    /// Returns the current placement.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Returns the cost of the current placement.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the temperature of the next round.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Places every core on a seeded random permutation of the node slots and
    /// enters `Cooling`, or `Frozen` directly when no swap is possible.
    pub fn initialize(&mut self) -> MapResult<()> {
        let nodes = self.problem.mesh().node_count();
        let cores = self.problem.tasks().core_count();
        let mut slots: Vec<usize> = (0..nodes).collect();
        slots.shuffle(&mut self.rng);
        self.assignment.apply_permutation(&slots[..cores])?;
        self.cost = self.problem.evaluate(&self.assignment)?;
        self.evaluations += 1;
        self.costs.push(self.cost);
        self.state = if nodes < 2 {
            AnnealState::Frozen
        } else {
            AnnealState::Cooling
        };
        log::debug!("initial placement cost {}", self.cost);
        Ok(())
    }

    /// Runs one round of swap attempts at the current temperature, then cools.
    pub fn run_round(&mut self) -> MapResult<RoundStats> {
        let nodes = self.problem.mesh().node_count();
        let attempts = if nodes < 2 {
            0
        } else {
            (nodes * nodes) as u64 * self.params.attempts_factor
        };
        let mut accepted = 0u64;
        let mut zero_cost_accepted = 0u64;

        for _ in 0..attempts {
            let a = self.rng.gen_range(0..nodes);
            let mut b = self.rng.gen_range(0..nodes - 1);
            if b >= a {
                b += 1;
            }
            let (a, b) = (NodeId::from_index(a), NodeId::from_index(b));

            self.assignment.swap(a, b);
            let candidate = self.problem.evaluate(&self.assignment)?;
            self.evaluations += 1;

            let verdict = accept_move(self.cost, candidate, self.temperature, &mut self.rng);
            if verdict.is_accepted() {
                self.cost = candidate;
                accepted += 1;
                if verdict == Acceptance::Free {
                    zero_cost_accepted += 1;
                }
            } else {
                self.assignment.swap(a, b);
            }
            if self.params.record_moves {
                self.moves.push(MoveRecord {
                    a,
                    b,
                    accepted: verdict.is_accepted(),
                });
            }
        }

        if zero_cost_accepted == accepted {
            self.free_rounds += 1;
        } else {
            self.free_rounds = 0;
        }
        if self.free_rounds >= self.params.max_free_rounds {
            self.early_stop = true;
        }

        self.round += 1;
        let stats = RoundStats {
            round: self.round,
            temperature: self.temperature,
            cost: self.cost,
            accept_ratio: if attempts == 0 {
                0.0
            } else {
                accepted as f64 / attempts as f64
            },
            accepted,
            zero_cost_accepted,
        };
        self.temperature *= self.params.cooling_rate;
        self.costs.push(self.cost);
        self.rounds.push(stats);
        Ok(stats)
    }

    fn should_freeze(&self, stats: &RoundStats) -> bool {
        let &[.., before, previous, last] = self.costs.as_slice() else {
            return false;
        };
        let settled = relative_change(previous, last) < self.params.tolerance
            && relative_change(before, previous) < self.params.tolerance;
        settled
            && self.round >= self.params.min_rounds
            && (stats.accept_ratio < self.params.min_accept || self.early_stop)
    }

    /// Runs the schedule to completion, checking `cancel` between rounds.
    pub fn run(mut self, cancel: &Cancellation) -> MapResult<SearchOutcome> {
        if self.state == AnnealState::Init {
            self.initialize()?;
        }
        while self.state == AnnealState::Cooling {
            if cancel.is_cancelled() {
                log::info!("annealing cancelled after {} rounds", self.round);
                return Ok(self.finish(Termination::Cancelled));
            }
            if self.round >= self.params.max_rounds {
                log::warn!("annealing stopped at the {} round limit", self.params.max_rounds);
                return Ok(self.finish(Termination::RoundLimit));
            }
            let stats = self.run_round()?;
            log::debug!(
                "round {}: T={:.4} cost={} accept={:.4}",
                stats.round,
                stats.temperature,
                stats.cost,
                stats.accept_ratio
            );
            if self.should_freeze(&stats) {
                self.state = AnnealState::Frozen;
            }
        }
        Ok(self.finish(Termination::Frozen))
    }

    fn finish(self, termination: Termination) -> SearchOutcome {
        SearchOutcome {
            assignment: self.assignment,
            cost: Some(self.cost),
            termination,
            rounds: self.rounds,
            moves: self.moves,
            evaluations: self.evaluations,
        }
    }
}
