//! Core-to-node mapping engine for 2D mesh networks-on-chip.
//!
//! This crate places a set of communicating cores onto the nodes of a mesh,
//! minimizing switch, link and buffer energy while penalizing links loaded
//! beyond their bandwidth, and optionally synthesizes deadlock-free adaptive
//! routing tables for the chosen placement.
//!
//! # Pipeline
//!
//! 1. **Convert**: Build the [`Mesh`], [`TaskGraph`] and [`Problem`] from a
//!    [`ProjectConfig`]
//! 2. **Search**: Simulated annealing or exhaustive enumeration of
//!    placements, scored by the shared cost model
//! 3. **Program**: For West-First or Odd-Even routing, resolve the final
//!    placement's routing decisions into per-node routing tables
//! 4. **Extract**: Summarize the result as a [`MappingResult`]
//!
//! # Usage
//!
//! ```ignore
//! use nocmap_mapper::{map_project, Cancellation};
//!
//! let config = nocmap_config::load_config(dir)?;
//! let result = map_project(&config, None, &Cancellation::new())?;
//! print!("{}", result.to_mapping_text());
//! ```

#![warn(missing_docs)]

pub mod assignment;
pub mod convert;
pub mod cost;
pub mod error;
pub mod problem;
pub mod result;
pub mod rng;
pub mod routing;
pub mod search;
pub mod task;
pub mod thermal;
pub mod topology;

pub use assignment::Assignment;
pub use convert::build_problem;
pub use cost::{CostBreakdown, EnergyModel, OVERLOAD_UNIT_COST};
pub use error::MapError;
pub use problem::{Evaluation, Problem};
pub use result::{LinkLoad, MappingResult};
pub use rng::Lcg;
pub use routing::{RoutingStrategy, TurnModel};
pub use search::{
    search, AnnealParams, Cancellation, MoveRecord, RoundStats, SearchAlgorithm, SearchOutcome,
    Termination,
};
pub use task::{Core, TaskGraph, Traffic};
pub use thermal::{PowerTrace, SteadyTemperatures, ThermalError, ThermalSimulator};
pub use topology::{Direction, Link, Mesh, MeshSpec, Node, RouteEntry};

use nocmap_config::{ProjectConfig, ThermalConfig};
use std::path::Path;

/// Runs the complete mapping pipeline for a configuration.
///
/// `seed` overrides `mapping.seed`; without either, a time-derived seed is
/// used and recorded in the result.
pub fn map_project(
    config: &ProjectConfig,
    seed: Option<u64>,
    cancel: &Cancellation,
) -> Result<MappingResult, MapError> {
    let mut problem = build_problem(config)?;
    let seed = seed.or(config.mapping.seed).unwrap_or_else(Lcg::time_seed);
    let algorithm = convert::search_algorithm(config);
    let outcome = search(&mut problem, &algorithm, seed, cancel)?;
    let mut result = MappingResult::extract(&problem, outcome)?;
    result.seed = Some(seed);
    Ok(result)
}

/// Runs the thermal simulator on the per-node energy of `result`.
///
/// The trace and steady-state paths of `thermal` are resolved against
/// `work_dir`.
pub fn simulate_temperature(
    result: &MappingResult,
    thermal: &ThermalConfig,
    work_dir: &Path,
) -> Result<SteadyTemperatures, MapError> {
    let trace = PowerTrace::from_node_power(&result.node_energy);
    let temperatures = convert::thermal_simulator(thermal).run(
        &trace,
        &work_dir.join(&thermal.power_trace),
        &work_dir.join(&thermal.steady_file),
    )?;
    Ok(temperatures)
}
