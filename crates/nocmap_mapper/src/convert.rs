//! Conversion from a parsed [`ProjectConfig`] to a mapping [`Problem`].
//!
//! Cores are numbered in declaration order across the `[[cores]]` groups.
//! Unset energies and annealing parameters fall back to the defaults of
//! [`EnergyModel`] and [`AnnealParams`].

use crate::cost::EnergyModel;
use crate::error::MapError;
use crate::problem::Problem;
use crate::routing::TurnModel;
use crate::search::{AnnealParams, SearchAlgorithm};
use crate::task::{TaskGraph, Traffic};
use crate::thermal::ThermalSimulator;
use crate::topology::{Mesh, MeshSpec};
use nocmap_common::CoreId;
use nocmap_config::{
    Algorithm, AnnealConfig, ConfigError, ProjectConfig, RoutingMode, ThermalConfig,
};
use std::time::Duration;

/// Returns the energy model, filling unset fields with defaults.
pub fn energy_model(config: &ProjectConfig) -> EnergyModel {
    let defaults = EnergyModel::default();
    let energy = &config.energy;
    EnergyModel {
        switch_bit: energy.switch_bit.unwrap_or(defaults.switch_bit),
        link_bit: energy.link_bit.unwrap_or(defaults.link_bit),
        buffer_read_bit: energy.buffer_read_bit.unwrap_or(defaults.buffer_read_bit),
        buffer_write_bit: energy.buffer_write_bit.unwrap_or(defaults.buffer_write_bit),
    }
}

/// Returns the mesh parameters.
pub fn mesh_spec(config: &ProjectConfig, energy: &EnergyModel) -> Result<MeshSpec, MapError> {
    let (rows, cols) = config.topology.dimensions()?;
    Ok(MeshSpec {
        rows,
        cols,
        link_bandwidth: config.topology.link_bandwidth,
        switch_energy: energy.switch_bit,
        link_energy: energy.link_bit,
    })
}

/// Builds the task graph, deriving rate-based bandwidths from the link
/// bandwidth.
pub fn task_graph(config: &ProjectConfig) -> Result<TaskGraph, MapError> {
    let mut tasks = TaskGraph::new();
    for group in &config.cores {
        for _ in 0..group.count {
            tasks.add_core(group.app.clone());
        }
    }
    for (i, spec) in config.traffic.iter().enumerate() {
        let src = CoreId::from_raw(spec.src);
        let dst = CoreId::from_raw(spec.dst);
        let traffic = match (spec.bandwidth, spec.rate) {
            (Some(bandwidth), None) => Traffic::new(spec.volume, bandwidth),
            (None, Some(rate)) => Traffic::from_rate(
                src,
                dst,
                spec.volume,
                rate,
                spec.multiplier.unwrap_or(1.0),
                config.topology.link_bandwidth,
            )?,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "traffic[{i}] needs exactly one of bandwidth and rate"
                ))
                .into())
            }
        };
        tasks.add_traffic(src, dst, traffic)?;
    }
    Ok(tasks)
}

/// Maps the configured routing mode to a turn model; XY routing has none.
pub fn turn_model(mode: RoutingMode) -> Option<TurnModel> {
    match mode {
        RoutingMode::Xy => None,
        RoutingMode::WestFirst => Some(TurnModel::WestFirst),
        RoutingMode::OddEven => Some(TurnModel::OddEven),
    }
}

/// Returns the annealing schedule with overrides applied.
pub fn anneal_params(config: &AnnealConfig) -> AnnealParams {
    let d = AnnealParams::default();
    AnnealParams {
        initial_temperature: config.initial_temperature.unwrap_or(d.initial_temperature),
        cooling_rate: config.cooling_rate.unwrap_or(d.cooling_rate),
        attempts_factor: config.attempts_factor.unwrap_or(d.attempts_factor),
        min_accept: config.min_accept.unwrap_or(d.min_accept),
        tolerance: config.tolerance.unwrap_or(d.tolerance),
        min_rounds: config.min_rounds.unwrap_or(d.min_rounds),
        max_free_rounds: config.max_free_rounds.unwrap_or(d.max_free_rounds),
        max_rounds: config.max_rounds.unwrap_or(d.max_rounds),
        record_moves: config.record_moves,
    }
}

/// Returns the configured search algorithm.
pub fn search_algorithm(config: &ProjectConfig) -> SearchAlgorithm {
    match config.mapping.algorithm {
        Algorithm::Anneal => SearchAlgorithm::Anneal(anneal_params(&config.anneal)),
        Algorithm::Exhaustive => SearchAlgorithm::Exhaustive,
    }
}

/// Builds the complete mapping problem.
pub fn build_problem(config: &ProjectConfig) -> Result<Problem, MapError> {
    let energy = energy_model(config);
    let mesh = Mesh::build(&mesh_spec(config, &energy)?)?;
    let tasks = task_graph(config)?;
    Problem::new(mesh, tasks, turn_model(config.mapping.routing), energy)
}

/// Returns the simulator invocation described by `[thermal]`.
pub fn thermal_simulator(config: &ThermalConfig) -> ThermalSimulator {
    let sim = ThermalSimulator::new(&config.program, &config.floorplan)
        .with_args(config.args.clone())
        .with_timeout(Duration::from_secs(config.timeout_secs));
    match &config.config {
        Some(path) => sim.with_config(path),
        None => sim,
    }
}
