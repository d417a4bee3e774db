//! `nocmap check`: configuration validation and problem statistics.
//!
//! Loads `nocmap.toml`, builds the mesh and task graph exactly as `map`
//! would, and prints their sizes without running a search.

use std::fmt::Write as _;

use nocmap_config::{Algorithm, ProjectConfig};
use nocmap_mapper::search::permutation_count;
use nocmap_mapper::{build_problem, Problem};

use crate::project::load_project;
use crate::GlobalArgs;

/// Runs the `nocmap check` command.
///
/// Returns exit code 0 when the configuration builds into a mapping problem.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (_, config) = load_project(global)?;

    if !global.quiet {
        eprintln!("   Checking {}", config.project.name);
    }

    let problem = build_problem(&config)?;

    if !global.quiet {
        print!("{}", summarize(&config, &problem));
    }

    Ok(0)
}

/// Renders the mesh, traffic and search-space statistics of a problem.
fn summarize(config: &ProjectConfig, problem: &Problem) -> String {
    let mesh = problem.mesh();
    let flows = problem.flows();
    let volume: f64 = flows.iter().map(|f| f.volume).sum();
    let bandwidth: f64 = flows.iter().map(|f| f.bandwidth).sum();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "mesh:      {}x{} ({} nodes, {} links)",
        mesh.rows(),
        mesh.cols(),
        mesh.node_count(),
        mesh.link_count()
    );
    let _ = writeln!(out, "cores:     {}", problem.tasks().core_count());
    let _ = writeln!(
        out,
        "flows:     {} (volume {volume}, bandwidth {bandwidth})",
        flows.len()
    );
    let _ = writeln!(out, "routing:   {}", routing_label(problem));

    let placements = permutation_count(mesh.node_count(), problem.tasks().core_count());
    let search = match config.mapping.algorithm {
        Algorithm::Anneal => "anneal".to_string(),
        Algorithm::Exhaustive => match placements {
            Some(count) => format!("exhaustive ({count} placements)"),
            None => "exhaustive (placement count overflows u128)".to_string(),
        },
    };
    let _ = writeln!(out, "search:    {search}");
    out
}

fn routing_label(problem: &Problem) -> String {
    match problem.routing().turn_model() {
        Some(model) => model.to_string(),
        None => "xy".to_string(),
    }
}
