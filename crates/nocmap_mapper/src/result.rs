//! Extraction of the final mapping for collaborators.
//!
//! A [`MappingResult`] is a self-contained summary of a finished search: the
//! node-to-core placement, the cost terms, per-link loads, per-node energy,
//! the annealing history and, for adaptive routing, the programmed routing
//! tables. It serializes to JSON and renders to the plain `node core` text
//! format, with `-1` marking empty nodes.

use crate::cost::CostBreakdown;
use crate::problem::Problem;
use crate::routing::TurnModel;
use crate::search::{MoveRecord, RoundStats, SearchOutcome, Termination};
use crate::topology::RouteEntry;
use nocmap_common::{definitely_greater, CoreId, LinkId, MapResult, NodeId};
use nocmap_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::Serialize;
use std::fmt::Write;

/// Achieved versus available bandwidth on one link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkLoad {
    /// The link.
    pub link: LinkId,
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Bandwidth routed over the link.
    pub usage: f64,
    /// Link capacity.
    pub capacity: f64,
}

impl LinkLoad {
    /// Returns `true` if the link carries more than its capacity, ignoring
    /// rounding noise in the summed usage.
    pub fn is_overloaded(&self) -> bool {
        definitely_greater(self.usage, self.capacity)
    }

    /// Returns `usage / capacity`, or infinity for a loaded zero-capacity link.
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0.0 {
            self.usage / self.capacity
        } else if self.usage > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// The outcome of a mapping run in collaborator-facing form.
#[derive(Debug, Clone, Serialize)]
pub struct MappingResult {
    /// Mesh rows.
    pub rows: u32,
    /// Mesh columns.
    pub cols: u32,
    /// Core hosted by every node, indexed by node ID.
    pub placement: Vec<Option<CoreId>>,
    /// Total cost of the placement; `None` when the search was cancelled
    /// before any placement was scored.
    pub total_cost: Option<f64>,
    /// The cost terms.
    pub cost: CostBreakdown,
    /// Why the search stopped.
    pub termination: Termination,
    /// Adaptive turn model, or `None` for static XY routing.
    pub turn_model: Option<TurnModel>,
    /// Seed the search ran with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Cost evaluations performed by the search.
    pub evaluations: u64,
    /// Per-round annealing history.
    pub rounds: Vec<RoundStats>,
    /// Recorded swap attempts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<MoveRecord>,
    /// Load of every link, indexed by link ID.
    pub link_loads: Vec<LinkLoad>,
    /// Communication energy attributed to every node.
    pub node_energy: Vec<f64>,
    /// `routing_tables[node][src * nodes + dst]`, present for adaptive routing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_tables: Option<Vec<Vec<RouteEntry>>>,
}

impl MappingResult {
    /// Builds the result for the placement chosen by `outcome`.
    ///
    /// The placement is re-evaluated in detail; routing tables are read back
    /// from the mesh when they have been programmed.
    pub fn extract(problem: &Problem, outcome: SearchOutcome) -> MapResult<Self> {
        let mesh = problem.mesh();
        let complete = outcome.assignment.is_complete();
        let (cost, link_usage, node_energy) = if complete {
            let detail = problem.evaluate_detailed(&outcome.assignment)?;
            (detail.cost, detail.link_usage, detail.node_energy)
        } else {
            (
                CostBreakdown::default(),
                vec![0.0; mesh.link_count()],
                vec![0.0; mesh.node_count()],
            )
        };

        let link_loads = mesh
            .links()
            .iter()
            .zip(&link_usage)
            .map(|(link, &usage)| LinkLoad {
                link: link.id,
                from: link.from,
                to: link.to,
                usage,
                capacity: link.bandwidth,
            })
            .collect();

        let n = mesh.node_count();
        let routing_tables = mesh.nodes().iter().all(|node| node.is_programmed()).then(|| {
            mesh.nodes()
                .iter()
                .map(|node| {
                    let mut table = Vec::with_capacity(n * n);
                    for src in 0..n {
                        for dst in 0..n {
                            table.push(node.route(
                                NodeId::from_index(src),
                                NodeId::from_index(dst),
                                n,
                            ));
                        }
                    }
                    table
                })
                .collect()
        });

        Ok(Self {
            rows: mesh.rows(),
            cols: mesh.cols(),
            placement: outcome.assignment.by_node().to_vec(),
            total_cost: complete.then(|| cost.total()),
            cost,
            termination: outcome.termination,
            turn_model: problem.routing().turn_model(),
            seed: None,
            evaluations: outcome.evaluations,
            rounds: outcome.rounds,
            moves: outcome.moves,
            link_loads,
            node_energy,
            routing_tables,
        })
    }

    /// Returns the core on `node`.
    pub fn core_at(&self, node: NodeId) -> Option<CoreId> {
        self.placement.get(node.index()).copied().flatten()
    }

    /// Returns the node hosting `core`.
    pub fn node_of(&self, core: CoreId) -> Option<NodeId> {
        self.placement
            .iter()
            .position(|&c| c == Some(core))
            .map(NodeId::from_index)
    }

    /// Returns the links carrying more than their capacity.
    pub fn overloaded_links(&self) -> impl Iterator<Item = &LinkLoad> {
        self.link_loads.iter().filter(|l| l.is_overloaded())
    }

    /// Returns the mean accept ratio over all annealing rounds.
    pub fn mean_accept_ratio(&self) -> Option<f64> {
        if self.rounds.is_empty() {
            return None;
        }
        let sum: f64 = self.rounds.iter().map(|r| r.accept_ratio).sum();
        Some(sum / self.rounds.len() as f64)
    }

    /// Renders the placement as `node core` lines, `-1` for an empty node.
    pub fn to_mapping_text(&self) -> String {
        let mut out = String::new();
        for (node, core) in self.placement.iter().enumerate() {
            let core = core.map_or(-1, |c| i64::from(c.as_raw()));
            let _ = writeln!(out, "{node} {core}");
        }
        out
    }

    /// Emits findings about the mapping: overloaded links, unplaced cores and
    /// searches that stopped before completing.
    pub fn report(&self, core_count: usize, sink: &DiagnosticSink) {
        for load in self.overloaded_links() {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, 101),
                    format!(
                        "link {} ({} -> {}) is overloaded",
                        load.link, load.from, load.to
                    ),
                )
                .with_note(format!(
                    "routed bandwidth {} exceeds capacity {}",
                    load.usage, load.capacity
                ))
                .with_help("raise topology.link_bandwidth or spread the traffic over a larger mesh"),
            );
        }

        for core in 0..core_count {
            let core = CoreId::from_index(core);
            if self.node_of(core).is_none() {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, 102),
                    format!("core {core} was not mapped to any node"),
                ));
            }
        }

        match self.termination {
            Termination::Cancelled => sink.emit(Diagnostic::note(
                DiagnosticCode::new(Category::Search, 301),
                "search cancelled; reporting the best placement found so far",
            )),
            Termination::RoundLimit => sink.emit(
                Diagnostic::note(
                    DiagnosticCode::new(Category::Search, 302),
                    format!(
                        "annealing stopped after {} rounds without freezing",
                        self.rounds.len()
                    ),
                )
                .with_help("lower anneal.tolerance or raise anneal.cooling_rate"),
            ),
            Termination::Frozen | Termination::Exhausted => {}
        }
    }
}
