//! A complete mapping problem: mesh, task graph, routing and energy model.
//!
//! [`Problem`] is immutable during a search; engines borrow it and evaluate
//! candidate [`Assignment`]s against it. Only after the search has finished is
//! it borrowed mutably, to program adaptive routing for the chosen placement.

use crate::assignment::Assignment;
use crate::cost::{attribute_path_energy, overload_penalty, CostBreakdown, EnergyModel};
use crate::error::MapError;
use crate::routing::{route_adaptive, AdaptiveTable, RoutingStrategy, TurnModel, XyRoutes};
use crate::task::{Flow, TaskGraph};
use crate::topology::Mesh;
use nocmap_common::{CoreId, InternalError, LinkId, MapResult, NodeId};

/// Everything a search engine needs to score placements.
#[derive(Debug, Clone)]
pub struct Problem {
    mesh: Mesh,
    tasks: TaskGraph,
    flows: Vec<Flow>,
    routing: RoutingStrategy,
    energy: EnergyModel,
}

/// A detailed evaluation of one placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The cost terms.
    pub cost: CostBreakdown,
    /// Bandwidth carried by every link, indexed by link ID.
    pub link_usage: Vec<f64>,
    /// Communication energy attributed to every node, indexed by node ID.
    pub node_energy: Vec<f64>,
}

impl Problem {
    /// Assembles a problem, failing if the mesh cannot host every core.
    ///
    /// `turn_model` selects adaptive routing; `None` means static XY routing,
    /// whose paths are precomputed here.
    pub fn new(
        mesh: Mesh,
        tasks: TaskGraph,
        turn_model: Option<TurnModel>,
        energy: EnergyModel,
    ) -> Result<Self, MapError> {
        if tasks.core_count() > mesh.node_count() {
            return Err(MapError::TooFewNodes {
                nodes: mesh.node_count(),
                cores: tasks.core_count(),
            });
        }
        let routing = match turn_model {
            Some(model) => RoutingStrategy::Adaptive(model),
            None => RoutingStrategy::Static(XyRoutes::build(&mesh)?),
        };
        let flows = tasks.flows();
        log::debug!(
            "mapping {} cores with {} flows onto {} nodes",
            tasks.core_count(),
            flows.len(),
            mesh.node_count()
        );
        Ok(Self {
            mesh,
            tasks,
            flows,
            routing,
            energy,
        })
    }

    /// Returns the mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Returns the task graph.
    pub fn tasks(&self) -> &TaskGraph {
        &self.tasks
    }

    /// Returns the routed core pairs.
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Returns the routing strategy.
    pub fn routing(&self) -> &RoutingStrategy {
        &self.routing
    }

    /// Returns the energy model.
    pub fn energy(&self) -> &EnergyModel {
        &self.energy
    }

    /// Returns a placement with no core placed, sized for this problem.
    pub fn empty_assignment(&self) -> Assignment {
        Assignment::new(self.mesh.node_count(), self.tasks.core_count())
    }

    /// Returns the total cost of `assignment`.
    pub fn evaluate(&self, assignment: &Assignment) -> MapResult<f64> {
        Ok(self.breakdown(assignment)?.total())
    }

    /// Returns the cost terms of `assignment`.
    pub fn breakdown(&self, assignment: &Assignment) -> MapResult<CostBreakdown> {
        let mut cost = CostBreakdown::default();
        let usage = self.trace(assignment, None, |flow, src, path| {
            cost.charge_path(&self.mesh, &self.energy, flow.volume, src, path);
        })?;
        cost.overload_penalty = overload_penalty(&self.mesh, &usage);
        Ok(cost)
    }

    /// Returns the cost terms together with per-link usage and per-node energy.
    pub fn evaluate_detailed(&self, assignment: &Assignment) -> MapResult<Evaluation> {
        let mut cost = CostBreakdown::default();
        let mut node_energy = vec![0.0; self.mesh.node_count()];
        let link_usage = self.trace(assignment, None, |flow, src, path| {
            cost.charge_path(&self.mesh, &self.energy, flow.volume, src, path);
            attribute_path_energy(&self.mesh, &self.energy, flow.volume, src, path, &mut node_energy);
        })?;
        cost.overload_penalty = overload_penalty(&self.mesh, &link_usage);
        Ok(Evaluation {
            cost,
            link_usage,
            node_energy,
        })
    }

    /// Programs the nodes' routing tables for `assignment`.
    ///
    /// Static routing needs no table and leaves the mesh untouched. Adaptive
    /// routing replays the evaluation with recording enabled, then routes the
    /// remaining node pairs (carrying no traffic) on the final link loads so
    /// every pair has a path.
    pub fn program_routes(&mut self, assignment: &Assignment) -> MapResult<()> {
        let model = match self.routing {
            RoutingStrategy::Static(_) => return Ok(()),
            RoutingStrategy::Adaptive(model) => model,
        };
        let n = self.mesh.node_count();
        let mut table = AdaptiveTable::new(n);
        let mut usage = self.trace(assignment, Some(&mut table), |_, _, _| {})?;

        let mut path = Vec::new();
        for src in 0..n {
            for dst in 0..n {
                let (src, dst) = (NodeId::from_index(src), NodeId::from_index(dst));
                if src != dst && !table.has_route(src, dst) {
                    route_adaptive(
                        &self.mesh,
                        model,
                        src,
                        dst,
                        0.0,
                        &mut usage,
                        &mut path,
                        Some(&mut table),
                    )?;
                }
            }
        }
        table.program(&mut self.mesh)
    }

    /// Routes every flow under `assignment`, calling `visit` with each flow,
    /// its source node and its path, and returns the resulting link usage.
    fn trace(
        &self,
        assignment: &Assignment,
        mut table: Option<&mut AdaptiveTable>,
        mut visit: impl FnMut(&Flow, NodeId, &[LinkId]),
    ) -> MapResult<Vec<f64>> {
        let mut usage = vec![0.0; self.mesh.link_count()];
        let mut scratch = Vec::new();
        for flow in &self.flows {
            let src = self.placed(assignment, flow.src)?;
            let dst = self.placed(assignment, flow.dst)?;
            match &self.routing {
                RoutingStrategy::Static(routes) => {
                    let path = routes.path(src, dst);
                    for link in path {
                        usage[link.index()] += flow.bandwidth;
                    }
                    visit(flow, src, path);
                }
                RoutingStrategy::Adaptive(model) => {
                    route_adaptive(
                        &self.mesh,
                        *model,
                        src,
                        dst,
                        flow.bandwidth,
                        &mut usage,
                        &mut scratch,
                        table.as_deref_mut(),
                    )?;
                    visit(flow, src, &scratch);
                }
            }
        }
        Ok(usage)
    }

    fn placed(&self, assignment: &Assignment, core: CoreId) -> MapResult<NodeId> {
        assignment
            .node_of(core)
            .ok_or_else(|| InternalError::new(format!("core {core} is not placed")))
    }
}
