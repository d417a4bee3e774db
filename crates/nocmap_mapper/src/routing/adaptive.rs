//! Hop-by-hop adaptive routing and the per-placement routing table.

use super::turn_model::{choose_direction, legal_directions};
use super::TurnModel;
use crate::topology::{Direction, Mesh, RouteEntry};
use nocmap_common::{InternalError, LinkId, MapResult, NodeId};

/// Directions chosen by adaptive routing, indexed by
/// `(node, source node, destination node)`.
///
/// Stored flat as `node_count³` entries. Only the final placement's table is
/// built; [`AdaptiveTable::program`] then turns it into link IDs inside the
/// mesh nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveTable {
    node_count: usize,
    entries: Vec<Option<Direction>>,
}

impl AdaptiveTable {
    /// Creates an empty table for a mesh of `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            entries: vec![None; node_count * node_count * node_count],
        }
    }

    fn slot(&self, node: NodeId, src: NodeId, dst: NodeId) -> usize {
        (node.index() * self.node_count + src.index()) * self.node_count + dst.index()
    }

    /// Records the direction taken at `node` by packets from `src` to `dst`.
    pub fn record(&mut self, node: NodeId, src: NodeId, dst: NodeId, dir: Direction) {
        let slot = self.slot(node, src, dst);
        self.entries[slot] = Some(dir);
    }

    /// Returns the direction recorded at `node` for `src -> dst`.
    pub fn direction(&self, node: NodeId, src: NodeId, dst: NodeId) -> Option<Direction> {
        self.entries[self.slot(node, src, dst)]
    }

    /// Returns `true` if a route from `src` to `dst` has been recorded.
    pub fn has_route(&self, src: NodeId, dst: NodeId) -> bool {
        self.direction(src, src, dst).is_some()
    }

    /// Resolves every recorded direction into the node's outgoing link and
    /// installs the result as the mesh's routing tables.
    ///
    /// A direction with no matching link is an internal consistency failure.
    pub fn program(&self, mesh: &mut Mesh) -> MapResult<()> {
        let n = self.node_count;
        if mesh.node_count() != n {
            return Err(InternalError::new(format!(
                "routing table for {n} nodes cannot program a mesh of {} nodes",
                mesh.node_count()
            )));
        }
        let mut tables = Vec::with_capacity(n);
        for node in 0..n {
            let here = NodeId::from_index(node);
            let mut table = vec![RouteEntry::Unreachable; n * n];
            for src in 0..n {
                for dst in 0..n {
                    let (src_id, dst_id) = (NodeId::from_index(src), NodeId::from_index(dst));
                    table[src * n + dst] = if dst_id == here {
                        RouteEntry::Local
                    } else {
                        match self.direction(here, src_id, dst_id) {
                            Some(dir) => RouteEntry::Link(mesh.require_out_link(here, dir)?),
                            None => RouteEntry::Unreachable,
                        }
                    };
                }
            }
            tables.push(table);
        }
        mesh.install_routing_tables(tables);
        log::debug!("programmed adaptive routing tables into {n} nodes");
        Ok(())
    }
}

/// Routes one packet stream from `src` to `dst` under `model`.
///
/// `usage` holds the bandwidth already carried by every link and is updated
/// with `bandwidth` for each hop taken. The traversed links are written to
/// `path`, and the chosen directions to `table` when one is given.
#[allow(clippy::too_many_arguments)]
pub fn route_adaptive(
    mesh: &Mesh,
    model: TurnModel,
    src: NodeId,
    dst: NodeId,
    bandwidth: f64,
    usage: &mut [f64],
    path: &mut Vec<LinkId>,
    mut table: Option<&mut AdaptiveTable>,
) -> MapResult<()> {
    path.clear();
    let src_pos = mesh.coords(src);
    let dst_pos = mesh.coords(dst);
    let mut here = src;

    for _ in 0..=mesh.node_count() {
        let cur = mesh.coords(here);
        if cur == dst_pos {
            return Ok(());
        }

        let candidates = legal_directions(model, src_pos, cur, dst_pos);
        let load = |dir: Option<Direction>| -> MapResult<f64> {
            match dir {
                Some(d) => Ok(usage[mesh.require_out_link(here, d)?.index()]),
                None => Ok(0.0),
            }
        };
        let horizontal_usage = load(candidates.horizontal)?;
        let vertical_usage = load(candidates.vertical)?;
        let dir = choose_direction(candidates, horizontal_usage, vertical_usage, cur, dst_pos)
            .ok_or_else(|| {
                InternalError::new(format!(
                    "{model} routing has no legal move at node {here} for {src} -> {dst}"
                ))
            })?;

        let link = mesh.require_out_link(here, dir)?;
        usage[link.index()] += bandwidth;
        path.push(link);
        if let Some(table) = table.as_deref_mut() {
            table.record(here, src, dst, dir);
        }
        here = mesh.link(link).to;
    }

    Err(InternalError::new(format!(
        "{model} route from node {src} to node {dst} does not terminate"
    )))
}
