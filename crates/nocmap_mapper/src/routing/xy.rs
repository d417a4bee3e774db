//! Static dimension-order (XY) routing.
//!
//! A packet first travels along its row (east or west) until it reaches the
//! destination column, then along the column (north or south).

use crate::topology::{Direction, Mesh, RouteEntry};
use nocmap_common::{InternalError, LinkId, MapResult, NodeId};

/// Returns the XY next-hop direction from `cur` toward `dst`, both given as
/// `(row, col)`, or `None` once they coincide.
pub fn xy_direction(cur: (u32, u32), dst: (u32, u32)) -> Option<Direction> {
    let (cur_row, cur_col) = cur;
    let (dst_row, dst_col) = dst;
    if dst_col > cur_col {
        Some(Direction::East)
    } else if dst_col < cur_col {
        Some(Direction::West)
    } else if dst_row > cur_row {
        Some(Direction::South)
    } else if dst_row < cur_row {
        Some(Direction::North)
    } else {
        None
    }
}

/// The XY next-hop table and link usage lists of one mesh.
#[derive(Debug, Clone)]
pub struct XyRoutes {
    node_count: usize,
    /// `next_hop[node * n + dst]`.
    next_hop: Vec<RouteEntry>,
    /// `paths[src * n + dst]`: the links traversed, in order.
    paths: Vec<Vec<LinkId>>,
}

impl XyRoutes {
    /// Computes the next hop at every node and the path of every node pair.
    pub fn build(mesh: &Mesh) -> MapResult<Self> {
        let n = mesh.node_count();
        let mut next_hop = Vec::with_capacity(n * n);
        for node in 0..n {
            let here = NodeId::from_index(node);
            for dst in 0..n {
                let dst = NodeId::from_index(dst);
                let entry = match xy_direction(mesh.coords(here), mesh.coords(dst)) {
                    None => RouteEntry::Local,
                    Some(dir) => RouteEntry::Link(mesh.require_out_link(here, dir)?),
                };
                next_hop.push(entry);
            }
        }

        let mut routes = Self {
            node_count: n,
            next_hop,
            paths: Vec::with_capacity(n * n),
        };
        for src in 0..n {
            for dst in 0..n {
                let path = routes.walk(mesh, NodeId::from_index(src), NodeId::from_index(dst))?;
                routes.paths.push(path);
            }
        }
        log::debug!("precomputed XY routes for {} node pairs", n * n);
        Ok(routes)
    }

    fn walk(&self, mesh: &Mesh, src: NodeId, dst: NodeId) -> MapResult<Vec<LinkId>> {
        let mut path = Vec::with_capacity(mesh.manhattan_distance(src, dst) as usize);
        let mut here = src;
        // A minimal path never exceeds the node count.
        for _ in 0..self.node_count {
            match self.next_hop(here, dst) {
                RouteEntry::Local => return Ok(path),
                RouteEntry::Link(link) => {
                    path.push(link);
                    here = mesh.link(link).to;
                }
                RouteEntry::Unreachable => break,
            }
        }
        Err(InternalError::new(format!(
            "XY route from node {src} to node {dst} does not terminate"
        )))
    }

    /// Returns the next hop at `node` for packets headed to `dst`.
    pub fn next_hop(&self, node: NodeId, dst: NodeId) -> RouteEntry {
        self.next_hop[node.index() * self.node_count + dst.index()]
    }

    /// Returns the links traversed from `src` to `dst`.
    pub fn path(&self, src: NodeId, dst: NodeId) -> &[LinkId] {
        &self.paths[src.index() * self.node_count + dst.index()]
    }
}
