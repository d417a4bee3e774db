//! 2D mesh topology: nodes, unidirectional links and per-node routing tables.
//!
//! Nodes are numbered row-major (`id = row * cols + col`). Links are created
//! in two blocks: all horizontal links first (row by row, an east link then
//! its west twin), then all vertical links (a south link then its north twin).
//! Row 0 is the northern edge of the mesh and column 0 its western edge.

use crate::error::MapError;
use nocmap_common::{InternalError, LinkId, MapResult, NodeId};
use nocmap_config::MAX_MESH_NODES;
use serde::{Deserialize, Serialize};

/// A compass direction of travel between adjacent mesh nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Toward row 0.
    North,
    /// Toward the last column.
    East,
    /// Toward the last row.
    South,
    /// Toward column 0.
    West,
}

impl Direction {
    /// All four directions, in index order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns a dense index in `0..4`.
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Returns `true` for north and south.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// Returns the `(row, col)` step taken when moving in this direction.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// One entry of a node's routing table.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RouteEntry {
    /// The packet has arrived; deliver to the local core.
    Local,
    /// Forward on this outgoing link.
    Link(LinkId),
    /// No route has been programmed for this pair.
    Unreachable,
}

/// A mesh node (tile) hosting at most one core.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's ID.
    pub id: NodeId,
    /// Mesh row (0 is the northern edge).
    pub row: u32,
    /// Mesh column (0 is the western edge).
    pub col: u32,
    /// Switching energy per bit.
    pub cost: f64,
    /// Incoming link IDs, in creation order.
    pub in_links: Vec<LinkId>,
    /// Outgoing link IDs, in creation order.
    pub out_links: Vec<LinkId>,
    /// `routing_table[src * nodes + dst]`; empty until programmed.
    routing_table: Vec<RouteEntry>,
}

impl Node {
    fn new(id: NodeId, row: u32, col: u32, cost: f64) -> Self {
        Self {
            id,
            row,
            col,
            cost,
            in_links: Vec::new(),
            out_links: Vec::new(),
            routing_table: Vec::new(),
        }
    }

    /// Returns the programmed route for a packet from `src` to `dst` passing
    /// through this node.
    pub fn route(&self, src: NodeId, dst: NodeId, node_count: usize) -> RouteEntry {
        if dst == self.id {
            return RouteEntry::Local;
        }
        self.routing_table
            .get(src.index() * node_count + dst.index())
            .copied()
            .unwrap_or(RouteEntry::Unreachable)
    }

    /// Returns `true` once a routing table has been programmed into this node.
    pub fn is_programmed(&self) -> bool {
        !self.routing_table.is_empty()
    }
}

/// A unidirectional, bandwidth-limited link between two adjacent nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// The link's ID.
    pub id: LinkId,
    /// Capacity.
    pub bandwidth: f64,
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Row of the source node.
    pub from_row: u32,
    /// Column of the source node.
    pub from_col: u32,
    /// Row of the destination node.
    pub to_row: u32,
    /// Column of the destination node.
    pub to_col: u32,
    /// Traversal energy per bit.
    pub cost: f64,
}

impl Link {
    /// Returns the direction this link points in.
    pub fn direction(&self) -> Direction {
        if self.to_col > self.from_col {
            Direction::East
        } else if self.to_col < self.from_col {
            Direction::West
        } else if self.to_row > self.from_row {
            Direction::South
        } else {
            Direction::North
        }
    }
}

/// Parameters for building a mesh.
#[derive(Debug, Clone, Copy)]
pub struct MeshSpec {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
    /// Capacity of every link.
    pub link_bandwidth: f64,
    /// Switching energy per bit, assigned to every node.
    pub switch_energy: f64,
    /// Traversal energy per bit, assigned to every link.
    pub link_energy: f64,
}

impl MeshSpec {
    /// A square mesh with `edge * edge` nodes.
    pub fn square(edge: u32, link_bandwidth: f64, switch_energy: f64, link_energy: f64) -> Self {
        Self {
            rows: edge,
            cols: edge,
            link_bandwidth,
            switch_energy,
            link_energy,
        }
    }
}

/// A 2D mesh network-on-chip.
#[derive(Debug, Clone)]
pub struct Mesh {
    rows: u32,
    cols: u32,
    nodes: Vec<Node>,
    links: Vec<Link>,
    /// Outgoing link per node and direction.
    out_by_direction: Vec<[Option<LinkId>; 4]>,
}

impl Mesh {
    /// Builds the nodes and links of a `rows x cols` mesh.
    pub fn build(spec: &MeshSpec) -> Result<Self, MapError> {
        if spec.rows == 0 || spec.cols == 0 {
            return Err(MapError::EmptyMesh {
                rows: spec.rows,
                cols: spec.cols,
            });
        }

        let node_count = match spec.rows.checked_mul(spec.cols) {
            Some(n) if n <= MAX_MESH_NODES => n as usize,
            _ => {
                return Err(MapError::MeshTooLarge {
                    rows: spec.rows,
                    cols: spec.cols,
                    limit: MAX_MESH_NODES,
                })
            }
        };
        let nodes = (0..node_count)
            .map(|i| {
                let row = i as u32 / spec.cols;
                let col = i as u32 % spec.cols;
                Node::new(NodeId::from_index(i), row, col, spec.switch_energy)
            })
            .collect();

        let mut mesh = Self {
            rows: spec.rows,
            cols: spec.cols,
            nodes,
            links: Vec::new(),
            out_by_direction: vec![[None; 4]; node_count],
        };

        for row in 0..spec.rows {
            for col in 0..spec.cols.saturating_sub(1) {
                mesh.add_link(spec, (row, col), (row, col + 1));
                mesh.add_link(spec, (row, col + 1), (row, col));
            }
        }
        for row in 0..spec.rows.saturating_sub(1) {
            for col in 0..spec.cols {
                mesh.add_link(spec, (row, col), (row + 1, col));
                mesh.add_link(spec, (row + 1, col), (row, col));
            }
        }

        mesh.check_connectivity()?;
        log::debug!(
            "built {}x{} mesh: {} nodes, {} links",
            spec.rows,
            spec.cols,
            mesh.node_count(),
            mesh.link_count()
        );
        Ok(mesh)
    }

    fn add_link(&mut self, spec: &MeshSpec, from: (u32, u32), to: (u32, u32)) {
        let id = LinkId::from_index(self.links.len());
        let from_id = self.node_at(from.0, from.1);
        let to_id = self.node_at(to.0, to.1);
        let link = Link {
            id,
            bandwidth: spec.link_bandwidth,
            from: from_id,
            to: to_id,
            from_row: from.0,
            from_col: from.1,
            to_row: to.0,
            to_col: to.1,
            cost: spec.link_energy,
        };
        self.out_by_direction[from_id.index()][link.direction().index()] = Some(id);
        self.nodes[from_id.index()].out_links.push(id);
        self.nodes[to_id.index()].in_links.push(id);
        self.links.push(link);
    }

    /// Every node of a multi-node mesh needs at least one inbound and one outbound link.
    fn check_connectivity(&self) -> MapResult<()> {
        if self.nodes.len() < 2 {
            return Ok(());
        }
        for node in &self.nodes {
            if node.in_links.is_empty() || node.out_links.is_empty() {
                return Err(InternalError::new(format!(
                    "node {} ({}, {}) is disconnected",
                    node.id, node.row, node.col
                )));
            }
        }
        Ok(())
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Returns all nodes in ID order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all links in ID order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the link with the given ID.
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    /// Overrides the capacity of a single link.
    pub fn set_link_bandwidth(&mut self, id: LinkId, bandwidth: f64) {
        self.links[id.index()].bandwidth = bandwidth;
    }

    /// Returns the node at `(row, col)`.
    pub fn node_at(&self, row: u32, col: u32) -> NodeId {
        NodeId::from_raw(row * self.cols + col)
    }

    /// Returns the `(row, col)` coordinates of a node.
    pub fn coords(&self, id: NodeId) -> (u32, u32) {
        (id.as_raw() / self.cols, id.as_raw() % self.cols)
    }

    /// Returns the outgoing link of `node` in `dir`, if the mesh has one.
    pub fn out_link(&self, node: NodeId, dir: Direction) -> Option<LinkId> {
        self.out_by_direction[node.index()][dir.index()]
    }

    /// Returns the outgoing link of `node` in `dir`, or an internal error.
    pub fn require_out_link(&self, node: NodeId, dir: Direction) -> MapResult<LinkId> {
        self.out_link(node, dir).ok_or_else(|| {
            let (row, col) = self.coords(node);
            InternalError::new(format!(
                "no {dir:?} link out of node {node} ({row}, {col})"
            ))
        })
    }

    /// Returns the link from `from` to `to`, if they are adjacent.
    pub fn link_between(&self, from: NodeId, to: NodeId) -> Option<LinkId> {
        self.nodes[from.index()]
            .out_links
            .iter()
            .copied()
            .find(|&l| self.links[l.index()].to == to)
    }

    /// Returns the number of hops on a minimal path between two nodes.
    pub fn manhattan_distance(&self, a: NodeId, b: NodeId) -> u32 {
        let (ar, ac) = self.coords(a);
        let (br, bc) = self.coords(b);
        ar.abs_diff(br) + ac.abs_diff(bc)
    }

    /// Replaces the routing table of every node.
    ///
    /// `tables[node]` must hold `node_count * node_count` entries indexed by
    /// `src * node_count + dst`.
    pub(crate) fn install_routing_tables(&mut self, tables: Vec<Vec<RouteEntry>>) {
        for (node, table) in self.nodes.iter_mut().zip(tables) {
            node.routing_table = table;
        }
    }

    /// Drops every programmed routing table.
    pub fn clear_routing_tables(&mut self) {
        for node in &mut self.nodes {
            node.routing_table.clear();
        }
    }
}
