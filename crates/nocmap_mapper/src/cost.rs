//! Energy and bandwidth-overload cost of a routed placement.
//!
//! Every directed core pair with traffic is charged along its routed path:
//!
//! - **switch energy**: `node.cost * volume` at every node on the path,
//!   source and destination included;
//! - **link energy**: `link.cost * volume` for every traversed link;
//! - **buffer energy**: `(read + write) * volume` at every forwarding node
//!   plus a final `write * volume` at the destination.
//!
//! Link usage is the summed bandwidth of all pairs routed through a link. Any
//! usage above capacity adds `OVERLOAD_UNIT_COST` per unit of excess ratio,
//! which dominates the energy terms so overloaded placements always lose.

use crate::topology::Mesh;
use nocmap_common::{LinkId, NodeId};
use serde::{Deserialize, Serialize};

/// Penalty per unit of `usage / capacity - 1` on an overloaded link.
pub const OVERLOAD_UNIT_COST: f64 = 1e9;

/// Per-bit energies of the network components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    /// Switching energy per bit at every node on a path.
    pub switch_bit: f64,
    /// Traversal energy per bit of every link.
    pub link_bit: f64,
    /// Buffer read energy per bit.
    pub buffer_read_bit: f64,
    /// Buffer write energy per bit.
    pub buffer_write_bit: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            switch_bit: 0.284,
            link_bit: 0.449,
            buffer_read_bit: 1.056,
            buffer_write_bit: 2.831,
        }
    }
}

/// The four cost terms of an evaluated placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Switch energy.
    pub switch_energy: f64,
    /// Link energy.
    pub link_energy: f64,
    /// Buffer energy.
    pub buffer_energy: f64,
    /// Bandwidth overload penalty.
    pub overload_penalty: f64,
}

impl CostBreakdown {
    /// Returns the scalar cost minimized by the search engines.
    pub fn total(&self) -> f64 {
        self.communication_energy() + self.overload_penalty
    }

    /// Returns the energy terms without the overload penalty.
    pub fn communication_energy(&self) -> f64 {
        self.switch_energy + self.link_energy + self.buffer_energy
    }

    /// Adds the energy of `volume` bits travelling `path` from `src`.
    pub(crate) fn charge_path(
        &mut self,
        mesh: &Mesh,
        energy: &EnergyModel,
        volume: f64,
        src: NodeId,
        path: &[LinkId],
    ) {
        if volume <= 0.0 {
            return;
        }
        let mut switch = mesh.node(src).cost;
        let mut link = 0.0;
        for &id in path {
            let l = mesh.link(id);
            link += l.cost;
            switch += mesh.node(l.to).cost;
        }
        let forwarding = path.len() as f64;
        self.switch_energy += switch * volume;
        self.link_energy += link * volume;
        self.buffer_energy += ((energy.buffer_read_bit + energy.buffer_write_bit) * forwarding
            + energy.buffer_write_bit)
            * volume;
    }
}

/// Returns the excess of `usage` over `capacity`.
///
/// This is `usage / capacity - 1` clamped at zero. A link without capacity
/// measures its excess in absolute bandwidth, so the penalty still grows
/// linearly with the traffic forced onto it.
pub fn link_overload(usage: f64, capacity: f64) -> f64 {
    if usage <= 0.0 {
        return 0.0;
    }
    if capacity <= 0.0 {
        return usage;
    }
    (usage / capacity - 1.0).max(0.0)
}

/// Returns the overload penalty summed over every link of the mesh.
pub fn overload_penalty(mesh: &Mesh, usage: &[f64]) -> f64 {
    let excess: f64 = mesh
        .links()
        .iter()
        .zip(usage)
        .map(|(link, &used)| link_overload(used, link.bandwidth))
        .sum();
    excess * OVERLOAD_UNIT_COST
}

/// Adds the energy each node on `path` is responsible for to `node_energy`.
///
/// A node is charged its switching energy, the buffering it performs, and the
/// energy of the link it forwards onto. Summed over all nodes this equals the
/// communication energy of the path.
pub(crate) fn attribute_path_energy(
    mesh: &Mesh,
    energy: &EnergyModel,
    volume: f64,
    src: NodeId,
    path: &[LinkId],
    node_energy: &mut [f64],
) {
    if volume <= 0.0 {
        return;
    }
    let forward = energy.buffer_read_bit + energy.buffer_write_bit;
    let mut here = src;
    for &id in path {
        let link = mesh.link(id);
        node_energy[here.index()] += (mesh.node(here).cost + forward + link.cost) * volume;
        here = link.to;
    }
    node_energy[here.index()] += (mesh.node(here).cost + energy.buffer_write_bit) * volume;
}
