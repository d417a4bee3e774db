//! Cores (one task each) and the directed traffic between them.
//!
//! Every core holds dense per-peer vectors of outgoing and incoming volume
//! and bandwidth. [`TaskGraph::add_traffic`] is the only writer and always
//! updates both ends, so `core(i).to_bandwidth(j)` and
//! `core(j).from_bandwidth(i)` never disagree.

use crate::error::MapError;
use nocmap_common::{CoreId, InternalError};
use serde::{Deserialize, Serialize};

/// Volume and bandwidth requirement of one directed core pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    /// Communication volume in bits.
    pub volume: f64,
    /// Required bandwidth.
    pub bandwidth: f64,
}

impl Traffic {
    /// Traffic with an explicit bandwidth requirement.
    pub fn new(volume: f64, bandwidth: f64) -> Self {
        Self { volume, bandwidth }
    }

    /// Traffic whose bandwidth is `rate * multiplier * link_bandwidth`.
    ///
    /// Fails with [`MapError::MalformedRate`] unless `rate` lies in `[0, 1]`.
    pub fn from_rate(
        src: CoreId,
        dst: CoreId,
        volume: f64,
        rate: f64,
        multiplier: f64,
        link_bandwidth: f64,
    ) -> Result<Self, MapError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(MapError::MalformedRate { src, dst, rate });
        }
        Ok(Self {
            volume,
            bandwidth: rate * multiplier * link_bandwidth,
        })
    }
}

/// A computation unit running exactly one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Core {
    /// The core's ID.
    pub id: CoreId,
    /// Owning application identifier.
    pub app: String,
    to_communication: Vec<f64>,
    from_communication: Vec<f64>,
    to_bandwidth: Vec<f64>,
    from_bandwidth: Vec<f64>,
}

impl Core {
    fn new(id: CoreId, app: String, peers: usize) -> Self {
        Self {
            id,
            app,
            to_communication: vec![0.0; peers],
            from_communication: vec![0.0; peers],
            to_bandwidth: vec![0.0; peers],
            from_bandwidth: vec![0.0; peers],
        }
    }

    fn grow(&mut self) {
        self.to_communication.push(0.0);
        self.from_communication.push(0.0);
        self.to_bandwidth.push(0.0);
        self.from_bandwidth.push(0.0);
    }

    /// Volume this core sends to `peer`.
    pub fn to_volume(&self, peer: CoreId) -> f64 {
        self.to_communication[peer.index()]
    }

    /// Volume this core receives from `peer`.
    pub fn from_volume(&self, peer: CoreId) -> f64 {
        self.from_communication[peer.index()]
    }

    /// Bandwidth this core requires toward `peer`.
    pub fn to_bandwidth(&self, peer: CoreId) -> f64 {
        self.to_bandwidth[peer.index()]
    }

    /// Bandwidth `peer` requires toward this core.
    pub fn from_bandwidth(&self, peer: CoreId) -> f64 {
        self.from_bandwidth[peer.index()]
    }

    /// Total volume sent by this core.
    pub fn total_outgoing_volume(&self) -> f64 {
        self.to_communication.iter().sum()
    }
}

/// A directed core pair carrying traffic, as routed by the cost model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flow {
    /// Sending core.
    pub src: CoreId,
    /// Receiving core.
    pub dst: CoreId,
    /// Volume in bits.
    pub volume: f64,
    /// Required bandwidth.
    pub bandwidth: f64,
}

/// The set of cores to place and their communication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskGraph {
    cores: Vec<Core>,
}

impl TaskGraph {
    /// Creates an empty task graph.
    pub fn new() -> Self {
        Self { cores: Vec::new() }
    }

    /// Adds a core owned by `app` and returns its ID.
    pub fn add_core(&mut self, app: impl Into<String>) -> CoreId {
        let id = CoreId::from_index(self.cores.len());
        for core in &mut self.cores {
            core.grow();
        }
        let peers = self.cores.len() + 1;
        self.cores.push(Core::new(id, app.into(), peers));
        id
    }

    /// Records traffic from `src` to `dst` on both cores, replacing any
    /// previous value for the pair.
    pub fn add_traffic(&mut self, src: CoreId, dst: CoreId, traffic: Traffic) -> Result<(), MapError> {
        let count = self.cores.len();
        if src.index() >= count || dst.index() >= count {
            return Err(InternalError::new(format!(
                "traffic {src} -> {dst} references a core outside 0..{count}"
            ))
            .into());
        }
        if src == dst {
            return Err(InternalError::new(format!("core {src} cannot send to itself")).into());
        }

        let sender = &mut self.cores[src.index()];
        sender.to_communication[dst.index()] = traffic.volume;
        sender.to_bandwidth[dst.index()] = traffic.bandwidth;

        let receiver = &mut self.cores[dst.index()];
        receiver.from_communication[src.index()] = traffic.volume;
        receiver.from_bandwidth[src.index()] = traffic.bandwidth;
        Ok(())
    }

    /// Returns the number of cores.
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Returns all cores in ID order.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Returns the core with the given ID.
    pub fn core(&self, id: CoreId) -> &Core {
        &self.cores[id.index()]
    }

    /// Returns every directed pair with positive volume or bandwidth, ordered
    /// by sender then receiver.
    pub fn flows(&self) -> Vec<Flow> {
        let mut flows = Vec::new();
        for core in &self.cores {
            for (peer, (&volume, &bandwidth)) in core
                .to_communication
                .iter()
                .zip(&core.to_bandwidth)
                .enumerate()
            {
                if volume > 0.0 || bandwidth > 0.0 {
                    flows.push(Flow {
                        src: core.id,
                        dst: CoreId::from_index(peer),
                        volume,
                        bandwidth,
                    });
                }
            }
        }
        flows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(cores: usize) -> TaskGraph {
        let mut g = TaskGraph::new();
        for _ in 0..cores {
            g.add_core("app");
        }
        g
    }

    #[test]
    fn vectors_sized_to_core_count() {
        let g = graph(3);
        for core in g.cores() {
            for peer in 0..3 {
                assert_eq!(core.to_volume(CoreId::from_index(peer)), 0.0);
                assert_eq!(core.from_bandwidth(CoreId::from_index(peer)), 0.0);
            }
        }
    }

    #[test]
    fn traffic_written_on_both_ends() {
        let mut g = graph(3);
        let (a, b) = (CoreId::from_raw(0), CoreId::from_raw(2));
        g.add_traffic(a, b, Traffic::new(100.0, 50.0)).unwrap();

        assert_eq!(g.core(a).to_volume(b), 100.0);
        assert_eq!(g.core(a).to_bandwidth(b), 50.0);
        assert_eq!(g.core(b).from_volume(a), 100.0);
        assert_eq!(g.core(b).from_bandwidth(a), 50.0);
        assert_eq!(g.core(b).to_volume(a), 0.0);
    }

    #[test]
    fn bandwidth_pairing_invariant() {
        let mut g = graph(4);
        g.add_traffic(CoreId::from_raw(0), CoreId::from_raw(1), Traffic::new(1.0, 2.0))
            .unwrap();
        g.add_traffic(CoreId::from_raw(3), CoreId::from_raw(1), Traffic::new(4.0, 8.0))
            .unwrap();
        g.add_traffic(CoreId::from_raw(2), CoreId::from_raw(0), Traffic::new(1.0, 0.5))
            .unwrap();
        for i in g.cores() {
            for j in g.cores() {
                assert_eq!(i.to_bandwidth(j.id) > 0.0, j.from_bandwidth(i.id) > 0.0);
            }
        }
    }

    #[test]
    fn rate_derived_bandwidth() {
        let t = Traffic::from_rate(CoreId::from_raw(0), CoreId::from_raw(1), 10.0, 0.5, 2.0, 1000.0)
            .unwrap();
        assert_eq!(t.bandwidth, 1000.0);
        assert_eq!(t.volume, 10.0);
    }

    #[test]
    fn rate_outside_unit_interval_rejected() {
        for rate in [-0.1, 1.01, f64::NAN] {
            let err = Traffic::from_rate(CoreId::from_raw(0), CoreId::from_raw(1), 1.0, rate, 1.0, 1.0)
                .unwrap_err();
            assert!(matches!(err, MapError::MalformedRate { .. }));
        }
        assert!(Traffic::from_rate(CoreId::from_raw(0), CoreId::from_raw(1), 1.0, 1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn out_of_range_core_is_internal_error() {
        let mut g = graph(2);
        let err = g
            .add_traffic(CoreId::from_raw(0), CoreId::from_raw(5), Traffic::new(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, MapError::Internal(_)));
    }

    #[test]
    fn adding_core_grows_existing_vectors() {
        let mut g = graph(2);
        g.add_traffic(CoreId::from_raw(0), CoreId::from_raw(1), Traffic::new(3.0, 1.0))
            .unwrap();
        let c = g.add_core("late");
        g.add_traffic(CoreId::from_raw(0), c, Traffic::new(7.0, 1.0)).unwrap();
        assert_eq!(g.core(CoreId::from_raw(0)).to_volume(CoreId::from_raw(1)), 3.0);
        assert_eq!(g.core(c).from_volume(CoreId::from_raw(0)), 7.0);
        assert_eq!(g.core(CoreId::from_raw(0)).total_outgoing_volume(), 10.0);
    }

    #[test]
    fn flows_in_sender_order() {
        let mut g = graph(3);
        g.add_traffic(CoreId::from_raw(2), CoreId::from_raw(0), Traffic::new(1.0, 1.0))
            .unwrap();
        g.add_traffic(CoreId::from_raw(0), CoreId::from_raw(1), Traffic::new(2.0, 1.0))
            .unwrap();
        let flows = g.flows();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].src, CoreId::from_raw(0));
        assert_eq!(flows[1].src, CoreId::from_raw(2));
    }
}
