//! The core-to-node placement, owning both directions of the mapping.
//!
//! Neither nodes nor cores store their placement; [`Assignment`] is the single
//! source of truth and every mutator updates both lookup vectors together.

use nocmap_common::{CoreId, InternalError, MapResult, NodeId};

/// A partial bijection between cores and mesh nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    node_to_core: Vec<Option<CoreId>>,
    core_to_node: Vec<Option<NodeId>>,
}

impl Assignment {
    /// Creates an empty assignment for `nodes` slots and `cores` cores.
    pub fn new(nodes: usize, cores: usize) -> Self {
        Self {
            node_to_core: vec![None; nodes],
            core_to_node: vec![None; cores],
        }
    }

    /// Returns the number of node slots.
    pub fn node_count(&self) -> usize {
        self.node_to_core.len()
    }

    /// Returns the number of cores.
    pub fn core_count(&self) -> usize {
        self.core_to_node.len()
    }

    /// Returns the core placed on `node`, if any.
    pub fn core_at(&self, node: NodeId) -> Option<CoreId> {
        self.node_to_core[node.index()]
    }

    /// Returns the node hosting `core`, if it has been placed.
    pub fn node_of(&self, core: CoreId) -> Option<NodeId> {
        self.core_to_node[core.index()]
    }

    /// Places an unplaced core on an empty node.
    pub fn place(&mut self, core: CoreId, node: NodeId) -> MapResult<()> {
        if core.index() >= self.core_count() || node.index() >= self.node_count() {
            return Err(InternalError::new(format!(
                "cannot place core {core} on node {node}: index out of range"
            )));
        }
        if let Some(existing) = self.node_to_core[node.index()] {
            return Err(InternalError::new(format!(
                "node {node} already hosts core {existing}"
            )));
        }
        if let Some(existing) = self.core_to_node[core.index()] {
            return Err(InternalError::new(format!(
                "core {core} is already placed on node {existing}"
            )));
        }
        self.node_to_core[node.index()] = Some(core);
        self.core_to_node[core.index()] = Some(node);
        Ok(())
    }

    /// Removes every placement.
    pub fn clear(&mut self) {
        self.node_to_core.iter_mut().for_each(|slot| *slot = None);
        self.core_to_node.iter_mut().for_each(|slot| *slot = None);
    }

    /// Exchanges the contents (core or empty) of two node slots.
    pub fn swap(&mut self, a: NodeId, b: NodeId) {
        self.node_to_core.swap(a.index(), b.index());
        if let Some(core) = self.node_to_core[a.index()] {
            self.core_to_node[core.index()] = Some(a);
        }
        if let Some(core) = self.node_to_core[b.index()] {
            self.core_to_node[core.index()] = Some(b);
        }
    }

    /// Replaces the placement with core `i` on node `slots[i]`.
    pub fn apply_permutation(&mut self, slots: &[usize]) -> MapResult<()> {
        if slots.len() != self.core_count() {
            return Err(InternalError::new(format!(
                "permutation of length {} for {} cores",
                slots.len(),
                self.core_count()
            )));
        }
        self.clear();
        for (core, &node) in slots.iter().enumerate() {
            self.place(CoreId::from_index(core), NodeId::from_index(node))?;
        }
        Ok(())
    }

    /// Returns `true` when every core is placed.
    pub fn is_complete(&self) -> bool {
        self.core_to_node.iter().all(Option::is_some)
    }

    /// Returns `true` when the two lookup directions are mutual inverses.
    pub fn is_consistent(&self) -> bool {
        let forward = self.node_to_core.iter().enumerate().all(|(node, core)| {
            core.map_or(true, |c| self.core_to_node[c.index()] == Some(NodeId::from_index(node)))
        });
        let backward = self.core_to_node.iter().enumerate().all(|(core, node)| {
            node.map_or(true, |n| self.node_to_core[n.index()] == Some(CoreId::from_index(core)))
        });
        forward && backward
    }

    /// Returns the node-indexed view of the placement.
    pub fn by_node(&self) -> &[Option<CoreId>] {
        &self.node_to_core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: u32) -> NodeId {
        NodeId::from_raw(i)
    }

    fn c(i: u32) -> CoreId {
        CoreId::from_raw(i)
    }

    #[test]
    fn place_and_lookup() {
        let mut a = Assignment::new(4, 2);
        a.place(c(0), n(3)).unwrap();
        a.place(c(1), n(1)).unwrap();
        assert_eq!(a.core_at(n(3)), Some(c(0)));
        assert_eq!(a.node_of(c(1)), Some(n(1)));
        assert_eq!(a.core_at(n(0)), None);
        assert!(a.is_complete());
        assert!(a.is_consistent());
    }

    #[test]
    fn double_booking_rejected() {
        let mut a = Assignment::new(4, 2);
        a.place(c(0), n(0)).unwrap();
        assert!(a.place(c(1), n(0)).is_err());
        assert!(a.place(c(0), n(2)).is_err());
        assert!(a.place(c(5), n(2)).is_err());
        assert!(a.is_consistent());
    }

    #[test]
    fn swap_two_cores() {
        let mut a = Assignment::new(3, 2);
        a.apply_permutation(&[0, 2]).unwrap();
        a.swap(n(0), n(2));
        assert_eq!(a.node_of(c(0)), Some(n(2)));
        assert_eq!(a.node_of(c(1)), Some(n(0)));
        assert!(a.is_consistent());
    }

    #[test]
    fn swap_core_with_empty_slot() {
        let mut a = Assignment::new(3, 1);
        a.place(c(0), n(0)).unwrap();
        a.swap(n(0), n(1));
        assert_eq!(a.core_at(n(0)), None);
        assert_eq!(a.node_of(c(0)), Some(n(1)));
        assert!(a.is_consistent());
    }

    #[test]
    fn swap_twice_restores() {
        let mut a = Assignment::new(4, 3);
        a.apply_permutation(&[3, 0, 1]).unwrap();
        let before = a.clone();
        a.swap(n(3), n(2));
        a.swap(n(3), n(2));
        assert_eq!(a, before);
    }

    #[test]
    fn permutation_replaces_previous_placement() {
        let mut a = Assignment::new(4, 2);
        a.apply_permutation(&[0, 1]).unwrap();
        a.apply_permutation(&[3, 2]).unwrap();
        assert_eq!(a.by_node(), &[None, None, Some(c(1)), Some(c(0))]);
        assert!(a.is_consistent());
    }

    #[test]
    fn permutation_length_checked() {
        let mut a = Assignment::new(4, 2);
        assert!(a.apply_permutation(&[0]).is_err());
        assert!(a.apply_permutation(&[1, 1]).is_err());
    }

    #[test]
    fn bijection_survives_random_swaps() {
        let mut a = Assignment::new(9, 5);
        a.apply_permutation(&[8, 1, 4, 0, 6]).unwrap();
        for i in 0..100u32 {
            a.swap(n(i % 9), n((i * 7 + 3) % 9));
            assert!(a.is_consistent());
            let placed: std::collections::HashSet<_> = (0..5).filter_map(|k| a.node_of(c(k))).collect();
            assert_eq!(placed.len(), 5);
        }
    }
}
