//! Edge deduplication for mesh colliders
//!
//! Two neighbouring triangles share an edge. The collider generator asks this set
//! before emitting an edge so every mesh edge becomes exactly one line collider.

use std::collections::HashSet;

/// Remembers which undirected vertex index pairs have been seen.
///
/// Lives for one collider generation pass.
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: HashSet<u64>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: HashSet::with_capacity(capacity),
        }
    }

    /// Returns `true` the first time the pair `{i, j}` is seen, in either order.
    pub fn should_add_edge(&mut self, i: u32, j: u32) -> bool {
        self.edges.insert(edge_key(i, j))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[inline]
fn edge_key(i: u32, j: u32) -> u64 {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    ((lo as u64) << 32) + hi as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_first_sight_only() {
        let mut set = EdgeSet::new();
        assert!(set.should_add_edge(1, 2));
        assert!(!set.should_add_edge(2, 1));
        assert!(!set.should_add_edge(1, 2));
        assert!(set.should_add_edge(2, 3));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_is_order_independent_and_unique() {
        assert_eq!(edge_key(3, 9), edge_key(9, 3));
        assert_ne!(edge_key(0, 1), edge_key(1, 2));
        assert_eq!(edge_key(0, u32::MAX), u32::MAX as u64);
    }

    #[test]
    fn test_both_directions_never_both_true() {
        let mut rng = rand::rng();
        let mut set = EdgeSet::with_capacity(64);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let i = rng.random_range(0..20u32);
            let j = rng.random_range(0..20u32);
            let forward = set.should_add_edge(i, j);
            let backward = set.should_add_edge(j, i);
            assert!(!(forward && backward), "edge {i}-{j} reported twice");
            let first = seen.insert((i.min(j), i.max(j)));
            assert_eq!(forward, first);
        }
    }
}
