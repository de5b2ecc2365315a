//! Burkhard–Keller tree: a metric-space index for bounded-radius queries.
//!
//! The tree is generic over the stored value and the metric. Every edge to
//! a child is labeled with the child's distance to its parent; a query at
//! radius `r` only descends into children whose edge label lies within
//! `[k - r, k + r]` of the probe's distance `k` to the node, which the
//! triangle inequality guarantees is exhaustive.
//!
//! Nodes own their children uniquely, so the structure is a strict tree
//! and drops without any cycle concerns. It is single-owner and makes no
//! attempt to be thread-safe.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A distance function over `V`.
///
/// BK-tree queries are only correct when `distance` satisfies the triangle
/// inequality (both Hamming distance and its per-frame mean do).
pub trait Metric<V> {
    /// Distance between two values. Must be symmetric, zero on identical
    /// values, and triangle-inequality compliant.
    fn distance(&self, a: &V, b: &V) -> u32;
}

struct Node<V> {
    value: V,
    children: HashMap<u32, Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            children: HashMap::new(),
        }
    }
}

/// A BK-tree over values of type `V` under metric `M`.
pub struct BkTree<V, M: Metric<V>> {
    root: Option<Box<Node<V>>>,
    metric: M,
    len: usize,
}

impl<V, M: Metric<V>> BkTree<V, M> {
    /// Create an empty tree using `metric`.
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self {
            root: None,
            metric,
            len: 0,
        }
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert a value.
    ///
    /// Values at distance zero from an existing entry chain along the
    /// 0-edge, so duplicates are kept, not collapsed.
    pub fn insert(&mut self, value: V) {
        self.len += 1;

        let mut current = match self.root.as_mut() {
            Some(root) => root,
            None => {
                self.root = Some(Box::new(Node::new(value)));
                return;
            }
        };
        loop {
            let dist = self.metric.distance(&current.value, &value);
            match current.children.entry(dist) {
                Entry::Occupied(entry) => current = entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(Box::new(Node::new(value)));
                    return;
                }
            }
        }
    }

    /// Collect every stored value within `radius` of `target`, excluding
    /// those for which `skip` returns true.
    ///
    /// The skip predicate is how the pipelines keep already-grouped files
    /// out of later groups. An empty tree yields an empty result.
    pub fn query<'a, F>(&'a self, target: &V, radius: u32, skip: F) -> Vec<&'a V>
    where
        F: Fn(&V) -> bool,
    {
        let mut matches = Vec::new();
        if let Some(root) = self.root.as_deref() {
            self.query_node(root, target, radius, &skip, &mut matches);
        }
        matches
    }

    fn query_node<'a, F>(
        &'a self,
        node: &'a Node<V>,
        target: &V,
        radius: u32,
        skip: &F,
        matches: &mut Vec<&'a V>,
    ) where
        F: Fn(&V) -> bool,
    {
        let dist = self.metric.distance(target, &node.value);
        if dist <= radius && !skip(&node.value) {
            matches.push(&node.value);
        }

        // Saturating bounds: the sentinel distance for unreadable values is
        // u32::MAX and must not wrap the interval.
        let low = dist.saturating_sub(radius);
        let high = dist.saturating_add(radius);
        for (&edge, child) in &node.children {
            if edge >= low && edge <= high {
                self.query_node(child, target, radius, skip, matches);
            }
        }
    }
}
