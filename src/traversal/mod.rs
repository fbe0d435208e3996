//! Generic tree traversals driven by pluggable pruning rules.
//!
//! A traverser walks node pairs (or query-point/node pairs) and asks a
//! [`Rules`] implementation at every step whether the pair can be pruned.
//! The rules do all of the domain work; the traverser only decides visit
//! order and bookkeeping.

mod dual;
mod single;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use dual::DualTreeTraverser;
pub use single::SingleTreeTraverser;

use crate::tree::{Node, NodeId, SpatialTree};

/// Score returned by a rule to stop recursion into a pair.
pub const PRUNE: f64 = f64::MAX;

/// Order in which node pairs are taken off the worklist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraversalOrder {
    /// Last-in first-out: finish a subtree pair before its siblings.
    #[default]
    DepthFirst,
    /// First-in first-out: finish a level before descending.
    BreadthFirst,
}

impl TraversalOrder {
    /// Returns `true` for [`TraversalOrder::BreadthFirst`].
    #[must_use]
    pub fn is_breadth_first(self) -> bool {
        self == Self::BreadthFirst
    }
}

/// Per-traversal record of the most recent score.
///
/// Created fresh by a traverser for every traversal and handed to the rules
/// alongside each scored pair, so rules themselves carry no hidden cache.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TraversalInfo {
    last_query_node: Option<NodeId>,
    last_reference_node: Option<NodeId>,
    last_score: f64,
}

impl TraversalInfo {
    /// Remembers the pair that was just scored.
    pub fn record_score(&mut self, query: NodeId, reference: NodeId, score: f64) {
        self.last_query_node = Some(query);
        self.last_reference_node = Some(reference);
        self.last_score = score;
    }

    /// Query node of the most recently scored pair.
    #[must_use]
    pub fn last_query_node(&self) -> Option<NodeId> {
        self.last_query_node
    }

    /// Reference node of the most recently scored pair.
    #[must_use]
    pub fn last_reference_node(&self) -> Option<NodeId> {
        self.last_reference_node
    }

    /// Score of the most recently scored pair.
    #[must_use]
    pub fn last_score(&self) -> f64 {
        self.last_score
    }
}

/// Pruning rules consulted by [`DualTreeTraverser`] and [`SingleTreeTraverser`].
///
/// Point indices refer to the datasets of the trees being traversed. A score
/// equal to [`PRUNE`] tells the traverser to skip the pair entirely; any
/// other score is a priority, lower values being visited first.
pub trait Rules<T: SpatialTree> {
    /// Exact work between one query point and one reference point.
    ///
    /// Returns the distance between the two points.
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64;

    /// Scores a query point against a reference node.
    fn score_point(
        &mut self,
        query_index: usize,
        reference: Node<'_, T>,
        info: &mut TraversalInfo,
    ) -> f64;

    /// Re-evaluates a point/node score when the pair is taken off the worklist.
    fn rescore_point(&mut self, query_index: usize, reference: Node<'_, T>, old_score: f64) -> f64;

    /// Scores a query node against a reference node.
    fn score(&mut self, query: Node<'_, T>, reference: Node<'_, T>, info: &mut TraversalInfo) -> f64;

    /// Re-evaluates a node/node score when the pair is taken off the worklist.
    fn rescore(&mut self, query: Node<'_, T>, reference: Node<'_, T>, old_score: f64) -> f64;
}

fn is_pruned(score: f64) -> bool {
    score >= PRUNE
}

/// Orders scored work items lowest score first.
fn sort_by_score<W>(items: &mut [(W, f64)]) {
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
}
