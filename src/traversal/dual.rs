use std::collections::VecDeque;

use super::{Rules, TraversalInfo, TraversalOrder, is_pruned, sort_by_score};
use crate::tree::{Node, NodeId, SpatialTree};

/// Walks a query tree and a reference tree together.
///
/// Pairs of nodes live on one explicit worklist, used as a stack for
/// [`TraversalOrder::DepthFirst`] and as a queue for
/// [`TraversalOrder::BreadthFirst`]. When a pair is expanded, every child
/// pair (a leaf stands in for itself) is scored immediately; pruned pairs are
/// dropped, the rest join the worklist lowest score first. A pair is
/// rescored when it leaves the worklist. Two leaves are never scored: their
/// points are handed to [`Rules::base_case`] one pair at a time.
///
/// Every point pair is therefore either base-cased once or covered by
/// exactly one pruned ancestor pair, in both orders.
#[derive(Debug)]
pub struct DualTreeTraverser<'r, R> {
    rules: &'r mut R,
    order: TraversalOrder,
    num_visited: usize,
    num_prunes: usize,
    num_base_cases: usize,
}

impl<'r, R> DualTreeTraverser<'r, R> {
    /// Creates a traverser bound to `rules`.
    #[must_use]
    pub fn new(rules: &'r mut R, order: TraversalOrder) -> Self {
        Self {
            rules,
            order,
            num_visited: 0,
            num_prunes: 0,
            num_base_cases: 0,
        }
    }

    /// Runs a full traversal from the two roots.
    pub fn traverse<T>(&mut self, query_root: Node<'_, T>, reference_root: Node<'_, T>)
    where
        T: SpatialTree,
        R: Rules<T>,
    {
        let (query_tree, reference_tree) = (query_root.tree(), reference_root.tree());
        let mut info = TraversalInfo::default();
        let mut worklist: VecDeque<(NodeId, NodeId, f64)> = VecDeque::new();

        if let Some(score) = self.score_pair(query_root, reference_root, &mut info) {
            worklist.push_back((query_root.id(), reference_root.id(), score));
        }

        while let Some((q, r, old_score)) = self.next(&mut worklist) {
            let (query, reference) = (query_tree.node(q), reference_tree.node(r));

            if query.is_leaf() && reference.is_leaf() {
                self.num_visited += 1;
                self.base_cases(query, reference);
                continue;
            }

            if is_pruned(self.rules.rescore(query, reference, old_score)) {
                self.num_prunes += 1;
                continue;
            }
            self.num_visited += 1;

            let mut pairs = Vec::new();
            for query_child in expand(query) {
                for reference_child in expand(reference) {
                    if let Some(score) = self.score_pair(query_child, reference_child, &mut info) {
                        pairs.push(((query_child.id(), reference_child.id()), score));
                    }
                }
            }
            sort_by_score(&mut pairs);

            let pairs = pairs.into_iter().map(|((q, r), score)| (q, r, score));
            match self.order {
                // Pushed in reverse so the lowest score is popped first.
                TraversalOrder::DepthFirst => worklist.extend(pairs.rev()),
                TraversalOrder::BreadthFirst => worklist.extend(pairs),
            }
        }
    }

    fn next(&self, worklist: &mut VecDeque<(NodeId, NodeId, f64)>) -> Option<(NodeId, NodeId, f64)> {
        match self.order {
            TraversalOrder::DepthFirst => worklist.pop_back(),
            TraversalOrder::BreadthFirst => worklist.pop_front(),
        }
    }

    /// Scores a pair, returning `None` if the rules pruned it.
    fn score_pair<T>(
        &mut self,
        query: Node<'_, T>,
        reference: Node<'_, T>,
        info: &mut TraversalInfo,
    ) -> Option<f64>
    where
        T: SpatialTree,
        R: Rules<T>,
    {
        if query.is_leaf() && reference.is_leaf() {
            return Some(query.min_distance(reference));
        }
        let score = self.rules.score(query, reference, info);
        if is_pruned(score) {
            self.num_prunes += 1;
            None
        } else {
            Some(score)
        }
    }

    fn base_cases<T>(&mut self, query: Node<'_, T>, reference: Node<'_, T>)
    where
        T: SpatialTree,
        R: Rules<T>,
    {
        for i in 0..query.num_points() {
            let query_index = query.point(i);
            for j in 0..reference.num_points() {
                self.rules.base_case(query_index, reference.point(j));
                self.num_base_cases += 1;
            }
        }
    }

    /// The rules this traverser drives.
    #[must_use]
    pub fn rules(&self) -> &R {
        self.rules
    }

    /// The configured visit order.
    #[must_use]
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    /// Number of node pairs expanded or base-cased.
    #[must_use]
    pub fn num_visited(&self) -> usize {
        self.num_visited
    }

    /// Number of node pairs the rules pruned.
    #[must_use]
    pub fn num_prunes(&self) -> usize {
        self.num_prunes
    }

    /// Number of base cases run.
    #[must_use]
    pub fn num_base_cases(&self) -> usize {
        self.num_base_cases
    }
}

/// The nodes a side contributes when its pair is expanded.
fn expand<T: SpatialTree>(node: Node<'_, T>) -> Vec<Node<'_, T>> {
    if node.is_leaf() {
        vec![node]
    } else {
        node.children().collect()
    }
}
