use super::{Rules, TraversalInfo, is_pruned, sort_by_score};
use crate::tree::{Node, NodeId, SpatialTree};

/// Walks the reference tree once per query point, depth first.
///
/// Children are scored with [`Rules::score_point`] when their parent is
/// expanded and visited lowest score first; leaves run
/// [`Rules::base_case`] against each of their points.
#[derive(Debug)]
pub struct SingleTreeTraverser<'r, R> {
    rules: &'r mut R,
    num_visited: usize,
    num_prunes: usize,
    num_base_cases: usize,
}

impl<'r, R> SingleTreeTraverser<'r, R> {
    /// Creates a traverser bound to `rules`.
    #[must_use]
    pub fn new(rules: &'r mut R) -> Self {
        Self {
            rules,
            num_visited: 0,
            num_prunes: 0,
            num_base_cases: 0,
        }
    }

    /// Traverses the reference tree for the query point `query_index`.
    pub fn traverse<T>(&mut self, query_index: usize, reference_root: Node<'_, T>)
    where
        T: SpatialTree,
        R: Rules<T>,
    {
        let tree = reference_root.tree();
        let mut info = TraversalInfo::default();
        let mut stack: Vec<(NodeId, f64)> = Vec::new();

        let score = self.rules.score_point(query_index, reference_root, &mut info);
        if is_pruned(score) {
            self.num_prunes += 1;
            return;
        }
        stack.push((reference_root.id(), score));

        while let Some((id, old_score)) = stack.pop() {
            let node = tree.node(id);
            if is_pruned(self.rules.rescore_point(query_index, node, old_score)) {
                self.num_prunes += 1;
                continue;
            }
            self.num_visited += 1;

            if node.is_leaf() {
                for i in 0..node.num_points() {
                    self.rules.base_case(query_index, node.point(i));
                    self.num_base_cases += 1;
                }
                continue;
            }

            let mut children = Vec::with_capacity(node.children().len());
            for child in node.children() {
                let score = self.rules.score_point(query_index, child, &mut info);
                if is_pruned(score) {
                    self.num_prunes += 1;
                } else {
                    children.push((child.id(), score));
                }
            }
            sort_by_score(&mut children);
            stack.extend(children.into_iter().rev());
        }
    }

    /// The rules this traverser drives.
    #[must_use]
    pub fn rules(&self) -> &R {
        self.rules
    }

    /// Number of reference nodes visited.
    #[must_use]
    pub fn num_visited(&self) -> usize {
        self.num_visited
    }

    /// Number of reference nodes the rules pruned.
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
