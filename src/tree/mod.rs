//! Space-partitioning trees over a [`PointSet`].
//!
//! A tree recursively splits its points into nodes. Each node knows a
//! bounding region, the points below it and a center, and can bound the
//! distance between any of its points and any point of another node. The
//! dual-tree traversal only ever talks to trees through [`SpatialTree`] and
//! the [`Node`] view built on top of it.
//!
//! - [`KdTree`] - axis-aligned rectangles; rearranges its dataset so every node
//!   owns a contiguous run of points
//! - [`BallTree`] - bounding balls; leaves the dataset untouched and maps nodes
//!   onto it through an index list

mod ball;
mod kd;

pub use ball::BallTree;
pub use kd::KdTree;

use crate::metric::Metric;
use crate::points::PointSet;

/// Index of a node in its tree's arena.
pub type NodeId = usize;

/// Default maximum number of points held by a leaf.
pub const DEFAULT_LEAF_SIZE: usize = 20;

/// The interface the dual-tree machinery needs from a spatial tree.
///
/// Nodes live in an arena owned by the tree and are addressed by [`NodeId`];
/// the root is always node `0`. A node with no children is a leaf. The
/// descendants of a node's children partition the node's own descendants.
pub trait SpatialTree: Sized {
    /// The metric bounds are computed under.
    type Metric: Metric;

    /// Whether [`build`](SpatialTree::build) reorders the points it is given.
    const REARRANGES_DATASET: bool;

    /// Builds a tree over `dataset`.
    ///
    /// Returns the tree and, for trees that rearrange their dataset, the
    /// `old_from_new` permutation: point `i` of [`dataset`](SpatialTree::dataset)
    /// was point `old_from_new[i]` of the input. Trees that keep the input
    /// order return an empty permutation.
    fn build(dataset: PointSet, metric: Self::Metric) -> (Self, Vec<usize>);

    /// The points the tree was built over, in tree storage order.
    fn dataset(&self) -> &PointSet;

    /// The metric used for node bounds.
    fn metric(&self) -> &Self::Metric;

    /// Total number of nodes.
    fn num_nodes(&self) -> usize;

    /// The children of `node`; empty for leaves.
    fn children(&self, node: NodeId) -> &[NodeId];

    /// The parent of `node`, or `None` for the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Number of points anywhere below `node`.
    fn num_descendants(&self, node: NodeId) -> usize;

    /// Dataset index of the `i`-th descendant point of `node`.
    fn descendant(&self, node: NodeId, i: usize) -> usize;

    /// Number of points held directly by `node` (zero for internal nodes).
    fn num_points(&self, node: NodeId) -> usize;

    /// Dataset index of the `i`-th point held directly by `node`.
    fn point(&self, node: NodeId, i: usize) -> usize;

    /// A representative point inside the bound of `node`.
    fn center(&self, node: NodeId) -> &[f64];

    /// Lower bound on the distance between any point under `node` and any
    /// point under `other_node` of `other`.
    fn min_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64;

    /// Upper bound on the same distance.
    fn max_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64;

    /// The root node.
    fn root(&self) -> Node<'_, Self> {
        Node { tree: self, id: 0 }
    }

    /// A view of an arbitrary node.
    fn node(&self, id: NodeId) -> Node<'_, Self> {
        Node { tree: self, id }
    }
}

/// A borrowed view of one node of a [`SpatialTree`].
#[derive(Debug)]
pub struct Node<'t, T> {
    tree: &'t T,
    id: NodeId,
}

impl<T> Clone for Node<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Node<'_, T> {}

impl<'t, T: SpatialTree> Node<'t, T> {
    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(self) -> &'t T {
        self.tree
    }

    /// The arena index of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(self) -> bool {
        self.tree.children(self.id).is_empty()
    }

    /// Iterates over the child nodes.
    pub fn children(self) -> impl ExactSizeIterator<Item = Node<'t, T>> {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// The parent node, or `None` at the root.
    #[must_use]
    pub fn parent(self) -> Option<Node<'t, T>> {
        self.tree.parent(self.id).map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Number of points below this node.
    #[must_use]
    pub fn num_descendants(self) -> usize {
        self.tree.num_descendants(self.id)
    }

    /// Dataset index of the `i`-th point below this node.
    #[must_use]
    pub fn descendant(self, i: usize) -> usize {
        self.tree.descendant(self.id, i)
    }

    /// Iterates over the dataset indices of every point below this node.
    pub fn descendants(self) -> impl ExactSizeIterator<Item = usize> + 't {
        let Node { tree, id } = self;
        (0..tree.num_descendants(id)).map(move |i| tree.descendant(id, i))
    }

    /// Number of points held directly; zero for interior nodes.
    #[must_use]
    pub fn num_points(self) -> usize {
        self.tree.num_points(self.id)
    }

    /// Dataset index of the `i`-th point held directly.
    #[must_use]
    pub fn point(self, i: usize) -> usize {
        self.tree.point(self.id, i)
    }

    /// The node's center.
    #[must_use]
    pub fn center(self) -> &'t [f64] {
        self.tree.center(self.id)
    }

    /// Lower bound on the distance between points of `self` and points of `other`.
    #[must_use]
    pub fn min_distance(self, other: Node<'_, T>) -> f64 {
        self.tree.min_distance(self.id, other.tree, other.id)
    }

    /// Upper bound on the distance between points of `self` and points of `other`.
    #[must_use]
    pub fn max_distance(self, other: Node<'_, T>) -> f64 {
        self.tree.max_distance(self.id, other.tree, other.id)
    }
}
