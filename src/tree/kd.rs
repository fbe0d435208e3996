//! A kd-tree with tight hyper-rectangle bounds and midpoint splits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DEFAULT_LEAF_SIZE, NodeId, SpatialTree};
use crate::error::{Error, Result};
use crate::metric::{EuclideanDistance, NormMetric};
use crate::points::PointSet;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct KdNode {
    /// First point of this node in the rearranged dataset.
    begin: usize,
    count: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Midpoint of the bound.
    center: Vec<f64>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// A kd-tree that rearranges its dataset into depth-first order.
///
/// Each node is bounded by the smallest axis-aligned box containing its
/// points. Internal nodes split at the midpoint of the box's widest side;
/// splitting stops once a node holds at most `leaf_size` points or all of its
/// points coincide. After construction every node's points form the
/// contiguous run `begin..begin + count` of [`dataset`](SpatialTree::dataset).
///
/// # Examples
///
/// ```
/// use dualtree_kde::PointSet;
/// use dualtree_kde::metric::EuclideanDistance;
/// use dualtree_kde::tree::{KdTree, SpatialTree};
///
/// let points = PointSet::from_points(vec![vec![3.0], vec![1.0], vec![2.0]]).unwrap();
/// let (tree, old_from_new) = KdTree::with_leaf_size(points, EuclideanDistance, 1).unwrap();
///
/// assert_eq!(tree.root().num_descendants(), 3);
/// // Point `i` of the tree's dataset was point `old_from_new[i]` of the input.
/// assert_eq!(old_from_new.len(), 3);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KdTree<M = EuclideanDistance> {
    dataset: PointSet,
    metric: M,
    nodes: Vec<KdNode>,
    leaf_size: usize,
}

impl<M: NormMetric> KdTree<M> {
    /// Builds a kd-tree whose leaves hold at most `leaf_size` points.
    ///
    /// Returns the tree and its `old_from_new` permutation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLeafSize` if `leaf_size` is zero.
    pub fn with_leaf_size(
        dataset: PointSet,
        metric: M,
        leaf_size: usize,
    ) -> Result<(Self, Vec<usize>)> {
        if leaf_size == 0 {
            return Err(Error::InvalidLeafSize);
        }
        Ok(Self::build_with(dataset, metric, leaf_size))
    }

    /// Maximum number of points per leaf.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    fn build_with(dataset: PointSet, metric: M, leaf_size: usize) -> (Self, Vec<usize>) {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        let mut nodes = Vec::new();
        split_node(&dataset, &mut order, 0, dataset.len(), None, leaf_size, &mut nodes);

        trace_debug!(
            points = dataset.len(),
            nodes = nodes.len(),
            leaf_size,
            "built kd-tree"
        );

        let tree = Self {
            dataset: dataset.permuted(&order),
            metric,
            nodes,
            leaf_size,
        };
        (tree, order)
    }
}

/// Tight bounding box of `order[begin..end]`.
fn bounding_box(dataset: &PointSet, order: &[usize]) -> (Vec<f64>, Vec<f64>) {
    if order.is_empty() {
        return (vec![0.0; dataset.dim()], vec![0.0; dataset.dim()]);
    }
    let mut lower = vec![f64::INFINITY; dataset.dim()];
    let mut upper = vec![f64::NEG_INFINITY; dataset.dim()];
    for &index in order {
        for (d, &x) in dataset.point(index).iter().enumerate() {
            lower[d] = lower[d].min(x);
            upper[d] = upper[d].max(x);
        }
    }
    (lower, upper)
}

fn split_node(
    dataset: &PointSet,
    order: &mut [usize],
    begin: usize,
    end: usize,
    parent: Option<NodeId>,
    leaf_size: usize,
    nodes: &mut Vec<KdNode>,
) -> NodeId {
    let (lower, upper) = bounding_box(dataset, &order[begin..end]);
    let center = lower.iter().zip(&upper).map(|(lo, hi)| 0.5 * (lo + hi)).collect();

    let id = nodes.len();
    nodes.push(KdNode {
        begin,
        count: end - begin,
        lower,
        upper,
        center,
        children: Vec::new(),
        parent,
    });

    if end - begin <= leaf_size {
        return id;
    }

    // Widest dimension of the box.
    let node = &nodes[id];
    let (split_dim, width) = node
        .lower
        .iter()
        .zip(&node.upper)
        .map(|(lo, hi)| hi - lo)
        .enumerate()
        .fold((0, 0.0), |best, (d, w)| if w > best.1 { (d, w) } else { best });
    if width <= 0.0 {
        return id;
    }
    let split_value = node.center[split_dim];

    // Partition in place: coordinates below the midpoint go left.
    let slice = &mut order[begin..end];
    let mut left = 0;
    for i in 0..slice.len() {
        if dataset.point(slice[i])[split_dim] < split_value {
            slice.swap(i, left);
            left += 1;
        }
    }
    if left == 0 || left == slice.len() {
        return id;
    }

    let mid = begin + left;
    let left_child = split_node(dataset, order, begin, mid, Some(id), leaf_size, nodes);
    let right_child = split_node(dataset, order, mid, end, Some(id), leaf_size, nodes);
    nodes[id].children = vec![left_child, right_child];
    id
}

impl<M: NormMetric> SpatialTree for KdTree<M> {
    type Metric = M;

    const REARRANGES_DATASET: bool = true;

    fn build(dataset: PointSet, metric: M) -> (Self, Vec<usize>) {
        Self::build_with(dataset, metric, DEFAULT_LEAF_SIZE)
    }

    fn dataset(&self) -> &PointSet {
        &self.dataset
    }

    fn metric(&self) -> &M {
        &self.metric
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn num_descendants(&self, node: NodeId) -> usize {
        self.nodes[node].count
    }

    fn descendant(&self, node: NodeId, i: usize) -> usize {
        self.nodes[node].begin + i
    }

    fn num_points(&self, node: NodeId) -> usize {
        let node = &self.nodes[node];
        if node.children.is_empty() { node.count } else { 0 }
    }

    fn point(&self, node: NodeId, i: usize) -> usize {
        self.nodes[node].begin + i
    }

    fn center(&self, node: NodeId) -> &[f64] {
        &self.nodes[node].center
    }

    fn min_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64 {
        let (a, b) = (&self.nodes[node], &other.nodes[other_node]);
        let gaps = (0..a.lower.len()).map(|d| {
            (b.lower[d] - a.upper[d])
                .max(a.lower[d] - b.upper[d])
                .max(0.0)
        });
        self.metric.norm(gaps)
    }

    fn max_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64 {
        let (a, b) = (&self.nodes[node], &other.nodes[other_node]);
        let spans = (0..a.lower.len()).map(|d| {
            (a.upper[d] - b.lower[d])
                .abs()
                .max((b.upper[d] - a.lower[d]).abs())
        });
        self.metric.norm(spans)
    }
}
