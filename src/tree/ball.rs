//! A ball tree built by two-pole partitioning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DEFAULT_LEAF_SIZE, NodeId, SpatialTree};
use crate::error::{Error, Result};
use crate::metric::{EuclideanDistance, Metric};
use crate::points::PointSet;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct BallNode {
    /// First slot of this node in the index list.
    begin: usize,
    count: usize,
    center: Vec<f64>,
    radius: f64,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// A tree of nested bounding balls.
///
/// Each node is the ball around the centroid of its points whose radius
/// reaches the farthest of them. A node is split by picking the point `l`
/// farthest from the centroid and the point `r` farthest from `l`, then
/// sending every point to whichever pole is closer (ties go to `l`).
///
/// Ball bounds only need the triangle inequality, so any [`Metric`] works.
/// The dataset keeps its input order; nodes address it through an internal
/// index list, and [`build`](SpatialTree::build) returns an empty
/// permutation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BallTree<M = EuclideanDistance> {
    dataset: PointSet,
    metric: M,
    indices: Vec<usize>,
    nodes: Vec<BallNode>,
    leaf_size: usize,
}

impl<M: Metric> BallTree<M> {
    /// Builds a ball tree whose leaves hold at most `leaf_size` points.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLeafSize` if `leaf_size` is zero.
    pub fn with_leaf_size(dataset: PointSet, metric: M, leaf_size: usize) -> Result<Self> {
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

    /// Radius of `node`'s bounding ball.
    #[must_use]
    pub fn radius(&self, node: NodeId) -> f64 {
        self.nodes[node].radius
    }

    fn build_with(dataset: PointSet, metric: M, leaf_size: usize) -> Self {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        let mut nodes = Vec::new();
        let len = indices.len();
        let mut builder = Partitioner {
            dataset: &dataset,
            metric: &metric,
            leaf_size,
            nodes: &mut nodes,
        };
        builder.split(&mut indices, 0, len, None);

        trace_debug!(
            points = dataset.len(),
            nodes = nodes.len(),
            leaf_size,
            "built ball tree"
        );

        Self {
            dataset,
            metric,
            indices,
            nodes,
            leaf_size,
        }
    }
}

struct Partitioner<'b, M> {
    dataset: &'b PointSet,
    metric: &'b M,
    leaf_size: usize,
    nodes: &'b mut Vec<BallNode>,
}

impl<M: Metric> Partitioner<'_, M> {
    fn farthest_from(&self, from: &[f64], indices: &[usize]) -> (usize, f64) {
        indices
            .iter()
            .map(|&i| (i, self.metric.evaluate(from, self.dataset.point(i))))
            .fold((indices[0], 0.0), |best, cand| if cand.1 > best.1 { cand } else { best })
    }

    #[allow(clippy::cast_precision_loss)]
    fn centroid(&self, indices: &[usize]) -> Vec<f64> {
        let mut center = vec![0.0; self.dataset.dim()];
        if indices.is_empty() {
            return center;
        }
        for &i in indices {
            for (c, x) in center.iter_mut().zip(self.dataset.point(i)) {
                *c += x;
            }
        }
        let n = indices.len() as f64;
        for c in &mut center {
            *c /= n;
        }
        center
    }

    fn split(
        &mut self,
        indices: &mut [usize],
        begin: usize,
        end: usize,
        parent: Option<NodeId>,
    ) -> NodeId {
        let members = &indices[begin..end];
        let center = self.centroid(members);
        let (left_pole, radius) = if members.is_empty() {
            (0, 0.0)
        } else {
            self.farthest_from(&center, members)
        };

        let id = self.nodes.len();
        self.nodes.push(BallNode {
            begin,
            count: end - begin,
            center,
            radius,
            children: Vec::new(),
            parent,
        });

        if end - begin <= self.leaf_size || radius <= 0.0 {
            return id;
        }

        let left_point = self.dataset.point(left_pole);
        let (right_pole, _) = self.farthest_from(left_point, members);
        let right_point = self.dataset.point(right_pole);

        let slice = &mut indices[begin..end];
        let mut left = 0;
        for i in 0..slice.len() {
            let p = self.dataset.point(slice[i]);
            if self.metric.evaluate(left_point, p) <= self.metric.evaluate(right_point, p) {
                slice.swap(i, left);
                left += 1;
            }
        }
        if left == 0 || left == slice.len() {
            return id;
        }

        let mid = begin + left;
        let left_child = self.split(indices, begin, mid, Some(id));
        let right_child = self.split(indices, mid, end, Some(id));
        self.nodes[id].children = vec![left_child, right_child];
        id
    }
}

impl<M: Metric> SpatialTree for BallTree<M> {
    type Metric = M;

    const REARRANGES_DATASET: bool = false;

    fn build(dataset: PointSet, metric: M) -> (Self, Vec<usize>) {
        (Self::build_with(dataset, metric, DEFAULT_LEAF_SIZE), Vec::new())
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
        self.indices[self.nodes[node].begin + i]
    }

    fn num_points(&self, node: NodeId) -> usize {
        let node = &self.nodes[node];
        if node.children.is_empty() { node.count } else { 0 }
    }

    fn point(&self, node: NodeId, i: usize) -> usize {
        self.indices[self.nodes[node].begin + i]
    }

    fn center(&self, node: NodeId) -> &[f64] {
        &self.nodes[node].center
    }

    fn min_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64 {
        let (a, b) = (&self.nodes[node], &other.nodes[other_node]);
        let between = self.metric.evaluate(&a.center, &b.center);
        (between - a.radius - b.radius).max(0.0)
    }

    fn max_distance(&self, node: NodeId, other: &Self, other_node: NodeId) -> f64 {
        let (a, b) = (&self.nodes[node], &other.nodes[other_node]);
        self.metric.evaluate(&a.center, &b.center) + a.radius + b.radius
    }
}
