//! Pruning rules for kernel density estimation.

use crate::kernel::Kernel;
use crate::metric::Metric;
use crate::points::PointSet;
use crate::traversal::{PRUNE, Rules, TraversalInfo};
use crate::tree::{Node, SpatialTree};

/// Accumulates kernel sums for every query point while deciding which node
/// pairs can be replaced by a point mass.
///
/// A reference node is collapsed onto its center for a whole query node when
/// the kernel values it can produce over that pair differ by at most
/// `tolerance / |R|`. Because kernels never increase with distance that spread
/// is `K(min_distance) - K(max_distance)`.
///
/// Sums are written to `densities[old_from_new[q]]` when a permutation is
/// supplied and to `densities[q]` otherwise. Nothing is normalized here.
#[derive(Debug)]
pub struct KdeRules<'a, M, K> {
    reference_set: &'a PointSet,
    query_set: &'a PointSet,
    densities: &'a mut [f64],
    old_from_new: &'a [usize],
    threshold: f64,
    metric: &'a M,
    kernel: &'a K,
    base_cases: usize,
    scores: usize,
}

impl<'a, M: Metric, K: Kernel> KdeRules<'a, M, K> {
    /// Creates rules writing into `densities`, which must hold one slot per
    /// query point.
    ///
    /// `tolerance` is the total error budget; each reference point may
    /// contribute at most `tolerance / reference_set.len()` of it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(
        reference_set: &'a PointSet,
        query_set: &'a PointSet,
        densities: &'a mut [f64],
        metric: &'a M,
        kernel: &'a K,
        tolerance: f64,
    ) -> Self {
        Self {
            reference_set,
            query_set,
            densities,
            old_from_new: &[],
            threshold: tolerance / reference_set.len().max(1) as f64,
            metric,
            kernel,
            base_cases: 0,
            scores: 0,
        }
    }

    /// Routes query index `q` to `densities[old_from_new[q]]`.
    #[must_use]
    pub fn with_permutation(mut self, old_from_new: &'a [usize]) -> Self {
        self.old_from_new = old_from_new;
        self
    }

    /// The per-pair spread below which a node pair is pruned.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of base cases computed.
    #[must_use]
    pub fn base_cases(&self) -> usize {
        self.base_cases
    }

    /// Number of scores computed.
    #[must_use]
    pub fn scores(&self) -> usize {
        self.scores
    }

    fn slot(&self, query_index: usize) -> usize {
        if self.old_from_new.is_empty() {
            query_index
        } else {
            self.old_from_new[query_index]
        }
    }
}

impl<M: Metric, K: Kernel, T: SpatialTree> Rules<T> for KdeRules<'_, M, K> {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64 {
        let distance = self.metric.evaluate(
            self.query_set.point(query_index),
            self.reference_set.point(reference_index),
        );
        let slot = self.slot(query_index);
        self.densities[slot] += self.kernel.evaluate(distance);
        self.base_cases += 1;
        distance
    }

    /// Never prunes: a single point has no spread to bound against.
    fn score_point(&mut self, _: usize, _: Node<'_, T>, info: &mut TraversalInfo) -> f64 {
        self.scores += 1;
        info.record_score(0, 0, 0.0);
        0.0
    }

    fn rescore_point(&mut self, _: usize, _: Node<'_, T>, old_score: f64) -> f64 {
        old_score
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&mut self, query: Node<'_, T>, reference: Node<'_, T>, info: &mut TraversalInfo) -> f64 {
        let min_distance = query.min_distance(reference);
        let max_distance = query.max_distance(reference);
        let bound = self.kernel.evaluate(min_distance) - self.kernel.evaluate(max_distance);

        let score = if bound <= self.threshold {
            let mass = reference.num_descendants() as f64;
            let center = reference.center();
            for query_index in query.descendants() {
                let distance = self.metric.evaluate(self.query_set.point(query_index), center);
                let slot = self.slot(query_index);
                self.densities[slot] += mass * self.kernel.evaluate(distance);
            }
            PRUNE
        } else {
            min_distance
        };

        self.scores += 1;
        info.record_score(query.id(), reference.id(), score);
        score
    }

    /// A pruned pair stays pruned; nothing is re-evaluated.
    fn rescore(&mut self, _: Node<'_, T>, _: Node<'_, T>, old_score: f64) -> f64 {
        old_score
    }
}
