use super::builder::KdeBuilder;
use super::rules::KdeRules;
use crate::error::{Error, Result};
use crate::held::Held;
use crate::kernel::{GaussianKernel, Kernel};
use crate::metric::{EuclideanDistance, Metric};
use crate::points::PointSet;
use crate::traversal::{DualTreeTraverser, SingleTreeTraverser, TraversalOrder};
use crate::tree::{KdTree, SpatialTree};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative error tolerance used when none is given.
pub const DEFAULT_RELATIVE_ERROR: f64 = 1e-6;

/// Absolute error tolerance used when none is given.
pub const DEFAULT_ABSOLUTE_ERROR: f64 = 0.0;

/// Validates a pair of error tolerances.
///
/// Both tolerances feed one pruning budget, so a warning is logged when both
/// are positive.
pub(crate) fn check_error_values(relative_error: f64, absolute_error: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&relative_error) {
        return Err(Error::InvalidRelativeError(relative_error));
    }
    if absolute_error.is_nan() || absolute_error < 0.0 {
        return Err(Error::InvalidAbsoluteError(absolute_error));
    }
    if relative_error > 0.0 && absolute_error > 0.0 {
        trace_warn!(
            relative_error,
            absolute_error,
            "relative and absolute error tolerances are both positive and will be added together"
        );
    }
    Ok(())
}

/// A kernel density estimator accelerated by dual-tree traversal.
///
/// The estimator is generic over the metric `M`, the kernel `K` and the tree
/// type `T`. Kernel and metric are either owned or borrowed from the caller
/// (see [`Held`]); so is the reference tree, which is owned when built by
/// [`train`](Self::train) and borrowed when supplied to
/// [`train_with_tree`](Self::train_with_tree).
///
/// The density at a query point `q` is
/// `(1 / |R|) · Σ_r K(d(q, r))`, further divided by the kernel's normalizer
/// for kernels that report [`Kernel::IS_NORMALIZED`]. Node pairs whose kernel
/// values cannot differ by more than `(relative_error + absolute_error) / |R|`
/// are approximated by a point mass at the reference node's center.
///
/// `Default` gives an untrained estimator with default kernel and metric, so
/// `core::mem::take` moves an estimator out and leaves a fresh one behind.
///
/// # Examples
///
/// ```
/// use dualtree_kde::prelude::*;
///
/// let reference = PointSet::from_points(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// let query = PointSet::from_points(vec![vec![0.5, 0.5]]).unwrap();
///
/// let mut kde: Kde = Kde::builder().bandwidth(0.8).relative_error(0.0).build().unwrap();
/// kde.train(reference).unwrap();
///
/// let densities = kde.evaluate(&query).unwrap();
/// assert_eq!(densities.len(), 1);
/// assert!(densities[0] > 0.0);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kde<'a, M = EuclideanDistance, K = GaussianKernel, T = KdTree<M>> {
    relative_error: f64,
    absolute_error: f64,
    traversal: TraversalOrder,
    trained: bool,
    kernel: Held<'a, K>,
    metric: Held<'a, M>,
    reference_tree: Option<Held<'a, T>>,
    /// `old_from_new` of a tree this estimator built; empty otherwise.
    reference_permutation: Vec<usize>,
}

impl<M: Default, K: Default, T> Default for Kde<'_, M, K, T> {
    fn default() -> Self {
        Self {
            relative_error: DEFAULT_RELATIVE_ERROR,
            absolute_error: DEFAULT_ABSOLUTE_ERROR,
            traversal: TraversalOrder::default(),
            trained: false,
            kernel: Held::Owned(K::default()),
            metric: Held::Owned(M::default()),
            reference_tree: None,
            reference_permutation: Vec::new(),
        }
    }
}

impl<'a, M, K, T> Kde<'a, M, K, T>
where
    M: Metric + Clone,
    K: Kernel,
    T: SpatialTree<Metric = M>,
{
    /// Creates an untrained estimator owning `kernel` and `metric`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRelativeError` if `relative_error` is outside `[0, 1]`.
    /// Returns `Error::InvalidAbsoluteError` if `absolute_error` is negative.
    pub fn new(
        kernel: K,
        metric: M,
        relative_error: f64,
        absolute_error: f64,
        traversal: TraversalOrder,
    ) -> Result<Self> {
        Self::from_parts(
            Held::Owned(kernel),
            Held::Owned(metric),
            relative_error,
            absolute_error,
            traversal,
        )
    }

    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> KdeBuilder<'a, M, K, T> {
        KdeBuilder::new()
    }

    pub(crate) fn from_parts(
        kernel: Held<'a, K>,
        metric: Held<'a, M>,
        relative_error: f64,
        absolute_error: f64,
        traversal: TraversalOrder,
    ) -> Result<Self> {
        check_error_values(relative_error, absolute_error)?;
        Ok(Self {
            relative_error,
            absolute_error,
            traversal,
            trained: false,
            kernel,
            metric,
            reference_tree: None,
            reference_permutation: Vec::new(),
        })
    }

    /// Builds and owns a reference tree over `reference_set`.
    ///
    /// Any previously held tree is released.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReferenceSet` if `reference_set` has no points.
    pub fn train(&mut self, reference_set: PointSet) -> Result<()> {
        if reference_set.is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        trace_info!(
            points = reference_set.len(),
            dim = reference_set.dim(),
            "training KDE"
        );

        let (tree, old_from_new) = T::build(reference_set, (*self.metric).clone());
        self.reference_tree = Some(Held::Owned(tree));
        self.reference_permutation = old_from_new;
        self.trained = true;
        Ok(())
    }

    /// Adopts a caller-owned reference tree without taking ownership.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReferenceSet` if the tree's dataset has no points.
    pub fn train_with_tree(&mut self, reference_tree: &'a T) -> Result<()> {
        self.adopt(Held::Borrowed(reference_tree))
    }

    /// Adopts a pre-built reference tree and takes ownership of it.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReferenceSet` if the tree's dataset has no points.
    pub fn train_with_owned_tree(&mut self, reference_tree: T) -> Result<()> {
        self.adopt(Held::Owned(reference_tree))
    }

    fn adopt(&mut self, reference_tree: Held<'a, T>) -> Result<()> {
        if reference_tree.dataset().is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        trace_info!(
            points = reference_tree.dataset().len(),
            owned = reference_tree.is_owned(),
            "training KDE on a pre-built tree"
        );

        self.reference_tree = Some(reference_tree);
        self.reference_permutation.clear();
        self.trained = true;
        Ok(())
    }

    /// Estimates the density at every point of `query_set`.
    ///
    /// Densities come back in the order of `query_set`. An empty query set
    /// yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before training.
    /// Returns `Error::DimensionMismatch` if `query_set` and the reference set differ in dimension.
    pub fn evaluate(&self, query_set: &PointSet) -> Result<Vec<f64>> {
        let reference_tree = self.trained_tree()?;
        if query_set.is_empty() {
            trace_warn!("query set is empty, no densities to compute");
            return Ok(Vec::new());
        }
        check_dimensions(reference_tree, query_set)?;

        let (query_tree, old_from_new) = T::build(query_set.clone(), (*self.metric).clone());
        Ok(self.dual_tree(&query_tree, reference_tree, &old_from_new))
    }

    /// Estimates densities over a pre-built query tree.
    ///
    /// `old_from_new` is the permutation returned when `query_tree` was
    /// built; densities come back in original query order. Pass an empty
    /// slice to get them in the tree's dataset order.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before training.
    /// Returns `Error::DimensionMismatch` if the query and reference sets differ in dimension.
    /// Returns `Error::PermutationMismatch` if `old_from_new` is non-empty and its length
    /// differs from the query tree's point count.
    /// Returns `Error::PermutationOutOfRange` if an entry of `old_from_new` is not a query index.
    pub fn evaluate_tree(&self, query_tree: &T, old_from_new: &[usize]) -> Result<Vec<f64>> {
        let reference_tree = self.trained_tree()?;
        if query_tree.dataset().is_empty() {
            trace_warn!("query tree is empty, no densities to compute");
            return Ok(Vec::new());
        }
        check_dimensions(reference_tree, query_tree.dataset())?;
        let num_queries = query_tree.dataset().len();
        if !old_from_new.is_empty() && old_from_new.len() != num_queries {
            return Err(Error::PermutationMismatch {
                expected: num_queries,
                got: old_from_new.len(),
            });
        }
        if let Some((position, &value)) =
            old_from_new.iter().enumerate().find(|&(_, &old)| old >= num_queries)
        {
            return Err(Error::PermutationOutOfRange {
                position,
                value,
                len: num_queries,
            });
        }

        Ok(self.dual_tree(query_tree, reference_tree, old_from_new))
    }

    /// Estimates the density at every reference point, using the reference
    /// tree as its own query tree.
    ///
    /// Densities follow the original reference order when the estimator
    /// built the tree and the tree's dataset order when the tree was supplied.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before training.
    pub fn evaluate_reference(&self) -> Result<Vec<f64>> {
        let reference_tree = self.trained_tree()?;
        Ok(self.dual_tree(reference_tree, reference_tree, &self.reference_permutation))
    }

    /// Computes exact densities by walking the reference tree once per query
    /// point.
    ///
    /// Point-to-node scores never prune, so this evaluates every kernel
    /// value regardless of the error tolerances.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before training.
    /// Returns `Error::DimensionMismatch` if `query_set` and the reference set differ in dimension.
    pub fn evaluate_single_tree(&self, query_set: &PointSet) -> Result<Vec<f64>> {
        let reference_tree = self.trained_tree()?;
        if query_set.is_empty() {
            trace_warn!("query set is empty, no densities to compute");
            return Ok(Vec::new());
        }
        check_dimensions(reference_tree, query_set)?;

        let mut densities = vec![0.0; query_set.len()];
        let mut rules = KdeRules::new(
            reference_tree.dataset(),
            query_set,
            &mut densities,
            &*self.metric,
            &*self.kernel,
            self.tolerance(),
        );
        let mut traverser = SingleTreeTraverser::new(&mut rules);
        for query_index in 0..query_set.len() {
            traverser.traverse(query_index, reference_tree.root());
        }
        trace_info!(
            queries = query_set.len(),
            base_cases = traverser.num_base_cases(),
            "single-tree evaluation finished"
        );

        self.normalize(&mut densities, reference_tree.dataset());
        Ok(densities)
    }

    fn dual_tree(&self, query_tree: &T, reference_tree: &T, old_from_new: &[usize]) -> Vec<f64> {
        let mut densities = vec![0.0; query_tree.dataset().len()];
        let mut rules = KdeRules::new(
            reference_tree.dataset(),
            query_tree.dataset(),
            &mut densities,
            &*self.metric,
            &*self.kernel,
            self.tolerance(),
        )
        .with_permutation(old_from_new);

        let mut traverser = DualTreeTraverser::new(&mut rules, self.traversal);
        traverser.traverse(query_tree.root(), reference_tree.root());
        trace_info!(
            queries = query_tree.dataset().len(),
            references = reference_tree.dataset().len(),
            base_cases = traverser.rules().base_cases(),
            scores = traverser.rules().scores(),
            prunes = traverser.num_prunes(),
            order = ?self.traversal,
            "dual-tree evaluation finished"
        );

        self.normalize(&mut densities, reference_tree.dataset());
        densities
    }

    /// Divides by the reference count, then by the kernel normalizer if the
    /// kernel asks for it.
    #[allow(clippy::cast_precision_loss)]
    fn normalize(&self, densities: &mut [f64], reference_set: &PointSet) {
        let count = reference_set.len() as f64;
        for density in densities.iter_mut() {
            *density /= count;
        }
        if K::IS_NORMALIZED {
            let normalizer = self.kernel.normalizer(reference_set.dim());
            for density in densities.iter_mut() {
                *density /= normalizer;
            }
        }
    }

    fn trained_tree(&self) -> Result<&T> {
        match &self.reference_tree {
            Some(tree) if self.trained => Ok(&**tree),
            _ => Err(Error::NotTrained),
        }
    }

    fn tolerance(&self) -> f64 {
        self.relative_error + self.absolute_error
    }

    /// Sets the relative error tolerance.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRelativeError` if `relative_error` is outside `[0, 1]`.
    pub fn set_relative_error(&mut self, relative_error: f64) -> Result<()> {
        check_error_values(relative_error, self.absolute_error)?;
        self.relative_error = relative_error;
        Ok(())
    }

    /// Sets the absolute error tolerance.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAbsoluteError` if `absolute_error` is negative.
    pub fn set_absolute_error(&mut self, absolute_error: f64) -> Result<()> {
        check_error_values(self.relative_error, absolute_error)?;
        self.absolute_error = absolute_error;
        Ok(())
    }

    /// Replaces the kernel with an owned one. The reference tree is kept.
    pub fn set_kernel(&mut self, kernel: K) {
        self.kernel = Held::Owned(kernel);
    }

    /// Replaces the kernel with a borrowed one. The reference tree is kept.
    pub fn set_kernel_ref(&mut self, kernel: &'a K) {
        self.kernel = Held::Borrowed(kernel);
    }

    /// Sets the order in which node pairs are visited.
    pub fn set_traversal(&mut self, traversal: TraversalOrder) {
        self.traversal = traversal;
    }
}

impl<M, K, T: SpatialTree> Kde<'_, M, K, T> {
    /// The kernel, owned or borrowed.
    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The metric, owned or borrowed.
    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The reference tree, if trained.
    #[must_use]
    pub fn reference_tree(&self) -> Option<&T> {
        self.reference_tree.as_deref()
    }

    /// The `old_from_new` permutation of a tree built by [`train`](Self::train).
    #[must_use]
    pub fn reference_permutation(&self) -> &[usize] {
        &self.reference_permutation
    }

    /// The relative error tolerance.
    #[must_use]
    pub fn relative_error(&self) -> f64 {
        self.relative_error
    }

    /// The absolute error tolerance.
    #[must_use]
    pub fn absolute_error(&self) -> f64 {
        self.absolute_error
    }

    /// The configured visit order.
    #[must_use]
    pub fn traversal(&self) -> TraversalOrder {
        self.traversal
    }

    /// Returns `true` once a reference set or tree has been supplied.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Returns `true` if the kernel is owned rather than borrowed.
    #[must_use]
    pub fn owns_kernel(&self) -> bool {
        self.kernel.is_owned()
    }

    /// Returns `true` if the metric is owned rather than borrowed.
    #[must_use]
    pub fn owns_metric(&self) -> bool {
        self.metric.is_owned()
    }

    /// Returns `true` if a reference tree is held and owned.
    #[must_use]
    pub fn owns_reference_tree(&self) -> bool {
        self.reference_tree.as_ref().is_some_and(Held::is_owned)
    }
}

fn check_dimensions<T: SpatialTree>(reference_tree: &T, query_set: &PointSet) -> Result<()> {
    let expected = reference_tree.dataset().dim();
    if query_set.dim() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected,
            got: query_set.dim(),
        })
    }
}
