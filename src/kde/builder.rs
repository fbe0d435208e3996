use core::marker::PhantomData;

use super::estimator::{DEFAULT_ABSOLUTE_ERROR, DEFAULT_RELATIVE_ERROR, Kde};
use crate::error::Result;
use crate::held::Held;
use crate::kernel::{GaussianKernel, Kernel};
use crate::metric::{EuclideanDistance, Metric};
use crate::traversal::TraversalOrder;
use crate::tree::{KdTree, SpatialTree};

/// A builder for constructing [`Kde`] estimators with a fluent API.
///
/// Created via [`Kde::builder()`]. Tolerances are validated together when
/// [`build`](Self::build) is called.
///
/// # Defaults
///
/// - Kernel: `K::default()` (bandwidth 1.0)
/// - Metric: `M::default()`
/// - Relative error: `1e-6`
/// - Absolute error: `0.0`
/// - Traversal: [`DepthFirst`](TraversalOrder::DepthFirst)
///
/// # Examples
///
/// ```
/// use dualtree_kde::prelude::*;
///
/// let kde: Kde<'_, EuclideanDistance, EpanechnikovKernel, BallTree> = Kde::builder()
///     .bandwidth(0.5)
///     .relative_error(0.01)
///     .breadth_first()
///     .build()
///     .unwrap();
///
/// assert_eq!(kde.traversal(), TraversalOrder::BreadthFirst);
/// assert!((kde.kernel().bandwidth() - 0.5).abs() < f64::EPSILON);
/// ```
pub struct KdeBuilder<'a, M = EuclideanDistance, K = GaussianKernel, T = KdTree<M>> {
    kernel: Option<Held<'a, K>>,
    metric: Option<Held<'a, M>>,
    bandwidth: Option<f64>,
    relative_error: f64,
    absolute_error: f64,
    traversal: TraversalOrder,
    _tree: PhantomData<fn() -> T>,
}

impl<M, K, T> KdeBuilder<'_, M, K, T> {
    /// Create a new builder with default settings.
    pub(super) fn new() -> Self {
        Self {
            kernel: None,
            metric: None,
            bandwidth: None,
            relative_error: DEFAULT_RELATIVE_ERROR,
            absolute_error: DEFAULT_ABSOLUTE_ERROR,
            traversal: TraversalOrder::default(),
            _tree: PhantomData,
        }
    }
}

impl<'a, M, K, T> KdeBuilder<'a, M, K, T>
where
    M: Metric + Clone + Default,
    K: Kernel + Default,
    T: SpatialTree<Metric = M>,
{
    /// Use `kernel`, owned by the estimator.
    #[must_use]
    pub fn kernel(mut self, kernel: K) -> Self {
        self.kernel = Some(Held::Owned(kernel));
        self.bandwidth = None;
        self
    }

    /// Use a kernel the caller keeps ownership of.
    #[must_use]
    pub fn kernel_ref(mut self, kernel: &'a K) -> Self {
        self.kernel = Some(Held::Borrowed(kernel));
        self.bandwidth = None;
        self
    }

    /// Use an owned kernel of type `K` with the given bandwidth.
    ///
    /// Replaces any kernel set earlier; a later `kernel` call replaces this.
    #[must_use]
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self.kernel = None;
        self
    }

    /// Use `metric`, owned by the estimator.
    #[must_use]
    pub fn metric(mut self, metric: M) -> Self {
        self.metric = Some(Held::Owned(metric));
        self
    }

    /// Use a metric the caller keeps ownership of.
    #[must_use]
    pub fn metric_ref(mut self, metric: &'a M) -> Self {
        self.metric = Some(Held::Borrowed(metric));
        self
    }

    /// Set the relative error tolerance, checked in [`build`](Self::build).
    #[must_use]
    pub fn relative_error(mut self, relative_error: f64) -> Self {
        self.relative_error = relative_error;
        self
    }

    /// Set the absolute error tolerance, checked in [`build`](Self::build).
    #[must_use]
    pub fn absolute_error(mut self, absolute_error: f64) -> Self {
        self.absolute_error = absolute_error;
        self
    }

    /// Set the traversal order explicitly.
    #[must_use]
    pub fn traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    /// Traverse depth first (the default).
    #[must_use]
    pub fn depth_first(mut self) -> Self {
        self.traversal = TraversalOrder::DepthFirst;
        self
    }

    /// Traverse breadth first.
    #[must_use]
    pub fn breadth_first(mut self) -> Self {
        self.traversal = TraversalOrder::BreadthFirst;
        self
    }

    /// Build the untrained [`Kde`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if a bandwidth was set and is not positive.
    /// Returns `Error::InvalidRelativeError` if the relative error is outside `[0, 1]`.
    /// Returns `Error::InvalidAbsoluteError` if the absolute error is negative.
    pub fn build(self) -> Result<Kde<'a, M, K, T>> {
        let kernel = match (self.bandwidth, self.kernel) {
            (Some(bandwidth), _) => Held::Owned(K::with_bandwidth(bandwidth)?),
            (None, Some(kernel)) => kernel,
            (None, None) => Held::Owned(K::default()),
        };
        let metric = self.metric.unwrap_or_else(|| Held::Owned(M::default()));

        Kde::from_parts(
            kernel,
            metric,
            self.relative_error,
            self.absolute_error,
            self.traversal,
        )
    }
}
