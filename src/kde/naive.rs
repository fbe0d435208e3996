//! Brute-force kernel density estimation.

use crate::error::{Error, Result};
use crate::kernel::{GaussianKernel, Kernel};
use crate::metric::{EuclideanDistance, Metric};
use crate::points::PointSet;

/// A kernel density estimator that sums every kernel value directly.
///
/// `NaiveKde` costs `O(|Q| · |R|)` per evaluation and applies exactly the
/// normalization of [`Kde`](super::Kde), which makes it the reference the
/// dual-tree estimator is checked against.
///
/// # Examples
///
/// ```
/// use dualtree_kde::prelude::*;
///
/// let mut naive = NaiveKde::new(GaussianKernel::new(1.0).unwrap(), EuclideanDistance);
/// naive.train(PointSet::from_points(vec![vec![0.0]]).unwrap()).unwrap();
///
/// let densities = naive.evaluate(&PointSet::from_points(vec![vec![0.0]]).unwrap()).unwrap();
/// let expected = 1.0 / (2.0 * core::f64::consts::PI).sqrt();
/// assert!((densities[0] - expected).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NaiveKde<M = EuclideanDistance, K = GaussianKernel> {
    kernel: K,
    metric: M,
    reference_set: Option<PointSet>,
}

impl<M: Metric, K: Kernel> NaiveKde<M, K> {
    /// Creates an untrained brute-force estimator.
    #[must_use]
    pub fn new(kernel: K, metric: M) -> Self {
        Self {
            kernel,
            metric,
            reference_set: None,
        }
    }

    /// Stores the reference set.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReferenceSet` if `reference_set` has no points.
    pub fn train(&mut self, reference_set: PointSet) -> Result<()> {
        if reference_set.is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        self.reference_set = Some(reference_set);
        Ok(())
    }

    /// Computes the density at every point of `query_set`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before training.
    /// Returns `Error::DimensionMismatch` if `query_set` and the reference set differ in dimension.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, query_set: &PointSet) -> Result<Vec<f64>> {
        let reference_set = self.reference_set.as_ref().ok_or(Error::NotTrained)?;
        if query_set.is_empty() {
            return Ok(Vec::new());
        }
        if query_set.dim() != reference_set.dim() {
            return Err(Error::DimensionMismatch {
                expected: reference_set.dim(),
                got: query_set.dim(),
            });
        }

        let mut scale = reference_set.len() as f64;
        if K::IS_NORMALIZED {
            scale *= self.kernel.normalizer(reference_set.dim());
        }

        Ok(query_set
            .iter()
            .map(|query| {
                let sum: f64 = reference_set
                    .iter()
                    .map(|reference| self.kernel.evaluate(self.metric.evaluate(query, reference)))
                    .sum();
                sum / scale
            })
            .collect())
    }

    /// The kernel.
    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The metric.
    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Returns `true` once a reference set has been supplied.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.reference_set.is_some()
    }
}
