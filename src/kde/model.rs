//! Runtime selection of kernel and tree type.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::estimator::{DEFAULT_ABSOLUTE_ERROR, DEFAULT_RELATIVE_ERROR, Kde, check_error_values};
use crate::error::{Error, Result};
use crate::kernel::{
    EpanechnikovKernel, GaussianKernel, Kernel, LaplacianKernel, SphericalKernel,
    TriangularKernel, check_bandwidth,
};
use crate::metric::EuclideanDistance;
use crate::points::PointSet;
use crate::traversal::TraversalOrder;
use crate::tree::{BallTree, KdTree, SpatialTree};

/// Kernel families selectable at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KernelType {
    #[default]
    Gaussian,
    Epanechnikov,
    Laplacian,
    Spherical,
    Triangular,
}

impl KernelType {
    /// All kernel types.
    pub const ALL: [Self; 5] = [
        Self::Gaussian,
        Self::Epanechnikov,
        Self::Laplacian,
        Self::Spherical,
        Self::Triangular,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Epanechnikov => "epanechnikov",
            Self::Laplacian => "laplacian",
            Self::Spherical => "spherical",
            Self::Triangular => "triangular",
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kernel| kernel.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownKernel(s.to_string()))
    }
}

/// Tree types selectable at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TreeType {
    #[default]
    KdTree,
    BallTree,
}

impl TreeType {
    /// All tree types.
    pub const ALL: [Self; 2] = [Self::KdTree, Self::BallTree];

    fn name(self) -> &'static str {
        match self {
            Self::KdTree => "kd-tree",
            Self::BallTree => "ball-tree",
        }
    }
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tree| tree.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTree(s.to_string()))
    }
}

/// One trained estimator per kernel/tree combination.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Estimator {
    GaussianKd(Kde<'static, EuclideanDistance, GaussianKernel, KdTree>),
    GaussianBall(Kde<'static, EuclideanDistance, GaussianKernel, BallTree>),
    EpanechnikovKd(Kde<'static, EuclideanDistance, EpanechnikovKernel, KdTree>),
    EpanechnikovBall(Kde<'static, EuclideanDistance, EpanechnikovKernel, BallTree>),
    LaplacianKd(Kde<'static, EuclideanDistance, LaplacianKernel, KdTree>),
    LaplacianBall(Kde<'static, EuclideanDistance, LaplacianKernel, BallTree>),
    SphericalKd(Kde<'static, EuclideanDistance, SphericalKernel, KdTree>),
    SphericalBall(Kde<'static, EuclideanDistance, SphericalKernel, BallTree>),
    TriangularKd(Kde<'static, EuclideanDistance, TriangularKernel, KdTree>),
    TriangularBall(Kde<'static, EuclideanDistance, TriangularKernel, BallTree>),
}

/// Runs `$body` with `$kde` bound to whichever estimator `$estimator` holds.
macro_rules! with_estimator {
    ($estimator:expr, $kde:ident => $body:expr) => {
        match $estimator {
            Estimator::GaussianKd($kde) => $body,
            Estimator::GaussianBall($kde) => $body,
            Estimator::EpanechnikovKd($kde) => $body,
            Estimator::EpanechnikovBall($kde) => $body,
            Estimator::LaplacianKd($kde) => $body,
            Estimator::LaplacianBall($kde) => $body,
            Estimator::SphericalKd($kde) => $body,
            Estimator::SphericalBall($kde) => $body,
            Estimator::TriangularKd($kde) => $body,
            Estimator::TriangularBall($kde) => $body,
        }
    };
}

/// A KDE whose kernel and tree type are chosen at runtime.
///
/// The model keeps its configuration separately from the estimator so that
/// it can be validated before any data is seen; [`build_model`](Self::build_model)
/// then instantiates and trains the matching [`Kde`] under the Euclidean
/// metric.
///
/// # Examples
///
/// ```
/// use dualtree_kde::prelude::*;
///
/// let mut model = KdeModel::new(0.5, 0.05, 0.0, "epanechnikov".parse().unwrap(), TreeType::BallTree)
///     .unwrap();
/// model
///     .build_model(PointSet::from_points(vec![vec![0.0], vec![0.2], vec![0.4]]).unwrap())
///     .unwrap();
///
/// let densities = model.evaluate(&PointSet::from_points(vec![vec![0.1]]).unwrap()).unwrap();
/// assert_eq!(densities.len(), 1);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KdeModel {
    bandwidth: f64,
    relative_error: f64,
    absolute_error: f64,
    traversal: TraversalOrder,
    kernel_type: KernelType,
    tree_type: TreeType,
    estimator: Option<Estimator>,
}

impl Default for KdeModel {
    fn default() -> Self {
        Self {
            bandwidth: 1.0,
            relative_error: DEFAULT_RELATIVE_ERROR,
            absolute_error: DEFAULT_ABSOLUTE_ERROR,
            traversal: TraversalOrder::default(),
            kernel_type: KernelType::default(),
            tree_type: TreeType::default(),
            estimator: None,
        }
    }
}

impl KdeModel {
    /// Creates an untrained model.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    /// Returns `Error::InvalidRelativeError` if `relative_error` is outside `[0, 1]`.
    /// Returns `Error::InvalidAbsoluteError` if `absolute_error` is negative.
    pub fn new(
        bandwidth: f64,
        relative_error: f64,
        absolute_error: f64,
        kernel_type: KernelType,
        tree_type: TreeType,
    ) -> Result<Self> {
        check_bandwidth(bandwidth)?;
        check_error_values(relative_error, absolute_error)?;
        Ok(Self {
            bandwidth,
            relative_error,
            absolute_error,
            traversal: TraversalOrder::default(),
            kernel_type,
            tree_type,
            estimator: None,
        })
    }

    /// Instantiates the configured estimator and trains it on `reference_set`.
    ///
    /// Replaces any previously trained estimator.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReferenceSet` if `reference_set` has no points.
    pub fn build_model(&mut self, reference_set: PointSet) -> Result<()> {
        trace_info!(
            kernel = %self.kernel_type,
            tree = %self.tree_type,
            bandwidth = self.bandwidth,
            "building KDE model"
        );
        let estimator = match (self.kernel_type, self.tree_type) {
            (KernelType::Gaussian, TreeType::KdTree) => {
                Estimator::GaussianKd(self.trained(reference_set)?)
            }
            (KernelType::Gaussian, TreeType::BallTree) => {
                Estimator::GaussianBall(self.trained(reference_set)?)
            }
            (KernelType::Epanechnikov, TreeType::KdTree) => {
                Estimator::EpanechnikovKd(self.trained(reference_set)?)
            }
            (KernelType::Epanechnikov, TreeType::BallTree) => {
                Estimator::EpanechnikovBall(self.trained(reference_set)?)
            }
            (KernelType::Laplacian, TreeType::KdTree) => {
                Estimator::LaplacianKd(self.trained(reference_set)?)
            }
            (KernelType::Laplacian, TreeType::BallTree) => {
                Estimator::LaplacianBall(self.trained(reference_set)?)
            }
            (KernelType::Spherical, TreeType::KdTree) => {
                Estimator::SphericalKd(self.trained(reference_set)?)
            }
            (KernelType::Spherical, TreeType::BallTree) => {
                Estimator::SphericalBall(self.trained(reference_set)?)
            }
            (KernelType::Triangular, TreeType::KdTree) => {
                Estimator::TriangularKd(self.trained(reference_set)?)
            }
            (KernelType::Triangular, TreeType::BallTree) => {
                Estimator::TriangularBall(self.trained(reference_set)?)
            }
        };
        self.estimator = Some(estimator);
        Ok(())
    }

    fn trained<K, T>(&self, reference_set: PointSet) -> Result<Kde<'static, EuclideanDistance, K, T>>
    where
        K: Kernel,
        T: SpatialTree<Metric = EuclideanDistance>,
    {
        let mut kde = Kde::new(
            K::with_bandwidth(self.bandwidth)?,
            EuclideanDistance,
            self.relative_error,
            self.absolute_error,
            self.traversal,
        )?;
        kde.train(reference_set)?;
        Ok(kde)
    }

    /// Estimates the density at every point of `query_set`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before [`build_model`](Self::build_model).
    /// Returns `Error::DimensionMismatch` if `query_set` and the reference set differ in dimension.
    pub fn evaluate(&self, query_set: &PointSet) -> Result<Vec<f64>> {
        let estimator = self.estimator.as_ref().ok_or(Error::NotTrained)?;
        with_estimator!(estimator, kde => kde.evaluate(query_set))
    }

    /// Estimates the density at every reference point, in original order.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTrained` before [`build_model`](Self::build_model).
    pub fn evaluate_reference(&self) -> Result<Vec<f64>> {
        let estimator = self.estimator.as_ref().ok_or(Error::NotTrained)?;
        with_estimator!(estimator, kde => kde.evaluate_reference())
    }

    /// Changes the bandwidth, keeping any trained reference tree.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn set_bandwidth(&mut self, bandwidth: f64) -> Result<()> {
        check_bandwidth(bandwidth)?;
        if let Some(estimator) = &mut self.estimator {
            with_estimator!(estimator, kde => kde.set_kernel(Kernel::with_bandwidth(bandwidth)?));
        }
        self.bandwidth = bandwidth;
        Ok(())
    }

    /// Sets the relative error tolerance.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRelativeError` if `relative_error` is outside `[0, 1]`.
    pub fn set_relative_error(&mut self, relative_error: f64) -> Result<()> {
        check_error_values(relative_error, self.absolute_error)?;
        if let Some(estimator) = &mut self.estimator {
            with_estimator!(estimator, kde => kde.set_relative_error(relative_error))?;
        }
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
        if let Some(estimator) = &mut self.estimator {
            with_estimator!(estimator, kde => kde.set_absolute_error(absolute_error))?;
        }
        self.absolute_error = absolute_error;
        Ok(())
    }

    /// Sets the visit order, forwarding it to a trained estimator.
    pub fn set_traversal(&mut self, traversal: TraversalOrder) {
        if let Some(estimator) = &mut self.estimator {
            with_estimator!(estimator, kde => kde.set_traversal(traversal));
        }
        self.traversal = traversal;
    }

    /// The kernel bandwidth.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
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

    /// The selected kernel.
    #[must_use]
    pub fn kernel_type(&self) -> KernelType {
        self.kernel_type
    }

    /// The selected tree type.
    #[must_use]
    pub fn tree_type(&self) -> TreeType {
        self.tree_type
    }

    /// Returns `true` once [`build_model`](Self::build_model) has succeeded.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.estimator.is_some()
    }

    /// Number of reference points, if trained.
    #[must_use]
    pub fn num_reference_points(&self) -> Option<usize> {
        let estimator = self.estimator.as_ref()?;
        with_estimator!(estimator, kde => kde.reference_tree().map(|tree| tree.dataset().len()))
    }
}
