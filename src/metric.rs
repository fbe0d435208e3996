//! Distance functions between points.
//!
//! Every metric here satisfies the triangle inequality, which ball bounds
//! rely on. Metrics that are norms of the coordinate differences also
//! implement [`NormMetric`] so that axis-aligned bounds can combine
//! per-dimension gaps into a distance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A symmetric, non-negative distance between two points of equal dimension.
pub trait Metric {
    /// Returns the distance between `a` and `b`.
    fn evaluate(&self, a: &[f64], b: &[f64]) -> f64;
}

/// A metric induced by a norm: `d(a, b) = ‖a - b‖`.
///
/// `norm` receives non-negative per-dimension magnitudes, which lets a
/// hyper-rectangle compute its minimum and maximum distance to another
/// rectangle without materializing points.
pub trait NormMetric: Metric {
    /// Returns the norm of a vector given the absolute values of its components.
    fn norm(&self, components: impl Iterator<Item = f64>) -> f64;
}

/// Euclidean (L2) distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EuclideanDistance;

impl Metric for EuclideanDistance {
    fn evaluate(&self, a: &[f64], b: &[f64]) -> f64 {
        self.norm(a.iter().zip(b).map(|(x, y)| (x - y).abs()))
    }
}

impl NormMetric for EuclideanDistance {
    fn norm(&self, components: impl Iterator<Item = f64>) -> f64 {
        components.map(|c| c * c).sum::<f64>().sqrt()
    }
}

/// Manhattan (L1) distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManhattanDistance;

impl Metric for ManhattanDistance {
    fn evaluate(&self, a: &[f64], b: &[f64]) -> f64 {
        self.norm(a.iter().zip(b).map(|(x, y)| (x - y).abs()))
    }
}

impl NormMetric for ManhattanDistance {
    fn norm(&self, components: impl Iterator<Item = f64>) -> f64 {
        components.sum()
    }
}

/// Chebyshev (L∞) distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChebyshevDistance;

impl Metric for ChebyshevDistance {
    fn evaluate(&self, a: &[f64], b: &[f64]) -> f64 {
        self.norm(a.iter().zip(b).map(|(x, y)| (x - y).abs()))
    }
}

impl NormMetric for ChebyshevDistance {
    fn norm(&self, components: impl Iterator<Item = f64>) -> f64 {
        components.fold(0.0, f64::max)
    }
}
