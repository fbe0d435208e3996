//! Radial kernels: weights that shrink as the distance to a reference point grows.
//!
//! Every kernel is a non-negative, monotonically non-increasing function of
//! distance scaled by a bandwidth `h`. The dual-tree pruning rule relies on
//! that monotonicity: for a node pair whose points are between `d_min` and
//! `d_max` apart, every kernel value lies in `[K(d_max), K(d_min)]`.
//!
//! | Kernel | `K(d)` | Normalized |
//! |--------|--------|------------|
//! | [`GaussianKernel`] | `exp(-d² / 2h²)` | yes |
//! | [`EpanechnikovKernel`] | `max(0, 1 - d²/h²)` | yes |
//! | [`SphericalKernel`] | `1` if `d ≤ h`, else `0` | yes |
//! | [`LaplacianKernel`] | `exp(-d / h)` | no |
//! | [`TriangularKernel`] | `max(0, 1 - d/h)` | no |
//!
//! "Normalized" kernels have their estimates divided by
//! [`Kernel::normalizer`] so that the density integrates to one.

use core::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A radial kernel function of distance.
pub trait Kernel {
    /// Whether estimates built from this kernel are divided by [`normalizer`](Kernel::normalizer).
    const IS_NORMALIZED: bool;

    /// Creates the kernel with the given bandwidth.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    fn with_bandwidth(bandwidth: f64) -> Result<Self>
    where
        Self: Sized;

    /// Returns the bandwidth `h`.
    fn bandwidth(&self) -> f64;

    /// Returns the kernel weight at `distance`.
    fn evaluate(&self, distance: f64) -> f64;

    /// Returns the integral of the kernel over `dimension`-dimensional space.
    fn normalizer(&self, dimension: usize) -> f64;
}

pub(crate) fn check_bandwidth(bandwidth: f64) -> Result<f64> {
    if bandwidth.is_finite() && bandwidth > 0.0 {
        Ok(bandwidth)
    } else {
        Err(Error::InvalidBandwidth(bandwidth))
    }
}

/// Γ(n / 2), exact for the integer and half-integer arguments kernels need.
#[allow(clippy::cast_precision_loss)]
fn gamma_half(n: usize) -> f64 {
    debug_assert!(n > 0, "gamma is undefined at zero");
    let (mut value, mut x) = if n % 2 == 0 {
        (1.0, 1.0)
    } else {
        (PI.sqrt(), 0.5)
    };
    let target = n as f64 / 2.0;
    while x < target {
        value *= x;
        x += 1.0;
    }
    value
}

/// Volume of the unit ball in `dimension` dimensions.
#[allow(clippy::cast_precision_loss)]
fn unit_ball_volume(dimension: usize) -> f64 {
    PI.powf(dimension as f64 / 2.0) / gamma_half(dimension + 2)
}

/// Surface area of the unit sphere bounding the unit ball in `dimension` dimensions.
#[allow(clippy::cast_precision_loss)]
fn unit_sphere_area(dimension: usize) -> f64 {
    2.0 * PI.powf(dimension as f64 / 2.0) / gamma_half(dimension)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn bandwidth_power(bandwidth: f64, dimension: usize) -> f64 {
    bandwidth.powi(dimension as i32)
}

/// The Gaussian kernel `exp(-d² / 2h²)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianKernel {
    bandwidth: f64,
}

impl GaussianKernel {
    /// Creates a Gaussian kernel with bandwidth `h`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: check_bandwidth(bandwidth)?,
        })
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl Kernel for GaussianKernel {
    const IS_NORMALIZED: bool = true;

    fn with_bandwidth(bandwidth: f64) -> Result<Self> {
        Self::new(bandwidth)
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        let z = distance / self.bandwidth;
        (-0.5 * z * z).exp()
    }

    #[allow(clippy::cast_precision_loss)]
    fn normalizer(&self, dimension: usize) -> f64 {
        ((2.0 * PI).sqrt() * self.bandwidth).powf(dimension as f64)
    }
}

/// The Epanechnikov kernel `max(0, 1 - d²/h²)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpanechnikovKernel {
    bandwidth: f64,
}

impl EpanechnikovKernel {
    /// Creates an Epanechnikov kernel with bandwidth `h`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: check_bandwidth(bandwidth)?,
        })
    }
}

impl Default for EpanechnikovKernel {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl Kernel for EpanechnikovKernel {
    const IS_NORMALIZED: bool = true;

    fn with_bandwidth(bandwidth: f64) -> Result<Self> {
        Self::new(bandwidth)
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        let z = distance / self.bandwidth;
        (1.0 - z * z).max(0.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn normalizer(&self, dimension: usize) -> f64 {
        2.0 * bandwidth_power(self.bandwidth, dimension) * unit_ball_volume(dimension)
            / (dimension as f64 + 2.0)
    }
}

/// The spherical (uniform ball) kernel: `1` inside radius `h`, `0` outside.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SphericalKernel {
    bandwidth: f64,
}

impl SphericalKernel {
    /// Creates a spherical kernel with radius `h`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: check_bandwidth(bandwidth)?,
        })
    }
}

impl Default for SphericalKernel {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl Kernel for SphericalKernel {
    const IS_NORMALIZED: bool = true;

    fn with_bandwidth(bandwidth: f64) -> Result<Self> {
        Self::new(bandwidth)
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        if distance <= self.bandwidth { 1.0 } else { 0.0 }
    }

    fn normalizer(&self, dimension: usize) -> f64 {
        bandwidth_power(self.bandwidth, dimension) * unit_ball_volume(dimension)
    }
}

/// The Laplacian kernel `exp(-d / h)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaplacianKernel {
    bandwidth: f64,
}

impl LaplacianKernel {
    /// Creates a Laplacian kernel with bandwidth `h`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: check_bandwidth(bandwidth)?,
        })
    }
}

impl Default for LaplacianKernel {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl Kernel for LaplacianKernel {
    const IS_NORMALIZED: bool = false;

    fn with_bandwidth(bandwidth: f64) -> Result<Self> {
        Self::new(bandwidth)
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        (-distance / self.bandwidth).exp()
    }

    fn normalizer(&self, dimension: usize) -> f64 {
        // Γ(D) = Γ(2D / 2)
        unit_sphere_area(dimension)
            * bandwidth_power(self.bandwidth, dimension)
            * gamma_half(2 * dimension)
    }
}

/// The triangular kernel `max(0, 1 - d/h)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangularKernel {
    bandwidth: f64,
}

impl TriangularKernel {
    /// Creates a triangular kernel with bandwidth `h`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: check_bandwidth(bandwidth)?,
        })
    }
}

impl Default for TriangularKernel {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl Kernel for TriangularKernel {
    const IS_NORMALIZED: bool = false;

    fn with_bandwidth(bandwidth: f64) -> Result<Self> {
        Self::new(bandwidth)
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        (1.0 - distance / self.bandwidth).max(0.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn normalizer(&self, dimension: usize) -> f64 {
        let d = dimension as f64;
        unit_sphere_area(dimension) * bandwidth_power(self.bandwidth, dimension) / (d * (d + 1.0))
    }
}
