#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Kernel density estimation accelerated by dual-tree traversal.
//!
//! Given a reference set `R` and a query set `Q`, the estimator computes for
//! every query point `q` the density `(1 / |R|) · Σ_r K(d(q, r))`. Instead of
//! evaluating all `|Q| · |R|` kernel values it builds a spatial tree over each
//! set and walks both trees together, replacing a whole reference subtree by a
//! point mass whenever the kernel cannot vary by more than the error budget
//! across the pair of nodes.
//!
//! # Getting Started
//!
//! ```
//! use dualtree_kde::prelude::*;
//!
//! let mut rng_state = 7_u64;
//! let mut next = move || {
//!     rng_state = rng_state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
//!     (rng_state >> 11) as f64 / (1_u64 << 53) as f64
//! };
//! let reference = PointSet::new(2, (0..400).map(|_| next()).collect()).unwrap();
//! let query = PointSet::new(2, (0..40).map(|_| next()).collect()).unwrap();
//!
//! let mut kde: Kde = Kde::builder().bandwidth(0.25).relative_error(0.01).build().unwrap();
//! kde.train(reference).unwrap();
//!
//! let densities = kde.evaluate(&query).unwrap();
//! assert_eq!(densities.len(), 20);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`PointSet`] | Dense storage of `N` points of dimension `D`. |
//! | [`Kernel`](kernel::Kernel) | Weight as a non-increasing function of distance. |
//! | [`Metric`](metric::Metric) | Distance between two points. |
//! | [`SpatialTree`](tree::SpatialTree) | Hierarchy of bounded nodes; [`KdTree`](tree::KdTree) or [`BallTree`](tree::BallTree). |
//! | [`Rules`](traversal::Rules) | Base case and pruning decisions consulted by a traversal. |
//! | [`Kde`] | Trains a reference tree and evaluates densities. |
//! | [`KdeModel`] | Picks kernel and tree type at runtime. |
//!
//! # Accuracy
//!
//! A node pair is pruned when `K(d_min) - K(d_max) ≤ (ε_rel + ε_abs) / |R|`,
//! so the unnormalized kernel sum of every query point is off by at most
//! `ε_rel + ε_abs`. With both tolerances at zero only pairs whose kernel
//! values are all identical are pruned, and the result matches brute force.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public types, [`KdeModel::save`]/[`KdeModel::load`] | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for training and evaluation | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

mod error;
mod held;
pub mod kde;
pub mod kernel;
pub mod metric;
mod points;
pub mod traversal;
pub mod tree;

pub use error::{Error, Result};
pub use held::Held;
pub use kde::{Kde, KdeBuilder, KdeModel, KernelType, NaiveKde, TreeType};
pub use points::PointSet;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use dualtree_kde::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::held::Held;
    pub use crate::kde::{Kde, KdeBuilder, KdeModel, KdeRules, KernelType, NaiveKde, TreeType};
    pub use crate::kernel::{
        EpanechnikovKernel, GaussianKernel, Kernel, LaplacianKernel, SphericalKernel,
        TriangularKernel,
    };
    pub use crate::metric::{
        ChebyshevDistance, EuclideanDistance, ManhattanDistance, Metric, NormMetric,
    };
    pub use crate::points::PointSet;
    pub use crate::traversal::{
        DualTreeTraverser, PRUNE, Rules, SingleTreeTraverser, TraversalInfo, TraversalOrder,
    };
    pub use crate::tree::{BallTree, KdTree, Node, SpatialTree};
}
