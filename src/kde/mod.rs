//! Kernel density estimation.
//!
//! - [`Kde`] - dual-tree estimator generic over metric, kernel and tree
//! - [`KdeBuilder`] - fluent construction of a [`Kde`]
//! - [`KdeRules`] - the pruning rules the traversal drives
//! - [`KdeModel`] - kernel and tree type picked at runtime
//! - [`NaiveKde`] - brute-force estimator used as an exactness check

mod builder;
mod estimator;
mod model;
mod naive;
#[cfg(feature = "serde")]
mod persistence;
mod rules;

pub use builder::KdeBuilder;
pub use estimator::{DEFAULT_ABSOLUTE_ERROR, DEFAULT_RELATIVE_ERROR, Kde};
pub use model::{KdeModel, KernelType, TreeType};
pub use naive::NaiveKde;
pub use rules::KdeRules;
