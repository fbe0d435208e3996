#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the relative error tolerance lies outside `[0, 1]`.
    #[error("invalid relative error tolerance: {0} must be in [0.0, 1.0]")]
    InvalidRelativeError(f64),

    /// Returned when the absolute error tolerance is negative.
    #[error("invalid absolute error tolerance: {0} must be greater than or equal to 0.0")]
    InvalidAbsoluteError(f64),

    /// Returned when a kernel bandwidth is not a finite positive number.
    #[error("invalid bandwidth: {0} must be positive")]
    InvalidBandwidth(f64),

    /// Returned when a tree is built with a leaf size of zero.
    #[error("invalid leaf size: leaves must hold at least one point")]
    InvalidLeafSize,

    /// Returned when a kernel name cannot be parsed.
    #[error("unknown kernel '{0}'")]
    UnknownKernel(String),

    /// Returned when a tree name cannot be parsed.
    #[error("unknown tree type '{0}'")]
    UnknownTree(String),

    /// Returned when training on a reference set without points.
    #[error("cannot train KDE with an empty reference set")]
    EmptyReferenceSet,

    /// Returned when points have zero dimensions.
    #[error("points must have at least one dimension")]
    ZeroDimensions,

    /// Returned when a list of points does not share one dimensionality.
    #[error("ragged points: expected {expected} dimensions but point {point_index} has {got}")]
    RaggedPoints {
        /// The expected number of dimensions.
        expected: usize,
        /// The actual number of dimensions of the offending point.
        got: usize,
        /// The index of the offending point.
        point_index: usize,
    },

    /// Returned when flat point data is not a whole number of points.
    #[error("malformed point data: {len} values cannot be split into points of {dim} dimensions")]
    MalformedPointData {
        /// Number of values supplied.
        len: usize,
        /// Requested dimensionality.
        dim: usize,
    },

    /// Returned when query and reference dimensionality disagree.
    #[error("dimension mismatch: reference set has {expected} dimensions but query set has {got}")]
    DimensionMismatch {
        /// The reference set's dimensionality.
        expected: usize,
        /// The query set's dimensionality.
        got: usize,
    },

    /// Returned when a query permutation does not cover the query tree's points.
    #[error("permutation mismatch: query tree has {expected} points but permutation has {got} entries")]
    PermutationMismatch {
        /// Number of points in the query tree.
        expected: usize,
        /// Length of the supplied permutation.
        got: usize,
    },

    /// Returned when a query permutation entry does not name a query point.
    #[error("invalid permutation: entry {position} is {value} but the query tree has {len} points")]
    PermutationOutOfRange {
        /// Position of the offending entry.
        position: usize,
        /// The offending entry.
        value: usize,
        /// Number of points in the query tree.
        len: usize,
    },

    /// Returned when evaluating before a reference set or tree was supplied.
    #[error("KDE model has not been trained")]
    NotTrained,

    /// Returned when saving or loading a model fails.
    #[cfg(feature = "serde")]
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, Error>;
