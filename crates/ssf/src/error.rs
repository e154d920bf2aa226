//! Error types for the stsm-ssf crate.

/// Error type for all fallible constructors in the stsm-ssf crate.
///
/// Every variant is a construction-time contract violation: no partially
/// built model ever escapes a failed constructor. The per-step operations
/// themselves are infallible (out-of-range `pos` is an unchecked
/// precondition, validated by the caller).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsfError {
    /// Returned when the regressor matrix has no rows or no columns.
    #[error("regressor matrix is empty")]
    EmptyRegressors,

    /// Returned when a coefficient block would contain zero coefficients.
    #[error("coefficient block is empty")]
    EmptyCoefficientBlock,

    /// Returned when a coefficient covariance matrix is not square.
    #[error("coefficient covariance is not square ({rows}x{cols})")]
    NonSquareCovariance {
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns supplied.
        cols: usize,
    },

    /// Returned when the coefficient covariance dimension does not match
    /// the number of regressors.
    #[error("covariance dimension mismatch: expected {expected}, got {got}")]
    CovarianceDimensionMismatch {
        /// Expected dimension (number of regressor columns).
        expected: usize,
        /// Dimension actually supplied.
        got: usize,
    },

    /// Returned when an innovation variance is negative.
    #[error("innovation variance is negative ({value})")]
    NegativeVariance {
        /// The offending variance value.
        value: f64,
    },
}
