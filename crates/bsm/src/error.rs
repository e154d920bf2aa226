//! Error types for the stsm-bsm crate.

use crate::layout::Component;

/// Error type for all fallible operations in the stsm-bsm crate.
///
/// Scalar-range violations are reported by [`BsmSpec::validate()`]
/// (crate::BsmSpec::validate); the mapping itself only rejects a
/// specification with no enabled component at all. Cross-component
/// consistency (e.g. a slope without a level) is the specification
/// builder's contract and is not checked here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BsmError {
    /// Returned when no component of the specification is in use.
    #[error("specification enables no component")]
    EmptyModel,

    /// Returned when the seasonal period is below 2.
    #[error("invalid seasonal period: {period}")]
    InvalidPeriod {
        /// The offending period.
        period: usize,
    },

    /// Returned when the cycle damping factor lies outside (0, 1).
    #[error("cycle damping factor must lie in (0, 1), got {rho}")]
    InvalidCycleDampingFactor {
        /// The offending damping factor.
        rho: f64,
    },

    /// Returned when the cycle length is not greater than 2 periods.
    #[error("cycle length must exceed 2 periods, got {length}")]
    InvalidCycleLength {
        /// The offending cycle length.
        length: f64,
    },

    /// Returned when a component variance is negative.
    #[error("{component} variance is negative ({value})")]
    NegativeVariance {
        /// The component carrying the offending variance.
        component: Component,
        /// The offending variance value.
        value: f64,
    },
}
