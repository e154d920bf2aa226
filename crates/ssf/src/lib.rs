//! # stsm-ssf
//!
//! Generic linear Gaussian state-space representation for structural
//! time-series models.
//!
//! The crate defines the capability contract an external Kalman
//! filter/smoother drives ([`Initialization`], [`Dynamics`], [`Loading`]),
//! a library of regression-coefficient dynamics, and the regression
//! augmentation [`RegSsf`] that appends a coefficient block to any
//! existing model.
//!
//! ## Composition pattern
//!
//! ```ignore
//! // Base model from a collaborator (e.g. stsm-bsm), regressors from a
//! // calendar/outlier factory.
//! let augmented = RegSsf::of(base_model, regressors)?;
//! // Hand `augmented` (an `impl Ssf`) to the filtering engine.
//! ```
//!
//! Models are immutable after construction and `Send + Sync`; concurrent
//! filtering passes over independently built instances are safe by
//! construction.

mod coefficients;
mod error;
mod reg;
mod traits;

pub mod linalg;

pub use coefficients::{FixedCoefficients, ScaledCoefficients, TimeVaryingCoefficients};
pub use error::SsfError;
pub use reg::RegSsf;
pub use traits::{Dynamics, Initialization, Loading, Ssf, StateComponent};
