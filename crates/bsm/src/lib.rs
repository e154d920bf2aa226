//! # stsm-bsm
//!
//! Basic structural model (BSM) specification and its mapping onto the
//! generic state-space contract of `stsm-ssf`.
//!
//! A BSM decomposes a series into level, slope, seasonal, cycle and
//! irregular (noise) components. The composite state vector stacks the
//! enabled components in a fixed canonical order; the regression block
//! added by `stsm_ssf::RegSsf` always comes last.
//!
//! # Quick start
//!
//! ```
//! use stsm_bsm::{BsmModel, BsmSpec, Parameter};
//! use stsm_ssf::Initialization;
//!
//! let spec = BsmSpec::new(12)
//!     .with_noise(Parameter::Free(1.0))
//!     .with_level(Parameter::Free(0.1))
//!     .with_seasonal(Parameter::Free(0.2));
//! spec.validate().unwrap();
//!
//! let model = BsmModel::of(&spec).unwrap();
//! assert_eq!(model.state_dim(), 1 + 1 + 11);
//! ```
//!
//! The resulting [`BsmModel`] implements
//! [`Initialization`](stsm_ssf::Initialization),
//! [`Dynamics`](stsm_ssf::Dynamics) and [`Loading`](stsm_ssf::Loading)
//! and is handed as-is to an external filtering/smoothing engine.

pub mod layout;
pub mod spec;

mod error;
mod model;
mod seasonal;

pub use error::BsmError;
pub use layout::{Component, ComponentLayout};
pub use model::BsmModel;
pub use spec::{BsmSpec, Parameter, SeasonalModel};
