//! Basic structural model specification (unfitted).

use crate::error::BsmError;
use crate::layout::Component;

/// Usage and variance of one structural component.
///
/// A component is either absent from the model, present with a variance
/// the estimation loop may move (`Free`), or present with a variance held
/// constant (`Fixed`). A fixed zero variance keeps the component in the
/// state vector as a deterministic block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Parameter {
    /// The component is not part of the model.
    Unused,
    /// The component is estimated; payload is the current variance.
    Free(f64),
    /// The component is present with a constant variance.
    Fixed(f64),
}

impl Parameter {
    /// Whether the component occupies states in the model.
    pub fn in_use(&self) -> bool {
        !matches!(self, Parameter::Unused)
    }

    /// Whether the variance is subject to estimation.
    pub fn is_free(&self) -> bool {
        matches!(self, Parameter::Free(_))
    }

    /// The variance, or `None` when unused.
    pub fn variance(&self) -> Option<f64> {
        match self {
            Parameter::Unused => None,
            Parameter::Free(v) | Parameter::Fixed(v) => Some(*v),
        }
    }

    fn scaled(self, factor: f64) -> Self {
        match self {
            Parameter::Unused => Parameter::Unused,
            Parameter::Free(v) => Parameter::Free(v * factor),
            Parameter::Fixed(v) => Parameter::Fixed(v * factor),
        }
    }
}

/// Variance structure of the seasonal component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeasonalModel {
    /// Single degree of freedom on the sum-to-zero constraint.
    Dummy,
    /// Innovation spread identically across all `period - 1` states.
    Crude,
    /// Sum of cosine/sine harmonics with equal variance per harmonic.
    Trigonometric,
    /// Exchangeable per-season disturbances constrained to sum to zero.
    HarrisonStevens,
}

/// An immutable basic structural model specification.
///
/// Built once by the caller and consumed by the mapping step
/// ([`crate::BsmModel::of`]); never mutated by the state-space layer.
///
/// # Example
///
/// ```
/// use stsm_bsm::{BsmSpec, Parameter, SeasonalModel};
///
/// let spec = BsmSpec::new(12)
///     .with_noise(Parameter::Free(1.0))
///     .with_level(Parameter::Free(0.1))
///     .with_slope(Parameter::Free(0.01))
///     .with_seasonal(Parameter::Free(0.2))
///     .with_seasonal_model(SeasonalModel::Trigonometric);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsmSpec {
    period: usize,
    noise: Parameter,
    cycle: Parameter,
    level: Parameter,
    slope: Parameter,
    seasonal: Parameter,
    seasonal_model: SeasonalModel,
    cycle_damping: f64,
    cycle_length: f64,
}

impl BsmSpec {
    /// Creates a specification for series of the given seasonal `period`
    /// with every component unused.
    ///
    /// Defaults: trigonometric seasonal sub-model, cycle damping 0.9,
    /// cycle length of two years (`2 * period`).
    pub fn new(period: usize) -> Self {
        Self {
            period,
            noise: Parameter::Unused,
            cycle: Parameter::Unused,
            level: Parameter::Unused,
            slope: Parameter::Unused,
            seasonal: Parameter::Unused,
            seasonal_model: SeasonalModel::Trigonometric,
            cycle_damping: 0.9,
            cycle_length: 2.0 * period as f64,
        }
    }

    /// Sets the irregular (noise) component.
    pub fn with_noise(mut self, p: Parameter) -> Self {
        self.noise = p;
        self
    }

    /// Sets the cycle component.
    pub fn with_cycle(mut self, p: Parameter) -> Self {
        self.cycle = p;
        self
    }

    /// Sets the level component.
    pub fn with_level(mut self, p: Parameter) -> Self {
        self.level = p;
        self
    }

    /// Sets the slope component.
    pub fn with_slope(mut self, p: Parameter) -> Self {
        self.slope = p;
        self
    }

    /// Sets the seasonal component.
    pub fn with_seasonal(mut self, p: Parameter) -> Self {
        self.seasonal = p;
        self
    }

    /// Sets the seasonal variance structure.
    pub fn with_seasonal_model(mut self, model: SeasonalModel) -> Self {
        self.seasonal_model = model;
        self
    }

    /// Sets the cycle damping factor `rho` (must lie in (0, 1)).
    pub fn with_cycle_damping(mut self, rho: f64) -> Self {
        self.cycle_damping = rho;
        self
    }

    /// Sets the cycle length in periods (must exceed 2).
    pub fn with_cycle_length(mut self, length: f64) -> Self {
        self.cycle_length = length;
        self
    }

    /// Seasonal period of the series.
    pub fn period(&self) -> usize {
        self.period
    }

    /// The noise parameter.
    pub fn noise(&self) -> Parameter {
        self.noise
    }

    /// The cycle parameter.
    pub fn cycle(&self) -> Parameter {
        self.cycle
    }

    /// The level parameter.
    pub fn level(&self) -> Parameter {
        self.level
    }

    /// The slope parameter.
    pub fn slope(&self) -> Parameter {
        self.slope
    }

    /// The seasonal parameter.
    pub fn seasonal(&self) -> Parameter {
        self.seasonal
    }

    /// The seasonal variance structure.
    pub fn seasonal_model(&self) -> SeasonalModel {
        self.seasonal_model
    }

    /// The cycle damping factor `rho`.
    pub fn cycle_damping(&self) -> f64 {
        self.cycle_damping
    }

    /// The cycle length in periods.
    pub fn cycle_length(&self) -> f64 {
        self.cycle_length
    }

    /// Checks scalar ranges: period, cycle damping and length (when the
    /// cycle is in use), and variance signs.
    ///
    /// Cross-component consistency (e.g. slope without level) is the
    /// specification builder's responsibility and is deliberately not
    /// checked here.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`BsmError::InvalidPeriod`] | `period < 2` |
    /// | [`BsmError::InvalidCycleDampingFactor`] | cycle in use, `rho` outside (0, 1) |
    /// | [`BsmError::InvalidCycleLength`] | cycle in use, length <= 2 |
    /// | [`BsmError::NegativeVariance`] | any in-use variance below 0 |
    pub fn validate(&self) -> Result<(), BsmError> {
        if self.period < 2 {
            return Err(BsmError::InvalidPeriod {
                period: self.period,
            });
        }
        if self.cycle.in_use() {
            if self.cycle_damping <= 0.0 || self.cycle_damping >= 1.0 {
                return Err(BsmError::InvalidCycleDampingFactor {
                    rho: self.cycle_damping,
                });
            }
            if self.cycle_length <= 2.0 {
                return Err(BsmError::InvalidCycleLength {
                    length: self.cycle_length,
                });
            }
        }
        for (component, p) in self.components() {
            if let Some(v) = p.variance() {
                if v < 0.0 {
                    return Err(BsmError::NegativeVariance {
                        component,
                        value: v,
                    });
                }
            }
        }
        Ok(())
    }

    /// Multiplies every in-use variance by `factor`, returning the scaled
    /// specification.
    pub fn scale_variances(&self, factor: f64) -> Self {
        Self {
            noise: self.noise.scaled(factor),
            cycle: self.cycle.scaled(factor),
            level: self.level.scaled(factor),
            slope: self.slope.scaled(factor),
            seasonal: self.seasonal.scaled(factor),
            ..*self
        }
    }

    /// Largest strictly positive in-use variance, or 0.0 when none.
    ///
    /// Zero-variance (deterministic) components are silently skipped by
    /// the strict comparison.
    pub fn max_variance(&self) -> f64 {
        let mut max = 0.0;
        for (_, p) in self.components() {
            if let Some(v) = p.variance() {
                if v > max {
                    max = v;
                }
            }
        }
        max
    }

    /// Smallest strictly positive in-use variance, or 0.0 when none.
    pub fn min_variance(&self) -> f64 {
        let mut min = f64::INFINITY;
        for (_, p) in self.components() {
            if let Some(v) = p.variance() {
                if v > 0.0 && v < min {
                    min = v;
                }
            }
        }
        if min.is_finite() {
            min
        } else {
            0.0
        }
    }

    /// Rescales so that the largest strictly positive *free* variance
    /// becomes 1. A specification with no such variance is returned
    /// unchanged.
    ///
    /// This is the normalization an estimation loop applies between
    /// optimizer steps to keep the concentrated likelihood well scaled.
    pub fn fix_max_variance(&self) -> Self {
        let mut max = 0.0;
        for (_, p) in self.components() {
            if p.is_free() {
                if let Some(v) = p.variance() {
                    if v > max {
                        max = v;
                    }
                }
            }
        }
        if max > 0.0 {
            self.scale_variances(1.0 / max)
        } else {
            *self
        }
    }

    fn components(&self) -> [(Component, Parameter); 5] {
        [
            (Component::Noise, self.noise),
            (Component::Cycle, self.cycle),
            (Component::Level, self.level),
            (Component::Slope, self.slope),
            (Component::Seasonal, self.seasonal),
        ]
    }
}
