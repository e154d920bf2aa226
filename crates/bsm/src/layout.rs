//! Layout of the composite state vector.
//!
//! Enabled components always appear in the fixed order
//! noise -> cycle (2) -> level (1) -> slope (1) -> seasonal (period - 1),
//! with the regression block (if any) appended last by the augmentation in
//! `stsm-ssf`. All index arithmetic in the mapping depends on this order.
//!
//! The layout is computed once per specification and shared by the
//! dimension accounting and every matrix builder, so the two can never
//! drift apart.

use std::fmt;

use crate::spec::BsmSpec;

/// One structural component of the basic structural model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// Irregular (white-noise) component, 1 state.
    Noise,
    /// Damped stochastic cycle, 2 states.
    Cycle,
    /// Local level, 1 state.
    Level,
    /// Local slope, 1 state.
    Slope,
    /// Seasonal component, `period - 1` states.
    Seasonal,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Noise => "noise",
            Component::Cycle => "cycle",
            Component::Level => "level",
            Component::Slope => "slope",
            Component::Seasonal => "seasonal",
        };
        f.write_str(name)
    }
}

/// Offsets of the enabled components within the composite state vector.
#[derive(Clone, Copy, Debug)]
pub struct ComponentLayout {
    period: usize,
    noise: Option<usize>,
    cycle: Option<usize>,
    level: Option<usize>,
    slope: Option<usize>,
    seasonal: Option<usize>,
    dim: usize,
}

impl ComponentLayout {
    /// Computes the layout of a specification by walking the fixed
    /// component order and skipping disabled blocks.
    pub fn of(spec: &BsmSpec) -> Self {
        let mut off = 0;

        let noise = if spec.noise().in_use() {
            let p = off;
            off += 1;
            Some(p)
        } else {
            None
        };
        let cycle = if spec.cycle().in_use() {
            let p = off;
            off += 2;
            Some(p)
        } else {
            None
        };
        let level = if spec.level().in_use() {
            let p = off;
            off += 1;
            Some(p)
        } else {
            None
        };
        let slope = if spec.slope().in_use() {
            let p = off;
            off += 1;
            Some(p)
        } else {
            None
        };
        let seasonal = if spec.seasonal().in_use() {
            let p = off;
            off += spec.period() - 1;
            Some(p)
        } else {
            None
        };

        Self {
            period: spec.period(),
            noise,
            cycle,
            level,
            slope,
            seasonal,
            dim: off,
        }
    }

    /// Total state dimension (sum of enabled component dimensions).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Starting offset of `component` in the composite state vector, or
    /// `None` when the component is disabled. A disabled-component lookup
    /// is a common, expected query, not an error.
    pub fn position(&self, component: Component) -> Option<usize> {
        match component {
            Component::Noise => self.noise,
            Component::Cycle => self.cycle,
            Component::Level => self.level,
            Component::Slope => self.slope,
            Component::Seasonal => self.seasonal,
        }
    }

    /// Dimension of `component` when enabled, 0 otherwise.
    pub fn component_dim(&self, component: Component) -> usize {
        if self.position(component).is_none() {
            return 0;
        }
        match component {
            Component::Cycle => 2,
            Component::Seasonal => self.period - 1,
            _ => 1,
        }
    }

    /// Number of diffuse directions: 1 per enabled level/slope plus
    /// `period - 1` for an enabled seasonal.
    pub fn diffuse_dim(&self) -> usize {
        let mut k = 0;
        if self.level.is_some() {
            k += 1;
        }
        if self.slope.is_some() {
            k += 1;
        }
        if self.seasonal.is_some() {
            k += self.period - 1;
        }
        k
    }

    /// The seasonal period this layout was computed for.
    pub fn period(&self) -> usize {
        self.period
    }
}
