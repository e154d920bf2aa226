//! Mapping of a basic structural model onto the state-space contract.
//!
//! Converts a [`BsmSpec`] into the concrete
//! initialization/dynamics/loading triplet consumed by an external
//! Kalman filter. The composite state stacks the enabled components in
//! the fixed order of [`crate::layout`]:
//!
//! ```text
//! x = [ noise | cycle (2) | level | slope | seasonal (period-1) ]
//! y(t) = noise + cycle_0 + level + seasonal_0 + regression effects
//! ```
//!
//! Everything that does not depend on the time index (the seasonal
//! innovation matrix and its factor, the cycle rotation, the stationary
//! cycle variance) is computed once here and immutable afterwards.

use ndarray::{s, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use tracing::debug;

use stsm_ssf::{Dynamics, Initialization, Loading};

use crate::error::BsmError;
use crate::layout::{Component, ComponentLayout};
use crate::seasonal::{self, SeasonalInnovations};
use crate::spec::BsmSpec;

/// A scalar disturbance with its precomputed standard deviation.
#[derive(Clone, Copy, Debug)]
struct Disturbance {
    var: f64,
    std: f64,
}

impl Disturbance {
    fn new(var: f64) -> Self {
        Self {
            var,
            std: var.sqrt(),
        }
    }
}

/// Precomputed cycle quantities: damped rotation and stationary variance.
#[derive(Clone, Copy, Debug)]
struct Cycle {
    rho_cos: f64,
    rho_sin: f64,
    var: f64,
    std: f64,
    stationary_var: f64,
}

/// A basic structural model in state-space form.
///
/// Built once from a [`BsmSpec`] by [`BsmModel::of`] and immutable
/// afterwards; safe to share across concurrent filtering passes.
#[derive(Clone, Debug)]
pub struct BsmModel {
    layout: ComponentLayout,
    noise: Option<Disturbance>,
    cycle: Option<Cycle>,
    level: Option<Disturbance>,
    slope: Option<Disturbance>,
    seasonal: Option<SeasonalInnovations>,
    z_positions: Vec<usize>,
    innovations: usize,
}

impl BsmModel {
    /// Maps a specification onto the state-space contract.
    ///
    /// Scalar ranges are checked through [`BsmSpec::validate`] before
    /// anything is built; cross-component consistency (e.g. slope
    /// without level) remains the specification builder's business.
    ///
    /// # Errors
    ///
    /// [`BsmError::EmptyModel`] if no component is in use, plus every
    /// error [`BsmSpec::validate`] reports.
    pub fn of(spec: &BsmSpec) -> Result<Self, BsmError> {
        spec.validate()?;
        let layout = ComponentLayout::of(spec);
        if layout.dim() == 0 {
            return Err(BsmError::EmptyModel);
        }

        let noise = spec.noise().variance().map(Disturbance::new);
        let cycle = spec.cycle().variance().map(|var| {
            let rho = spec.cycle_damping();
            let q = 2.0 * std::f64::consts::PI / spec.cycle_length();
            Cycle {
                rho_cos: rho * q.cos(),
                rho_sin: rho * q.sin(),
                var,
                std: var.sqrt(),
                stationary_var: var / (1.0 - rho * rho),
            }
        });
        let level = spec.level().variance().map(Disturbance::new);
        let slope = spec.slope().variance().map(Disturbance::new);
        let seasonal = spec
            .seasonal()
            .variance()
            .map(|var| seasonal::innovations(spec.seasonal_model(), spec.period(), var));

        let mut innovations = 0;
        if noise.is_some() {
            innovations += 1;
        }
        if cycle.is_some() {
            innovations += 2;
        }
        if level.is_some() {
            innovations += 1;
        }
        if slope.is_some() {
            innovations += 1;
        }
        if let Some(seas) = &seasonal {
            innovations += seas.innovations_dim();
        }

        // Measurement row: 1 on noise, the first cycle state, the level
        // and the first seasonal state; the slope is unobserved.
        let mut z_positions = Vec::with_capacity(4);
        for c in [
            Component::Noise,
            Component::Cycle,
            Component::Level,
            Component::Seasonal,
        ] {
            if let Some(p) = layout.position(c) {
                z_positions.push(p);
            }
        }

        debug!(
            dim = layout.dim(),
            diffuse = layout.diffuse_dim(),
            innovations,
            "built BSM state-space model"
        );

        Ok(Self {
            layout,
            noise,
            cycle,
            level,
            slope,
            seasonal,
            z_positions,
            innovations,
        })
    }

    /// The component layout, for extracting per-component trajectories
    /// from filtered or smoothed output.
    pub fn layout(&self) -> &ComponentLayout {
        &self.layout
    }

    fn seasonal_dim(&self) -> usize {
        self.layout.component_dim(Component::Seasonal)
    }
}

impl Initialization for BsmModel {
    fn state_dim(&self) -> usize {
        self.layout.dim()
    }

    fn diffuse_dim(&self) -> usize {
        self.layout.diffuse_dim()
    }

    fn diffuse_constraints(&self, mut b: ArrayViewMut2<f64>) {
        let mut col = 0;
        if let Some(p) = self.layout.position(Component::Level) {
            b[[p, col]] = 1.0;
            col += 1;
        }
        if let Some(p) = self.layout.position(Component::Slope) {
            b[[p, col]] = 1.0;
            col += 1;
        }
        if let Some(p) = self.layout.position(Component::Seasonal) {
            for i in 0..self.seasonal_dim() {
                b[[p + i, col + i]] = 1.0;
            }
        }
    }

    fn pf0(&self, mut p: ArrayViewMut2<f64>) {
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            p[[pos, pos]] = noise.var;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            p[[pos, pos]] = cycle.stationary_var;
            p[[pos + 1, pos + 1]] = cycle.stationary_var;
        }
    }

    fn pi0(&self, mut p: ArrayViewMut2<f64>) {
        if let Some(pos) = self.layout.position(Component::Level) {
            p[[pos, pos]] = 1.0;
        }
        if let Some(pos) = self.layout.position(Component::Slope) {
            p[[pos, pos]] = 1.0;
        }
        if let Some(pos) = self.layout.position(Component::Seasonal) {
            for i in 0..self.seasonal_dim() {
                p[[pos + i, pos + i]] = 1.0;
            }
        }
    }
}

impl Dynamics for BsmModel {
    fn state_dim(&self) -> usize {
        self.layout.dim()
    }

    fn innovations_dim(&self) -> usize {
        self.innovations
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    /// Fills the transition matrix.
    ///
    /// The noise row is left at zero: the white-noise state does not
    /// persist. [`Dynamics::tx`] resets it explicitly instead of going
    /// through the matrix; both paths observably yield a zero noise
    /// state after one step.
    fn t(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            m[[pos, pos]] = cycle.rho_cos;
            m[[pos, pos + 1]] = cycle.rho_sin;
            m[[pos + 1, pos]] = -cycle.rho_sin;
            m[[pos + 1, pos + 1]] = cycle.rho_cos;
        }
        if let Some(pos) = self.layout.position(Component::Level) {
            m[[pos, pos]] = 1.0;
            if let Some(spos) = self.layout.position(Component::Slope) {
                m[[pos, spos]] = 1.0;
            }
        }
        if let Some(spos) = self.layout.position(Component::Slope) {
            m[[spos, spos]] = 1.0;
        }
        if let Some(pos) = self.layout.position(Component::Seasonal) {
            let d = self.seasonal_dim();
            m.slice_mut(s![pos..pos + d, pos..pos + d])
                .assign(&seasonal::companion_matrix(d));
        }
    }

    fn tx(&self, _pos: usize, mut x: ArrayViewMut1<f64>) {
        if let Some(pos) = self.layout.position(Component::Noise) {
            x[pos] = 0.0;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            let (a, b) = (x[pos], x[pos + 1]);
            x[pos] = cycle.rho_cos * a + cycle.rho_sin * b;
            x[pos + 1] = -cycle.rho_sin * a + cycle.rho_cos * b;
        }
        if let Some(pos) = self.layout.position(Component::Level) {
            if let Some(spos) = self.layout.position(Component::Slope) {
                x[pos] += x[spos];
            }
        }
        if let Some(pos) = self.layout.position(Component::Seasonal) {
            let d = self.seasonal_dim();
            seasonal::companion_tx(&mut x.slice_mut(s![pos..pos + d]));
        }
    }

    fn xt(&self, _pos: usize, mut x: ArrayViewMut1<f64>) {
        if let Some(pos) = self.layout.position(Component::Noise) {
            x[pos] = 0.0;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            let (a, b) = (x[pos], x[pos + 1]);
            x[pos] = cycle.rho_cos * a - cycle.rho_sin * b;
            x[pos + 1] = cycle.rho_sin * a + cycle.rho_cos * b;
        }
        if let Some(spos) = self.layout.position(Component::Slope) {
            if let Some(pos) = self.layout.position(Component::Level) {
                x[spos] += x[pos];
            }
        }
        if let Some(pos) = self.layout.position(Component::Seasonal) {
            let d = self.seasonal_dim();
            seasonal::companion_xt(&mut x.slice_mut(s![pos..pos + d]));
        }
    }

    fn v(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            m[[pos, pos]] = noise.var;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            m[[pos, pos]] = cycle.var;
            m[[pos + 1, pos + 1]] = cycle.var;
        }
        if let (Some(pos), Some(level)) = (self.layout.position(Component::Level), self.level) {
            m[[pos, pos]] = level.var;
        }
        if let (Some(pos), Some(slope)) = (self.layout.position(Component::Slope), self.slope) {
            m[[pos, pos]] = slope.var;
        }
        if let (Some(pos), Some(seas)) = (self.layout.position(Component::Seasonal), &self.seasonal)
        {
            let d = self.seasonal_dim();
            m.slice_mut(s![pos..pos + d, pos..pos + d]).assign(&seas.v);
        }
    }

    fn s(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        let mut col = 0;
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            m[[pos, col]] = noise.std;
            col += 1;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            m[[pos, col]] = cycle.std;
            m[[pos + 1, col + 1]] = cycle.std;
            col += 2;
        }
        if let (Some(pos), Some(level)) = (self.layout.position(Component::Level), self.level) {
            m[[pos, col]] = level.std;
            col += 1;
        }
        if let (Some(pos), Some(slope)) = (self.layout.position(Component::Slope), self.slope) {
            m[[pos, col]] = slope.std;
            col += 1;
        }
        if let (Some(pos), Some(seas)) = (self.layout.position(Component::Seasonal), &self.seasonal)
        {
            let d = self.seasonal_dim();
            let r = seas.innovations_dim();
            m.slice_mut(s![pos..pos + d, col..col + r]).assign(&seas.s);
        }
    }

    fn add_su(&self, _pos: usize, mut x: ArrayViewMut1<f64>, u: ArrayView1<f64>) {
        let mut col = 0;
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            x[pos] += noise.std * u[col];
            col += 1;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            x[pos] += cycle.std * u[col];
            x[pos + 1] += cycle.std * u[col + 1];
            col += 2;
        }
        if let (Some(pos), Some(level)) = (self.layout.position(Component::Level), self.level) {
            x[pos] += level.std * u[col];
            col += 1;
        }
        if let (Some(pos), Some(slope)) = (self.layout.position(Component::Slope), self.slope) {
            x[pos] += slope.std * u[col];
            col += 1;
        }
        if let (Some(pos), Some(seas)) = (self.layout.position(Component::Seasonal), &self.seasonal)
        {
            let d = self.seasonal_dim();
            let r = seas.innovations_dim();
            for i in 0..d {
                let mut acc = 0.0;
                for k in 0..r {
                    acc += seas.s[[i, k]] * u[col + k];
                }
                x[pos + i] += acc;
            }
        }
    }

    fn xs(&self, _pos: usize, x: ArrayView1<f64>, mut xs: ArrayViewMut1<f64>) {
        let mut col = 0;
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            xs[col] = noise.std * x[pos];
            col += 1;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            xs[col] = cycle.std * x[pos];
            xs[col + 1] = cycle.std * x[pos + 1];
            col += 2;
        }
        if let (Some(pos), Some(level)) = (self.layout.position(Component::Level), self.level) {
            xs[col] = level.std * x[pos];
            col += 1;
        }
        if let (Some(pos), Some(slope)) = (self.layout.position(Component::Slope), self.slope) {
            xs[col] = slope.std * x[pos];
            col += 1;
        }
        if let (Some(pos), Some(seas)) = (self.layout.position(Component::Seasonal), &self.seasonal)
        {
            let d = self.seasonal_dim();
            let r = seas.innovations_dim();
            for k in 0..r {
                let mut acc = 0.0;
                for i in 0..d {
                    acc += x[pos + i] * seas.s[[i, k]];
                }
                xs[col + k] = acc;
            }
        }
    }

    fn add_v(&self, _pos: usize, mut p: ArrayViewMut2<f64>) {
        if let (Some(pos), Some(noise)) = (self.layout.position(Component::Noise), self.noise) {
            p[[pos, pos]] += noise.var;
        }
        if let (Some(pos), Some(cycle)) = (self.layout.position(Component::Cycle), self.cycle) {
            p[[pos, pos]] += cycle.var;
            p[[pos + 1, pos + 1]] += cycle.var;
        }
        if let (Some(pos), Some(level)) = (self.layout.position(Component::Level), self.level) {
            p[[pos, pos]] += level.var;
        }
        if let (Some(pos), Some(slope)) = (self.layout.position(Component::Slope), self.slope) {
            p[[pos, pos]] += slope.var;
        }
        if let (Some(pos), Some(seas)) = (self.layout.position(Component::Seasonal), &self.seasonal)
        {
            let d = self.seasonal_dim();
            let mut block = p.slice_mut(s![pos..pos + d, pos..pos + d]);
            block += &seas.v;
        }
    }
}

impl Loading for BsmModel {
    fn z(&self, _pos: usize, mut z: ArrayViewMut1<f64>) {
        for &p in &self.z_positions {
            z[p] = 1.0;
        }
    }

    fn zx(&self, _pos: usize, x: ArrayView1<f64>) -> f64 {
        self.z_positions.iter().map(|&p| x[p]).sum()
    }

    fn zvz(&self, _pos: usize, p: ArrayView2<f64>) -> f64 {
        let mut sum = 0.0;
        for &a in &self.z_positions {
            for &b in &self.z_positions {
                sum += p[[a, b]];
            }
        }
        sum
    }

    fn vpzdz(&self, _pos: usize, mut p: ArrayViewMut2<f64>, d: f64) {
        for &a in &self.z_positions {
            for &b in &self.z_positions {
                p[[a, b]] += d;
            }
        }
    }

    fn xpzd(&self, _pos: usize, mut x: ArrayViewMut1<f64>, d: f64) {
        for &a in &self.z_positions {
            x[a] += d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Parameter, SeasonalModel};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2};

    fn level_only() -> BsmModel {
        let spec = BsmSpec::new(12).with_level(Parameter::Free(1.0));
        BsmModel::of(&spec).unwrap()
    }

    #[test]
    fn empty_spec_is_rejected() {
        let spec = BsmSpec::new(12);
        assert!(matches!(BsmModel::of(&spec), Err(BsmError::EmptyModel)));
    }

    #[test]
    fn level_only_round_trip() {
        let model = level_only();
        assert_eq!(Initialization::state_dim(&model), 1);
        assert!(model.is_diffuse());
        assert_eq!(model.diffuse_dim(), 1);

        let mut pi0 = Array2::zeros((1, 1));
        model.pi0(pi0.view_mut());
        assert_abs_diff_eq!(pi0[[0, 0]], 1.0, epsilon = 1e-15);

        let mut t = Array2::zeros((1, 1));
        model.t(0, t.view_mut());
        assert_abs_diff_eq!(t[[0, 0]], 1.0, epsilon = 1e-15);

        let mut v = Array2::zeros((1, 1));
        model.v(0, v.view_mut());
        assert_abs_diff_eq!(v[[0, 0]], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn dummy_seasonal_scenario() {
        let spec = BsmSpec::new(4)
            .with_seasonal(Parameter::Free(2.0))
            .with_seasonal_model(SeasonalModel::Dummy);
        let model = BsmModel::of(&spec).unwrap();

        assert_eq!(Initialization::state_dim(&model), 3);

        let mut t = Array2::zeros((3, 3));
        model.t(0, t.view_mut());
        assert_eq!(t.row(0).to_vec(), vec![-1.0, -1.0, -1.0]);
        assert_abs_diff_eq!(t[[1, 0]], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(t[[2, 1]], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(t[[1, 1]], 0.0, epsilon = 1e-15);

        let mut v = Array2::zeros((3, 3));
        model.v(0, v.view_mut());
        assert_abs_diff_eq!(v[[0, 0]], 2.0, epsilon = 1e-15);
        let nonzero = v.iter().filter(|x| **x != 0.0).count();
        assert_eq!(nonzero, 1);
    }

    #[test]
    fn invalid_spec_is_rejected_before_mapping() {
        for period in [0usize, 1] {
            let spec = BsmSpec::new(period).with_seasonal(Parameter::Free(1.0));
            assert!(matches!(
                BsmModel::of(&spec),
                Err(BsmError::InvalidPeriod { period: p }) if p == period
            ));
        }

        let spec = BsmSpec::new(12)
            .with_cycle(Parameter::Free(1.0))
            .with_cycle_damping(1.5);
        assert!(matches!(
            BsmModel::of(&spec),
            Err(BsmError::InvalidCycleDampingFactor { .. })
        ));
    }

    #[test]
    fn slope_without_level_keeps_paths_in_agreement() {
        // Out of contract, but the matrix and vector transitions must
        // still describe the same map.
        let spec = BsmSpec::new(12)
            .with_noise(Parameter::Free(1.0))
            .with_slope(Parameter::Free(0.1));
        let model = BsmModel::of(&spec).unwrap();

        let mut t = Array2::zeros((2, 2));
        model.t(0, t.view_mut());
        assert_abs_diff_eq!(t[[1, 1]], 1.0, epsilon = 1e-15);

        let x0 = ndarray::array![3.0, 0.7];
        let mut x = x0.clone();
        model.tx(0, x.view_mut());
        let expected = t.dot(&x0);
        assert_abs_diff_eq!(x[0], expected[0], epsilon = 1e-15);
        assert_abs_diff_eq!(x[1], expected[1], epsilon = 1e-15);
    }

    #[test]
    fn noise_resets_through_both_paths() {
        let spec = BsmSpec::new(12)
            .with_noise(Parameter::Free(1.0))
            .with_level(Parameter::Free(0.5));
        let model = BsmModel::of(&spec).unwrap();

        // Vector path.
        let mut x = ndarray::array![3.0, 1.0];
        model.tx(0, x.view_mut());
        assert_abs_diff_eq!(x[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-15);

        // Matrix path: the noise row of T is zero, so T x also kills it.
        let mut t = Array2::zeros((2, 2));
        model.t(0, t.view_mut());
        let tx = t.dot(&ndarray::array![3.0, 1.0]);
        assert_abs_diff_eq!(tx[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(tx[1], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn cycle_rotation_and_stationary_variance() {
        let rho = 0.8;
        let len = 24.0;
        let spec = BsmSpec::new(12)
            .with_cycle(Parameter::Free(0.5))
            .with_cycle_damping(rho)
            .with_cycle_length(len);
        let model = BsmModel::of(&spec).unwrap();
        assert_eq!(Initialization::state_dim(&model), 2);
        assert!(!model.is_diffuse());

        let q = 2.0 * std::f64::consts::PI / len;
        let mut t = Array2::zeros((2, 2));
        model.t(0, t.view_mut());
        assert_abs_diff_eq!(t[[0, 0]], rho * q.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(t[[0, 1]], rho * q.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(t[[1, 0]], -rho * q.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(t[[1, 1]], rho * q.cos(), epsilon = 1e-12);

        let mut pf0 = Array2::zeros((2, 2));
        model.pf0(pf0.view_mut());
        let expected = 0.5 / (1.0 - rho * rho);
        assert_abs_diff_eq!(pf0[[0, 0]], expected, epsilon = 1e-12);
        assert_abs_diff_eq!(pf0[[1, 1]], expected, epsilon = 1e-12);
    }

    #[test]
    fn local_linear_trend_transition() {
        let spec = BsmSpec::new(12)
            .with_level(Parameter::Free(0.5))
            .with_slope(Parameter::Free(0.1));
        let model = BsmModel::of(&spec).unwrap();

        let mut x = ndarray::array![2.0, 0.5];
        model.tx(0, x.view_mut());
        assert_abs_diff_eq!(x[0], 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(x[1], 0.5, epsilon = 1e-15);

        assert_eq!(model.diffuse_dim(), 2);
        let mut b = Array2::zeros((2, 2));
        model.diffuse_constraints(b.view_mut());
        assert_abs_diff_eq!(b[[0, 0]], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(b[[1, 1]], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn measurement_row_skips_slope() {
        let spec = BsmSpec::new(4)
            .with_noise(Parameter::Free(1.0))
            .with_level(Parameter::Free(0.5))
            .with_slope(Parameter::Free(0.1))
            .with_seasonal(Parameter::Free(0.2));
        let model = BsmModel::of(&spec).unwrap();
        let n = Initialization::state_dim(&model);
        assert_eq!(n, 1 + 1 + 1 + 3);

        let mut z = Array1::zeros(n);
        model.z(0, z.view_mut());
        // noise at 0, level at 1, slope at 2, seasonal first at 3.
        assert_eq!(z.to_vec(), vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0]);

        let x = ndarray::array![1.0, 2.0, 7.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(model.zx(0, x.view()), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn zvz_matches_materialized_quadratic_form() {
        let spec = BsmSpec::new(4)
            .with_noise(Parameter::Free(1.0))
            .with_level(Parameter::Free(0.5))
            .with_seasonal(Parameter::Free(0.2));
        let model = BsmModel::of(&spec).unwrap();
        let n = Initialization::state_dim(&model);

        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let a = Array2::from_shape_fn((n, n), |_| rng.gen_range(-1.0..1.0));
        let p = a.dot(&a.t()); // symmetric

        let mut z = Array1::zeros(n);
        model.z(0, z.view_mut());
        let expected = z.dot(&p.dot(&z));
        assert_abs_diff_eq!(model.zvz(0, p.view()), expected, epsilon = 1e-10);

        let mut updated = p.clone();
        model.vpzdz(0, updated.view_mut(), 0.4);
        let zc = z.clone().insert_axis(ndarray::Axis(1));
        let reference = &p + &(zc.dot(&zc.t()) * 0.4);
        for i in 0..n {
            for j in 0..n {
                assert_abs_diff_eq!(updated[[i, j]], reference[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn layout_accessor_positions() {
        let spec = BsmSpec::new(12)
            .with_noise(Parameter::Free(1.0))
            .with_seasonal(Parameter::Free(0.2));
        let model = BsmModel::of(&spec).unwrap();
        assert_eq!(model.layout().position(Component::Noise), Some(0));
        assert_eq!(model.layout().position(Component::Seasonal), Some(1));
        assert_eq!(model.layout().position(Component::Level), None);
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BsmModel>();
    }
}
