//! Dynamics of a block of regression-style coefficients.
//!
//! All variants share the martingale transition `T = I`; they differ only
//! in the innovation structure:
//!
//! | Variant | Innovations |
//! |---------|-------------|
//! | [`FixedCoefficients`] | none, coefficients are constant |
//! | [`TimeVaryingCoefficients::scalar`] | `V = var * I` |
//! | [`TimeVaryingCoefficients::diagonal`] | `V = diag(v_1..v_m)` |
//! | [`TimeVaryingCoefficients::full`] | general `V`, factored once |
//! | [`ScaledCoefficients`] | `stdev(t) = scale * weights[t]` |
//!
//! The innovation variant is resolved once at construction; the per-step
//! operations dispatch on a closed enum, never through a trait object.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::error::SsfError;
use crate::linalg;
use crate::traits::Dynamics;

/// Constant regression coefficients: `T = I`, no innovations.
///
/// The block stays in the state vector (the coefficients are estimated by
/// the filter through their diffuse initialization); only their innovation
/// is degenerate.
#[derive(Clone, Debug)]
pub struct FixedCoefficients {
    m: usize,
}

impl FixedCoefficients {
    /// Creates a block of `m` constant coefficients.
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyCoefficientBlock`] if `m == 0`.
    pub fn new(m: usize) -> Result<Self, SsfError> {
        if m == 0 {
            return Err(SsfError::EmptyCoefficientBlock);
        }
        Ok(Self { m })
    }
}

impl Dynamics for FixedCoefficients {
    fn state_dim(&self) -> usize {
        self.m
    }

    fn innovations_dim(&self) -> usize {
        0
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn t(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        for i in 0..self.m {
            m[[i, i]] = 1.0;
        }
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn v(&self, _pos: usize, _m: ArrayViewMut2<f64>) {}

    fn s(&self, _pos: usize, _m: ArrayViewMut2<f64>) {}

    fn add_su(&self, _pos: usize, _x: ArrayViewMut1<f64>, _u: ArrayView1<f64>) {}

    fn xs(&self, _pos: usize, _x: ArrayView1<f64>, _xs: ArrayViewMut1<f64>) {}

    fn add_v(&self, _pos: usize, _p: ArrayViewMut2<f64>) {}

    fn tvt(&self, _pos: usize, _p: ArrayViewMut2<f64>) {}
}

/// Innovation structure of a [`TimeVaryingCoefficients`] block, resolved
/// at construction.
#[derive(Clone, Debug)]
enum Innovations {
    /// All coefficients share one innovation standard deviation.
    Scalar(f64),
    /// Per-coefficient standard deviations.
    Diagonal(Array1<f64>),
    /// Full covariance and its lower-triangular factor.
    Full { v: Array2<f64>, s: Array2<f64> },
}

/// Random-walk regression coefficients: `T = I`, non-degenerate `V`.
#[derive(Clone, Debug)]
pub struct TimeVaryingCoefficients {
    m: usize,
    innovations: Innovations,
}

impl TimeVaryingCoefficients {
    /// A block of `m` coefficients sharing the innovation variance `var`
    /// (`V = var * I`, `S = sqrt(var) * I`).
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyCoefficientBlock`] if `m == 0`;
    /// [`SsfError::NegativeVariance`] if `var < 0`.
    pub fn scalar(m: usize, var: f64) -> Result<Self, SsfError> {
        if m == 0 {
            return Err(SsfError::EmptyCoefficientBlock);
        }
        if var < 0.0 {
            return Err(SsfError::NegativeVariance { value: var });
        }
        Ok(Self {
            m,
            innovations: Innovations::Scalar(var.sqrt()),
        })
    }

    /// A block with per-coefficient innovation variances
    /// (`V = diag(vars)`).
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyCoefficientBlock`] if `vars` is empty;
    /// [`SsfError::NegativeVariance`] if any variance is negative.
    pub fn diagonal(vars: &[f64]) -> Result<Self, SsfError> {
        if vars.is_empty() {
            return Err(SsfError::EmptyCoefficientBlock);
        }
        if let Some(&v) = vars.iter().find(|&&v| v < 0.0) {
            return Err(SsfError::NegativeVariance { value: v });
        }
        Ok(Self {
            m: vars.len(),
            innovations: Innovations::Diagonal(vars.iter().map(|v| v.sqrt()).collect()),
        })
    }

    /// A block with a full innovation covariance.
    ///
    /// The lower-triangular factor is computed once here, with a small
    /// positive floor on the pivots so that near-singular covariances
    /// still factor.
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyCoefficientBlock`] if `cov` is `0 x 0`;
    /// [`SsfError::NonSquareCovariance`] if `cov` is not square.
    pub fn full(cov: ArrayView2<f64>) -> Result<Self, SsfError> {
        if cov.nrows() != cov.ncols() {
            return Err(SsfError::NonSquareCovariance {
                rows: cov.nrows(),
                cols: cov.ncols(),
            });
        }
        if cov.nrows() == 0 {
            return Err(SsfError::EmptyCoefficientBlock);
        }
        let s = linalg::lcholesky(cov);
        Ok(Self {
            m: cov.nrows(),
            innovations: Innovations::Full {
                v: cov.to_owned(),
                s,
            },
        })
    }
}

impl Dynamics for TimeVaryingCoefficients {
    fn state_dim(&self) -> usize {
        self.m
    }

    fn innovations_dim(&self) -> usize {
        self.m
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn t(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        for i in 0..self.m {
            m[[i, i]] = 1.0;
        }
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn v(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        match &self.innovations {
            Innovations::Scalar(std) => {
                let var = std * std;
                for i in 0..self.m {
                    m[[i, i]] = var;
                }
            }
            Innovations::Diagonal(stds) => {
                for i in 0..self.m {
                    m[[i, i]] = stds[i] * stds[i];
                }
            }
            Innovations::Full { v, .. } => m.assign(v),
        }
    }

    fn s(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        match &self.innovations {
            Innovations::Scalar(std) => {
                for i in 0..self.m {
                    m[[i, i]] = *std;
                }
            }
            Innovations::Diagonal(stds) => {
                for i in 0..self.m {
                    m[[i, i]] = stds[i];
                }
            }
            Innovations::Full { s, .. } => m.assign(s),
        }
    }

    fn add_su(&self, _pos: usize, mut x: ArrayViewMut1<f64>, u: ArrayView1<f64>) {
        match &self.innovations {
            Innovations::Scalar(std) => {
                for i in 0..self.m {
                    x[i] += std * u[i];
                }
            }
            Innovations::Diagonal(stds) => {
                for i in 0..self.m {
                    x[i] += stds[i] * u[i];
                }
            }
            Innovations::Full { s, .. } => {
                for i in 0..self.m {
                    let mut acc = 0.0;
                    for k in 0..=i {
                        acc += s[[i, k]] * u[k];
                    }
                    x[i] += acc;
                }
            }
        }
    }

    fn xs(&self, _pos: usize, x: ArrayView1<f64>, mut xs: ArrayViewMut1<f64>) {
        match &self.innovations {
            Innovations::Scalar(std) => {
                for i in 0..self.m {
                    xs[i] = std * x[i];
                }
            }
            Innovations::Diagonal(stds) => {
                for i in 0..self.m {
                    xs[i] = stds[i] * x[i];
                }
            }
            Innovations::Full { s, .. } => {
                for j in 0..self.m {
                    let mut acc = 0.0;
                    for i in j..self.m {
                        acc += x[i] * s[[i, j]];
                    }
                    xs[j] = acc;
                }
            }
        }
    }

    fn add_v(&self, _pos: usize, mut p: ArrayViewMut2<f64>) {
        match &self.innovations {
            Innovations::Scalar(std) => {
                let var = std * std;
                for i in 0..self.m {
                    p[[i, i]] += var;
                }
            }
            Innovations::Diagonal(stds) => {
                for i in 0..self.m {
                    p[[i, i]] += stds[i] * stds[i];
                }
            }
            Innovations::Full { v, .. } => {
                p += v;
            }
        }
    }

    fn tvt(&self, _pos: usize, _p: ArrayViewMut2<f64>) {}
}

/// Random-walk coefficients whose innovation standard deviation follows an
/// externally supplied per-period profile: `stdev(t) = scale * weights[t]`,
/// or `scale` alone beyond the end of the profile.
///
/// Used when per-period innovation weights come from an outside source,
/// e.g. a heteroskedasticity profile. Reports `is_time_invariant() = false`.
#[derive(Clone, Debug)]
pub struct ScaledCoefficients {
    m: usize,
    scale: f64,
    weights: Vec<f64>,
}

impl ScaledCoefficients {
    /// Creates a block of `m` coefficients with innovation variance
    /// `(scale * weights[t])^2` at time `t`.
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyCoefficientBlock`] if `m == 0`;
    /// [`SsfError::NegativeVariance`] if `scale < 0` or any weight is
    /// negative.
    pub fn new(m: usize, scale: f64, weights: Vec<f64>) -> Result<Self, SsfError> {
        if m == 0 {
            return Err(SsfError::EmptyCoefficientBlock);
        }
        if scale < 0.0 {
            return Err(SsfError::NegativeVariance { value: scale });
        }
        if let Some(&w) = weights.iter().find(|&&w| w < 0.0) {
            return Err(SsfError::NegativeVariance { value: w });
        }
        Ok(Self { m, scale, weights })
    }

    fn stdev(&self, pos: usize) -> f64 {
        match self.weights.get(pos) {
            Some(w) => self.scale * w,
            None => self.scale,
        }
    }
}

impl Dynamics for ScaledCoefficients {
    fn state_dim(&self) -> usize {
        self.m
    }

    fn innovations_dim(&self) -> usize {
        self.m
    }

    fn is_time_invariant(&self) -> bool {
        false
    }

    fn t(&self, _pos: usize, mut m: ArrayViewMut2<f64>) {
        for i in 0..self.m {
            m[[i, i]] = 1.0;
        }
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<f64>) {}

    fn v(&self, pos: usize, mut m: ArrayViewMut2<f64>) {
        let var = self.stdev(pos).powi(2);
        for i in 0..self.m {
            m[[i, i]] = var;
        }
    }

    fn s(&self, pos: usize, mut m: ArrayViewMut2<f64>) {
        let std = self.stdev(pos);
        for i in 0..self.m {
            m[[i, i]] = std;
        }
    }

    fn add_su(&self, pos: usize, mut x: ArrayViewMut1<f64>, u: ArrayView1<f64>) {
        let std = self.stdev(pos);
        for i in 0..self.m {
            x[i] += std * u[i];
        }
    }

    fn xs(&self, pos: usize, x: ArrayView1<f64>, mut xs: ArrayViewMut1<f64>) {
        let std = self.stdev(pos);
        for i in 0..self.m {
            xs[i] = std * x[i];
        }
    }

    fn add_v(&self, pos: usize, mut p: ArrayViewMut2<f64>) {
        let var = self.stdev(pos).powi(2);
        for i in 0..self.m {
            p[[i, i]] += var;
        }
    }

    fn tvt(&self, _pos: usize, _p: ArrayViewMut2<f64>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SsfError;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};

    fn materialize_v(dyn_: &impl Dynamics, pos: usize) -> Array2<f64> {
        let n = dyn_.state_dim();
        let mut v = Array2::zeros((n, n));
        dyn_.v(pos, v.view_mut());
        v
    }

    fn materialize_s(dyn_: &impl Dynamics, pos: usize) -> Array2<f64> {
        let n = dyn_.state_dim();
        let r = dyn_.innovations_dim();
        let mut s = Array2::zeros((n, r));
        dyn_.s(pos, s.view_mut());
        s
    }

    fn assert_ssr_equals_v(dyn_: &impl Dynamics, pos: usize) {
        let v = materialize_v(dyn_, pos);
        let s = materialize_s(dyn_, pos);
        let ssr = s.dot(&s.t());
        for i in 0..dyn_.state_dim() {
            for j in 0..dyn_.state_dim() {
                assert_abs_diff_eq!(ssr[[i, j]], v[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn fixed_is_identity_transition() {
        let c = FixedCoefficients::new(3).unwrap();
        let mut t = Array2::zeros((3, 3));
        c.t(0, t.view_mut());
        let mut x = array![1.0, -2.0, 0.5];
        let expected = x.clone();
        c.tx(0, x.view_mut());
        assert_eq!(x, expected);
        let tx = t.dot(&expected);
        assert_eq!(tx, expected);
    }

    #[test]
    fn fixed_has_no_innovations() {
        let c = FixedCoefficients::new(2).unwrap();
        assert_eq!(c.innovations_dim(), 0);
        let mut p = Array2::from_elem((2, 2), 7.0);
        c.add_v(0, p.view_mut());
        assert_eq!(p, Array2::from_elem((2, 2), 7.0));
    }

    #[test]
    fn fixed_rejects_empty_block() {
        assert!(matches!(
            FixedCoefficients::new(0),
            Err(SsfError::EmptyCoefficientBlock)
        ));
    }

    #[test]
    fn scalar_variance_round_trip() {
        let c = TimeVaryingCoefficients::scalar(3, 2.25).unwrap();
        let v = materialize_v(&c, 0);
        for i in 0..3 {
            assert_abs_diff_eq!(v[[i, i]], 2.25, epsilon = 1e-12);
        }
        assert_ssr_equals_v(&c, 0);
    }

    #[test]
    fn scalar_rejects_negative_variance() {
        assert!(matches!(
            TimeVaryingCoefficients::scalar(2, -1.0),
            Err(SsfError::NegativeVariance { .. })
        ));
    }

    #[test]
    fn diagonal_variances_round_trip() {
        let c = TimeVaryingCoefficients::diagonal(&[1.0, 4.0, 0.25]).unwrap();
        let v = materialize_v(&c, 0);
        assert_abs_diff_eq!(v[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[[1, 1]], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[[2, 2]], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(v[[0, 1]], 0.0, epsilon = 1e-15);
        assert_ssr_equals_v(&c, 0);
    }

    #[test]
    fn diagonal_rejects_empty_and_negative() {
        assert!(matches!(
            TimeVaryingCoefficients::diagonal(&[]),
            Err(SsfError::EmptyCoefficientBlock)
        ));
        assert!(matches!(
            TimeVaryingCoefficients::diagonal(&[1.0, -0.5]),
            Err(SsfError::NegativeVariance { .. })
        ));
    }

    #[test]
    fn full_covariance_factor_round_trip() {
        let cov = array![[2.0, 0.5], [0.5, 1.0]];
        let c = TimeVaryingCoefficients::full(cov.view()).unwrap();
        let v = materialize_v(&c, 0);
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(v[[i, j]], cov[[i, j]], epsilon = 1e-12);
            }
        }
        assert_ssr_equals_v(&c, 0);
    }

    #[test]
    fn full_near_singular_still_factors() {
        // Almost rank-1.
        let cov = array![[1.0, 0.999999], [0.999999, 1.0]];
        let c = TimeVaryingCoefficients::full(cov.view()).unwrap();
        let v = materialize_v(&c, 0);
        let s = materialize_s(&c, 0);
        let ssr = s.dot(&s.t());
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(ssr[[i, j]], v[[i, j]], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn full_rejects_non_square() {
        let cov = Array2::zeros((2, 3));
        assert!(matches!(
            TimeVaryingCoefficients::full(cov.view()),
            Err(SsfError::NonSquareCovariance { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn full_add_su_matches_matrix_product() {
        let cov = array![[2.0, 0.5], [0.5, 1.0]];
        let c = TimeVaryingCoefficients::full(cov.view()).unwrap();
        let s = materialize_s(&c, 0);
        let u = array![0.7, -1.3];
        let mut x = array![1.0, 2.0];
        c.add_su(0, x.view_mut(), u.view());
        let expected = array![1.0, 2.0] + s.dot(&u);
        assert_abs_diff_eq!(x[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn full_add_su_second_moments_match_add_v() {
        // Driving the block with standard normal innovations must
        // reproduce the full covariance in the sample second moments.
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        let cov = array![[2.0, 0.5], [0.5, 1.0]];
        let c = TimeVaryingCoefficients::full(cov.view()).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let n_draws = 20_000;
        let mut acc = Array2::<f64>::zeros((2, 2));
        for _ in 0..n_draws {
            let u: Array1<f64> = (0..2).map(|_| normal.sample(&mut rng)).collect();
            let mut x = Array1::<f64>::zeros(2);
            c.add_su(0, x.view_mut(), u.view());
            for i in 0..2 {
                for j in 0..2 {
                    acc[[i, j]] += x[i] * x[j];
                }
            }
        }
        acc /= n_draws as f64;

        let mut v = Array2::zeros((2, 2));
        c.add_v(0, v.view_mut());
        for i in 0..2 {
            for j in 0..2 {
                assert!(
                    (acc[[i, j]] - v[[i, j]]).abs() < 0.1,
                    "second moment [{i},{j}] = {}, expected {}",
                    acc[[i, j]],
                    v[[i, j]]
                );
            }
        }
    }

    #[test]
    fn full_xs_matches_matrix_product() {
        let cov = array![[2.0, 0.5], [0.5, 1.0]];
        let c = TimeVaryingCoefficients::full(cov.view()).unwrap();
        let s = materialize_s(&c, 0);
        let x = array![0.3, -0.8];
        let mut xs = Array1::zeros(2);
        c.xs(0, x.view(), xs.view_mut());
        let expected = x.dot(&s);
        assert_abs_diff_eq!(xs[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(xs[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn scaled_profile_and_tail() {
        let c = ScaledCoefficients::new(2, 0.5, vec![2.0, 3.0]).unwrap();
        assert!(!c.is_time_invariant());

        // Within the profile: stdev = scale * weight.
        let v0 = materialize_v(&c, 0);
        assert_abs_diff_eq!(v0[[0, 0]], 1.0, epsilon = 1e-12);
        let v1 = materialize_v(&c, 1);
        assert_abs_diff_eq!(v1[[1, 1]], 2.25, epsilon = 1e-12);

        // Beyond the profile: stdev = scale alone.
        let v9 = materialize_v(&c, 9);
        assert_abs_diff_eq!(v9[[0, 0]], 0.25, epsilon = 1e-12);

        assert_ssr_equals_v(&c, 0);
        assert_ssr_equals_v(&c, 9);
    }

    #[test]
    fn scaled_rejects_negative_inputs() {
        assert!(matches!(
            ScaledCoefficients::new(1, -0.1, vec![]),
            Err(SsfError::NegativeVariance { .. })
        ));
        assert!(matches!(
            ScaledCoefficients::new(1, 0.1, vec![1.0, -1.0]),
            Err(SsfError::NegativeVariance { .. })
        ));
    }

    #[test]
    fn all_variants_keep_identity_tvt() {
        // T = I for every coefficient variant, so tvt must leave P alone.
        let p0 = array![[2.0, 0.3], [0.3, 1.5]];

        let fixed = FixedCoefficients::new(2).unwrap();
        let mut p = p0.clone();
        fixed.tvt(0, p.view_mut());
        assert_eq!(p, p0);

        let tv = TimeVaryingCoefficients::scalar(2, 1.0).unwrap();
        let mut p = p0.clone();
        tv.tvt(0, p.view_mut());
        assert_eq!(p, p0);

        let sc = ScaledCoefficients::new(2, 1.0, vec![]).unwrap();
        let mut p = p0.clone();
        sc.tvt(0, p.view_mut());
        assert_eq!(p, p0);
    }
}
