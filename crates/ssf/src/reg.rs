//! Regression augmentation of a state-space model.
//!
//! Appends a block of regression coefficients to an existing model: the
//! augmented state is the original state concatenated with the
//! coefficients, and the measurement gains the term
//! `X[t, .] . coeffs` where `X` is the caller-supplied regressor matrix
//! (rows = time periods, columns = regression variables).
//!
//! The coefficients are always diffuse at initialization (never assumed
//! known a priori) and follow either a constant
//! ([`RegSsf::of`]) or random-walk ([`RegSsf::time_varying`]) law from
//! [`crate::coefficients`].

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use tracing::debug;

use crate::coefficients::{FixedCoefficients, TimeVaryingCoefficients};
use crate::error::SsfError;
use crate::traits::{Dynamics, Initialization, Loading, Ssf};

/// A state-space model augmented with a block of regression coefficients.
///
/// `S` is the base model, `C` the coefficient dynamics. The augmented
/// state vector is `[base (n) | coefficients (m)]`; the regression block
/// is always appended last.
#[derive(Clone, Debug)]
pub struct RegSsf<S, C> {
    base: S,
    x: Array2<f64>,
    coeffs: C,
    n: usize,
    m: usize,
}

impl<S: Ssf> RegSsf<S, FixedCoefficients> {
    /// Augments `base` with constant coefficients for the regressors `x`
    /// (`n_periods x n_regressors`).
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyRegressors`] if `x` has no rows or no columns.
    pub fn of(base: S, x: Array2<f64>) -> Result<Self, SsfError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(SsfError::EmptyRegressors);
        }
        let coeffs = FixedCoefficients::new(x.ncols())?;
        let n = Dynamics::state_dim(&base);
        let m = x.ncols();
        debug!(n, m, periods = x.nrows(), "augmented model with fixed coefficients");
        Ok(Self {
            base,
            x,
            coeffs,
            n,
            m,
        })
    }
}

impl<S: Ssf> RegSsf<S, TimeVaryingCoefficients> {
    /// Augments `base` with random-walk coefficients whose innovation
    /// covariance is `cov`, Cholesky-factorized once here.
    ///
    /// # Errors
    ///
    /// [`SsfError::EmptyRegressors`] if `x` has no rows or no columns;
    /// [`SsfError::NonSquareCovariance`] if `cov` is not square;
    /// [`SsfError::CovarianceDimensionMismatch`] if `cov`'s dimension
    /// differs from `x.ncols()`.
    pub fn time_varying(base: S, x: Array2<f64>, cov: ArrayView2<f64>) -> Result<Self, SsfError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(SsfError::EmptyRegressors);
        }
        if cov.nrows() != cov.ncols() {
            return Err(SsfError::NonSquareCovariance {
                rows: cov.nrows(),
                cols: cov.ncols(),
            });
        }
        if cov.nrows() != x.ncols() {
            return Err(SsfError::CovarianceDimensionMismatch {
                expected: x.ncols(),
                got: cov.nrows(),
            });
        }
        let coeffs = TimeVaryingCoefficients::full(cov)?;
        let n = Dynamics::state_dim(&base);
        let m = x.ncols();
        debug!(n, m, periods = x.nrows(), "augmented model with time-varying coefficients");
        Ok(Self {
            base,
            x,
            coeffs,
            n,
            m,
        })
    }
}

impl<S, C> RegSsf<S, C> {
    /// The base model.
    pub fn base(&self) -> &S {
        &self.base
    }

    /// The regressor matrix (read-only; rows = periods).
    pub fn regressors(&self) -> ArrayView2<f64> {
        self.x.view()
    }

    /// Number of regression coefficients appended to the state.
    pub fn coefficients_dim(&self) -> usize {
        self.m
    }
}

impl<S: Ssf, C: Dynamics> Initialization for RegSsf<S, C> {
    fn state_dim(&self) -> usize {
        self.n + self.m
    }

    fn diffuse_dim(&self) -> usize {
        self.base.diffuse_dim() + self.m
    }

    fn diffuse_constraints(&self, mut b: ArrayViewMut2<f64>) {
        let kb = self.base.diffuse_dim();
        if kb > 0 {
            self.base
                .diffuse_constraints(b.slice_mut(s![..self.n, ..kb]));
        }
        for i in 0..self.m {
            b[[self.n + i, kb + i]] = 1.0;
        }
    }

    fn a0(&self, mut a: ArrayViewMut1<f64>) {
        self.base.a0(a.slice_mut(s![..self.n]));
    }

    fn pf0(&self, mut p: ArrayViewMut2<f64>) {
        self.base.pf0(p.slice_mut(s![..self.n, ..self.n]));
    }

    fn pi0(&self, mut p: ArrayViewMut2<f64>) {
        self.base.pi0(p.slice_mut(s![..self.n, ..self.n]));
        for i in 0..self.m {
            p[[self.n + i, self.n + i]] = 1.0;
        }
    }
}

impl<S: Ssf, C: Dynamics> Dynamics for RegSsf<S, C> {
    fn state_dim(&self) -> usize {
        self.n + self.m
    }

    fn innovations_dim(&self) -> usize {
        self.base.innovations_dim() + self.coeffs.innovations_dim()
    }

    fn is_time_invariant(&self) -> bool {
        self.base.is_time_invariant() && self.coeffs.is_time_invariant()
    }

    fn t(&self, pos: usize, mut m: ArrayViewMut2<f64>) {
        self.base.t(pos, m.slice_mut(s![..self.n, ..self.n]));
        self.coeffs.t(pos, m.slice_mut(s![self.n.., self.n..]));
    }

    fn tx(&self, pos: usize, mut x: ArrayViewMut1<f64>) {
        self.base.tx(pos, x.slice_mut(s![..self.n]));
        self.coeffs.tx(pos, x.slice_mut(s![self.n..]));
    }

    fn xt(&self, pos: usize, mut x: ArrayViewMut1<f64>) {
        self.base.xt(pos, x.slice_mut(s![..self.n]));
        self.coeffs.xt(pos, x.slice_mut(s![self.n..]));
    }

    fn v(&self, pos: usize, mut m: ArrayViewMut2<f64>) {
        self.base.v(pos, m.slice_mut(s![..self.n, ..self.n]));
        self.coeffs.v(pos, m.slice_mut(s![self.n.., self.n..]));
    }

    fn s(&self, pos: usize, mut m: ArrayViewMut2<f64>) {
        let rb = self.base.innovations_dim();
        self.base.s(pos, m.slice_mut(s![..self.n, ..rb]));
        self.coeffs.s(pos, m.slice_mut(s![self.n.., rb..]));
    }

    fn add_su(&self, pos: usize, mut x: ArrayViewMut1<f64>, u: ArrayView1<f64>) {
        let rb = self.base.innovations_dim();
        self.base.add_su(pos, x.slice_mut(s![..self.n]), u.slice(s![..rb]));
        self.coeffs
            .add_su(pos, x.slice_mut(s![self.n..]), u.slice(s![rb..]));
    }

    fn xs(&self, pos: usize, x: ArrayView1<f64>, mut xs: ArrayViewMut1<f64>) {
        let rb = self.base.innovations_dim();
        self.base.xs(pos, x.slice(s![..self.n]), xs.slice_mut(s![..rb]));
        self.coeffs
            .xs(pos, x.slice(s![self.n..]), xs.slice_mut(s![rb..]));
    }

    fn add_v(&self, pos: usize, mut p: ArrayViewMut2<f64>) {
        self.base.add_v(pos, p.slice_mut(s![..self.n, ..self.n]));
        self.coeffs.add_v(pos, p.slice_mut(s![self.n.., self.n..]));
    }

    /// Full-covariance transition update.
    ///
    /// The coefficients transform by the identity, so only the base block
    /// and the base/coefficient cross block evolve: the cross block gets
    /// the base transition applied on the left, its mirror block the
    /// transpose, and the coefficient block is untouched.
    fn tvt(&self, pos: usize, mut p: ArrayViewMut2<f64>) {
        self.base.tvt(pos, p.slice_mut(s![..self.n, ..self.n]));

        let mut tmp = Array1::zeros(self.n);
        for j in self.n..self.n + self.m {
            tmp.assign(&p.slice(s![..self.n, j]));
            self.base.tx(pos, tmp.view_mut());
            p.slice_mut(s![..self.n, j]).assign(&tmp);
            p.slice_mut(s![j, ..self.n]).assign(&tmp);
        }
    }
}

impl<S: Ssf, C: Dynamics> Loading for RegSsf<S, C> {
    fn z(&self, pos: usize, mut z: ArrayViewMut1<f64>) {
        self.base.z(pos, z.slice_mut(s![..self.n]));
        z.slice_mut(s![self.n..]).assign(&self.x.row(pos));
    }

    fn zx(&self, pos: usize, x: ArrayView1<f64>) -> f64 {
        let base = self.base.zx(pos, x.slice(s![..self.n]));
        base + self.x.row(pos).dot(&x.slice(s![self.n..]))
    }

    fn zvz(&self, pos: usize, p: ArrayView2<f64>) -> f64 {
        let row = self.x.row(pos);
        let mut v = self.base.zvz(pos, p.slice(s![..self.n, ..self.n]));
        // Cross terms between the base loading and the coefficient block.
        for i in 0..self.m {
            v += 2.0 * row[i] * self.base.zx(pos, p.slice(s![..self.n, self.n + i]));
        }
        for i in 0..self.m {
            for j in 0..self.m {
                v += row[i] * row[j] * p[[self.n + i, self.n + j]];
            }
        }
        v
    }

    fn vpzdz(&self, pos: usize, mut p: ArrayViewMut2<f64>, d: f64) {
        let row = self.x.row(pos).to_owned();
        self.base.vpzdz(pos, p.slice_mut(s![..self.n, ..self.n]), d);
        for i in 0..self.m {
            // Cross block column and its mirror row get d * x_i * Zb'.
            self.base
                .xpzd(pos, p.slice_mut(s![..self.n, self.n + i]), d * row[i]);
            self.base
                .xpzd(pos, p.slice_mut(s![self.n + i, ..self.n]), d * row[i]);
        }
        for i in 0..self.m {
            for j in 0..self.m {
                p[[self.n + i, self.n + j]] += d * row[i] * row[j];
            }
        }
    }

    fn xpzd(&self, pos: usize, mut x: ArrayViewMut1<f64>, d: f64) {
        self.base.xpzd(pos, x.slice_mut(s![..self.n]), d);
        let row = self.x.row(pos);
        for i in 0..self.m {
            x[self.n + i] += d * row[i];
        }
    }
}
