//! Innovation variance structures of the seasonal component.
//!
//! All seasonal sub-models share the sum-to-zero companion transition on
//! `period - 1` states; they differ only in how the seasonal disturbance
//! is spread over those states. The structure matrices are built once at
//! model construction and kept as immutable constants.
//!
//! **Not part of the public API.**

use ndarray::Array2;
use std::f64::consts::PI;

use crate::spec::SeasonalModel;
use stsm_ssf::linalg::lcholesky;

/// Precomputed seasonal innovation covariance and a factor `S` with
/// `S * S' = V`, both already scaled by the seasonal variance.
#[derive(Clone, Debug)]
pub(crate) struct SeasonalInnovations {
    pub(crate) v: Array2<f64>,
    pub(crate) s: Array2<f64>,
}

impl SeasonalInnovations {
    /// Number of innovation columns of the factor.
    pub(crate) fn innovations_dim(&self) -> usize {
        self.s.ncols()
    }
}

/// Builds the innovation structure of `model` for the given period and
/// seasonal variance.
pub(crate) fn innovations(model: SeasonalModel, period: usize, var: f64) -> SeasonalInnovations {
    let n = period - 1;
    let std = var.sqrt();
    match model {
        SeasonalModel::Dummy => {
            // Single degree of freedom on the first state.
            let mut v = Array2::zeros((n, n));
            v[[0, 0]] = var;
            let mut s = Array2::zeros((n, 1));
            s[[0, 0]] = std;
            SeasonalInnovations { v, s }
        }
        SeasonalModel::Crude => {
            // One disturbance spread identically across all states.
            let v = Array2::from_elem((n, n), var);
            let s = Array2::from_shape_fn((n, 1), |_| std);
            SeasonalInnovations { v, s }
        }
        SeasonalModel::Trigonometric => {
            let structure = tsvar(period);
            let factor = lcholesky(structure.view());
            SeasonalInnovations {
                v: structure * var,
                s: factor * std,
            }
        }
        SeasonalModel::HarrisonStevens => {
            let structure = hsvar(period);
            let factor = lcholesky(structure.view());
            SeasonalInnovations {
                v: structure * var,
                s: factor * std,
            }
        }
    }
}

/// Trigonometric seasonal structure: `H * H'` where `H` stacks the
/// cosine/sine harmonics `cos(j * theta_i)`, `sin(j * theta_i)` with
/// `theta_i = 2 pi i / period`, harmonics `j = 1..period/2`, and the sine
/// column dropped for the Nyquist harmonic at even periods.
pub(crate) fn tsvar(period: usize) -> Array2<f64> {
    let n = period - 1;
    let mut h: Array2<f64> = Array2::zeros((n, n));
    let mut col = 0;
    for j in 1..=period / 2 {
        let freq = 2.0 * PI * j as f64 / period as f64;
        for i in 0..n {
            h[[i, col]] = (freq * i as f64).cos();
        }
        col += 1;
        if 2 * j != period {
            for i in 0..n {
                h[[i, col]] = (freq * i as f64).sin();
            }
            col += 1;
        }
    }
    debug_assert_eq!(col, n);
    h.dot(&h.t())
}

/// Harrison-Stevens structure on the sum-to-zero states:
/// `I - J / period` (with `J` the all-ones matrix).
pub(crate) fn hsvar(period: usize) -> Array2<f64> {
    let n = period - 1;
    let p = period as f64;
    let mut v = Array2::from_elem((n, n), -1.0 / p);
    let diag = 1.0 - 1.0 / p;
    for i in 0..n {
        v[[i, i]] = diag;
    }
    v
}

/// Companion sum-to-zero transition applied to a seasonal sub-vector:
/// new state 0 becomes minus the sum of the previous states, the rest
/// shift down by one.
pub(crate) fn companion_tx(x: &mut ndarray::ArrayViewMut1<f64>) {
    let d = x.len();
    let sum: f64 = x.iter().sum();
    for i in (1..d).rev() {
        x[i] = x[i - 1];
    }
    x[0] = -sum;
}

/// Transposed companion transition: entry `j` becomes `x[j + 1] - x[0]`
/// (with `x[d] = 0` past the end).
pub(crate) fn companion_xt(x: &mut ndarray::ArrayViewMut1<f64>) {
    let d = x.len();
    let x0 = x[0];
    for j in 0..d - 1 {
        x[j] = x[j + 1] - x0;
    }
    x[d - 1] = -x0;
}

/// Materialized companion transition block (row 0 all `-1`, identity on
/// the sub-diagonal). Used by the explicit `T` builder and by tests.
pub(crate) fn companion_matrix(d: usize) -> Array2<f64> {
    let mut t = Array2::zeros((d, d));
    for j in 0..d {
        t[[0, j]] = -1.0;
    }
    for i in 1..d {
        t[[i, i - 1]] = 1.0;
    }
    t
}
