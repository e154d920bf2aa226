//! Small dense linear-algebra helpers shared by the dynamics builders,
//! here and in downstream model crates.

use ndarray::{Array2, ArrayView2};

/// Regularization floor applied to Cholesky pivots so that near-singular
/// covariance matrices still factor (robustness over exactness).
pub const CHOLESKY_FLOOR: f64 = 1e-9;

/// Lower-triangular Cholesky-style factor `L` of a symmetric positive
/// semi-definite matrix, with pivots floored at [`CHOLESKY_FLOOR`].
///
/// For a well-conditioned input `L * L' == V` exactly (up to rounding);
/// for a near-singular input the floor perturbs the factor by at most
/// `sqrt(CHOLESKY_FLOOR)` on the degenerate directions instead of failing.
///
/// Only the lower triangle of `v` is read.
pub fn lcholesky(v: ArrayView2<f64>) -> Array2<f64> {
    let n = v.nrows();
    let mut l: Array2<f64> = Array2::zeros((n, n));
    for j in 0..n {
        let mut d = v[[j, j]];
        for k in 0..j {
            d -= l[[j, k]] * l[[j, k]];
        }
        let d = d.max(CHOLESKY_FLOOR).sqrt();
        l[[j, j]] = d;
        for i in (j + 1)..n {
            let mut s = v[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = s / d;
        }
    }
    l
}
