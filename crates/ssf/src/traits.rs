//! Capability traits of the linear Gaussian state-space contract.
//!
//! A state-space model is described to the estimation engine through three
//! capability traits:
//!
//! ```text
//! x[t+1] = T(t) * x[t] + S(t) * u[t]      (state transition)
//! y[t]   = Z(t) . x[t] + error            (observation)
//! x[0]  ~ N(a0, Pf0 + kappa * B * B')     (initial state, kappa -> inf)
//! ```
//!
//! [`Initialization`] describes the initial state distribution, including
//! the diffuse directions of non-stationary components; [`Dynamics`] the
//! transition and innovation structure; [`Loading`] the measurement row.
//!
//! Every operation writes into caller-allocated buffers and never resizes
//! them. Matrix-fill operations (`t`, `v`, `s`, `z`, `pf0`, `pi0`,
//! `diffuse_constraints`, `a0`) assume the buffer was zeroed by the caller
//! and only write the nonzero entries. Time indices (`pos`) are validated
//! by the caller; out-of-range access is an unchecked precondition on the
//! performance-critical path.

use ndarray::{Array1, ArrayView1, ArrayViewMut1, ArrayViewMut2};

/// Initial-condition contract of a state block.
///
/// The initial state is `N(a0, Pf0)` along the stationary directions and
/// formally infinite along `diffuse_dim()` directions spanned by the
/// columns of the constraint matrix `B`.
pub trait Initialization {
    /// State dimension `n`.
    fn state_dim(&self) -> usize;

    /// Number of diffuse directions `k` (0 for a fully stationary block).
    fn diffuse_dim(&self) -> usize;

    /// Whether any direction of the initial state is diffuse.
    fn is_diffuse(&self) -> bool {
        self.diffuse_dim() > 0
    }

    /// Fills the `n x k` diffuse constraint matrix `B`, whose columns span
    /// the diffuse directions.
    fn diffuse_constraints(&self, b: ArrayViewMut2<f64>) {
        let _ = b;
    }

    /// Fills the initial state mean `a0` (length `n`). The default leaves
    /// the caller-zeroed buffer untouched (zero mean).
    fn a0(&self, a: ArrayViewMut1<f64>) {
        let _ = a;
    }

    /// Fills the proper (finite) part of the initial covariance (`n x n`).
    fn pf0(&self, p: ArrayViewMut2<f64>);

    /// Fills the diffuse part of the initial covariance (`n x n`), a
    /// rank-`k` indicator with unit diagonal entries on the diffuse rows.
    fn pi0(&self, p: ArrayViewMut2<f64>) {
        let _ = p;
    }
}

/// Transition and innovation contract of a state block.
pub trait Dynamics {
    /// State dimension `n`.
    fn state_dim(&self) -> usize;

    /// Dimension `r` of the innovation vector `u` (number of columns of
    /// the factor `S`).
    fn innovations_dim(&self) -> usize;

    /// Whether `T`, `V` and `S` are independent of `pos`.
    fn is_time_invariant(&self) -> bool;

    /// Fills the transition matrix `T(pos)` (`n x n`).
    fn t(&self, pos: usize, m: ArrayViewMut2<f64>);

    /// Applies the transition in place: `x <- T(pos) * x`.
    ///
    /// Must agree with the matrix produced by [`Dynamics::t`] to within
    /// floating-point tolerance, but never materializes it. This is the
    /// hot path, called once per time step per filter pass.
    fn tx(&self, pos: usize, x: ArrayViewMut1<f64>);

    /// Applies the transposed transition in place: `x' <- x' * T(pos)`.
    /// Used by backward (smoothing) passes.
    fn xt(&self, pos: usize, x: ArrayViewMut1<f64>);

    /// Fills the innovation covariance `V(pos)` (`n x n`).
    fn v(&self, pos: usize, m: ArrayViewMut2<f64>);

    /// Fills a factor `S(pos)` (`n x r`) with `S * S' = V`.
    fn s(&self, pos: usize, m: ArrayViewMut2<f64>);

    /// Adds the innovation contribution: `x += S(pos) * u`, where `u` has
    /// length `r`.
    fn add_su(&self, pos: usize, x: ArrayViewMut1<f64>, u: ArrayView1<f64>);

    /// Computes `xs = x' * S(pos)` (length `r`).
    fn xs(&self, pos: usize, x: ArrayView1<f64>, xs: ArrayViewMut1<f64>);

    /// Adds the innovation covariance: `P += V(pos)`.
    fn add_v(&self, pos: usize, p: ArrayViewMut2<f64>);

    /// Updates a covariance through the transition: `P <- T(pos) P T(pos)'`.
    ///
    /// The default applies [`Dynamics::tx`] to every column, then to every
    /// row. Composite models override this to propagate cross-covariance
    /// blocks without touching sub-blocks that transform by the identity.
    fn tvt(&self, pos: usize, mut p: ArrayViewMut2<f64>) {
        let n = self.state_dim();
        let mut tmp = Array1::zeros(n);
        for j in 0..n {
            tmp.assign(&p.column(j));
            self.tx(pos, tmp.view_mut());
            p.column_mut(j).assign(&tmp);
        }
        for i in 0..n {
            tmp.assign(&p.row(i));
            self.tx(pos, tmp.view_mut());
            p.row_mut(i).assign(&tmp);
        }
    }
}

/// Measurement contract: the row vector `Z(pos)` mapping the state to the
/// observed scalar, plus the derived forms the filter actually evaluates.
pub trait Loading {
    /// Fills the measurement row `Z(pos)` (length `n`).
    fn z(&self, pos: usize, z: ArrayViewMut1<f64>);

    /// Inner product `Z(pos) . x`.
    fn zx(&self, pos: usize, x: ArrayView1<f64>) -> f64;

    /// Quadratic form `Z(pos) P Z(pos)'`.
    fn zvz(&self, pos: usize, p: ndarray::ArrayView2<f64>) -> f64;

    /// Covariance update `P += d * Z(pos)' Z(pos)`.
    fn vpzdz(&self, pos: usize, p: ArrayViewMut2<f64>, d: f64);

    /// State update `x += d * Z(pos)'`.
    fn xpzd(&self, pos: usize, x: ArrayViewMut1<f64>, d: f64);
}

/// A full state-space model: initial conditions, dynamics and measurement.
///
/// Blanket-implemented for any type carrying all three capabilities; the
/// external filter/smoother only ever sees this bound.
pub trait Ssf: Initialization + Dynamics + Loading {}

impl<M: Initialization + Dynamics + Loading> Ssf for M {}

/// An `(Initialization, Dynamics)` pair describing one state block without
/// a measurement equation of its own.
///
/// Both parts are stateless function objects parametrized once at
/// construction; the component owns them by value and delegates.
#[derive(Clone, Debug)]
pub struct StateComponent<I, D> {
    init: I,
    dynamics: D,
}

impl<I: Initialization, D: Dynamics> StateComponent<I, D> {
    /// Bundles an initialization with a dynamics of the same dimension.
    pub fn new(init: I, dynamics: D) -> Self {
        debug_assert_eq!(init.state_dim(), dynamics.state_dim());
        Self { init, dynamics }
    }

    /// The initialization part.
    pub fn initialization(&self) -> &I {
        &self.init
    }

    /// The dynamics part.
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }
}

impl<I: Initialization, D: Dynamics> Initialization for StateComponent<I, D> {
    fn state_dim(&self) -> usize {
        self.init.state_dim()
    }

    fn diffuse_dim(&self) -> usize {
        self.init.diffuse_dim()
    }

    fn diffuse_constraints(&self, b: ArrayViewMut2<f64>) {
        self.init.diffuse_constraints(b);
    }

    fn a0(&self, a: ArrayViewMut1<f64>) {
        self.init.a0(a);
    }

    fn pf0(&self, p: ArrayViewMut2<f64>) {
        self.init.pf0(p);
    }

    fn pi0(&self, p: ArrayViewMut2<f64>) {
        self.init.pi0(p);
    }
}

impl<I: Initialization, D: Dynamics> Dynamics for StateComponent<I, D> {
    fn state_dim(&self) -> usize {
        self.dynamics.state_dim()
    }

    fn innovations_dim(&self) -> usize {
        self.dynamics.innovations_dim()
    }

    fn is_time_invariant(&self) -> bool {
        self.dynamics.is_time_invariant()
    }

    fn t(&self, pos: usize, m: ArrayViewMut2<f64>) {
        self.dynamics.t(pos, m);
    }

    fn tx(&self, pos: usize, x: ArrayViewMut1<f64>) {
        self.dynamics.tx(pos, x);
    }

    fn xt(&self, pos: usize, x: ArrayViewMut1<f64>) {
        self.dynamics.xt(pos, x);
    }

    fn v(&self, pos: usize, m: ArrayViewMut2<f64>) {
        self.dynamics.v(pos, m);
    }

    fn s(&self, pos: usize, m: ArrayViewMut2<f64>) {
        self.dynamics.s(pos, m);
    }

    fn add_su(&self, pos: usize, x: ArrayViewMut1<f64>, u: ArrayView1<f64>) {
        self.dynamics.add_su(pos, x, u);
    }

    fn xs(&self, pos: usize, x: ArrayView1<f64>, xs: ArrayViewMut1<f64>) {
        self.dynamics.xs(pos, x, xs);
    }

    fn add_v(&self, pos: usize, p: ArrayViewMut2<f64>) {
        self.dynamics.add_v(pos, p);
    }

    fn tvt(&self, pos: usize, p: ArrayViewMut2<f64>) {
        self.dynamics.tvt(pos, p);
    }
}
