//! The synthesis implementation: fitting a four-bar linkage to target points.
//!
//! The fitting problem is split into the objective ([`FbFit`], a
//! [`Residual`]) and the optimizer ([`LeastSquares`]). Any bounded least
//! squares method can replace the default [`Lm`].
//!
//! ```
//! use four_bar_fit::{curve, syn, FourBar};
//! use syn::LeastSquares as _;
//!
//! let angles = curve::angles(36);
//! let target = FourBar::example().curve_by(&angles);
//! let cfg = syn::SynCfg::default();
//! let [cx, cy] = curve::bounding_center(&target);
//! let func = syn::FbFit::new(&target, &angles);
//! let x0 = syn::initial_guess(cx, cy).vectorized();
//! let s = syn::Lm::from_cfg(&cfg).solve(&func, &x0, &syn::Bounds::around([cx, cy], &cfg));
//! assert!(s.report.nfev <= cfg.max_nfev);
//! ```
pub use self::{cfg::SynCfg, lm::Lm};
use crate::{curve::Coord, FourBar};

mod cfg;
mod lm;

/// A vector-valued residual function of a parameter vector.
pub trait Residual {
    /// Number of residual entries.
    fn dim(&self) -> usize;

    /// Evaluate the residuals of `xs` into `out`, which has [`Residual::dim`]
    /// entries.
    fn residual(&self, xs: &[f64], out: &mut [f64]);

    /// Half of the squared residual norm.
    fn cost(&self, xs: &[f64]) -> f64 {
        let mut out = vec![0.; self.dim()];
        self.residual(xs, &mut out);
        0.5 * out.iter().map(|r| r * r).sum::<f64>()
    }
}

impl<R: Residual + ?Sized> Residual for &R {
    fn dim(&self) -> usize {
        R::dim(self)
    }

    fn residual(&self, xs: &[f64], out: &mut [f64]) {
        R::residual(self, xs, out);
    }
}

/// Bounded nonlinear least squares solver.
pub trait LeastSquares {
    /// Minimize the squared residuals of `func` from `x0` inside `bounds`.
    ///
    /// The solver must always return its best point, even when it stops
    /// without convergence.
    fn solve<F>(&self, func: &F, x0: &[f64], bounds: &Bounds) -> Solution
    where
        F: Residual + ?Sized;
}

/// Box constraints of the parameters.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Lower bounds
    pub lower: Vec<f64>,
    /// Upper bounds
    pub upper: Vec<f64>,
}

impl Bounds {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ or a lower bound exceeds its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        assert_eq!(lower.len(), upper.len());
        assert!(lower.iter().zip(&upper).all(|(lb, ub)| lb <= ub));
        Self { lower, upper }
    }

    /// Unbounded box of dimension `n`.
    pub fn unbounded(n: usize) -> Self {
        Self::new(vec![f64::NEG_INFINITY; n], vec![f64::INFINITY; n])
    }

    /// Bounds of the four-bar parameters around the target center.
    ///
    /// Ground pivots stay within `ground_span` of the center per axis, the
    /// links within `link_range`, and the coupler point within
    /// `offset_span` of joint `B` per axis.
    pub fn around([cx, cy]: Coord, cfg: &SynCfg) -> Self {
        let SynCfg {
            ground_span: g,
            link_range: [l_min, l_max],
            offset_span: o,
            ..
        } = *cfg;
        let lower = vec![cx - g, cy - g, cx - g, cy - g, l_min, l_min, l_min, -o, -o];
        let upper = vec![cx + g, cy + g, cx + g, cy + g, l_max, l_max, l_max, o, o];
        Self::new(lower, upper)
    }

    /// Dimension of the box.
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Project `xs` into the box.
    pub fn clamp(&self, xs: &mut [f64]) {
        for ((x, lb), ub) in xs.iter_mut().zip(&self.lower).zip(&self.upper) {
            *x = x.clamp(*lb, *ub);
        }
    }

    /// Return true if `xs` is inside the box.
    pub fn contains(&self, xs: &[f64]) -> bool {
        xs.len() == self.dim()
            && xs
                .iter()
                .zip(&self.lower)
                .zip(&self.upper)
                .all(|((x, lb), ub)| lb <= x && x <= ub)
    }
}

/// Initial guess of the four-bar parameters from the target center.
///
/// Crank pivot at `(cx - 20, cy)`, follower pivot at `(cx + 40, cy)`, links
/// `20, 40, 35` and the coupler point at `(10, 0)`.
pub const fn initial_guess(cx: f64, cy: f64) -> FourBar {
    FourBar {
        ax: cx - 20.,
        ay: cy,
        dx: cx + 40.,
        dy: cy,
        l_ab: 20.,
        l_bc: 40.,
        l_cd: 35.,
        px: 10.,
        py: 0.,
    }
}

/// Why the solver stopped.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The relative cost reduction fell below `ftol`
    Ftol,
    /// The step size fell below `xtol`
    Xtol,
    /// The projected gradient fell below `gtol`
    Gtol,
    /// The damping grew without finding a lower cost
    Stalled,
    /// The evaluation budget ran out before convergence
    BudgetExhausted,
}

impl Status {
    /// Return true if a convergence criterion was met.
    pub const fn is_converged(&self) -> bool {
        !matches!(self, Self::BudgetExhausted)
    }
}

/// Statistics of a solver run.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Report {
    /// Final cost, half of the squared residual norm
    pub cost: f64,
    /// Objective evaluations charged to the budget
    pub nfev: usize,
    /// Jacobian evaluations
    pub njev: usize,
    /// Stop reason
    pub status: Status,
}

/// Output of a [`LeastSquares`] solver.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Best parameters
    pub xs: Vec<f64>,
    /// Run statistics
    pub report: Report,
}

/// Path fitting task of a four-bar linkage.
///
/// The residuals are the coupler points minus the target points, flattened
/// as `[x0, y0, x1, y1, ...]`.
pub struct FbFit<'a> {
    target: &'a [Coord],
    angles: &'a [f64],
}

impl<'a> FbFit<'a> {
    /// Create a new task. Target points and angles are paired by index.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn new(target: &'a [Coord], angles: &'a [f64]) -> Self {
        assert_eq!(target.len(), angles.len());
        Self { target, angles }
    }

    /// Target points.
    pub fn target(&self) -> &[Coord] {
        self.target
    }

    /// Crank angles.
    pub fn angles(&self) -> &[f64] {
        self.angles
    }
}

impl Residual for FbFit<'_> {
    fn dim(&self) -> usize {
        self.target.len() * 2
    }

    fn residual(&self, xs: &[f64], out: &mut [f64]) {
        let fb = FourBar::from_slice(xs);
        let curve = fb.curve_by(self.angles);
        for ((r, [x, y]), [tx, ty]) in out.chunks_exact_mut(2).zip(curve).zip(self.target) {
            r[0] = x - tx;
            r[1] = y - ty;
        }
    }
}
