use super::*;
use nalgebra::{DMatrix, DVector};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;
const DIAG_MIN: f64 = 1e-12;

/// Bounded Levenberg-Marquardt solver.
///
/// Steps are projected onto the box and the damping is scaled by the
/// diagonal of `JᵀJ` (Marquardt). The Jacobian is approximated by forward
/// differences that step away from the nearest active bound. Only the trial
/// evaluations are charged to `max_nfev`, which still bounds the iterations
/// since every iteration makes at least one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct Lm {
    /// Maximum objective evaluations
    pub max_nfev: usize,
    /// Tolerance of the relative cost reduction
    pub ftol: f64,
    /// Tolerance of the relative step size
    pub xtol: f64,
    /// Tolerance of the projected gradient
    pub gtol: f64,
    /// Emit per-iteration diagnostics
    pub verbose: bool,
}

impl Default for Lm {
    fn default() -> Self {
        Self::from_cfg(&SynCfg::default())
    }
}

impl Lm {
    /// Create a solver from the synthesis configuration.
    pub fn from_cfg(cfg: &SynCfg) -> Self {
        let SynCfg {
            max_nfev,
            ftol,
            xtol,
            gtol,
            verbose,
            ..
        } = *cfg;
        Self {
            max_nfev,
            ftol,
            xtol,
            gtol,
            verbose,
        }
    }

    /// Set the evaluation budget.
    pub fn max_nfev(self, max_nfev: usize) -> Self {
        assert!(max_nfev > 0);
        Self { max_nfev, ..self }
    }
}

impl LeastSquares for Lm {
    fn solve<F>(&self, func: &F, x0: &[f64], bounds: &Bounds) -> Solution
    where
        F: Residual + ?Sized,
    {
        assert_eq!(x0.len(), bounds.dim());
        let n = x0.len();
        let m = func.dim();
        let mut xs = DVector::from_column_slice(x0);
        bounds.clamp(xs.as_mut_slice());
        let mut r = DVector::zeros(m);
        func.residual(xs.as_slice(), r.as_mut_slice());
        let mut cost = 0.5 * r.norm_squared();
        let mut nfev = 1;
        let mut njev = 0;
        let mut lambda = LAMBDA_INIT;
        let mut jac = DMatrix::zeros(m, n);
        let mut r_trial = DVector::zeros(m);
        let mut x_buf = vec![0.; n];
        let mut status = Status::BudgetExhausted;
        'outer: while nfev < self.max_nfev {
            jacobian(
                func,
                &xs,
                &r,
                bounds,
                &mut jac,
                &mut x_buf,
                r_trial.as_mut_slice(),
            );
            njev += 1;
            let g = jac.tr_mul(&r);
            if projected_norm(&g, &xs, bounds) < self.gtol {
                status = Status::Gtol;
                break;
            }
            let jtj = jac.tr_mul(&jac);
            let diag = jtj.diagonal().map(|d| d.max(DIAG_MIN));
            let neg_g = -g;
            loop {
                if nfev >= self.max_nfev {
                    break 'outer;
                }
                let mut a = jtj.clone();
                for i in 0..n {
                    a[(i, i)] += lambda * diag[i];
                }
                let Some(step) = a.cholesky().map(|c| c.solve(&neg_g)) else {
                    lambda *= 4.;
                    if lambda > LAMBDA_MAX {
                        status = Status::Stalled;
                        break 'outer;
                    }
                    continue;
                };
                let mut x_new = &xs + step;
                bounds.clamp(x_new.as_mut_slice());
                if (&x_new - &xs).norm() <= self.xtol * (self.xtol + xs.norm()) {
                    status = Status::Xtol;
                    break 'outer;
                }
                func.residual(x_new.as_slice(), r_trial.as_mut_slice());
                nfev += 1;
                let cost_new = 0.5 * r_trial.norm_squared();
                if cost_new.is_finite() && cost_new < cost {
                    let reduction = cost - cost_new;
                    let cost_old = cost;
                    xs = x_new;
                    std::mem::swap(&mut r, &mut r_trial);
                    cost = cost_new;
                    lambda = (lambda / 3.).max(LAMBDA_MIN);
                    if self.verbose {
                        tracing::debug!(nfev, njev, cost, lambda, "step accepted");
                    }
                    if reduction <= self.ftol * cost_old {
                        status = Status::Ftol;
                        break 'outer;
                    }
                    break;
                }
                lambda *= 4.;
                if self.verbose {
                    tracing::debug!(nfev, njev, cost, lambda, "step rejected");
                }
                if lambda > LAMBDA_MAX {
                    status = Status::Stalled;
                    break 'outer;
                }
            }
        }
        if !status.is_converged() {
            tracing::warn!(nfev, cost, "evaluation budget exhausted before convergence");
        }
        let report = Report {
            cost,
            nfev,
            njev,
            status,
        };
        let xs = xs.as_slice().to_vec();
        Solution { xs, report }
    }
}

// Forward-difference Jacobian, stepping inward at the bounds
fn jacobian<F>(
    func: &F,
    xs: &DVector<f64>,
    r: &DVector<f64>,
    bounds: &Bounds,
    jac: &mut DMatrix<f64>,
    x_buf: &mut [f64],
    r_buf: &mut [f64],
) where
    F: Residual + ?Sized,
{
    let sqrt_eps = f64::EPSILON.sqrt();
    x_buf.copy_from_slice(xs.as_slice());
    for (j, &x) in xs.iter().enumerate() {
        let (lb, ub) = (bounds.lower[j], bounds.upper[j]);
        let mut h = sqrt_eps * x.abs().max(1.);
        if x + h > ub {
            h = -h;
        }
        if x + h < lb {
            // Narrower box than the step, take the wider side
            h = if ub - x >= x - lb { ub - x } else { lb - x };
        }
        let h = (x + h) - x;
        if h == 0. {
            jac.column_mut(j).fill(0.);
            continue;
        }
        x_buf[j] = x + h;
        func.residual(x_buf, r_buf);
        x_buf[j] = x;
        for (i, (r1, r0)) in r_buf.iter().zip(r.iter()).enumerate() {
            jac[(i, j)] = (r1 - r0) / h;
        }
    }
}

// Infinity norm of the gradient without the components blocked by a bound
fn projected_norm(g: &DVector<f64>, xs: &DVector<f64>, bounds: &Bounds) -> f64 {
    g.iter()
        .zip(xs.iter())
        .enumerate()
        .filter(|&(i, (&g, &x))| {
            let blocked = x <= bounds.lower[i] && g > 0. || x >= bounds.upper[i] && g < 0.;
            !blocked
        })
        .map(|(_, (g, _))| g.abs())
        .fold(0., f64::max)
}
