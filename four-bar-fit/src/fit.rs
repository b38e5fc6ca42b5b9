use crate::{
    assembly::Assembly,
    curve::{self, Coord},
    syn::{self, LeastSquares, Report, SynCfg},
    FourBar, Result,
};

/// Result of a synthesis.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Fit {
    /// Fitted linkage
    pub fb: FourBar,
    /// Crank angles, paired with the target points by index
    pub angles: Vec<f64>,
    /// Resampled target
    pub target: Vec<Coord>,
    /// Coupler curve of the fitted linkage at the crank angles
    pub curve: Vec<Coord>,
    /// Solver statistics
    pub report: Report,
}

impl Fit {
    /// Mean distance between the coupler curve and the resampled target.
    pub fn mean_err(&self) -> f64 {
        curve::mean_err(&self.target, &self.curve)
    }

    /// Largest distance between the coupler curve and the resampled target.
    pub fn max_err(&self) -> f64 {
        curve::max_err(&self.target, &self.curve)
    }

    /// Part description of the fitted linkage for the CAD collaborator.
    pub fn assembly(&self, prefix: &str) -> Assembly {
        Assembly::new(&self.fb, prefix)
    }
}

/// Fit a four-bar linkage to a traced path with `num_angles` samples and the
/// default configuration.
///
/// Fails only if the path has fewer than 2 points or `num_angles` is zero.
/// Non-convergence is not an error, see [`syn::Status`].
pub fn synthesize(target: &[Coord], num_angles: usize) -> Result<Fit> {
    synthesize_with(target, &SynCfg::default().num_angles(num_angles))
}

/// Fit a four-bar linkage to a traced path with the [`syn::Lm`] solver.
///
/// A configuration that fails [`SynCfg::check`] is rejected as well.
pub fn synthesize_with(target: &[Coord], cfg: &SynCfg) -> Result<Fit> {
    synthesize_with_solver(target, cfg, &syn::Lm::from_cfg(cfg))
}

/// Fit a four-bar linkage to a traced path with a custom solver.
pub fn synthesize_with_solver<S>(target: &[Coord], cfg: &SynCfg, solver: &S) -> Result<Fit>
where
    S: LeastSquares + ?Sized,
{
    let target = curve::resample(target, cfg.num_angles)?;
    cfg.check()?;
    let angles = curve::angles(cfg.num_angles);
    let center @ [cx, cy] = curve::bounding_center(&target);
    let x0 = syn::initial_guess(cx, cy).vectorized();
    let bounds = syn::Bounds::around(center, cfg);
    let func = syn::FbFit::new(&target, &angles);
    let syn::Solution { xs, report } = solver.solve(&func, &x0, &bounds);
    let fb = FourBar::from_slice(&xs);
    let curve = fb.curve_by(&angles);
    if cfg.verbose {
        let Report {
            cost,
            nfev,
            status,
            ..
        } = report;
        tracing::info!(?status, nfev, cost, "synthesis finished");
    }
    Ok(Fit {
        fb,
        angles,
        target,
        curve,
        report,
    })
}

/// Fit every path independently, the output order follows the input.
///
/// The paths are solved in parallel with the `rayon` feature.
pub fn synthesize_batch<C>(targets: &[C], cfg: &SynCfg) -> Vec<Result<Fit>>
where
    C: AsRef<[Coord]> + Sync,
{
    #[cfg(feature = "rayon")]
    use rayon::prelude::*;
    #[cfg(feature = "rayon")]
    let iter = targets.par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = targets.iter();
    iter.map(|c| synthesize_with(c.as_ref(), cfg)).collect()
}
