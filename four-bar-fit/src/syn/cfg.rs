use crate::{Error, Result};

/// Synthesis configuration.
///
/// Missing fields take their default values when deserialized.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SynCfg {
    /// Number of target samples and crank angles
    pub num_angles: usize,
    /// Maximum objective evaluations of the optimizer
    pub max_nfev: usize,
    /// Half width of the ground pivot box around the target center
    pub ground_span: f64,
    /// Range of the link lengths
    pub link_range: [f64; 2],
    /// Half width of the coupler point box
    pub offset_span: f64,
    /// Tolerance of the relative cost reduction
    pub ftol: f64,
    /// Tolerance of the relative step size
    pub xtol: f64,
    /// Tolerance of the projected gradient
    pub gtol: f64,
    /// Emit per-iteration diagnostics
    pub verbose: bool,
}

impl Default for SynCfg {
    fn default() -> Self {
        Self {
            num_angles: 120,
            max_nfev: 500,
            ground_span: 200.,
            link_range: [1., 400.],
            offset_span: 200.,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            verbose: false,
        }
    }
}

impl SynCfg {
    /// Set the number of target samples and crank angles.
    pub fn num_angles(self, num_angles: usize) -> Self {
        Self { num_angles, ..self }
    }

    /// Set the evaluation budget.
    pub fn max_nfev(self, max_nfev: usize) -> Self {
        assert!(max_nfev > 0);
        Self { max_nfev, ..self }
    }

    /// Set the range of the link lengths.
    pub fn link_range(self, min: f64, max: f64) -> Self {
        assert!(0. < min && min <= max);
        Self {
            link_range: [min, max],
            ..self
        }
    }

    /// Set the box half widths of the ground pivots and the coupler point.
    pub fn spans(self, ground_span: f64, offset_span: f64) -> Self {
        assert!(ground_span >= 0. && offset_span >= 0.);
        Self {
            ground_span,
            offset_span,
            ..self
        }
    }

    /// Set all three convergence tolerances.
    pub fn tol(self, tol: f64) -> Self {
        Self {
            ftol: tol,
            xtol: tol,
            gtol: tol,
            ..self
        }
    }

    /// Turn on per-iteration diagnostics.
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Check the fields that the builders assert.
    ///
    /// A deserialized configuration bypasses the builders, so the solver
    /// bounds are only built from it after this check passes.
    pub fn check(&self) -> Result<()> {
        let [l_min, l_max] = self.link_range;
        let bad_span = |span: f64| span.is_nan() || span < 0.;
        if l_min.is_nan() || l_max.is_nan() || l_min <= 0. || l_min > l_max {
            Err(Error::InvalidConfig("link_range"))
        } else if bad_span(self.ground_span) {
            Err(Error::InvalidConfig("ground_span"))
        } else if bad_span(self.offset_span) {
            Err(Error::InvalidConfig("offset_span"))
        } else if self.max_nfev == 0 {
            Err(Error::InvalidConfig("max_nfev"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{curve, synthesize_with, FourBar};

    #[test]
    fn check_ranges() {
        assert_eq!(SynCfg::default().check(), Ok(()));
        let cfg = SynCfg::default().link_range(5., 5.).spans(0., 0.);
        assert_eq!(cfg.check(), Ok(()));
        let cases: [(fn(&mut SynCfg), _); 6] = [
            (|c| c.link_range = [400., 1.], "link_range"),
            (|c| c.link_range = [0., 1.], "link_range"),
            (|c| c.link_range = [f64::NAN, 1.], "link_range"),
            (|c| c.ground_span = -1., "ground_span"),
            (|c| c.offset_span = f64::NAN, "offset_span"),
            (|c| c.max_nfev = 0, "max_nfev"),
        ];
        for (edit, field) in cases {
            let mut cfg = SynCfg::default();
            edit(&mut cfg);
            assert_eq!(cfg.check(), Err(Error::InvalidConfig(field)), "{field}");
        }
    }

    #[test]
    fn inverted_range_is_an_error() {
        let cfg = SynCfg {
            link_range: [400., 1.],
            ..SynCfg::default()
        };
        let target = FourBar::example().curve_by(&curve::angles(30));
        assert_eq!(
            synthesize_with(&target, &cfg),
            Err(Error::InvalidConfig("link_range"))
        );
    }

    #[test]
    fn verbose_has_no_effect_on_the_fit() {
        let cfg = SynCfg::default().num_angles(60).max_nfev(80);
        let target = FourBar::example().curve_by(&curve::angles(90));
        let quiet = synthesize_with(&target, &cfg);
        assert!(quiet.is_ok());
        assert_eq!(synthesize_with(&target, &cfg.clone().verbose(true)), quiet);
    }
}
