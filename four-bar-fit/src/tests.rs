use crate::{curve::*, syn::*, *};
use approx::assert_abs_diff_eq;
use std::f64::consts::TAU;

fn circle(r: f64, n: usize) -> Vec<Coord> {
    linspace(0., TAU, n)
        .into_iter()
        .map(|t| [r * t.cos(), r * t.sin()])
        .collect()
}

fn mean_radius(curve: &[Coord]) -> f64 {
    curve.iter().map(|[x, y]| x.hypot(*y)).sum::<f64>() / curve.len() as f64
}

#[test]
fn fit_circle() {
    let fit = synthesize(&circle(50., 360), 120).unwrap();
    assert_eq!(fit.target.len(), 120);
    assert_eq!(fit.angles.len(), 120);
    assert_eq!(fit.curve, fit.fb.curve_by(&fit.angles));
    assert!(fit.report.nfev <= 500);
    assert!(fit.mean_err() < 2., "mean error {}", fit.mean_err());
    let bounds = Bounds::around(bounding_center(&fit.target), &SynCfg::default());
    assert!(bounds.contains(&fit.fb.vectorized()));
}

#[test]
fn fit_scaled_circle() {
    // The initial guess and the bounds do not scale with the target, so the
    // scaled problem may settle in another basin. The fitted parameters are
    // compared through the scaled linkage instead of one by one.
    let k = 2.;
    let fit = synthesize(&circle(50., 360), 120).unwrap();
    let scaled = circle(50., 360)
        .into_iter()
        .map(|[x, y]| [x * k, y * k])
        .collect::<Vec<_>>();
    let fit_k = synthesize(&scaled, 120).unwrap();
    assert!(fit_k.mean_err() < 2. * k);
    let ratio = mean_radius(&fit_k.curve) / mean_radius(&fit.curve);
    assert_abs_diff_eq!(ratio, k, epsilon = 0.2);
    let curve = fit.fb.clone().scale(k).curve_by(&fit_k.angles);
    let err = mean_err(&fit_k.target, &curve);
    assert_abs_diff_eq!(err, k * fit.mean_err(), epsilon = 1e-6);
}

#[test]
fn two_points() {
    let fit = synthesize(&[[0., 0.], [1., 1.]], 120).unwrap();
    assert_eq!(fit.target.first(), Some(&[0., 0.]));
    assert_eq!(fit.target.last(), Some(&[1., 1.]));
    assert!(fit.fb.vectorized().iter().all(|x| x.is_finite()));
    assert!(fit.curve.iter().flatten().all(|x| x.is_finite()));
}

#[test]
fn invalid_input() {
    assert_eq!(
        synthesize(&[[0., 0.]], 120),
        Err(Error::InvalidInput { len: 1 })
    );
    assert_eq!(synthesize(&[], 120), Err(Error::InvalidInput { len: 0 }));
    assert_eq!(
        synthesize(&[[0., 0.], [1., 1.]], 0),
        Err(Error::InvalidResolution)
    );
}

#[test]
fn deterministic() {
    let target = FourBar::example().curve_by(&angles(200));
    let a = synthesize(&target, 120).unwrap();
    let b = synthesize(&target, 120).unwrap();
    assert_eq!(a, b);
}

#[test]
fn small_budget() {
    let cfg = SynCfg::default().max_nfev(5);
    let fit = synthesize_with(&circle(50., 360), &cfg).unwrap();
    assert!(fit.report.nfev <= 5);
    // Never worse than the initial guess
    let [cx, cy] = bounding_center(&fit.target);
    let func = FbFit::new(&fit.target, &fit.angles);
    let x0 = initial_guess(cx, cy).vectorized();
    assert!(fit.report.cost <= func.cost(&x0));
}

#[test]
fn batch_keeps_order() {
    let cfg = SynCfg::default().num_angles(60);
    let targets = vec![circle(30., 90), vec![[0., 0.]], circle(80., 90)];
    let fits = synthesize_batch(&targets, &cfg);
    assert_eq!(fits.len(), 3);
    assert_eq!(fits[0], synthesize_with(&targets[0], &cfg));
    assert_eq!(fits[1], Err(Error::InvalidInput { len: 1 }));
    assert_eq!(fits[2], synthesize_with(&targets[2], &cfg));
}

#[test]
fn kinematics_totality() {
    // Every combination of lower, middle and upper bound per parameter
    let bounds = Bounds::around([0., 0.], &SynCfg::default());
    let t = linspace(0., TAU, 13);
    let mut xs = [0.; FourBar::DIM];
    for code in 0..3usize.pow(FourBar::DIM as u32) {
        let mut c = code;
        for (i, x) in xs.iter_mut().enumerate() {
            let (lb, ub) = (bounds.lower[i], bounds.upper[i]);
            *x = [lb, (lb + ub) * 0.5, ub][c % 3];
            c /= 3;
        }
        let fb = FourBar::from_slice(&xs);
        for [b, c, p] in fb.curves_by(&t[..12]) {
            let finite = b.iter().chain(&c).chain(&p).all(|x| x.is_finite());
            assert!(finite, "{fb:?}");
        }
    }
}

#[test]
fn branch_continuity() {
    let n = 3600;
    let t = angles(n);
    for fb in [
        FourBar::example(),
        FourBar {
            px: -30.,
            py: 60.,
            ..FourBar::example()
        },
        FourBar::example().scale(3.),
    ] {
        let curve = fb.curve_by(&t);
        let step = fb.l_ab * TAU / (n - 1) as f64;
        let max_jump = curve
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]).hypot(w[1][1] - w[0][1]))
            .fold(0., f64::max);
        assert!(max_jump < 20. * step, "{max_jump} >= 20 * {step}");
    }
}
