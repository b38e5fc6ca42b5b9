//! Planar four-bar linkages and their forward kinematics.
//!
//! The linkage is driven by the crank `A→B`. The coupler `B→C` and the
//! follower `C→D` close the loop, and the coupler point `P` is fixed in the
//! coupler frame (origin `B`, x-axis along `B→C`).
use crate::curve::Coord;
use nalgebra as na;

/// Distance below which two pivots are treated as coincident.
pub const EPS: f64 = 1e-9;

/// Regime of the circle-circle intersection solved for joint `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Circuit {
    /// The circle centers coincide, `C` is placed on the +x axis of `B`.
    Concentric,
    /// The circles are too far apart, `C` is interpolated on segment `B→D`.
    Apart,
    /// The circles touch, or one lies inside the other, `C` is the foot
    /// point on the baseline.
    Tangent,
    /// Two intersections exist, the one left of the baseline `B→D` is taken.
    Crossed,
}

impl Circuit {
    /// Return true if the linkage can be assembled in this regime.
    pub const fn is_feasible(&self) -> bool {
        matches!(self, Self::Crossed)
    }
}

/// Four-bar linkage parameters.
///
/// # Parameters
///
/// There are 9 parameters in total, in the order of the vectorized form.
///
/// + Crank pivot `A = (ax, ay)`
/// + Follower pivot `D = (dx, dy)`
/// + Crank link `l_ab`
/// + Coupler link `l_bc`
/// + Follower link `l_cd`
/// + Coupler point `(px, py)` in the coupler frame
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FourBar {
    /// X of the crank pivot
    pub ax: f64,
    /// Y of the crank pivot
    pub ay: f64,
    /// X of the follower pivot
    pub dx: f64,
    /// Y of the follower pivot
    pub dy: f64,
    /// Length of the crank link
    pub l_ab: f64,
    /// Length of the coupler link
    pub l_bc: f64,
    /// Length of the follower link
    pub l_cd: f64,
    /// X of the coupler point in the coupler frame
    pub px: f64,
    /// Y of the coupler point in the coupler frame
    pub py: f64,
}

impl FourBar {
    /// Number of parameters.
    pub const DIM: usize = 9;

    /// An example crank rocker.
    pub const fn example() -> Self {
        Self {
            ax: 0.,
            ay: 0.,
            dx: 90.,
            dy: 0.,
            l_ab: 35.,
            l_bc: 70.,
            l_cd: 70.,
            px: 40.,
            py: 25.,
        }
    }

    /// Create from the vectorized form
    /// `[ax, ay, dx, dy, l_ab, l_bc, l_cd, px, py]`.
    pub const fn from_vectorized(v: [f64; 9]) -> Self {
        let [ax, ay, dx, dy, l_ab, l_bc, l_cd, px, py] = v;
        Self {
            ax,
            ay,
            dx,
            dy,
            l_ab,
            l_bc,
            l_cd,
            px,
            py,
        }
    }

    /// Create from a slice of at least 9 values, extra values are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the slice is shorter than 9.
    pub const fn from_slice(v: &[f64]) -> Self {
        Self::from_vectorized(slice_to_array(v))
    }

    /// The vectorized form.
    pub const fn vectorized(&self) -> [f64; 9] {
        let Self {
            ax,
            ay,
            dx,
            dy,
            l_ab,
            l_bc,
            l_cd,
            px,
            py,
        } = *self;
        [ax, ay, dx, dy, l_ab, l_bc, l_cd, px, py]
    }

    /// Ground pivots `[A, D]`.
    pub const fn ground(&self) -> [Coord; 2] {
        [[self.ax, self.ay], [self.dx, self.dy]]
    }

    /// Link lengths `[ground, crank, coupler, follower]`.
    pub fn links(&self) -> [f64; 4] {
        let l_ad = (self.dx - self.ax).hypot(self.dy - self.ay);
        [l_ad, self.l_ab, self.l_bc, self.l_cd]
    }

    /// Return true if the shortest link can rotate fully (Grashof criterion).
    pub fn is_grashof(&self) -> bool {
        let mut links = self.links();
        links.sort_unstable_by(f64::total_cmp);
        let [s, p, q, l] = links;
        s + l <= p + q
    }

    /// Scale the linkage about the origin.
    pub fn scale(self, k: f64) -> Self {
        Self::from_vectorized(self.vectorized().map(|x| x * k))
    }

    /// Positions of the moving joints `[B, C, P]` at crank angle `t`.
    pub fn pos(&self, t: f64) -> [Coord; 3] {
        self.pos_circuit(t).0
    }

    /// Positions of the moving joints and the regime used to solve `C`.
    pub fn pos_circuit(&self, t: f64) -> ([Coord; 3], Circuit) {
        let pa = na::Point2::new(self.ax, self.ay);
        let pd = na::Point2::new(self.dx, self.dy);
        let pb = angle(pa, self.l_ab, t);
        let (pc, circuit) = pllp(pb, self.l_bc, self.l_cd, pd);
        let bc = pc - pb;
        let a = if bc.x.abs() > EPS || bc.y.abs() > EPS {
            bc.y.atan2(bc.x)
        } else {
            0.
        };
        let pp = pb + na::UnitComplex::new(a) * na::Vector2::new(self.px, self.py);
        macro_rules! build_coords {
            [$($p:ident),+] => { [$([$p.x, $p.y]),+] }
        }
        (build_coords![pb, pc, pp], circuit)
    }

    /// Coupler point at crank angle `t`.
    pub fn coupler_point(&self, t: f64) -> Coord {
        let [.., p] = self.pos(t);
        p
    }

    /// Generator for coupler curve by an input angle list.
    ///
    /// The output has the same length and order as the angles.
    pub fn curve_by(&self, t: &[f64]) -> Vec<Coord> {
        #[cfg(feature = "rayon")]
        if t.len() >= PAR_MIN_LEN {
            use rayon::prelude::*;
            return t.par_iter().map(|&t| self.coupler_point(t)).collect();
        }
        t.iter().map(|&t| self.coupler_point(t)).collect()
    }

    /// Generator for all moving joints `[B, C, P]` by an input angle list.
    pub fn curves_by(&self, t: &[f64]) -> Vec<[Coord; 3]> {
        t.iter().map(|&t| self.pos(t)).collect()
    }
}

#[cfg(feature = "rayon")]
const PAR_MIN_LEN: usize = 1024;

const fn slice_to_array<const N: usize>(slice: &[f64]) -> [f64; N] {
    let mut out = [0.; N];
    let mut i = 0;
    while i < N {
        out[i] = slice[i];
        i += 1;
    }
    out
}

fn angle(p: na::Point2<f64>, d: f64, a: f64) -> na::Point2<f64> {
    p + d * na::Vector2::new(a.cos(), a.sin())
}

/// Intersection of circle `(p1, d0)` and circle `(p2, d1)`.
///
/// Total over all inputs: the degenerate regimes fall back to continuous
/// placements instead of failing, see [`Circuit`]. Of the two roots, the
/// one reached by rotating the baseline `p1→p2` by +90° is always chosen.
pub fn pllp(
    p1: na::Point2<f64>,
    d0: f64,
    d1: f64,
    p2: na::Point2<f64>,
) -> (na::Point2<f64>, Circuit) {
    let v = p2 - p1;
    let d = v.x.hypot(v.y);
    if d < EPS {
        (p1 + na::Vector2::new(d0, 0.), Circuit::Concentric)
    } else if d > d0 + d1 {
        (p1 + v * (d0 / (d0 + d1)), Circuit::Apart)
    } else {
        let a = (d0 * d0 - d1 * d1 + d * d) / (2. * d);
        let h_2 = (d0 * d0 - a * a).max(0.);
        let pm = p1 + v * a / d;
        if h_2 <= 0. {
            (pm, Circuit::Tangent)
        } else {
            let h = h_2.sqrt() / d;
            (pm + na::Vector2::new(-v.y * h, v.x * h), Circuit::Crossed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn check_loop(fb: &FourBar, t: f64) {
        let [b, c, _] = fb.pos(t);
        let [a, d] = fb.ground();
        let len = |[x1, y1]: Coord, [x2, y2]: Coord| (x2 - x1).hypot(y2 - y1);
        assert_abs_diff_eq!(len(a, b), fb.l_ab, epsilon = 1e-9);
        assert_abs_diff_eq!(len(b, c), fb.l_bc, epsilon = 1e-9);
        assert_abs_diff_eq!(len(c, d), fb.l_cd, epsilon = 1e-9);
    }

    #[test]
    fn vectorized() {
        let fb = FourBar::example();
        assert_eq!(FourBar::from_vectorized(fb.vectorized()), fb);
        let v = [1., 2., 3., 4., 5., 6., 7., 8., 9., 10.];
        let fb = FourBar::from_slice(&v);
        assert_eq!(fb.vectorized(), slice_to_array::<9>(&v));
    }

    #[test]
    fn example_closes() {
        let fb = FourBar::example();
        assert!(fb.is_grashof());
        for i in 0..36 {
            let t = i as f64 * TAU / 36.;
            let (_, circuit) = fb.pos_circuit(t);
            assert_eq!(circuit, Circuit::Crossed);
            check_loop(&fb, t);
        }
    }

    #[test]
    fn branch_left_of_baseline() {
        // B = (0, 0) at t = π/2 from A = (0, -10), D = (10, 0)
        let fb = FourBar {
            ax: 0.,
            ay: -10.,
            dx: 10.,
            dy: 0.,
            l_ab: 10.,
            l_bc: 10f64.sqrt() * 5f64.sqrt(),
            l_cd: 10f64.sqrt() * 5f64.sqrt(),
            px: 0.,
            py: 0.,
        };
        let [b, c, p] = fb.pos(FRAC_PI_2);
        assert_abs_diff_eq!(b[0], 0., epsilon = 1e-9);
        assert_abs_diff_eq!(b[1], 0., epsilon = 1e-9);
        assert_abs_diff_eq!(c[0], 5., epsilon = 1e-9);
        assert_abs_diff_eq!(c[1], 5., epsilon = 1e-9);
        assert_eq!(p, b);
    }

    #[test]
    fn degenerate_regimes() {
        // Concentric: D coincides with B at t = 0
        let fb = FourBar {
            ax: 0.,
            ay: 0.,
            dx: 10.,
            dy: 0.,
            l_ab: 10.,
            l_bc: 4.,
            l_cd: 6.,
            px: 1.,
            py: 2.,
        };
        let ([b, c, p], circuit) = fb.pos_circuit(0.);
        assert_eq!(circuit, Circuit::Concentric);
        assert_eq!(c, [b[0] + 4., b[1]]);
        assert_abs_diff_eq!(p[0], b[0] + 1., epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], b[1] + 2., epsilon = 1e-12);
        // Apart: |BD| = 20 > 4 + 6, C splits BD by 4 : 6
        let ([b, c, _], circuit) = fb.pos_circuit(std::f64::consts::PI);
        assert_eq!(circuit, Circuit::Apart);
        assert_abs_diff_eq!(b[0], -10., epsilon = 1e-9);
        assert_abs_diff_eq!(c[0], -2., epsilon = 1e-9);
        assert_abs_diff_eq!(c[1], 0., epsilon = 1e-9);
        // Tangent: the small circle lies inside the big one
        let fb = FourBar {
            l_bc: 30.,
            l_cd: 1.,
            ..fb
        };
        let (_, circuit) = fb.pos_circuit(std::f64::consts::PI);
        assert_eq!(circuit, Circuit::Tangent);
        assert!(!circuit.is_feasible());
    }

    #[test]
    fn coincident_coupler_frame() {
        // C == B: the coupler frame falls back to the world axes
        let (pc, _) = pllp(na::Point2::new(1., 1.), 0., 5., na::Point2::new(6., 1.));
        assert_abs_diff_eq!(pc.x, 1., epsilon = 1e-12);
        let fb = FourBar {
            ax: 0.,
            ay: 1.,
            dx: 6.,
            dy: 1.,
            l_ab: 1.,
            l_bc: 0.,
            l_cd: 5.,
            px: 2.,
            py: 3.,
        };
        let [b, _, p] = fb.pos(0.);
        assert_abs_diff_eq!(p[0], b[0] + 2., epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], b[1] + 3., epsilon = 1e-12);
    }

    #[test]
    fn scale_linkage() {
        let fb = FourBar::example();
        let k = 2.5;
        let scaled = fb.clone().scale(k);
        for i in 0..12 {
            let t = i as f64 * TAU / 12.;
            let [x, y] = fb.coupler_point(t);
            let [sx, sy] = scaled.coupler_point(t);
            assert_abs_diff_eq!(sx, x * k, epsilon = 1e-9);
            assert_abs_diff_eq!(sy, y * k, epsilon = 1e-9);
        }
    }
}
