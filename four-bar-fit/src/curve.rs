//! Curve (trajectory) operation functions.
//!
//! Curves are plain point slices `&[[f64; 2]]`, the owned form is
//! `Vec<[f64; 2]>`.
use crate::{Error, Result};

/// Planar coordinate.
pub type Coord = [f64; 2];

fn dist([x1, y1]: Coord, [x2, y2]: Coord) -> f64 {
    (x2 - x1).hypot(y2 - y1)
}

/// Total arc length of a polyline.
///
/// Empty and single-point curves have zero length.
pub fn arc_length(curve: &[Coord]) -> f64 {
    curve.windows(2).map(|w| dist(w[0], w[1])).sum()
}

/// Resample a polyline into `n` points uniformly spaced by arc length.
///
/// The i-th output point lies at the arc-length position `L * i / (n - 1)`,
/// so the first and last points are the endpoints of the input. A curve
/// without length yields `n` copies of its start point.
///
/// ```
/// use four_bar_fit::curve::resample;
///
/// let curve = resample(&[[0., 0.], [4., 0.]], 5).unwrap();
/// assert_eq!(curve, [[0., 0.], [1., 0.], [2., 0.], [3., 0.], [4., 0.]]);
/// ```
pub fn resample(curve: &[Coord], n: usize) -> Result<Vec<Coord>> {
    if curve.len() < 2 {
        return Err(Error::InvalidInput { len: curve.len() });
    }
    if n == 0 {
        return Err(Error::InvalidResolution);
    }
    if n == 1 {
        return Ok(vec![curve[0]]);
    }
    let seg_len = curve
        .windows(2)
        .map(|w| dist(w[0], w[1]))
        .collect::<Vec<_>>();
    let total = seg_len.iter().sum::<f64>();
    let last_seg = seg_len.len() - 1;
    let mut samples = Vec::with_capacity(n);
    // Walk the segments once, `acc` is the arc length at `curve[seg]`
    let mut seg = 0;
    let mut acc = 0.;
    for i in 0..n {
        let s = total * i as f64 / (n - 1) as f64;
        while seg < last_seg && acc + seg_len[seg] < s {
            acc += seg_len[seg];
            seg += 1;
        }
        let len = seg_len[seg];
        let t = if len > 0. {
            ((s - acc) / len).clamp(0., 1.)
        } else {
            0.
        };
        let [x1, y1] = curve[seg];
        let [x2, y2] = curve[seg + 1];
        samples.push([x1 + (x2 - x1) * t, y1 + (y2 - y1) * t]);
    }
    // Accumulated rounding must not move the end point
    samples[n - 1] = curve[curve.len() - 1];
    tracing::trace!(input = curve.len(), output = n, total, "resampled curve");
    Ok(samples)
}

/// Evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut v = (0..n).map(|i| start + i as f64 * step).collect::<Vec<_>>();
            v[n - 1] = end;
            v
        }
    }
}

/// Crank angles of one revolution, `n` samples over `[0, 2π]`.
pub fn angles(n: usize) -> Vec<f64> {
    linspace(0., std::f64::consts::TAU, n)
}

/// Center of the axis-aligned bounding box.
///
/// Returns the origin for an empty curve.
pub fn bounding_center(curve: &[Coord]) -> Coord {
    if curve.is_empty() {
        return [0.; 2];
    }
    let init = [f64::INFINITY, -f64::INFINITY, f64::INFINITY, -f64::INFINITY];
    let [x_min, x_max, y_min, y_max] = curve.iter().fold(init, |[x0, x1, y0, y1], &[x, y]| {
        [x0.min(x), x1.max(x), y0.min(y), y1.max(y)]
    });
    [(x_min + x_max) * 0.5, (y_min + y_max) * 0.5]
}

/// Mean point-wise distance between two curves.
///
/// The curves must have the same length.
pub fn mean_err(target: &[Coord], curve: &[Coord]) -> f64 {
    debug_assert_eq!(target.len(), curve.len());
    if target.is_empty() {
        return 0.;
    }
    let sum = target
        .iter()
        .zip(curve)
        .map(|(a, b)| dist(*a, *b))
        .sum::<f64>();
    sum / target.len() as f64
}

/// Largest point-wise distance between two curves.
pub fn max_err(target: &[Coord], curve: &[Coord]) -> f64 {
    debug_assert_eq!(target.len(), curve.len());
    target
        .iter()
        .zip(curve)
        .map(|(a, b)| dist(*a, *b))
        .fold(0., f64::max)
}
