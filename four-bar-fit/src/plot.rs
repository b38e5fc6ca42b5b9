//! The functions used to plot the curve and synthesis result.
pub use plotters::{prelude::*, *};

use crate::{curve::Coord, Fit, FourBar};

/// Get font setting.
pub fn font() -> TextStyle<'static> {
    ("Times New Roman", 24).into_font().color(&BLACK)
}

/// Plot 2D curves.
pub fn plot_curve<B>(backend: B, title: &str, curves: &[(&str, &[Coord])]) -> anyhow::Result<()>
where
    B: DrawingBackend,
    B::ErrorType: 'static,
{
    plot_linkage(backend, title, curves, None)
}

/// Plot the target against the fitted coupler curve, with the linkage drawn
/// at the first crank angle.
///
/// ```
/// use four_bar_fit::{plot::*, synthesize, FourBar};
///
/// let target = FourBar::example().curve_by(&four_bar_fit::curve::angles(60));
/// let fit = synthesize(&target, 60).unwrap();
/// let mut buf = String::new();
/// plot_fit(SVGBackend::with_string(&mut buf, (800, 800)), "example", &fit).unwrap();
/// ```
pub fn plot_fit<B>(backend: B, title: &str, fit: &Fit) -> anyhow::Result<()>
where
    B: DrawingBackend,
    B::ErrorType: 'static,
{
    let curves = [("Target", &fit.target[..]), ("Optimized", &fit.curve[..])];
    let t = fit.angles.first().copied().unwrap_or_default();
    plot_linkage(backend, title, &curves, Some((&fit.fb, t)))
}

fn plot_linkage<B>(
    backend: B,
    title: &str,
    curves: &[(&str, &[Coord])],
    fb: Option<(&FourBar, f64)>,
) -> anyhow::Result<()>
where
    B: DrawingBackend,
    B::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let joints = fb.map(|(fb, t)| {
        let [a, d] = fb.ground();
        let [b, c, p] = fb.pos(t);
        [a, b, c, d, p]
    });
    let extra = joints.as_ref().map(|js| &js[..]).unwrap_or_default();
    let [x_min, x_max, y_min, y_max] = bounding_box(curves.iter().map(|(_, c)| *c).chain([extra]));
    let mut chart = ChartBuilder::on(&root)
        .caption(title, font())
        .set_label_area_size(LabelAreaPosition::Left, (8).percent())
        .set_label_area_size(LabelAreaPosition::Bottom, (4).percent())
        .margin((8).percent())
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_label_style(font())
        .y_label_style(font())
        .draw()?;
    for (i, &(label, curve)) in curves.iter().enumerate() {
        let color = Palette99::pick(i);
        chart
            .draw_series(LineSeries::new(curve.iter().map(|&[x, y]| (x, y)), &color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    if let Some([a, b, c, d, p]) = joints {
        let pt = |[x, y]: Coord| (x, y);
        // Ground, crank-coupler-follower chain, coupler triangle
        let links = [vec![a, d], vec![a, b, c, d], vec![b, p, c]];
        for link in links {
            let series = LineSeries::new(link.into_iter().map(pt), BLACK.stroke_width(3));
            chart.draw_series(series)?;
        }
        let pivot = |c: Coord| TriangleMarker::new(pt(c), 8, BLACK.filled());
        chart.draw_series([a, d].map(pivot))?;
        chart.draw_series([b, c, p].map(|c| Circle::new(pt(c), 5, BLACK.filled())))?;
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .label_font(font())
        .draw()?;
    Ok(())
}

/// Get the square bounding box `[x_min, x_max, y_min, y_max]` of the
/// curves.
///
/// Returns a unit box around the origin if there is no point.
pub fn bounding_box<'a, I>(curves: I) -> [f64; 4]
where
    I: IntoIterator<Item = &'a [Coord]>,
{
    let init = [f64::INFINITY, -f64::INFINITY, f64::INFINITY, -f64::INFINITY];
    let [x_min, x_max, y_min, y_max] = curves
        .into_iter()
        .flatten()
        .fold(init, |[x0, x1, y0, y1], &[x, y]| {
            [x0.min(x), x1.max(x), y0.min(y), y1.max(y)]
        });
    if !(x_min.is_finite() && y_min.is_finite()) {
        return [-1., 1., -1., 1.];
    }
    let dx = x_max - x_min;
    let dy = y_max - y_min;
    let r = (dx.max(dy) * 0.5).max(1.);
    let [cx, cy] = [(x_min + x_max) * 0.5, (y_min + y_max) * 0.5];
    [cx - r, cx + r, cy - r, cy + r]
}
