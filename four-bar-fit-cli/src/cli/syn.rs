use super::SynOpt;
use four_bar_fit::{csv, curve, plot, synthesize_with, Fit, FourBar, SynCfg};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

pub(super) type AnyResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, thiserror::Error)]
pub(super) enum SynErr {
    #[error("unsupported format")]
    Format,
    #[error("reading file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv serialization error: {0}")]
    CsvSer(#[from] csv::Error),
    #[error("ron serialization error: {0}")]
    RonSer(#[from] ron::error::SpannedError),
    #[error("synthesis error: {0}")]
    Syn(#[from] four_bar_fit::Error),
}

#[derive(clap::Args)]
pub(super) struct Syn {
    /// Target file paths, CSV/TXT curves or RON linkages
    #[clap(required = true)]
    pub(super) files: Vec<PathBuf>,
    #[clap(flatten)]
    pub(super) opt: SynOpt,
}

/// Summary written beside the result files.
#[derive(serde::Serialize)]
struct Log<'a> {
    title: &'a str,
    mean_err: f64,
    max_err: f64,
    report: &'a four_bar_fit::syn::Report,
    cfg: &'a SynCfg,
}

pub(super) fn syn(syn: Syn, verbose: bool) -> AnyResult {
    let Syn { files, opt } = syn;
    let cfg = opt.load_cfg(verbose)?;
    println!("res={}, max_nfev={}", cfg.num_angles, cfg.max_nfev);
    let mpb = MultiProgress::new();
    let run = |file| run(&mpb, file, &cfg);
    if opt.no_parallel {
        files.into_iter().for_each(run);
    } else {
        use rayon::prelude::*;
        files.into_par_iter().for_each(run);
    }
    Ok(())
}

pub(super) fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn run(mpb: &MultiProgress, file: PathBuf, cfg: &SynCfg) {
    let pb = mpb.add(ProgressBar::new_spinner());
    let file = match file.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            pb.set_style(style("[{prefix}] {msg}"));
            pb.set_prefix(file.display().to_string());
            pb.finish_with_message(e.to_string());
            return;
        }
    };
    let Some(title) = file.file_stem().and_then(OsStr::to_str) else {
        pb.finish_with_message(format!("{}: invalid file name", file.display()));
        return;
    };
    pb.set_style(style("[{prefix}] {elapsed_precise} {spinner} {msg}"));
    pb.set_prefix(title.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let f = || -> AnyResult<String> {
        let target = read_target(&file, cfg.num_angles)?;
        let t0 = Instant::now();
        let fit = synthesize_with(&target, cfg)?;
        let spent_time = t0.elapsed();
        let root = file.parent().unwrap_or(Path::new(".")).join(title);
        write_fit(&root, title, title, &fit, cfg)?;
        let status = fit.report.status;
        let mean_err = fit.mean_err();
        let msg = format!("| spent: {spent_time:?} | mean error: {mean_err:.04}");
        Ok(format!("{msg} | {status:?}"))
    };
    match f() {
        Ok(msg) => pb.finish_with_message(msg),
        Err(e) => pb.finish_with_message(format!("| error: {e}")),
    }
}

// The target curve of a file, RON linkages are sampled by `res` angles
fn read_target(path: &Path, res: usize) -> Result<Vec<curve::Coord>, SynErr> {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .ok_or(SynErr::Format)?;
    parse_target(ext, &std::fs::read_to_string(path)?, res)
}

fn parse_target(ext: &str, s: &str, res: usize) -> Result<Vec<curve::Coord>, SynErr> {
    match ext {
        "ron" => Ok(ron::from_str::<FourBar>(s)?.curve_by(&curve::angles(res))),
        "csv" | "txt" => Ok(csv::parse_curve(s)?),
        _ => Err(SynErr::Format),
    }
}

/// Write the result files of a fit into `root`, which is recreated.
pub(super) fn write_fit(
    root: &Path,
    title: &str,
    prefix: &str,
    fit: &Fit,
    cfg: &SynCfg,
) -> AnyResult {
    if root.is_dir() {
        std::fs::remove_dir_all(root)?;
    }
    std::fs::create_dir_all(root)?;
    write_ron(root.join("linkage.ron"), &fit.fb)?;
    write_ron(root.join("assembly.ron"), &fit.assembly(prefix))?;
    std::fs::write(root.join("curve.csv"), csv::dump_csv(&fit.curve)?)?;
    std::fs::write(root.join("target.csv"), csv::dump_csv(&fit.target)?)?;
    let log = Log {
        title,
        mean_err: fit.mean_err(),
        max_err: fit.max_err(),
        report: &fit.report,
        cfg,
    };
    write_ron(root.join(format!("{title}.log")), &log)?;
    {
        let path = root.join("linkage.svg");
        let svg = plot::SVGBackend::new(&path, (800, 800));
        plot::plot_fit(svg, title, fit)?;
    }
    Ok(())
}

fn write_ron<S: serde::Serialize>(path: PathBuf, s: &S) -> AnyResult {
    let pretty = ron::ser::PrettyConfig::default();
    std::fs::write(path, ron::ser::to_string_pretty(s, pretty)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_target() {
        let s = "# header comment\n0,0\n10,0\n10,10\n";
        let target = parse_target("csv", s, 120).unwrap();
        assert_eq!(target, [[0., 0.], [10., 0.], [10., 10.]]);
        let target = parse_target("txt", "1.5, -2\n3,4\n", 120).unwrap();
        assert_eq!(target, [[1.5, -2.], [3., 4.]]);
        let err = parse_target("csv", "1,2\nx,y\n", 120);
        assert!(matches!(err, Err(SynErr::CsvSer(_))));
    }

    #[test]
    fn parse_ron_target() {
        let s = ron::to_string(&FourBar::example()).unwrap();
        let target = parse_target("ron", &s, 36).unwrap();
        assert_eq!(target, FourBar::example().curve_by(&curve::angles(36)));
        let err = parse_target("ron", "(ax: 1)", 36);
        assert!(matches!(err, Err(SynErr::RonSer(_))));
    }

    #[test]
    fn unsupported_format() {
        let err = parse_target("svg", "", 120);
        assert!(matches!(err, Err(SynErr::Format)));
    }

    #[test]
    fn write_result_files() {
        let cfg = SynCfg::default().num_angles(40).max_nfev(20);
        let target = FourBar::example().curve_by(&curve::angles(40));
        let fit = synthesize_with(&target, &cfg).unwrap();
        let root = std::env::temp_dir().join(format!("four-bar-fit-{}", std::process::id()));
        write_fit(&root, "example", "0_example", &fit, &cfg).unwrap();
        let files = [
            "linkage.ron",
            "assembly.ron",
            "curve.csv",
            "target.csv",
            "example.log",
            "linkage.svg",
        ];
        for name in files {
            assert!(root.join(name).is_file(), "{name}");
        }
        let read = |name: &str| std::fs::read_to_string(root.join(name)).unwrap();
        let fb = ron::from_str::<FourBar>(&read("linkage.ron")).unwrap();
        assert_eq!(fb, fit.fb);
        let curve = csv::parse_curve(&read("curve.csv")).unwrap();
        assert_eq!(curve.len(), 40);
        std::fs::remove_dir_all(root).unwrap();
    }
}
