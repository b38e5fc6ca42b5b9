use super::{
    syn::{style, write_fit, AnyResult},
    SynOpt,
};
use four_bar_fit::{
    keyframe::{self, Pose},
    synthesize_with, SynCfg,
};
use indicatif::ProgressBar;
use std::{collections::BTreeMap, path::PathBuf};

#[derive(clap::Args)]
pub(super) struct Keyframe {
    /// RON file of the keyframes, a map from part names to pose lists
    pub(super) file: PathBuf,
    /// Output directory, default to the file stem beside the file
    #[clap(short, long)]
    pub(super) out: Option<PathBuf>,
    #[clap(flatten)]
    pub(super) opt: SynOpt,
}

// Parts in the name order of the map
fn parse_keyframes(s: &str) -> Result<Vec<(String, Vec<Pose>)>, ron::error::SpannedError> {
    let map = ron::from_str::<BTreeMap<String, Vec<Pose>>>(s)?;
    Ok(map.into_iter().collect())
}

pub(super) fn keyframe(kf: Keyframe, verbose: bool) -> AnyResult {
    let Keyframe { file, out, opt } = kf;
    let cfg = opt.load_cfg(verbose)?;
    let parts = parse_keyframes(&std::fs::read_to_string(&file)?)?;
    let out = match out {
        Some(out) => out,
        None => file.with_extension(""),
    };
    std::fs::create_dir_all(&out)?;
    let paths = keyframe::trajectories(&parts);
    let frames = keyframe::frame_count(&parts);
    tracing::info!(parts = parts.len(), frames, "keyframes loaded");
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(style("{elapsed_precise} {wide_bar} {pos}/{len} {msg}"));
    let run = |(i, (name, path)): (usize, &(String, Vec<[f64; 2]>))| {
        let prefix = keyframe::part_prefix(i, name);
        if let Err(e) = run(&out, &prefix, path, &cfg) {
            pb.println(format!("[{prefix}] error: {e}"));
        }
        pb.inc(1);
    };
    if opt.no_parallel {
        paths.iter().enumerate().for_each(run);
    } else {
        use rayon::prelude::*;
        paths.par_iter().enumerate().for_each(run);
    }
    let frames = keyframe::animation(&parts);
    let pretty = ron::ser::PrettyConfig::default();
    let s = ron::ser::to_string_pretty(&frames, pretty)?;
    std::fs::write(out.join("animation.ron"), s)?;
    pb.finish_with_message(format!("written to {}", out.display()));
    Ok(())
}

fn run(out: &std::path::Path, prefix: &str, path: &[[f64; 2]], cfg: &SynCfg) -> AnyResult {
    let fit = synthesize_with(path, cfg)?;
    write_fit(&out.join(prefix), prefix, prefix, &fit, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keyframe_map() {
        let s = r#"{
            "wing.png": [(x: 1.0, y: 2.0, rotation: 30.0), (x: 3.0, y: 4.0)],
            "body.png": [(x: 0.5, y: 0.5)],
        }"#;
        let parts = parse_keyframes(s).unwrap();
        assert_eq!(parts[0].0, "body.png");
        let [p0, p1] = [parts[1].1[0], parts[1].1[1]];
        assert_eq!([p0.x, p0.y, p0.rotation], [1., 2., 30.]);
        assert_eq!([p1.x, p1.y, p1.rotation], [3., 4., 0.]);
        let paths = keyframe::trajectories(&parts);
        assert_eq!(paths[0].1, [[0.5, 0.5]; 2]);
        assert_eq!(keyframe::part_prefix(1, &parts[1].0), "1_wing");
    }
}
