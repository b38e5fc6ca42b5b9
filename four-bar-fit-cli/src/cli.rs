use four_bar_fit::SynCfg;
use std::path::PathBuf;

mod keyframe;
mod syn;

const APP_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(clap::Parser)]
#[clap(name = APP_NAME, version, author, about)]
pub(crate) struct Entry {
    /// Print the solver iterations
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Fit linkages to the target paths
    Syn(syn::Syn),
    /// Fit linkages to the trajectories of keyframe parts
    Keyframe(keyframe::Keyframe),
}

/// Synthesis options shared by the subcommands.
#[derive(clap::Args, Clone)]
struct SynOpt {
    /// Load the synthesis configuration from a RON file
    #[clap(long)]
    cfg: Option<PathBuf>,
    /// Number of samples, overrides the configuration
    #[clap(short, long)]
    res: Option<usize>,
    /// Maximum objective evaluations, overrides the configuration
    #[clap(long)]
    max_nfev: Option<usize>,
    /// Disable parallel computing
    #[clap(long)]
    no_parallel: bool,
}

impl SynOpt {
    fn load_cfg(&self, verbose: bool) -> Result<SynCfg, syn::SynErr> {
        let mut cfg = match &self.cfg {
            Some(path) => ron::from_str::<SynCfg>(&std::fs::read_to_string(path)?)?,
            None => SynCfg::default(),
        };
        if let Some(res) = self.res {
            cfg = cfg.num_angles(res);
        }
        if let Some(max_nfev) = self.max_nfev.filter(|n| *n > 0) {
            cfg = cfg.max_nfev(max_nfev);
        }
        let verbose = cfg.verbose || verbose;
        let cfg = cfg.verbose(verbose);
        cfg.check()?;
        Ok(cfg)
    }
}

impl Entry {
    pub(crate) fn main() {
        let entry = <Self as clap::Parser>::parse_from(wild::args());
        register_panic_hook();
        init_logger(entry.verbose);
        let res = match entry.cmd {
            Cmd::Syn(syn) => syn::syn(syn, entry.verbose),
            Cmd::Keyframe(kf) => keyframe::keyframe(kf, entry.verbose),
        };
        if let Err(e) = res {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn init_logger(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let level = if verbose { "debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(level),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn register_panic_hook() {
    // Print panic messages without stack trace
    std::panic::set_hook(Box::new(|info| {
        match info.payload().downcast_ref::<&str>() {
            Some(s) => eprintln!("{s}"),
            None => eprintln!("{info}"),
        }
        std::process::exit(1);
    }));
}
