//! Four🍀bar fit: fitting a planar four-bar linkage to a traced path.
//!
//! The target path is resampled by arc length, each sample is paired with a
//! crank angle of one revolution, and the nine linkage parameters are fitted
//! by bounded least squares.
//!
//! ```
//! use four_bar_fit::{curve, synthesize, FourBar};
//!
//! let target = FourBar::example().curve_by(&curve::angles(90));
//! let fit = synthesize(&target, 90).unwrap();
//! assert_eq!(fit.curve.len(), 90);
//! assert!(fit.report.nfev <= 500);
//! ```
#![cfg_attr(doc_cfg, feature(doc_cfg))]
pub use crate::{error::*, fb::FourBar, fit::*, syn::SynCfg};

pub mod assembly;
#[cfg(feature = "csv")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "csv")))]
pub mod csv;
pub mod curve;
mod error;
pub mod fb;
mod fit;
pub mod keyframe;
#[cfg(feature = "plot")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "plot")))]
pub mod plot;
pub mod syn;
#[cfg(test)]
mod tests;
