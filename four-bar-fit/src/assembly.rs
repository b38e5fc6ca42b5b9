//! Part description of a fitted linkage for the CAD collaborator.
//!
//! The collaborator builds four extruded solids, each with a pin hole, and
//! writes one file per part. This module only describes them.
use crate::{curve::Coord, FourBar};

/// Width of the bars.
pub const BAR_WIDTH: f64 = 6.;
/// Extrusion depth of the bars.
pub const BAR_DEPTH: f64 = 6.;
/// Diameter of the pin holes.
pub const HOLE_DIAMETER: f64 = 3.2;
/// Smallest radius of the coupler disc.
pub const DISC_MIN_RADIUS: f64 = 12.;
/// Material kept around the coupler point on the disc.
pub const DISC_MARGIN: f64 = 6.;
/// Thickness of the coupler disc.
pub const DISC_THICKNESS: f64 = 6.;
/// Extension of the part files.
pub const PART_EXT: &str = "step";

/// A solid primitive.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Solid {
    /// Rectangle `length × width` along +X centered on the origin, extruded
    /// by `depth`, with a pin hole at the center
    Bar {
        /// Bar length
        length: f64,
        /// Bar width
        width: f64,
        /// Extrusion depth
        depth: f64,
        /// Pin hole diameter
        hole: f64,
    },
    /// Circle centered on the origin, extruded by `thickness`, with a pin
    /// hole at `at`
    Disc {
        /// Disc radius
        radius: f64,
        /// Extrusion thickness
        thickness: f64,
        /// Pin hole diameter
        hole: f64,
        /// Pin hole position
        at: Coord,
    },
}

impl Solid {
    /// The bar primitive with the fixed constants.
    pub const fn bar(length: f64) -> Self {
        Self::Bar {
            length,
            width: BAR_WIDTH,
            depth: BAR_DEPTH,
            hole: HOLE_DIAMETER,
        }
    }

    /// The coupler disc holding the coupler point `(px, py)`.
    pub fn disc(px: f64, py: f64) -> Self {
        let radius = DISC_MIN_RADIUS.max(px.hypot(py) + DISC_MARGIN);
        Self::Disc {
            radius,
            thickness: DISC_THICKNESS,
            hole: HOLE_DIAMETER,
            at: [px, py],
        }
    }
}

/// One value per part.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Parts<T> {
    /// Crank bar
    pub crank: T,
    /// Coupler bar
    pub coupler: T,
    /// Follower bar
    pub follower: T,
    /// Coupler disc
    pub coupler_disc: T,
}

impl<T> Parts<T> {
    /// Part names, in field order.
    pub const NAMES: [&'static str; 4] = ["crank", "coupler", "follower", "coupler_disc"];

    /// Build from a function of the part name.
    pub fn from_fn(mut f: impl FnMut(&'static str) -> T) -> Self {
        let [crank, coupler, follower, coupler_disc] = Self::NAMES;
        Self {
            crank: f(crank),
            coupler: f(coupler),
            follower: f(follower),
            coupler_disc: f(coupler_disc),
        }
    }

    /// Pairs of the part name and the value.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        let Self {
            crank,
            coupler,
            follower,
            coupler_disc,
        } = self;
        Self::NAMES
            .into_iter()
            .zip([crank, coupler, follower, coupler_disc])
    }
}

/// Link lengths of the assembly.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Lengths {
    /// Crank length
    pub l_ab: f64,
    /// Coupler length
    pub l_bc: f64,
    /// Follower length
    pub l_cd: f64,
}

/// Assembly metadata: pivots, lengths, coupler attachment and part files.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Assembly {
    /// Crank pivot
    pub a: Coord,
    /// Follower pivot
    pub d: Coord,
    /// Link lengths
    pub lengths: Lengths,
    /// Coupler point in the coupler frame
    pub coupler_attachment: Coord,
    /// Part file names, `{prefix}_{part}.step`
    pub parts: Parts<String>,
}

impl Assembly {
    /// Describe the assembly of a linkage, `prefix` names the part files.
    pub fn new(fb: &FourBar, prefix: &str) -> Self {
        let [a, d] = fb.ground();
        Self {
            a,
            d,
            lengths: Lengths {
                l_ab: fb.l_ab,
                l_bc: fb.l_bc,
                l_cd: fb.l_cd,
            },
            coupler_attachment: [fb.px, fb.py],
            parts: Parts::from_fn(|name| format!("{prefix}_{name}.{PART_EXT}")),
        }
    }

    /// Solids to build, derived from the metadata alone.
    pub fn solids(&self) -> Parts<Solid> {
        let Lengths { l_ab, l_bc, l_cd } = self.lengths;
        let [px, py] = self.coupler_attachment;
        Parts {
            crank: Solid::bar(l_ab),
            coupler: Solid::bar(l_bc),
            follower: Solid::bar(l_cd),
            coupler_disc: Solid::disc(px, py),
        }
    }
}
