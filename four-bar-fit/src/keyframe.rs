//! Keyframe poses of the animated parts.
//!
//! Each part of a drawing carries a list of poses, one per frame. The parts
//! may have different frame counts, the shorter ones hold their last pose.
use crate::curve::Coord;

/// Pose of a part at one frame.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Rotation in degrees
    pub rotation: f64,
}

impl Pose {
    /// Position of the part.
    pub const fn pos(&self) -> Coord {
        [self.x, self.y]
    }
}

/// Frame count of the longest part.
pub fn frame_count<N>(parts: &[(N, Vec<Pose>)]) -> usize {
    parts
        .iter()
        .map(|(_, poses)| poses.len())
        .max()
        .unwrap_or(0)
}

/// Position trajectory of each part, padded to [`frame_count`] frames.
///
/// A part without poses stays at the origin.
pub fn trajectories<N: Clone>(parts: &[(N, Vec<Pose>)]) -> Vec<(N, Vec<Coord>)> {
    let n = frame_count(parts);
    parts
        .iter()
        .map(|(name, poses)| {
            let mut path = poses.iter().map(Pose::pos).collect::<Vec<_>>();
            let last = path.last().copied().unwrap_or_default();
            path.resize(n, last);
            (name.clone(), path)
        })
        .collect()
}

/// Animation frames, each holding the pose of every part.
///
/// Parts without poses are left out of the frames.
pub fn animation<N: Clone>(parts: &[(N, Vec<Pose>)]) -> Vec<Vec<(N, Pose)>> {
    (0..frame_count(parts))
        .map(|i| {
            parts
                .iter()
                .filter_map(|(name, poses)| {
                    let pose = poses.get(i).or_else(|| poses.last())?;
                    Some((name.clone(), *pose))
                })
                .collect()
        })
        .collect()
}

/// Output prefix of a part, `{index}_{file stem of name}`.
///
/// ```
/// use four_bar_fit::keyframe::part_prefix;
///
/// assert_eq!(part_prefix(2, "wing.png"), "2_wing");
/// assert_eq!(part_prefix(0, "arm"), "0_arm");
/// ```
pub fn part_prefix(index: usize, name: &str) -> String {
    let stem = std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    format!("{index}_{stem}")
}
