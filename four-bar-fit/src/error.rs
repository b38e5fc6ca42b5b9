/// Errors that cross the boundary of the synthesis functions.
///
/// Degenerate linkage geometry is never reported here, the kinematics absorb
/// it (see [`crate::fb::Circuit`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The target path has fewer than two points.
    #[error("invalid input: a path needs at least 2 points, got {len}")]
    InvalidInput {
        /// Number of points supplied
        len: usize,
    },
    /// Zero samples were requested.
    #[error("invalid resolution: the number of angles must be positive")]
    InvalidResolution,
    /// A configuration field is out of range.
    #[error("invalid configuration: `{0}` is out of range")]
    InvalidConfig(&'static str),
}

/// Result type of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
