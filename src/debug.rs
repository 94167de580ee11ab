// Re-export HalfPlane so we can use it to provide debug data.
pub use crate::half_plane::HalfPlane;

/// Internal data that is used to generate the final suggested velocity.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugData {
  /// All constraints could be satisfied at once.
  Satisfied {
    /// The constraints that needed to be satisfied, walls first.
    constraints: Vec<HalfPlane>,
  },
  /// The constraints could not all be satisfied, so the velocity violating
  /// them the least was picked instead.
  Fallback {
    /// The constraints that needed to be satisfied, walls first.
    constraints: Vec<HalfPlane>,
    /// The index of the constraint that made the 2D program infeasible.
    index_of_failed_constraint: usize,
  },
}
