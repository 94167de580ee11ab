use glam::Vec2;

use crate::line::Line;

/// A half-plane of valid velocities. The valid side is the one `normal` points
/// toward, i.e. all `v` with `dot(v - point, normal) >= 0`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HalfPlane {
  /// A point on the boundary of the half-plane.
  pub point: Vec2,
  /// Must always have length = 1.
  pub normal: Vec2,
}

impl HalfPlane {
  pub fn new(point: Vec2, normal: Vec2) -> Self {
    Self { point, normal }
  }

  /// The unit direction of the boundary, oriented so that the valid side is
  /// counter-clockwise of it.
  pub fn direction(&self) -> Vec2 {
    -self.normal.perp()
  }

  /// The boundary of the half-plane as a parametric line with a unit
  /// direction (see `direction`).
  pub fn boundary(&self) -> Line {
    Line::new(self.point, self.direction())
  }

  /// How far `v` is inside the valid side. Negative values measure how deeply
  /// `v` violates the half-plane.
  pub fn signed_distance(&self, v: Vec2) -> f32 {
    (v - self.point).dot(self.normal)
  }

  pub fn contains(&self, v: Vec2) -> bool {
    self.signed_distance(v) >= 0.0
  }
}

#[cfg(test)]
#[path = "half_plane_test.rs"]
mod test;
