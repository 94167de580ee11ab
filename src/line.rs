use glam::Vec2;

use crate::common::{determinant, EPSILON};

/// An infinite parametric line `L(t) = point + t * direction`. `direction` is
/// not required to be normalized; the parameter `t` is measured in multiples
/// of `direction`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Line {
  pub point: Vec2,
  pub direction: Vec2,
}

impl Line {
  pub fn new(point: Vec2, direction: Vec2) -> Self {
    Self { point, direction }
  }

  /// The line through `start` and `end`, where `t = 0` maps to `start` and
  /// `t = 1` maps to `end`.
  pub fn through(start: Vec2, end: Vec2) -> Self {
    Self { point: start, direction: end - start }
  }

  /// The point at parameter `t`.
  pub fn at(&self, t: f32) -> Vec2 {
    self.point + t * self.direction
  }

  /// The parameter of the point on the line closest to `v`. Degenerate lines
  /// (zero direction) project everything to `t = 0`.
  pub fn project(&self, v: Vec2) -> f32 {
    let length_squared = self.direction.length_squared();
    if length_squared == 0.0 {
      return 0.0;
    }
    (v - self.point).dot(self.direction) / length_squared
  }

  /// The squared distance from `v` to the closest point on the line.
  pub fn distance_squared(&self, v: Vec2) -> f32 {
    self.at(self.project(v)).distance_squared(v)
  }

  /// Computes the parameter along `self` where it crosses `other`. If the lines
  /// are (nearly) parallel, the result is None.
  pub fn intersect(&self, other: &Line) -> Option<f32> {
    let direction_determinant = determinant(self.direction, other.direction);
    if direction_determinant.abs() <= EPSILON {
      return None;
    }
    Some(
      determinant(other.direction, self.point - other.point)
        / direction_determinant,
    )
  }
}

#[cfg(test)]
#[path = "line_test.rs"]
mod test;
