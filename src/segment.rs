use glam::Vec2;

use crate::{common::EPSILON, line::Line};

/// A line restricted to the parametric domain `[t_min, t_max]`. Walls are
/// described by segments.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Segment {
  pub line: Line,
  pub t_min: f32,
  pub t_max: f32,
}

impl Segment {
  /// The segment from `start` to `end`, parameterized over `[0, 1]`.
  pub fn new(start: Vec2, end: Vec2) -> Self {
    Self { line: Line::through(start, end), t_min: 0.0, t_max: 1.0 }
  }

  /// A segment along `line` between the parameters `t_min` and `t_max`. The
  /// bounds are swapped if given out of order.
  pub fn from_line(line: Line, t_min: f32, t_max: f32) -> Self {
    Self { line, t_min: t_min.min(t_max), t_max: t_min.max(t_max) }
  }

  pub fn start(&self) -> Vec2 {
    self.line.at(self.t_min)
  }

  pub fn end(&self) -> Vec2 {
    self.line.at(self.t_max)
  }

  /// The same segment traversed in the opposite direction.
  pub fn reversed(&self) -> Self {
    Self::new(self.end(), self.start())
  }

  /// Whether the segment has (nearly) no length and so behaves like a point.
  pub fn is_degenerate(&self) -> bool {
    self.start().distance_squared(self.end()) <= EPSILON * EPSILON
  }

  /// Clamps `t` into the domain of the segment.
  pub fn clamp_t(&self, t: f32) -> f32 {
    t.clamp(self.t_min, self.t_max)
  }

  /// The point of the segment closest to `v`.
  pub fn closest_point(&self, v: Vec2) -> Vec2 {
    self.line.at(self.clamp_t(self.line.project(v)))
  }

  pub fn distance_squared(&self, v: Vec2) -> f32 {
    self.closest_point(v).distance_squared(v)
  }
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod test;
