use std::f32::consts::TAU;

use glam::Vec2;

/// Tolerance used for geometric predicates (parallel lines, touching circles,
/// zero-length vectors).
pub const EPSILON: f32 = 1e-5;

/// Computes the 2D determinant of `a` and `b`, aka the 2D cross product.
pub fn determinant(a: Vec2, b: Vec2) -> f32 {
  a.x * b.y - a.y * b.x
}

/// Returns whether `a` and `b` are equal up to `EPSILON`, relative to their
/// magnitude for large values.
pub fn within(a: f32, b: f32) -> bool {
  (a - b).abs() <= EPSILON * 1f32.max(a.abs()).max(b.abs())
}

/// A unit vector pointing in a uniformly random direction. Used to break ties
/// when the geometry does not define a direction (e.g. two agents exactly on
/// top of one another).
pub fn random_unit_vector() -> Vec2 {
  Vec2::from_angle(rand::random::<f32>() * TAU)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod test;
