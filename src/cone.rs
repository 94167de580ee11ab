use glam::Vec2;

/// The cone of rays from the origin that pass through the circle at `center`
/// with `radius`. The sides of the cone are the two tangent lines from the
/// origin to the circle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Cone {
  pub center: Vec2,
  /// The angle at `center` between the direction back to the origin and
  /// either tangent point. This is `acos(radius / |center|)`.
  pub beta: f32,
  /// The left (counter-clockwise) side of the cone, from the origin to the
  /// left tangent point.
  pub left: Vec2,
  /// The right (clockwise) side of the cone, from the origin to the right
  /// tangent point.
  pub right: Vec2,
}

impl Cone {
  /// Builds the cone for the circle at `center` with `radius`. Returns None if
  /// the origin is not strictly outside the circle, since the tangent lines do
  /// not exist in that case.
  pub fn new(center: Vec2, radius: f32) -> Option<Self> {
    let distance_squared = center.length_squared();
    let radius_squared = radius * radius;
    if !(radius >= 0.0) || radius_squared >= distance_squared {
      return None;
    }

    // The tangent points form right triangles with the origin and `center`,
    // where the hypotenuse is `center` and the leg along the circle is
    // `radius`.
    let leg = (distance_squared - radius_squared).sqrt();
    let scale = leg / distance_squared;

    Some(Self {
      center,
      beta: (radius / distance_squared.sqrt()).acos(),
      left: Vec2::new(
        center.x * leg - center.y * radius,
        center.x * radius + center.y * leg,
      ) * scale,
      right: Vec2::new(
        center.x * leg + center.y * radius,
        -center.x * radius + center.y * leg,
      ) * scale,
    })
  }
}

#[cfg(test)]
#[path = "cone_test.rs"]
mod test;
