use std::f32::consts::PI;

use glam::Vec2;

use super::Cone;
use crate::common::determinant;

macro_rules! assert_vec2_near {
  ($a: expr, $b: expr) => {{
    let a = $a;
    let b = $b;

    assert!(
      a.distance_squared(b) < 1e-8,
      "\n  left: {}\n right: {}",
      a,
      b
    );
  }};
}

#[test]
fn legs_are_tangent_to_circle() {
  let cone = Cone::new(Vec2::new(0.0, 5.0), 3.0).unwrap();

  // 3-4-5 triangle.
  assert_vec2_near!(cone.left, Vec2::new(-2.4, 3.2));
  assert_vec2_near!(cone.right, Vec2::new(2.4, 3.2));
  assert!((cone.left.length() - 4.0).abs() < 1e-5);
  assert!((cone.beta - (0.6f32).acos()).abs() < 1e-6);

  // Tangent points are exactly `radius` away from the center, and the legs
  // are perpendicular to the radius at the tangent point.
  for leg in [cone.left, cone.right] {
    assert!((leg.distance(cone.center) - 3.0).abs() < 1e-5);
    assert!(leg.dot(leg - cone.center).abs() < 1e-4);
  }

  assert!(determinant(cone.center, cone.left) > 0.0);
  assert!(determinant(cone.center, cone.right) < 0.0);
}

#[test]
fn point_circle_collapses_to_ray() {
  let cone = Cone::new(Vec2::new(2.0, 0.0), 0.0).unwrap();
  assert_vec2_near!(cone.left, Vec2::new(2.0, 0.0));
  assert_vec2_near!(cone.right, Vec2::new(2.0, 0.0));
  assert!((cone.beta - PI / 2.0).abs() < 1e-6);
}

#[test]
fn origin_inside_circle_has_no_cone() {
  assert_eq!(Cone::new(Vec2::new(0.0, 1.0), 2.0), None);
  assert_eq!(Cone::new(Vec2::new(0.0, 2.0), 2.0), None);
  assert_eq!(Cone::new(Vec2::ZERO, 0.0), None);
  assert_eq!(Cone::new(Vec2::new(0.0, 2.0), f32::NAN), None);
}
