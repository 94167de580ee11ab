use super::*;

macro_rules! assert_vec2_near {
  ($a: expr, $b: expr) => {{
    let a = $a;
    let b = $b;

    assert!(
      (a - b).length_squared() < super::EPSILON,
      "\n  left: {}\n right: {}",
      a,
      b
    );
  }};
}

mod bound_tests {
  use glam::Vec2;

  use super::{Bound, Line};

  #[test]
  fn circular_bound_clips_lines() {
    let bound = Bound::Circular(1.0);
    let (t_left, t_right) = bound
      .clip(&Line::new(Vec2::new(0.5, -3.0), Vec2::new(0.0, 1.0)))
      .unwrap();
    let circle_height_at_half = (1.0f32 - 0.5 * 0.5).sqrt();
    assert!((t_left - (3.0 - circle_height_at_half)).abs() < 1e-5);
    assert!((t_right - (3.0 + circle_height_at_half)).abs() < 1e-5);

    assert_eq!(
      bound.clip(&Line::new(Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0))),
      None
    );
  }

  #[test]
  fn unbounded_clips_nothing() {
    assert_eq!(
      Bound::Unbounded
        .clip(&Line::new(Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0))),
      Some((f32::NEG_INFINITY, f32::INFINITY))
    );
    assert!(Bound::Unbounded.contains(Vec2::new(1e20, -1e20)));
    assert_eq!(
      Bound::Unbounded.clamp(Vec2::new(5.0, 5.0)),
      Vec2::new(5.0, 5.0)
    );
  }

  #[test]
  fn circular_bound_contains_and_clamps() {
    let bound = Bound::Circular(2.0);
    assert!(bound.contains(Vec2::new(1.0, 1.0)));
    assert!(bound.contains(Vec2::new(0.0, 2.0)));
    assert!(!bound.contains(Vec2::new(2.0, 2.0)));

    assert_eq!(bound.clamp(Vec2::new(1.0, 1.0)), Vec2::new(1.0, 1.0));
    assert_eq!(bound.clamp(Vec2::new(0.0, 4.0)), Vec2::new(0.0, 2.0));
    assert!(bound.contains(bound.clamp(Vec2::new(3.0, -7.0))));

    assert_eq!(Bound::Circular(0.0).clamp(Vec2::new(1.0, 0.0)), Vec2::ZERO);
  }
}

mod solve_linear_program_along_line_tests {
  use glam::Vec2;

  use super::{solve_linear_program_along_line, Bound, HalfPlane, OptimalValue};

  // All velocities with x <= 0.5.
  fn valid_half_plane() -> HalfPlane {
    HalfPlane::new(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0))
  }

  #[test]
  fn projects_optimal_point_with_no_constraints() {
    // Compute what the circle height should be at the 0.5 mark.
    let circle_height_at_half = (1.0f32 - 0.5 * 0.5).sqrt();

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Point(Vec2::new(5.0, 0.25)),
      ),
      Ok(Vec2::new(0.5, 0.25))
    );

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Point(Vec2::new(5.0, 2.0)),
      ),
      Ok(Vec2::new(0.5, circle_height_at_half))
    );

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Point(Vec2::new(5.0, -100.0)),
      ),
      Ok(Vec2::new(0.5, -circle_height_at_half))
    );

    // Without a bound the projection is never clamped.
    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Unbounded,
        &[],
        &OptimalValue::Point(Vec2::new(5.0, -100.0)),
      ),
      Ok(Vec2::new(0.5, -100.0))
    );
  }

  #[test]
  fn projects_optimal_direction_with_no_constraints() {
    let circle_height_at_half = (1.0f32 - 0.5 * 0.5).sqrt();

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Direction(Vec2::new(1.0, 0.5).normalize()),
      ),
      Ok(Vec2::new(0.5, circle_height_at_half))
    );

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Direction(Vec2::new(1.0, -0.5).normalize()),
      ),
      Ok(Vec2::new(0.5, -circle_height_at_half))
    );

    // Without a bound, an infinite end gives way to the value nearest the
    // origin.
    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Unbounded,
        &[],
        &OptimalValue::Direction(Vec2::new(0.0, 1.0)),
      ),
      Ok(Vec2::new(0.5, 0.0))
    );
  }

  #[test]
  fn constraints_remove_valid_values() {
    let constraints = [
      // y <= 0.5, which crosses the boundary at (0.5, 0.5).
      HalfPlane::new(Vec2::new(-100.0, 0.5), Vec2::new(0.0, -1.0)),
      // Crosses the boundary at (0.5, -0.75), removing values below.
      HalfPlane::new(
        Vec2::new(0.25, -1.0),
        Vec2::new(1.0, 1.0).normalize().perp(),
      ),
    ];

    // The middle value should be unchanged.
    assert_vec2_near!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &constraints,
        &OptimalValue::Point(Vec2::new(-5.0, 0.25)),
      )
      .unwrap(),
      Vec2::new(0.5, 0.25)
    );

    assert_vec2_near!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &constraints,
        &OptimalValue::Point(Vec2::new(-5.0, 1.0)),
      )
      .unwrap(),
      Vec2::new(0.5, 0.5)
    );

    assert_vec2_near!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &constraints,
        &OptimalValue::Point(Vec2::new(-5.0, -1.0)),
      )
      .unwrap(),
      Vec2::new(0.5, -0.75)
    );
  }

  #[test]
  fn constraints_are_infeasible() {
    let constraints = [
      // y >= 0.5
      HalfPlane::new(Vec2::new(-100.0, 0.5), Vec2::new(0.0, 1.0)),
      // y <= -0.5
      HalfPlane::new(Vec2::new(-100.0, -0.5), Vec2::new(0.0, -1.0)),
    ];

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Circular(1.0),
        &constraints,
        &OptimalValue::Point(Vec2::ZERO),
      ),
      Err(())
    );
  }

  #[test]
  fn parallel_constraint_on_invalid_side_is_infeasible() {
    // x >= 0.75 excludes the whole boundary of x <= 0.5.
    let constraints =
      [HalfPlane::new(Vec2::new(0.75, 0.0), Vec2::new(1.0, 0.0))];

    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Unbounded,
        &constraints,
        &OptimalValue::Point(Vec2::ZERO),
      ),
      Err(())
    );

    // x <= 0.75 contains the whole boundary.
    let constraints =
      [HalfPlane::new(Vec2::new(0.75, 0.0), Vec2::new(-1.0, 0.0))];
    assert_eq!(
      solve_linear_program_along_line(
        &valid_half_plane(),
        &Bound::Unbounded,
        &constraints,
        &OptimalValue::Point(Vec2::ZERO),
      ),
      Ok(Vec2::new(0.5, 0.0))
    );
  }

  #[test]
  fn boundary_outside_circle() {
    assert_eq!(
      solve_linear_program_along_line(
        &HalfPlane::new(Vec2::new(2.0, 0.0), Vec2::new(-1.0, 0.0)),
        &Bound::Circular(1.0),
        &[],
        &OptimalValue::Point(Vec2::ZERO),
      ),
      Err(())
    );
  }
}

mod region_tests {
  use glam::Vec2;

  use super::{Bound, HalfPlane, Region};

  #[test]
  fn region_accepts_constraints_in_order() {
    let mut region = Region::new(Bound::Circular(1.0), Vec2::new(3.0, 0.0));
    assert_eq!(region.value(), Vec2::new(1.0, 0.0));
    assert!(region.is_feasible());

    // x <= 0.5
    assert!(
      region.add(HalfPlane::new(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0)))
    );
    assert_eq!(region.value(), Vec2::new(0.5, 0.0));
    // y <= 1, already satisfied.
    assert!(
      region.add(HalfPlane::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0)))
    );
    assert_eq!(region.value(), Vec2::new(0.5, 0.0));
    assert_eq!(region.constraints().len(), 2);
  }

  #[test]
  fn infeasible_region_never_recovers() {
    let mut region = Region::new(Bound::Circular(1.0), Vec2::ZERO);

    // x >= 0.5 and x <= -0.5.
    assert!(
      region.add(HalfPlane::new(Vec2::new(0.5, 0.0), Vec2::new(1.0, 0.0)))
    );
    assert!(
      !region.add(HalfPlane::new(Vec2::new(-0.5, 0.0), Vec2::new(-1.0, 0.0)))
    );
    assert!(!region.is_feasible());
    assert_eq!(region.value(), Vec2::new(0.5, 0.0));

    // Even a trivially satisfied constraint is rejected now.
    assert!(
      !region.add(HalfPlane::new(Vec2::new(0.0, 5.0), Vec2::new(0.0, -1.0)))
    );
    assert_eq!(region.constraints().len(), 1);
  }
}

mod solve_linear_program_2d_tests {
  use glam::Vec2;

  use super::{solve_linear_program_2d, Bound, HalfPlane, LinearProgram2DResult};

  // x <= 0.5 and y >= -0.25.
  fn constraints() -> [HalfPlane; 2] {
    [
      HalfPlane::new(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0)),
      HalfPlane::new(Vec2::new(-0.5, -0.25), Vec2::new(0.0, 1.0)),
    ]
  }

  #[test]
  fn no_constraints_returns_target() {
    assert_eq!(
      solve_linear_program_2d(&[], Bound::Circular(1.0), Vec2::new(0.5, 0.25)),
      LinearProgram2DResult::Feasible(Vec2::new(0.5, 0.25))
    );
    assert_eq!(
      solve_linear_program_2d(&[], Bound::Unbounded, Vec2::new(50.0, 25.0)),
      LinearProgram2DResult::Feasible(Vec2::new(50.0, 25.0))
    );
  }

  #[test]
  fn target_outside_bound_is_infeasible() {
    assert_eq!(
      solve_linear_program_2d(&[], Bound::Circular(1.0), Vec2::new(1.0, 1.0)),
      LinearProgram2DResult::Infeasible
    );
  }

  #[test]
  fn satisfies_constraints() {
    // Same in, same out.
    assert_eq!(
      solve_linear_program_2d(
        &constraints(),
        Bound::Circular(1.0),
        Vec2::new(-0.1, 0.3)
      ),
      LinearProgram2DResult::Feasible(Vec2::new(-0.1, 0.3))
    );

    // Restricted by `constraints[0]`.
    assert_eq!(
      solve_linear_program_2d(
        &constraints(),
        Bound::Circular(1.0),
        Vec2::new(0.8, 0.5)
      ),
      LinearProgram2DResult::Feasible(Vec2::new(0.5, 0.5))
    );

    // Restricted by `constraints[1]`.
    assert_eq!(
      solve_linear_program_2d(
        &constraints(),
        Bound::Circular(1.0),
        Vec2::new(0.0, -0.5)
      ),
      LinearProgram2DResult::Feasible(Vec2::new(0.0, -0.25))
    );

    // Restricted by both constraints.
    assert_eq!(
      solve_linear_program_2d(
        &constraints(),
        Bound::Circular(1.0),
        Vec2::new(0.8, -0.5)
      ),
      LinearProgram2DResult::Feasible(Vec2::new(0.5, -0.25))
    );
  }

  #[test]
  fn constraints_are_infeasible() {
    let constraints = [
      // x <= 0
      HalfPlane::new(Vec2::ZERO, Vec2::new(-1.0, 0.0)),
      // y >= 0
      HalfPlane::new(Vec2::ZERO, Vec2::new(0.0, 1.0)),
      // x >= y + 0.2
      HalfPlane::new(Vec2::new(0.1, -0.1), Vec2::new(1.0, -1.0).normalize()),
    ];

    assert_eq!(
      solve_linear_program_2d(
        &constraints,
        Bound::Circular(1.0),
        Vec2::new(0.6, 0.8)
      ),
      LinearProgram2DResult::Partial {
        index_of_failed_constraint: 2,
        partial_value: Vec2::new(0.0, 0.8)
      }
    )
  }
}

mod solve_linear_program_3d_tests {
  use glam::Vec2;

  use super::{solve_linear_program_3d, Bound, HalfPlane};

  #[test]
  fn minimally_penetrates_constraints() {
    let constraints = [
      // y >= 0
      HalfPlane::new(Vec2::new(-100.0, 0.0), Vec2::new(0.0, 1.0)),
      // x >= 0
      HalfPlane::new(Vec2::ZERO, Vec2::new(1.0, 0.0)),
      // x + y <= -1
      HalfPlane::new(Vec2::new(0.0, -1.0), Vec2::new(-1.0, -1.0).normalize()),
    ];

    let root_2 = 2.0f32.sqrt();

    for bound in [Bound::Circular(2.0), Bound::Unbounded] {
      assert_vec2_near!(
        solve_linear_program_3d(
          &constraints,
          bound,
          /* index_of_failed_constraint= */ 0,
          Vec2::new(0.0, 0.0)
        ),
        // This is the point equa-distant from all three constraint lines.
        Vec2::new(-1.0, -1.0).normalize() * (root_2 / (2.0 + root_2))
      );
    }
  }

  #[test]
  fn opposing_parallel_constraints_meet_in_the_middle() {
    let constraints = [
      // y >= 1
      HalfPlane::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0)),
      // y <= -1
      HalfPlane::new(Vec2::new(0.0, -1.0), Vec2::new(0.0, -1.0)),
    ];

    let value = solve_linear_program_3d(
      &constraints,
      Bound::Circular(10.0),
      /* index_of_failed_constraint= */ 1,
      Vec2::new(0.0, 1.0),
    );
    // Both constraints are violated by the same amount.
    assert!(value.y.abs() < 1e-5, "{}", value);
    assert!(value.length() <= 10.0 + 1e-4);
  }
}

mod solve_tests {
  use glam::Vec2;
  use rand::{rngs::StdRng, Rng, SeedableRng};

  use super::{
    solve, solve_linear_program_2d, Bound, HalfPlane, LinearProgram2DResult,
  };

  #[test]
  fn uses_projected_target() {
    let one_over_root_2 = 1.0f32 / 2.0f32.sqrt();

    assert_eq!(
      solve(&[], Bound::Circular(1.0), Vec2::new(0.5, 0.25)),
      Vec2::new(0.5, 0.25)
    );
    assert_vec2_near!(
      solve(&[], Bound::Circular(1.0), Vec2::new(1.0, 1.0)),
      Vec2::new(one_over_root_2, one_over_root_2)
    );
  }

  #[test]
  fn infeasible_program_minimally_penetrates_constraints() {
    let constraints = [
      HalfPlane::new(Vec2::new(-100.0, 0.0), Vec2::new(0.0, 1.0)),
      HalfPlane::new(Vec2::ZERO, Vec2::new(1.0, 0.0)),
      HalfPlane::new(Vec2::new(0.0, -1.0), Vec2::new(-1.0, -1.0).normalize()),
    ];

    let root_2 = 2.0f32.sqrt();

    assert_vec2_near!(
      solve(&constraints, Bound::Circular(2.0), Vec2::new(1.0, 1.0)),
      Vec2::new(-1.0, -1.0).normalize() * (root_2 / (2.0 + root_2))
    );
  }

  // 2x - y <= -6, -3x - y <= -6 and y <= 1.
  fn wedge_under_ceiling() -> [HalfPlane; 3] {
    [
      HalfPlane::new(Vec2::new(0.0, 6.0), Vec2::new(-2.0, 1.0).normalize()),
      HalfPlane::new(Vec2::new(0.0, 6.0), Vec2::new(3.0, 1.0).normalize()),
      HalfPlane::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0)),
    ]
  }

  #[test]
  fn falls_back_when_infeasible_regardless_of_order() {
    let constraints = wedge_under_ceiling();
    let swapped = [constraints[1], constraints[0], constraints[2]];

    for constraints in [&constraints, &swapped] {
      assert!(matches!(
        solve_linear_program_2d(constraints, Bound::Circular(10.0), Vec2::ZERO),
        LinearProgram2DResult::Partial { index_of_failed_constraint: 2, .. }
      ));
    }

    let value = solve(&constraints, Bound::Circular(10.0), Vec2::ZERO);
    let swapped_value = solve(&swapped, Bound::Circular(10.0), Vec2::ZERO);
    assert!(
      value.distance(swapped_value) < 1e-4,
      "{} {}",
      value,
      swapped_value
    );

    // The value moves up, into the wedge, until the violation of the wedge and
    // the ceiling balance out.
    assert!(value.y > 0.0, "{}", value);
    assert!(value.distance(Vec2::new(-0.2568, 2.3864)) < 1e-3, "{}", value);

    let violations =
      constraints.map(|constraint| -constraint.signed_distance(value));
    for violation in violations {
      assert!((violation - violations[0]).abs() < 1e-3, "{:?}", violations);
      assert!(violation > 0.0);
    }
  }

  #[test]
  fn unbounded_infeasible_program_balances_violations() {
    let constraints = [
      // y >= 6
      HalfPlane::new(Vec2::new(0.0, 6.0), Vec2::new(0.0, 1.0)),
      // y <= 1
      HalfPlane::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0)),
    ];

    assert_eq!(
      solve_linear_program_2d(&constraints, Bound::Unbounded, Vec2::ZERO),
      LinearProgram2DResult::Partial {
        index_of_failed_constraint: 1,
        partial_value: Vec2::new(0.0, 6.0),
      }
    );

    let value = solve(&constraints, Bound::Unbounded, Vec2::ZERO);
    assert_vec2_near!(value, Vec2::new(0.0, 3.5));
    for constraint in constraints {
      assert!((constraint.signed_distance(value) + 2.5).abs() < 1e-5);
    }
  }

  #[test]
  fn unbounded_fallback_matches_large_bound() {
    let constraints = wedge_under_ceiling();
    let swapped = [constraints[1], constraints[0], constraints[2]];

    for constraints in [&constraints, &swapped] {
      let unbounded = solve(constraints, Bound::Unbounded, Vec2::ZERO);
      let bounded = solve(constraints, Bound::Circular(10.0), Vec2::ZERO);
      assert!(unbounded.distance(bounded) < 1e-3, "{} {}", unbounded, bounded);
    }
  }

  #[test]
  fn unbounded_fallback_is_finite_for_random_programs() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut fallbacks = 0;
    for _ in 0..500 {
      let constraints: Vec<HalfPlane> = (0..rng.random_range(2..8))
        .map(|_| {
          let angle = rng.random_range(0.0..std::f32::consts::TAU);
          HalfPlane::new(
            Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)),
            Vec2::from_angle(angle),
          )
        })
        .collect();

      let unbounded = solve(&constraints, Bound::Unbounded, Vec2::ZERO);
      assert!(unbounded.is_finite(), "{:?}", constraints);
      if matches!(
        solve_linear_program_2d(&constraints, Bound::Unbounded, Vec2::ZERO),
        LinearProgram2DResult::Feasible(_)
      ) {
        continue;
      }
      fallbacks += 1;

      // No larger bound finds a value violating the constraints any less.
      let bounded = solve(&constraints, Bound::Circular(1000.0), Vec2::ZERO);
      let largest_violation = |value: Vec2| {
        constraints
          .iter()
          .map(|constraint| -constraint.signed_distance(value))
          .fold(f32::NEG_INFINITY, f32::max)
      };
      let bounded_violation = largest_violation(bounded);
      assert!(
        largest_violation(unbounded)
          <= bounded_violation + 1e-2 * bounded_violation.max(1.0),
        "{:?}",
        constraints
      );
    }
    assert!(fallbacks > 0);
  }
}
