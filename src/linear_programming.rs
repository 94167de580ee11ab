// The contents of this file were primarily ported from Agent.cc from RVO2 with
// significant alterations. As per the Apache-2.0 license, the original
// copyright notice has been included, excluding those notices that do not
// pertain to the derivate work:
//
// Agent.cc
// RVO2 Library
//
// SPDX-FileCopyrightText: 2008 University of North Carolina at Chapel Hill
//
// The authors may be contacted via:
//
// Jur van den Berg, Stephen J. Guy, Jamie Snape, Ming C. Lin, Dinesh Manocha
// Dept. of Computer Science
// 201 S. Columbia St.
// Frederick P. Brooks, Jr. Computer Science Bldg.
// Chapel Hill, N.C. 27599-3175
// United States of America
//
// <https://gamma.cs.unc.edu/RVO2/>

use glam::Vec2;

use crate::{
  common::{determinant, within, EPSILON},
  half_plane::HalfPlane,
  line::Line,
};

/// The region velocities must additionally stay within, e.g. the maximum speed
/// of an agent.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Bound {
  Unbounded,
  /// All values must have a length of at most the contained radius.
  Circular(f32),
}

impl Bound {
  /// Computes the range of "times" along `line` that are within the bound.
  /// `line.direction` must be a unit vector. Returns None if `line` misses the
  /// bound entirely.
  pub fn clip(&self, line: &Line) -> Option<(f32, f32)> {
    let radius = match self {
      Bound::Unbounded => return Some((f32::NEG_INFINITY, f32::INFINITY)),
      &Bound::Circular(radius) => radius,
    };

    // Find the intersecting "times" of the line and the circle with `radius`.
    // This is fairly straightforward by using the equation of ray and a circle
    // and solving. The following is the result of expanding out the quadratic
    // equation.
    let line_dot_product = line.point.dot(line.direction);
    let discriminant = line_dot_product * line_dot_product + radius * radius
      - line.point.dot(line.point);
    if discriminant < 0.0 {
      return None;
    }

    let discriminant = discriminant.sqrt();
    Some((-line_dot_product - discriminant, -line_dot_product + discriminant))
  }

  pub fn contains(&self, value: Vec2) -> bool {
    match self {
      Bound::Unbounded => value.is_finite(),
      &Bound::Circular(radius) => {
        let length = value.length();
        length <= radius || within(length, radius)
      }
    }
  }

  /// The value within the bound closest to `value`.
  pub fn clamp(&self, value: Vec2) -> Vec2 {
    match self {
      Bound::Unbounded => value,
      &Bound::Circular(radius) if value.length_squared() > radius * radius => {
        value.normalize_or_zero() * radius
      }
      Bound::Circular(_) => value,
    }
  }
}

/// The definition of the optimal value ignoring all constraints.
#[derive(Clone, Copy, Debug)]
enum OptimalValue {
  /// The best value of the linear program should be the one nearest to this
  /// point (that satisfies the constraints).
  Point(Vec2),
  /// The best value of the linear program should be the one furthest in this
  /// direction (that satisfies the constraints). This must be a unit vector.
  Direction(Vec2),
}

/// Solves the linear program restricted to the boundary of `constraint`, and
/// within `bound`. In addition, all `previous` constraints are used to further
/// restrict the resulting value. The best value is defined by `optimal_value`.
fn solve_linear_program_along_line(
  constraint: &HalfPlane,
  bound: &Bound,
  previous: &[HalfPlane],
  optimal_value: &OptimalValue,
) -> Result<Vec2, ()> {
  let line = constraint.boundary();

  // The right time is the furthest distance in `line.direction` still in the
  // bound, and the left time is the furthest distance in the opposite
  // direction.
  let (mut t_left, mut t_right) = bound.clip(&line).ok_or(())?;

  for previous_constraint in previous {
    // Solve for the time of intersect for `line` between `line` and
    // `previous_constraint`.
    let previous_direction = previous_constraint.direction();
    let direction_determinant = determinant(line.direction, previous_direction);
    let numerator =
      determinant(previous_direction, line.point - previous_constraint.point);

    if direction_determinant.abs() <= EPSILON {
      // `line` and `previous_constraint` are nearly parallel.
      if numerator < 0.0 {
        // `line` is parallel to and on the invalid side of
        // `previous_constraint`, so all `line` values are invalid.
        return Err(());
      }

      // All `line` values are on the valid side of `previous_constraint`.
      continue;
    }

    let t = numerator / direction_determinant;

    // Cut the remaining values along `line` based on how the half-plane of
    // `previous_constraint` is oriented.
    if direction_determinant >= 0.0 {
      t_right = t_right.min(t);
    } else {
      t_left = t_left.max(t);
    }

    if t_left > t_right {
      return Err(());
    }
  }

  let t = match optimal_value {
    // Pick the most extreme value in the optimal direction. This will always
    // either be t_right or t_left.
    &OptimalValue::Direction(direction) => {
      let t = if direction.dot(line.direction) > 0.0 {
        t_right
      } else {
        t_left
      };
      if t.is_finite() {
        t
      } else {
        // Without a bound, an infinite end is only picked when `line` is
        // perpendicular to `direction`, so every value is equally good. Take
        // the one nearest the origin.
        (-line.point.dot(line.direction)).clamp(t_left, t_right)
      }
    }
    // Project the optimal point onto the line segment [t_left, t_right].
    &OptimalValue::Point(point) => {
      line.direction.dot(point - line.point).clamp(t_left, t_right)
    }
  };

  // Non-finite constraints leave no usable value.
  if !t.is_finite() {
    return Err(());
  }

  Ok(line.at(t))
}

/// The feasible region of a 2D linear program, built up one constraint at a
/// time. Constraints are only ever appended, and once the region becomes empty
/// it stays empty.
#[derive(Clone, Debug)]
pub struct Region {
  bound: Bound,
  optimal_value: OptimalValue,
  constraints: Vec<HalfPlane>,
  value: Vec2,
  feasible: bool,
}

impl Region {
  /// An unconstrained region whose best value is the one nearest to `target`.
  /// `target` is clamped to `bound`.
  pub fn new(bound: Bound, target: Vec2) -> Self {
    let target = bound.clamp(target);
    Self {
      bound,
      optimal_value: OptimalValue::Point(target),
      constraints: Vec::new(),
      value: target,
      feasible: true,
    }
  }

  /// A region within `bound` whose best value is the one furthest in the unit
  /// `direction`. An unbounded region must start from `seed` constraints that
  /// keep the best value finite, and `value` must be their best value. The
  /// seed is ignored for circular bounds.
  fn with_direction(
    bound: Bound,
    direction: Vec2,
    seed: &[HalfPlane],
    value: Vec2,
  ) -> Self {
    let (constraints, value) = match bound {
      Bound::Circular(radius) => (Vec::new(), direction * radius),
      Bound::Unbounded => (seed.to_vec(), value),
    };
    Self {
      bound,
      optimal_value: OptimalValue::Direction(direction),
      constraints,
      value,
      feasible: true,
    }
  }

  /// Restricts the region by `constraint`. Returns whether the region is still
  /// feasible.
  pub fn add(&mut self, constraint: HalfPlane) -> bool {
    if !self.feasible {
      return false;
    }

    // If the current value is already on the valid side of `constraint`,
    // there is nothing to do.
    if !constraint.contains(self.value) {
      // The new best value must reside somewhere on the boundary of
      // `constraint`.
      match solve_linear_program_along_line(
        &constraint,
        &self.bound,
        &self.constraints,
        &self.optimal_value,
      ) {
        Ok(value) => self.value = value,
        Err(()) => {
          self.feasible = false;
          return false;
        }
      }
    }

    self.constraints.push(constraint);
    true
  }

  /// The best value satisfying all accepted constraints. If the region is
  /// infeasible, this is the best value before the failing constraint.
  pub fn value(&self) -> Vec2 {
    self.value
  }

  pub fn is_feasible(&self) -> bool {
    self.feasible
  }

  /// The constraints accepted so far, in order.
  pub fn constraints(&self) -> &[HalfPlane] {
    &self.constraints
  }
}

/// The result of the 2D linear program.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LinearProgram2DResult {
  /// The linear program was feasible and holds the optimal value.
  Feasible(Vec2),
  /// The target was outside the bound, so nothing was solved.
  Infeasible,
  /// The constraints could not all be satisfied.
  Partial {
    /// The index of the constraint which made the linear program infeasible.
    index_of_failed_constraint: usize,
    /// The value at the time that the linear program was determined to be
    /// infeasible. The value is "partial" in the sense that it satisfies all
    /// constraints prior to `index_of_failed_constraint`.
    partial_value: Vec2,
  },
}

/// Solves the 2D linear program of finding the value closest to `target` that
/// is within `bound` and satisfies all `constraints`. Constraints are
/// processed in order. `target` must already be within `bound`.
pub fn solve_linear_program_2d(
  constraints: &[HalfPlane],
  bound: Bound,
  target: Vec2,
) -> LinearProgram2DResult {
  if !bound.contains(target) {
    return LinearProgram2DResult::Infeasible;
  }

  let mut region = Region::new(bound, target);
  for constraint in constraints {
    if !region.add(*constraint) {
      return LinearProgram2DResult::Partial {
        index_of_failed_constraint: region.constraints().len(),
        partial_value: region.value(),
      };
    }
  }
  LinearProgram2DResult::Feasible(region.value())
}

/// Solves the 3D linear program, after the 2D linear program was determined to
/// be infeasible. This effectively finds the first valid value when moving all
/// half-planes back at the same speed, i.e. the value within `bound` that
/// minimizes the largest violation of any constraint.
/// `index_of_failed_constraint` and `partial_value` are the results from the
/// infeasible 2D program, where `partial_value` is assumed to satisfy all
/// `constraints[0..index_of_failed_constraint]`.
pub fn solve_linear_program_3d(
  constraints: &[HalfPlane],
  bound: Bound,
  index_of_failed_constraint: usize,
  partial_value: Vec2,
) -> Vec2 {
  // All constraints before `index_of_failed_constraint` are satisfied, so the
  // deepest penetration into a constraint is 0.
  let mut penetration = 0.0;
  let mut best_value = partial_value;

  for (index, constraint) in
    constraints.iter().enumerate().skip(index_of_failed_constraint)
  {
    if -constraint.signed_distance(best_value) <= penetration {
      // `best_value` does not penetrate the constraint any more than other
      // constraints, so move on (this constraint will still be considered for
      // future constraints).
      continue;
    }

    // Find the value that penetrates `constraint` as little as possible, while
    // not violating any previous constraint more than `constraint`.
    let equal_violation =
      equal_violation_constraints(constraint, &constraints[0..index]);

    // This should in principle not fail. The optimal value is by definition
    // already in the feasible region of the linear program. If it fails, it is
    // due to small floating point errors, and the current `best_value` is kept.
    if let Some(value) =
      solve_directional_program(&equal_violation, bound, constraint.normal)
    {
      best_value = value;
      penetration = -constraint.signed_distance(best_value);
    }
  }

  best_value
}

/// The half-planes of values that violate each of `previous` no more than
/// `constraint`.
fn equal_violation_constraints(
  constraint: &HalfPlane,
  previous: &[HalfPlane],
) -> Vec<HalfPlane> {
  let direction = constraint.direction();
  previous
    .iter()
    .filter_map(|previous_constraint| {
      // The values violating `previous_constraint` more than `constraint` are
      // on one side of the line through the intersection of both boundaries,
      // in the direction of equal violation.
      let previous_direction = previous_constraint.direction();
      let intersection_determinant =
        determinant(direction, previous_direction);

      let intersection_point = if intersection_determinant.abs() <= EPSILON {
        if direction.dot(previous_direction) > 0.0 {
          // The constraints point in the same direction, so optimizing
          // `constraint` will also satisfy `previous_constraint` just as well.
          return None;
        }

        // The constraints point in opposite directions, so the average of the
        // two boundaries is where the constraints are violated the same amount.
        (constraint.point + previous_constraint.point) * 0.5
      } else {
        let intersection_t = determinant(
          previous_direction,
          constraint.point - previous_constraint.point,
        ) / intersection_determinant;
        constraint.point + intersection_t * direction
      };

      let equal_violation_direction =
        (previous_direction - direction).normalize();
      Some(HalfPlane::new(intersection_point, equal_violation_direction.perp()))
    })
    .collect()
}

/// Finds the value within `bound` satisfying all `constraints` that is
/// furthest in the unit `direction`. Returns None if there is no such value.
fn solve_directional_program(
  constraints: &[HalfPlane],
  bound: Bound,
  direction: Vec2,
) -> Option<Vec2> {
  let (seed, value) = match bound {
    Bound::Circular(_) => (Vec::new(), Vec2::ZERO),
    Bound::Unbounded => bounding_seed(constraints, direction)?,
  };
  let seed_constraints: Vec<HalfPlane> =
    seed.iter().map(|&index| constraints[index]).collect();

  let mut region =
    Region::with_direction(bound, direction, &seed_constraints, value);
  for (index, constraint) in constraints.iter().enumerate() {
    if seed.contains(&index) {
      continue;
    }
    if !region.add(*constraint) {
      return None;
    }
  }
  Some(region.value())
}

/// Picks the `constraints` that keep the values furthest in the unit
/// `direction` at a finite distance, and computes the best value of just those
/// constraints. Returns None if `constraints` do not bound `direction`.
fn bounding_seed(
  constraints: &[HalfPlane],
  direction: Vec2,
) -> Option<(Vec<usize>, Vec2)> {
  let opposing = |constraint: &HalfPlane| constraint.normal.dot(-direction);

  // The best value is finite once `-direction` is a non-negative combination
  // of the seed normals. Start from the normal closest to `-direction`.
  let (first, first_constraint) = constraints
    .iter()
    .enumerate()
    .filter(|(_, constraint)| opposing(constraint) > 0.0)
    .max_by(|(_, a), (_, b)| opposing(a).total_cmp(&opposing(b)))?;
  let first_line = first_constraint.boundary();

  // The second normal must be on the other side of `-direction`, less than a
  // half-turn away from the first.
  let side = determinant(first_constraint.normal, -direction).signum();
  let second = constraints
    .iter()
    .enumerate()
    .filter(|(_, constraint)| {
      side * determinant(-direction, constraint.normal) > 0.0
        && side * determinant(first_constraint.normal, constraint.normal) > 0.0
    })
    .max_by(|(_, a), (_, b)| opposing(a).total_cmp(&opposing(b)))
    .and_then(|(second, second_constraint)| {
      first_line
        .intersect(&second_constraint.boundary())
        .map(|t| (second, first_line.at(t)))
    });

  match second {
    Some((second, vertex)) => Some((vec![first, second], vertex)),
    // `first_constraint` alone opposes `direction`, so its whole boundary is
    // equally good.
    None if opposing(first_constraint) >= 1.0 - EPSILON => Some((
      vec![first],
      first_line.at(first_line.project(Vec2::ZERO)),
    )),
    None => None,
  }
}

/// Finds the value within `bound` closest to `target` that satisfies all
/// `constraints`. If no such value exists, the value within `bound` that
/// violates the constraints the least is returned instead.
pub fn solve(constraints: &[HalfPlane], bound: Bound, target: Vec2) -> Vec2 {
  solve_with_fallback(constraints, bound, target).0
}

/// Like `solve`, but also reports the index of the constraint that made the
/// 2D program infeasible, if any.
pub(crate) fn solve_with_fallback(
  constraints: &[HalfPlane],
  bound: Bound,
  target: Vec2,
) -> (Vec2, Option<usize>) {
  let target = bound.clamp(target);
  match solve_linear_program_2d(constraints, bound, target) {
    LinearProgram2DResult::Feasible(value) => (value, None),
    // The target was clamped, so this only happens for non-finite targets.
    LinearProgram2DResult::Infeasible => (target, None),
    LinearProgram2DResult::Partial {
      index_of_failed_constraint,
      partial_value,
    } => {
      let value = solve_linear_program_3d(
        constraints,
        bound,
        index_of_failed_constraint,
        partial_value,
      );
      (value, Some(index_of_failed_constraint))
    }
  }
}

#[cfg(test)]
#[path = "linear_programming_test.rs"]
mod test;
