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
use log::trace;

use crate::{
  agent::{self, Agent, StaticPoint},
  common::{determinant, within},
  error::{validate_tau, Error, Result},
  half_plane::HalfPlane,
  segment::Segment,
  vo::{AgentVo, Domain, VOpt, VoOptions, WEIGHT_ALL},
};

/// The feature of a wall velocity obstacle closest to the subject's velocity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallDomain {
  /// The subject overlaps the wall past its left endpoint.
  CollisionLeft,
  /// The subject overlaps the wall past its right endpoint.
  CollisionRight,
  /// The subject overlaps the body of the wall.
  CollisionLine,
  /// The left end cap or the left leg.
  Left,
  /// The right end cap or the right leg.
  Right,
  /// The body of the wall.
  Line,
}

/// The velocity obstacle induced on a subject agent by a static wall. The wall
/// never moves and never helps with avoidance, so the subject takes full
/// responsibility and the half-plane is anchored at its current velocity.
#[derive(Clone, Copy, Debug)]
pub struct WallVo {
  segment: Segment,
  domain: WallDomain,
  u: Vec2,
  orca: HalfPlane,
}

impl WallVo {
  pub fn new<S: Agent>(
    segment: &Segment,
    subject: &S,
    tau: f32,
  ) -> Result<Self> {
    validate_tau(tau)?;
    agent::validate(subject)?;
    if !segment.start().is_finite() || !segment.end().is_finite() {
      return Err(Error::MalformedWall { reason: "endpoints must be finite" });
    }

    let segment = orient(segment, subject.position());
    let (domain, orca) = resolve(&segment, subject, tau)?;
    if !orca.point.is_finite() || !orca.normal.is_finite() {
      return Err(Error::InconsistentDomain);
    }
    trace!("wall velocity obstacle in {domain:?} domain");

    Ok(Self { segment, domain, u: orca.point - subject.velocity(), orca })
  }

  pub fn domain(&self) -> WallDomain {
    self.domain
  }

  /// The wall, oriented so that the subject is on its right.
  pub fn segment(&self) -> Segment {
    self.segment
  }

  /// The smallest change to the subject's velocity that moves it onto the
  /// boundary of the velocity obstacle.
  pub fn u(&self) -> Vec2 {
    self.u
  }

  pub fn orca(&self) -> HalfPlane {
    self.orca
  }
}

/// Orients `segment` so that `position` is on the right of `start -> end`. Seen
/// from `position`, `start` is then the left endpoint and `end` the right one.
fn orient(segment: &Segment, position: Vec2) -> Segment {
  let start = segment.start();
  let end = segment.end();
  if determinant(position - start, end - start) < 0.0 {
    Segment::new(end, start)
  } else {
    Segment::new(start, end)
  }
}

/// Avoids the wall endpoint `vertex` as if it were a stationary point agent.
fn resolve_vertex<S: Agent>(
  vertex: Vec2,
  subject: &S,
  tau: f32,
) -> Result<(Domain, HalfPlane)> {
  let vo = AgentVo::new(
    &StaticPoint(vertex),
    subject,
    tau,
    &VoOptions { weight: WEIGHT_ALL, v_opt: VOpt::Velocity },
  )?;
  Ok((vo.domain(), vo.orca()))
}

fn resolve<S: Agent>(
  segment: &Segment,
  subject: &S,
  tau: f32,
) -> Result<(WallDomain, HalfPlane)> {
  let position = subject.position();
  let radius = subject.radius();
  let velocity = subject.velocity();

  let left_vertex = segment.start();
  let right_vertex = segment.end();

  if segment.is_degenerate() {
    let (domain, orca) = resolve_vertex(left_vertex, subject, tau)?;
    let domain = match domain {
      Domain::Collision => WallDomain::CollisionLeft,
      Domain::Circle | Domain::Left => WallDomain::Left,
      Domain::Right => WallDomain::Right,
    };
    return Ok((domain, orca));
  }

  let relative_left_vertex = left_vertex - position;
  let relative_right_vertex = right_vertex - position;
  let edge_vector = right_vertex - left_vertex;
  let edge_unit_vector = edge_vector.normalize();

  let dist_left_squared = relative_left_vertex.length_squared();
  let dist_right_squared = relative_right_vertex.length_squared();
  let squared_radius = radius * radius;

  // Compute the time along the edge that the agent's position projects to.
  let edge_t = segment.line.project(position);
  let dist_to_edge_line_squared = segment.line.distance_squared(position);

  let touches = |distance_squared: f32| {
    distance_squared <= squared_radius
      || within(distance_squared.sqrt(), radius)
  };

  // If the agent already overlaps the wall, cut off any velocities that
  // increase the penetration. The endpoints are handled as point obstacles so
  // the agent is pushed directly away from them.
  if edge_t < 0.0 && touches(dist_left_squared) {
    let (_, orca) = resolve_vertex(left_vertex, subject, tau)?;
    return Ok((WallDomain::CollisionLeft, orca));
  } else if edge_t > 1.0 && touches(dist_right_squared) {
    let (_, orca) = resolve_vertex(right_vertex, subject, tau)?;
    return Ok((WallDomain::CollisionRight, orca));
  } else if (0.0..=1.0).contains(&edge_t) && touches(dist_to_edge_line_squared)
  {
    return Ok((
      WallDomain::CollisionLine,
      HalfPlane::new(Vec2::ZERO, -edge_unit_vector.perp()),
    ));
  }

  // If the agent is looking down the length of the wall, the far endpoint is
  // covered by the shadow of the near one, so only the near endpoint matters.
  if edge_t < 0.0 && dist_to_edge_line_squared <= squared_radius {
    let (domain, orca) = resolve_vertex(left_vertex, subject, tau)?;
    let domain = match domain {
      Domain::Right => WallDomain::Right,
      _ => WallDomain::Left,
    };
    return Ok((domain, orca));
  } else if edge_t > 1.0 && dist_to_edge_line_squared <= squared_radius {
    let (domain, orca) = resolve_vertex(right_vertex, subject, tau)?;
    let domain = match domain {
      Domain::Left => WallDomain::Left,
      _ => WallDomain::Right,
    };
    return Ok((domain, orca));
  }

  // The shadow of the wall in velocity space is bounded by the tangents from
  // the origin to each end cap. Note that `tau` is not needed here, since
  // scaling the wall will not change the direction of the shadow.
  let left_leg_squared = dist_left_squared - squared_radius;
  let right_leg_squared = dist_right_squared - squared_radius;
  if left_leg_squared <= 0.0 || right_leg_squared <= 0.0 {
    return Err(Error::MalformedWall {
      reason: "agent overlaps a wall endpoint outside of any collision case",
    });
  }

  let left_shadow_direction = (relative_left_vertex * left_leg_squared.sqrt()
    + relative_left_vertex.perp() * radius)
    / dist_left_squared;
  let right_shadow_direction = (relative_right_vertex
    * right_leg_squared.sqrt()
    - relative_right_vertex.perp() * radius)
    / dist_right_squared;

  let left_cutoff = relative_left_vertex / tau;
  let right_cutoff = relative_right_vertex / tau;
  let cutoff_vector = right_cutoff - left_cutoff;
  let cutoff_radius = radius / tau;

  // Compute the time along the cutoff edge where the velocity projects to.
  let t_cutoff_edge = (velocity - left_cutoff).dot(cutoff_vector)
    / cutoff_vector.length_squared();

  // Compute the time along the shadow directions that the velocity projects to.
  // Since the shadow directions are tangent to the cutoff circles, the time is
  // positive only if the velocity is actually along the shadow line (since the
  // shadow only starts after the tangent point).
  let t_left_shadow = (velocity - left_cutoff).dot(left_shadow_direction);
  let t_right_shadow = (velocity - right_cutoff).dot(right_shadow_direction);

  // Velocities beyond an end of the wall that do not reach the shadow project
  // onto that end cap.
  if t_cutoff_edge < 0.0 && t_left_shadow < 0.0 {
    return Ok((
      WallDomain::Left,
      project_to_circle(velocity, left_cutoff, cutoff_radius),
    ));
  }
  if t_cutoff_edge > 1.0 && t_right_shadow < 0.0 {
    return Ok((
      WallDomain::Right,
      project_to_circle(velocity, right_cutoff, cutoff_radius),
    ));
  }

  // Otherwise project to the left shadow, the right shadow, or the cutoff
  // line, whichever is closest to the velocity.
  let cutoff_edge_distance_squared = if (0.0..=1.0).contains(&t_cutoff_edge) {
    (velocity - (left_cutoff + t_cutoff_edge * cutoff_vector)).length_squared()
  } else {
    f32::INFINITY
  };
  let left_shadow_distance_squared = if t_left_shadow < 0.0 {
    f32::INFINITY
  } else {
    (velocity - (left_cutoff + t_left_shadow * left_shadow_direction))
      .length_squared()
  };
  let right_shadow_distance_squared = if t_right_shadow < 0.0 {
    f32::INFINITY
  } else {
    (velocity - (right_cutoff + t_right_shadow * right_shadow_direction))
      .length_squared()
  };

  // Each boundary is described by a point on it and its outward normal.
  let (domain, boundary_point, normal) = if cutoff_edge_distance_squared
    <= left_shadow_distance_squared
    && cutoff_edge_distance_squared <= right_shadow_distance_squared
  {
    let normal = -cutoff_vector.normalize().perp();
    (WallDomain::Line, left_cutoff + cutoff_radius * normal, normal)
  } else if left_shadow_distance_squared <= right_shadow_distance_squared {
    let normal = left_shadow_direction.perp();
    (WallDomain::Left, left_cutoff + cutoff_radius * normal, normal)
  } else {
    let normal = -right_shadow_direction.perp();
    (WallDomain::Right, right_cutoff + cutoff_radius * normal, normal)
  };

  if !normal.is_finite() {
    return Err(Error::InconsistentDomain);
  }

  // Anchor the half-plane at the closest point of the boundary to the
  // velocity.
  let projected =
    velocity - normal * (velocity - boundary_point).dot(normal);
  Ok((domain, HalfPlane::new(projected, normal)))
}

/// The half-plane tangent to the circle at `center` with `radius`, at the point
/// closest to `velocity`.
fn project_to_circle(velocity: Vec2, center: Vec2, radius: f32) -> HalfPlane {
  let normal = (velocity - center)
    .try_normalize()
    .unwrap_or_else(|| -center.normalize());
  HalfPlane::new(center + radius * normal, normal)
}

#[cfg(test)]
#[path = "wall_test.rs"]
mod test;
