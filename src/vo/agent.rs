use std::f32::consts::{PI, TAU};

use glam::Vec2;
use log::{debug, trace};

use crate::{
  agent::{self, Agent},
  common::{determinant, random_unit_vector, within, EPSILON},
  cone::Cone,
  error::{validate_tau, Error, Result},
  half_plane::HalfPlane,
  vo::VoOptions,
  MIN_TAU,
};

/// The feature of an agent-agent velocity obstacle closest to the relative
/// velocity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Domain {
  /// The agents already overlap.
  Collision,
  /// The truncation circle at the bottom of the cone.
  Circle,
  /// The left (counter-clockwise) leg of the cone.
  Left,
  /// The right (clockwise) leg of the cone.
  Right,
}

/// The velocity obstacle induced on a subject agent by another agent. All
/// derived values are computed once on construction.
#[derive(Clone, Copy, Debug)]
pub struct AgentVo {
  // Position of the obstacle relative to the subject.
  p: Vec2,
  // Combined radius of both agents.
  r: f32,
  // Velocity of the subject relative to the obstacle.
  v: Vec2,
  domain: Domain,
  u: Vec2,
  orca: HalfPlane,
}

impl AgentVo {
  /// Builds the velocity obstacle `obstacle` induces on `subject` when looking
  /// ahead `tau` time units.
  pub fn new<O: Agent, S: Agent>(
    obstacle: &O,
    subject: &S,
    tau: f32,
    options: &VoOptions,
  ) -> Result<Self> {
    validate_tau(tau)?;
    options.validate()?;
    agent::validate(obstacle)?;
    agent::validate(subject)?;

    let p = obstacle.position() - subject.position();
    let r = obstacle.radius() + subject.radius();
    let v = subject.velocity() - obstacle.velocity();

    // Touching agents have no cone either.
    let cone = Cone::new(p, r).filter(|_| !within(p.length(), r));
    let domain = match &cone {
      None => Domain::Collision,
      Some(cone) => classify(cone, v - p / tau),
    };
    let (u, normal) = match domain {
      // Overlapping agents are pushed apart as if the collision would happen
      // within the shortest supported lookahead.
      Domain::Collision => resolve_circle(v - p / MIN_TAU, r / MIN_TAU),
      Domain::Circle => resolve_circle(v - p / tau, r / tau),
      Domain::Left | Domain::Right => {
        let cone = cone.ok_or(Error::InconsistentDomain)?;
        // The right leg is walked from its far end so that, for both legs, the
        // outside of the cone is counter-clockwise of the leg direction.
        let leg =
          if domain == Domain::Left { cone.left } else { -cone.right };
        resolve_leg(leg, v)
      }
    };
    if !u.is_finite() || !normal.is_finite() {
      return Err(Error::InconsistentDomain);
    }
    trace!("agent velocity obstacle in {domain:?} domain, u = {u}");

    Ok(Self {
      p,
      r,
      v,
      domain,
      u,
      orca: HalfPlane::new(
        options.v_opt.resolve(subject) + options.weight * u,
        normal,
      ),
    })
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }

  /// The smallest change to the relative velocity that moves it onto the
  /// boundary of the velocity obstacle.
  pub fn u(&self) -> Vec2 {
    self.u
  }

  /// The half-plane of velocities the subject may take.
  pub fn orca(&self) -> HalfPlane {
    self.orca
  }

  pub fn relative_position(&self) -> Vec2 {
    self.p
  }

  pub fn relative_velocity(&self) -> Vec2 {
    self.v
  }

  pub fn combined_radius(&self) -> f32 {
    self.r
  }
}

/// Classifies the truncated relative velocity `w` (measured from the center of
/// the truncation circle) against `cone`.
fn classify(cone: &Cone, w: Vec2) -> Domain {
  let p = cone.center;
  let distance = p.length();

  let w_length = w.length();
  if w_length <= EPSILON {
    // The angle to `w` is undefined. Treat the velocity as past the cone's
    // tangent points.
    return Domain::Right;
  }

  let mut theta =
    (w.dot(-p) / (w_length * distance)).clamp(-1.0, 1.0).acos();
  if determinant(w, -p) < 0.0 {
    theta = TAU - theta;
  }

  if theta < cone.beta || (TAU - theta).abs() < cone.beta {
    Domain::Circle
  } else if theta < PI {
    Domain::Left
  } else {
    Domain::Right
  }
}

/// Projects onto the circle of `radius` where `w` is measured from the center.
/// Returns `u` and the outward normal.
fn resolve_circle(w: Vec2, radius: f32) -> (Vec2, Vec2) {
  let w_length = w.length();
  if w_length <= EPSILON {
    let direction = random_unit_vector();
    debug!(
      "relative velocity is at the center of the velocity obstacle, escaping \
       toward {direction}"
    );
    return (direction * radius, direction);
  }

  let u = (radius / w_length - 1.0) * w;
  let sign = if w_length > radius { -1.0 } else { 1.0 };
  let normal = (sign * u).normalize_or_zero();
  if normal == Vec2::ZERO {
    // `w` lies exactly on the circle.
    return (u, w / w_length);
  }
  (u, normal)
}

/// Projects `v` onto the line along `leg`. Returns `u` and the outward normal.
fn resolve_leg(leg: Vec2, v: Vec2) -> (Vec2, Vec2) {
  let u = (v.dot(leg) / leg.length_squared()) * leg - v;
  let sign = if determinant(leg, v) > 0.0 { -1.0 } else { 1.0 };
  let normal = (sign * u).normalize_or_zero();
  if normal == Vec2::ZERO {
    // `v` lies exactly on the leg.
    return (u, leg.perp().normalize());
  }
  (u, normal)
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod test;
