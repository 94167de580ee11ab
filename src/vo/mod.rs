//! Velocity obstacles. Each obstacle seen by a subject agent is turned into a
//! single half-plane of velocities that avoid it for the next `tau` time
//! units.

mod agent;
mod wall;

pub use agent::{AgentVo, Domain};
pub use wall::{WallDomain, WallVo};

use glam::Vec2;

use crate::{
  agent::Agent,
  error::{Error, Result},
  half_plane::HalfPlane,
  segment::Segment,
};

/// Both agents take half of the responsibility of avoiding each other.
pub const WEIGHT_EQUAL: f32 = 0.5;
/// The subject takes full responsibility for avoiding the obstacle.
pub const WEIGHT_ALL: f32 = 1.0;
/// The subject does not avoid the obstacle at all.
pub const WEIGHT_NONE: f32 = 0.0;

/// The velocity that anchors the half-plane of a velocity obstacle, i.e. the
/// velocity the subject is assumed to keep if it does not need to avoid.
#[derive(Clone, Copy, Debug)]
pub enum VOpt {
  /// The subject's current velocity.
  Velocity,
  /// The zero velocity. This makes the resulting constraints always satisfiable
  /// together, at the cost of agents hesitating more.
  Zero,
  Custom(fn(&dyn Agent) -> Vec2),
}

impl VOpt {
  pub fn resolve<A: Agent>(&self, subject: &A) -> Vec2 {
    match self {
      VOpt::Velocity => subject.velocity(),
      VOpt::Zero => Vec2::ZERO,
      VOpt::Custom(v_opt) => v_opt(subject),
    }
  }
}

/// Tunes how an agent-agent velocity obstacle is turned into a half-plane.
#[derive(Clone, Copy, Debug)]
pub struct VoOptions {
  /// How much of the avoidance the subject takes on, in `[0, 1]`.
  pub weight: f32,
  pub v_opt: VOpt,
}

impl Default for VoOptions {
  fn default() -> Self {
    Self { weight: WEIGHT_EQUAL, v_opt: VOpt::Velocity }
  }
}

impl VoOptions {
  pub fn validate(&self) -> Result<()> {
    if (0.0..=1.0).contains(&self.weight) {
      Ok(())
    } else {
      Err(Error::InvalidWeight(self.weight))
    }
  }
}

/// Anything a subject agent can avoid.
#[derive(Clone, Copy, Debug)]
pub enum Obstacle<'a, A> {
  /// Another (possibly moving) agent.
  Agent { agent: &'a A, options: VoOptions },
  /// A static, impassable segment. Walls never move and never help to avoid,
  /// so the subject always takes full responsibility.
  Wall(&'a Segment),
}

impl<A: Agent> Obstacle<'_, A> {
  /// Computes the half-plane of velocities for `subject` that avoid this
  /// obstacle for `tau` time units.
  pub fn orca<S: Agent>(&self, subject: &S, tau: f32) -> Result<HalfPlane> {
    match self {
      Obstacle::Agent { agent, options } => {
        Ok(AgentVo::new(*agent, subject, tau, options)?.orca())
      }
      Obstacle::Wall(segment) => Ok(WallVo::new(segment, subject, tau)?.orca()),
    }
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod test;
