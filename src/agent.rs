use glam::Vec2;

use crate::error::{Error, Result};

/// Read access to the state of a single agent. Implementations are read-only
/// snapshots for the duration of a step; applying new velocities is up to the
/// caller.
pub trait Agent {
  /// The position of the agent.
  fn position(&self) -> Vec2;
  /// The current velocity of the agent.
  fn velocity(&self) -> Vec2;
  /// The radius of the agent. Agents will use this to avoid bumping into each
  /// other.
  fn radius(&self) -> f32;
  /// The velocity the agent would like to travel at, e.g. the direction to its
  /// current goal.
  fn target_velocity(&self) -> Vec2;
  /// The maximum speed the agent is allowed to move at.
  fn max_speed(&self) -> f32;
}

/// A plain agent that stores all of its state.
#[derive(Clone, PartialEq, Debug)]
pub struct AgentState {
  pub position: Vec2,
  pub velocity: Vec2,
  pub radius: f32,
  pub target_velocity: Vec2,
  pub max_speed: f32,
}

impl AgentState {
  /// A stationary agent with no target velocity.
  pub fn new(position: Vec2, radius: f32, max_speed: f32) -> Self {
    Self {
      position,
      velocity: Vec2::ZERO,
      radius,
      target_velocity: Vec2::ZERO,
      max_speed,
    }
  }

  pub fn with_velocity(mut self, velocity: Vec2) -> Self {
    self.velocity = velocity;
    self
  }

  pub fn with_target(mut self, target_velocity: Vec2) -> Self {
    self.target_velocity = target_velocity;
    self
  }
}

impl Agent for AgentState {
  fn position(&self) -> Vec2 {
    self.position
  }

  fn velocity(&self) -> Vec2 {
    self.velocity
  }

  fn radius(&self) -> f32 {
    self.radius
  }

  fn target_velocity(&self) -> Vec2 {
    self.target_velocity
  }

  fn max_speed(&self) -> f32 {
    self.max_speed
  }
}

impl<T: Agent + ?Sized> Agent for &T {
  fn position(&self) -> Vec2 {
    (**self).position()
  }

  fn velocity(&self) -> Vec2 {
    (**self).velocity()
  }

  fn radius(&self) -> f32 {
    (**self).radius()
  }

  fn target_velocity(&self) -> Vec2 {
    (**self).target_velocity()
  }

  fn max_speed(&self) -> f32 {
    (**self).max_speed()
  }
}

/// A stationary point with no radius. Wall endpoints are avoided as if they
/// were such agents.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) struct StaticPoint(pub Vec2);

impl Agent for StaticPoint {
  fn position(&self) -> Vec2 {
    self.0
  }

  fn velocity(&self) -> Vec2 {
    Vec2::ZERO
  }

  fn radius(&self) -> f32 {
    0.0
  }

  fn target_velocity(&self) -> Vec2 {
    Vec2::ZERO
  }

  fn max_speed(&self) -> f32 {
    0.0
  }
}

/// Rejects agents whose state would poison the geometry with NaNs.
pub(crate) fn validate(agent: &impl Agent) -> Result<()> {
  if !(agent.radius() >= 0.0) || !agent.radius().is_finite() {
    return Err(Error::InvalidAgent { reason: "radius must be non-negative" });
  }
  if !(agent.max_speed() >= 0.0) || !agent.max_speed().is_finite() {
    return Err(Error::InvalidAgent {
      reason: "max speed must be finite and non-negative",
    });
  }
  if !agent.position().is_finite() || !agent.velocity().is_finite() {
    return Err(Error::InvalidAgent {
      reason: "position and velocity must be finite",
    });
  }
  if !agent.target_velocity().is_finite() {
    return Err(Error::InvalidAgent {
      reason: "target velocity must be finite",
    });
  }
  Ok(())
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod test;
