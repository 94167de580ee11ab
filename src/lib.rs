//! An implementation of ORCA (Optimal Reciprocal Collision Avoidance) in 2D.
//!
//! Every agent and wall an agent can see is turned into a half-plane of
//! velocities that avoid it for the next `tau` time units. The velocity closest
//! to the agent's target velocity satisfying all half-planes is then found
//! with an incremental linear program. If no velocity satisfies all of them,
//! the velocity violating them the least is used instead.
//!
//! [`step`] computes new velocities for a whole snapshot of agents at once.
//! [`Simulator`] wraps it for simple use cases.

mod agent;
mod common;
mod cone;
mod error;
mod half_plane;
mod line;
mod linear_programming;
mod segment;
mod simulator;
mod step;
mod vo;

#[cfg(feature = "debug")]
pub mod debug;

pub use agent::{Agent, AgentState};
pub use error::{Error, Result};
pub use half_plane::HalfPlane;
pub use line::Line;
pub use linear_programming::{
  solve, solve_linear_program_2d, solve_linear_program_3d, Bound,
  LinearProgram2DResult, Region,
};
pub use segment::Segment;
pub use simulator::{AgentParameters, Simulator};
pub use step::{
  neighbour_radius, step, LinearIndex, Mutation, NeighbourQuery, QueryError,
  StepOptions,
};
pub use vo::{
  AgentVo, Domain, Obstacle, VOpt, VoOptions, WallDomain, WallVo, WEIGHT_ALL,
  WEIGHT_EQUAL, WEIGHT_NONE,
};

/// The smallest supported lookahead time. Overlapping agents are pushed apart
/// as if they would collide within this time.
pub const MIN_TAU: f32 = 1e-3;

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
