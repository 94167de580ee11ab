use std::error::Error as StdError;

use glam::Vec2;
use log::{debug, trace};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{
  agent::{self, Agent},
  error::{validate_tau, Error, Result},
  linear_programming::{solve_with_fallback, Bound},
  segment::Segment,
  vo::{Obstacle, VoOptions},
};

#[cfg(feature = "debug")]
use crate::debug::DebugData;

/// The error type neighbour queries may fail with.
pub type QueryError = Box<dyn StdError + Send + Sync>;

/// A read-only spatial index over a snapshot of agents. The index is queried
/// concurrently from several threads during a step, and must not change until
/// the step returns.
pub trait NeighbourQuery: Sync {
  type Agent: Agent + Sync;

  /// All agents in the snapshot. Agents are referred to by their index in this
  /// slice.
  fn agents(&self) -> &[Self::Agent];

  /// The indices of all agents whose position is within `radius` of `center`.
  /// The order of the indices does not matter.
  fn within(
    &self,
    center: Vec2,
    radius: f32,
  ) -> std::result::Result<Vec<usize>, QueryError>;
}

/// A neighbour query that checks every agent. Fine for small crowds.
#[derive(Clone, Copy, Debug)]
pub struct LinearIndex<'a, A> {
  agents: &'a [A],
}

impl<'a, A> LinearIndex<'a, A> {
  pub fn new(agents: &'a [A]) -> Self {
    Self { agents }
  }
}

impl<A: Agent + Sync> NeighbourQuery for LinearIndex<'_, A> {
  type Agent = A;

  fn agents(&self) -> &[A] {
    self.agents
  }

  fn within(
    &self,
    center: Vec2,
    radius: f32,
  ) -> std::result::Result<Vec<usize>, QueryError> {
    let radius_squared = radius * radius;
    Ok(
      self
        .agents
        .iter()
        .enumerate()
        .filter(|(_, agent)| {
          agent.position().distance_squared(center) <= radius_squared
        })
        .map(|(index, _)| index)
        .collect(),
    )
  }
}

/// Options for a single `step`.
pub struct StepOptions<'a, A> {
  /// How far into the future agents look for collisions. Must be at least
  /// `MIN_TAU`.
  pub tau: f32,
  /// Only agents this returns true for are avoided. All agents are avoided if
  /// None.
  pub filter: Option<&'a (dyn Fn(&A) -> bool + Sync)>,
  /// The number of worker threads. If None, rayon's global pool is used.
  /// A new pool is built on every call, so prefer `thread_pool` when stepping
  /// repeatedly.
  pub pool_size: Option<usize>,
  /// A pool to run the step on, reused across calls. Takes precedence over
  /// `pool_size`.
  pub thread_pool: Option<&'a ThreadPool>,
  /// Static walls every agent avoids.
  pub walls: &'a [Segment],
}

impl<'a, A> StepOptions<'a, A> {
  pub fn new(tau: f32) -> Self {
    Self { tau, filter: None, pool_size: None, thread_pool: None, walls: &[] }
  }

  pub fn with_filter(
    mut self,
    filter: &'a (dyn Fn(&A) -> bool + Sync),
  ) -> Self {
    self.filter = Some(filter);
    self
  }

  pub fn with_pool_size(mut self, pool_size: usize) -> Self {
    self.pool_size = Some(pool_size);
    self.thread_pool = None;
    self
  }

  pub fn with_thread_pool(mut self, thread_pool: &'a ThreadPool) -> Self {
    self.thread_pool = Some(thread_pool);
    self.pool_size = None;
    self
  }

  pub fn with_walls(mut self, walls: &'a [Segment]) -> Self {
    self.walls = walls;
    self
  }
}

/// A new velocity for one agent. Applying it (and moving the agent) is up to
/// the caller.
#[derive(Clone, PartialEq, Debug)]
pub struct Mutation {
  /// The index of the agent in `NeighbourQuery::agents`.
  pub agent: usize,
  pub velocity: Vec2,
  /// The constraints used to pick `velocity`.
  #[cfg(feature = "debug")]
  pub debug_data: DebugData,
}

/// The distance within which other agents are considered for avoidance. This
/// is far enough that no agent outside it can reach the subject within `tau`,
/// while never shrinking below a few agent radii.
pub fn neighbour_radius(tau: f32, max_speed: f32, radius: f32) -> f32 {
  (100.0 * tau * max_speed).max(3.0 * radius)
}

/// Computes a new velocity for every agent in `index`. Each velocity is the
/// one closest to the agent's target velocity (clamped to its maximum speed)
/// that avoids its neighbours and `options.walls` for `options.tau` time
/// units. Mutations are returned in agent order. If any agent fails, no
/// mutations are returned.
pub fn step<Q: NeighbourQuery>(
  index: &Q,
  options: &StepOptions<Q::Agent>,
) -> Result<Vec<Mutation>> {
  validate_tau(options.tau)?;

  if let Some(thread_pool) = options.thread_pool {
    return thread_pool.install(|| step_all(index, options));
  }

  match options.pool_size {
    None => step_all(index, options),
    Some(0) => Err(Error::InvalidPoolSize),
    Some(pool_size) => {
      let pool = ThreadPoolBuilder::new().num_threads(pool_size).build()?;
      pool.install(|| step_all(index, options))
    }
  }
}

fn step_all<Q: NeighbourQuery>(
  index: &Q,
  options: &StepOptions<Q::Agent>,
) -> Result<Vec<Mutation>> {
  index
    .agents()
    .par_iter()
    .enumerate()
    .map(|(agent_index, agent)| step_agent(index, options, agent_index, agent))
    .collect()
}

fn step_agent<Q: NeighbourQuery>(
  index: &Q,
  options: &StepOptions<Q::Agent>,
  agent_index: usize,
  agent: &Q::Agent,
) -> Result<Mutation> {
  agent::validate(agent)?;

  let agents = index.agents();
  let neighbours = find_neighbours(index, options, agent_index, agent)?;
  trace!("agent {agent_index} has {} neighbours", neighbours.len());

  let mut constraints =
    Vec::with_capacity(options.walls.len() + neighbours.len());
  for wall in options.walls {
    constraints
      .push(Obstacle::<Q::Agent>::Wall(wall).orca(agent, options.tau)?);
  }
  for neighbour in neighbours {
    constraints.push(
      Obstacle::Agent {
        agent: &agents[neighbour],
        options: VoOptions::default(),
      }
      .orca(agent, options.tau)?,
    );
  }

  let (velocity, index_of_failed_constraint) = solve_with_fallback(
    &constraints,
    Bound::Circular(agent.max_speed()),
    agent.target_velocity(),
  );
  if let Some(index_of_failed_constraint) = index_of_failed_constraint {
    debug!(
      "agent {agent_index} cannot satisfy constraint \
       {index_of_failed_constraint}, minimizing violation instead"
    );
  }

  Ok(Mutation {
    agent: agent_index,
    velocity,
    #[cfg(feature = "debug")]
    debug_data: match index_of_failed_constraint {
      None => DebugData::Satisfied { constraints },
      Some(index_of_failed_constraint) => {
        DebugData::Fallback { constraints, index_of_failed_constraint }
      }
    },
  })
}

/// The indices of the agents `agent` must avoid, nearest first. Ties are broken
/// by index so the order only depends on the snapshot.
fn find_neighbours<Q: NeighbourQuery>(
  index: &Q,
  options: &StepOptions<Q::Agent>,
  agent_index: usize,
  agent: &Q::Agent,
) -> Result<Vec<usize>> {
  let agents = index.agents();
  let radius =
    neighbour_radius(options.tau, agent.max_speed(), agent.radius());

  let mut neighbours = Vec::new();
  for neighbour_index in index
    .within(agent.position(), radius)
    .map_err(Error::NeighbourQuery)?
  {
    if neighbour_index == agent_index {
      continue;
    }
    let neighbour = agents.get(neighbour_index).ok_or_else(|| {
      Error::NeighbourQuery(
        format!("no agent with index {neighbour_index}").into(),
      )
    })?;
    if let Some(filter) = options.filter {
      if !filter(neighbour) {
        continue;
      }
    }
    neighbours.push((
      neighbour.position().distance_squared(agent.position()),
      neighbour_index,
    ));
  }

  neighbours.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
  neighbours.dedup_by_key(|(_, neighbour_index)| *neighbour_index);
  Ok(
    neighbours
      .into_iter()
      .map(|(_, neighbour_index)| neighbour_index)
      .collect(),
  )
}

#[cfg(test)]
#[path = "step_test.rs"]
mod test;
