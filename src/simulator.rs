use glam::Vec2;

use crate::{
  agent::AgentState,
  error::Result,
  segment::Segment,
  step::{step, LinearIndex, StepOptions},
};

/// A simple driver that owns a crowd of agents and walls, and moves every
/// agent toward its goal.
#[derive(Default)]
pub struct Simulator {
  agents: Vec<AgentState>,
  agent_parameters: Vec<AgentParameters>,
  walls: Vec<Segment>,
}

pub struct AgentParameters {
  /// The point the agent is trying to reach.
  pub goal_point: Vec2,
}

impl Simulator {
  pub fn new() -> Simulator {
    Self::default()
  }

  pub fn add_agent(
    &mut self,
    agent: AgentState,
    agent_parameters: AgentParameters,
  ) {
    self.agents.push(agent);
    self.agent_parameters.push(agent_parameters);
  }

  pub fn add_wall(&mut self, wall: Segment) {
    self.walls.push(wall);
  }

  pub fn remove_agent(&mut self, agent_index: usize) {
    self.agents.remove(agent_index);
    self.agent_parameters.remove(agent_index);
  }

  pub fn remove_wall(&mut self, wall_index: usize) {
    self.walls.remove(wall_index);
  }

  pub fn get_agent(&self, agent_index: usize) -> &AgentState {
    &self.agents[agent_index]
  }

  pub fn get_agent_mut(&mut self, agent_index: usize) -> &mut AgentState {
    &mut self.agents[agent_index]
  }

  pub fn get_agent_count(&self) -> usize {
    self.agents.len()
  }

  pub fn get_wall_count(&self) -> usize {
    self.walls.len()
  }

  pub fn get_agent_parameters(&self, agent_index: usize) -> &AgentParameters {
    &self.agent_parameters[agent_index]
  }

  pub fn get_agent_parameters_mut(
    &mut self,
    agent_index: usize,
  ) -> &mut AgentParameters {
    &mut self.agent_parameters[agent_index]
  }

  /// Moves every agent for `time_step` time units, avoiding collisions `tau`
  /// time units into the future. Agents are left untouched if the step fails.
  pub fn step(&mut self, tau: f32, time_step: f32) -> Result<()> {
    let agents: Vec<AgentState> = self
      .agents
      .iter()
      .zip(self.agent_parameters.iter())
      .map(|(agent, parameters)| {
        agent.clone().with_target(parameters.goal_point - agent.position)
      })
      .collect();

    let mutations = step(
      &LinearIndex::new(&agents),
      &StepOptions::new(tau).with_walls(&self.walls),
    )?;

    self.agents = agents;
    for mutation in mutations {
      let agent = &mut self.agents[mutation.agent];
      agent.velocity = mutation.velocity;
      agent.position += mutation.velocity * time_step;
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod test;
