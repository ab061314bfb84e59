use crate::genome::Genome;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitness-relevant measurements the host writes back each tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Seconds since spawn, frozen at death
    pub lifetime: f32,
    /// Domain score: distance travelled, time spent moving, ...
    pub primary: f32,
    /// Secondary counter some rankings subtract, e.g. collisions
    pub penalties: u32,
}

/// One tick's worth of host observations for an agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentReport {
    pub alive: bool,
    pub lifetime: f32,
    pub primary: f32,
    pub penalties: u32,
}

/// The engine's view of one simulated individual
#[derive(Debug, Clone, PartialEq)]
pub struct AgentHandle {
    genome: Genome,
    alive: bool,
    metrics: AgentMetrics,
}

impl AgentHandle {
    /// A living agent with zeroed metrics
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            alive: true,
            metrics: AgentMetrics::default(),
        }
    }

    /// The genome this agent was spawned from
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// False once the host or the engine has killed this agent
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Latest metrics, frozen at death
    pub fn metrics(&self) -> &AgentMetrics {
        &self.metrics
    }

    /// Apply a full host report. Dead agents ignore it; death is permanent.
    pub fn record(&mut self, report: AgentReport) {
        if !self.alive {
            return;
        }
        self.metrics.lifetime = self.metrics.lifetime.max(report.lifetime);
        self.metrics.primary = report.primary;
        self.metrics.penalties = report.penalties;
        self.alive = report.alive;
    }

    /// Accumulate lifetime while alive
    pub fn tick(&mut self, delta: f32) {
        if self.alive && delta > 0.0 {
            self.metrics.lifetime += delta;
        }
    }

    /// Overwrite the domain score while alive
    pub fn set_primary(&mut self, value: f32) {
        if self.alive {
            self.metrics.primary = value;
        }
    }

    /// Accumulate the domain score while alive
    pub fn add_primary(&mut self, amount: f32) {
        if self.alive {
            self.metrics.primary += amount;
        }
    }

    /// Count penalties (e.g. collisions) while alive
    pub fn add_penalty(&mut self, count: u32) {
        if self.alive {
            self.metrics.penalties = self.metrics.penalties.saturating_add(count);
        }
    }

    /// Mark this agent dead, stamping its lifetime
    pub fn kill_at(&mut self, lifetime: f32) {
        if self.alive {
            self.metrics.lifetime = self.metrics.lifetime.max(lifetime);
            self.alive = false;
        }
    }

    /// Mark this agent dead with whatever lifetime it has accumulated
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Reuse this slot for a new individual
    pub(crate) fn respawn_from(&mut self, genome: &Genome) {
        self.genome.clone_from(genome);
        self.alive = true;
        self.metrics = AgentMetrics::default();
    }
}

/// Marks a host entity as the body of the agent in the given engine slot
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentSlot(pub usize);
