use crate::agent::{AgentHandle, AgentMetrics, AgentReport};
use crate::breeding::DriftPolicy;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::genome::Genome;
use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

/// Where the generational loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpochPhase {
    Spawning,
    Evaluating,
    Breeding,
}

/// Summary of one completed breeding cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Index of the generation that was just spawned
    pub generation: u32,
    pub offspring: usize,
    /// Agents still alive when the epoch ended
    pub survivors: usize,
    pub best_key: f32,
    pub worst_key: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Evaluating,
    Bred(GenerationReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub slot: usize,
    pub genes: Vec<u32>,
    pub alive: bool,
    pub metrics: AgentMetrics,
}

/// Read-only copy of the population for rendering and telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationSnapshot {
    pub generation: u32,
    pub elapsed: f32,
    pub agents: Vec<AgentSnapshot>,
}

/// Owns the current generation and drives the epoch timer.
/// Agent slots are reused from one generation to the next.
#[derive(Resource, Debug, Clone)]
pub struct PopulationManager {
    config: EngineConfig,
    agents: Vec<AgentHandle>,
    offspring: Vec<Genome>,
    generation: u32,
    elapsed: f32,
    phase: EpochPhase,
    rng: StdRng,
}

impl PopulationManager {
    /// Validate `config` and spawn the first generation
    pub fn new(config: EngineConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let mut manager = Self {
            config,
            agents: Vec::with_capacity(config.population_size),
            offspring: Vec::with_capacity(config.population_size),
            generation: 1,
            elapsed: 0.0,
            phase: EpochPhase::Spawning,
            rng,
        };
        manager.spawn_population()?;
        Ok(manager)
    }

    /// Build a manager with a reproducible random source
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Build a manager seeded from the operating system
    pub fn from_entropy(config: EngineConfig) -> Result<Self> {
        Self::new(config, StdRng::from_entropy())
    }

    /// Discard everything and start over from generation 1 with fresh random genomes
    pub fn spawn_population(&mut self) -> Result<()> {
        self.phase = EpochPhase::Spawning;
        self.agents.clear();
        for _ in 0..self.config.population_size {
            let genome = Genome::random(
                self.config.genome_length,
                self.config.max_gene_value,
                &mut self.rng,
            )?;
            self.agents.push(AgentHandle::new(genome));
        }
        self.generation = 1;
        self.elapsed = 0.0;
        self.phase = EpochPhase::Evaluating;
        debug!(
            "spawned {} agents with {} genes in [0, {}]",
            self.agents.len(),
            self.config.genome_length,
            self.config.max_gene_value
        );
        Ok(())
    }

    /// Tick the epoch clock; breeds synchronously once the trial time is reached
    pub fn advance(&mut self, delta: f32) -> Result<AdvanceOutcome> {
        if !(delta.is_finite() && delta >= 0.0) {
            warn!("ignoring invalid delta time {}", delta);
            return Ok(AdvanceOutcome::Evaluating);
        }
        self.elapsed += delta;
        if self.elapsed < self.config.trial_time {
            return Ok(AdvanceOutcome::Evaluating);
        }
        self.breed_next_generation().map(AdvanceOutcome::Bred)
    }

    /// Rank the current generation, breed its replacement and start a new epoch.
    /// Fails without touching the population if the pairing window over the
    /// current generation would produce no offspring.
    pub fn breed_next_generation(&mut self) -> Result<GenerationReport> {
        let size = self.agents.len();
        if self.config.pairing.offspring_count(size) == 0 {
            return Err(EngineError::PopulationExhausted {
                generation: self.generation,
                size,
            });
        }
        self.phase = EpochPhase::Breeding;
        let Self {
            config,
            agents,
            offspring,
            rng,
            ..
        } = self;

        let survivors = agents.iter().filter(|a| a.is_alive()).count();
        if config.retire_survivors {
            agents.iter_mut().for_each(AgentHandle::kill);
        }

        let order = config.ranking.rank(agents.as_slice(), config.trial_time);
        let key_at = |i: usize| config.ranking.primary_key(&agents[order[i]], config.trial_time);
        let worst_key = key_at(0);
        let best_key = key_at(order.len() - 1);

        let window = config.pairing.indices(agents.len());
        let target = match config.drift {
            DriftPolicy::Preserve => config.pairing.offspring_count(agents.len()),
            DriftPolicy::Resize => config.population_size,
        };

        let mut produced = 0;
        'fill: while produced < target {
            for i in window.clone() {
                for _ in 0..config.pairing.repeats {
                    for (a, b) in [(order[i], order[i + 1]), (order[i + 1], order[i])] {
                        if produced == target {
                            break 'fill;
                        }
                        let parent_a = agents[a].genome();
                        let parent_b = agents[b].genome();
                        if produced == offspring.len() {
                            offspring.push(parent_a.clone());
                        }
                        config
                            .breeding
                            .breed_into(&mut offspring[produced], parent_a, parent_b, rng)?;
                        produced += 1;
                    }
                }
            }
        }

        let natural = config.pairing.offspring_count(agents.len());
        if produced != natural {
            warn!("resized offspring from {} to {} agents", natural, produced);
        }

        agents.truncate(produced);
        for (slot, genome) in offspring[..produced].iter().enumerate() {
            match agents.get_mut(slot) {
                Some(agent) => agent.respawn_from(genome),
                None => agents.push(AgentHandle::new(genome.clone())),
            }
        }

        self.generation += 1;
        self.elapsed = 0.0;
        self.phase = EpochPhase::Evaluating;

        let report = GenerationReport {
            generation: self.generation,
            offspring: produced,
            survivors,
            best_key,
            worst_key,
        };
        info!(
            "generation {} bred: {} offspring, {} survivors, keys {:.2}..{:.2}",
            report.generation, report.offspring, report.survivors, report.worst_key, report.best_key
        );
        Ok(report)
    }

    /// Configuration this manager was validated against
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current generation index, starting at 1
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Seconds into the current epoch
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Where the generational loop currently is
    pub fn phase(&self) -> EpochPhase {
        self.phase
    }

    /// Number of agents in the current generation
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True when the current generation has no agents
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents still alive this epoch
    pub fn living(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// All agents, indexed by slot
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    /// Mutable access for hosts writing metrics; the slot count is fixed
    pub fn agents_mut(&mut self) -> &mut [AgentHandle] {
        &mut self.agents
    }

    /// Agent at `slot`, or `AgentOutOfRange`
    pub fn agent(&self, slot: usize) -> Result<&AgentHandle> {
        let len = self.agents.len();
        self.agents.get(slot).ok_or(EngineError::AgentOutOfRange { slot, len })
    }

    /// Mutable agent at `slot`, or `AgentOutOfRange`
    pub fn agent_mut(&mut self, slot: usize) -> Result<&mut AgentHandle> {
        let len = self.agents.len();
        self.agents
            .get_mut(slot)
            .ok_or(EngineError::AgentOutOfRange { slot, len })
    }

    /// Write a host report into the agent at `slot`
    pub fn record(&mut self, slot: usize, report: AgentReport) -> Result<()> {
        self.agent_mut(slot)?.record(report);
        Ok(())
    }

    /// Copy out genes, liveness and metrics of every agent
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            generation: self.generation,
            elapsed: self.elapsed,
            agents: self
                .agents
                .iter()
                .enumerate()
                .map(|(slot, agent)| AgentSnapshot {
                    slot,
                    genes: agent.genome().genes().to_vec(),
                    alive: agent.is_alive(),
                    metrics: *agent.metrics(),
                })
                .collect(),
        }
    }
}
