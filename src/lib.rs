//! Generational evolution engine: fixed-length integer genomes, evaluated for a
//! fixed trial time by a host simulation, ranked, and bred into the next
//! generation.

pub mod agent;
pub mod breeding;
pub mod config;
pub mod error;
pub mod genome;
pub mod plugin;
pub mod population;
pub mod ranking;

pub use agent::{AgentHandle, AgentMetrics, AgentReport, AgentSlot};
pub use breeding::{BreedingStrategy, DriftPolicy, PairingWindow, WindowStart};
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError};
pub use genome::{Crossover, Genome};
pub use plugin::{EvolutionPlugin, GenerationBred, SimulationState};
pub use population::{
    AdvanceOutcome, AgentSnapshot, EpochPhase, GenerationReport, PopulationManager,
    PopulationSnapshot,
};
pub use ranking::{FitnessKey, RankingPolicy, SortOrder, TieBreak};
