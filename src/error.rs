use thiserror::Error;

/// Rejected engine configuration. Raised before any agent is spawned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("population size {size} is too small, at least 2 agents are needed to pair")]
    PopulationTooSmall { size: usize },
    #[error("genome length must be non-zero")]
    EmptyGenome,
    #[error("{name} probability {value} must be between 0.0 and 1.0")]
    ProbabilityOutOfRange { name: &'static str, value: f32 },
    #[error("trial time {0} must be a positive, finite number of seconds")]
    InvalidTrialTime(f32),
    #[error("time scale {0} must be positive and finite")]
    InvalidTimeScale(f32),
    #[error("pairing window fraction {0} must be in [0.0, 1.0)")]
    InvalidWindowFraction(f32),
    #[error("pairing repeats must be at least 1")]
    ZeroRepeats,
    #[error("ranking penalty weight {0} must be finite")]
    InvalidPenaltyWeight(f32),
    #[error("ranking dead divisor {0} must be positive and finite")]
    InvalidDeadDivisor(f32),
    #[error("pairing window is empty for a population of {size}")]
    EmptyPairingWindow { size: usize },
    #[error("population collapses to {size} agents by generation {generation}")]
    PopulationCollapse { generation: u32, size: usize },
    #[error("population grows to {size} agents by generation {generation}")]
    PopulationRunaway { generation: u32, size: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("genome length mismatch: expected {expected}, found {actual}")]
    GenomeLengthMismatch { expected: usize, actual: usize },
    #[error("gene bound mismatch: expected max {expected}, found {actual}")]
    GeneBoundMismatch { expected: u32, actual: u32 },
    #[error("gene index {index} out of range for genome of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("gene value {value} exceeds max {max}")]
    GeneOutOfRange { value: u32, max: u32 },
    #[error("generation {generation} has {size} agents, too few to breed")]
    PopulationExhausted { generation: u32, size: usize },
    #[error("agent slot {slot} out of range for population of {len}")]
    AgentOutOfRange { slot: usize, len: usize },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
