//! Configuration constants and per-domain presets for the evolution engine
use crate::breeding::{BreedingStrategy, DriftPolicy, PairingWindow, WindowStart};
use crate::error::ConfigError;
use crate::genome::Crossover;
use crate::ranking::{FitnessKey, RankingPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// POPULATION SETTINGS
// ============================================================================

/// Number of agents spawned per generation
pub const DEFAULT_POPULATION_SIZE: usize = 50;

/// Smallest population the pairing window can work with
pub const MIN_POPULATION_SIZE: usize = 2;

/// Largest population a drift trajectory may reach
pub const MAX_POPULATION_SIZE: usize = 100_000;

// ============================================================================
// GENOME SETTINGS
// ============================================================================

/// Genes per genome (maze walker: forward speed, turn angle)
pub const DEFAULT_GENOME_LENGTH: usize = 2;

/// Inclusive upper bound of every gene
pub const DEFAULT_MAX_GENE_VALUE: u32 = 360;

// ============================================================================
// BREEDING SETTINGS
// ============================================================================

/// Chance that an offspring ignores its parents and is drawn at random
pub const DEFAULT_REROLL_PROBABILITY: f32 = 0.01;

/// Chance that an offspring receives one point mutation
pub const DEFAULT_MUTATION_PROBABILITY: f32 = 0.0;

/// Fraction of the ranking the top-fraction window starts at
pub const TOP_FRACTION_WINDOW: f32 = 0.9;

// ============================================================================
// TIMING
// ============================================================================

/// Seconds each generation is evaluated for
pub const DEFAULT_TRIAL_TIME: f32 = 15.0;

/// Virtual time multiplier applied by the bevy plugin
pub const DEFAULT_TIME_SCALE: f32 = 1.0;

// ============================================================================
// DEMO HOSTS
// ============================================================================

/// Half width and height of the walker arena
pub const ARENA_HALF_EXTENT: f32 = 300.0;

/// Walkers spawn within ±WALKER_SPAWN_JITTER of the arena centre
pub const WALKER_SPAWN_JITTER: f32 = 20.0;

/// Radius of a walker body
pub const WALKER_RADIUS: f32 = 6.0;

/// Walker speed in units per second per unit of its speed gene
pub const WALKER_SPEED_PER_GENE: f32 = 0.5;

/// How far ahead a walker can see a wall
pub const WALKER_SIGHT: f32 = 25.0;

/// Number of lethal pits in the walker arena
pub const HAZARD_COUNT: usize = 6;

/// Radius of a lethal pit
pub const HAZARD_RADIUS: f32 = 30.0;

/// Distance of the pits from the arena centre
pub const HAZARD_RING_RADIUS: f32 = 170.0;

/// Colour agents spawn within ±COLOR_SPAWN_RANGE
pub const COLOR_SPAWN_RANGE: (f32, f32) = (450.0, 225.0);

/// Smallest and largest colour agent radius
pub const COLOR_MIN_RADIUS: f32 = 10.0;
pub const COLOR_MAX_RADIUS: f32 = 30.0;

/// Everything one domain needs to run the generational loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub population_size: usize,
    pub trial_time: f32,
    pub genome_length: usize,
    pub max_gene_value: u32,
    pub breeding: BreedingStrategy,
    pub ranking: RankingPolicy,
    pub pairing: PairingWindow,
    pub drift: DriftPolicy,
    /// End every surviving agent's life before ranking
    pub retire_survivors: bool,
    pub time_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::maze_walker()
    }
}

impl EngineConfig {
    /// Click-to-kill colour selection: genes are r, g, b, scale
    pub fn color() -> Self {
        Self {
            population_size: 10,
            trial_time: 10.0,
            genome_length: 4,
            max_gene_value: 255,
            breeding: BreedingStrategy {
                crossover: Crossover::Uniform,
                reroll_probability: 0.006,
                mutation_probability: 0.0,
            },
            ranking: RankingPolicy::survival_time(),
            pairing: PairingWindow::half(),
            drift: DriftPolicy::Preserve,
            retire_survivors: false,
            time_scale: DEFAULT_TIME_SCALE,
        }
    }

    /// Side-scrolling flight: one vertical thrust gene per visible obstacle.
    /// Faithful drift would empty this population within five generations.
    pub fn flappy_bird() -> Self {
        Self {
            population_size: 50,
            trial_time: 15.0,
            genome_length: 5,
            max_gene_value: 200,
            breeding: BreedingStrategy {
                crossover: Crossover::Uniform,
                reroll_probability: 0.0,
                mutation_probability: 0.11,
            },
            ranking: RankingPolicy::penalized_metric(0.1),
            pairing: PairingWindow {
                start: WindowStart::TopFraction(TOP_FRACTION_WINDOW),
                repeats: 5,
            },
            drift: DriftPolicy::Resize,
            retire_survivors: false,
            time_scale: 3.0,
        }
    }

    /// Wall-avoiding walker: genes are forward speed and turn angle
    pub fn maze_walker() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            trial_time: DEFAULT_TRIAL_TIME,
            genome_length: DEFAULT_GENOME_LENGTH,
            max_gene_value: DEFAULT_MAX_GENE_VALUE,
            breeding: BreedingStrategy {
                crossover: Crossover::Split,
                reroll_probability: DEFAULT_REROLL_PROBABILITY,
                mutation_probability: DEFAULT_MUTATION_PROBABILITY,
            },
            ranking: RankingPolicy::penalized_metric(0.0),
            pairing: PairingWindow::half(),
            drift: DriftPolicy::Preserve,
            retire_survivors: false,
            time_scale: DEFAULT_TIME_SCALE,
        }
    }

    /// Single action gene: forward, back, left, right, jump, crouch, idle
    pub fn movement() -> Self {
        Self {
            population_size: 20,
            trial_time: 5.0,
            genome_length: 1,
            max_gene_value: 6,
            ranking: RankingPolicy::composite(1.0),
            retire_survivors: true,
            ..Self::maze_walker()
        }
    }

    /// Ground sensing: one action gene for "ground ahead", one for "no ground"
    pub fn senses() -> Self {
        Self {
            population_size: 20,
            trial_time: 5.0,
            genome_length: 2,
            max_gene_value: 3,
            ranking: RankingPolicy::composite(8.0),
            retire_survivors: true,
            ..Self::maze_walker()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "color" => Some(Self::color()),
            "flappy-bird" | "flappy_bird" => Some(Self::flappy_bird()),
            "maze-walker" | "maze_walker" | "walker" => Some(Self::maze_walker()),
            "movement" => Some(Self::movement()),
            "senses" => Some(Self::senses()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < MIN_POPULATION_SIZE {
            return Err(ConfigError::PopulationTooSmall { size: self.population_size });
        }
        if self.genome_length == 0 {
            return Err(ConfigError::EmptyGenome);
        }
        if !(self.trial_time.is_finite() && self.trial_time > 0.0) {
            return Err(ConfigError::InvalidTrialTime(self.trial_time));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        self.breeding.validate()?;

        match self.ranking.key {
            FitnessKey::PenalizedMetric { penalty_weight } if !penalty_weight.is_finite() => {
                return Err(ConfigError::InvalidPenaltyWeight(penalty_weight));
            }
            FitnessKey::DeathDiscountedMetric { dead_divisor }
                if !(dead_divisor.is_finite() && dead_divisor > 0.0) =>
            {
                return Err(ConfigError::InvalidDeadDivisor(dead_divisor));
            }
            _ => {}
        }

        if let WindowStart::TopFraction(fraction) = self.pairing.start {
            if !(0.0..1.0).contains(&fraction) {
                return Err(ConfigError::InvalidWindowFraction(fraction));
            }
        }
        if self.pairing.repeats == 0 {
            return Err(ConfigError::ZeroRepeats);
        }
        if self.pairing.offspring_count(self.population_size) == 0 {
            return Err(ConfigError::EmptyPairingWindow { size: self.population_size });
        }

        self.check_trajectory()
    }

    /// Population sizes of the next generations under the drift policy,
    /// until a size repeats or leaves `[MIN_POPULATION_SIZE, MAX_POPULATION_SIZE]`.
    /// Sizes are drawn from a finite range, so the projection always ends.
    pub fn projected_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut seen = HashSet::new();
        let mut size = self.population_size;
        seen.insert(size);
        loop {
            size = self.drift.next_size(&self.pairing, size, self.population_size);
            sizes.push(size);
            if size < MIN_POPULATION_SIZE || size > MAX_POPULATION_SIZE || !seen.insert(size) {
                return sizes;
            }
        }
    }

    fn check_trajectory(&self) -> Result<(), ConfigError> {
        for (i, &size) in self.projected_sizes().iter().enumerate() {
            let generation = i as u32 + 2;
            if size < MIN_POPULATION_SIZE {
                return Err(ConfigError::PopulationCollapse { generation, size });
            }
            if size > MAX_POPULATION_SIZE {
                return Err(ConfigError::PopulationRunaway { generation, size });
            }
        }
        Ok(())
    }
}
