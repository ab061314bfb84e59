use crate::config::EngineConfig;
use crate::error::Result;
use crate::population::{AdvanceOutcome, GenerationReport, PopulationManager};
use bevy::log::error;
use bevy::prelude::*;

/// Resource to control simulation state
#[derive(Resource, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SimulationState {
    #[default]
    Running,
    Paused,
}

impl SimulationState {
    pub fn toggle(&mut self) {
        *self = match self {
            SimulationState::Running => SimulationState::Paused,
            SimulationState::Paused => SimulationState::Running,
        };
    }
}

/// Sent in the frame a new generation replaces the old one
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GenerationBred(pub GenerationReport);

/// Runs a `PopulationManager` off bevy's virtual clock
pub struct EvolutionPlugin {
    manager: PopulationManager,
}

impl EvolutionPlugin {
    pub fn new(config: EngineConfig, seed: Option<u64>) -> Result<Self> {
        let manager = match seed {
            Some(seed) => PopulationManager::with_seed(config, seed)?,
            None => PopulationManager::from_entropy(config)?,
        };
        Ok(Self { manager })
    }
}

impl Plugin for EvolutionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.manager.clone())
            .init_resource::<SimulationState>()
            .add_event::<GenerationBred>()
            .add_systems(Startup, apply_time_scale)
            .add_systems(
                Update,
                advance_population.run_if(simulation_running),
            );
    }
}

/// Run condition for host systems that should stop while paused
pub fn simulation_running(state: Res<SimulationState>) -> bool {
    *state == SimulationState::Running
}

fn apply_time_scale(manager: Res<PopulationManager>, mut time: ResMut<Time<Virtual>>) {
    time.set_relative_speed(manager.config().time_scale);
}

/// Tick the epoch clock once per frame
pub fn advance_population(
    time: Res<Time>,
    mut manager: ResMut<PopulationManager>,
    mut bred: EventWriter<GenerationBred>,
) {
    match manager.advance(time.delta_secs()) {
        Ok(AdvanceOutcome::Bred(report)) => {
            bred.send(GenerationBred(report));
        }
        Ok(AdvanceOutcome::Evaluating) => {}
        Err(err) => error!("breeding failed: {}", err),
    }
}
