use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use evo_gen::plugin::advance_population;
use evo_gen::{
    AgentSlot, EngineConfig, EngineError, EvolutionPlugin, GenerationBred, GenerationReport,
    PopulationManager, SimulationState,
};
use std::time::Duration;

/// Collects every report the plugin broadcasts
#[derive(Resource, Default)]
struct Reports(Vec<GenerationReport>);

fn collect_reports(mut bred: EventReader<GenerationBred>, mut reports: ResMut<Reports>) {
    reports.0.extend(bred.read().map(|GenerationBred(report)| report.clone()));
}

fn short_trial() -> EngineConfig {
    EngineConfig {
        population_size: 10,
        trial_time: 1.0,
        ..EngineConfig::maze_walker()
    }
}

/// Headless app ticking 100ms of virtual time per update
fn headless_app(config: EngineConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_plugins(EvolutionPlugin::new(config, Some(1234)).unwrap())
        .init_resource::<Reports>()
        .add_systems(Update, collect_reports.after(advance_population));
    app
}

#[test]
fn test_plugin_breeds_after_trial_time() {
    let mut app = headless_app(short_trial());

    for _ in 0..15 {
        app.update();
    }

    let manager = app.world().resource::<PopulationManager>();
    assert_eq!(manager.generation(), 2);
    assert_eq!(manager.len(), 10);

    let reports = app.world().resource::<Reports>();
    assert_eq!(reports.0.len(), 1, "Should have bred exactly once");
    assert_eq!(reports.0[0].generation, 2);
    assert_eq!(reports.0[0].offspring, 10);
}

#[test]
fn test_paused_simulation_keeps_the_clock_still() {
    let mut app = headless_app(short_trial());
    app.insert_resource(SimulationState::Paused);

    for _ in 0..30 {
        app.update();
    }

    let manager = app.world().resource::<PopulationManager>();
    assert_eq!(manager.generation(), 1);
    assert_eq!(manager.elapsed(), 0.0);
}

#[test]
fn test_time_scale_speeds_up_epochs() {
    let config = EngineConfig {
        time_scale: 2.0,
        ..short_trial()
    };
    let mut app = headless_app(config);

    // first update only starts the clock; the next five cover one scaled second
    for _ in 0..8 {
        app.update();
    }

    let time = app.world().resource::<Time<Virtual>>();
    assert_eq!(time.relative_speed(), 2.0);
    assert_eq!(app.world().resource::<PopulationManager>().generation(), 2);
}

#[test]
fn test_host_reports_flow_into_the_ranking() {
    // a toy host: bodies in even slots die immediately, odd ones score their slot index
    fn toy_host(mut manager: ResMut<PopulationManager>, bodies: Query<&AgentSlot>) {
        for slot in bodies.iter() {
            let Ok(agent) = manager.agent_mut(slot.0) else {
                continue;
            };
            if slot.0 % 2 == 0 {
                agent.kill();
            } else {
                agent.set_primary(slot.0 as f32);
            }
        }
    }

    let mut app = headless_app(short_trial());
    app.add_systems(Update, toy_host.before(advance_population));
    for slot in 0..10 {
        app.world_mut().spawn(AgentSlot(slot));
    }

    for _ in 0..15 {
        app.update();
    }

    let reports = app.world().resource::<Reports>();
    assert_eq!(reports.0.len(), 1);
    assert_eq!(reports.0[0].survivors, 5);
    assert_eq!(reports.0[0].best_key, 9.0);
    assert_eq!(reports.0[0].worst_key, 0.0);
}

#[test]
fn test_invalid_config_fails_before_the_app_starts() {
    let config = EngineConfig {
        population_size: 0,
        ..EngineConfig::maze_walker()
    };
    assert!(matches!(
        EvolutionPlugin::new(config, None),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn test_every_preset_survives_a_few_generations() {
    for config in [
        EngineConfig::color(),
        EngineConfig::flappy_bird(),
        EngineConfig::maze_walker(),
        EngineConfig::movement(),
        EngineConfig::senses(),
    ] {
        let mut manager = PopulationManager::with_seed(config, 99).unwrap();
        // the projection stops once a size repeats; every preset settles on a fixed size
        let predicted = config.projected_sizes();
        let settled = *predicted.last().unwrap();
        for generation in 0..4 {
            let expected = predicted.get(generation).copied().unwrap_or(settled);
            for _ in 0..(config.trial_time * 10.0) as usize + 5 {
                manager.advance(0.1).unwrap();
                if manager.generation() as usize == generation + 2 {
                    break;
                }
            }
            assert_eq!(manager.generation() as usize, generation + 2);
            assert_eq!(manager.len(), expected);
            let max = config.max_gene_value;
            assert!(manager.agents().iter().all(|a| a.genome().genes().iter().all(|&g| g <= max)));
        }
    }
}
