mod color;
mod walker;

use anyhow::{Context, Result, anyhow};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, egui};
use clap::{Command, arg};
use evo_gen::plugin::advance_population;
use evo_gen::{
    EngineConfig, EvolutionPlugin, GenerationBred, GenerationReport, PopulationManager,
    SimulationState,
};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    Color,
    Walker,
}

impl Domain {
    fn config(&self) -> EngineConfig {
        match self {
            Domain::Color => EngineConfig::color(),
            Domain::Walker => EngineConfig::maze_walker(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Domain::Color => "Evolution: Colour Selection",
            Domain::Walker => "Evolution: Walker Arena",
        }
    }
}

/// Most recent breeding summary, for the HUD
#[derive(Resource, Default)]
struct LastReport(Option<GenerationReport>);

fn cli() -> Command {
    Command::new("evo-gen")
        .about("Runs a generational evolution demo")
        .arg(
            arg!([DOMAIN] "Demo to run")
                .value_parser(["color", "walker"])
                .default_value("walker"),
        )
        .arg(
            arg!(--config <PATH> "Path to an engine config json file")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--seed <SEED> "Seed for the engine's random source")
                .required(false)
                .value_parser(clap::value_parser!(u64)),
        )
}

fn load_config(path: &PathBuf) -> Result<EngineConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let domain = match matches.get_one::<String>("DOMAIN").map(String::as_str) {
        Some("color") => Domain::Color,
        Some("walker") | None => Domain::Walker,
        Some(other) => return Err(anyhow!("unknown domain {}", other)),
    };
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => load_config(path)?,
        None => domain.config(),
    };
    let seed = matches.get_one::<u64>("seed").copied();
    let evolution = EvolutionPlugin::new(config, seed).context("engine configuration rejected")?;

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: domain.title().to_string(),
            resolution: (1280.0, 720.0).into(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(EguiPlugin)
    .add_plugins(evolution)
    .init_resource::<LastReport>()
    .add_systems(Startup, setup_camera)
    .add_systems(Update, (remember_report.after(advance_population), ui_system));

    match domain {
        Domain::Color => color::add_systems(&mut app),
        Domain::Walker => walker::add_systems(&mut app),
    }

    app.run();
    Ok(())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn remember_report(mut bred: EventReader<GenerationBred>, mut last: ResMut<LastReport>) {
    if let Some(GenerationBred(report)) = bred.read().last() {
        last.0 = Some(report.clone());
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut simulation_state: ResMut<SimulationState>,
    manager: Res<PopulationManager>,
    last: Res<LastReport>,
) {
    egui::Window::new("Stats")
        .default_pos(egui::pos2(10.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                let button_text = if *simulation_state == SimulationState::Running {
                    "⏸ Pause"
                } else {
                    "▶ Resume"
                };
                if ui.button(button_text).clicked() {
                    simulation_state.toggle();
                }
            });

            ui.separator();
            ui.label(format!("Gen: {}", manager.generation()));
            ui.label(format!(
                "Time: {:.2} / {:.0}",
                manager.elapsed(),
                manager.config().trial_time
            ));
            ui.label(format!("Population: {}", manager.len()));
            ui.label(format!("Living: {}", manager.living()));

            if let Some(report) = &last.0 {
                ui.separator();
                ui.label(format!("Last epoch survivors: {}", report.survivors));
                ui.label(format!(
                    "Keys: {:.2} .. {:.2}",
                    report.worst_key, report.best_key
                ));
            }
        });
}
