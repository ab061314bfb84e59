use bevy::prelude::*;
use evo_gen::config::*;
use evo_gen::plugin::{GenerationBred, advance_population, simulation_running};
use evo_gen::{AgentSlot, Genome, PopulationManager};
use rand::Rng;

/// Gene 0: forward speed. Gene 1: degrees to turn when a wall is in sight.
const SPEED_GENE: usize = 0;
const TURN_GENE: usize = 1;

/// A walker body and where it started this epoch
#[derive(Component)]
pub struct Walker {
    pub start: Vec2,
}

/// Lethal pit
#[derive(Component)]
pub struct Hazard {
    pub radius: f32,
}

pub fn add_systems(app: &mut App) {
    app.add_systems(Startup, (setup_arena, spawn_initial_walkers))
        .add_systems(
            Update,
            (move_walkers, kill_in_hazards)
                .chain()
                .before(advance_population)
                .run_if(simulation_running),
        )
        .add_systems(Update, respawn_walkers.after(advance_population));
}

fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let extent = ARENA_HALF_EXTENT * 2.0;
    commands.spawn((
        Mesh2d(meshes.add(Rectangle::new(extent, extent))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::srgb(0.12, 0.12, 0.15)))),
        Transform::from_xyz(0.0, 0.0, -1.0),
    ));

    for i in 0..HAZARD_COUNT {
        let angle = i as f32 / HAZARD_COUNT as f32 * std::f32::consts::TAU;
        let position = Vec2::from_angle(angle) * HAZARD_RING_RADIUS;
        commands.spawn((
            Hazard { radius: HAZARD_RADIUS },
            Mesh2d(meshes.add(Circle::new(HAZARD_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::srgb(0.6, 0.1, 0.1)))),
            Transform::from_xyz(position.x, position.y, -0.5),
        ));
    }
}

fn spawn_initial_walkers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    manager: Res<PopulationManager>,
) {
    spawn_walkers(&mut commands, &mut meshes, &mut materials, &manager);
}

/// Spawn one body per engine slot, facing a random direction
fn spawn_walkers(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    manager: &PopulationManager,
) {
    let mut rng = rand::thread_rng();
    let mesh = meshes.add(Circle::new(WALKER_RADIUS));

    for (slot, agent) in manager.agents().iter().enumerate() {
        let x = rng.gen_range(-WALKER_SPAWN_JITTER..WALKER_SPAWN_JITTER);
        let y = rng.gen_range(-WALKER_SPAWN_JITTER..WALKER_SPAWN_JITTER);
        let rotation = rng.gen_range(0.0..std::f32::consts::TAU);

        commands.spawn((
            AgentSlot(slot),
            Walker { start: Vec2::new(x, y) },
            Mesh2d(mesh.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(walker_color(agent.genome())))),
            Transform::from_xyz(x, y, 0.0).with_rotation(Quat::from_rotation_z(rotation)),
        ));
    }
}

/// Fast walkers are bright, slow ones dim
fn walker_color(genome: &Genome) -> Color {
    let speed = genome.get(SPEED_GENE).unwrap_or(0) as f32 / genome.max_value().max(1) as f32;
    Color::srgb(0.3 + 0.7 * speed, 0.8, 0.3 + 0.5 * (1.0 - speed))
}

fn inside_arena(point: Vec2) -> bool {
    point.x.abs() <= ARENA_HALF_EXTENT && point.y.abs() <= ARENA_HALF_EXTENT
}

/// Walk forward and turn away from walls; distance from the start is the score
fn move_walkers(
    time: Res<Time>,
    mut manager: ResMut<PopulationManager>,
    mut walkers: Query<(&AgentSlot, &Walker, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (slot, walker, mut transform) in walkers.iter_mut() {
        let Ok(agent) = manager.agent_mut(slot.0) else {
            continue;
        };
        if !agent.is_alive() {
            continue;
        }

        let genome = agent.genome();
        let speed = genome.get(SPEED_GENE).unwrap_or(0) as f32 * WALKER_SPEED_PER_GENE;
        let turn = genome.get(TURN_GENE).unwrap_or(0) as f32;

        let position = transform.translation.truncate();
        let forward = (transform.rotation * Vec3::Y).truncate();
        if !inside_arena(position + forward * WALKER_SIGHT) {
            transform.rotate_z(turn.to_radians());
        }

        let forward = (transform.rotation * Vec3::Y).truncate();
        let next = (position + forward * speed * dt).clamp(
            Vec2::splat(-ARENA_HALF_EXTENT + WALKER_RADIUS),
            Vec2::splat(ARENA_HALF_EXTENT - WALKER_RADIUS),
        );
        transform.translation.x = next.x;
        transform.translation.y = next.y;

        agent.tick(dt);
        agent.set_primary(next.distance(walker.start));
    }
}

/// Walkers that touch a pit die where they stand
fn kill_in_hazards(
    mut manager: ResMut<PopulationManager>,
    walkers: Query<(&AgentSlot, &Transform, &MeshMaterial2d<ColorMaterial>), With<Walker>>,
    hazards: Query<(&Hazard, &Transform)>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (slot, transform, material) in walkers.iter() {
        let Ok(agent) = manager.agent_mut(slot.0) else {
            continue;
        };
        if !agent.is_alive() {
            continue;
        }

        let position = transform.translation.truncate();
        let hit = hazards.iter().any(|(hazard, hazard_transform)| {
            position.distance(hazard_transform.translation.truncate()) < hazard.radius
        });
        if hit {
            agent.kill();
            if let Some(material) = materials.get_mut(&material.0) {
                material.color = Color::srgb(0.3, 0.3, 0.3);
            }
        }
    }
}

/// Replace every body once the engine has bred a new generation
fn respawn_walkers(
    mut bred: EventReader<GenerationBred>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    manager: Res<PopulationManager>,
    walkers: Query<Entity, With<Walker>>,
) {
    if bred.read().last().is_none() {
        return;
    }
    for entity in walkers.iter() {
        commands.entity(entity).despawn();
    }
    spawn_walkers(&mut commands, &mut meshes, &mut materials, &manager);
}
