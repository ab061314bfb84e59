use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use evo_gen::config::*;
use evo_gen::plugin::{GenerationBred, advance_population, simulation_running};
use evo_gen::{AgentSlot, Genome, PopulationManager};
use rand::Rng;

/// A clickable colour blob
#[derive(Component)]
pub struct Blob {
    pub radius: f32,
}

pub fn add_systems(app: &mut App) {
    app.add_systems(Startup, spawn_initial_blobs)
        .add_systems(Update, handle_clicks.before(advance_population).run_if(simulation_running))
        .add_systems(Update, respawn_blobs.after(advance_population));
}

/// Genes 0..3 are red, green, blue; gene 3 is size
fn blob_look(genome: &Genome) -> (Color, f32) {
    let max = genome.max_value().max(1) as f32;
    let channel = |i: usize| genome.get(i).unwrap_or(0) as f32 / max;
    let color = Color::srgb(channel(0), channel(1), channel(2));
    let radius = COLOR_MIN_RADIUS + channel(3) * (COLOR_MAX_RADIUS - COLOR_MIN_RADIUS);
    (color, radius)
}

fn spawn_initial_blobs(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    manager: Res<PopulationManager>,
) {
    spawn_blobs(&mut commands, &mut meshes, &mut materials, &manager);
}

fn spawn_blobs(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    manager: &PopulationManager,
) {
    let mut rng = rand::thread_rng();
    let (range_x, range_y) = COLOR_SPAWN_RANGE;

    for (slot, agent) in manager.agents().iter().enumerate() {
        let (color, radius) = blob_look(agent.genome());
        let x = rng.gen_range(-range_x..range_x);
        let y = rng.gen_range(-range_y..range_y);

        commands.spawn((
            AgentSlot(slot),
            Blob { radius },
            Mesh2d(meshes.add(Circle::new(radius))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(color))),
            Transform::from_xyz(x, y, slot as f32 * 0.01),
        ));
    }
}

/// Left click kills the top-most blob under the cursor and stamps its lifetime
fn handle_clicks(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut manager: ResMut<PopulationManager>,
    mut blobs: Query<(&AgentSlot, &Blob, &Transform, &mut Visibility)>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_pos) else {
        return;
    };

    let elapsed = manager.elapsed();
    let hit = blobs
        .iter_mut()
        .filter(|(slot, blob, transform, _)| {
            let alive = manager.agent(slot.0).is_ok_and(|a| a.is_alive());
            alive && world_pos.distance(transform.translation.truncate()) <= blob.radius
        })
        .max_by(|(_, _, a, _), (_, _, b, _)| a.translation.z.total_cmp(&b.translation.z));

    if let Some((slot, _, _, mut visibility)) = hit {
        if let Ok(agent) = manager.agent_mut(slot.0) {
            agent.kill_at(elapsed);
            *visibility = Visibility::Hidden;
        }
    }
}

fn respawn_blobs(
    mut bred: EventReader<GenerationBred>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    manager: Res<PopulationManager>,
    blobs: Query<Entity, With<Blob>>,
) {
    if bred.read().last().is_none() {
        return;
    }
    for entity in blobs.iter() {
        commands.entity(entity).despawn();
    }
    spawn_blobs(&mut commands, &mut meshes, &mut materials, &manager);
}
