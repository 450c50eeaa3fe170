//! Drives the motion core from Bevy's frame loop.
//!
//! The simulation lives in a single resource. Each frame input is pushed,
//! the core ticks once with the frame delta, and the resulting camera, agent
//! and obstacle poses are copied onto their entities.

use bevy::prelude::*;
use orrery::SimulationState;

use crate::scene::{AgentVisual, MainCamera, ObstacleVisual};
use crate::ui::HudText;

/// The motion and collision core.
#[derive(Resource)]
pub struct Simulation(pub SimulationState);

/// Per-frame ordering of simulation systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Device input is pushed into the core.
    Input,
    /// The core advances one tick.
    Tick,
    /// Results are copied onto entities.
    Sync,
}

/// Plugin that ticks the simulation and syncs transforms.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Tick,
                SimulationSet::Sync,
            )
                .chain()
                .run_if(resource_exists::<Simulation>),
        )
        .add_systems(Update, tick_simulation.in_set(SimulationSet::Tick))
        .add_systems(
            Update,
            (sync_camera, sync_obstacles, sync_agent).in_set(SimulationSet::Sync),
        );
    }
}

fn tick_simulation(time: Res<Time>, mut sim: ResMut<Simulation>, mut hud: ResMut<HudText>) {
    let report = sim.0.tick(time.delta(), &mut *hud);
    if report.intro_completed {
        tracing::info!("Interactive control enabled - W/S to move, A/D to strafe, drag to look");
    }
    if report.reverted_moves > 0 {
        tracing::debug!("{} move(s) reverted by collision", report.reverted_moves);
    }
}

fn sync_camera(sim: Res<Simulation>, mut camera: Single<&mut Transform, With<MainCamera>>) {
    let rig = sim.0.camera();
    let mut transform = Transform::from_translation(rig.position).looking_at(rig.target, Vec3::Y);
    transform.rotate_local_z(rig.roll);
    **camera = transform;
}

/// Obstacles follow their registered volume. Unregistered ones are hidden.
fn sync_obstacles(
    sim: Res<Simulation>,
    mut query: Query<(&ObstacleVisual, &mut Transform, &mut Visibility)>,
) {
    for (visual, mut transform, mut visibility) in &mut query {
        let Some(obstacle) = sim.0.world().get(&visual.id) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;
        transform.translation = obstacle.volume.center();
        if let Some(pose) = visual.body.as_ref().and_then(|body| sim.0.body_pose(body)) {
            transform.rotation = Quat::from_rotation_y(pose.yaw);
        }
    }
}

fn sync_agent(
    sim: Res<Simulation>,
    mut query: Query<(&mut Transform, &mut Visibility), With<AgentVisual>>,
) {
    for (mut transform, mut visibility) in &mut query {
        let Some(agent) = sim.0.agent() else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;
        transform.translation = agent.position;
        transform.rotation = Quat::from_rotation_y(agent.heading);
    }
}
