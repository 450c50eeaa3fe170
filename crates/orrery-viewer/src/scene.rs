//! Scene setup and model loading.
//!
//! Builds the simulation from the launch parameters, spawns one entity per
//! obstacle (a procedural sphere, or a glTF model loaded through the asset
//! server), the agent, the camera and a background star field. Model load
//! outcomes are polled every frame and reported to the core, which keeps the
//! matching obstacle out of the collision world until its model is ready.

use std::f32::consts::TAU;

use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use orrery::scene::{Anchor, Appearance, ModelSpec, ObstacleShape, ObstacleSpec};
use orrery::{AssetNotifier, ObstacleId, SimulationState};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::input::default_input_map;
use crate::launch_params::LaunchParams;
use crate::sim::Simulation;
use crate::ui::HudText;

/// Inner radius of the star shell.
const STAR_SHELL_MIN: f32 = 600.0;
/// Outer radius of the star shell.
const STAR_SHELL_MAX: f32 = 900.0;

// ============================================================================
// Components and resources
// ============================================================================

/// The rendering camera driven by the rig.
#[derive(Component)]
pub struct MainCamera;

/// Entity drawn at an obstacle's registered position.
#[derive(Component)]
pub struct ObstacleVisual {
    /// Obstacle id in the collision world.
    pub id: ObstacleId,
    /// Body whose spin the visual shares, if anchored to one.
    pub body: Option<ObstacleId>,
}

/// Entity drawn at the agent's position.
#[derive(Component)]
pub struct AgentVisual;

/// A model whose load outcome has not been reported yet.
#[derive(Component)]
struct PendingModel {
    id: ObstacleId,
    handle: Handle<Scene>,
}

/// Sender for model readiness.
#[derive(Resource)]
struct AssetSender(AssetNotifier);

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that spawns the scene and reports model loads.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene).add_systems(
            Update,
            poll_models.run_if(resource_exists::<AssetSender>),
        );
    }
}

/// Build the simulation and spawn everything it drives.
fn setup_scene(
    mut commands: Commands,
    params: Res<LaunchParams>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut hud: ResMut<HudText>,
) {
    let scene = &params.scene;
    let sim = match SimulationState::new(scene.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::error!("Cannot start simulation: {e}");
            return;
        }
    };
    sim.announce_mode(&mut *hud);

    let rig = sim.camera();
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: bevy::camera::ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Transform::from_translation(rig.position).looking_at(rig.target, Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 5000.0,
            ..default()
        }),
        MainCamera,
        default_input_map(),
    ));

    for obstacle in &scene.obstacles {
        spawn_obstacle(
            &mut commands,
            obstacle,
            &asset_server,
            &mut meshes,
            &mut materials,
        );
    }

    if let Some(agent) = &scene.agent {
        let mut entity = commands.spawn((
            Name::new(agent.id.to_string()),
            AgentVisual,
            Transform::from_translation(agent.position),
            Visibility::Hidden,
        ));
        match &agent.model {
            Some(model) => {
                let handle = load_model(&asset_server, model);
                entity.insert(PendingModel {
                    id: agent.id.clone(),
                    handle: handle.clone(),
                });
                entity.with_child((SceneRoot(handle), model_transform(model)));
            }
            None => {
                entity.insert((
                    Mesh3d(meshes.add(Cone::new(1.5, 4.0))),
                    MeshMaterial3d(materials.add(Color::srgb(0.8, 0.8, 0.9))),
                ));
            }
        }
    }

    spawn_stars(
        &mut commands,
        &mut meshes,
        &mut materials,
        params.stars,
        params.seed,
    );

    commands.insert_resource(AssetSender(sim.notifier()));
    commands.insert_resource(Simulation(sim));

    tracing::info!(
        "Scene setup complete - {} obstacles, {} stars",
        scene.obstacles.len(),
        params.stars
    );
}

fn spawn_obstacle(
    commands: &mut Commands,
    obstacle: &ObstacleSpec,
    asset_server: &AssetServer,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let body = match &obstacle.anchor {
        Anchor::Body(body) => Some(body.clone()),
        Anchor::Fixed(_) => None,
    };
    let mut entity = commands.spawn((
        Name::new(obstacle.id.to_string()),
        ObstacleVisual {
            id: obstacle.id.clone(),
            body,
        },
        Transform::default(),
        Visibility::Hidden,
    ));

    if let Some(model) = &obstacle.model {
        let handle = load_model(asset_server, model);
        entity.insert(PendingModel {
            id: obstacle.id.clone(),
            handle: handle.clone(),
        });
        entity.with_child((SceneRoot(handle), model_transform(model)));
        return;
    }

    let Some(appearance) = &obstacle.appearance else {
        return;
    };
    let radius = appearance.visual_radius.unwrap_or(match obstacle.shape {
        ObstacleShape::Sphere { radius } => radius,
        ObstacleShape::Box { half_extents } => half_extents.min_element(),
    });
    entity.insert((
        Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(48, 24))),
        MeshMaterial3d(materials.add(surface_material(appearance))),
    ));
    if appearance.emissive {
        entity.with_child(PointLight {
            intensity: 2.0e9,
            range: 1000.0,
            radius,
            shadows_enabled: false,
            ..default()
        });
    }
}

fn surface_material(appearance: &Appearance) -> StandardMaterial {
    let [r, g, b] = appearance.color;
    let color = Color::linear_rgb(r, g, b);
    if appearance.emissive {
        StandardMaterial {
            base_color: color,
            emissive: LinearRgba::rgb(r, g, b) * 8.0,
            unlit: true,
            ..default()
        }
    } else {
        StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        }
    }
}

fn load_model(asset_server: &AssetServer, model: &ModelSpec) -> Handle<Scene> {
    asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.path.clone()))
}

/// Placement of a model relative to its obstacle's volume center.
fn model_transform(model: &ModelSpec) -> Transform {
    Transform::from_translation(model.offset)
        .with_rotation(Quat::from_rotation_y(model.yaw))
        .with_scale(Vec3::splat(model.scale))
}

/// Scatter unlit points over a spherical shell around the origin.
fn spawn_stars(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    count: usize,
    seed: u64,
) {
    let mesh = meshes.add(Sphere::new(0.8).mesh().uv(8, 6));
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    });

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..count {
        let position = star_position(&mut rng);
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(position),
        ));
    }
}

/// Uniform direction, radius within the star shell.
fn star_position(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let angle: f32 = rng.random_range(0.0..TAU);
    let ring = (1.0 - z * z).sqrt();
    let distance = rng.random_range(STAR_SHELL_MIN..STAR_SHELL_MAX);
    Vec3::new(ring * angle.cos(), z, ring * angle.sin()) * distance
}

/// Report finished and failed model loads to the simulation.
fn poll_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    sender: Res<AssetSender>,
    query: Query<(Entity, &PendingModel)>,
) {
    for (entity, pending) in &query {
        match asset_server.load_state(pending.handle.id()) {
            LoadState::Loaded => {
                tracing::info!("Model for '{}' loaded", pending.id);
                sender.0.ready(pending.id.clone());
            }
            LoadState::Failed(e) => {
                sender.0.failed(pending.id.clone(), e.to_string());
            }
            LoadState::NotLoaded | LoadState::Loading => continue,
        }
        commands.entity(entity).remove::<PendingModel>();
    }
}
