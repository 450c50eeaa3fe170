//! Declarative scene definitions.
//!
//! A scene lists the orbiting bodies, the obstacles (each anchored to a body
//! or to a fixed point), the player's agent, the camera start and the intro
//! script. Obstacles without a model are ready immediately; obstacles with a
//! model wait for the host to report the load.

use std::collections::HashSet;
use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::cinematic::KeyframeSegment;
use crate::error::{Error, Result};
use crate::orbit::{Motion, OrbitingBody};
use crate::tuning::ControlTuning;
use crate::volume::BoundingVolume;
use crate::world::{ObstacleId, ObstacleKind};

/// Complete description of a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Bodies driven by the orbital model. Parents come before children.
    pub bodies: Vec<OrbitingBody>,
    /// Obstacles the camera and agent must not penetrate.
    pub obstacles: Vec<ObstacleSpec>,
    /// The player-controlled agent.
    #[serde(default)]
    pub agent: Option<AgentSpec>,
    /// Where the camera is once interactive control begins (and before the
    /// intro when there is none).
    pub camera: CameraStart,
    /// Control constants.
    #[serde(default)]
    pub tuning: ControlTuning,
    /// Intro script.
    #[serde(default)]
    pub intro: Vec<KeyframeSegment>,
}

/// Shape of an obstacle's bounding volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObstacleShape {
    /// Sphere of the given radius.
    Sphere {
        /// Radius.
        radius: f32,
    },
    /// Axis-aligned box with the given half extents.
    Box {
        /// Half size along each axis.
        half_extents: Vec3,
    },
}

/// Where an obstacle's volume is centered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Follows an orbiting body every tick.
    Body(ObstacleId),
    /// Never moves.
    Fixed(Vec3),
}

/// A model loaded by the host for an obstacle or the agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Asset path.
    pub path: String,
    /// Model origin relative to the bounding volume center.
    #[serde(default)]
    pub offset: Vec3,
    /// Uniform scale.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Extra yaw applied to the model (radians).
    #[serde(default)]
    pub yaw: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// How the host draws an obstacle that has no model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Linear RGB base color.
    pub color: [f32; 3],
    /// Whether the surface glows (the sun).
    #[serde(default)]
    pub emissive: bool,
    /// Render radius when it differs from the bounding radius.
    #[serde(default)]
    pub visual_radius: Option<f32>,
}

/// One obstacle in a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Obstacle id. Obstacles anchored to a body usually share its id.
    pub id: ObstacleId,
    /// Bounding shape.
    pub shape: ObstacleShape,
    /// Where the volume sits.
    pub anchor: Anchor,
    /// Model to load; the obstacle is absent until it is ready.
    #[serde(default)]
    pub model: Option<ModelSpec>,
    /// Procedural look used when there is no model.
    #[serde(default)]
    pub appearance: Option<Appearance>,
}

impl ObstacleSpec {
    /// Kind the obstacle registers as.
    #[must_use]
    pub fn kind(&self) -> ObstacleKind {
        match self.anchor {
            Anchor::Body(_) => ObstacleKind::Orbiting,
            Anchor::Fixed(_) => ObstacleKind::Static,
        }
    }

    /// The bounding volume centered at `position`.
    #[must_use]
    pub fn volume_at(&self, position: Vec3) -> BoundingVolume {
        match self.shape {
            ObstacleShape::Sphere { radius } => BoundingVolume::sphere(position, radius),
            ObstacleShape::Box { half_extents } => BoundingVolume::cuboid(position, half_extents),
        }
    }

    /// Whether the obstacle waits for an asset load.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.model.is_some()
    }
}

/// The player-controlled agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Obstacle id of the agent's own volume.
    pub id: ObstacleId,
    /// Starting position.
    pub position: Vec3,
    /// Starting heading (radians about +Y).
    #[serde(default)]
    pub heading: f32,
    /// Model to load; the agent does not exist until it is ready.
    #[serde(default)]
    pub model: Option<ModelSpec>,
}

/// Camera placement at startup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraStart {
    /// Eye position.
    pub position: Vec3,
    /// Look-at point.
    pub target: Vec3,
}

impl SceneDefinition {
    /// Check ids, references and sizes.
    ///
    /// Body hierarchy problems are reported when the orbital model is built.
    pub fn validate(&self) -> Result<()> {
        let bodies: HashSet<&ObstacleId> = self.bodies.iter().map(|b| &b.id).collect();
        let mut ids = HashSet::new();

        for obstacle in &self.obstacles {
            if !ids.insert(&obstacle.id) {
                return Err(Error::invalid_scene(
                    "obstacle",
                    format!("duplicate obstacle id '{}'", obstacle.id),
                ));
            }
            match obstacle.shape {
                ObstacleShape::Sphere { radius } if radius.is_nan() || radius <= 0.0 => {
                    return Err(Error::invalid_scene(
                        "obstacle",
                        format!("'{}' radius must be positive", obstacle.id),
                    ));
                }
                ObstacleShape::Box { half_extents } if !half_extents.cmpgt(Vec3::ZERO).all() => {
                    return Err(Error::invalid_scene(
                        "obstacle",
                        format!("'{}' half extents must be positive", obstacle.id),
                    ));
                }
                _ => {}
            }
            if let Anchor::Body(body) = &obstacle.anchor
                && !bodies.contains(body)
            {
                return Err(Error::invalid_scene(
                    "obstacle",
                    format!("'{}' is anchored to unknown body '{body}'", obstacle.id),
                ));
            }
        }

        if let Some(agent) = &self.agent
            && ids.contains(&agent.id)
        {
            return Err(Error::invalid_scene(
                "agent",
                format!("id '{}' is already used by an obstacle", agent.id),
            ));
        }

        if self.camera.position.distance_squared(self.camera.target) < f32::EPSILON {
            return Err(Error::invalid_scene(
                "camera",
                "position and target must differ",
            ));
        }

        Ok(())
    }

    /// The planetary system the viewer ships with.
    #[must_use]
    pub fn solar_system() -> Self {
        const AU: f32 = 10.0;

        let bodies = vec![
            fixed_body("sun", Vec3::ZERO, None, 0.001),
            orbiting_body("mercury", 1.5 * AU, 2.0, Some("sun"), 0.0),
            orbiting_body("venus", 2.5 * AU, 1.5, Some("sun"), 0.0),
            orbiting_body("earth", 4.0 * AU, 1.0, None, 0.01),
            fixed_body("moon", Vec3::new(-7.0, 0.0, 0.0), Some("earth"), 0.01),
            fixed_body("satellite", Vec3::new(-13.0, 3.0, 5.0), Some("earth"), 0.0),
            orbiting_body("mars", 6.0 * AU, 0.8, None, 0.008),
            orbiting_body("jupiter", 8.0 * AU, 0.5, None, 0.002),
            orbiting_body("saturn", 12.0 * AU, 0.3, None, 0.002),
            orbiting_body("uranus", 17.0 * AU, 0.2, None, 0.002),
            orbiting_body("neptune", 21.0 * AU, 0.1, None, 0.002),
        ];

        let mut sun = planet("sun", 8.0, [1.0, 0.27, 0.14], None);
        if let Some(appearance) = &mut sun.appearance {
            appearance.emissive = true;
        }

        let mut obstacles = vec![
            sun,
            planet("mercury", 0.38 * 3.2 + 0.2, [0.55, 0.52, 0.5], Some(0.38 * 3.2)),
            planet("venus", 0.95 * 3.2 + 0.2, [0.9, 0.75, 0.45], Some(0.95 * 3.2)),
            planet("earth", 3.5 + 0.2, [0.2, 0.4, 0.85], Some(3.2)),
            planet("moon", 1.0 + 0.2, [0.7, 0.7, 0.7], Some(1.0)),
            planet("mars", 3.5 + 0.2, [0.8, 0.35, 0.2], Some(3.5)),
            planet("jupiter", 5.0 + 0.2, [0.85, 0.7, 0.55], Some(5.0)),
            planet("uranus", 4.0 * 3.2 + 0.2, [0.55, 0.85, 0.9], Some(4.0 * 3.2)),
            planet("neptune", 3.88 * 3.2 + 0.2, [0.25, 0.4, 0.9], Some(3.88 * 3.2)),
            ObstacleSpec {
                model: Some(model("models/saturn.glb", Vec3::ZERO, 0.0)),
                ..planet("saturn", 9.45 * 3.2 + 0.2, [0.9, 0.8, 0.6], None)
            },
            ObstacleSpec {
                model: Some(model("models/satellite.glb", Vec3::ZERO, 0.0)),
                ..planet("satellite", 0.5, [0.8, 0.8, 0.8], None)
            },
            fixed_sphere(
                "station_ring",
                Vec3::new(50.0, 25.0, -10.0),
                15.0,
                model("models/space_station_3.glb", Vec3::ZERO, 0.0),
            ),
            ObstacleSpec {
                id: "station_open".into(),
                shape: ObstacleShape::Box {
                    half_extents: Vec3::new(19.0, 5.0, 19.0),
                },
                anchor: Anchor::Fixed(Vec3::new(45.0, 20.0, -25.0)),
                model: Some(model("models/futuristic_station.glb", Vec3::ZERO, 0.0)),
                appearance: None,
            },
            fixed_sphere(
                "station_guardian",
                Vec3::new(-27.0, 20.0, -20.0),
                10.0,
                model("models/space_station.glb", Vec3::ZERO, 0.0),
            ),
            ObstacleSpec {
                id: "mothership".into(),
                shape: ObstacleShape::Box {
                    half_extents: Vec3::new(27.5, 6.0, 34.0),
                },
                anchor: Anchor::Fixed(Vec3::new(-28.400_36, 55.529_44, 73.734_34)),
                model: Some(model(
                    "models/mothership.glb",
                    Vec3::new(-52.0, -40.0, 7.0),
                    0.0,
                )),
                appearance: None,
            },
        ];

        // Parked cruisers near the mothership, bounding spheres raised and
        // pushed back from the hull origin.
        for (id, x, y) in [
            ("cruiser_1", -33.023_93, 26.654_478),
            ("cruiser_2", -23.023_93, 22.654_478),
            ("cruiser_3", -43.023_93, 22.654_478),
        ] {
            obstacles.push(fixed_sphere(
                id,
                Vec3::new(x, y + 2.0, 67.171_28 + 7.0),
                8.8,
                model("models/cruiser.glb", Vec3::new(0.0, -2.0, -7.0), PI),
            ));
        }

        // Enemy fighters.
        for (id, x, y, raised) in [
            ("fighter_1", -44.614_647, 24.318_121, true),
            ("fighter_2", -49.614_647, 29.318_121, false),
            ("fighter_3", -57.614_647, 24.318_121, true),
        ] {
            let lift = if raised { 2.0 } else { 0.0 };
            obstacles.push(fixed_sphere(
                id,
                Vec3::new(x, y + lift, -25.957_266),
                6.0,
                model("models/fighter.glb", Vec3::new(0.0, -lift, 0.0), 0.0),
            ));
        }

        let agent = AgentSpec {
            id: "spaceship".into(),
            position: Vec3::new(-23.742_425, 21.922_663, -34.312_585),
            heading: 0.605_299_8,
            model: Some(model("models/space_fighter.glb", Vec3::ZERO, 0.0)),
        };

        Self {
            bodies,
            obstacles,
            agent: Some(agent),
            camera: CameraStart {
                position: Vec3::new(-28.779_592, 26.573_751, -41.592_306),
                target: Vec3::ZERO,
            },
            tuning: ControlTuning::default(),
            intro: solar_system_intro(),
        }
    }
}

fn fixed_body(id: &str, position: Vec3, parent: Option<&str>, spin_rate: f32) -> OrbitingBody {
    OrbitingBody {
        id: id.into(),
        motion: Motion::Fixed { position },
        parent: parent.map(ObstacleId::from),
        spin_rate,
    }
}

fn orbiting_body(
    id: &str,
    distance: f32,
    angular_speed: f32,
    parent: Option<&str>,
    spin_rate: f32,
) -> OrbitingBody {
    OrbitingBody {
        id: id.into(),
        motion: Motion::Circular {
            distance,
            angular_speed,
        },
        parent: parent.map(ObstacleId::from),
        spin_rate,
    }
}

fn planet(id: &str, radius: f32, color: [f32; 3], visual_radius: Option<f32>) -> ObstacleSpec {
    ObstacleSpec {
        id: id.into(),
        shape: ObstacleShape::Sphere { radius },
        anchor: Anchor::Body(id.into()),
        model: None,
        appearance: Some(Appearance {
            color,
            emissive: false,
            visual_radius,
        }),
    }
}

fn fixed_sphere(id: &str, center: Vec3, radius: f32, model: ModelSpec) -> ObstacleSpec {
    ObstacleSpec {
        id: id.into(),
        shape: ObstacleShape::Sphere { radius },
        anchor: Anchor::Fixed(center),
        model: Some(model),
        appearance: None,
    }
}

fn model(path: &str, offset: Vec3, yaw: f32) -> ModelSpec {
    ModelSpec {
        path: path.to_owned(),
        offset,
        scale: 1.0,
        yaw,
    }
}

fn solar_system_intro() -> Vec<KeyframeSegment> {
    // (start, end, look target, caption). The first leg holds still while
    // assets stream in.
    let legs = [
        (
            Vec3::new(26.0, 25.0, 90.0),
            Vec3::new(26.0, 25.0, 90.0),
            Vec3::ZERO,
            "Loading Assets...",
        ),
        (
            Vec3::new(26.0, 25.0, 90.0),
            Vec3::new(-23.5, 20.0, 25.0),
            Vec3::ZERO,
            "Exploring the galaxy.",
        ),
        (
            Vec3::new(-26.0, -10.0, -55.0),
            Vec3::new(-61.741_39, 27.487_167, -37.626_175),
            Vec3::new(-37.323_334, 26.876_186, -23.928_434),
            "Visiting the planet guardian.",
        ),
        (
            Vec3::new(30.0, 10.0, 30.0),
            Vec3::new(10.0, -10.0, 10.0),
            Vec3::new(45.0, 20.0, -25.0),
            "Gazing at the abandoned station.",
        ),
        (
            Vec3::new(9.518_916, 17.510_31, 6.780_186),
            Vec3::new(-15.143_502, 22.505_678, 30.569_49),
            Vec3::new(-28.326_529, 48.255_02, 77.099_9),
            "The alien is coming.",
        ),
        (
            Vec3::new(-33.560_635, 32.039_604, 27.645_9),
            Vec3::new(-58.0, 34.0, 89.5),
            Vec3::new(-39.0, 36.0, 77.0),
            "Enemies preparing to attack.",
        ),
        (
            Vec3::new(-48.0, 50.0, -80.0),
            Vec3::new(-28.779_592, 26.573_751, -41.592_306),
            Vec3::new(-23.742_425, 21.922_663, -34.312_585),
            "Heading back towards familiar grounds.",
        ),
    ];

    let total_ms = 25_000;
    let leg_ms = total_ms / legs.len() as u64;
    legs.into_iter()
        .enumerate()
        .map(|(i, (start, end, look_target, caption))| KeyframeSegment {
            start,
            end,
            look_target,
            duration_ms: if i == 0 { 150 } else { leg_ms },
            caption: caption.to_owned(),
        })
        .collect()
}
