//! Kinematic orbital motion.
//!
//! Positions are a pure function of the scaled elapsed time, never integrated
//! from a velocity, so the model is restartable and does not drift. Bodies may
//! ride on a parent's frame (a moon on its planet), in which case the parent's
//! spin also carries the child around.
//!
//! This is a deliberately simple toy, not orbital mechanics.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::world::ObstacleId;

/// Position on a circle of radius `distance` in the XZ plane at time `t`.
///
/// `(d·cos(ω·t), 0, d·sin(ω·t))`, evaluated in double precision.
#[must_use]
pub fn orbital_position(distance: f32, angular_speed: f32, t: f64) -> Vec3 {
    let angle = f64::from(angular_speed) * t;
    let distance = f64::from(distance);
    #[allow(clippy::cast_possible_truncation)]
    Vec3::new(
        (distance * angle.cos()) as f32,
        0.0,
        (distance * angle.sin()) as f32,
    )
}

/// Monotonic simulated clock feeding the orbital model.
///
/// Accumulates frame durations and scales them by a fixed factor.
#[derive(Clone, Debug)]
pub struct OrbitClock {
    elapsed: Duration,
    scale: f64,
}

impl OrbitClock {
    /// Create a clock at zero with the given scale.
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            elapsed: Duration::ZERO,
            scale,
        }
    }

    /// Advance the clock by one frame.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    /// Unscaled elapsed time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Scaled time `t` fed to [`orbital_position`].
    #[must_use]
    pub fn time(&self) -> f64 {
        self.elapsed.as_secs_f64() * self.scale
    }
}

/// How a body's local position evolves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Motion {
    /// Fixed offset in the parent's frame (or the world when unparented).
    Fixed {
        /// Local position.
        position: Vec3,
    },
    /// Circular orbit around the parent's origin.
    Circular {
        /// Orbit radius.
        distance: f32,
        /// Angular speed in radians per scaled time unit.
        angular_speed: f32,
    },
}

impl Motion {
    /// Local position at scaled time `t`.
    #[must_use]
    pub fn local_position(&self, t: f64) -> Vec3 {
        match *self {
            Motion::Fixed { position } => position,
            Motion::Circular {
                distance,
                angular_speed,
            } => orbital_position(distance, angular_speed, t),
        }
    }
}

/// A body driven by the orbital model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitingBody {
    /// Body id, shared with its obstacle when it has one.
    pub id: ObstacleId,
    /// Local motion.
    pub motion: Motion,
    /// Body whose frame this one rides on.
    #[serde(default)]
    pub parent: Option<ObstacleId>,
    /// Yaw increment per tick (radians).
    #[serde(default)]
    pub spin_rate: f32,
}

/// Resolved per-tick state of a body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyPose {
    /// World-space position.
    pub position: Vec3,
    /// Accumulated self-rotation about +Y, wrapped to `[0, 2π)`.
    pub yaw: f32,
}

/// Computes periodic positions and spins for every orbiting body.
#[derive(Clone, Debug, Default)]
pub struct OrbitalMotionModel {
    bodies: Vec<OrbitingBody>,
    /// Parent index per body, resolved at construction.
    parents: Vec<Option<usize>>,
    poses: Vec<BodyPose>,
    index: HashMap<ObstacleId, usize>,
}

impl OrbitalMotionModel {
    /// Build a model. Parents must be listed before their children.
    pub fn new(bodies: Vec<OrbitingBody>) -> Result<Self> {
        let mut index = HashMap::with_capacity(bodies.len());
        let mut parents = Vec::with_capacity(bodies.len());

        for (i, body) in bodies.iter().enumerate() {
            let parent = match &body.parent {
                Some(parent_id) => Some(*index.get(parent_id).ok_or_else(|| {
                    Error::invalid_scene(
                        "body",
                        format!("'{}' references parent '{parent_id}' before it is defined", body.id),
                    )
                })?),
                None => None,
            };
            if index.insert(body.id.clone(), i).is_some() {
                return Err(Error::invalid_scene(
                    "body",
                    format!("duplicate body id '{}'", body.id),
                ));
            }
            parents.push(parent);
        }

        let poses = vec![BodyPose::default(); bodies.len()];
        let mut model = Self {
            bodies,
            parents,
            poses,
            index,
        };
        model.update(0.0);
        Ok(model)
    }

    /// Recompute world positions for scaled time `t`.
    ///
    /// Root bodies depend on `t` alone. Children also depend on their
    /// parent's current spin.
    pub fn update(&mut self, t: f64) {
        for i in 0..self.bodies.len() {
            let local = self.bodies[i].motion.local_position(t);
            let position = match self.parents[i] {
                Some(p) => {
                    let parent = self.poses[p];
                    parent.position + Quat::from_rotation_y(parent.yaw) * local
                }
                None => local,
            };
            self.poses[i].position = position;
        }
    }

    /// Apply one tick of self-rotation to every body.
    pub fn spin(&mut self) {
        for (body, pose) in self.bodies.iter().zip(self.poses.iter_mut()) {
            pose.yaw = (pose.yaw + body.spin_rate).rem_euclid(TAU);
        }
    }

    /// Current pose of a body.
    #[must_use]
    pub fn pose(&self, id: &ObstacleId) -> Option<BodyPose> {
        self.index.get(id).map(|&i| self.poses[i])
    }

    /// Whether the model drives this id.
    #[must_use]
    pub fn contains(&self, id: &ObstacleId) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over bodies and their current poses.
    pub fn iter(&self) -> impl Iterator<Item = (&OrbitingBody, BodyPose)> {
        self.bodies.iter().zip(self.poses.iter().copied())
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the model has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
