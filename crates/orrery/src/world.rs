//! Registry of obstacles that the camera and agent must not penetrate.
//!
//! Each obstacle is data (id, volume, kind) rather than a hand-coded branch,
//! so the discrete guard and the soft correction iterate the same set.
//! Obstacles whose asset has not finished loading are simply not registered;
//! every query skips them.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::volume::BoundingVolume;

/// Identifier of a registered obstacle.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleId(String);

impl ObstacleId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObstacleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What kind of scene entity owns an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Never moves after registration (stations, parked ships).
    Static,
    /// Re-centered every tick from the orbital model.
    Orbiting,
    /// The player-controlled agent.
    Agent,
}

/// A registered bounding volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    /// Registry key.
    pub id: ObstacleId,
    /// Current world-space volume.
    pub volume: BoundingVolume,
    /// Owning entity kind.
    pub kind: ObstacleKind,
}

/// One overlapping obstacle found by [`CollisionWorld::test_against_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    /// The obstacle that overlaps.
    pub id: ObstacleId,
    /// Vector from the obstacle's push center to the tested volume's center.
    pub offset: Vec3,
    /// Penetration depth (positive).
    pub depth: f32,
}

/// Obstacle registry, ordered by id for deterministic iteration.
#[derive(Clone, Debug, Default)]
pub struct CollisionWorld {
    obstacles: BTreeMap<ObstacleId, Obstacle>,
}

impl CollisionWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an obstacle. Returns the previous entry, if any.
    pub fn register(
        &mut self,
        id: ObstacleId,
        volume: BoundingVolume,
        kind: ObstacleKind,
    ) -> Option<Obstacle> {
        tracing::debug!("Registered obstacle '{}' ({:?})", id, kind);
        self.obstacles.insert(
            id.clone(),
            Obstacle {
                id,
                volume,
                kind,
            },
        )
    }

    /// Remove an obstacle.
    pub fn remove(&mut self, id: &ObstacleId) -> Option<Obstacle> {
        self.obstacles.remove(id)
    }

    /// Move an obstacle's volume to the latest world position of its owner.
    ///
    /// Returns `false` (and does nothing) when the obstacle is not registered.
    pub fn recenter(&mut self, id: &ObstacleId, position: Vec3) -> bool {
        match self.obstacles.get_mut(id) {
            Some(obstacle) => {
                obstacle.volume.recenter(position);
                true
            }
            None => false,
        }
    }

    /// Look up an obstacle.
    #[must_use]
    pub fn get(&self, id: &ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Whether an obstacle is registered.
    #[must_use]
    pub fn contains(&self, id: &ObstacleId) -> bool {
        self.obstacles.contains_key(id)
    }

    /// Number of registered obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether no obstacle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Iterate over registered obstacles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    /// Test a volume against every registered obstacle.
    ///
    /// `exclude` skips one obstacle, used when the tested volume is itself
    /// registered (the agent testing against everything but itself).
    #[must_use]
    pub fn test_against_all(
        &self,
        volume: &BoundingVolume,
        exclude: Option<&ObstacleId>,
    ) -> Vec<Contact> {
        let center = volume.center();
        self.candidates(exclude)
            .filter(|obstacle| volume.intersects(&obstacle.volume))
            .map(|obstacle| Contact {
                id: obstacle.id.clone(),
                offset: center - obstacle.volume.push_center(),
                depth: volume.penetration_depth(&obstacle.volume),
            })
            .collect()
    }

    /// Whether a volume overlaps any registered obstacle.
    #[must_use]
    pub fn is_blocked(&self, volume: &BoundingVolume, exclude: Option<&ObstacleId>) -> bool {
        self.candidates(exclude)
            .any(|obstacle| volume.intersects(&obstacle.volume))
    }

    fn candidates<'a>(
        &'a self,
        exclude: Option<&'a ObstacleId>,
    ) -> impl Iterator<Item = &'a Obstacle> + 'a {
        self.obstacles
            .values()
            .filter(move |obstacle| exclude != Some(&obstacle.id))
    }
}
