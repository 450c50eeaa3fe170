//! Collision resolution policies.
//!
//! - [`guard`]: try a discrete move, test it, and restore the saved state
//!   exactly when it collides. Used for key presses and zoom.
//! - [`soft_correction`]: every tick after the intro, nudge an overlapping
//!   entity away from each obstacle it touches by a fraction of the planar
//!   offset. Resolves overlaps the guard could not prevent, such as a planet
//!   orbiting into a parked camera.
//!
//! Neither policy sweeps the motion. An entity moving further than an
//! obstacle's extent in one tick can pass straight through it.
//!
//! The soft correction only pushes horizontally. An entity directly above or
//! below an obstacle's push center gets a zero nudge and stays overlapping
//! until something else moves it.

use glam::Vec3;

use crate::volume::BoundingVolume;
use crate::world::{CollisionWorld, Contact, ObstacleId};

/// A moving entity's collision shape.
///
/// The volume's own center is ignored; tests place it at the position being
/// checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    /// Shape template.
    pub volume: BoundingVolume,
    /// The entity's own obstacle id, skipped when testing.
    pub exclude: Option<ObstacleId>,
}

impl Collider {
    /// A sphere collider that is not itself registered.
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self {
            volume: BoundingVolume::sphere(Vec3::ZERO, radius),
            exclude: None,
        }
    }

    /// Skip the given obstacle when testing.
    #[must_use]
    pub fn excluding(mut self, id: ObstacleId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// The shape placed at `position`.
    #[must_use]
    pub fn at(&self, position: Vec3) -> BoundingVolume {
        self.volume.centered_at(position)
    }

    /// Whether the shape at `position` overlaps any obstacle.
    #[must_use]
    pub fn is_blocked(&self, world: &CollisionWorld, position: Vec3) -> bool {
        world.is_blocked(&self.at(position), self.exclude.as_ref())
    }

    /// Every obstacle the shape at `position` overlaps.
    #[must_use]
    pub fn contacts(&self, world: &CollisionWorld, position: Vec3) -> Vec<Contact> {
        world.test_against_all(&self.at(position), self.exclude.as_ref())
    }
}

/// Result of a guarded move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Guarded<T> {
    /// The committed state: the proposal, or the saved state when reverted.
    pub value: T,
    /// Whether the proposal collided and was discarded.
    pub reverted: bool,
}

/// Apply `propose` to `current` and keep the result unless `blocked` says
/// it collides, in which case `current` is returned untouched.
///
/// The saved copy is restored rather than the delta subtracted, so a
/// reverted move is bit-for-bit identical to the starting state.
pub fn guard<T: Copy>(
    current: T,
    propose: impl FnOnce(T) -> T,
    blocked: impl FnOnce(&T) -> bool,
) -> Guarded<T> {
    let proposed = propose(current);
    if blocked(&proposed) {
        tracing::debug!("Move rejected by collision guard");
        Guarded {
            value: current,
            reverted: true,
        }
    } else {
        Guarded {
            value: proposed,
            reverted: false,
        }
    }
}

/// Outcome of one soft-correction step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correction {
    /// Obstacles overlapping before the nudge.
    pub contacts: Vec<Contact>,
    /// Total displacement to apply. The vertical component is always zero.
    pub nudge: Vec3,
}

impl Correction {
    /// Whether anything overlapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

/// Compute one tick of soft correction for an entity at `position`.
///
/// For each overlapping obstacle the horizontal part of the offset from the
/// obstacle's push center to the entity is scaled by `factor` and summed.
#[must_use]
pub fn soft_correction(
    world: &CollisionWorld,
    collider: &Collider,
    position: Vec3,
    factor: f32,
) -> Correction {
    let contacts = collider.contacts(world, position);
    let nudge = contacts
        .iter()
        .map(|contact| Vec3::new(contact.offset.x, 0.0, contact.offset.z) * factor)
        .sum();
    if !contacts.is_empty() {
        tracing::debug!("Soft correction: {} contact(s), nudge {nudge}", contacts.len());
    }
    Correction { contacts, nudge }
}
