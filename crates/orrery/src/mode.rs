//! View mode state machine.
//!
//! ## States
//!
//! - **Spaceship** (initial): the camera trails the agent, which flies ahead
//!   of it along the look direction. Only the agent is tested for collisions.
//! - **Free**: the camera moves on its own. The camera is tested against
//!   every obstacle, agent included.
//! - **Orbit**: the camera circles the agent at an adjustable angle, height
//!   and distance.
//!
//! ### Transitions
//!
//! ```text
//! Spaceship -> Free -> Orbit -> Spaceship
//! ```
//!
//! The mode-toggle key is the only event that changes state.

use serde::{Deserialize, Serialize};

use crate::sink::DisplaySink;

/// Active interpretation of input and camera placement.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Camera trails the player-controlled agent (default).
    #[default]
    Spaceship,
    /// Free-flying camera.
    Free,
    /// Camera orbits the agent.
    Orbit,
}

impl ViewMode {
    /// All modes, in toggle order.
    pub const ALL: [ViewMode; 3] = [ViewMode::Spaceship, ViewMode::Free, ViewMode::Orbit];

    /// The mode reached by one toggle event.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            ViewMode::Spaceship => ViewMode::Free,
            ViewMode::Free => ViewMode::Orbit,
            ViewMode::Orbit => ViewMode::Spaceship,
        }
    }

    /// Label shown on the mode display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Spaceship => "Spaceship Mode",
            ViewMode::Free => "Free Mode",
            ViewMode::Orbit => "Orbit Mode",
        }
    }

    /// Which entity the discrete move guard tests.
    #[must_use]
    pub fn guarded_entity(self) -> GuardedEntity {
        match self {
            ViewMode::Spaceship => GuardedEntity::Agent,
            ViewMode::Free | ViewMode::Orbit => GuardedEntity::Camera,
        }
    }

    /// Whether the agent is slaved to the camera (position and heading).
    ///
    /// Only takes effect once the intro has completed.
    #[must_use]
    pub fn agent_follows_camera(self) -> bool {
        self == ViewMode::Spaceship
    }

    /// Whether the camera is tested against the agent's own volume.
    #[must_use]
    pub fn camera_collides_with_agent(self) -> bool {
        self != ViewMode::Spaceship
    }

    /// Whether the orbit adjustment keys and wheel distance are live.
    #[must_use]
    pub fn uses_orbit_controls(self) -> bool {
        self == ViewMode::Orbit
    }

    /// Whether a zoom that ends in a collision is reverted directly.
    ///
    /// In Spaceship mode the zoom is instead reverted when the agent's follow
    /// position collides.
    #[must_use]
    pub fn guards_camera_zoom(self) -> bool {
        self == ViewMode::Free
    }
}

/// The entity whose volume a discrete move is tested with.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum GuardedEntity {
    /// The camera's bounding sphere.
    Camera,
    /// The agent's bounding sphere, at its would-be follow position.
    Agent,
}

/// Holds the current [`ViewMode`] and reports changes to the display sink.
#[derive(Default, Clone, Debug)]
pub struct ViewModeController {
    current: ViewMode,
}

impl ViewModeController {
    /// Create a controller in the given mode.
    #[must_use]
    pub fn new(initial: ViewMode) -> Self {
        Self { current: initial }
    }

    /// The current mode.
    #[must_use]
    pub fn current(&self) -> ViewMode {
        self.current
    }

    /// Advance to the next mode and publish its label.
    pub fn toggle(&mut self, sink: &mut dyn DisplaySink) -> ViewMode {
        self.current = self.current.next();
        tracing::info!("Transitioned to {:?} mode", self.current);
        sink.show_mode(self.current.label());
        self.current
    }

    /// Publish the current label without changing state.
    pub fn announce(&self, sink: &mut dyn DisplaySink) {
        sink.show_mode(self.current.label());
    }
}
