//! Camera, agent motion and collision core for an explorable planetary system.
//!
//! The crate has no engine dependency. A host feeds it device events and
//! asset readiness notifications, calls [`SimulationState::tick`] once per
//! frame and copies the resulting camera, agent and body transforms onto
//! whatever it renders with.
//!
//! # Design principles
//!
//! - **Obstacles are data**: one registry, one loop for every collision test
//! - **Pure math at the edges**: rig, orbit and volume functions are free of
//!   state and tested in isolation
//! - **Absent is not an error**: anything whose asset has not loaded is
//!   skipped by every test
//!
//! # Example
//!
//! ```ignore
//! use orrery::{InputEvent, LogicalKey, NullSink, SceneDefinition, SimulationState};
//!
//! let mut sim = SimulationState::new(SceneDefinition::solar_system())?;
//! let notifier = sim.notifier();
//! // Hand `notifier` to the asset loader, then every frame:
//! sim.push_input(InputEvent::KeyDown(LogicalKey::Forward));
//! sim.tick(frame_time, &mut NullSink);
//! ```

pub mod cinematic;
mod error;
pub mod input;
pub mod loader;
pub mod mode;
pub mod orbit;
pub mod resolver;
pub mod rig;
pub mod scene;
mod simulation;
pub mod sink;
mod tuning;
pub mod volume;
pub mod world;

pub use cinematic::{CinematicSequencer, CinematicStep, KeyframeSegment};
pub use error::{Error, Result};
pub use input::{InputEvent, LogicalKey};
pub use loader::{AssetEvent, AssetNotifier};
pub use mode::ViewMode;
pub use rig::Camera;
pub use scene::SceneDefinition;
pub use simulation::{Agent, SimulationState, TickReport};
pub use sink::{DisplaySink, NullSink, RecordingSink};
pub use tuning::{ControlTuning, NEUTRAL_TILT};
pub use volume::BoundingVolume;
pub use world::{CollisionWorld, ObstacleId};
