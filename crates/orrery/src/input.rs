//! Input sampling.
//!
//! Raw device events are folded into per-tick state:
//!
//! - Pointer drag and wheel accumulate into `(dx, dy, dz)`, consumed and
//!   reset once per tick by the camera rig.
//! - Orbit keys and the wheel adjust the orbit angle, height and distance
//!   while in Orbit mode.
//! - Tilt keys push the camera roll away from neutral; it eases back once
//!   released.
//! - Movement keys and the mode toggle become [`InputCommand`]s that the
//!   simulation applies immediately (moves go through the collision guard).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::mode::ViewMode;
use crate::tuning::{ControlTuning, NEUTRAL_TILT};

/// Named logical keys the core understands.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    /// Move toward the look target.
    Forward,
    /// Move away from the look target.
    Back,
    /// Strafe left and roll left.
    TiltLeft,
    /// Strafe right and roll right.
    TiltRight,
    /// Cycle the view mode.
    ToggleMode,
    /// Decrease the orbit angle.
    OrbitLeft,
    /// Increase the orbit angle.
    OrbitRight,
    /// Raise the orbit height.
    OrbitUp,
    /// Lower the orbit height.
    OrbitDown,
}

/// A raw device event, already mapped to logical keys.
#[derive(PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum InputEvent {
    /// A key was pressed (or auto-repeated).
    KeyDown(LogicalKey),
    /// A key was released.
    KeyUp(LogicalKey),
    /// The drag button was pressed.
    PointerDown,
    /// The drag button was released.
    PointerUp,
    /// The pointer moved to device coordinates `(x, y)`.
    PointerMoved {
        /// Horizontal device coordinate.
        x: f32,
        /// Vertical device coordinate.
        y: f32,
    },
    /// The wheel scrolled. Positive values scroll toward the user, as in a
    /// browser's `deltaY`, and zoom in.
    Wheel {
        /// Vertical scroll amount in pixel-like units.
        delta_y: f32,
    },
}

/// Direction of a discrete move, relative to the current view.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MoveAxis {
    /// Along the camera-to-target vector.
    Forward,
    /// Against the camera-to-target vector.
    Back,
    /// Along `view × up`.
    Right,
    /// Against `view × up`.
    Left,
}

/// Discrete command produced by a key press.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum InputCommand {
    /// Propose a move along an axis, subject to the collision guard.
    Move(MoveAxis),
    /// Cycle the view mode.
    ToggleMode,
}

/// Deltas consumed by one tick of the camera rig.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Deltas {
    /// Horizontal drag.
    pub dx: f32,
    /// Vertical drag.
    pub dy: f32,
    /// Wheel zoom.
    pub dz: f32,
}

/// Continuously accumulated pointer and wheel state plus orbit parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct InputAccumulator {
    /// Accumulated horizontal drag.
    pub dx: f32,
    /// Accumulated vertical drag, clamped to `±max_drag_dy`.
    pub dy: f32,
    /// Accumulated wheel, clamped to `±max_zoom_dz`.
    pub dz: f32,
    /// Orbit angle in degrees, wrapped to `[0, 360)`.
    pub orbit_angle: f32,
    /// Orbit height relative to the agent, strictly inside `±orbit_distance`.
    pub orbit_height: f32,
    /// Orbit distance, within `[min_orbit_distance, max_orbit_distance]`.
    pub orbit_distance: f32,
}

impl InputAccumulator {
    /// Create an accumulator with zero deltas and the initial orbit distance.
    #[must_use]
    pub fn new(tuning: &ControlTuning) -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            orbit_angle: 0.0,
            orbit_height: 0.0,
            orbit_distance: tuning
                .initial_orbit_distance
                .clamp(tuning.min_orbit_distance, tuning.max_orbit_distance),
        }
    }

    /// Add a pointer drag, scaled by the drag gain.
    pub fn add_drag(&mut self, delta: Vec2, tuning: &ControlTuning) {
        self.dx += delta.x * tuning.drag_gain;
        self.dy = (self.dy + delta.y * tuning.drag_gain)
            .clamp(-tuning.max_drag_dy, tuning.max_drag_dy);
    }

    /// Add a wheel amount. In Orbit mode it also steps the orbit distance.
    pub fn add_wheel(&mut self, amount: f32, orbit_controls: bool, tuning: &ControlTuning) {
        self.dz = (self.dz + amount).clamp(-tuning.max_zoom_dz, tuning.max_zoom_dz);

        if !orbit_controls {
            return;
        }

        // Scrolling away from the user (negative) pulls the camera out.
        if amount < 0.0 {
            self.orbit_distance += tuning.orbit_distance_step;
        } else if amount > 0.0 {
            self.orbit_distance -= tuning.orbit_distance_step;
        }
        self.orbit_distance = self
            .orbit_distance
            .clamp(tuning.min_orbit_distance, tuning.max_orbit_distance);
        self.limit_orbit_height(tuning);
    }

    /// Rotate the orbit angle by `steps` increments.
    pub fn step_orbit_angle(&mut self, steps: f32, tuning: &ControlTuning) {
        self.orbit_angle = (self.orbit_angle + steps * tuning.orbit_angle_step).rem_euclid(360.0);
    }

    /// Raise or lower the orbit height by `steps` increments.
    pub fn step_orbit_height(&mut self, steps: f32, tuning: &ControlTuning) {
        self.orbit_height += steps * tuning.orbit_height_step;
        self.limit_orbit_height(tuning);
    }

    /// Keep the height one step inside the orbit sphere.
    fn limit_orbit_height(&mut self, tuning: &ControlTuning) {
        let limit = (self.orbit_distance - tuning.orbit_height_step).max(0.0);
        self.orbit_height = self.orbit_height.clamp(-limit, limit);
    }

    /// Take this tick's deltas and reset them to zero.
    pub fn take_deltas(&mut self) -> Deltas {
        let deltas = Deltas {
            dx: self.dx,
            dy: self.dy,
            dz: self.dz,
        };
        self.dx = 0.0;
        self.dy = 0.0;
        self.dz = 0.0;
        deltas
    }
}

/// Camera roll accumulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltState {
    /// Roll value, within `NEUTRAL_TILT ± tilt_range`.
    pub cam_z_rotate: f32,
    /// Whether a tilt key is currently held.
    pub held: bool,
}

impl Default for TiltState {
    fn default() -> Self {
        Self {
            cam_z_rotate: NEUTRAL_TILT,
            held: false,
        }
    }
}

impl TiltState {
    /// Push the roll one step in `direction` (`+1` right, `-1` left).
    pub fn press(&mut self, direction: f32, tuning: &ControlTuning) {
        self.cam_z_rotate = (self.cam_z_rotate + direction * tuning.tilt_step).clamp(
            NEUTRAL_TILT - tuning.tilt_range,
            NEUTRAL_TILT + tuning.tilt_range,
        );
        self.held = true;
    }

    /// Stop holding. The value is kept and relaxes on later ticks.
    pub fn release(&mut self) {
        self.held = false;
    }

    /// One tick of relaxation toward neutral, only while untouched.
    pub fn relax(&mut self, tuning: &ControlTuning) {
        if !self.held {
            self.cam_z_rotate = move_toward(self.cam_z_rotate, NEUTRAL_TILT, tuning.tilt_relax_rate);
        }
    }

    /// Roll offset from neutral, as applied to the camera.
    #[must_use]
    pub fn roll(&self) -> f32 {
        self.cam_z_rotate - NEUTRAL_TILT
    }
}

/// Folds device events into the accumulator, tilt state and commands.
#[derive(Clone, Debug)]
pub struct InputSampler {
    accumulator: InputAccumulator,
    tilt: TiltState,
    pointer_held: bool,
    last_pointer: Option<Vec2>,
}

impl InputSampler {
    /// Create a sampler at rest.
    #[must_use]
    pub fn new(tuning: &ControlTuning) -> Self {
        Self {
            accumulator: InputAccumulator::new(tuning),
            tilt: TiltState::default(),
            pointer_held: false,
            last_pointer: None,
        }
    }

    /// Process one device event.
    ///
    /// Orbit keys and the wheel's orbit-distance effect only apply in Orbit
    /// mode. Movement keys are returned as commands; tilt keys also roll.
    pub fn handle(
        &mut self,
        event: InputEvent,
        mode: ViewMode,
        tuning: &ControlTuning,
    ) -> Option<InputCommand> {
        let orbit_controls = mode.uses_orbit_controls();
        match event {
            InputEvent::KeyDown(key) => match key {
                LogicalKey::Forward => Some(InputCommand::Move(MoveAxis::Forward)),
                LogicalKey::Back => Some(InputCommand::Move(MoveAxis::Back)),
                LogicalKey::TiltRight => {
                    self.tilt.press(1.0, tuning);
                    Some(InputCommand::Move(MoveAxis::Right))
                }
                LogicalKey::TiltLeft => {
                    self.tilt.press(-1.0, tuning);
                    Some(InputCommand::Move(MoveAxis::Left))
                }
                LogicalKey::ToggleMode => Some(InputCommand::ToggleMode),
                LogicalKey::OrbitLeft if orbit_controls => {
                    self.accumulator.step_orbit_angle(-1.0, tuning);
                    None
                }
                LogicalKey::OrbitRight if orbit_controls => {
                    self.accumulator.step_orbit_angle(1.0, tuning);
                    None
                }
                LogicalKey::OrbitUp if orbit_controls => {
                    self.accumulator.step_orbit_height(1.0, tuning);
                    None
                }
                LogicalKey::OrbitDown if orbit_controls => {
                    self.accumulator.step_orbit_height(-1.0, tuning);
                    None
                }
                LogicalKey::OrbitLeft
                | LogicalKey::OrbitRight
                | LogicalKey::OrbitUp
                | LogicalKey::OrbitDown => None,
            },
            InputEvent::KeyUp(LogicalKey::TiltLeft | LogicalKey::TiltRight) => {
                self.tilt.release();
                None
            }
            InputEvent::KeyUp(_) => None,
            InputEvent::PointerDown => {
                self.pointer_held = true;
                None
            }
            InputEvent::PointerUp => {
                self.pointer_held = false;
                None
            }
            InputEvent::PointerMoved { x, y } => {
                let position = Vec2::new(x, y);
                if self.pointer_held
                    && let Some(last) = self.last_pointer
                {
                    self.accumulator.add_drag(position - last, tuning);
                }
                self.last_pointer = Some(position);
                None
            }
            InputEvent::Wheel { delta_y } => {
                self.accumulator.add_wheel(delta_y, orbit_controls, tuning);
                None
            }
        }
    }

    /// Take this tick's drag and wheel deltas.
    pub fn take_deltas(&mut self) -> Deltas {
        self.accumulator.take_deltas()
    }

    /// Relax the tilt for one tick.
    pub fn relax_tilt(&mut self, tuning: &ControlTuning) {
        self.tilt.relax(tuning);
    }

    /// Current accumulator state.
    #[must_use]
    pub fn accumulator(&self) -> &InputAccumulator {
        &self.accumulator
    }

    /// Current tilt state.
    #[must_use]
    pub fn tilt(&self) -> TiltState {
        self.tilt
    }

    /// Whether the drag button is held.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.pointer_held
    }
}

/// Move a value toward a target by at most `max_delta`.
#[must_use]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sampler() -> (InputSampler, ControlTuning) {
        let tuning = ControlTuning::default();
        (InputSampler::new(&tuning), tuning)
    }

    #[test]
    fn test_drag_accumulates_only_while_held() {
        let (mut s, tuning) = sampler();
        s.handle(InputEvent::PointerMoved { x: 100.0, y: 100.0 }, ViewMode::Free, &tuning);
        s.handle(InputEvent::PointerMoved { x: 140.0, y: 90.0 }, ViewMode::Free, &tuning);
        assert_eq!(s.accumulator().dx, 0.0);

        s.handle(InputEvent::PointerDown, ViewMode::Free, &tuning);
        s.handle(InputEvent::PointerMoved { x: 160.0, y: 70.0 }, ViewMode::Free, &tuning);
        assert!((s.accumulator().dx - 1.0).abs() < 1e-6);
        assert!((s.accumulator().dy + 1.0).abs() < 1e-6);

        // Releasing keeps the unconsumed deltas.
        s.handle(InputEvent::PointerUp, ViewMode::Free, &tuning);
        s.handle(InputEvent::PointerMoved { x: 500.0, y: 500.0 }, ViewMode::Free, &tuning);
        let deltas = s.take_deltas();
        assert!((deltas.dx - 1.0).abs() < 1e-6);
        assert_eq!(s.take_deltas(), Deltas::default());
    }

    #[test]
    fn test_drag_dy_clamped() {
        let (mut s, tuning) = sampler();
        s.handle(InputEvent::PointerMoved { x: 0.0, y: 0.0 }, ViewMode::Free, &tuning);
        s.handle(InputEvent::PointerDown, ViewMode::Free, &tuning);
        s.handle(InputEvent::PointerMoved { x: 0.0, y: 5000.0 }, ViewMode::Free, &tuning);
        assert!((s.accumulator().dy - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wheel_clamp_and_orbit_distance() {
        let (mut s, tuning) = sampler();
        for _ in 0..10 {
            s.handle(InputEvent::Wheel { delta_y: 100.0 }, ViewMode::Free, &tuning);
        }
        assert!((s.accumulator().dz - 800.0).abs() < f32::EPSILON);
        // Not in Orbit mode: distance untouched.
        assert!((s.accumulator().orbit_distance - 20.0).abs() < f32::EPSILON);

        for _ in 0..200 {
            s.handle(InputEvent::Wheel { delta_y: 100.0 }, ViewMode::Orbit, &tuning);
        }
        assert!((s.accumulator().orbit_distance - 5.0).abs() < 1e-4);

        for _ in 0..400 {
            s.handle(InputEvent::Wheel { delta_y: -100.0 }, ViewMode::Orbit, &tuning);
        }
        assert!((s.accumulator().orbit_distance - 50.0).abs() < 1e-4);
        assert!((s.accumulator().dz + 800.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_orbit_keys_only_in_orbit_mode() {
        let (mut s, tuning) = sampler();
        s.handle(InputEvent::KeyDown(LogicalKey::OrbitLeft), ViewMode::Spaceship, &tuning);
        assert_eq!(s.accumulator().orbit_angle, 0.0);

        s.handle(InputEvent::KeyDown(LogicalKey::OrbitLeft), ViewMode::Orbit, &tuning);
        assert!((s.accumulator().orbit_angle - 357.0).abs() < 1e-4);

        for _ in 0..200 {
            s.handle(InputEvent::KeyDown(LogicalKey::OrbitUp), ViewMode::Orbit, &tuning);
        }
        let acc = s.accumulator();
        assert!(acc.orbit_height < acc.orbit_distance);
        assert!((acc.orbit_height - 19.7).abs() < 1e-3);
    }

    #[test]
    fn test_shrinking_distance_limits_height() {
        let (mut s, tuning) = sampler();
        for _ in 0..100 {
            s.handle(InputEvent::KeyDown(LogicalKey::OrbitDown), ViewMode::Orbit, &tuning);
        }
        for _ in 0..200 {
            s.handle(InputEvent::Wheel { delta_y: 1.0 }, ViewMode::Orbit, &tuning);
        }
        let acc = s.accumulator();
        assert!(acc.orbit_height.abs() < acc.orbit_distance);
    }

    #[test]
    fn test_commands() {
        let (mut s, tuning) = sampler();
        assert_eq!(
            s.handle(InputEvent::KeyDown(LogicalKey::Forward), ViewMode::Free, &tuning),
            Some(InputCommand::Move(MoveAxis::Forward))
        );
        assert_eq!(
            s.handle(InputEvent::KeyDown(LogicalKey::ToggleMode), ViewMode::Free, &tuning),
            Some(InputCommand::ToggleMode)
        );
        assert_eq!(
            s.handle(InputEvent::KeyDown(LogicalKey::TiltLeft), ViewMode::Free, &tuning),
            Some(InputCommand::Move(MoveAxis::Left))
        );
        assert!(s.tilt().held);
        assert_eq!(
            s.handle(InputEvent::KeyUp(LogicalKey::TiltLeft), ViewMode::Free, &tuning),
            None
        );
        assert!(!s.tilt().held);
    }

    #[test]
    fn test_tilt_release_keeps_value_then_relaxes() {
        let (mut s, tuning) = sampler();
        for _ in 0..5 {
            s.handle(InputEvent::KeyDown(LogicalKey::TiltRight), ViewMode::Spaceship, &tuning);
        }
        let pressed = s.tilt().cam_z_rotate;
        assert!((pressed - (NEUTRAL_TILT + 0.05)).abs() < 1e-5);

        // Held: no relaxation.
        s.relax_tilt(&tuning);
        assert_eq!(s.tilt().cam_z_rotate, pressed);

        s.handle(InputEvent::KeyUp(LogicalKey::TiltRight), ViewMode::Spaceship, &tuning);
        assert_eq!(s.tilt().cam_z_rotate, pressed);
        s.relax_tilt(&tuning);
        assert!((s.tilt().cam_z_rotate - (pressed - 0.01)).abs() < 1e-6);
        for _ in 0..10 {
            s.relax_tilt(&tuning);
        }
        assert_eq!(s.tilt().cam_z_rotate, NEUTRAL_TILT);
    }

    #[test]
    fn test_move_toward() {
        assert_eq!(move_toward(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_toward(1.0, 0.0, 0.25), 0.75);
        assert_eq!(move_toward(0.9, 1.0, 0.25), 1.0);
    }

    proptest! {
        #[test]
        fn prop_tilt_stays_in_range_and_relaxes_monotonically(
            presses in prop::collection::vec(prop::bool::ANY, 0..200),
            relax_ticks in 0usize..150,
        ) {
            let tuning = ControlTuning::default();
            let mut tilt = TiltState::default();
            let low = NEUTRAL_TILT - tuning.tilt_range;
            let high = NEUTRAL_TILT + tuning.tilt_range;

            for right in presses {
                tilt.press(if right { 1.0 } else { -1.0 }, &tuning);
                prop_assert!(tilt.cam_z_rotate >= low && tilt.cam_z_rotate <= high);
            }
            tilt.release();

            let mut distance = (tilt.cam_z_rotate - NEUTRAL_TILT).abs();
            for _ in 0..relax_ticks {
                tilt.relax(&tuning);
                let next = (tilt.cam_z_rotate - NEUTRAL_TILT).abs();
                prop_assert!(next <= distance);
                prop_assert!(distance - next <= tuning.tilt_relax_rate + 1e-5);
                prop_assert!(tilt.cam_z_rotate >= low && tilt.cam_z_rotate <= high);
                distance = next;
            }
        }
    }
}
