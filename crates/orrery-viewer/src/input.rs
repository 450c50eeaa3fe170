//! Input action definitions and translation into simulation events.
//!
//! Gameplay actions are declared with `leafwing-input-manager`. Each frame
//! the action state is turned into the device events the motion core
//! understands: held keys repeat at a fixed rate like an OS key repeat,
//! the drag button and cursor become pointer events, and the scroll axis
//! becomes wheel events in pixel-like units.

use bevy::{prelude::*, window::PrimaryWindow};
use leafwing_input_manager::prelude::*;
use orrery::{InputEvent, LogicalKey};

use crate::sim::{Simulation, SimulationSet};

/// Pixel-like units per scrolled line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Repeat interval for held keys, in seconds.
const KEY_REPEAT_INTERVAL: f32 = 1.0 / 30.0;

// ============================================================================
// Action enum
// ============================================================================

/// Actions for the explorer.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum OrreryAction {
    /// Move toward the look target (W).
    Forward,
    /// Move away from the look target (S).
    Back,
    /// Strafe and bank left (A).
    TiltLeft,
    /// Strafe and bank right (D).
    TiltRight,
    /// Cycle the view mode (Space).
    ToggleMode,
    /// Orbit counter-clockwise (Left arrow).
    OrbitLeft,
    /// Orbit clockwise (Right arrow).
    OrbitRight,
    /// Raise the orbit (Up arrow).
    OrbitUp,
    /// Lower the orbit (Down arrow).
    OrbitDown,
    /// Hold to look around (left click).
    Drag,
    /// Zoom with mouse scroll.
    #[actionlike(Axis)]
    Zoom,
}

impl OrreryAction {
    /// Actions backed by a logical key.
    const KEYS: [OrreryAction; 9] = [
        OrreryAction::Forward,
        OrreryAction::Back,
        OrreryAction::TiltLeft,
        OrreryAction::TiltRight,
        OrreryAction::ToggleMode,
        OrreryAction::OrbitLeft,
        OrreryAction::OrbitRight,
        OrreryAction::OrbitUp,
        OrreryAction::OrbitDown,
    ];

    /// The logical key this action stands for, if any.
    fn logical_key(self) -> Option<LogicalKey> {
        Some(match self {
            OrreryAction::Forward => LogicalKey::Forward,
            OrreryAction::Back => LogicalKey::Back,
            OrreryAction::TiltLeft => LogicalKey::TiltLeft,
            OrreryAction::TiltRight => LogicalKey::TiltRight,
            OrreryAction::ToggleMode => LogicalKey::ToggleMode,
            OrreryAction::OrbitLeft => LogicalKey::OrbitLeft,
            OrreryAction::OrbitRight => LogicalKey::OrbitRight,
            OrreryAction::OrbitUp => LogicalKey::OrbitUp,
            OrreryAction::OrbitDown => LogicalKey::OrbitDown,
            OrreryAction::Drag | OrreryAction::Zoom => return None,
        })
    }

    /// Whether holding the key keeps firing it.
    fn repeats(self) -> bool {
        !matches!(
            self,
            OrreryAction::ToggleMode | OrreryAction::Drag | OrreryAction::Zoom
        )
    }
}

/// Create the default input map.
pub fn default_input_map() -> InputMap<OrreryAction> {
    InputMap::default()
        .with(OrreryAction::Forward, KeyCode::KeyW)
        .with(OrreryAction::Back, KeyCode::KeyS)
        .with(OrreryAction::TiltLeft, KeyCode::KeyA)
        .with(OrreryAction::TiltRight, KeyCode::KeyD)
        .with(OrreryAction::ToggleMode, KeyCode::Space)
        .with(OrreryAction::OrbitLeft, KeyCode::ArrowLeft)
        .with(OrreryAction::OrbitRight, KeyCode::ArrowRight)
        .with(OrreryAction::OrbitUp, KeyCode::ArrowUp)
        .with(OrreryAction::OrbitDown, KeyCode::ArrowDown)
        .with(OrreryAction::Drag, MouseButton::Left)
        .with_axis(OrreryAction::Zoom, MouseScrollAxis::Y)
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers the action type and feeds the simulation.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<OrreryAction>::default())
            .insert_resource(KeyRepeat(Timer::from_seconds(
                KEY_REPEAT_INTERVAL,
                TimerMode::Repeating,
            )))
            .add_systems(Update, forward_input.in_set(SimulationSet::Input));
    }
}

/// Shared repeat clock for held keys.
#[derive(Resource)]
struct KeyRepeat(Timer);

/// Translate this frame's action state into simulation input events.
fn forward_input(
    time: Res<Time>,
    action_query: Query<&ActionState<OrreryAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut repeat: ResMut<KeyRepeat>,
    mut last_cursor: Local<Option<Vec2>>,
    mut sim: ResMut<Simulation>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    repeat.0.tick(time.delta());
    let repeats = repeat.0.times_finished_this_tick();

    for action in OrreryAction::KEYS {
        let Some(key) = action.logical_key() else {
            continue;
        };
        if action_state.just_pressed(&action) {
            sim.0.push_input(InputEvent::KeyDown(key));
        } else if action.repeats() && action_state.pressed(&action) {
            for _ in 0..repeats {
                sim.0.push_input(InputEvent::KeyDown(key));
            }
        }
        if action_state.just_released(&action) {
            sim.0.push_input(InputEvent::KeyUp(key));
        }
    }

    if action_state.just_pressed(&OrreryAction::Drag) {
        sim.0.push_input(InputEvent::PointerDown);
    }
    if action_state.just_released(&OrreryAction::Drag) {
        sim.0.push_input(InputEvent::PointerUp);
    }

    let cursor = window.cursor_position();
    if let Some(position) = cursor
        && *last_cursor != cursor
    {
        sim.0.push_input(InputEvent::PointerMoved {
            x: position.x,
            y: position.y,
        });
    }
    *last_cursor = cursor;

    let scroll = action_state.value(&OrreryAction::Zoom);
    if scroll != 0.0 {
        sim.0.push_input(InputEvent::Wheel {
            delta_y: wheel_delta(scroll),
        });
    }
}

/// Convert a scroll axis value (positive scrolls up, away from the user)
/// into the core's wheel units, where positive scrolls toward the user.
fn wheel_delta(scroll: f32) -> f32 {
    -scroll * PIXELS_PER_LINE
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_key_action_has_a_distinct_logical_key() {
        let keys: HashSet<_> = OrreryAction::KEYS
            .iter()
            .filter_map(|action| action.logical_key())
            .collect();
        assert_eq!(keys.len(), OrreryAction::KEYS.len());
        assert!(OrreryAction::Drag.logical_key().is_none());
        assert!(OrreryAction::Zoom.logical_key().is_none());
    }

    #[test]
    fn test_wheel_delta_follows_browser_convention() {
        assert_eq!(wheel_delta(1.0), -PIXELS_PER_LINE);
        assert_eq!(wheel_delta(-0.5), 0.5 * PIXELS_PER_LINE);
    }

    #[test]
    fn test_mode_toggle_does_not_repeat() {
        assert!(!OrreryAction::ToggleMode.repeats());
        assert!(OrreryAction::Forward.repeats());
        assert!(OrreryAction::OrbitUp.repeats());
    }
}
