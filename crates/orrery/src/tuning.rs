//! Fixed control and collision constants.
//!
//! Every gain, clamp and rate used by the input sampler, the camera rig and
//! the collision resolver lives here so a scene file can override them.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Neutral camera roll value. The tilt accumulator rests here.
pub const NEUTRAL_TILT: f32 = PI;

/// Tuning parameters for camera, agent and collision behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlTuning {
    /// Fraction of the camera-to-target vector moved per key press.
    pub move_step: f32,
    /// Pointer drag gain (device pixels to accumulated delta).
    pub drag_gain: f32,
    /// Clamp for the accumulated vertical drag delta.
    pub max_drag_dy: f32,
    /// Clamp for the accumulated wheel delta.
    pub max_zoom_dz: f32,
    /// Gain applied to `dx` along the lateral axis.
    pub yaw_gain: f32,
    /// Gain applied to `dy` along the elevation axis.
    pub pitch_gain: f32,
    /// Fraction of the camera-to-target vector moved per unit of `dz`.
    pub zoom_gain: f32,
    /// Tilt change per tilt key press (radians).
    pub tilt_step: f32,
    /// Maximum tilt away from neutral (radians).
    pub tilt_range: f32,
    /// Tilt relaxation toward neutral per tick while untouched (radians).
    pub tilt_relax_rate: f32,
    /// Fraction of the planar offset applied per tick by the soft correction.
    pub push_factor: f32,
    /// Distance from the camera to the agent in Spaceship mode.
    pub follow_distance: f32,
    /// Orbit angle change per key press (degrees).
    pub orbit_angle_step: f32,
    /// Orbit height change per key press.
    pub orbit_height_step: f32,
    /// Orbit distance change per wheel event.
    pub orbit_distance_step: f32,
    /// Minimum orbit distance.
    pub min_orbit_distance: f32,
    /// Maximum orbit distance.
    pub max_orbit_distance: f32,
    /// Orbit distance at startup.
    pub initial_orbit_distance: f32,
    /// Orbital clock scale (simulated time units per wall-clock second).
    pub time_scale: f64,
    /// Radius of the camera's bounding sphere.
    pub camera_radius: f32,
    /// Radius of the agent's bounding sphere.
    pub agent_radius: f32,
}

impl Default for ControlTuning {
    fn default() -> Self {
        Self {
            move_step: 0.008,
            drag_gain: 0.05,
            max_drag_dy: 30.0,
            max_zoom_dz: 800.0,
            yaw_gain: 0.03,
            pitch_gain: 0.0006,
            zoom_gain: 0.0005,
            tilt_step: 0.01,
            tilt_range: 0.5,
            tilt_relax_rate: 0.01,
            push_factor: 0.05,
            follow_distance: 10.0,
            orbit_angle_step: 3.0,
            orbit_height_step: 0.3,
            orbit_distance_step: 0.2,
            min_orbit_distance: 5.0,
            max_orbit_distance: 50.0,
            initial_orbit_distance: 20.0,
            time_scale: 0.1,
            camera_radius: 1.0,
            agent_radius: 3.8,
        }
    }
}
