//! Camera rig math.
//!
//! Pure functions that turn accumulated deltas into a new look target or
//! camera position. Degenerate inputs (camera sitting on its target, looking
//! straight up) never produce NaN: the affected step returns its input
//! unchanged instead.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::input::MoveAxis;

/// Lengths below this are treated as zero.
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Camera placement: position, look-at point and roll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    /// World-space look-at point.
    pub target: Vec3,
    /// Roll about the view axis (radians, zero is level).
    pub roll: f32,
}

impl Camera {
    /// Create a level camera looking at `target`.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            roll: 0.0,
        }
    }

    /// Vector from the eye to the look target.
    #[must_use]
    pub fn view(&self) -> Vec3 {
        self.target - self.position
    }

    /// Move eye and target together, keeping the view vector.
    #[must_use]
    pub fn translated(self, offset: Vec3) -> Self {
        Self {
            position: self.position + offset,
            target: self.target + offset,
            ..self
        }
    }
}

/// Offset of one discrete move along `axis`.
///
/// The step is a fraction of the (unnormalized) view vector, so moves are
/// larger when the target is far away. Lateral moves use `view × up`.
#[must_use]
pub fn move_offset(camera: &Camera, axis: MoveAxis, step: f32) -> Vec3 {
    let view = camera.view();
    let lateral = view.cross(Vec3::Y);
    match axis {
        MoveAxis::Forward => view * step,
        MoveAxis::Back => -view * step,
        MoveAxis::Right => lateral * step,
        MoveAxis::Left => -lateral * step,
    }
}

/// New look target after a free-look update.
///
/// `dx` pushes the target along the lateral axis and `dy` along the
/// elevation axis, then the result is rescaled so the camera-to-target
/// distance is unchanged.
#[must_use]
pub fn free_look(camera: &Camera, dx: f32, dy: f32, yaw_gain: f32, pitch_gain: f32) -> Vec3 {
    let view = camera.view();
    let initial_length = view.length();
    if initial_length < DEGENERATE_LENGTH {
        return camera.target;
    }

    let lateral = view.cross(Vec3::Y);
    let elevation = view.cross(lateral);
    let moved = camera.target + lateral * (yaw_gain * dx) + elevation * (pitch_gain * dy);

    let offset = moved - camera.position;
    let length = offset.length();
    if length < DEGENERATE_LENGTH {
        return camera.target;
    }
    camera.position + offset * (initial_length / length)
}

/// Offset of a zoom step: a fraction of the view vector scaled by `dz`.
#[must_use]
pub fn zoom_offset(camera: &Camera, dz: f32, zoom_gain: f32) -> Vec3 {
    camera.view() * (zoom_gain * dz)
}

/// Where the agent sits in front of the camera.
///
/// Returns `None` when the view vector is degenerate.
#[must_use]
pub fn follow_position(camera: &Camera, follow_distance: f32) -> Option<Vec3> {
    let view = camera.view();
    let length = view.length();
    if length < DEGENERATE_LENGTH {
        return None;
    }
    Some(camera.position + view * (follow_distance / length))
}

/// Heading of a direction projected on the XZ plane, measured from +Z
/// toward +X and wrapped to `[0, 2π)`.
///
/// Returns `None` for a vertical or zero direction.
#[must_use]
pub fn heading_from_direction(direction: Vec3) -> Option<f32> {
    if direction.x.hypot(direction.z) < DEGENERATE_LENGTH {
        return None;
    }
    Some(direction.x.atan2(direction.z).rem_euclid(TAU))
}

/// Camera position on the orbit around `center`.
///
/// The camera sits `height` above the center at `angle_deg` on a horizontal
/// circle of radius `sqrt(distance² - height²)`.
#[must_use]
pub fn orbit_position(center: Vec3, angle_deg: f32, height: f32, distance: f32) -> Vec3 {
    let radius = (distance * distance - height * height).max(0.0).sqrt();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    center + Vec3::new(sin * radius, height, cos * radius)
}
