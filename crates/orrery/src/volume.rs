//! Bounding volumes for proximity tests.
//!
//! A volume is either a sphere or an axis-aligned box. The shape and size are
//! fixed at creation; only the position moves, via [`BoundingVolume::recenter`].
//! Mixed pairs are handled by a single type switch in
//! [`BoundingVolume::intersects`] so callers never special-case shapes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A sphere or axis-aligned box used for fast overlap tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundingVolume {
    /// Sphere with a movable center.
    Sphere {
        /// World-space center.
        center: Vec3,
        /// Radius, fixed at creation.
        radius: f32,
    },
    /// Axis-aligned box.
    Box {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
}

impl BoundingVolume {
    /// Create a sphere.
    #[must_use]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Create a box from its center and half extents.
    #[must_use]
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Box {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Geometric center of the volume.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } => center,
            Self::Box { min, max } => (min + max) * 0.5,
        }
    }

    /// Move the volume so its center sits at `position`, keeping its size.
    pub fn recenter(&mut self, position: Vec3) {
        match self {
            Self::Sphere { center, .. } => *center = position,
            Self::Box { min, max } => {
                let half = (*max - *min) * 0.5;
                *min = position - half;
                *max = position + half;
            }
        }
    }

    /// Return a copy of the volume centered at `position`.
    #[must_use]
    pub fn centered_at(mut self, position: Vec3) -> Self {
        self.recenter(position);
        self
    }

    /// Point that the soft correction pushes away from.
    ///
    /// For boxes this is the true box center on all three axes.
    #[must_use]
    pub fn push_center(&self) -> Vec3 {
        self.center()
    }

    /// Closest point of a box to `point` (the point itself when inside).
    fn clamp_to_box(min: Vec3, max: Vec3, point: Vec3) -> Vec3 {
        point.clamp(min, max)
    }

    /// Whether the two volumes overlap.
    ///
    /// Sphere pairs overlap when the center distance is strictly less than
    /// the sum of the radii. Sphere/box pairs clamp the sphere center onto
    /// the box and compare against the radius.
    #[must_use]
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        match (*self, *other) {
            (
                Self::Sphere {
                    center: a,
                    radius: ra,
                },
                Self::Sphere {
                    center: b,
                    radius: rb,
                },
            ) => {
                let reach = ra + rb;
                a.distance_squared(b) < reach * reach
            }
            (Self::Sphere { center, radius }, Self::Box { min, max })
            | (Self::Box { min, max }, Self::Sphere { center, radius }) => {
                let closest = Self::clamp_to_box(min, max, center);
                center.distance_squared(closest) < radius * radius
            }
            (
                Self::Box {
                    min: amin,
                    max: amax,
                },
                Self::Box {
                    min: bmin,
                    max: bmax,
                },
            ) => amin.cmplt(bmax).all() && amax.cmpgt(bmin).all(),
        }
    }

    /// How deep the two volumes interpenetrate.
    ///
    /// Positive when overlapping, zero or negative otherwise. For a sphere
    /// whose center lies inside a box the distance to the nearest face is
    /// added to the radius, so the depth keeps shrinking on the way out.
    #[must_use]
    pub fn penetration_depth(&self, other: &BoundingVolume) -> f32 {
        match (*self, *other) {
            (
                Self::Sphere {
                    center: a,
                    radius: ra,
                },
                Self::Sphere {
                    center: b,
                    radius: rb,
                },
            ) => ra + rb - a.distance(b),
            (Self::Sphere { center, radius }, Self::Box { min, max })
            | (Self::Box { min, max }, Self::Sphere { center, radius }) => {
                let closest = Self::clamp_to_box(min, max, center);
                if closest == center {
                    radius + (center - min).min(max - center).min_element()
                } else {
                    radius - center.distance(closest)
                }
            }
            (
                Self::Box {
                    min: amin,
                    max: amax,
                },
                Self::Box {
                    min: bmin,
                    max: bmax,
                },
            ) => {
                let overlap = amax.min(bmax) - amin.max(bmin);
                overlap.min_element()
            }
        }
    }
}
