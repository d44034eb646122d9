//! View frustum for culling

use bytemuck::{Pod, Zeroable};

use crate::core::types::{Mat4, Vec3, Vec4};
use super::aabb::Aabb;
use super::aabb4::{Aabb4, LANES};

/// A plane defined by normal and distance from origin
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` facing along `normal` (normalized here)
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self { normal, distance: -normal.dot(point) }
    }

    /// Rescale so the normal has unit length
    pub fn normalized(&self) -> Self {
        let len = self.normal.length();
        if len > 0.0 {
            Self { normal: self.normal / len, distance: self.distance / len }
        } else {
            *self
        }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Turn a signed center distance `d` and projected radius `r` into a
/// classification: zero when straddling, otherwise the gap to the plane.
#[inline]
pub(crate) fn resolve_classification(d: f32, r: f32) -> f32 {
    if d.abs() < r {
        0.0
    } else if d >= 0.0 {
        d - r
    } else {
        d + r
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_planes(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from view-projection matrix.
    /// Uses the Gribb/Hartmann method with a 0..1 clip depth range.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        // Near: row2 (z >= 0), Far: row3 - row2
        // Left/Right: row3 +/- row0, Bottom/Top: row3 +/- row1
        let near = Self::normalize_plane(rows[2]);
        let far = Self::normalize_plane(rows[3] - rows[2]);
        let left = Self::normalize_plane(rows[3] + rows[0]);
        let right = Self::normalize_plane(rows[3] - rows[0]);
        let top = Self::normalize_plane(rows[3] - rows[1]);
        let bottom = Self::normalize_plane(rows[3] + rows[1]);

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        Plane::new(plane.truncate(), plane.w).normalized()
    }

    /// Check if point is inside frustum
    pub fn is_point_in_frustum(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if sphere touches the frustum
    pub fn is_sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }

    /// Check if AABB is inside or straddling every plane.
    /// Stops at the first plane the box is entirely behind.
    ///
    /// A NaN classification counts as outside, matching the batch path.
    pub fn is_bounds_in_frustum(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            if !(aabb.classify_against_plane(plane) >= 0.0) {
                return false;
            }
        }
        true
    }

    /// Batch variant of [`Frustum::is_bounds_in_frustum`].
    ///
    /// All lanes advance together, so every plane is evaluated for every box.
    pub fn is_bounds4_in_frustum(&self, boxes: &Aabb4) -> [bool; LANES] {
        let mut inside = boxes.in_front_mask(&self.planes[0]);
        for plane in &self.planes[1..] {
            inside = inside & boxes.in_front_mask(plane);
        }
        let bits = inside.bitmask();
        std::array::from_fn(|lane| bits & (1 << lane) != 0)
    }
}
