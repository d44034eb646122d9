//! Four axis-aligned boxes in structure-of-arrays layout
//!
//! Each `Vec4` holds one component for all four boxes, so one plane can be
//! tested against the whole batch with lane-wise arithmetic.

use crate::core::error::Error;
use crate::core::types::{BVec4A, Result, Vec3, Vec4};
use super::aabb::Aabb;
use super::frustum::Plane;

/// Number of boxes in one batch
pub const LANES: usize = 4;

/// Four AABBs stored lane-major
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb4 {
    pub center_x: Vec4,
    pub center_y: Vec4,
    pub center_z: Vec4,
    pub size_x: Vec4,
    pub size_y: Vec4,
    pub size_z: Vec4,
}

impl Aabb4 {
    /// Transpose four boxes into lane-major storage
    pub fn from_boxes(boxes: &[Aabb; LANES]) -> Self {
        let lane = |f: fn(&Aabb) -> f32| {
            Vec4::new(f(&boxes[0]), f(&boxes[1]), f(&boxes[2]), f(&boxes[3]))
        };
        Self {
            center_x: lane(|b| b.center.x),
            center_y: lane(|b| b.center.y),
            center_z: lane(|b| b.center.z),
            size_x: lane(|b| b.size.x),
            size_y: lane(|b| b.size.y),
            size_z: lane(|b| b.size.z),
        }
    }

    /// Read back box `index`
    pub fn get(&self, index: usize) -> Result<Aabb> {
        check_lane(index)?;
        Ok(Aabb::new(
            Vec3::new(self.center_x[index], self.center_y[index], self.center_z[index]),
            Vec3::new(self.size_x[index], self.size_y[index], self.size_z[index]),
        ))
    }

    /// Overwrite box `index`
    pub fn set(&mut self, index: usize, aabb: Aabb) -> Result<()> {
        check_lane(index)?;
        self.center_x[index] = aabb.center.x;
        self.center_y[index] = aabb.center.y;
        self.center_z[index] = aabb.center.z;
        self.size_x[index] = aabb.size.x;
        self.size_y[index] = aabb.size.y;
        self.size_z[index] = aabb.size.z;
        Ok(())
    }

    /// Lane-wise [`Aabb::classify_against_plane`].
    ///
    /// The operations run in the same order as the scalar path, so lane `i`
    /// is bit-identical to classifying box `i` on its own.
    pub fn classify_against_plane(&self, plane: &Plane) -> [f32; LANES] {
        self.classify_lanes(plane).to_array()
    }

    /// Mask of lanes whose classification against `plane` is `>= 0`
    pub(crate) fn in_front_mask(&self, plane: &Plane) -> BVec4A {
        self.classify_lanes(plane).cmpge(Vec4::ZERO)
    }

    fn classify_lanes(&self, plane: &Plane) -> Vec4 {
        let nx = Vec4::splat(plane.normal.x);
        let ny = Vec4::splat(plane.normal.y);
        let nz = Vec4::splat(plane.normal.z);

        let r = (self.size_x * nx).abs() + (self.size_y * ny).abs() + (self.size_z * nz).abs();
        let d = nx * self.center_x + ny * self.center_y + nz * self.center_z
            + Vec4::splat(plane.distance);

        let straddles = d.abs().cmplt(r);
        let in_front = d.cmpge(Vec4::ZERO);
        let gap = Vec4::select(in_front, d - r, d + r);
        Vec4::select(straddles, Vec4::ZERO, gap)
    }
}

fn check_lane(index: usize) -> Result<()> {
    if index >= LANES {
        return Err(Error::invalid(format!(
            "Aabb4 lane {} out of range (0..{})",
            index, LANES
        )));
    }
    Ok(())
}
