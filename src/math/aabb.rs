//! Axis-aligned bounding box

use bytemuck::{Pod, Zeroable};

use crate::core::types::Vec3;
use super::frustum::{resolve_classification, Plane};

/// Axis-aligned bounding box defined by center and full size
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    pub center: Vec3,
    /// Full edge lengths; every component is non-negative
    pub size: Vec3,
}

impl Aabb {
    /// Create AABB from center and size
    pub fn new(center: Vec3, size: Vec3) -> Self {
        debug_assert!(size.cmpge(Vec3::ZERO).all(), "negative AABB size {size}");
        Self { center, size }
    }

    /// Create AABB from min and max corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, max - min)
    }

    /// Half of the size
    pub fn extents(&self) -> Vec3 {
        self.size * 0.5
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents()
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents()
    }

    /// Classify this box against a plane.
    ///
    /// Returns `0.0` when the box straddles the plane, otherwise the signed
    /// gap between the plane and the nearest side of the box: positive when
    /// the box lies entirely on the normal side, negative when entirely behind.
    ///
    /// The projected radius is taken from `size`, not `extents`, so the test
    /// is conservative by a factor of two.
    pub fn classify_against_plane(&self, plane: &Plane) -> f32 {
        let n = plane.normal;
        let r = (self.size.x * n.x).abs() + (self.size.y * n.y).abs() + (self.size.z * n.z).abs();
        let d = n.x * self.center.x + n.y * self.center.y + n.z * self.center.z + plane.distance;
        resolve_classification(d, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center, Vec3::splat(0.5));
        assert_eq!(aabb.size, Vec3::ONE);
        assert_eq!(aabb.extents(), Vec3::splat(0.5));
        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::ONE);
    }

    #[test]
    fn test_classify_regression_values() {
        // d = 1 + 1 = 2, r = 1, fully in front by 1
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE);
        let plane = Plane::new(Vec3::Z, 1.0);
        assert_eq!(aabb.classify_against_plane(&plane), 1.0);

        // d = 0 + 1 = 1, r = 1: |d| < r fails, so d - r = 0 exactly
        let touching = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(touching.classify_against_plane(&plane), 0.0);
    }

    #[test]
    fn test_classify_sign_convention() {
        let plane = Plane::new(Vec3::X, 0.0);

        let front = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert_eq!(front.classify_against_plane(&plane), 4.0);

        let behind = Aabb::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::ONE);
        assert_eq!(behind.classify_against_plane(&plane), -4.0);

        let straddling = Aabb::new(Vec3::new(0.25, 3.0, -7.0), Vec3::ONE);
        assert_eq!(straddling.classify_against_plane(&plane), 0.0);
    }

    #[test]
    fn test_classify_uses_all_axes() {
        // Diagonal normal picks up every size component
        let n = Vec3::ONE.normalize();
        let plane = Plane::new(n, 0.0);
        let aabb = Aabb::new(Vec3::splat(10.0), Vec3::new(1.0, 2.0, 3.0));
        let r = (1.0 * n.x).abs() + (2.0 * n.y).abs() + (3.0 * n.z).abs();
        let d = n.x * 10.0 + n.y * 10.0 + n.z * 10.0;
        assert_eq!(aabb.classify_against_plane(&plane), d - r);
    }

    #[test]
    fn test_pod_layout() {
        assert_eq!(std::mem::size_of::<Aabb>(), 24);
        let boxes = [Aabb::new(Vec3::ONE, Vec3::splat(2.0))];
        let floats: &[f32] = bytemuck::cast_slice(&boxes);
        assert_eq!(floats, &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }
}
