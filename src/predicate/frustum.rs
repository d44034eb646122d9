//! Frustum containment predicates
//!
//! Thin adapters: the caller says how to get a box out of an element, the
//! frustum does the classification.

use crate::core::types::Vec3;
use crate::math::{Aabb, Frustum};
use super::Predicate;

/// Boxes can be culled against a frustum directly
impl Predicate<Aabb> for Frustum {
    #[inline]
    fn validate(&self, element: &Aabb) -> bool {
        self.is_bounds_in_frustum(element)
    }
}

/// Accepts elements whose bounds (from `bounds_of`) touch the frustum
#[derive(Clone, Copy, Debug)]
pub struct FrustumPredicate<F> {
    frustum: Frustum,
    bounds_of: F,
}

impl<F> FrustumPredicate<F> {
    pub fn new(frustum: Frustum, bounds_of: F) -> Self {
        Self { frustum, bounds_of }
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

impl<T, F: Fn(&T) -> Aabb + Sync> Predicate<T> for FrustumPredicate<F> {
    #[inline]
    fn validate(&self, element: &T) -> bool {
        self.frustum.is_bounds_in_frustum(&(self.bounds_of)(element))
    }
}

/// Per-element center with one shared box size, e.g. instance translations
#[derive(Clone, Copy, Debug)]
pub struct BoxCenterPredicate<C> {
    frustum: Frustum,
    center_of: C,
    size: Vec3,
}

impl<C> BoxCenterPredicate<C> {
    pub fn new(frustum: Frustum, center_of: C, size: Vec3) -> Self {
        Self { frustum, center_of, size }
    }
}

impl<T, C: Fn(&T) -> Vec3 + Sync> Predicate<T> for BoxCenterPredicate<C> {
    #[inline]
    fn validate(&self, element: &T) -> bool {
        let bounds = Aabb::new((self.center_of)(element), self.size);
        self.frustum.is_bounds_in_frustum(&bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Plane;

    /// Only the x >= 0 half-space matters; the other planes are far away
    fn half_space_frustum() -> Frustum {
        Frustum::from_planes([
            Plane::new(Vec3::X, 0.0),
            Plane::new(Vec3::NEG_X, 1000.0),
            Plane::new(Vec3::Y, 1000.0),
            Plane::new(Vec3::NEG_Y, 1000.0),
            Plane::new(Vec3::Z, 1000.0),
            Plane::new(Vec3::NEG_Z, 1000.0),
        ])
    }

    #[derive(Clone, Copy)]
    struct Instance {
        translation: Vec3,
        scale: f32,
    }

    #[test]
    fn test_frustum_as_box_predicate() {
        let frustum = half_space_frustum();
        assert!(frustum.validate(&Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE)));
        assert!(!frustum.validate(&Aabb::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::ONE)));
    }

    #[test]
    fn test_bounds_from_element() {
        let predicate = FrustumPredicate::new(half_space_frustum(), |i: &Instance| {
            Aabb::new(i.translation, Vec3::splat(i.scale))
        });

        let small = Instance { translation: Vec3::new(-2.0, 0.0, 0.0), scale: 1.0 };
        let large = Instance { translation: Vec3::new(-2.0, 0.0, 0.0), scale: 4.0 };
        assert!(!predicate.validate(&small));
        // Projected radius 4 reaches across x = 0
        assert!(predicate.validate(&large));
    }

    #[test]
    fn test_shared_box_size() {
        let predicate = BoxCenterPredicate::new(
            half_space_frustum(),
            |i: &Instance| i.translation,
            Vec3::ONE,
        );
        let inside = Instance { translation: Vec3::new(0.5, 3.0, 3.0), scale: 1.0 };
        let outside = Instance { translation: Vec3::new(-1.5, 0.0, 0.0), scale: 1.0 };
        assert!(predicate.validate(&inside));
        assert!(!predicate.validate(&outside));
    }
}
