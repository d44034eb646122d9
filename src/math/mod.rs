//! Bounding volumes, planes and frustum classification

pub mod aabb;
pub mod aabb4;
pub mod frustum;

pub use aabb::Aabb;
pub use aabb4::Aabb4;
pub use frustum::{Plane, Frustum};
