//! Frustum-compact - parallel predicate stream compaction with frustum culling

pub mod core;
pub mod math;
pub mod predicate;
pub mod compact;

pub use crate::core::{Error, Result};
pub use compact::{CompactionConfig, CompactionPipeline, MergeStrategy};
pub use math::{Aabb, Aabb4, Frustum, Plane};
pub use predicate::Predicate;
