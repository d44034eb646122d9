//! Predicate stream compaction.
//!
//! A pass runs as a small task graph:
//!
//! 1. [`BitIndexBuilder`] packs one predicate bit per element into `u64`
//!    words, full chunks in parallel, then the remainder chunk.
//! 2. For [`MergeStrategy::Parallel`] only, popcounts are reduced into an
//!    inclusive prefix sum ([`prefix_sum`]).
//! 3. [`Compactor`] copies accepted elements into the destination, either in
//!    one sequential walk or chunk-parallel from the precomputed offsets.
//!
//! [`CompactionPipeline`] strings the steps together and owns the scratch
//! buffers.

pub mod bitmask;
pub mod config;
pub mod merge;
pub mod pipeline;
pub mod prefix_sum;

pub use bitmask::{chunk_count, BitIndexBuilder, CHUNK_SIZE};
pub use config::{CompactionConfig, MergeStrategy};
pub use merge::{for_each_set_bit, Compactor};
pub use pipeline::{CompactionPipeline, PassStats};
