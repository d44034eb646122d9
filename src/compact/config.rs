//! Compaction pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// How accepted elements are assigned output slots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// One task with a running counter; no count table
    Sequential,
    /// Prefix-sum offsets, every chunk copied in parallel
    #[default]
    Parallel,
}

/// Configuration for a [`CompactionPipeline`](super::CompactionPipeline)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionConfig {
    /// Merge strategy used by every pass
    pub strategy: MergeStrategy,
    /// Minimum number of 64-element chunks per worker task.
    /// Affects scheduling only, never results.
    pub batch_size: usize,
    /// Dedicated worker pool size; `None` runs on rayon's global pool.
    pub worker_threads: Option<usize>,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::Parallel,
            batch_size: 16,  // 1024 elements per task
            worker_threads: None,
        }
    }
}

impl CompactionConfig {
    pub fn sequential() -> Self {
        Self { strategy: MergeStrategy::Sequential, ..Default::default() }
    }

    pub fn parallel() -> Self {
        Self { strategy: MergeStrategy::Parallel, ..Default::default() }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid("batch_size must be at least 1"));
        }
        if self.worker_threads == Some(0) {
            return Err(Error::invalid("worker_threads must be at least 1"));
        }
        Ok(())
    }
}
