//! Per-frame compaction pass: index, (reduce), merge.
//!
//! The pipeline owns the bitmask and count scratch buffers and reuses them
//! across passes, so a pass only allocates when the source outgrows them.
//! The count table it builds is handed to the merge without a second
//! verification pass. Each call blocks until every task of the pass has
//! finished.

use std::time::{Duration, Instant};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::predicate::Predicate;
use super::bitmask::{check_source, chunk_count, BitIndexBuilder};
use super::config::{CompactionConfig, MergeStrategy};
use super::merge::{check_index_range, Compactor};

/// Summary of the most recent pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassStats {
    pub strategy: MergeStrategy,
    pub source_len: usize,
    pub chunks: usize,
    pub final_count: usize,
    pub elapsed: Duration,
}

/// Orchestrates one compaction pass per call
pub struct CompactionPipeline {
    config: CompactionConfig,
    /// Dedicated pool when `worker_threads` is set
    pool: Option<rayon::ThreadPool>,
    bitmask: Vec<u64>,
    /// Inclusive prefix sums; only filled by the parallel strategy
    counts: Vec<usize>,
    last_pass: Option<PassStats>,
}

impl CompactionPipeline {
    pub fn new(config: CompactionConfig) -> Result<Self> {
        config.validate()?;

        let pool = match config.worker_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("compact-worker-{}", i))
                    .build()?,
            ),
            None => None,
        };

        log::info!(
            "Compaction pipeline: {:?} merge, batch {} chunks, {} workers",
            config.strategy,
            config.batch_size,
            pool.as_ref()
                .map_or_else(rayon::current_num_threads, |p| p.current_num_threads()),
        );

        Ok(Self {
            config,
            pool,
            bitmask: Vec::new(),
            counts: Vec::new(),
            last_pass: None,
        })
    }

    pub fn config(&self) -> &CompactionConfig {
        &self.config
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.config.strategy
    }

    /// Switch strategy for subsequent passes
    pub fn set_strategy(&mut self, strategy: MergeStrategy) {
        self.config.strategy = strategy;
    }

    /// Bitmask words of the last pass
    pub fn bitmask(&self) -> &[u64] {
        &self.bitmask
    }

    /// Count table of the last pass, if it used the parallel strategy
    pub fn counts(&self) -> Option<&[usize]> {
        match self.last_pass {
            Some(stats) if stats.strategy == MergeStrategy::Parallel => Some(self.counts.as_slice()),
            _ => None,
        }
    }

    pub fn last_pass(&self) -> Option<PassStats> {
        self.last_pass
    }

    /// Copy every element accepted by `predicate` into `dst[0..count]`, in
    /// source order, and return `count`.
    ///
    /// `dst` must be at least as long as `source`.
    pub fn compact<T, P>(&mut self, source: &[T], predicate: &P, dst: &mut [T]) -> Result<usize>
    where
        T: Copy + Send + Sync,
        P: Predicate<T>,
    {
        self.run(source, predicate, dst.len(), |compactor, bitmask, counts| match counts {
            Some(counts) => compactor.parallel_merge_prebuilt(source, bitmask, counts, dst),
            None => compactor.merge(source, bitmask, dst),
        })
    }

    /// Like [`CompactionPipeline::compact`] but writes the source index of
    /// every accepted element.
    pub fn compact_indices<T, P>(
        &mut self,
        source: &[T],
        predicate: &P,
        dst: &mut [u32],
    ) -> Result<usize>
    where
        T: Sync,
        P: Predicate<T>,
    {
        let len = source.len();
        check_index_range(len)?;
        self.run(source, predicate, dst.len(), |compactor, bitmask, counts| match counts {
            Some(counts) => compactor.parallel_merge_indices_prebuilt(len, bitmask, counts, dst),
            None => compactor.merge_indices(len, bitmask, dst),
        })
    }

    /// Preconditions, indexing and merge for one pass.
    ///
    /// `merge` receives the count table only for the parallel strategy.
    fn run<T, P, M>(&mut self, source: &[T], predicate: &P, dst_len: usize, merge: M) -> Result<usize>
    where
        T: Sync,
        P: Predicate<T>,
        M: FnOnce(&Compactor, &[u64], Option<&[usize]>) -> Result<usize> + Send,
    {
        check_source(source.len())?;
        if dst_len < source.len() {
            return Err(Error::invalid(format!(
                "destination holds {} elements, source has {}",
                dst_len,
                source.len()
            )));
        }

        let strategy = self.config.strategy;
        let chunks = chunk_count(source.len());
        self.bitmask.clear();
        self.bitmask.resize(chunks, 0);

        let builder = BitIndexBuilder::new(self.config.batch_size);
        let compactor = Compactor::new(self.config.batch_size);
        let bitmask = &mut self.bitmask;
        let counts = &mut self.counts;

        let start = Instant::now();
        let pass = || -> Result<usize> {
            match strategy {
                MergeStrategy::Sequential => {
                    builder.build(source, predicate, bitmask.as_mut_slice())?;
                    log::trace!("indexed {} chunks, merging sequentially", chunks);
                    merge(&compactor, bitmask.as_slice(), None)
                }
                MergeStrategy::Parallel => {
                    counts.clear();
                    counts.resize(chunks, 0);
                    builder.build_with_counts(
                        source,
                        predicate,
                        bitmask.as_mut_slice(),
                        counts.as_mut_slice(),
                    )?;
                    log::trace!("indexed and reduced {} chunks, merging in parallel", chunks);
                    merge(&compactor, bitmask.as_slice(), Some(counts.as_slice()))
                }
            }
        };
        let final_count = match &self.pool {
            Some(pool) => pool.install(pass),
            None => pass(),
        }?;
        let elapsed = start.elapsed();

        log::debug!(
            "{:?} compaction kept {}/{} elements in {:.3}ms",
            strategy,
            final_count,
            source.len(),
            elapsed.as_secs_f64() * 1000.0
        );

        self.last_pass = Some(PassStats {
            strategy,
            source_len: source.len(),
            chunks,
            final_count,
            elapsed,
        });
        Ok(final_count)
    }
}
