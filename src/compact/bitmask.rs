//! Bit-index builder: one predicate bit per element, one `u64` per chunk.
//!
//! Full chunks are indexed in parallel, each task writing only its own word.
//! The trailing partial chunk is indexed afterwards on the joining thread.

use rayon::prelude::*;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::predicate::Predicate;
use super::prefix_sum;

/// Elements per bitmask word
pub const CHUNK_SIZE: usize = 64;

/// Number of bitmask words needed for `len` elements
pub fn chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_SIZE)
}

/// Evaluate the predicate over up to 64 elements, bit 0 first
#[inline]
fn index_chunk<T, P: Predicate<T>>(elements: &[T], predicate: &P) -> u64 {
    debug_assert!(elements.len() <= CHUNK_SIZE);
    let mut word = 0u64;
    for (bit, element) in elements.iter().enumerate() {
        if predicate.validate(element) {
            word |= 1u64 << bit;
        }
    }
    word
}

pub(crate) fn check_source(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::invalid("source array is empty"));
    }
    Ok(())
}

pub(crate) fn check_bitmask(source_len: usize, bitmask_len: usize) -> Result<()> {
    let expected = chunk_count(source_len);
    if bitmask_len != expected {
        return Err(Error::invalid(format!(
            "bitmask has {} words, {} elements need {}",
            bitmask_len, source_len, expected
        )));
    }
    Ok(())
}

/// Builds packed predicate bitmasks over a source array
#[derive(Clone, Copy, Debug)]
pub struct BitIndexBuilder {
    /// Minimum chunks handed to one worker task
    batch_size: usize,
}

impl Default for BitIndexBuilder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BitIndexBuilder {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fill `bitmask` so bit `i` of word `c` is `predicate(source[c * 64 + i])`.
    ///
    /// `bitmask` must hold exactly `chunk_count(source.len())` words. Bits past
    /// the end of the source are cleared.
    pub fn build<T, P>(&self, source: &[T], predicate: &P, bitmask: &mut [u64]) -> Result<()>
    where
        T: Sync,
        P: Predicate<T>,
    {
        check_source(source.len())?;
        check_bitmask(source.len(), bitmask.len())?;

        let full = source.len() / CHUNK_SIZE;
        let (full_words, tail_word) = bitmask.split_at_mut(full);

        full_words
            .par_iter_mut()
            .zip(source.par_chunks_exact(CHUNK_SIZE))
            .with_min_len(self.batch_size)
            .for_each(|(word, chunk)| *word = index_chunk(chunk, predicate));

        if let Some(word) = tail_word.first_mut() {
            log::trace!("indexing remainder chunk of {} elements", source.len() % CHUNK_SIZE);
            *word = index_chunk(&source[full * CHUNK_SIZE..], predicate);
        }
        Ok(())
    }

    /// [`BitIndexBuilder::build`] plus an inclusive prefix sum of popcounts.
    ///
    /// On success `counts[c]` is the number of accepted elements in chunks
    /// `0..=c`, so chunk `c` owns the output range `counts[c - 1]..counts[c]`.
    pub fn build_with_counts<T, P>(
        &self,
        source: &[T],
        predicate: &P,
        bitmask: &mut [u64],
        counts: &mut [usize],
    ) -> Result<()>
    where
        T: Sync,
        P: Predicate<T>,
    {
        check_source(source.len())?;
        check_bitmask(source.len(), bitmask.len())?;
        if counts.len() != bitmask.len() {
            return Err(Error::invalid(format!(
                "count table has {} entries, bitmask has {} words",
                counts.len(),
                bitmask.len()
            )));
        }

        let full = source.len() / CHUNK_SIZE;
        let (full_words, tail_word) = bitmask.split_at_mut(full);
        let (full_counts, tail_count) = counts.split_at_mut(full);

        full_words
            .par_iter_mut()
            .zip(full_counts.par_iter_mut())
            .zip(source.par_chunks_exact(CHUNK_SIZE))
            .with_min_len(self.batch_size)
            .for_each(|((word, count), chunk)| {
                *word = index_chunk(chunk, predicate);
                *count = word.count_ones() as usize;
            });

        if let (Some(word), Some(count)) = (tail_word.first_mut(), tail_count.first_mut()) {
            *word = index_chunk(&source[full * CHUNK_SIZE..], predicate);
            *count = word.count_ones() as usize;
        }

        prefix_sum::inclusive_scan(counts);
        Ok(())
    }
}
