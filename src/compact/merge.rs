//! Compaction of accepted elements into a contiguous, order-preserving
//! destination.
//!
//! Two strategies assign every accepted element a unique output slot:
//!
//! * **Sequential** ([`Compactor::merge`]): one task walks the chunks in
//!   order and owns the only running cursor. No count table and no reduction
//!   pass are needed, but all copying happens on one thread.
//! * **Parallel** ([`Compactor::parallel_merge`]): the inclusive prefix sum
//!   from [`BitIndexBuilder::build_with_counts`] gives each chunk its own
//!   output range up front, so chunks copy fully in parallel. The cost is the
//!   reduction pass, the count table, and reading the bitmask a second time.
//!
//! Both walk set bits with `trailing_zeros`, least significant first, so the
//! output order is the source order.
//!
//! [`BitIndexBuilder::build_with_counts`]: super::bitmask::BitIndexBuilder::build_with_counts

use crate::core::error::Error;
use crate::core::types::Result;
use super::bitmask::{check_bitmask, check_source, CHUNK_SIZE};
use super::prefix_sum;

/// Call `f` with the position of every set bit of `word`, ascending.
///
/// Costs one iteration per set bit rather than one per bit.
#[inline]
pub fn for_each_set_bit(mut word: u64, mut f: impl FnMut(usize)) {
    let mut cursor = 0usize;
    while word != 0 {
        let tz = word.trailing_zeros() as usize;
        f(cursor + tz);
        cursor += tz + 1;
        // Shifting by 64 clears the word
        word = word.checked_shr(tz as u32 + 1).unwrap_or(0);
    }
}

/// Validate a bitmask against its source length and destination capacity
fn check_merge_inputs(source_len: usize, bitmask: &[u64], dst_len: usize) -> Result<()> {
    check_source(source_len)?;
    check_bitmask(source_len, bitmask.len())?;
    if dst_len < source_len {
        return Err(Error::invalid(format!(
            "destination holds {} elements, source has {}",
            dst_len, source_len
        )));
    }
    let live_bits = source_len % CHUNK_SIZE;
    if live_bits != 0 {
        if let Some(&last) = bitmask.last() {
            if last >> live_bits != 0 {
                return Err(Error::invalid(format!(
                    "bitmask has bits set past source length {}",
                    source_len
                )));
            }
        }
    }
    Ok(())
}

pub(crate) fn check_index_range(source_len: usize) -> Result<()> {
    if source_len > u32::MAX as usize + 1 {
        return Err(Error::invalid(format!(
            "{} elements cannot be addressed with u32 indices",
            source_len
        )));
    }
    Ok(())
}

/// Copy the accepted elements of `bitmask` into `region`.
///
/// `region` starts at the output slot of `first_chunk`. Halves are split at
/// their prefix-sum offset and run under `rayon::join` until at most
/// `batch_size` chunks remain.
fn scatter<U, E>(
    bitmask: &[u64],
    counts: &[usize],
    first_chunk: usize,
    region: &mut [U],
    emit: &E,
    batch_size: usize,
) where
    U: Send,
    E: Fn(usize) -> U + Sync,
{
    if bitmask.len() <= batch_size {
        let mut slot = 0;
        for (i, &word) in bitmask.iter().enumerate() {
            let base = (first_chunk + i) * CHUNK_SIZE;
            for_each_set_bit(word, |offset| {
                region[slot] = emit(base + offset);
                slot += 1;
            });
        }
        return;
    }

    let mid = bitmask.len() / 2;
    let split = counts[first_chunk + mid - 1] - prefix_sum::chunk_start(counts, first_chunk);
    let (left_words, right_words) = bitmask.split_at(mid);
    let (left, right) = region.split_at_mut(split);
    rayon::join(
        || scatter(left_words, counts, first_chunk, left, emit, batch_size),
        || scatter(right_words, counts, first_chunk + mid, right, emit, batch_size),
    );
}

/// Writes accepted elements (or their indices) into a destination buffer
#[derive(Clone, Copy, Debug)]
pub struct Compactor {
    /// Most chunks one parallel merge task copies before splitting
    batch_size: usize,
}

impl Default for Compactor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Compactor {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    /// Sequential merge: copy accepted elements to `dst[0..count]`.
    ///
    /// Entries of `dst` past the returned count are left untouched.
    pub fn merge<T: Copy>(&self, source: &[T], bitmask: &[u64], dst: &mut [T]) -> Result<usize> {
        check_merge_inputs(source.len(), bitmask, dst.len())?;
        Ok(merge_sequential(bitmask, dst, |index| source[index]))
    }

    /// Parallel merge using the inclusive prefix-sum table `counts`.
    pub fn parallel_merge<T>(
        &self,
        source: &[T],
        bitmask: &[u64],
        counts: &[usize],
        dst: &mut [T],
    ) -> Result<usize>
    where
        T: Copy + Send + Sync,
    {
        check_merge_inputs(source.len(), bitmask, dst.len())?;
        prefix_sum::verify(bitmask, counts)?;
        self.merge_parallel(bitmask, counts, dst, |index| source[index])
    }

    /// [`Compactor::parallel_merge`] for a count table built alongside
    /// `bitmask` by [`BitIndexBuilder::build_with_counts`]; the table is
    /// only re-verified in debug builds.
    ///
    /// [`BitIndexBuilder::build_with_counts`]: super::bitmask::BitIndexBuilder::build_with_counts
    pub(crate) fn parallel_merge_prebuilt<T>(
        &self,
        source: &[T],
        bitmask: &[u64],
        counts: &[usize],
        dst: &mut [T],
    ) -> Result<usize>
    where
        T: Copy + Send + Sync,
    {
        check_merge_inputs(source.len(), bitmask, dst.len())?;
        debug_assert!(prefix_sum::verify(bitmask, counts).is_ok());
        self.merge_parallel(bitmask, counts, dst, |index| source[index])
    }

    /// Sequential merge emitting source indices instead of elements.
    ///
    /// `len` is the source length the bitmask was built from.
    pub fn merge_indices(&self, len: usize, bitmask: &[u64], dst: &mut [u32]) -> Result<usize> {
        check_merge_inputs(len, bitmask, dst.len())?;
        check_index_range(len)?;
        Ok(merge_sequential(bitmask, dst, |index| index as u32))
    }

    /// Parallel merge emitting source indices instead of elements.
    pub fn parallel_merge_indices(
        &self,
        len: usize,
        bitmask: &[u64],
        counts: &[usize],
        dst: &mut [u32],
    ) -> Result<usize> {
        check_merge_inputs(len, bitmask, dst.len())?;
        check_index_range(len)?;
        prefix_sum::verify(bitmask, counts)?;
        self.merge_parallel(bitmask, counts, dst, |index| index as u32)
    }

    /// Index variant of [`Compactor::parallel_merge_prebuilt`].
    pub(crate) fn parallel_merge_indices_prebuilt(
        &self,
        len: usize,
        bitmask: &[u64],
        counts: &[usize],
        dst: &mut [u32],
    ) -> Result<usize> {
        check_merge_inputs(len, bitmask, dst.len())?;
        check_index_range(len)?;
        debug_assert!(prefix_sum::verify(bitmask, counts).is_ok());
        self.merge_parallel(bitmask, counts, dst, |index| index as u32)
    }

    /// Scatter into `dst[0..total]`. `counts` must already match `bitmask`.
    fn merge_parallel<U, E>(
        &self,
        bitmask: &[u64],
        counts: &[usize],
        dst: &mut [U],
        emit: E,
    ) -> Result<usize>
    where
        U: Send,
        E: Fn(usize) -> U + Sync,
    {
        if counts.len() != bitmask.len() {
            return Err(Error::invalid(format!(
                "count table has {} entries, bitmask has {} words",
                counts.len(),
                bitmask.len()
            )));
        }
        let total = prefix_sum::total(counts);
        let region = dst
            .get_mut(..total)
            .ok_or_else(|| Error::invalid("count table exceeds destination length"))?;
        scatter(bitmask, counts, 0, region, &emit, self.batch_size);
        Ok(total)
    }
}

/// Single pass in chunk order with one running counter
fn merge_sequential<U>(bitmask: &[u64], dst: &mut [U], emit: impl Fn(usize) -> U) -> usize {
    let mut counter = 0;
    for (chunk, &word) in bitmask.iter().enumerate() {
        let base = chunk * CHUNK_SIZE;
        for_each_set_bit(word, |offset| {
            dst[counter] = emit(base + offset);
            counter += 1;
        });
    }
    counter
}
