//! Prefix-sum reduction over per-chunk popcounts.
//!
//! After [`inclusive_scan`], chunk `c` owns the output range
//! `chunk_start(counts, c)..counts[c]`; ranges of different chunks never
//! overlap, which is what lets the parallel merge run without a shared cursor.

use crate::core::error::Error;
use crate::core::types::Result;

/// Replace each entry with the sum of itself and all preceding entries
pub fn inclusive_scan(counts: &mut [usize]) {
    let mut running = 0usize;
    for count in counts.iter_mut() {
        running += *count;
        *count = running;
    }
}

/// First output slot owned by `chunk`
#[inline]
pub fn chunk_start(counts: &[usize], chunk: usize) -> usize {
    if chunk == 0 { 0 } else { counts[chunk - 1] }
}

/// Total accepted elements, i.e. the last entry of the table
pub fn total(counts: &[usize]) -> usize {
    counts.last().copied().unwrap_or(0)
}

/// Check that `counts` is the inclusive prefix sum of `bitmask` popcounts
pub fn verify(bitmask: &[u64], counts: &[usize]) -> Result<()> {
    if counts.len() != bitmask.len() {
        return Err(Error::invalid(format!(
            "count table has {} entries, bitmask has {} words",
            counts.len(),
            bitmask.len()
        )));
    }
    let mut previous = 0usize;
    for (chunk, (&word, &count)) in bitmask.iter().zip(counts).enumerate() {
        let matched = word.count_ones() as usize;
        if count.checked_sub(previous) != Some(matched) {
            return Err(Error::invalid(format!(
                "count table entry {} is {}, expected {}",
                chunk,
                count,
                previous + matched
            )));
        }
        previous = count;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_scan() {
        let mut counts = vec![3, 0, 5, 1];
        inclusive_scan(&mut counts);
        assert_eq!(counts, vec![3, 3, 8, 9]);
        assert_eq!(chunk_start(&counts, 0), 0);
        assert_eq!(chunk_start(&counts, 2), 3);
        assert_eq!(total(&counts), 9);
        assert_eq!(total(&[]), 0);
    }

    #[test]
    fn test_verify_rejects_inconsistent_tables() {
        let bitmask = [0b11, 0b1];
        assert!(verify(&bitmask, &[2, 3]).is_ok());
        assert!(matches!(verify(&bitmask, &[2, 4]), Err(Error::InvalidArgument(_))));
        assert!(matches!(verify(&bitmask, &[3, 2]), Err(Error::InvalidArgument(_))));
        assert!(matches!(verify(&bitmask, &[2]), Err(Error::InvalidArgument(_))));

        assert!(verify(&[u64::MAX, 0, 0b1011, 1 << 63], &[64, 64, 67, 68]).is_ok());
    }
}
