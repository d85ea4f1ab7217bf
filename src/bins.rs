//! Interpolation-assisted predecessor index over a sorted array.
//!
//! The key range `[first, last]` of the array is cut into `num_bins`
//! equal-width buckets. A query interpolates its bucket in O(1) and then
//! binary-searches only the array slice that bucket spans. With evenly
//! spaced keys every bucket holds O(1) elements; skewed keys leave some
//! buckets empty and others crowded, which [`BinIndex::delta`] measures.

use thiserror::Error;

/// Errors raised while building or restoring a [`BinIndex`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinError {
    /// The indexed array must hold at least one key.
    #[error("cannot build bins over an empty array")]
    EmptyArray,

    /// At least one bin is required.
    #[error("number of bins must be greater than zero")]
    ZeroBins,

    /// Keys must be sorted in non-decreasing order.
    #[error("array is not sorted at index {index}")]
    Unsorted {
        /// First index whose key is smaller than its predecessor.
        index: usize,
    },

    /// Restored bin starts do not describe a valid partition.
    #[error("invalid bin starts: {reason}")]
    InvalidBinStarts {
        /// What is wrong with the supplied starts.
        reason: String,
    },
}

/// Anything that answers predecessor queries over a sorted key array.
pub trait Predecessor {
    /// Largest index `i` with `keys[i] <= key`; `0` below the first key and
    /// the last index above the last key.
    fn predecessor(&self, key: usize) -> usize;

    /// The indexed keys.
    fn keys(&self) -> &[usize];
}

/// Bucket of `key` for a key range `[first, last]` cut into `num_bins` buckets.
#[inline]
pub fn bin_index(first: usize, last: usize, key: usize, num_bins: usize) -> usize {
    if key <= first || last == first {
        return 0;
    }
    let scaled = num_bins as f64 * (key - first) as f64 / (last - first) as f64;
    (scaled.ceil() as usize).saturating_sub(1)
}

/// Binary-search predecessor over a whole sorted slice.
///
/// Narrows `[low, high)` while `high - low > 1`, returning the midpoint on an
/// exact hit and `low` otherwise. `keys` must be non-empty.
pub fn binary_search_predecessor(keys: &[usize], key: usize) -> usize {
    let mut low = 0;
    let mut high = keys.len();
    while high - low > 1 {
        let middle = (low + high) / 2;
        if key < keys[middle] {
            high = middle;
        } else if key > keys[middle] {
            low = middle;
        } else {
            return middle;
        }
    }
    if high < keys.len() && keys[high] == key {
        high
    } else {
        low
    }
}

/// Plain binary search over a borrowed key array.
#[derive(Debug, Clone, Copy)]
pub struct BinarySearch<'a> {
    keys: &'a [usize],
}

impl<'a> BinarySearch<'a> {
    /// Wrap a sorted, non-empty key array.
    pub fn new(keys: &'a [usize]) -> Self {
        Self { keys }
    }
}

impl Predecessor for BinarySearch<'_> {
    fn predecessor(&self, key: usize) -> usize {
        if key < self.keys[0] {
            return 0;
        }
        binary_search_predecessor(self.keys, key)
    }

    fn keys(&self) -> &[usize] {
        self.keys
    }
}

/// Bucket boundaries for a sorted key array.
///
/// Holds only the partition; queries go through a [`BinView`] that borrows
/// the keys, so the index can never be consulted against freed keys.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinIndex {
    /// For each bucket, the index of the last key before the bucket
    /// (`0` for the first bucket). Non-decreasing.
    starts: Vec<usize>,
}

impl BinIndex {
    /// Partition `keys` into `num_bins` buckets in one scan.
    pub fn build(keys: &[usize], num_bins: usize) -> Result<Self, BinError> {
        validate_keys(keys)?;
        if num_bins == 0 {
            return Err(BinError::ZeroBins);
        }

        let first = keys[0];
        let last = keys[keys.len() - 1];
        let mut starts = Vec::with_capacity(num_bins);
        let mut next = 1;

        for bin in 0..num_bins {
            let bin_first = next;
            while next < keys.len() && bin_index(first, last, keys[next], num_bins) == bin {
                next += 1;
            }
            starts.push(if bin == 0 { 0 } else { bin_first - 1 });
        }

        Ok(Self { starts })
    }

    /// Build with `ceil(keys.len() / bin_factor)` buckets.
    pub fn with_bin_factor(keys: &[usize], bin_factor: usize) -> Result<Self, BinError> {
        if bin_factor == 0 {
            return Err(BinError::ZeroBins);
        }
        Self::build(keys, keys.len().div_ceil(bin_factor).max(1))
    }

    /// Restore a partition read back from storage without recomputing it.
    pub fn from_starts(keys: &[usize], starts: Vec<usize>) -> Result<Self, BinError> {
        validate_keys(keys)?;
        if starts.is_empty() {
            return Err(BinError::ZeroBins);
        }
        if starts[0] != 0 {
            return Err(BinError::InvalidBinStarts {
                reason: format!("first bin starts at {} instead of 0", starts[0]),
            });
        }
        if let Some(pos) = starts.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(BinError::InvalidBinStarts {
                reason: format!("bin {} starts before bin {}", pos + 1, pos),
            });
        }
        let last = starts[starts.len() - 1];
        if last >= keys.len() {
            return Err(BinError::InvalidBinStarts {
                reason: format!("bin start {last} exceeds array length {}", keys.len()),
            });
        }

        // Each start must be the last key interpolating below its bucket,
        // otherwise the search span can miss the predecessor.
        let first = keys[0];
        let key_last = keys[keys.len() - 1];
        let num_bins = starts.len();
        for (bin, &start) in starts.iter().enumerate().skip(1) {
            let below = bin_index(first, key_last, keys[start], num_bins) < bin;
            let next_inside = keys
                .get(start + 1)
                .map_or(true, |&next| bin_index(first, key_last, next, num_bins) >= bin);
            if !below || !next_inside {
                return Err(BinError::InvalidBinStarts {
                    reason: format!("bin {bin} start {start} does not bound its keys"),
                });
            }
        }
        Ok(Self { starts })
    }

    /// Number of buckets.
    pub fn num_bins(&self) -> usize {
        self.starts.len()
    }

    /// Per-bucket start indices.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Attach the key array the partition was built over.
    pub fn view<'a>(&'a self, keys: &'a [usize]) -> BinView<'a> {
        BinView { bins: self, keys }
    }

    /// Inclusive index range searched for keys falling in `bin`.
    pub fn span(&self, bin: usize, len: usize) -> (usize, usize) {
        let low = self.starts[bin];
        let high = self.starts.get(bin + 1).copied().unwrap_or(len - 1);
        (low, high)
    }

    /// Number of keys searched by the widest bucket.
    pub fn largest_bin(&self, len: usize) -> usize {
        self.span_sizes(len).max().unwrap_or(0)
    }

    /// Index of the widest bucket (the first one on ties).
    pub fn largest_bin_index(&self, len: usize) -> usize {
        let mut best = 0;
        let mut best_size = 0;
        for (bin, size) in self.span_sizes(len).enumerate() {
            if size > best_size {
                best = bin;
                best_size = size;
            }
        }
        best
    }

    /// Mean bucket span size.
    pub fn average_bin(&self, len: usize) -> f64 {
        let total: usize = self.span_sizes(len).sum();
        total as f64 / self.num_bins() as f64
    }

    /// Median bucket span size.
    pub fn median_bin(&self, len: usize) -> usize {
        let mut sizes: Vec<usize> = self.span_sizes(len).collect();
        sizes.sort_unstable();
        sizes[sizes.len() / 2]
    }

    /// Ratio of the widest to the narrowest gap between consecutive keys.
    ///
    /// `1.0` means perfectly uniform spacing; the larger the ratio the more
    /// keys can pile up in one bucket. Infinite when two keys coincide.
    pub fn delta(keys: &[usize]) -> f64 {
        let mut min_gap = usize::MAX;
        let mut max_gap = 0;
        for pair in keys.windows(2) {
            let gap = pair[1] - pair[0];
            min_gap = min_gap.min(gap);
            max_gap = max_gap.max(gap);
        }
        match min_gap {
            usize::MAX => 1.0,
            0 => f64::INFINITY,
            _ => max_gap as f64 / min_gap as f64,
        }
    }

    fn span_sizes(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        let last = self.starts.len() - 1;
        self.starts.iter().enumerate().map(move |(bin, &start)| {
            if bin < last {
                self.starts[bin + 1] - start + 1
            } else {
                len - start
            }
        })
    }
}

/// A [`BinIndex`] paired with the keys it partitions.
#[derive(Debug, Clone, Copy)]
pub struct BinView<'a> {
    bins: &'a BinIndex,
    keys: &'a [usize],
}

impl<'a> BinView<'a> {
    /// Underlying partition.
    pub fn bins(&self) -> &'a BinIndex {
        self.bins
    }
}

impl Predecessor for BinView<'_> {
    fn predecessor(&self, key: usize) -> usize {
        let keys = self.keys;
        let first = keys[0];
        let last = keys[keys.len() - 1];
        if key < first {
            return 0;
        }
        if key > last {
            return keys.len() - 1;
        }

        let bin = bin_index(first, last, key, self.bins.num_bins());
        let (low, high) = self.bins.span(bin, keys.len());
        low + binary_search_predecessor(&keys[low..=high], key)
    }

    fn keys(&self) -> &[usize] {
        self.keys
    }
}

fn validate_keys(keys: &[usize]) -> Result<(), BinError> {
    if keys.is_empty() {
        return Err(BinError::EmptyArray);
    }
    if let Some(pos) = keys.windows(2).position(|pair| pair[0] > pair[1]) {
        return Err(BinError::Unsorted { index: pos + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_predecessor(keys: &[usize], key: usize) -> usize {
        keys.iter().rposition(|&k| k <= key).unwrap_or(0)
    }

    #[test]
    fn bin_index_spreads_keys_over_range() {
        assert_eq!(bin_index(0, 100, 0, 10), 0);
        assert_eq!(bin_index(0, 100, 1, 10), 0);
        assert_eq!(bin_index(0, 100, 10, 10), 0);
        assert_eq!(bin_index(0, 100, 11, 10), 1);
        assert_eq!(bin_index(0, 100, 100, 10), 9);
        assert_eq!(bin_index(5, 5, 5, 4), 0);
    }

    #[test]
    fn starts_partition_uniform_keys() {
        let keys: Vec<usize> = (0..10).map(|i| i * 10).collect();
        let bins = BinIndex::build(&keys, 3).unwrap();
        // Buckets: (0, 30], (30, 60], (60, 90]
        assert_eq!(bins.starts(), &[0, 3, 6]);
        assert_eq!(bins.span(2, keys.len()), (6, 9));
    }

    #[test]
    fn predecessor_matches_naive_for_every_bin_count() {
        let keys = vec![0, 3, 4, 9, 15, 16, 17, 30, 31, 58, 60];
        for num_bins in 1..=keys.len() + 2 {
            let bins = BinIndex::build(&keys, num_bins).unwrap();
            let view = bins.view(&keys);
            for key in 0..=65 {
                assert_eq!(
                    view.predecessor(key),
                    naive_predecessor(&keys, key),
                    "num_bins={num_bins} key={key}"
                );
            }
        }
    }

    #[test]
    fn keys_below_first_clamp_to_zero() {
        let keys = vec![10, 20, 30];
        let bins = BinIndex::build(&keys, 2).unwrap();
        assert_eq!(bins.view(&keys).predecessor(3), 0);
        assert_eq!(BinarySearch::new(&keys).predecessor(3), 0);
        assert_eq!(bins.view(&keys).predecessor(99), 2);
    }

    #[test]
    fn skewed_keys_leave_empty_buckets() {
        let mut keys: Vec<usize> = (0..20).collect();
        keys.push(10_000);
        let bins = BinIndex::build(&keys, 10).unwrap();
        assert!(BinIndex::delta(&keys) > 1.0);
        assert_eq!(bins.largest_bin_index(keys.len()), 0);
        assert!(bins.largest_bin(keys.len()) >= 20);
        let view = bins.view(&keys);
        for key in [0, 5, 19, 20, 500, 9_999, 10_000, 20_000] {
            assert_eq!(view.predecessor(key), naive_predecessor(&keys, key));
        }
    }

    #[test]
    fn single_key_array() {
        let keys = vec![0];
        let bins = BinIndex::build(&keys, 1).unwrap();
        assert_eq!(bins.view(&keys).predecessor(0), 0);
        assert_eq!(bins.view(&keys).predecessor(7), 0);
        assert_eq!(BinIndex::delta(&keys), 1.0);
    }

    #[test]
    fn restored_starts_are_validated() {
        let keys = vec![0, 2, 4, 6];
        assert!(BinIndex::from_starts(&keys, vec![0, 1, 2]).is_ok());
        assert!(matches!(
            BinIndex::from_starts(&keys, vec![1, 2]),
            Err(BinError::InvalidBinStarts { .. })
        ));
        assert!(matches!(
            BinIndex::from_starts(&keys, vec![0, 3, 2]),
            Err(BinError::InvalidBinStarts { .. })
        ));
        assert!(matches!(
            BinIndex::from_starts(&keys, vec![0, 9]),
            Err(BinError::InvalidBinStarts { .. })
        ));
    }

    #[test]
    fn restored_starts_must_bound_their_buckets() {
        let keys = vec![0, 6, 13, 15, 22, 24];
        for num_bins in 1..=keys.len() {
            let built = BinIndex::build(&keys, num_bins).unwrap();
            let restored = BinIndex::from_starts(&keys, built.starts().to_vec()).unwrap();
            assert_eq!(restored, built);
        }
        // Ordered and in range, but bucket 1 would search past its keys.
        assert!(matches!(
            BinIndex::from_starts(&keys, vec![0, 5]),
            Err(BinError::InvalidBinStarts { .. })
        ));
        assert!(matches!(
            BinIndex::from_starts(&keys, vec![0, 0, 0]),
            Err(BinError::InvalidBinStarts { .. })
        ));
    }

    #[test]
    fn build_rejects_bad_input() {
        assert_eq!(BinIndex::build(&[], 1), Err(BinError::EmptyArray));
        assert_eq!(BinIndex::build(&[1, 2], 0), Err(BinError::ZeroBins));
        assert_eq!(
            BinIndex::build(&[1, 3, 2], 1),
            Err(BinError::Unsorted { index: 2 })
        );
    }
}
