//! Greedy relative Lempel-Ziv parse of a source against the reference.
//!
//! Each phrase copies the longest prefix of the remaining source that
//! occurs in the reference and closes with one literal byte taken from the
//! source. Phrase boundaries are kept as a cumulative length array whose
//! [`BinIndex`] drives random access.

use crate::alphabet::AlphabetError;
use crate::bins::{BinError, BinIndex, BinView, BinarySearch};
use crate::suffix_tree::SuffixTree;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while factorizing a source.
#[derive(Debug, Error)]
pub enum FactorizeError {
    /// A source byte never occurs in the reference.
    #[error("source cannot be expressed against the reference: {0}")]
    Alphabet(#[from] AlphabetError),

    /// The bin factor must be at least one.
    #[error("bin factor must be greater than zero")]
    InvalidBinFactor,

    /// Bins could not be built or restored over the phrase boundaries.
    #[error("bin index error: {0}")]
    Bins(#[from] BinError),

    /// Parallel phrase arrays disagree in length.
    #[error("phrase arrays disagree: {starts} starts, {cum_lens} lengths, {mismatches} literals")]
    Inconsistent {
        /// Number of start entries.
        starts: usize,
        /// Number of cumulative length entries.
        cum_lens: usize,
        /// Number of literal entries.
        mismatches: usize,
    },

    /// Cumulative lengths must start at zero and strictly increase.
    #[error("phrase boundaries do not strictly increase at entry {index}")]
    NonIncreasing {
        /// First offending entry.
        index: usize,
    },
}

/// One factorization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phrase {
    /// Reference offset of the copied run.
    pub start: usize,
    /// Number of bytes copied from the reference.
    pub length: usize,
    /// Literal byte closing the phrase.
    pub mismatch: u8,
}

impl Phrase {
    /// Number of source bytes covered, literal included.
    #[inline]
    pub fn span(&self) -> usize {
        self.length + 1
    }
}

/// A source compressed against a reference.
///
/// Entry `0` is a zero-length sentinel, so phrase `k` (for `k >= 1`) covers
/// source positions `[cum_lens[k - 1], cum_lens[k])` and its literal sits at
/// `cum_lens[k] - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedSource {
    starts: Vec<usize>,
    cum_lens: Vec<usize>,
    mismatches: Vec<u8>,
    bins: BinIndex,
}

impl CompressedSource {
    /// Assemble from parallel arrays, partitioning the boundaries with
    /// `ceil(len / bin_factor)` bins.
    pub fn from_parts(
        starts: Vec<usize>,
        cum_lens: Vec<usize>,
        mismatches: Vec<u8>,
        bin_factor: usize,
    ) -> Result<Self, FactorizeError> {
        if bin_factor == 0 {
            return Err(FactorizeError::InvalidBinFactor);
        }
        check_lengths(&starts, &cum_lens, &mismatches)?;
        let bins = BinIndex::with_bin_factor(&cum_lens, bin_factor)?;
        debug!(
            entries = cum_lens.len(),
            bins = bins.num_bins(),
            "bins built over phrase boundaries"
        );
        Ok(Self {
            starts,
            cum_lens,
            mismatches,
            bins,
        })
    }

    /// Assemble from parallel arrays and a partition read back from storage.
    pub fn from_parts_with_bins(
        starts: Vec<usize>,
        cum_lens: Vec<usize>,
        mismatches: Vec<u8>,
        bin_starts: Vec<usize>,
    ) -> Result<Self, FactorizeError> {
        check_lengths(&starts, &cum_lens, &mismatches)?;
        let bins = BinIndex::from_starts(&cum_lens, bin_starts)?;
        Ok(Self {
            starts,
            cum_lens,
            mismatches,
            bins,
        })
    }

    /// Number of entries, sentinel included (`phrase_count() + 1`).
    pub fn len(&self) -> usize {
        self.cum_lens.len()
    }

    /// Returns `true` when the source was empty.
    pub fn is_empty(&self) -> bool {
        self.phrase_count() == 0
    }

    /// Number of phrases, sentinel excluded.
    pub fn phrase_count(&self) -> usize {
        self.cum_lens.len() - 1
    }

    /// Length of the decompressed source.
    pub fn source_len(&self) -> usize {
        self.cum_lens[self.cum_lens.len() - 1]
    }

    /// Reference offsets of each entry.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Cumulative source lengths of each entry.
    pub fn cum_lens(&self) -> &[usize] {
        &self.cum_lens
    }

    /// Literal of each entry.
    pub fn mismatches(&self) -> &[u8] {
        &self.mismatches
    }

    /// Partition over [`Self::cum_lens`].
    pub fn bins(&self) -> &BinIndex {
        &self.bins
    }

    /// Bin-accelerated predecessor over the phrase boundaries.
    pub fn boundaries(&self) -> BinView<'_> {
        self.bins.view(&self.cum_lens)
    }

    /// Plain binary-search predecessor over the phrase boundaries.
    pub fn boundaries_binary(&self) -> BinarySearch<'_> {
        BinarySearch::new(&self.cum_lens)
    }

    /// Phrase `k` (`1 <= k <= phrase_count()`).
    pub fn phrase(&self, k: usize) -> Phrase {
        Phrase {
            start: self.starts[k],
            length: self.cum_lens[k] - self.cum_lens[k - 1] - 1,
            mismatch: self.mismatches[k],
        }
    }

    /// Iterate over phrases in source order.
    pub fn phrases(&self) -> impl ExactSizeIterator<Item = Phrase> + '_ {
        (1..self.cum_lens.len()).map(move |k| self.phrase(k))
    }

    /// Ratio of the longest to the shortest phrase.
    pub fn delta(&self) -> f64 {
        BinIndex::delta(&self.cum_lens)
    }
}

/// Greedily factorize `source` against the reference indexed by `tree`.
///
/// Every source byte must occur in the reference; otherwise the whole parse
/// fails and nothing is returned. Matches are capped one byte short of the
/// end of the source so that the final phrase closes on the last source
/// byte (the terminator, when the source carries one).
pub fn factorize(
    tree: &SuffixTree,
    source: &[u8],
    bin_factor: usize,
) -> Result<CompressedSource, FactorizeError> {
    if bin_factor == 0 {
        return Err(FactorizeError::InvalidBinFactor);
    }
    let codes = tree.alphabet().encode(source)?;

    let mut starts = vec![0];
    let mut cum_lens = vec![0];
    let mut mismatches = vec![0];

    let mut offset = 0;
    while offset < source.len() {
        let window = &codes[offset..source.len() - 1];
        let (start, length) = if window.is_empty() {
            (0, 0)
        } else {
            match tree.longest_match(window) {
                Some(found) => (found.position, found.length),
                None => {
                    return Err(AlphabetError::UnmappedSymbol {
                        symbol: source[offset],
                        position: offset,
                    }
                    .into())
                }
            }
        };

        starts.push(start);
        cum_lens.push(offset + length + 1);
        mismatches.push(source[offset + length]);
        offset += length + 1;
    }

    let compressed = CompressedSource::from_parts(starts, cum_lens, mismatches, bin_factor)?;
    info!(
        source_len = source.len(),
        phrases = compressed.phrase_count(),
        bins = compressed.bins().num_bins(),
        "source factorized"
    );
    Ok(compressed)
}

fn check_lengths(
    starts: &[usize],
    cum_lens: &[usize],
    mismatches: &[u8],
) -> Result<(), FactorizeError> {
    if cum_lens.is_empty() || starts.len() != cum_lens.len() || mismatches.len() != cum_lens.len()
    {
        return Err(FactorizeError::Inconsistent {
            starts: starts.len(),
            cum_lens: cum_lens.len(),
            mismatches: mismatches.len(),
        });
    }
    if cum_lens[0] != 0 {
        return Err(FactorizeError::NonIncreasing { index: 0 });
    }
    if let Some(pos) = cum_lens.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(FactorizeError::NonIncreasing { index: pos + 1 });
    }
    Ok(())
}
