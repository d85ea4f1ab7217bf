//! Timing harness for construction, compression and access.
//!
//! Query timings draw random positions up front, then time five repeated
//! lookups per position so that random number generation stays out of the
//! measured loop. Results are reported in nanoseconds per lookup.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::access::{access, access_range};
use crate::factorize::{factorize, CompressedSource};
use crate::suffix_tree::SuffixTree;
use crate::RlzError;

const REPETITIONS: u32 = 5;

/// Parameters of a measurement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureConfig {
    /// Entries per bin used for compression.
    pub bin_factor: usize,
    /// Number of random point queries.
    pub queries: usize,
    /// Number of random range queries.
    pub ranges: usize,
    /// Length of each range query.
    pub range_length: usize,
    /// Fixed seed for reproducible query positions; random when `None`.
    pub seed: Option<u64>,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            bin_factor: 1,
            queries: 10_000,
            ranges: 1_000,
            range_length: 100,
            seed: None,
        }
    }
}

/// Statistics and timings gathered for one reference/source pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionReport {
    /// Length of the source, terminator included.
    pub source_len: usize,
    /// Number of phrases.
    pub phrases: usize,
    /// Number of bins over the phrase boundaries.
    pub bins: usize,
    /// Widest over narrowest boundary gap.
    pub delta: f64,
    /// Keys searched by the widest bucket.
    pub largest_bin: usize,
    /// Mean bucket span.
    pub average_bin: f64,
    /// Median bucket span.
    pub median_bin: usize,
    /// Suffix tree construction time.
    pub tree_build: Duration,
    /// Factorization time.
    pub compression: Duration,
    /// Number of point queries timed.
    pub queries: usize,
    /// Mean point access, in nanoseconds.
    pub access_ns: f64,
    /// Mean point access restricted to the widest bucket, in nanoseconds.
    pub worst_access_ns: f64,
    /// Number of range queries timed.
    pub ranges: usize,
    /// Length of each range query.
    pub range_length: usize,
    /// Mean range access, in nanoseconds.
    pub range_access_ns: f64,
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suffix tree construction time: {:.3}s", self.tree_build.as_secs_f64())?;
        writeln!(f, "Compression time: {:.3}s", self.compression.as_secs_f64())?;
        writeln!(f, "Original length: {}", self.source_len)?;
        writeln!(f, "Number of phrases: {}", self.phrases)?;
        writeln!(f, "Number of bins: {}", self.bins)?;
        writeln!(f, "Delta: {:.2}", self.delta)?;
        writeln!(
            f,
            "Largest bin: {} (average {:.2}, median {})",
            self.largest_bin, self.average_bin, self.median_bin
        )?;
        writeln!(
            f,
            "Average time to access {} random indices: {:.3}ns",
            self.queries, self.access_ns
        )?;
        writeln!(
            f,
            "Average time to access {} random indices on the fullest bin: {:.3}ns",
            self.queries, self.worst_access_ns
        )?;
        write!(
            f,
            "Average time to access {} random ranges of length {}: {:.3}ns",
            self.ranges, self.range_length, self.range_access_ns
        )
    }
}

/// Time suffix tree construction over `reference`.
pub fn build_tree_time(reference: &[u8]) -> Result<(SuffixTree, Duration), RlzError> {
    let started = Instant::now();
    let tree = SuffixTree::build(reference)?;
    Ok((tree, started.elapsed()))
}

/// Time factorization of `source`.
pub fn compress_time(
    tree: &SuffixTree,
    source: &[u8],
    bin_factor: usize,
) -> Result<(CompressedSource, Duration), RlzError> {
    let started = Instant::now();
    let compressed = factorize(tree, source, bin_factor)?;
    Ok((compressed, started.elapsed()))
}

/// Mean nanoseconds per point access over `queries` random positions.
pub fn query_time<R: Rng>(
    reference: &[u8],
    compressed: &CompressedSource,
    queries: usize,
    rng: &mut R,
) -> Result<f64, RlzError> {
    let total = compressed.source_len();
    if total == 0 || queries == 0 {
        return Ok(0.0);
    }
    let positions: Vec<usize> = (0..queries).map(|_| rng.gen_range(0..total)).collect();
    time_points(reference, compressed, &positions)
}

/// Mean nanoseconds per point access over positions inside the widest bucket.
pub fn query_time_worst<R: Rng>(
    reference: &[u8],
    compressed: &CompressedSource,
    queries: usize,
    rng: &mut R,
) -> Result<f64, RlzError> {
    let (from, to) = widest_bin_positions(compressed);
    if from >= to || queries == 0 {
        return Ok(0.0);
    }
    debug!(from, to, "timing accesses inside the widest bin");
    let positions: Vec<usize> = (0..queries).map(|_| rng.gen_range(from..to)).collect();
    time_points(reference, compressed, &positions)
}

/// Mean nanoseconds per range access of `range_length` bytes.
pub fn range_query_time<R: Rng>(
    reference: &[u8],
    compressed: &CompressedSource,
    range_length: usize,
    ranges: usize,
    rng: &mut R,
) -> Result<f64, RlzError> {
    let total = compressed.source_len();
    if range_length > total {
        return Err(RlzError::InvalidConfiguration(format!(
            "range length {range_length} exceeds source length {total}"
        )));
    }
    if ranges == 0 {
        return Ok(0.0);
    }
    let positions: Vec<usize> = (0..ranges)
        .map(|_| rng.gen_range(0..=total - range_length))
        .collect();

    let started = Instant::now();
    for &pos in &positions {
        for _ in 0..REPETITIONS {
            black_box(access_range(reference, compressed, pos, range_length)?);
        }
    }
    Ok(per_lookup(started.elapsed(), positions.len()))
}

/// Build, compress and time queries for one reference/source pair.
pub fn measure(
    reference: &[u8],
    source: &[u8],
    config: &MeasureConfig,
) -> Result<CompressionReport, RlzError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (tree, tree_build) = build_tree_time(reference)?;
    let (compressed, compression) = compress_time(&tree, source, config.bin_factor)?;
    let access_ns = query_time(reference, &compressed, config.queries, &mut rng)?;
    let worst_access_ns = query_time_worst(reference, &compressed, config.queries, &mut rng)?;
    let range_access_ns = range_query_time(
        reference,
        &compressed,
        config.range_length,
        config.ranges,
        &mut rng,
    )?;

    let bins = compressed.bins();
    let len = compressed.len();
    let report = CompressionReport {
        source_len: compressed.source_len(),
        phrases: compressed.phrase_count(),
        bins: bins.num_bins(),
        delta: compressed.delta(),
        largest_bin: bins.largest_bin(len),
        average_bin: bins.average_bin(len),
        median_bin: bins.median_bin(len),
        tree_build,
        compression,
        queries: config.queries,
        access_ns,
        worst_access_ns,
        ranges: config.ranges,
        range_length: config.range_length,
        range_access_ns,
    };
    info!(
        phrases = report.phrases,
        bins = report.bins,
        access_ns = report.access_ns,
        "measurement finished"
    );
    Ok(report)
}

fn time_points(
    reference: &[u8],
    compressed: &CompressedSource,
    positions: &[usize],
) -> Result<f64, RlzError> {
    let started = Instant::now();
    for &pos in positions {
        for _ in 0..REPETITIONS {
            black_box(access(reference, compressed, pos)?);
        }
    }
    Ok(per_lookup(started.elapsed(), positions.len()))
}

/// Source positions `[from, to)` whose boundaries fall in the widest bucket.
fn widest_bin_positions(compressed: &CompressedSource) -> (usize, usize) {
    let bins = compressed.bins();
    let cum_lens = compressed.cum_lens();
    let (low, high) = bins.span(bins.largest_bin_index(cum_lens.len()), cum_lens.len());
    (cum_lens[low], cum_lens[high])
}

fn per_lookup(elapsed: Duration, lookups: usize) -> f64 {
    elapsed.as_nanos() as f64 / f64::from(REPETITIONS) / lookups as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &[u8] = b"CATTAGA$";
    const SOURCE: &[u8] = b"CATTACATTAGAGACATTAGAGA$";

    fn seeded() -> MeasureConfig {
        MeasureConfig {
            bin_factor: 2,
            queries: 50,
            ranges: 20,
            range_length: 7,
            seed: Some(7),
        }
    }

    #[test]
    fn report_carries_compression_statistics() {
        let report = measure(REFERENCE, SOURCE, &seeded()).unwrap();
        assert_eq!(report.source_len, SOURCE.len());
        assert_eq!(report.phrases, 5);
        assert_eq!(report.bins, 3);
        assert!(report.delta >= 1.0);
        assert!(report.access_ns >= 0.0);
        assert!(report.to_string().contains("Number of phrases: 5"));
    }

    #[test]
    fn widest_bin_positions_lie_inside_source() {
        let tree = SuffixTree::build(REFERENCE).unwrap();
        let compressed = factorize(&tree, SOURCE, 1).unwrap();
        let (from, to) = widest_bin_positions(&compressed);
        assert!(from < to);
        assert!(to <= SOURCE.len());
    }

    #[test]
    fn oversized_range_is_rejected() {
        let config = MeasureConfig {
            range_length: SOURCE.len() + 1,
            ..seeded()
        };
        assert!(matches!(
            measure(REFERENCE, SOURCE, &config),
            Err(RlzError::InvalidConfiguration(_))
        ));
    }
}
