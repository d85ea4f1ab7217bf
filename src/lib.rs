//! # Relative Lempel-Ziv compression with interpolation-search access
//!
//! Compresses a sequence (typically a genome) against a similar reference
//! and answers point and range queries on the compressed form without
//! decompressing it.
//!
//! ## Pipeline
//!
//! 1. **Suffix tree**: Ukkonen construction over the reference, linear time
//! 2. **Factorization**: greedy longest-match parse of the source into
//!    phrases `(reference start, copied length, literal)`
//! 3. **Bins**: interpolation buckets over the cumulative phrase lengths
//! 4. **Access**: predecessor query picks the phrase, then one byte is read
//!    from the reference or the phrase literal
//!
//! ## Usage Example
//!
//! ```
//! use isrlz::{CompressionConfig, Compressor};
//!
//! let reference = b"CATTAGA$";
//! let compressor = Compressor::new(reference, CompressionConfig::default())?;
//! let compressed = compressor.compress(b"CATTACATTAGAGACATTAGAGA$")?;
//!
//! assert_eq!(compressor.access(&compressed, 5)?, b'C');
//! assert_eq!(compressor.access_range(&compressed, 9, 10)?, b"AGAGACATTA");
//! assert_eq!(compressor.decompress(&compressed)?, b"CATTACATTAGAGACATTAGAGA$");
//! # Ok::<(), isrlz::RlzError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod access;
pub mod alphabet;
pub mod bins;
pub mod factorize;
pub mod format;
pub mod io;
pub mod measures;
pub mod suffix_tree;

pub use access::{access, access_range, access_range_with, access_with, decompress, AccessError};
pub use alphabet::{AlphabetError, AlphabetMap};
pub use bins::{BinError, BinIndex, BinView, BinarySearch, Predecessor};
pub use factorize::{factorize, CompressedSource, FactorizeError, Phrase};
pub use format::{FormatError, Layout};
pub use suffix_tree::{Match, SuffixTree, SuffixTreeError};

use thiserror::Error;
use tracing::info;

/// Default number of padding symbols appended to a reference.
pub const DEFAULT_REFERENCE_PADDING: usize = 30;

/// Configuration parameters for compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Entries per bin; `numBins = ceil(entries / bin_factor)`.
    pub bin_factor: usize,

    /// Byte appended to references and sources when loading them.
    pub terminator: u8,

    /// Number of padding symbols appended to a reference before its terminator.
    pub reference_padding: usize,

    /// Symbol used for reference padding.
    pub padding_symbol: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            bin_factor: 1,
            terminator: b'$',
            reference_padding: DEFAULT_REFERENCE_PADDING,
            padding_symbol: b'N',
        }
    }
}

impl CompressionConfig {
    /// Configuration with an explicit bin factor.
    pub fn with_bin_factor(bin_factor: usize) -> Result<Self, RlzError> {
        Self::default().bin_factor(bin_factor)
    }

    /// Set the bin factor (must be positive).
    pub fn bin_factor(mut self, bin_factor: usize) -> Result<Self, RlzError> {
        if bin_factor == 0 {
            return Err(RlzError::InvalidConfiguration(
                "bin factor must be > 0".to_string(),
            ));
        }
        self.bin_factor = bin_factor;
        Ok(self)
    }

    /// Set the terminator byte.
    pub fn with_terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Set the reference padding run.
    pub fn with_reference_padding(mut self, symbol: u8, count: usize) -> Self {
        self.padding_symbol = symbol;
        self.reference_padding = count;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), RlzError> {
        if self.bin_factor == 0 {
            return Err(RlzError::InvalidConfiguration(
                "bin factor must be > 0".to_string(),
            ));
        }
        if self.reference_padding > 0 && self.padding_symbol == self.terminator {
            return Err(RlzError::InvalidConfiguration(
                "padding symbol must differ from the terminator".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur anywhere in the compression pipeline.
#[derive(Error, Debug)]
pub enum RlzError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Suffix tree construction failed.
    #[error(transparent)]
    SuffixTree(#[from] SuffixTreeError),

    /// Factorization failed.
    #[error(transparent)]
    Factorize(#[from] FactorizeError),

    /// Access or decompression failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Reading or writing a persisted layout failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Compression session bound to one reference.
///
/// Builds the suffix tree once and reuses it for every source compressed
/// against the same reference.
#[derive(Debug)]
pub struct Compressor<'r> {
    reference: &'r [u8],
    tree: SuffixTree,
    config: CompressionConfig,
}

impl<'r> Compressor<'r> {
    /// Index `reference` for compression.
    pub fn new(reference: &'r [u8], config: CompressionConfig) -> Result<Self, RlzError> {
        config.validate()?;
        let tree = SuffixTree::build(reference)?;
        info!(
            reference_len = reference.len(),
            nodes = tree.node_count(),
            "reference indexed"
        );
        Ok(Self {
            reference,
            tree,
            config,
        })
    }

    /// The indexed reference.
    pub fn reference(&self) -> &'r [u8] {
        self.reference
    }

    /// Suffix tree over the reference.
    pub fn tree(&self) -> &SuffixTree {
        &self.tree
    }

    /// Active configuration.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Factorize `source` against the reference.
    pub fn compress(&self, source: &[u8]) -> Result<CompressedSource, RlzError> {
        Ok(factorize(&self.tree, source, self.config.bin_factor)?)
    }

    /// Byte at position `pos` of a compressed source.
    pub fn access(&self, compressed: &CompressedSource, pos: usize) -> Result<u8, RlzError> {
        Ok(access(self.reference, compressed, pos)?)
    }

    /// `len` bytes from position `pos` of a compressed source.
    pub fn access_range(
        &self,
        compressed: &CompressedSource,
        pos: usize,
        len: usize,
    ) -> Result<Vec<u8>, RlzError> {
        Ok(access_range(self.reference, compressed, pos, len)?)
    }

    /// Full reconstruction of a compressed source.
    pub fn decompress(&self, compressed: &CompressedSource) -> Result<Vec<u8>, RlzError> {
        Ok(decompress(self.reference, compressed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_loader_conventions() {
        let config = CompressionConfig::default();
        assert_eq!(config.bin_factor, 1);
        assert_eq!(config.terminator, b'$');
        assert_eq!(config.reference_padding, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_bin_factor_is_invalid() {
        assert!(matches!(
            CompressionConfig::with_bin_factor(0),
            Err(RlzError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn padding_must_differ_from_terminator() {
        let config = CompressionConfig::default().with_reference_padding(b'$', 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn compressor_reuses_tree_across_sources() {
        let reference = b"ACGTTGCA$";
        let compressor = Compressor::new(reference, CompressionConfig::default()).unwrap();
        for source in [&b"TTGCAACG$"[..], b"GCAGCAGCA$", b"$"] {
            let compressed = compressor.compress(source).unwrap();
            assert_eq!(compressor.decompress(&compressed).unwrap(), source);
        }
    }
}
