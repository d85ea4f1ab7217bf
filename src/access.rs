//! Random access and decompression over a [`CompressedSource`].
//!
//! A source position is mapped to its phrase with a predecessor query on the
//! cumulative boundaries, then read either from the reference (copied part)
//! or from the phrase literal (last position of the phrase).

use crate::bins::Predecessor;
use crate::factorize::CompressedSource;
use thiserror::Error;

/// Errors raised by point, range and full reconstruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Requested range falls outside the decompressed source.
    #[error("range [{position}, {position} + {length}) is outside source of length {total}")]
    OutOfBounds {
        /// First requested position.
        position: usize,
        /// Number of requested bytes.
        length: usize,
        /// Length of the decompressed source.
        total: usize,
    },

    /// A phrase points past the end of the supplied reference.
    #[error("phrase {phrase} reads reference offset {offset} but the reference has {reference_len} bytes")]
    ReferenceTooShort {
        /// Phrase that could not be resolved.
        phrase: usize,
        /// Reference offset that was requested.
        offset: usize,
        /// Length of the supplied reference.
        reference_len: usize,
    },
}

/// Byte at source position `pos`, using the bins over the phrase boundaries.
pub fn access(
    reference: &[u8],
    compressed: &CompressedSource,
    pos: usize,
) -> Result<u8, AccessError> {
    access_with(&compressed.boundaries(), reference, compressed, pos)
}

/// Byte at source position `pos`, using any predecessor strategy.
pub fn access_with<P: Predecessor>(
    boundaries: &P,
    reference: &[u8],
    compressed: &CompressedSource,
    pos: usize,
) -> Result<u8, AccessError> {
    check_range(compressed, pos, 1)?;
    let idx = boundaries.predecessor(pos);
    let offset = pos - compressed.cum_lens()[idx];
    byte_at(reference, compressed, idx + 1, offset)
}

/// `len` bytes starting at source position `pos`.
pub fn access_range(
    reference: &[u8],
    compressed: &CompressedSource,
    pos: usize,
    len: usize,
) -> Result<Vec<u8>, AccessError> {
    access_range_with(&compressed.boundaries(), reference, compressed, pos, len)
}

/// `len` bytes starting at source position `pos`, using any predecessor strategy.
///
/// Only the first position costs a predecessor query; the rest of the range
/// is produced by walking phrases forward.
pub fn access_range_with<P: Predecessor>(
    boundaries: &P,
    reference: &[u8],
    compressed: &CompressedSource,
    pos: usize,
    len: usize,
) -> Result<Vec<u8>, AccessError> {
    check_range(compressed, pos, len)?;
    let mut out = Vec::with_capacity(len);
    if len == 0 {
        return Ok(out);
    }

    let cum_lens = compressed.cum_lens();
    let mut phrase = boundaries.predecessor(pos) + 1;
    let mut offset = pos - cum_lens[phrase - 1];
    while out.len() < len {
        let span = cum_lens[phrase] - cum_lens[phrase - 1];
        if offset < span {
            out.push(byte_at(reference, compressed, phrase, offset)?);
            offset += 1;
        } else {
            phrase += 1;
            offset = 0;
        }
    }
    Ok(out)
}

/// Reconstruct the whole source.
pub fn decompress(
    reference: &[u8],
    compressed: &CompressedSource,
) -> Result<Vec<u8>, AccessError> {
    let mut out = Vec::with_capacity(compressed.source_len());
    for (k, phrase) in compressed.phrases().enumerate() {
        let copied = reference
            .get(phrase.start..phrase.start + phrase.length)
            .ok_or(AccessError::ReferenceTooShort {
                phrase: k + 1,
                offset: phrase.start + phrase.length,
                reference_len: reference.len(),
            })?;
        out.extend_from_slice(copied);
        out.push(phrase.mismatch);
    }
    Ok(out)
}

#[inline]
fn byte_at(
    reference: &[u8],
    compressed: &CompressedSource,
    phrase: usize,
    offset: usize,
) -> Result<u8, AccessError> {
    let cum_lens = compressed.cum_lens();
    if offset == cum_lens[phrase] - cum_lens[phrase - 1] - 1 {
        return Ok(compressed.mismatches()[phrase]);
    }
    let at = compressed.starts()[phrase] + offset;
    reference
        .get(at)
        .copied()
        .ok_or(AccessError::ReferenceTooShort {
            phrase,
            offset: at,
            reference_len: reference.len(),
        })
}

fn check_range(compressed: &CompressedSource, pos: usize, len: usize) -> Result<(), AccessError> {
    let total = compressed.source_len();
    match pos.checked_add(len) {
        Some(end) if end <= total => Ok(()),
        _ => Err(AccessError::OutOfBounds {
            position: pos,
            length: len,
            total,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorize::factorize;
    use crate::suffix_tree::SuffixTree;

    const REFERENCE: &[u8] = b"CATTAGA$";
    const SOURCE: &[u8] = b"CATTACATTAGAGACATTAGAGA$";

    fn compressed(bin_factor: usize) -> CompressedSource {
        let tree = SuffixTree::build(REFERENCE).unwrap();
        factorize(&tree, SOURCE, bin_factor).unwrap()
    }

    #[test]
    fn decompress_restores_source() {
        for bin_factor in [1, 2, 5] {
            let compressed = compressed(bin_factor);
            assert_eq!(decompress(REFERENCE, &compressed).unwrap(), SOURCE);
        }
    }

    #[test]
    fn every_position_is_accessible() {
        let compressed = compressed(1);
        for (pos, &expected) in SOURCE.iter().enumerate() {
            assert_eq!(access(REFERENCE, &compressed, pos).unwrap(), expected);
            assert_eq!(
                access_with(&compressed.boundaries_binary(), REFERENCE, &compressed, pos).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn range_from_nine_spans_phrases() {
        let compressed = compressed(1);
        let range = access_range(REFERENCE, &compressed, 9, 10).unwrap();
        assert_eq!(range, &SOURCE[9..19]);
    }

    #[test]
    fn ranges_cross_single_literal_phrases() {
        // A|A G|G T|T C|A $: short phrases and a bare closing literal.
        let reference = b"ACGT$";
        let source = b"AAGGTTCA$";
        let tree = SuffixTree::build(reference).unwrap();
        let compressed = factorize(&tree, source, 1).unwrap();
        for pos in 0..source.len() {
            for len in 0..=source.len() - pos {
                assert_eq!(
                    access_range(reference, &compressed, pos, len).unwrap(),
                    &source[pos..pos + len]
                );
            }
        }
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let compressed = compressed(1);
        let total = SOURCE.len();
        assert!(matches!(
            access(REFERENCE, &compressed, total),
            Err(AccessError::OutOfBounds { .. })
        ));
        assert!(matches!(
            access_range(REFERENCE, &compressed, total - 3, 4),
            Err(AccessError::OutOfBounds { .. })
        ));
        assert_eq!(access_range(REFERENCE, &compressed, total, 0).unwrap(), b"");
    }

    #[test]
    fn short_reference_is_reported() {
        let compressed = compressed(1);
        assert!(matches!(
            decompress(b"CAT", &compressed),
            Err(AccessError::ReferenceTooShort { .. })
        ));
    }
}
