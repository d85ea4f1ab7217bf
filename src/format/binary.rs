use std::io::{self, ErrorKind, Read, Write};

use super::{to_i32, FormatError};
use crate::factorize::CompressedSource;

/// Upper bound on speculative allocation driven by header counts.
const MAX_PREALLOCATED: usize = 1 << 20;

/// Write the fixed-order binary layout.
pub fn write_binary<W: Write>(
    compressed: &CompressedSource,
    writer: &mut W,
) -> Result<(), FormatError> {
    let bin_starts = compressed.bins().starts();
    writer.write_all(&to_i32(compressed.len())?.to_le_bytes())?;
    writer.write_all(&to_i32(bin_starts.len())?.to_le_bytes())?;
    for &start in compressed.starts() {
        writer.write_all(&to_i32(start)?.to_le_bytes())?;
    }
    for &cum_len in compressed.cum_lens() {
        writer.write_all(&to_i32(cum_len)?.to_le_bytes())?;
    }
    for &bin_start in bin_starts {
        writer.write_all(&to_i32(bin_start)?.to_le_bytes())?;
    }
    writer.write_all(compressed.mismatches())?;
    Ok(())
}

/// Read the fixed-order binary layout, restoring the stored bin partition.
pub fn read_binary<R: Read>(mut reader: R) -> Result<CompressedSource, FormatError> {
    let len = read_count(&mut reader, "entry count")?;
    let num_bins = read_count(&mut reader, "bin count")?;
    if len == 0 || num_bins == 0 {
        return Err(FormatError::InvalidHeader(format!(
            "{len} entries and {num_bins} bins"
        )));
    }

    let starts = read_array(&mut reader, len, "starts")?;
    let cum_lens = read_array(&mut reader, len, "cumulative lengths")?;
    let bin_starts = read_array(&mut reader, num_bins, "bin starts")?;

    let mut mismatches = vec![0u8; len];
    reader
        .read_exact(&mut mismatches)
        .map_err(|err| truncated(err, "literals"))?;

    let trailing = io::copy(&mut reader, &mut io::sink())?;
    if trailing > 0 {
        return Err(FormatError::TrailingBytes(trailing as usize));
    }

    Ok(CompressedSource::from_parts_with_bins(
        starts, cum_lens, mismatches, bin_starts,
    )?)
}

fn read_i32<R: Read>(reader: &mut R, section: &'static str) -> Result<i32, FormatError> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|err| truncated(err, section))?;
    Ok(i32::from_le_bytes(buf))
}

fn read_count<R: Read>(reader: &mut R, section: &'static str) -> Result<usize, FormatError> {
    let value = read_i32(reader, section)?;
    usize::try_from(value)
        .map_err(|_| FormatError::InvalidHeader(format!("negative {section}: {value}")))
}

fn read_array<R: Read>(
    reader: &mut R,
    count: usize,
    section: &'static str,
) -> Result<Vec<usize>, FormatError> {
    let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let value = read_i32(reader, section)?;
        let value = usize::try_from(value).map_err(|_| {
            FormatError::InvalidHeader(format!("negative value {value} in {section}"))
        })?;
        values.push(value);
    }
    Ok(values)
}

fn truncated(err: io::Error, section: &'static str) -> FormatError {
    if err.kind() == ErrorKind::UnexpectedEof {
        FormatError::Truncated { section }
    } else {
        FormatError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::{BinError, BinIndex};
    use crate::factorize::{factorize, FactorizeError};
    use crate::suffix_tree::SuffixTree;

    fn sample() -> CompressedSource {
        let tree = SuffixTree::build(b"CATTAGA$").unwrap();
        factorize(&tree, b"CATTACATTAGAGACATTAGAGA$", 2).unwrap()
    }

    #[test]
    fn header_and_sections_follow_fixed_order() {
        let compressed = sample();
        let mut bytes = Vec::new();
        write_binary(&compressed, &mut bytes).unwrap();

        let len = compressed.len();
        let bins = compressed.bins().num_bins();
        assert_eq!(bytes.len(), 8 + 4 * (2 * len + bins) + len);
        assert_eq!(&bytes[0..4], &(len as i32).to_le_bytes());
        assert_eq!(&bytes[4..8], &(bins as i32).to_le_bytes());
        assert_eq!(&bytes[bytes.len() - len..], compressed.mismatches());
    }

    #[test]
    fn stored_partition_is_restored_as_written() {
        // Two entries per bin: a default rebuild would use one bin per entry.
        let compressed = sample();
        let mut bytes = Vec::new();
        write_binary(&compressed, &mut bytes).unwrap();

        let restored = read_binary(bytes.as_slice()).unwrap();
        let rebuilt = BinIndex::with_bin_factor(compressed.cum_lens(), 1).unwrap();
        assert_eq!(restored.bins(), compressed.bins());
        assert_ne!(restored.bins(), &rebuilt);
        assert_eq!(restored, compressed);
    }

    #[test]
    fn partition_missing_keys_is_rejected() {
        let compressed = sample();
        let mut bytes = Vec::new();
        write_binary(&compressed, &mut bytes).unwrap();

        // Push every bucket but the first onto the last entry.
        let len = compressed.len();
        let bins = compressed.bins().num_bins();
        let bin_section = 8 + 8 * len;
        let last_entry = (len as i32 - 1).to_le_bytes();
        for chunk in bytes[bin_section + 4..bin_section + 4 * bins].chunks_mut(4) {
            chunk.copy_from_slice(&last_entry);
        }

        assert!(matches!(
            read_binary(bytes.as_slice()),
            Err(FormatError::Inconsistent(FactorizeError::Bins(
                BinError::InvalidBinStarts { .. }
            )))
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let compressed = sample();
        let mut bytes = Vec::new();
        write_binary(&compressed, &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            read_binary(bytes.as_slice()),
            Err(FormatError::Truncated { section: "literals" })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let compressed = sample();
        let mut bytes = Vec::new();
        write_binary(&compressed, &mut bytes).unwrap();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            read_binary(bytes.as_slice()),
            Err(FormatError::TrailingBytes(3))
        ));
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        assert!(matches!(
            read_binary(bytes.as_slice()),
            Err(FormatError::InvalidHeader(_))
        ));
    }
}
