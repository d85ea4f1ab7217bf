//! Sequence loading for references and sources.
//!
//! Inputs are read as raw bytes. FASTA files (first byte `>`) have their
//! header lines and line breaks removed; anything else is kept verbatim
//! apart from a single trailing line break. A terminator is appended to
//! every sequence, and references additionally receive a run of padding
//! symbols so that sources containing that symbol stay representable.

use std::fs;
use std::path::Path;

use crate::CompressionConfig;
use tracing::debug;

/// Which side of the compression a sequence plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceRole {
    /// Indexed sequence; receives padding before its terminator.
    Reference,
    /// Sequence to compress; receives only the terminator.
    Source,
}

/// Read `path` and prepare it for `role`.
pub fn read_sequence<P: AsRef<Path>>(
    path: P,
    role: SequenceRole,
    config: &CompressionConfig,
) -> std::io::Result<Vec<u8>> {
    let raw = fs::read(path.as_ref())?;
    let sequence = prepare_sequence(&raw, role, config);
    debug!(
        path = %path.as_ref().display(),
        raw_len = raw.len(),
        len = sequence.len(),
        "sequence loaded"
    );
    Ok(sequence)
}

/// Clean `raw` and append padding (references only) and the terminator.
pub fn prepare_sequence(raw: &[u8], role: SequenceRole, config: &CompressionConfig) -> Vec<u8> {
    let mut sequence = if raw.first() == Some(&b'>') {
        strip_fasta(raw)
    } else {
        trim_line_break(raw).to_vec()
    };

    if role == SequenceRole::Reference {
        sequence.extend(std::iter::repeat(config.padding_symbol).take(config.reference_padding));
    }
    sequence.push(config.terminator);
    sequence
}

/// Write a decompressed source, dropping the terminator added at load time.
pub fn write_sequence<P: AsRef<Path>>(
    path: P,
    sequence: &[u8],
    config: &CompressionConfig,
) -> std::io::Result<()> {
    let body = match sequence.split_last() {
        Some((&last, body)) if last == config.terminator => body,
        _ => sequence,
    };
    fs::write(path, body)
}

fn strip_fasta(raw: &[u8]) -> Vec<u8> {
    raw.split(|&byte| byte == b'\n')
        .filter(|line| line.first() != Some(&b'>'))
        .flat_map(|line| line.iter().copied().filter(|byte| !byte.is_ascii_whitespace()))
        .collect()
}

fn trim_line_break(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
