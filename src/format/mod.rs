//! On-disk layouts for a [`CompressedSource`].
//!
//! Two layouts are supported:
//!
//! - **text**: entry count on the first line, then one
//!   `start cumulative_length literal` line per entry (sentinel included);
//!   bins are rebuilt on load from a bin factor.
//! - **binary**: little-endian `i32` entry count and bin count, followed by
//!   the starts, cumulative lengths, bin starts (all `i32`) and the literal
//!   bytes; bins are restored exactly as stored.

mod binary;
mod text;

pub use binary::{read_binary, write_binary};
pub use text::{read_text, write_text};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::factorize::{CompressedSource, FactorizeError};
use thiserror::Error;

/// Errors raised while reading or writing a persisted layout.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended before a section was complete.
    #[error("truncated input while reading {section}")]
    Truncated {
        /// Section being read.
        section: &'static str,
    },

    /// Header counts are negative or otherwise unusable.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Bytes remain after the last section.
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),

    /// A value does not fit the on-disk integer width.
    #[error("value {0} does not fit in a 32-bit field")]
    ValueOverflow(usize),

    /// A text line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Decoded arrays do not form a valid compressed source.
    #[error("inconsistent compressed source: {0}")]
    Inconsistent(#[from] FactorizeError),
}

/// Persisted layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Human-readable text lines.
    Text,
    /// Compact fixed-order binary.
    #[default]
    Binary,
}

/// Write `compressed` to `path` in `layout`.
pub fn save<P: AsRef<Path>>(
    compressed: &CompressedSource,
    path: P,
    layout: Layout,
) -> Result<(), FormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    match layout {
        Layout::Text => write_text(compressed, &mut writer)?,
        Layout::Binary => write_binary(compressed, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Read a compressed source from `path` in `layout`.
///
/// `bin_factor` is only used by the text layout, which does not store bins.
pub fn load<P: AsRef<Path>>(
    path: P,
    layout: Layout,
    bin_factor: usize,
) -> Result<CompressedSource, FormatError> {
    let reader = BufReader::new(File::open(path)?);
    match layout {
        Layout::Text => read_text(reader, bin_factor),
        Layout::Binary => read_binary(reader),
    }
}

pub(crate) fn to_i32(value: usize) -> Result<i32, FormatError> {
    i32::try_from(value).map_err(|_| FormatError::ValueOverflow(value))
}
