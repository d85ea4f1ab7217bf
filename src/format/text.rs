use std::io::{BufRead, Write};

use super::FormatError;
use crate::factorize::CompressedSource;

/// Write the text layout: entry count, then `start cumulative_length literal`
/// per entry with the literal as its decimal byte value.
pub fn write_text<W: Write>(
    compressed: &CompressedSource,
    writer: &mut W,
) -> Result<(), FormatError> {
    writeln!(writer, "{}", compressed.len())?;
    let rows = compressed
        .starts()
        .iter()
        .zip(compressed.cum_lens())
        .zip(compressed.mismatches());
    for ((start, cum_len), mismatch) in rows {
        writeln!(writer, "{start} {cum_len} {mismatch}")?;
    }
    Ok(())
}

/// Read the text layout and partition the boundaries with
/// `ceil(len / bin_factor)` bins.
pub fn read_text<R: BufRead>(
    reader: R,
    bin_factor: usize,
) -> Result<CompressedSource, FormatError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()));

    let (line_no, header) = lines
        .next()
        .ok_or(FormatError::Truncated { section: "header" })?;
    let len: usize = parse_field(header?.trim(), line_no, "entry count")?;
    if len == 0 {
        return Err(FormatError::InvalidHeader("zero entries".to_string()));
    }

    let mut starts = Vec::with_capacity(len);
    let mut cum_lens = Vec::with_capacity(len);
    let mut mismatches = Vec::with_capacity(len);
    for _ in 0..len {
        let (line_no, line) = lines
            .next()
            .ok_or(FormatError::Truncated { section: "entries" })?;
        let line = line?;
        let mut fields = line.split_whitespace();
        let mut next_field = |name: &str| {
            fields.next().ok_or_else(|| FormatError::Parse {
                line: line_no,
                message: format!("missing {name}"),
            })
        };
        starts.push(parse_field(next_field("start")?, line_no, "start")?);
        cum_lens.push(parse_field(
            next_field("cumulative length")?,
            line_no,
            "cumulative length",
        )?);
        mismatches.push(parse_field(next_field("literal")?, line_no, "literal")?);
    }

    if let Some((line_no, _)) = lines.next() {
        return Err(FormatError::Parse {
            line: line_no,
            message: format!("more than the {len} declared entries"),
        });
    }

    Ok(CompressedSource::from_parts(
        starts, cum_lens, mismatches, bin_factor,
    )?)
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line: usize,
    name: &str,
) -> Result<T, FormatError> {
    field.parse().map_err(|_| FormatError::Parse {
        line,
        message: format!("invalid {name} '{field}'"),
    })
}
