//! Compress a mutated copy of a synthetic reference and query it.
//!
//! Run with: `cargo run --release --example compress_roundtrip`

use anyhow::Result;
use isrlz::measures::{measure, MeasureConfig};
use isrlz::{CompressionConfig, Compressor};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("isrlz=info").init();

    let mut reference = Vec::new();
    for i in 0..20_000u32 {
        reference.push(b"ACGT"[(i.wrapping_mul(2_654_435_761) >> 30) as usize]);
    }
    reference.push(b'$');

    let mut source = reference[..reference.len() - 1].to_vec();
    for pos in (0..source.len()).step_by(250) {
        source[pos] = if source[pos] == b'G' { b'T' } else { b'G' };
    }
    source.push(b'$');

    let compressor = Compressor::new(&reference, CompressionConfig::default())?;
    let compressed = compressor.compress(&source)?;
    println!(
        "{} bytes compressed into {} phrases ({} bins, delta {:.2})",
        source.len(),
        compressed.phrase_count(),
        compressed.bins().num_bins(),
        compressed.delta()
    );

    let window = compressor.access_range(&compressed, 1000, 32)?;
    println!("source[1000..1032] = {}", String::from_utf8_lossy(&window));
    assert_eq!(compressor.decompress(&compressed)?, source);

    let report = measure(
        &reference,
        &source,
        &MeasureConfig {
            queries: 1000,
            ranges: 100,
            range_length: 64,
            seed: Some(42),
            ..MeasureConfig::default()
        },
    )?;
    println!("{report}");
    Ok(())
}
