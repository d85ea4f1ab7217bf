use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use isrlz::format::{self, Layout};
use isrlz::io::{read_sequence, write_sequence, SequenceRole};
use isrlz::measures::{measure, MeasureConfig};
use isrlz::{CompressionConfig, Compressor, DEFAULT_REFERENCE_PADDING};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "isrlz",
    version,
    about = "Relative Lempel-Ziv compression with interpolation-search random access"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a source against a reference.
    Compress {
        /// Reference sequence (raw text or FASTA).
        reference: PathBuf,
        /// Source sequence to compress.
        source: PathBuf,
        /// Output file for the compressed source.
        output: PathBuf,
        #[command(flatten)]
        options: SharedOptions,
    },
    /// Restore a compressed source to its original text.
    Decompress {
        /// Reference used at compression time.
        reference: PathBuf,
        /// Compressed source file.
        compressed: PathBuf,
        /// Output file for the restored source.
        output: PathBuf,
        #[command(flatten)]
        options: SharedOptions,
    },
    /// Read one position (or a range) of a compressed source.
    Access {
        /// Reference used at compression time.
        reference: PathBuf,
        /// Compressed source file.
        compressed: PathBuf,
        /// Source position to read.
        index: usize,
        /// Number of bytes to read from `index`.
        #[arg(long, default_value_t = 1)]
        length: usize,
        #[command(flatten)]
        options: SharedOptions,
    },
    /// Compress and report statistics plus access timings.
    Test {
        /// Reference sequence.
        reference: PathBuf,
        /// Source sequence.
        source: PathBuf,
        /// Number of random point queries.
        #[arg(long, default_value_t = 10_000)]
        queries: usize,
        /// Number of random range queries.
        #[arg(long, default_value_t = 1_000)]
        ranges: usize,
        /// Length of each range query.
        #[arg(long, default_value_t = 100)]
        range_length: usize,
        /// Seed for query positions.
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        options: SharedOptions,
    },
}

#[derive(Args, Debug)]
struct SharedOptions {
    /// Entries per bin (1 gives one bin per phrase).
    #[arg(long, default_value_t = 1)]
    bin_factor: usize,
    /// Layout of the compressed file.
    #[arg(long, value_enum, default_value_t = FormatArg::Binary)]
    format: FormatArg,
    /// Number of `N` symbols appended to the reference.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_PADDING)]
    reference_padding: usize,
}

impl SharedOptions {
    fn config(&self) -> Result<CompressionConfig> {
        let config = CompressionConfig::with_bin_factor(self.bin_factor)?;
        let padding_symbol = config.padding_symbol;
        let config = config.with_reference_padding(padding_symbol, self.reference_padding);
        config.validate()?;
        Ok(config)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Binary,
}

impl From<FormatArg> for Layout {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => Layout::Text,
            FormatArg::Binary => Layout::Binary,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("isrlz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            reference,
            source,
            output,
            options,
        } => run_compress(&reference, &source, &output, &options)?,
        Commands::Decompress {
            reference,
            compressed,
            output,
            options,
        } => run_decompress(&reference, &compressed, &output, &options)?,
        Commands::Access {
            reference,
            compressed,
            index,
            length,
            options,
        } => run_access(&reference, &compressed, index, length, &options)?,
        Commands::Test {
            reference,
            source,
            queries,
            ranges,
            range_length,
            seed,
            options,
        } => {
            let measure_config = MeasureConfig {
                bin_factor: options.bin_factor,
                queries,
                ranges,
                range_length,
                seed,
            };
            run_test(&reference, &source, &measure_config, &options)?
        }
    }

    Ok(())
}

fn run_compress(
    reference_path: &Path,
    source_path: &Path,
    output: &Path,
    options: &SharedOptions,
) -> Result<()> {
    let config = options.config()?;
    let reference = load(reference_path, SequenceRole::Reference, &config)?;
    let source = load(source_path, SequenceRole::Source, &config)?;

    let compressor = Compressor::new(&reference, config).context("failed to index reference")?;
    let compressed = compressor
        .compress(&source)
        .with_context(|| format!("failed to compress {}", source_path.display()))?;
    format::save(&compressed, output, options.format.into())
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        phrases = compressed.phrase_count(),
        output = %output.display(),
        "source compressed"
    );
    println!(
        "{} compressed into {} phrases and stored in {}",
        source_path.display(),
        compressed.phrase_count(),
        output.display()
    );
    Ok(())
}

fn run_decompress(
    reference_path: &Path,
    compressed_path: &Path,
    output: &Path,
    options: &SharedOptions,
) -> Result<()> {
    let config = options.config()?;
    let reference = load(reference_path, SequenceRole::Reference, &config)?;
    let compressed = format::load(compressed_path, options.format.into(), config.bin_factor)
        .with_context(|| format!("failed to read {}", compressed_path.display()))?;

    let source = isrlz::decompress(&reference, &compressed)
        .context("compressed source does not match the reference")?;
    write_sequence(output, &source, &config)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("source decompressed into {}", output.display());
    Ok(())
}

fn run_access(
    reference_path: &Path,
    compressed_path: &Path,
    index: usize,
    length: usize,
    options: &SharedOptions,
) -> Result<()> {
    let config = options.config()?;
    let reference = load(reference_path, SequenceRole::Reference, &config)?;
    let compressed = format::load(compressed_path, options.format.into(), config.bin_factor)
        .with_context(|| format!("failed to read {}", compressed_path.display()))?;

    if length == 1 {
        let byte = isrlz::access(&reference, &compressed, index)
            .with_context(|| format!("failed to access position {index}"))?;
        println!("source[{index}] = {}", char::from(byte));
    } else {
        let bytes = isrlz::access_range(&reference, &compressed, index, length)
            .with_context(|| format!("failed to access {length} bytes from {index}"))?;
        println!(
            "source[{index}..{}] = {}",
            index + length,
            String::from_utf8_lossy(&bytes)
        );
    }
    Ok(())
}

fn run_test(
    reference_path: &Path,
    source_path: &Path,
    measure_config: &MeasureConfig,
    options: &SharedOptions,
) -> Result<()> {
    let config = options.config()?;
    let reference = load(reference_path, SequenceRole::Reference, &config)?;
    let source = load(source_path, SequenceRole::Source, &config)?;

    let report = measure(&reference, &source, measure_config).context("measurement failed")?;
    println!("{report}");
    Ok(())
}

fn load(path: &Path, role: SequenceRole, config: &CompressionConfig) -> Result<Vec<u8>> {
    read_sequence(path, role, config)
        .with_context(|| format!("failed to read sequence from {}", path.display()))
}
