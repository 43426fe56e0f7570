//! cppsig - fingerprints unmanaged C/C++ sources.
//!
//! Usage:
//!   cppsig [PATH]                     Print signatures as JSON
//!   cppsig [PATH] --alt-hash          Add line-ending-flipped digests
//!   cppsig [PATH] --max-depth 2       Limit nested archive extraction
//!   cppsig [PATH] -o sigs.json        Write signatures to a file
//!   cppsig --help                     Show help

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cppsig_core::DEFAULT_EXTRACTION_DEPTH;
use cppsig_scan::{HashAlgorithm, ScanConfig, ScanReport, SignatureOptions, SignatureScanner};

#[derive(Parser)]
#[command(
    name = "cppsig",
    version,
    about = "Fingerprint C/C++ source files, including files inside archives",
    long_about = "cppsig walks a project, unpacks nested archives and prints one \
                  signature per C/C++ source file.\n\n\
                  Signatures are written to stdout as JSON; a summary and any \
                  warnings go to stderr."
)]
struct Cli {
    /// Project to fingerprint (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Levels of nested archives to unpack (0 disables extraction)
    #[arg(short = 'd', long, default_value_t = DEFAULT_EXTRACTION_DEPTH)]
    max_depth: u32,

    /// Glob of project paths to skip (repeatable)
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Policy file that is never fingerprinted (defaults to PATH/.snyk)
    #[arg(long, value_name = "FILE")]
    policy_file: Option<PathBuf>,

    /// Also emit the dub-hash of text files with flipped line endings
    #[arg(long)]
    alt_hash: bool,

    /// Do not emit dub-hash (format 1) entries
    #[arg(long)]
    no_dub_hash: bool,

    /// Do not emit u-hash (format 3) entries
    #[arg(long)]
    no_uhash: bool,

    /// Digest algorithm
    #[arg(long, default_value = "md5")]
    algorithm: String,

    /// Hashing threads (0 = one per CPU)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Archive extraction threads (0 = eight per CPU)
    #[arg(long, default_value_t = 0)]
    extract_threads: usize,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.debug);

    let path = cli.path.canonicalize().context("Invalid path")?;
    let signature = SignatureOptions {
        dub_hash: !cli.no_dub_hash,
        alt_hash: cli.alt_hash,
        u_hash: !cli.no_uhash,
        algorithm: HashAlgorithm::parse(&cli.algorithm)?,
    };

    let config = ScanConfig::builder()
        .root(path)
        .exclude_patterns(cli.exclude)
        .policy_file(cli.policy_file)
        .extraction_depth(cli.max_depth)
        .hash_threads(cli.threads)
        .extract_threads(cli.extract_threads)
        .signature(signature)
        .build()
        .context("Invalid configuration")?;

    eprintln!("Scanning {}...", config.root.display());

    let scanner = SignatureScanner::new();
    let report = scanner.scan(&config).context("Scan failed")?;

    let json = serde_json::to_string_pretty(&report.signatures)?;
    match &cli.output {
        Some(output_path) => {
            std::fs::write(output_path, json)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Signatures written to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    print_summary(&report);

    Ok(())
}

/// Log to stderr so stdout stays valid JSON.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn print_summary(report: &ScanReport) {
    let analytics = &report.analytics;

    for warning in &report.warnings {
        eprintln!("warning: {}: {}", warning.path.display(), warning.message);
    }

    eprintln!(
        "{} signatures ({}) from {} files in {:.2?}",
        analytics.total_file_signatures,
        humansize::format_size(report.total_bytes(), humansize::BINARY),
        analytics.files_found,
        analytics.elapsed,
    );

    if analytics.archives_extracted + analytics.archives_failed + analytics.archives_depth_exceeded
        > 0
    {
        eprintln!(
            "archives: {} extracted, {} failed, {} beyond depth limit",
            analytics.archives_extracted,
            analytics.archives_failed,
            analytics.archives_depth_exceeded,
        );
    }

    let skipped = analytics.empty_files_skipped
        + analytics.excluded_files
        + analytics.oversize_files_skipped;
    if skipped > 0 {
        eprintln!(
            "skipped: {} empty, {} excluded, {} over size limit",
            analytics.empty_files_skipped,
            analytics.excluded_files,
            analytics.oversize_files_skipped,
        );
    }
}
