//! Project scanning for cppsig.
//!
//! This crate walks a C/C++ project, unpacks nested archives and computes a
//! signature for every source file it finds.
//!
//! # Overview
//!
//! - **Parallel discovery** via jwalk
//! - **Nested archives** unpacked level by level into a temporary workspace
//! - **Bounded hashing** on a fixed-size worker pool
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use cppsig_scan::{ScanConfig, SignatureScanner};
//!
//! let config = ScanConfig::new("/path/to/project");
//! let scanner = SignatureScanner::new();
//! let report = scanner.scan(&config).unwrap();
//!
//! for signature in &report.signatures {
//!     println!("{} ({} bytes)", signature.path, signature.size);
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use cppsig_scan::SignatureScanner;
//!
//! let scanner = SignatureScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("{:?}: {} files hashed", progress.phase, progress.files_hashed);
//!     }
//! });
//! ```

mod finder;
mod pipeline;
mod progress;
mod report;
mod scanner;

pub use finder::{DisplayPaths, FileFinder, FindOutcome, FoundFile};
pub use pipeline::{PipelineOutput, SignaturePipeline, PROGRESS_INTERVAL};
pub use progress::{ScanPhase, ScanProgress};
pub use report::{ScanAnalytics, ScanReport};
pub use scanner::SignatureScanner;

// Re-export core types for convenience
pub use cppsig_core::{
    Exclusions, FullFileHash, HashAlgorithm, HashFormat, ScanConfig, ScanConfigBuilder,
    ScanError, ScanWarning, SignatureOptions, SignatureResult, WarningKind,
};
pub use cppsig_extract::{ArchiveOutcome, ExtractionReport};
