//! Core types and traits for cppsig.
//!
//! This crate provides the fundamental data structures shared by the
//! hashing, extraction and scanning crates: file buffers, signature
//! records, scan configuration, exclusion globs and bounded worker pools.

mod config;
mod content;
mod error;
mod exclude;
mod formats;
mod pool;
mod signature;

pub use config::{ScanConfig, ScanConfigBuilder, DEFAULT_EXTRACTION_DEPTH};
pub use content::FileContent;
pub use error::{ScanError, ScanWarning, WarningKind};
pub use exclude::Exclusions;
pub use formats::{
    is_archive, is_supported_source, ArchiveKind, ARCHIVE_EXTENSIONS, DEFAULT_POLICY_FILE,
    MAX_SUPPORTED_FILE_SIZE, SUPPORTED_SOURCE_EXTENSIONS,
};
pub use pool::{available_parallelism, WorkerPool, EXTRACT_CONCURRENCY_MULTIPLIER};
pub use signature::{FullFileHash, HashAlgorithm, HashFormat, SignatureOptions, SignatureResult};
