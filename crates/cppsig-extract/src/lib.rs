//! Nested archive extraction for cppsig.
//!
//! Archives found in a project are unpacked into a temporary [`Workspace`],
//! one nesting level at a time, up to a configurable depth. Zip entries are
//! written in parallel through a bounded [`cppsig_core::WorkerPool`]; tar and
//! gzip-compressed tar archives are streamed.
//!
//! Each archive gets its own `<archive>.extracted` directory, so identically
//! named entries in different archives never overwrite each other. Archives
//! that fail to unpack or sit below the depth limit are reported in the
//! [`ExtractionReport`] and left for the scanner to hash as ordinary files.

mod error;
mod extract;
mod workspace;

pub use error::ExtractError;
pub use extract::{ArchiveOutcome, ExtractionReport, Extractor};
pub use workspace::{display_string, Workspace, EXTRACTED_SUFFIX};
