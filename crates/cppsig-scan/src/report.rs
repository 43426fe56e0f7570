//! Scan results.

use std::time::Duration;

use cppsig_core::{ScanWarning, SignatureResult};
use cppsig_extract::ExtractionReport;
use serde::Serialize;

/// Counters describing one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanAnalytics {
    /// Signatures emitted.
    pub total_file_signatures: usize,
    /// Candidate files found, including archive contents.
    pub files_found: usize,
    /// Candidates skipped because they were empty.
    pub empty_files_skipped: usize,
    /// Candidates dropped by exclusions or the policy file.
    pub excluded_files: usize,
    /// Candidates at or above the size ceiling.
    pub oversize_files_skipped: usize,
    pub archives_extracted: usize,
    pub archives_failed: usize,
    pub archives_depth_exceeded: usize,
    /// Wall-clock duration of the scan.
    pub elapsed: Duration,
}

/// Everything a scan produced.
#[derive(Debug)]
pub struct ScanReport {
    /// Signatures sorted by display path.
    pub signatures: Vec<SignatureResult>,
    /// Non-fatal problems, in the order they were met.
    pub warnings: Vec<ScanWarning>,
    pub analytics: ScanAnalytics,
    /// Per-archive extraction outcomes.
    pub extraction: ExtractionReport,
}

impl ScanReport {
    /// Total bytes covered by the emitted signatures.
    pub fn total_bytes(&self) -> u64 {
        self.signatures.iter().map(|s| s.size).sum()
    }

    /// Check whether the scan hit any non-fatal problem.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
