//! Scan progress reporting.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Stage of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanPhase {
    /// Walking the project for candidate files.
    Discovering,
    /// Unpacking nested archives into the workspace.
    Extracting,
    /// Computing signatures.
    Hashing,
    /// All signatures computed.
    Complete,
}

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Current stage.
    pub phase: ScanPhase,
    /// Candidate files found so far.
    pub files_found: u64,
    /// Files whose signature has been computed.
    pub files_hashed: u64,
    /// Bytes read by the hashing workers.
    pub bytes_hashed: u64,
    /// Last file handled.
    pub current_path: PathBuf,
    /// Number of warnings encountered.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Discovering,
            files_found: 0,
            files_hashed: 0,
            bytes_hashed: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate hashing rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_hashed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate hashing rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_hashed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters shared by the hashing workers.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_found: u64,
    files_hashed: AtomicU64,
    bytes_hashed: AtomicU64,
    errors_count: AtomicU64,
}

impl ProgressTracker {
    pub fn new(start_time: Instant, files_found: u64) -> Self {
        Self {
            start_time,
            files_found,
            files_hashed: AtomicU64::new(0),
            bytes_hashed: AtomicU64::new(0),
            errors_count: AtomicU64::new(0),
        }
    }

    /// Count one handled file, returning how many were handled before it.
    pub fn record_file(&self, size: u64) -> u64 {
        self.bytes_hashed.fetch_add(size, Ordering::Relaxed);
        self.files_hashed.fetch_add(1, Ordering::Relaxed)
    }

    pub fn record_error(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, phase: ScanPhase, current_path: PathBuf) -> ScanProgress {
        ScanProgress {
            phase,
            files_found: self.files_found,
            files_hashed: self.files_hashed.load(Ordering::Relaxed),
            bytes_hashed: self.bytes_hashed.load(Ordering::Relaxed),
            current_path,
            errors_count: self.errors_count.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let tracker = ProgressTracker::new(Instant::now(), 3);
        assert_eq!(tracker.record_file(10), 0);
        assert_eq!(tracker.record_file(5), 1);
        tracker.record_error();

        let progress = tracker.snapshot(ScanPhase::Hashing, PathBuf::from("a.c"));
        assert_eq!(progress.files_found, 3);
        assert_eq!(progress.files_hashed, 2);
        assert_eq!(progress.bytes_hashed, 15);
        assert_eq!(progress.errors_count, 1);
        assert_eq!(progress.phase, ScanPhase::Hashing);
    }

    #[test]
    fn test_rates_without_elapsed_time() {
        let progress = ScanProgress::new();
        assert_eq!(progress.files_per_second(), 0.0);
        assert_eq!(progress.bytes_per_second(), 0.0);
    }
}
