//! Project signature scanner.

use std::path::{Path, PathBuf};
use std::time::Instant;

use cppsig_core::{Exclusions, ScanConfig, ScanError, WorkerPool};
use cppsig_extract::{ExtractionReport, Extractor, Workspace};
use itertools::Itertools;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::finder::{DisplayPaths, FileFinder, FindOutcome};
use crate::pipeline::SignaturePipeline;
use crate::progress::{ScanPhase, ScanProgress};
use crate::report::{ScanAnalytics, ScanReport};

/// Fingerprints every C/C++ source in a project, including files inside
/// nested archives.
pub struct SignatureScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl SignatureScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan the project described by `config`.
    ///
    /// Only configuration problems and an unusable root fail the scan;
    /// unreadable files and broken archives end up in
    /// [`ScanReport::warnings`].
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        config.signature.validate()?;
        if config.max_file_size == 0 {
            return Err(ScanError::invalid_config("Maximum file size must be positive"));
        }

        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;
        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let exclusions = build_exclusions(config, &root_path)?;
        let hash_pool = WorkerPool::new("cppsig-hash", config.hash_concurrency())?;
        let finder = FileFinder::new(&exclusions, config.max_file_size, config.hash_threads);

        info!(root = %root_path.display(), "Scanning project");
        let FindOutcome {
            mut files,
            mut warnings,
            mut excluded,
            mut oversize,
        } = finder.find(&root_path, DisplayPaths::new(&root_path));
        self.send_progress(ScanPhase::Discovering, files.len(), start);

        let archives: Vec<PathBuf> = files
            .iter()
            .filter(|f| f.is_archive())
            .map(|f| f.path.clone())
            .collect();

        // Dropped (and deleted) at the end of the scan, after hashing.
        let mut workspace = None;
        let mut extraction = if archives.is_empty() {
            ExtractionReport::default()
        } else if config.extraction_depth == 0 {
            debug!(archives = archives.len(), "Archive extraction disabled");
            ExtractionReport::depth_exceeded(archives)
        } else {
            self.send_progress(ScanPhase::Extracting, files.len(), start);
            let ws = Workspace::new()?;
            let extract_pool = WorkerPool::new("cppsig-extract", config.extract_concurrency())?;
            let report = Extractor::new(
                &root_path,
                &ws,
                &extract_pool,
                &exclusions,
                config.extraction_depth,
            )
            .extract_all(archives);
            debug!(levels = report.levels(), "Nested archives unpacked");

            let unpacked = finder.find(ws.path(), DisplayPaths::new(&root_path).with_workspace(&ws));
            files.extend(unpacked.files);
            warnings.extend(unpacked.warnings);
            excluded += unpacked.excluded;
            oversize += unpacked.oversize;
            workspace = Some(ws);
            report
        };
        warnings.extend(extraction.take_warnings());

        // Unpacked archives are represented by their contents.
        let files_found = files.len();
        let candidates: Vec<_> = files
            .into_iter()
            .filter(|f| !extraction.is_extracted(&f.path))
            .collect();
        debug!(
            found = files_found,
            candidates = candidates.len(),
            "Hashing candidates"
        );

        let output = SignaturePipeline::new(&hash_pool, config.signature)
            .with_progress(&self.progress_tx)
            .run(candidates);
        warnings.extend(output.warnings);

        let signatures = output
            .signatures
            .into_iter()
            .sorted_by(|a, b| a.path.cmp(&b.path))
            .collect_vec();

        let analytics = ScanAnalytics {
            total_file_signatures: signatures.len(),
            files_found,
            empty_files_skipped: output.empty_files,
            excluded_files: excluded,
            oversize_files_skipped: oversize,
            archives_extracted: extraction.extracted_count(),
            archives_failed: extraction.failed_count(),
            archives_depth_exceeded: extraction.depth_exceeded_count(),
            elapsed: start.elapsed(),
        };
        self.send_progress(ScanPhase::Complete, files_found, start);
        drop(workspace);

        info!(
            signatures = analytics.total_file_signatures,
            warnings = warnings.len(),
            elapsed_ms = analytics.elapsed.as_millis() as u64,
            "Scan finished"
        );

        Ok(ScanReport {
            signatures,
            warnings,
            analytics,
            extraction,
        })
    }

    fn send_progress(&self, phase: ScanPhase, files_found: usize, start: Instant) {
        let _ = self.progress_tx.send(ScanProgress {
            phase,
            files_found: files_found as u64,
            elapsed: start.elapsed(),
            ..ScanProgress::new()
        });
    }
}

impl Default for SignatureScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// User patterns plus the policy file, relative to the canonical root.
fn build_exclusions(config: &ScanConfig, root_path: &Path) -> Result<Exclusions, ScanError> {
    let exclusions = Exclusions::new(&config.exclude_patterns)?;
    let policy = config.policy_path();
    let policy = policy.canonicalize().unwrap_or(policy);

    let relative = policy
        .strip_prefix(root_path)
        .or_else(|_| policy.strip_prefix(&config.root));
    match relative {
        Ok(relative) => Ok(exclusions.with_path(relative)),
        Err(_) => {
            debug!(policy = %policy.display(), "Policy file outside the project root");
            Ok(exclusions)
        }
    }
}
