//! Bounded read-and-sign fan-out.

use cppsig_core::{ScanWarning, SignatureOptions, SignatureResult, WorkerPool};
use cppsig_extract::display_string;
use cppsig_hash::Signer;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::finder::FoundFile;
use crate::progress::{ProgressTracker, ScanPhase, ScanProgress};

/// A progress snapshot is broadcast after this many files.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// What happened to one candidate.
enum FileOutcome {
    Signed(SignatureResult),
    Empty,
    Failed(ScanWarning),
}

/// Signatures and per-file problems from one pipeline run.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// One entry per non-empty, readable file, in no particular order.
    pub signatures: Vec<SignatureResult>,
    /// Files that could not be read.
    pub warnings: Vec<ScanWarning>,
    /// Files skipped because they were empty.
    pub empty_files: usize,
}

/// Reads and signs candidates on a [`WorkerPool`].
///
/// Each file is read exactly once, by the worker that signs it, so the
/// number of open files and resident buffers never exceeds the pool size.
pub struct SignaturePipeline<'a> {
    pool: &'a WorkerPool,
    signer: Signer,
    progress_tx: Option<&'a broadcast::Sender<ScanProgress>>,
}

impl<'a> SignaturePipeline<'a> {
    /// Create a pipeline computing `options` on `pool`.
    pub fn new(pool: &'a WorkerPool, options: SignatureOptions) -> Self {
        Self {
            pool,
            signer: Signer::with_options(options),
            progress_tx: None,
        }
    }

    /// Broadcast progress while running.
    pub fn with_progress(mut self, progress_tx: &'a broadcast::Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Sign every candidate. One file's failure never stops the others.
    pub fn run(&self, candidates: Vec<FoundFile>) -> PipelineOutput {
        let tracker = ProgressTracker::new(std::time::Instant::now(), candidates.len() as u64);

        let outcomes = self.pool.map(candidates, |file| {
            let outcome = self.process(&file);
            if matches!(outcome, FileOutcome::Failed(_)) {
                tracker.record_error();
            }
            let count = tracker.record_file(file.size);
            if let Some(tx) = self.progress_tx.filter(|_| count % PROGRESS_INTERVAL == 0) {
                // No receivers is fine.
                let _ = tx.send(tracker.snapshot(ScanPhase::Hashing, file.display.clone()));
            }
            outcome
        });

        let mut output = PipelineOutput::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Signed(result) => output.signatures.push(result),
                FileOutcome::Empty => output.empty_files += 1,
                FileOutcome::Failed(warning) => output.warnings.push(warning),
            }
        }
        output
    }

    fn process(&self, file: &FoundFile) -> FileOutcome {
        match self.signer.sign_file(&file.path, display_string(&file.display)) {
            Ok(Some(result)) => FileOutcome::Signed(result),
            Ok(None) => {
                debug!(path = %file.display.display(), "Skipping empty file");
                FileOutcome::Empty
            }
            Err(err) => {
                warn!(path = %file.display.display(), error = %err, "Failed to read file");
                FileOutcome::Failed(ScanWarning::read_error(&file.display, &err))
            }
        }
    }
}
