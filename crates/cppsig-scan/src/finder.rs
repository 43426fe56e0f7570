//! Candidate discovery with jwalk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cppsig_core::{is_archive, is_supported_source, Exclusions, ScanWarning, WarningKind};
use cppsig_extract::Workspace;
use itertools::Itertools;
use jwalk::{Parallelism, WalkDir};
use tracing::debug;

/// Maps on-disk paths to the paths reported to the user.
#[derive(Debug, Clone, Copy)]
pub struct DisplayPaths<'a> {
    root: &'a Path,
    workspace: Option<&'a Workspace>,
}

impl<'a> DisplayPaths<'a> {
    /// Paths relative to the project root.
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            workspace: None,
        }
    }

    /// Also map files unpacked into `workspace`.
    pub fn with_workspace(mut self, workspace: &'a Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Display path of `path`.
    pub fn of(&self, path: &Path) -> PathBuf {
        match self.workspace {
            Some(workspace) => workspace.display_path(self.root, path),
            None => path
                .strip_prefix(self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf()),
        }
    }
}

/// A file selected for fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Root-relative path used for reporting and exclusion matching.
    pub display: PathBuf,
    /// Size in bytes at discovery time.
    pub size: u64,
}

impl FoundFile {
    /// Check if this file is an archive.
    pub fn is_archive(&self) -> bool {
        is_archive(&self.path)
    }
}

/// Files found under one directory.
#[derive(Debug, Default)]
pub struct FindOutcome {
    /// Candidates, sorted by path.
    pub files: Vec<FoundFile>,
    /// Entries that could not be read.
    pub warnings: Vec<ScanWarning>,
    /// Candidates dropped by an exclusion pattern or the policy file.
    pub excluded: usize,
    /// Candidates at or above the size ceiling.
    pub oversize: usize,
}

/// Walks a directory for C/C++ sources and archives.
pub struct FileFinder<'a> {
    exclusions: &'a Exclusions,
    max_file_size: u64,
    threads: usize,
}

impl<'a> FileFinder<'a> {
    /// Create a finder. `threads == 0` walks on the global rayon pool.
    pub fn new(exclusions: &'a Exclusions, max_file_size: u64, threads: usize) -> Self {
        Self {
            exclusions,
            max_file_size,
            threads,
        }
    }

    /// Collect candidates below `dir`, reporting them through `paths`.
    pub fn find(&self, dir: &Path, paths: DisplayPaths<'_>) -> FindOutcome {
        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(dir)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false);

        let mut outcome = FindOutcome::default();
        let mut files = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    outcome.warnings.push(ScanWarning::new(
                        paths.of(&path),
                        err.to_string(),
                        WarningKind::ReadError,
                    ));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !is_supported_source(&path) && !is_archive(&path) {
                continue;
            }

            let shown = paths.of(&path);
            if self.exclusions.is_excluded(&shown) {
                debug!(path = %shown.display(), "Skipping excluded file");
                outcome.excluded += 1;
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    outcome.warnings.push(ScanWarning::new(
                        shown,
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    continue;
                }
            };

            if size >= self.max_file_size {
                debug!(path = %shown.display(), size, "Skipping file over size limit");
                outcome.oversize += 1;
                continue;
            }

            files.push(FoundFile {
                path,
                display: shown,
                size,
            });
        }

        outcome.files = files
            .into_iter()
            .sorted_by(|a, b| a.path.cmp(&b.path))
            .collect();
        outcome
    }
}
