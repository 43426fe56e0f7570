//! Breadth-first extraction of nested archives.
//!
//! Archives are unpacked one nesting level at a time. Archives found inside
//! level `n` form level `n + 1`; extraction stops once the configured depth
//! limit is reached, and anything still queued at that point is left packed
//! so the scanner hashes it as an opaque file.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use cppsig_core::{is_archive, ArchiveKind, Exclusions, ScanWarning, WorkerPool};
use flate2::read::GzDecoder;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::ExtractError;
use crate::workspace::{display_string, Workspace};

/// What happened to one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Unpacked; `entries` regular files were written.
    Extracted { entries: usize },
    /// Unpacking failed and the archive is treated as an ordinary file.
    Failed(String),
    /// Found below the depth limit and left packed.
    DepthExceeded,
}

/// Per-archive outcomes of one extraction run, in discovery order.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    outcomes: IndexMap<PathBuf, ArchiveOutcome>,
    warnings: Vec<ScanWarning>,
    levels: u32,
}

impl ExtractionReport {
    /// Report for archives that were never unpacked because extraction is
    /// disabled.
    pub fn depth_exceeded(archives: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut report = Self::default();
        for archive in archives {
            report.record(archive, ArchiveOutcome::DepthExceeded);
        }
        report
    }

    fn record(&mut self, archive: PathBuf, outcome: ArchiveOutcome) {
        self.outcomes.insert(archive, outcome);
    }

    /// Outcome for an archive, if it was seen.
    pub fn outcome(&self, archive: &Path) -> Option<&ArchiveOutcome> {
        self.outcomes.get(archive)
    }

    /// Whether the archive's contents now stand in for it.
    pub fn is_extracted(&self, archive: &Path) -> bool {
        matches!(self.outcome(archive), Some(ArchiveOutcome::Extracted { .. }))
    }

    /// Archives that were unpacked successfully.
    pub fn extracted(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ArchiveOutcome::Extracted { .. }))
            .map(|(path, _)| path.as_path())
    }

    /// All archives with their outcomes.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ArchiveOutcome)> {
        self.outcomes.iter().map(|(path, outcome)| (path.as_path(), outcome))
    }

    pub fn extracted_count(&self) -> usize {
        self.extracted().count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, ArchiveOutcome::Failed(_)))
            .count()
    }

    pub fn depth_exceeded_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, ArchiveOutcome::DepthExceeded))
            .count()
    }

    /// Number of nesting levels that were unpacked.
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Take ownership of the warnings.
    pub fn take_warnings(&mut self) -> Vec<ScanWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Result of unpacking a single archive (or one zip chunk).
#[derive(Debug, Default)]
struct Unpacked {
    entries: usize,
    children: Vec<PathBuf>,
}

impl Unpacked {
    fn merge(&mut self, other: Unpacked) {
        self.entries += other.entries;
        self.children.extend(other.children);
    }

    fn add_file(&mut self, written: PathBuf) {
        self.entries += 1;
        if is_archive(&written) {
            self.children.push(written);
        }
    }
}

/// Unpacks archives into a [`Workspace`].
pub struct Extractor<'a> {
    root: &'a Path,
    workspace: &'a Workspace,
    pool: &'a WorkerPool,
    exclusions: &'a Exclusions,
    depth_limit: u32,
}

impl<'a> Extractor<'a> {
    /// Create an extractor.
    ///
    /// `pool` bounds how many zip entry chunks are written at once;
    /// `exclusions` are matched against display paths of archive entries.
    pub fn new(
        root: &'a Path,
        workspace: &'a Workspace,
        pool: &'a WorkerPool,
        exclusions: &'a Exclusions,
        depth_limit: u32,
    ) -> Self {
        Self {
            root,
            workspace,
            pool,
            exclusions,
            depth_limit,
        }
    }

    /// Extract `archives` and everything nested in them up to the depth
    /// limit. Failures are recorded per archive and never stop the run.
    pub fn extract_all(&self, archives: Vec<PathBuf>) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        let mut level: IndexSet<PathBuf> = archives.into_iter().collect();
        let mut depth = 0;

        while !level.is_empty() {
            if depth >= self.depth_limit {
                debug!(
                    depth,
                    remaining = level.len(),
                    "Extraction depth limit reached"
                );
                for archive in level {
                    report.record(archive, ArchiveOutcome::DepthExceeded);
                }
                break;
            }

            let mut next = IndexSet::new();
            for archive in level {
                match self.extract_one(&archive) {
                    Ok(unpacked) => {
                        debug!(
                            archive = %archive.display(),
                            depth,
                            entries = unpacked.entries,
                            "Archive extracted"
                        );
                        debug_assert!(unpacked
                            .children
                            .iter()
                            .all(|child| self.workspace.contains(child)));
                        next.extend(unpacked.children);
                        report.record(
                            archive,
                            ArchiveOutcome::Extracted {
                                entries: unpacked.entries,
                            },
                        );
                    }
                    Err(err) => {
                        let shown = self.workspace.display_path(self.root, &archive);
                        warn!(archive = %shown.display(), error = %err, "Failed to extract archive");
                        self.discard_target(&archive);
                        report
                            .warnings
                            .push(ScanWarning::archive_error(shown, err.to_string()));
                        report.record(archive, ArchiveOutcome::Failed(err.to_string()));
                    }
                }
            }

            depth += 1;
            report.levels = depth;
            level = next;
        }

        info!(
            extracted = report.extracted_count(),
            failed = report.failed_count(),
            depth_exceeded = report.depth_exceeded_count(),
            "Archive extraction finished"
        );
        report
    }

    fn extract_one(&self, archive: &Path) -> Result<Unpacked, ExtractError> {
        let kind = ArchiveKind::from_path(archive).ok_or_else(|| ExtractError::Unsupported {
            path: archive.to_path_buf(),
        })?;

        let target = self.workspace.target_dir(self.root, archive);
        if !self
            .workspace
            .is_link_free(&target)
            .map_err(|e| ExtractError::io(&target, e))?
        {
            return Err(ExtractError::Escape { path: target });
        }
        fs::create_dir_all(&target).map_err(|e| ExtractError::io(&target, e))?;
        let shown = self.workspace.display_path(self.root, archive);

        match kind {
            ArchiveKind::Zip => self.unpack_zip(archive, &target, &shown),
            ArchiveKind::Tar | ArchiveKind::TarGz => {
                self.unpack_tar(archive, kind, &target, &shown)
            }
        }
    }

    /// Drop whatever a failed archive left behind so it is not hashed twice.
    fn discard_target(&self, archive: &Path) {
        let target = self.workspace.target_dir(self.root, archive);
        if !target.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&target) {
            debug!(target = %target.display(), error = %e, "Could not remove partial extraction");
        }
    }

    fn is_excluded(&self, archive_display: &Path, entry: &Path) -> bool {
        let shown = archive_display.join(entry);
        let excluded = self.exclusions.is_excluded(&shown);
        if excluded {
            debug!(entry = %display_string(&shown), "Skipping excluded archive entry");
        }
        excluded
    }

    fn unpack_tar(
        &self,
        archive: &Path,
        kind: ArchiveKind,
        target: &Path,
        shown: &Path,
    ) -> Result<Unpacked, ExtractError> {
        let file = File::open(archive).map_err(|e| ExtractError::io(archive, e))?;
        let reader: Box<dyn Read> = match kind {
            ArchiveKind::TarGz => Box::new(GzDecoder::new(BufReader::new(file))),
            _ => Box::new(BufReader::new(file)),
        };

        let mut tar = tar::Archive::new(reader);
        let mut unpacked = Unpacked::default();

        for entry in tar.entries().map_err(|e| ExtractError::tar(archive, e))? {
            let mut entry = entry.map_err(|e| ExtractError::tar(archive, e))?;
            let name = entry
                .path()
                .map_err(|e| ExtractError::tar(archive, e))?
                .into_owned();

            let Some(relative) = entry_relative_path(&name) else {
                debug!(entry = %name.display(), "Skipping archive entry outside its root");
                continue;
            };

            if self.is_excluded(shown, &relative) {
                continue;
            }

            // Links are never written; the finder does not follow them either.
            let entry_type = entry.header().entry_type();
            if !entry_type.is_file() && !entry_type.is_dir() {
                debug!(entry = %name.display(), ?entry_type, "Skipping non-regular archive entry");
                continue;
            }

            // `unpack_in` refuses entries that would escape `target`.
            let inside = entry
                .unpack_in(target)
                .map_err(|e| ExtractError::tar(archive, e))?;
            if !inside {
                debug!(entry = %name.display(), "Skipping archive entry outside its root");
                continue;
            }
            if entry_type.is_file() {
                unpacked.add_file(target.join(&relative));
            }
        }

        Ok(unpacked)
    }

    fn unpack_zip(
        &self,
        archive: &Path,
        target: &Path,
        shown: &Path,
    ) -> Result<Unpacked, ExtractError> {
        let len = open_zip(archive)?.len();
        let mut unpacked = Unpacked::default();

        let results = self.pool.map(zip_chunks(len, self.pool.threads()), |range| {
            self.unpack_zip_chunk(archive, target, shown, range)
        });
        for result in results {
            unpacked.merge(result?);
        }

        Ok(unpacked)
    }

    /// Unpack a contiguous run of entries through its own archive handle.
    fn unpack_zip_chunk(
        &self,
        archive: &Path,
        target: &Path,
        shown: &Path,
        range: Range<usize>,
    ) -> Result<Unpacked, ExtractError> {
        let mut zip = open_zip(archive)?;
        let mut unpacked = Unpacked::default();

        for index in range {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| ExtractError::zip(archive, e))?;
            let Some(name) = entry.enclosed_name() else {
                debug!(entry = entry.name(), "Skipping archive entry outside its root");
                continue;
            };

            if self.is_excluded(shown, &name) {
                continue;
            }

            let out = target.join(&name);
            if entry.is_dir() {
                fs::create_dir_all(&out).map_err(|e| ExtractError::io(&out, e))?;
                continue;
            }
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
            }
            let mut file = File::create(&out).map_err(|e| ExtractError::io(&out, e))?;
            io::copy(&mut entry, &mut file).map_err(|e| ExtractError::io(&out, e))?;
            unpacked.add_file(out);
        }

        Ok(unpacked)
    }
}

/// Where `unpack_in` places an entry below its target: root, prefix and `.`
/// components are dropped. `None` when the name climbs out with `..` or is
/// empty.
fn entry_relative_path(name: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => return None,
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

fn open_zip(archive: &Path) -> Result<ZipArchive<BufReader<File>>, ExtractError> {
    let file = File::open(archive).map_err(|e| ExtractError::io(archive, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::zip(archive, e))
}

/// Split `len` entries into at most `max_chunks` contiguous ranges.
fn zip_chunks(len: usize, max_chunks: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let size = len.div_ceil(max_chunks.max(1));
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}
