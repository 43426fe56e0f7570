//! Errors raised while unpacking a single archive.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why one archive could not be extracted.
///
/// These never abort a scan: the extractor logs them, records the archive as
/// failed and moves on to its siblings.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the archive or writing an entry failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The zip central directory or an entry is malformed.
    #[error("Invalid zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The tar stream (or its gzip wrapper) is malformed.
    #[error("Invalid tar archive {path}: {source}")]
    Tar {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction directory resolves through a symbolic link.
    #[error("Extraction directory leaves the workspace: {path}")]
    Escape { path: PathBuf },

    /// The file extension names no known archive format.
    #[error("Not a supported archive: {path}")]
    Unsupported { path: PathBuf },
}

impl ExtractError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn zip(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn tar(path: &Path, source: std::io::Error) -> Self {
        Self::Tar {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The archive this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Zip { path, .. }
            | Self::Tar { path, .. }
            | Self::Escape { path }
            | Self::Unsupported { path } => path,
        }
    }
}
