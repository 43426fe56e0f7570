//! File classification by extension and scan limits.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions (without the dot) of the C/C++ sources that get fingerprinted.
pub const SUPPORTED_SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "i", "ii", "ixx", "ipp", "txx",
    "tpp", "tpl",
];

/// Extensions (without the dot) recognized as archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "zipx", "tar", "gz", "tgz"];

/// Files at or above this size are never hashed (2 GiB - 1).
pub const MAX_SUPPORTED_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024 - 1;

/// Policy file name looked up in the project root when none is configured.
pub const DEFAULT_POLICY_FILE: &str = ".snyk";

/// Archive family, chosen purely from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveKind {
    /// `.zip` and `.zipx`.
    Zip,
    /// Plain `.tar`.
    Tar,
    /// Gzip-compressed tar: `.gz` and `.tgz`.
    TarGz,
}

impl ArchiveKind {
    /// Classify a path, returning `None` for anything that is not an archive.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "zip" | "zipx" => Some(Self::Zip),
            "tar" => Some(Self::Tar),
            "gz" | "tgz" => Some(Self::TarGz),
            _ => None,
        }
    }

    /// Whether this archive is unpacked with the streaming tar reader.
    pub fn is_tar_family(self) -> bool {
        matches!(self, Self::Tar | Self::TarGz)
    }
}

/// Check if a path has an archive extension.
pub fn is_archive(path: &Path) -> bool {
    ArchiveKind::from_path(path).is_some()
}

/// Check if a path has a supported C/C++ source extension.
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_SOURCE_EXTENSIONS.contains(&ext))
}
