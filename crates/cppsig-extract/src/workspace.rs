//! Temporary extraction workspace and display-path mapping.
//!
//! Every archive is unpacked into `<workspace>/<relative archive path>.extracted`,
//! so two archives never share a directory even when their entries have the
//! same names. Paths reported to the user hide that suffix again:
//! `<workspace>/libs/a.zip.extracted/src/x.c` is shown as `libs/a.zip/src/x.c`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use cppsig_core::{is_archive, ScanError};
use tempfile::TempDir;

/// Suffix appended to an archive path to name its extraction directory.
pub const EXTRACTED_SUFFIX: &str = ".extracted";

/// A scratch directory that lives for one scan and is deleted on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under the system temporary directory.
    pub fn new() -> Result<Self, ScanError> {
        tempfile::Builder::new()
            .prefix("cppsig-")
            .tempdir()
            .map(|dir| Self { dir })
            .map_err(|source| ScanError::Workspace { source })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Check whether `path` lives inside the workspace.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(self.path())
    }

    /// Check that nothing between the workspace root and `path` is a
    /// symbolic link, so writes below `path` land inside the workspace.
    ///
    /// Components that do not exist yet are fine; they are created as plain
    /// directories. Paths outside the workspace are never link-free.
    pub fn is_link_free(&self, path: &Path) -> io::Result<bool> {
        let Ok(relative) = path.strip_prefix(self.path()) else {
            return Ok(false);
        };

        let mut current = self.path().to_path_buf();
        for component in relative.components() {
            let Component::Normal(name) = component else {
                return Ok(false);
            };
            current.push(name);
            match fs::symlink_metadata(&current) {
                Ok(metadata) if metadata.file_type().is_symlink() => return Ok(false),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Directory an archive is unpacked into.
    ///
    /// Top-level archives are placed by their path relative to `root`, nested
    /// ones by their path relative to the workspace.
    pub fn target_dir(&self, root: &Path, archive: &Path) -> PathBuf {
        let relative = archive
            .strip_prefix(self.path())
            .or_else(|_| archive.strip_prefix(root))
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| {
                archive
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_default()
            });

        let mut name: OsString = relative.into_os_string();
        name.push(EXTRACTED_SUFFIX);
        self.path().join(name)
    }

    /// Path shown for `path`: relative to `root` for project files, relative
    /// to the workspace with `.extracted` suffixes removed for unpacked ones.
    pub fn display_path(&self, root: &Path, path: &Path) -> PathBuf {
        if let Ok(relative) = path.strip_prefix(self.path()) {
            return relative.components().map(strip_extracted).collect();
        }
        path.strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn strip_extracted(component: Component<'_>) -> OsString {
    let name = component.as_os_str();
    match name.to_str().and_then(|s| s.strip_suffix(EXTRACTED_SUFFIX)) {
        Some(original) if is_archive(Path::new(original)) => OsString::from(original),
        _ => name.to_os_string(),
    }
}

/// Render a relative path with `/` separators on every platform.
pub fn display_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dir_for_top_level_archive() {
        let workspace = Workspace::new().unwrap();
        let root = Path::new("/project");
        let target = workspace.target_dir(root, Path::new("/project/libs/a.zip"));
        assert_eq!(target, workspace.path().join("libs/a.zip.extracted"));
        assert!(workspace.contains(&target));
    }

    #[test]
    fn test_target_dir_for_nested_archive() {
        let workspace = Workspace::new().unwrap();
        let nested = workspace.path().join("libs/a.zip.extracted/inner.tar");
        let target = workspace.target_dir(Path::new("/project"), &nested);
        assert_eq!(
            target,
            workspace.path().join("libs/a.zip.extracted/inner.tar.extracted")
        );
    }

    #[test]
    fn test_display_path() {
        let workspace = Workspace::new().unwrap();
        let root = Path::new("/project");

        let project_file = Path::new("/project/src/main.c");
        assert_eq!(
            display_string(&workspace.display_path(root, project_file)),
            "src/main.c"
        );

        let unpacked = workspace
            .path()
            .join("libs/a.zip.extracted/inner.tar.extracted/x.c");
        assert_eq!(
            display_string(&workspace.display_path(root, &unpacked)),
            "libs/a.zip/inner.tar/x.c"
        );
    }

    #[test]
    fn test_display_path_keeps_plain_extracted_dirs() {
        let workspace = Workspace::new().unwrap();
        let unpacked = workspace.path().join("a.zip.extracted/notes.extracted/x.c");
        assert_eq!(
            display_string(&workspace.display_path(Path::new("/project"), &unpacked)),
            "a.zip/notes.extracted/x.c"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_is_link_free() {
        let workspace = Workspace::new().unwrap();
        let outside = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(workspace.path().join("a.zip.extracted")).unwrap();
        std::os::unix::fs::symlink(outside.path(), workspace.path().join("b.zip.extracted"))
            .unwrap();

        let plain = workspace.path().join("a.zip.extracted/c.zip.extracted");
        assert!(workspace.is_link_free(&plain).unwrap());
        let missing = workspace.path().join("new/d.zip.extracted");
        assert!(workspace.is_link_free(&missing).unwrap());
        let linked = workspace.path().join("b.zip.extracted");
        assert!(!workspace.is_link_free(&linked).unwrap());
        let below_link = workspace.path().join("b.zip.extracted/e.zip.extracted");
        assert!(!workspace.is_link_free(&below_link).unwrap());
        assert!(!workspace.is_link_free(outside.path()).unwrap());
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        drop(workspace);
        assert!(!path.exists());
    }
}
