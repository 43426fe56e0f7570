//! Glob-based exclusion of project paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ScanError;

/// Decides which root-relative paths are skipped by the finder and the
/// extractor.
///
/// A pattern matches the path itself and everything below it, so `vendor`
/// excludes `vendor/zlib/inflate.c`. `*` stays within one path component,
/// `**` crosses components.
#[derive(Debug, Clone)]
pub struct Exclusions {
    globs: GlobSet,
    literals: HashSet<PathBuf>,
}

impl Exclusions {
    /// Compile exclusion patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for raw in patterns {
            let pattern = normalize_pattern(raw.as_ref());
            if pattern.is_empty() {
                continue;
            }
            for candidate in [pattern.to_string(), format!("{pattern}/**")] {
                let glob = GlobBuilder::new(&candidate)
                    .literal_separator(true)
                    .build()
                    .map_err(|source| ScanError::InvalidPattern {
                        pattern: raw.as_ref().to_string(),
                        source,
                    })?;
                builder.add(glob);
            }
        }
        let globs = builder.build().map_err(|source| ScanError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        Ok(Self {
            globs,
            literals: HashSet::new(),
        })
    }

    /// An exclusion set that matches nothing.
    pub fn none() -> Self {
        Self {
            globs: GlobSet::empty(),
            literals: HashSet::new(),
        }
    }

    /// Always exclude one exact root-relative path, e.g. the policy file.
    pub fn with_path(mut self, relative: impl Into<PathBuf>) -> Self {
        self.literals.insert(relative.into());
        self
    }

    /// Check a root-relative path against the exclusions.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.literals.contains(relative) || self.globs.is_match(relative)
    }

    /// Number of compiled glob patterns (each user pattern yields two).
    pub fn pattern_count(&self) -> usize {
        self.globs.len()
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::none()
    }
}

fn normalize_pattern(pattern: &str) -> &str {
    let pattern = pattern.trim();
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    pattern.trim_end_matches('/')
}
