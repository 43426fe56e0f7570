//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::formats::{DEFAULT_POLICY_FILE, MAX_SUPPORTED_FILE_SIZE};
use crate::pool::{available_parallelism, EXTRACT_CONCURRENCY_MULTIPLIER};
use crate::signature::SignatureOptions;

/// Nesting levels of archives unpacked when no limit is configured.
pub const DEFAULT_EXTRACTION_DEPTH: u32 = 5;

/// Configuration for a signature scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Project root to fingerprint.
    pub root: PathBuf,

    /// Glob patterns (relative to the root) to skip.
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Policy file that is never hashed (defaults to `<root>/.snyk`).
    #[builder(default)]
    #[serde(default)]
    pub policy_file: Option<PathBuf>,

    /// How many levels of nested archives to unpack (0 = none).
    #[builder(default = "DEFAULT_EXTRACTION_DEPTH")]
    #[serde(default = "default_extraction_depth")]
    pub extraction_depth: u32,

    /// Number of hashing threads (0 = one per CPU).
    #[builder(default = "0")]
    #[serde(default)]
    pub hash_threads: usize,

    /// Number of archive entry extraction threads (0 = eight per CPU).
    #[builder(default = "0")]
    #[serde(default)]
    pub extract_threads: usize,

    /// Files of this size or larger are skipped.
    #[builder(default = "MAX_SUPPORTED_FILE_SIZE")]
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Which signature formats to compute.
    #[builder(default)]
    #[serde(default)]
    pub signature: SignatureOptions,
}

fn default_extraction_depth() -> u32 {
    DEFAULT_EXTRACTION_DEPTH
}

fn default_max_file_size() -> u64 {
    MAX_SUPPORTED_FILE_SIZE
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref signature) = self.signature {
            signature.validate().map_err(|e| e.to_string())?;
        }
        if self.max_file_size == Some(0) {
            return Err("Maximum file size must be positive".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_patterns: Vec::new(),
            policy_file: None,
            extraction_depth: DEFAULT_EXTRACTION_DEPTH,
            hash_threads: 0,
            extract_threads: 0,
            max_file_size: MAX_SUPPORTED_FILE_SIZE,
            signature: SignatureOptions::default(),
        }
    }

    /// Resolved hashing concurrency.
    pub fn hash_concurrency(&self) -> usize {
        match self.hash_threads {
            0 => available_parallelism(),
            n => n,
        }
    }

    /// Resolved extraction concurrency.
    pub fn extract_concurrency(&self) -> usize {
        match self.extract_threads {
            0 => available_parallelism() * EXTRACT_CONCURRENCY_MULTIPLIER,
            n => n,
        }
    }

    /// Policy file location, falling back to the default name in the root.
    ///
    /// A relative `policy_file` is resolved against the root.
    pub fn policy_path(&self) -> PathBuf {
        match &self.policy_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root.join(path),
            None => self.root.join(DEFAULT_POLICY_FILE),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user/project")
            .hash_threads(4usize)
            .extraction_depth(2u32)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/project"));
        assert_eq!(config.hash_threads, 4);
        assert_eq!(config.hash_concurrency(), 4);
        assert_eq!(config.extraction_depth, 2);
        assert_eq!(config.max_file_size, MAX_SUPPORTED_FILE_SIZE);
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user/project");
        assert_eq!(config.extraction_depth, DEFAULT_EXTRACTION_DEPTH);
        assert_eq!(config.hash_threads, 0);
        assert!(config.hash_concurrency() >= 1);
        assert_eq!(
            config.extract_concurrency(),
            config.hash_concurrency() * EXTRACT_CONCURRENCY_MULTIPLIER
        );
        assert_eq!(
            config.policy_path(),
            PathBuf::from("/home/user/project").join(".snyk")
        );
    }

    #[test]
    fn test_policy_path_relative_to_root() {
        let config = ScanConfig::builder()
            .root("/project")
            .policy_file(Some(PathBuf::from("config/policy.yml")))
            .build()
            .unwrap();
        assert_eq!(config.policy_path(), PathBuf::from("/project/config/policy.yml"));
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_builder_rejects_empty_signature() {
        let result = ScanConfig::builder()
            .root("/project")
            .signature(SignatureOptions {
                dub_hash: false,
                u_hash: false,
                ..SignatureOptions::default()
            })
            .build();
        assert!(result.is_err());
    }
}
