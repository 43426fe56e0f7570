//! Signature records and hashing options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ScanError;

/// Which signature scheme produced a hash entry.
///
/// Serialized as the wire integer (`1` or `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HashFormat {
    /// Line-ending tolerant MD5, base64 without padding.
    DubHash,
    /// Whitespace-invariant MD5, hex truncated to 24 characters.
    UHash,
}

impl HashFormat {
    /// The integer identifier used in signature records.
    pub fn id(self) -> u8 {
        match self {
            Self::DubHash => 1,
            Self::UHash => 3,
        }
    }
}

impl From<HashFormat> for u8 {
    fn from(format: HashFormat) -> Self {
        format.id()
    }
}

impl TryFrom<u8> for HashFormat {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::DubHash),
            3 => Ok(Self::UHash),
            other => Err(format!("unknown hash format {other}")),
        }
    }
}

/// One hash of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullFileHash {
    pub format: HashFormat,
    pub data: String,
}

impl FullFileHash {
    pub fn new(format: HashFormat, data: impl Into<String>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// Fingerprint of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureResult {
    /// Display path, relative to the project root or extraction workspace.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Format 1 entries first, then the format 3 entry.
    pub hashes: Vec<FullFileHash>,
}

impl SignatureResult {
    /// Hash entries of the given format.
    pub fn hashes_of(&self, format: HashFormat) -> impl Iterator<Item = &FullFileHash> {
        self.hashes.iter().filter(move |h| h.format == format)
    }
}

/// Digest primitive behind both signature formats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
}

impl HashAlgorithm {
    /// Look up an algorithm by name.
    pub fn parse(name: &str) -> Result<Self, ScanError> {
        Self::from_str(name.trim()).map_err(|_| ScanError::UnsupportedAlgorithm {
            name: name.to_string(),
        })
    }
}

/// Which hashes to compute for every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureOptions {
    /// Emit format 1 entries.
    #[serde(default = "default_true")]
    pub dub_hash: bool,
    /// Also emit the line-ending transcoded format 1 digest for text files.
    #[serde(default)]
    pub alt_hash: bool,
    /// Emit the format 3 entry.
    #[serde(default = "default_true")]
    pub u_hash: bool,
    /// Digest primitive.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
}

fn default_true() -> bool {
    true
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            dub_hash: true,
            alt_hash: false,
            u_hash: true,
            algorithm: HashAlgorithm::Md5,
        }
    }
}

impl SignatureOptions {
    /// Reject option sets that would produce empty signatures.
    pub fn validate(&self) -> Result<(), ScanError> {
        if !self.dub_hash && !self.u_hash {
            return Err(ScanError::invalid_config(
                "at least one signature format must be enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format_wire_ids() {
        assert_eq!(HashFormat::DubHash.id(), 1);
        assert_eq!(HashFormat::UHash.id(), 3);
        assert_eq!(HashFormat::try_from(3), Ok(HashFormat::UHash));
        assert!(HashFormat::try_from(2).is_err());
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(HashAlgorithm::parse("md5").unwrap(), HashAlgorithm::Md5);
        assert_eq!(HashAlgorithm::parse("MD5").unwrap(), HashAlgorithm::Md5);
        let err = HashAlgorithm::parse("xxhash").unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedAlgorithm { ref name } if name == "xxhash"));
    }

    #[test]
    fn test_options_validate() {
        assert!(SignatureOptions::default().validate().is_ok());
        let none = SignatureOptions {
            dub_hash: false,
            u_hash: false,
            ..SignatureOptions::default()
        };
        assert!(none.validate().is_err());
    }
}
