//! Signature algorithms for cppsig.
//!
//! This crate turns the bytes of one file into its fingerprint:
//!
//! - **Binary classification** - a buffer with a NUL byte is binary
//! - **Line-ending normalization** - LF/CRLF detection and transcoding
//! - **Dub-hash (format 1)** - MD5 of the file, optionally paired with the
//!   MD5 of the same file with flipped line endings
//! - **U-hash (format 3)** - MD5 of the file with BOM and whitespace removed,
//!   truncated to 96 bits
//!
//! ```rust
//! use cppsig_hash::{FileContent, HashFormat, Signer};
//!
//! let signer = Signer::new();
//! let result = signer
//!     .sign("src/main.c", FileContent::from(b"int main() {}\n".as_slice()))
//!     .unwrap();
//!
//! assert_eq!(result.hashes.len(), 2);
//! assert_eq!(result.hashes[1].format, HashFormat::UHash);
//! ```

mod binary;
mod digest;
mod line_ending;
mod signature;
mod whitespace;

pub use binary::is_binary;
pub use digest::{base64_digest, digest, truncated_hex_digest, UHASH_HEX_LEN};
pub use line_ending::{
    detect_line_ending, has_line_endings, linux_to_windows, transcode, windows_to_linux,
    LineEndingFormat,
};
pub use signature::{compute_signature, u_hash_digest, Signer};
pub use whitespace::{has_utf8_bom, is_ascii_whitespace, remove_whitespace};

// Re-export core types
pub use cppsig_core::{
    FileContent, FullFileHash, HashAlgorithm, HashFormat, SignatureOptions, SignatureResult,
};
