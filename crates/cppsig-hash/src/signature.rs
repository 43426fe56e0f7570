//! Combined file signatures.
//!
//! A signature bundles up to two format 1 (dub-hash) digests and one
//! format 3 (u-hash) digest computed from a single read of the file:
//!
//! 1. Classify the buffer as binary or text once.
//! 2. Dub-hash: digest the raw bytes; for text with a detected line-ending
//!    convention and `alt_hash` enabled, also digest the bytes transcoded
//!    into the opposite convention.
//! 3. U-hash: digest the raw bytes of binaries, or the text with its BOM and
//!    all ASCII whitespace removed.

use std::mem;
use std::path::Path;

use cppsig_core::{
    FileContent, FullFileHash, HashAlgorithm, HashFormat, SignatureOptions, SignatureResult,
};

use crate::binary::is_binary;
use crate::digest::{base64_digest, truncated_hex_digest};
use crate::line_ending::{detect_line_ending, linux_to_windows, transcode, LineEndingFormat};
use crate::whitespace::remove_whitespace;

/// Computes signatures according to a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Signer {
    options: SignatureOptions,
}

impl Signer {
    /// Create a signer with default options (single dub-hash plus u-hash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signer with custom options.
    pub fn with_options(options: SignatureOptions) -> Self {
        Self { options }
    }

    /// The options this signer was built with.
    pub fn options(&self) -> &SignatureOptions {
        &self.options
    }

    /// Read `file` once and sign it under `display_path`.
    pub fn sign_file(
        &self,
        file: &Path,
        display_path: impl Into<String>,
    ) -> std::io::Result<Option<SignatureResult>> {
        let bytes = std::fs::read(file)?;
        tracing::trace!(path = %file.display(), bytes = bytes.len(), "signing file");
        Ok(self.sign(display_path, FileContent::new(bytes)))
    }

    /// Sign a buffer. Empty buffers have no signature.
    pub fn sign(&self, path: impl Into<String>, mut content: FileContent) -> Option<SignatureResult> {
        if content.is_empty() {
            return None;
        }

        let algorithm = self.options.algorithm;
        let size = content.len() as u64;
        let binary = is_binary(&content);
        let mut hashes = Vec::with_capacity(3);

        if self.options.dub_hash {
            for digest in self.dub_hash(&mut content, binary) {
                hashes.push(FullFileHash::new(HashFormat::DubHash, digest));
            }
        }

        if self.options.u_hash {
            hashes.push(FullFileHash::new(
                HashFormat::UHash,
                u_hash_digest(content, binary, algorithm),
            ));
        }

        Some(SignatureResult {
            path: path.into(),
            size,
            hashes,
        })
    }

    /// One or two base64 digests, original first.
    ///
    /// `content` is left intact whenever the u-hash still needs it.
    fn dub_hash(&self, content: &mut FileContent, binary: bool) -> Vec<String> {
        let algorithm = self.options.algorithm;
        let original = base64_digest(algorithm, content);

        let line_ending = if self.options.alt_hash && !binary {
            detect_line_ending(content)
        } else {
            LineEndingFormat::Unknown
        };

        let transcoded = match line_ending {
            LineEndingFormat::Unknown => return vec![original],
            LineEndingFormat::Linux => linux_to_windows(content),
            LineEndingFormat::Windows => {
                let source = if self.options.u_hash {
                    content.clone()
                } else {
                    mem::take(content)
                };
                transcode(source, LineEndingFormat::Windows)
            }
        };

        vec![original, base64_digest(algorithm, &transcoded)]
    }
}

/// Sign a buffer with one-off options.
pub fn compute_signature(
    path: impl Into<String>,
    content: FileContent,
    options: &SignatureOptions,
) -> Option<SignatureResult> {
    Signer::with_options(*options).sign(path, content)
}

/// Truncated hex u-hash of a buffer already classified as binary or text.
pub fn u_hash_digest(content: FileContent, binary: bool, algorithm: HashAlgorithm) -> String {
    if binary {
        return truncated_hex_digest(algorithm, &content);
    }
    let stripped = remove_whitespace(content);
    truncated_hex_digest(algorithm, &stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_UHASH: &str = "d41d8cd98f00b204e9800998";

    fn alt_signer() -> Signer {
        Signer::with_options(SignatureOptions {
            alt_hash: true,
            ..SignatureOptions::default()
        })
    }

    fn data(result: &SignatureResult, format: HashFormat) -> Vec<&str> {
        result.hashes_of(format).map(|h| h.data.as_str()).collect()
    }

    #[test]
    fn test_empty_has_no_signature() {
        assert!(Signer::new().sign("empty.c", FileContent::default()).is_none());
        assert!(alt_signer().sign("empty.c", FileContent::default()).is_none());
    }

    #[test]
    fn test_single_dub_hash_by_default() {
        let result = Signer::new()
            .sign("main.c", FileContent::from(b"int main() {\n  return 0;\n}\n".as_slice()))
            .unwrap();
        assert_eq!(result.size, 27);
        assert_eq!(data(&result, HashFormat::DubHash), vec!["uxL+yNACsfDgb33uRgTGzA"]);
        assert_eq!(data(&result, HashFormat::UHash), vec!["260c9ad5fc96f9d520c8d470"]);
        assert_eq!(result.hashes[0].format, HashFormat::DubHash);
        assert_eq!(result.hashes[1].format, HashFormat::UHash);
    }

    #[test]
    fn test_alt_hash_linux_text() {
        let result = alt_signer()
            .sign("main.c", FileContent::from(b"int main() {\n  return 0;\n}\n".as_slice()))
            .unwrap();
        assert_eq!(
            data(&result, HashFormat::DubHash),
            vec!["uxL+yNACsfDgb33uRgTGzA", "TzthE1ehRIFfbeVbmVC1Gw"]
        );
        assert_eq!(data(&result, HashFormat::UHash), vec!["260c9ad5fc96f9d520c8d470"]);
    }

    #[test]
    fn test_alt_hash_windows_text_mirrors_linux() {
        let result = alt_signer()
            .sign(
                "main.c",
                FileContent::from(b"int main() {\r\n  return 0;\r\n}\r\n".as_slice()),
            )
            .unwrap();
        assert_eq!(
            data(&result, HashFormat::DubHash),
            vec!["TzthE1ehRIFfbeVbmVC1Gw", "uxL+yNACsfDgb33uRgTGzA"]
        );
        // Whitespace removal makes the u-hash line-ending blind.
        assert_eq!(data(&result, HashFormat::UHash), vec!["260c9ad5fc96f9d520c8d470"]);
    }

    #[test]
    fn test_windows_without_uhash_still_correct() {
        let signer = Signer::with_options(SignatureOptions {
            alt_hash: true,
            u_hash: false,
            ..SignatureOptions::default()
        });
        let result = signer
            .sign(
                "main.c",
                FileContent::from(b"int main() {\r\n  return 0;\r\n}\r\n".as_slice()),
            )
            .unwrap();
        assert_eq!(result.hashes.len(), 2);
        assert_eq!(result.hashes[1].data, "uxL+yNACsfDgb33uRgTGzA");
    }

    #[test]
    fn test_binary_gets_single_dub_hash() {
        let result = alt_signer()
            .sign("blob.o", FileContent::from(b"\x7fELF\x00\x01\x02\n\r\n".as_slice()))
            .unwrap();
        assert_eq!(data(&result, HashFormat::DubHash), vec!["N4eVTNcYJB/49V5AQ5bt7Q"]);
        assert_eq!(data(&result, HashFormat::UHash), vec!["3787954cd718241ff8f55e40"]);
    }

    #[test]
    fn test_no_lf_gets_single_dub_hash() {
        let signer = alt_signer();
        let result = signer.sign("x.h", FileContent::from(b"int x = 1;".as_slice())).unwrap();
        assert_eq!(data(&result, HashFormat::DubHash), vec!["AVO7Y115x231sZo9ymlVFA"]);

        let result = signer.sign("x.h", FileContent::from(b"a\rb\r".as_slice())).unwrap();
        assert_eq!(data(&result, HashFormat::DubHash), vec!["7qUkv6i7SWqu0vqGo8VKng"]);
    }

    #[test]
    fn test_whitespace_only_file() {
        let result = alt_signer()
            .sign("blank.h", FileContent::from(b" \t\n\x0b\x0c\r ".as_slice()))
            .unwrap();
        let dub = data(&result, HashFormat::DubHash);
        assert_eq!(dub, vec!["Kf6ZFx+Uyx2Acmngf1uDXg", "1s1M0tPptF4+AlRdq7bT1A"]);
        assert_ne!(dub[0], dub[1]);
        assert_eq!(data(&result, HashFormat::UHash), vec![EMPTY_UHASH]);
    }

    #[test]
    fn test_bom_only_file() {
        let result = Signer::new()
            .sign("bom.h", FileContent::from(b"\xef\xbb\xbf".as_slice()))
            .unwrap();
        assert_eq!(data(&result, HashFormat::UHash), vec![EMPTY_UHASH]);
        assert_eq!(data(&result, HashFormat::DubHash), vec!["7KqI9/oL9hClomz1RdzTqg"]);
    }

    #[test]
    fn test_bom_text_file() {
        let result = Signer::new()
            .sign("bom.h", FileContent::from(b"\xef\xbb\xbfint x;\n".as_slice()))
            .unwrap();
        assert_eq!(data(&result, HashFormat::UHash), vec!["3ecdec351fce13cba8a59e38"]);
    }

    #[test]
    fn test_compute_signature_matches_signer() {
        let options = SignatureOptions {
            alt_hash: true,
            ..SignatureOptions::default()
        };
        let content = FileContent::from(b"int x;\n".as_slice());
        let direct = compute_signature("x.c", content.clone(), &options).unwrap();
        let signed = Signer::with_options(options).sign("x.c", content).unwrap();
        assert_eq!(direct, signed);
    }

    #[test]
    fn test_uhash_only() {
        let signer = Signer::with_options(SignatureOptions {
            dub_hash: false,
            ..SignatureOptions::default()
        });
        let result = signer.sign("a.c", FileContent::from(b"a b".as_slice())).unwrap();
        assert_eq!(result.hashes.len(), 1);
        assert_eq!(result.hashes[0].format, HashFormat::UHash);
        assert_eq!(result.hashes[0].data.len(), 24);
    }
}
