//! Digest primitives and their text encodings.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use md5::{Digest, Md5};

use cppsig_core::HashAlgorithm;

/// Width of a u-hash in hex characters (96 bits).
pub const UHASH_HEX_LEN: usize = 24;

/// Raw digest of `bytes`.
pub fn digest(algorithm: HashAlgorithm, bytes: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Md5 => Md5::digest(bytes).to_vec(),
    }
}

/// Base64 digest without `=` padding, as used by format 1.
pub fn base64_digest(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(digest(algorithm, bytes))
}

/// Lowercase hex digest truncated to [`UHASH_HEX_LEN`], as used by format 3.
pub fn truncated_hex_digest(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    let mut hex = hex::encode(digest(algorithm, bytes));
    hex.truncate(UHASH_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_digests() {
        assert_eq!(base64_digest(HashAlgorithm::Md5, b""), "1B2M2Y8AsgTpgAmY7PhCfg");
        assert_eq!(
            truncated_hex_digest(HashAlgorithm::Md5, b""),
            "d41d8cd98f00b204e9800998"
        );
    }

    #[test]
    fn test_lengths() {
        let zeros = vec![0u8; 4096];
        for input in [b"a".as_slice(), b"int main() {}\n".as_slice(), zeros.as_slice()] {
            assert_eq!(base64_digest(HashAlgorithm::Md5, input).len(), 22);
            assert_eq!(truncated_hex_digest(HashAlgorithm::Md5, input).len(), 24);
        }
    }
}
