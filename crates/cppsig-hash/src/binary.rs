//! Binary/text classification.

/// A buffer is binary iff it contains a NUL byte.
pub fn is_binary(content: &[u8]) -> bool {
    content.contains(&0)
}
