//! Line-ending detection and LF/CRLF transcoding.
//!
//! The dub-hash emits a second digest of the file with its line endings
//! flipped, so that a checkout with a different `core.autocrlf` setting
//! still matches. Detection looks at the first LF only.

use cppsig_core::FileContent;

const CR: u8 = 0x0d;
const LF: u8 = 0x0a;

/// Line-ending convention of a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEndingFormat {
    /// `LF`.
    Linux,
    /// `CR LF`.
    Windows,
    /// No `LF` anywhere.
    Unknown,
}

impl LineEndingFormat {
    /// The convention a buffer is transcoded into.
    pub fn opposite(self) -> Self {
        match self {
            Self::Linux => Self::Windows,
            Self::Windows => Self::Linux,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// Check for any `CR` or `LF` byte.
pub fn has_line_endings(content: &[u8]) -> bool {
    content.iter().any(|&b| b == CR || b == LF)
}

/// Classify a buffer by its first `LF`.
pub fn detect_line_ending(content: &[u8]) -> LineEndingFormat {
    if !has_line_endings(content) {
        return LineEndingFormat::Unknown;
    }
    match content.iter().position(|&b| b == LF) {
        Some(0) => LineEndingFormat::Linux,
        Some(index) if content[index - 1] == CR => LineEndingFormat::Windows,
        Some(_) => LineEndingFormat::Linux,
        None => LineEndingFormat::Unknown,
    }
}

/// Rewrite `content`, detected as `from`, into the opposite convention.
///
/// `Unknown` content is handed back untouched; callers only transcode
/// buffers with a detected convention.
pub fn transcode(content: FileContent, from: LineEndingFormat) -> FileContent {
    match from {
        LineEndingFormat::Linux => linux_to_windows(&content),
        LineEndingFormat::Windows => windows_to_linux(content),
        LineEndingFormat::Unknown => content,
    }
}

/// `LF` becomes `CR LF`; stray `CR`s are dropped.
pub fn linux_to_windows(content: &[u8]) -> FileContent {
    // Worst case: every byte is LF.
    let mut out = vec![0u8; content.len() * 2];
    let mut write = 0;
    for &byte in content {
        match byte {
            CR => {}
            LF => {
                out[write] = CR;
                out[write + 1] = LF;
                write += 2;
            }
            other => {
                out[write] = other;
                write += 1;
            }
        }
    }
    out.truncate(write);
    FileContent::new(out)
}

/// Drop every `CR`, compacting in place.
pub fn windows_to_linux(mut content: FileContent) -> FileContent {
    let mut write = 0;
    for read in 0..content.len() {
        let byte = content[read];
        if byte == CR {
            continue;
        }
        if read != write {
            content[write] = byte;
        }
        write += 1;
    }
    content.truncate(write);
    content
}
