//! Whitespace and byte-order-mark removal for the u-hash.

use cppsig_core::FileContent;

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Tab, LF, vertical tab, form feed, CR and space.
pub fn is_ascii_whitespace(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0a | 0x0b | 0x0c | 0x0d | 0x20)
}

/// Check if the buffer starts with the exact 3-byte UTF-8 BOM.
pub fn has_utf8_bom(content: &[u8]) -> bool {
    content.len() >= UTF8_BOM.len() && content[..UTF8_BOM.len()] == UTF8_BOM
}

/// Strip a leading BOM and every whitespace byte, compacting in place.
pub fn remove_whitespace(mut content: FileContent) -> FileContent {
    let start = if has_utf8_bom(&content) {
        UTF8_BOM.len()
    } else {
        0
    };

    let mut write = 0;
    for read in start..content.len() {
        let byte = content[read];
        if !is_ascii_whitespace(byte) {
            content[write] = byte;
            write += 1;
        }
    }
    content.truncate(write);
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(bytes: &[u8]) -> Vec<u8> {
        remove_whitespace(FileContent::from(bytes)).into_inner()
    }

    #[test]
    fn test_remove_whitespace() {
        assert_eq!(strip(b"int main() {\r\n  return 0;\r\n}\r\n"), b"intmain(){return0;}");
        assert_eq!(strip(b" \t\n\x0b\x0c\r "), b"");
        assert_eq!(strip(b"abc"), b"abc");
    }

    #[test]
    fn test_bom_only_stripped_at_start() {
        assert_eq!(strip(b"\xef\xbb\xbfint x;\n"), b"intx;");
        assert_eq!(strip(b"\xef\xbb\xbf"), b"");
        assert_eq!(strip(b"x\xef\xbb\xbf"), b"x\xef\xbb\xbf");
        assert_eq!(strip(b"\xef\xbb"), b"\xef\xbb");
    }

    #[test]
    fn test_idempotent() {
        let once = strip(b"  a b\tc\r\n d ");
        let twice = strip(&once);
        assert_eq!(once, twice);
    }
}
