//! Byte decoding with the UTF-8 -> ISO-8859-1 -> Windows-1252 fallback chain.

use std::fmt;

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Encoding that successfully decoded a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl SourceEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Latin1 => "ISO-8859-1",
            SourceEncoding::Windows1252 => "Windows-1252",
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes left undefined by Windows-1252.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8d, 0x8f, 0x90, 0x9d];

/// Decodes `bytes`, trying each encoding in order.
///
/// A UTF-8 BOM is stripped. ISO-8859-1 is rejected when the input uses the
/// C1 control range (0x80-0x9F), which real text never does but CP1252
/// punctuation does. Text containing NUL is treated as binary and rejected
/// by every decoder.
pub fn decode_bytes(bytes: &[u8]) -> Option<(String, SourceEncoding)> {
    if bytes.contains(&0) {
        return None;
    }
    let body = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Some((text.into_owned(), SourceEncoding::Utf8));
    }
    if !body.iter().any(|byte| (0x80..=0x9f).contains(byte)) {
        let text: String = body.iter().map(|&byte| char::from(byte)).collect();
        return Some((text, SourceEncoding::Latin1));
    }
    if body.iter().any(|byte| CP1252_UNDEFINED.contains(byte)) {
        return None;
    }
    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| (text.into_owned(), SourceEncoding::Windows1252))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_bom() {
        let (text, encoding) = decode_bytes("\u{feff}Ucrânia;10".as_bytes()).unwrap();
        assert_eq!(text, "Ucrânia;10");
        assert_eq!(encoding, SourceEncoding::Utf8);
    }

    #[test]
    fn latin1_fallback() {
        // "Roménia" in ISO-8859-1
        let bytes = b"Rom\xe9nia;5";
        let (text, encoding) = decode_bytes(bytes).unwrap();
        assert_eq!(text, "Roménia;5");
        assert_eq!(encoding, SourceEncoding::Latin1);
    }

    #[test]
    fn cp1252_fallback_for_smart_quotes() {
        let bytes = b"\x93Outros\x94;3 \x80";
        let (text, encoding) = decode_bytes(bytes).unwrap();
        assert_eq!(text, "\u{201c}Outros\u{201d};3 \u{20ac}");
        assert_eq!(encoding, SourceEncoding::Windows1252);
    }

    #[test]
    fn binary_input_fails() {
        assert!(decode_bytes(b"PK\x03\x04\x00\x00").is_none());
        assert!(decode_bytes(b"abc\x81\x9d").is_none());
    }
}
