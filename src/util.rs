//! Text decoding helpers for markup received as bytes.

use std::borrow::Cow;

/// Decode bytes to a string.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. The hint encoding, e.g. from `<?xml encoding="..."?>`
/// 3. Windows-1252, which never fails
///
/// Borrows when the input is already valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration.
///
/// Only the first 100 bytes are inspected.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = rest.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&rest[..value_end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_utf8_borrows() {
        let decoded = decode_text("<p>héllo</p>".as_bytes(), Some("windows-1252"));
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "<p>héllo</p>");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0x93/0x94 are curly quotes in CP1252
        assert_eq!(decode_text(b"\x93hi\x94", None), "\u{201c}hi\u{201d}");
    }

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>"),
            Some("UTF-8")
        );
        assert_eq!(
            extract_xml_encoding(b"<?xml version='1.0' encoding='iso-8859-1'?>"),
            Some("iso-8859-1")
        );
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(extract_xml_encoding(b"<span>no decl</span>"), None);
    }
}
