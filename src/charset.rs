//! Character encoding detection and decoding
//!
//! Text content is decoded to UTF-8 before the structural peek so that
//! UTF-16 and legacy single-byte XML files are scanned correctly.
//!
//! # Detection Cascade
//!
//! 1. **Byte Order Mark**: UTF-8, UTF-16LE or UTF-16BE
//! 2. **XML Preamble**: `encoding="..."` in a leading `<?xml ...?>`
//! 3. **HTML Meta Tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//!
//! A UTF-16 or UTF-32 label from step 2 or 3 is ignored: without a BOM the
//! declaration was just read as ASCII, so the content is not that wide.
//!
//! 4. **Default to UTF-8**
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::charset::detect_charset;
//!
//! // Detect from the XML preamble
//! let charset = detect_charset(b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a/>");
//! assert_eq!(charset, "ISO-8859-1");
//!
//! // Detect from HTML meta tag
//! let charset = detect_charset(b"<html><head><meta charset=\"UTF-8\"></head></html>");
//! assert_eq!(charset, "UTF-8");
//!
//! // Default to UTF-8
//! let charset = detect_charset(b"# Just Markdown");
//! assert_eq!(charset, "UTF-8");
//! ```

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for declarations (first 1024 bytes)
const DECLARATION_SCAN_LIMIT: usize = 1024;

/// Detect character encoding using the four-level cascade
///
/// Always returns a charset name, upper-cased, defaulting to `UTF-8`.
pub fn detect_charset(content: &[u8]) -> String {
    if let Some(charset) = charset_from_bom(content) {
        return charset.to_string();
    }

    // Without a BOM the bytes were readable as ASCII, so a declared
    // UTF-16/UTF-32 label cannot be true.
    let declared = extract_charset_from_preamble(content)
        .or_else(|| extract_charset_from_html(content))
        .map(|charset| normalize_charset(&charset));
    match declared {
        Some(charset) if is_wide_unicode(&charset) => {
            debug!(charset = %charset, "Ignoring wide Unicode label without a BOM");
            DEFAULT_CHARSET.to_string()
        }
        Some(charset) => charset,
        None => DEFAULT_CHARSET.to_string(),
    }
}

/// UTF-16/UTF-32 family labels, which only a BOM can establish
fn is_wide_unicode(charset: &str) -> bool {
    ["UTF-16", "UTF-32", "UCS-2", "UCS-4", "UNICODE"]
        .iter()
        .any(|prefix| charset.starts_with(prefix))
}

/// Charset named by a leading byte order mark
pub fn charset_from_bom(content: &[u8]) -> Option<&'static str> {
    encoding_rs::Encoding::for_bom(content).map(|(encoding, _)| match encoding.name() {
        "UTF-16LE" => "UTF-16LE",
        "UTF-16BE" => "UTF-16BE",
        _ => "UTF-8",
    })
}

/// Extract the `encoding` pseudo-attribute of a leading XML preamble
///
/// # Examples
///
/// ```rust
/// use content_classifier::charset::extract_charset_from_preamble;
///
/// assert_eq!(
///     extract_charset_from_preamble(b"<?xml version='1.0' encoding='windows-1252'?>"),
///     Some("windows-1252".to_string())
/// );
/// assert_eq!(extract_charset_from_preamble(b"<?xml version=\"1.0\"?>"), None);
/// ```
pub fn extract_charset_from_preamble(content: &[u8]) -> Option<String> {
    let head = scan_prefix(content);

    static PREAMBLE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = PREAMBLE_REGEX.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z][A-Za-z0-9._-]*)["']"#).ok()
    });
    let regex = regex.as_ref()?;

    regex
        .captures(&head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract charset from HTML meta tags
///
/// Supports the HTML5 `<meta charset="UTF-8">` form and the HTML4
/// `<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">` form.
/// Only the first 1024 bytes are scanned.
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let html_str = scan_prefix(html);

    // Try HTML5 meta charset format first
    static HTML5_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html5_regex =
        HTML5_REGEX.get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#).ok());
    let html5_regex = html5_regex.as_ref()?;

    if let Some(caps) = html5_regex.captures(&html_str)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    // Try HTML4 meta http-equiv format
    static HTML4_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html4_regex = HTML4_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
        )
        .ok()
    });
    let html4_regex = html4_regex.as_ref()?;

    html4_regex
        .captures(&html_str)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize charset name to uppercase
pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}

/// Decode `content` to UTF-8 text using `charset`.
///
/// Valid UTF-8 is borrowed. Other encodings are transcoded with
/// `encoding_rs`; a leading BOM is removed. Unknown labels and malformed
/// sequences never fail: malformed input is decoded with replacement
/// characters.
pub fn decode_text<'a>(content: &'a [u8], charset: &str) -> Cow<'a, str> {
    if charset.eq_ignore_ascii_case(DEFAULT_CHARSET)
        && let Ok(text) = std::str::from_utf8(content)
    {
        return Cow::Borrowed(text);
    }

    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes()).unwrap_or_else(|| {
        debug!(charset, "Unsupported charset label; decoding as UTF-8");
        encoding_rs::UTF_8
    });

    let (text, had_errors) = encoding.decode_with_bom_removal(content);
    if had_errors {
        debug!(
            charset = encoding.name(),
            "Malformed byte sequences replaced during decoding"
        );
    }
    text
}

fn scan_prefix(content: &[u8]) -> Cow<'_, str> {
    let scan_limit = std::cmp::min(content.len(), DECLARATION_SCAN_LIMIT);
    String::from_utf8_lossy(&content[..scan_limit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ============================================================================
    // Unit Tests for BOM Detection
    // ============================================================================

    #[test]
    fn test_charset_from_bom() {
        assert_eq!(charset_from_bom(b"\xEF\xBB\xBFhello"), Some("UTF-8"));
        assert_eq!(charset_from_bom(b"\xFF\xFEh\x00"), Some("UTF-16LE"));
        assert_eq!(charset_from_bom(b"\xFE\xFF\x00h"), Some("UTF-16BE"));
        assert_eq!(charset_from_bom(b"hello"), None);
    }

    // ============================================================================
    // Unit Tests for Preamble Charset Extraction
    // ============================================================================

    #[test]
    fn test_extract_charset_from_preamble_double_quotes() {
        let xml = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><topic/>";
        assert_eq!(extract_charset_from_preamble(xml), Some("UTF-8".to_string()));
    }

    #[test]
    fn test_extract_charset_from_preamble_requires_leading_preamble() {
        let xml = b"<topic><?xml version=\"1.0\" encoding=\"UTF-8\"?></topic>";
        assert_eq!(extract_charset_from_preamble(xml), None);
    }

    #[test]
    fn test_extract_charset_from_preamble_standalone_after() {
        let xml = b"<?xml version=\"1.0\" encoding=\"Shift_JIS\" standalone=\"yes\"?>";
        assert_eq!(
            extract_charset_from_preamble(xml),
            Some("Shift_JIS".to_string())
        );
    }

    // ============================================================================
    // Unit Tests for HTML Meta Charset Extraction
    // ============================================================================

    #[test]
    fn test_extract_charset_from_html_html5_format() {
        let html = b"<html><head><meta charset=\"UTF-8\"></head></html>";
        assert_eq!(extract_charset_from_html(html), Some("UTF-8".to_string()));
    }

    #[test]
    fn test_extract_charset_from_html_html4_format() {
        let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\">";
        assert_eq!(
            extract_charset_from_html(html),
            Some("ISO-8859-1".to_string())
        );
    }

    #[test]
    fn test_extract_charset_from_html_beyond_scan_limit() {
        let mut html = vec![b' '; DECLARATION_SCAN_LIMIT + 100];
        html.extend_from_slice(b"<meta charset=\"UTF-8\">");
        assert_eq!(extract_charset_from_html(&html), None);
    }

    // ============================================================================
    // Unit Tests for the Detection Cascade
    // ============================================================================

    #[test]
    fn test_detect_charset_bom_beats_preamble() {
        let xml = b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>";
        assert_eq!(detect_charset(xml), "UTF-8");
    }

    #[test]
    fn test_detect_charset_preamble_beats_meta() {
        let xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><html><meta charset=\"UTF-8\"></html>";
        assert_eq!(detect_charset(xml), "WINDOWS-1252");
    }

    #[test]
    fn test_detect_charset_ignores_utf16_label_without_bom() {
        let xml = b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><topic id=\"t\"/>";
        assert_eq!(detect_charset(xml), "UTF-8");
        let html = b"<html><head><meta charset=\"utf-32le\"></head></html>";
        assert_eq!(detect_charset(html), "UTF-8");
    }

    #[test]
    fn test_detect_charset_utf16_bom_still_wins() {
        let xml = b"\xFF\xFE<\x00?\x00x\x00m\x00l\x00";
        assert_eq!(detect_charset(xml), "UTF-16LE");
    }

    #[test]
    fn test_detect_charset_default() {
        assert_eq!(detect_charset(b"no declarations"), "UTF-8");
    }

    // ============================================================================
    // Unit Tests for Decoding
    // ============================================================================

    #[test]
    fn test_decode_utf8_is_borrowed() {
        let text = decode_text(b"plain", "UTF-8");
        assert!(matches!(text, Cow::Borrowed("plain")));
    }

    #[test]
    fn test_decode_latin1() {
        let text = decode_text(b"Caf\xE9", "ISO-8859-1");
        assert_eq!(text, "Café");
    }

    #[test]
    fn test_decode_utf16le_strips_bom() {
        let text = decode_text(b"\xFF\xFE<\x00a\x00/\x00>\x00", "UTF-16LE");
        assert_eq!(text, "<a/>");
    }

    #[test]
    fn test_decode_unknown_label_falls_back() {
        let text = decode_text(b"hello", "x-unknown-test");
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        let text = decode_text(b"ok\xFFok", "UTF-8");
        assert_eq!(text, "ok\u{FFFD}ok");
    }

    // ============================================================================
    // Property-Based Tests
    // ============================================================================

    proptest! {
        #[test]
        fn prop_detect_charset_preamble_round_trips(
            charset in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "shift_jis", "euc-kr"]),
        ) {
            let xml = format!(r#"<?xml version="1.0" encoding="{charset}"?><topic/>"#);
            prop_assert_eq!(detect_charset(xml.as_bytes()), charset.to_uppercase());
        }

        #[test]
        fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let charset = detect_charset(&data);
            let _ = decode_text(&data, &charset);
        }
    }
}
