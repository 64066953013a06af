//! XML structural peek
//!
//! A bounded lexical scan over decoded text that locates the XML declaration,
//! the first DOCTYPE, the root element name and top-level DTD markup. It is
//! not a parser: nothing after the root element's name is looked at, and
//! anything it does not recognize ends the scan with "not found".
//!
//! Constructs must *start* before the peek limit; one that started in bounds
//! may end past it.
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::peek::peek_xml;
//!
//! let peek = peek_xml("<?xml version=\"1.0\"?>\n<!-- c --><topic id=\"t\"/>", 65536).unwrap();
//! assert!(peek.has_preamble());
//! assert_eq!(peek.root_tag_name.as_deref(), Some("topic"));
//! assert!(peek.doctype_raw.is_none());
//! ```

use crate::error::ClassificationError;

const BOM: char = '\u{FEFF}';

/// DTD declaration keywords recognized at top level (case-sensitive, as in XML)
const DTD_DECLARATIONS: &[&[u8]] = &[b"<!ELEMENT", b"<!ENTITY", b"<!ATTLIST", b"<!NOTATION"];

/// What the peek found. Absent constructs are `None`/`false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlPeekResult {
    /// `<?xml ... ?>` exactly as written
    pub preamble_raw: Option<String>,
    /// First `<!DOCTYPE ...>` exactly as written, internal subset included
    pub doctype_raw: Option<String>,
    pub root_tag_name: Option<String>,
    /// Top-level DTD declarations, conditional sections or parameter entity
    /// references were seen
    pub has_dtd_fragment: bool,
}

impl XmlPeekResult {
    pub fn has_preamble(&self) -> bool {
        self.preamble_raw.is_some()
    }

    pub fn has_root_tag(&self) -> bool {
        self.root_tag_name.is_some()
    }
}

/// Scan `text` for leading XML structure.
///
/// # Errors
///
/// Returns [`ClassificationError::Peek`] when a declaration, comment,
/// processing instruction, DOCTYPE or markup declaration is opened but never
/// closed.
pub fn peek_xml(text: &str, limit: usize) -> Result<XmlPeekResult, ClassificationError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let bytes = text.as_bytes();
    let mut result = XmlPeekResult::default();

    let mut pos = skip_whitespace(bytes, 0);
    if is_xml_declaration(&bytes[pos..]) {
        let end = find_from(bytes, pos + 5, b"?>")
            .ok_or_else(|| unterminated(pos, "XML declaration"))?;
        result.preamble_raw = Some(text[pos..end + 2].to_string());
        pos = end + 2;
    }

    loop {
        pos = skip_whitespace(bytes, pos);
        if pos >= bytes.len() || pos >= limit {
            break;
        }
        let rest = &bytes[pos..];

        if rest.starts_with(b"<!--") {
            let end = find_from(bytes, pos + 4, b"-->").ok_or_else(|| unterminated(pos, "comment"))?;
            pos = end + 3;
        } else if rest.starts_with(b"<?") {
            let end = find_from(bytes, pos + 2, b"?>")
                .ok_or_else(|| unterminated(pos, "processing instruction"))?;
            pos = end + 2;
        } else if is_doctype(rest) {
            let end = markup_declaration_end(bytes, pos).ok_or_else(|| unterminated(pos, "DOCTYPE"))?;
            if result.doctype_raw.is_none() {
                result.doctype_raw = Some(text[pos..end].to_string());
            }
            pos = end;
        } else if DTD_DECLARATIONS.iter().any(|decl| rest.starts_with(decl)) {
            pos = markup_declaration_end(bytes, pos)
                .ok_or_else(|| unterminated(pos, "markup declaration"))?;
            result.has_dtd_fragment = true;
        } else if is_conditional_section(rest) {
            pos = conditional_section_end(bytes, pos)
                .ok_or_else(|| unterminated(pos, "conditional section"))?;
            result.has_dtd_fragment = true;
        } else if rest[0] == b'%' {
            match parameter_reference_end(bytes, pos) {
                Some(end) => {
                    result.has_dtd_fragment = true;
                    pos = end;
                }
                None => break,
            }
        } else if rest[0] == b'<' && rest.get(1).copied().is_some_and(is_name_start) {
            let end = name_end(bytes, pos + 1);
            result.root_tag_name = Some(text[pos + 1..end].to_string());
            break;
        } else {
            break;
        }
    }

    Ok(result)
}

fn unterminated(offset: usize, construct: &str) -> ClassificationError {
    ClassificationError::Peek {
        offset,
        reason: format!("unterminated {construct}"),
    }
}

fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_xml_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

// `<?xml-stylesheet` is a processing instruction, not the declaration.
fn is_xml_declaration(rest: &[u8]) -> bool {
    rest.starts_with(b"<?xml") && rest.get(5).copied().is_some_and(is_xml_whitespace)
}

fn is_doctype(rest: &[u8]) -> bool {
    rest.get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case(b"<!DOCTYPE"))
        && rest.get(9).copied().is_some_and(is_xml_whitespace)
}

fn is_conditional_section(rest: &[u8]) -> bool {
    let Some(after) = rest.strip_prefix(b"<![") else {
        return false;
    };
    let after = &after[skip_whitespace(after, 0)..];
    after.starts_with(b"INCLUDE") || after.starts_with(b"IGNORE") || after.starts_with(b"%")
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

fn name_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_name_char(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// End (exclusive) of a `<!...>` declaration starting at `start`.
///
/// Quoted literals and a bracketed internal subset may contain `>`; comments
/// inside the subset are skipped whole so their apostrophes do not open a
/// literal.
fn markup_declaration_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 2;
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;

    while pos < bytes.len() {
        let b = bytes[pos];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            pos += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'<' if depth > 0 && bytes[pos..].starts_with(b"<!--") => {
                pos = find_from(bytes, pos + 4, b"-->")? + 3;
                continue;
            }
            b'>' if depth == 0 => return Some(pos + 1),
            _ => {}
        }
        pos += 1;
    }
    None
}

/// End (exclusive) of a possibly nested `<![ ... ]]>` section.
fn conditional_section_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 3;
    let mut depth = 1usize;

    while pos < bytes.len() {
        let rest = &bytes[pos..];
        if rest.starts_with(b"<![") {
            depth += 1;
            pos += 3;
        } else if rest.starts_with(b"]]>") {
            depth -= 1;
            pos += 3;
            if depth == 0 {
                return Some(pos);
            }
        } else {
            pos += 1;
        }
    }
    None
}

/// End (exclusive) of `%name;`, or `None` when `%` does not start one.
fn parameter_reference_end(bytes: &[u8], start: usize) -> Option<usize> {
    let name_start = start + 1;
    if !bytes.get(name_start).copied().is_some_and(is_name_start) {
        return None;
    }
    let end = name_end(bytes, name_start);
    (bytes.get(end) == Some(&b';')).then_some(end + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: usize = 64 * 1024;

    fn peek(text: &str) -> XmlPeekResult {
        peek_xml(text, LIMIT).unwrap()
    }

    // ============================================================================
    // Preamble and Root Tag
    // ============================================================================

    #[test]
    fn test_preamble_and_root() {
        let result = peek("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<topic id=\"t1\"><title/></topic>");
        assert_eq!(
            result.preamble_raw.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(result.root_tag_name.as_deref(), Some("topic"));
        assert!(!result.has_dtd_fragment);
    }

    #[test]
    fn test_root_without_preamble() {
        let result = peek("  <html lang=\"en\"><body/></html>");
        assert!(!result.has_preamble());
        assert_eq!(result.root_tag_name.as_deref(), Some("html"));
    }

    #[test]
    fn test_bom_is_skipped() {
        let result = peek("\u{FEFF}<?xml version=\"1.0\"?><map/>");
        assert!(result.has_preamble());
        assert_eq!(result.root_tag_name.as_deref(), Some("map"));
    }

    #[test]
    fn test_namespaced_root_keeps_prefix() {
        let result = peek("<svg:svg xmlns:svg=\"http://www.w3.org/2000/svg\"/>");
        assert_eq!(result.root_tag_name.as_deref(), Some("svg:svg"));
    }

    #[test]
    fn test_stylesheet_pi_is_not_a_preamble() {
        let result = peek("<?xml-stylesheet href=\"a.xsl\"?><doc/>");
        assert!(!result.has_preamble());
        assert_eq!(result.root_tag_name.as_deref(), Some("doc"));
    }

    // ============================================================================
    // DOCTYPE
    // ============================================================================

    #[test]
    fn test_doctype_with_quoted_gt() {
        let text = "<!DOCTYPE topic PUBLIC \"-//X//DTD a>b//EN\" \"topic.dtd\"><topic/>";
        let result = peek(text);
        assert_eq!(
            result.doctype_raw.as_deref(),
            Some("<!DOCTYPE topic PUBLIC \"-//X//DTD a>b//EN\" \"topic.dtd\">")
        );
        assert_eq!(result.root_tag_name.as_deref(), Some("topic"));
    }

    #[test]
    fn test_doctype_internal_subset() {
        let text = "<!DOCTYPE doc [\n<!ENTITY a \"x>y\">\n<!-- don't -->\n]>\n<doc/>";
        let result = peek(text);
        assert!(result.doctype_raw.as_deref().unwrap().ends_with("]>"));
        assert_eq!(result.root_tag_name.as_deref(), Some("doc"));
        assert!(!result.has_dtd_fragment);
    }

    #[test]
    fn test_doctype_keyword_case_insensitive() {
        let result = peek("<!doctype html><html></html>");
        assert_eq!(result.doctype_raw.as_deref(), Some("<!doctype html>"));
    }

    #[test]
    fn test_only_first_doctype_kept() {
        let result = peek("<!DOCTYPE a><!DOCTYPE b><a/>");
        assert_eq!(result.doctype_raw.as_deref(), Some("<!DOCTYPE a>"));
    }

    // ============================================================================
    // DTD Markers
    // ============================================================================

    #[test]
    fn test_dtd_fragment() {
        let result = peek("<!-- module -->\n<!ENTITY % local \"\">\n%local;\n<!ELEMENT foo (bar)>\n<!ATTLIST foo id ID #IMPLIED>");
        assert!(result.has_dtd_fragment);
        assert!(!result.has_root_tag());
    }

    #[test]
    fn test_conditional_sections_nest() {
        let result = peek("<![%draft;[<![IGNORE[<!ELEMENT x ANY>]]>]]>\n<!NOTATION png SYSTEM \"png\">");
        assert!(result.has_dtd_fragment);
    }

    // ============================================================================
    // Not Found and Errors
    // ============================================================================

    #[test]
    fn test_plain_text_is_empty() {
        assert_eq!(peek("# Heading\n\nSome text < 5"), XmlPeekResult::default());
        assert_eq!(peek(""), XmlPeekResult::default());
    }

    #[test]
    fn test_cdata_at_top_level_stops() {
        assert_eq!(peek("<![CDATA[x]]><a/>"), XmlPeekResult::default());
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let err = peek_xml("<?xml version=\"1.0\"?>\n<!-- never closed", LIMIT).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::Peek {
                offset: 22,
                reason: "unterminated comment".to_string()
            }
        );
    }

    #[test]
    fn test_unterminated_preamble_is_error() {
        assert!(matches!(
            peek_xml("<?xml version=\"1.0\"", LIMIT),
            Err(ClassificationError::Peek { offset: 0, .. })
        ));
    }

    #[test]
    fn test_unterminated_doctype_is_error() {
        assert!(peek_xml("<!DOCTYPE a [ <!ENTITY b \"c\">", LIMIT).is_err());
    }

    #[test]
    fn test_limit_applies_to_construct_start() {
        let mut text = String::from("<!--");
        text.push_str(&"x".repeat(100));
        text.push_str("--><root/>");
        // The comment starts in bounds and ends past the limit; the root does not start in bounds.
        let result = peek_xml(&text, 10).unwrap();
        assert!(!result.has_root_tag());
        let result = peek_xml(&text, 200).unwrap();
        assert_eq!(result.root_tag_name.as_deref(), Some("root"));
    }

    proptest! {
        #[test]
        fn prop_peek_never_panics(text in ".{0,300}") {
            let _ = peek_xml(&text, 128);
        }

        #[test]
        fn prop_root_name_is_found(name in "[a-zA-Z_][a-zA-Z0-9_.-]{0,20}") {
            let text = format!("<?xml version=\"1.0\"?>\n<!-- c -->\n<{name} a=\"1\"/>");
            let result = peek_xml(&text, LIMIT).unwrap();
            prop_assert_eq!(result.root_tag_name, Some(name));
        }
    }
}
