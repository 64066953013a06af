//! MType resolution
//!
//! The decision procedure that turns the gathered signals and the structural
//! peek into one classification. States are tried in order and the first
//! applicable one wins:
//!
//! 1. **Too short**: degenerate record
//! 2. **Binary**: `bin/img/<fmt>`, `txt/img/??!` or `bin/???/<subtype>`
//! 3. **DTD fragment**: DTD markup, no root, DTD extension: `xml/sch/<ext>`
//! 4. **Non-XML text**: `mkdn/tpcOrMap/?fmt` or `-/-/-`, front matter split
//! 5. **XML with DOCTYPE**: the DOCTYPE's family is authoritative
//! 6. **XML without DOCTYPE**: rule table on root tag and extension
//! 7. **No usable structure**: an XML declaration without a root element
//!
//! Recoverable sub-stage failures are collected as warnings on the record;
//! only states 2 (inconsistent binary verdict) and 7 end with an error.

use tracing::{debug, warn};

use crate::binary::{check_consistency, classify_binary};
use crate::charset::{decode_text, detect_charset};
use crate::classifier::ClassifierOptions;
use crate::content::{RawContent, mime_eq, mime_subtype, normalize_mime};
use crate::digest::content_digest;
use crate::doctype::{check_root_tag, parse_doctype};
use crate::error::ClassificationError;
use crate::front_matter::split_front_matter;
use crate::markdown::detect_flavor;
use crate::mtype::{Family, MType, Specific, Subfamily};
use crate::peek::{XmlPeekResult, peek_xml};
use crate::preamble::parse_preamble;
use crate::record::{ClassificationRecord, Outcome};
use crate::sniff::{ContentSignals, gather_signals};
use crate::tables;

/// MIME type reported for standalone DTD modules
pub const DTD_MIME: &str = "application/xml-dtd";

/// Record plus the terminal error, if the call ended with one
#[derive(Debug)]
pub(crate) struct Resolution {
    pub record: ClassificationRecord,
    pub terminal: Option<ClassificationError>,
}

impl Resolution {
    fn done(record: ClassificationRecord) -> Self {
        Self {
            record,
            terminal: None,
        }
    }
}

/// Run the full decision procedure over one piece of content.
pub(crate) fn resolve(raw: RawContent<'_>, options: &ClassifierOptions) -> Resolution {
    let bytes = raw.bytes();
    if bytes.len() < options.min_content_len {
        debug!(len = bytes.len(), "Content too short to classify");
        return Resolution::done(ClassificationRecord::degenerate(raw.file_ext()));
    }

    let signals = gather_signals(bytes, options.sniff_len);
    let verdict = classify_binary(&signals);

    let mut record = ClassificationRecord::degenerate(raw.file_ext());
    record.mime_type = signals.library_mime.clone();
    record.mime_type_as_sniffed = signals.heuristic_mime.clone();
    record.is_binary = verdict.is_binary;
    record.signals_disagree = verdict.disagreement;
    if options.compute_digest {
        record.content_digest = Some(content_digest(bytes));
    }

    if verdict.is_binary {
        record.outcome = Outcome::Binary;
        record.mtype = Some(binary_mtype(&signals));
        return Resolution {
            record,
            terminal: check_consistency(bytes, true).err(),
        };
    }

    let charset = detect_charset(bytes);
    let text = decode_text(bytes, &charset);
    record.charset = Some(charset);

    let peek = match peek_xml(&text, options.peek_limit) {
        Ok(peek) => peek,
        Err(err) => {
            warn!(error = %err, "Structural peek failed; treating content as text");
            record.warnings.push(err);
            XmlPeekResult::default()
        }
    };
    record.root_tag = peek.root_tag_name.clone();

    // State 3
    if peek.has_dtd_fragment && !peek.has_root_tag() && raw.ext_is_one_of(tables::DTD_EXTENSIONS) {
        record.outcome = Outcome::DtdFragment;
        record.is_xml = true;
        record.mime_type = DTD_MIME.to_string();
        record.mtype = Some(MType::new(
            Family::Xml,
            Subfamily::Schema,
            Specific::new(raw.bare_ext()),
        ));
        return Resolution::done(record);
    }

    if let Some(preamble) = &peek.preamble_raw {
        match parse_preamble(preamble) {
            Ok(parsed) => record.parsed_preamble = Some(parsed),
            Err(err) => {
                warn!(error = %err, "Ignoring malformed XML declaration");
                record.warnings.push(err);
            }
        }
    }

    // State 5; a DOCTYPE that does not parse counts as absent
    let doctype = peek
        .doctype_raw
        .as_deref()
        .and_then(|raw_doctype| match parse_doctype(raw_doctype) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(error = %err, "Ignoring malformed DOCTYPE");
                record.warnings.push(err);
                None
            }
        });
    if let Some(doctype) = doctype {
        if let Err(err) = check_root_tag(&doctype, peek.root_tag_name.as_deref()) {
            warn!(error = %err, "DOCTYPE root differs from document root");
            record.warnings.push(err);
        }
        record.outcome = Outcome::XmlWithDoctype;
        record.is_xml = true;
        record.mtype = Some(doctype.resolved_mtype());
        record.parsed_doctype = Some(doctype);
        return Resolution::done(record);
    }

    // State 6
    if let Some(root) = peek.root_tag_name.as_deref() {
        record.outcome = Outcome::XmlWithoutDoctype;
        record.is_xml = true;
        record.mtype = Some(root_tag_mtype(root, &raw, &signals.library_mime));
        return Resolution::done(record);
    }

    // State 7; DTD markup outside a DTD file falls through to text
    if peek.has_preamble() && !peek.has_dtd_fragment {
        record.outcome = Outcome::MissingRootTag;
        record.is_xml = true;
        record.mtype = Some(MType::unresolved(Family::Xml, "-"));
        return Resolution {
            record,
            terminal: Some(ClassificationError::MissingRootTag),
        };
    }

    // State 4
    let mtype = text_mtype(&raw, &signals.library_mime);
    let (split, yaml_warning) = split_front_matter(bytes);
    record.warnings.extend(yaml_warning);
    if mtype.family == Family::Markdown && options.detect_markdown_flavor {
        let charset = record.charset.as_deref().unwrap_or("UTF-8");
        record.markdown_flavor = Some(detect_flavor(&decode_text(split.text(bytes), charset)));
    }
    record.outcome = Outcome::Text;
    record.mtype = Some(mtype);
    record.meta_text_split = Some(split);
    Resolution::done(record)
}

/// State 2: tag for binary content.
///
/// An `image/*` answer from either sniffer makes it an image; when either
/// answer also mentions `text` or `eps` it is a text-based image format.
pub fn binary_mtype(signals: &ContentSignals) -> MType {
    let library = normalize_mime(&signals.library_mime);
    let heuristic = normalize_mime(&signals.heuristic_mime);

    let image = [&library, &heuristic]
        .into_iter()
        .find(|mime| mime.starts_with("image/"));
    match image {
        Some(_) if [&library, &heuristic].iter().any(|m| m.contains("text") || m.contains("eps")) => {
            MType::new(Family::Text, Subfamily::Image, Specific::text_image())
        }
        Some(image) => MType::new(Family::Binary, Subfamily::Image, Specific::new(&mime_subtype(image))),
        None => MType::unresolved(Family::Binary, &mime_subtype(&library)),
    }
}

/// State 4: tag for text without XML structure
pub fn text_mtype(raw: &RawContent<'_>, library_mime: &str) -> MType {
    if normalize_mime(library_mime).starts_with("text/") && raw.ext_is_one_of(tables::MARKDOWN_EXTENSIONS) {
        return MType::new(Family::Markdown, Subfamily::TopicOrMap, Specific::unknown_format());
    }
    MType::undetermined()
}

/// State 6: tag for XML whose only structure is its root element
pub fn root_tag_mtype(root: &str, raw: &RawContent<'_>, library_mime: &str) -> MType {
    let ext = raw.file_ext();

    if root.eq_ignore_ascii_case("html") {
        if raw.ext_is_one_of(tables::HTML_EXTENSIONS) {
            return MType::new(Family::Html, Subfamily::Content, Specific::new("html5"));
        }
        if ext.starts_with(tables::XHTML_EXTENSION_PREFIX) {
            return MType::new(Family::Html, Subfamily::Content, Specific::new("xhtml"));
        }
    }

    if raw.ext_is_one_of(tables::DITA_EXTENSIONS)
        && let Some(dita_root) = tables::find_ignore_case(tables::DITA_ROOT_TAGS, root)
    {
        if dita_root == "bookmap" && raw.ext_is_one_of(tables::MAP_EXTENSIONS) {
            return MType::new(Family::Xml, Subfamily::Map, Specific::new("bookmap"));
        }
        return MType::new(Family::Xml, Subfamily::Content, Specific::new(dita_root));
    }

    if mime_eq(library_mime, "image/svg+xml") {
        return MType::new(Family::Xml, Subfamily::Content, Specific::new("svg"));
    }

    MType::unresolved(Family::Xml, &root.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(library: &str, heuristic: &str) -> ContentSignals {
        ContentSignals {
            heuristic_mime: heuristic.to_string(),
            library_mime: library.to_string(),
            heuristic_is_binary: true,
            library_is_binary: true,
        }
    }

    // ============================================================================
    // Binary Tags
    // ============================================================================

    #[test]
    fn test_binary_image() {
        let mtype = binary_mtype(&signals("image/jpeg", "image/jpeg"));
        assert_eq!(mtype.to_string(), "bin/img/jpeg");
        let mtype = binary_mtype(&signals("image/x-icon", "application/octet-stream"));
        assert_eq!(mtype.to_string(), "bin/img/x-icon");
    }

    #[test]
    fn test_text_based_image() {
        let mtype = binary_mtype(&signals("image/x-eps", "application/postscript"));
        assert_eq!(mtype.to_string(), "txt/img/??!");
        let mtype = binary_mtype(&signals("image/svg+xml", "text/plain; charset=utf-8"));
        assert_eq!(mtype.to_string(), "txt/img/??!");
    }

    #[test]
    fn test_non_image_binary() {
        let mtype = binary_mtype(&signals("application/pdf", "application/pdf"));
        assert_eq!(mtype.to_string(), "bin/???/pdf");
        let mtype = binary_mtype(&signals("application/octet-stream", "application/octet-stream"));
        assert_eq!(mtype.to_string(), "bin/???/octet-stream");
    }

    // ============================================================================
    // Text Tags
    // ============================================================================

    #[test]
    fn test_markdown_needs_text_mime_and_extension() {
        let raw = RawContent::new(b"# Title", ".md");
        assert_eq!(text_mtype(&raw, "text/plain").to_string(), "mkdn/tpcOrMap/?fmt");
        assert_eq!(text_mtype(&raw, "application/json").to_string(), "-/-/-");
        let raw = RawContent::new(b"# Title", ".txt");
        assert_eq!(text_mtype(&raw, "text/plain").to_string(), "-/-/-");
    }

    // ============================================================================
    // Root Tag Rules
    // ============================================================================

    #[test]
    fn test_html_root_rules() {
        let html = RawContent::new(b"", ".htm");
        assert_eq!(root_tag_mtype("HTML", &html, "text/html").to_string(), "html/cnt/html5");
        let xhtml = RawContent::new(b"", ".xhtml");
        assert_eq!(root_tag_mtype("html", &xhtml, "text/xml").to_string(), "html/cnt/xhtml");
        let other = RawContent::new(b"", ".xml");
        assert_eq!(root_tag_mtype("html", &other, "text/xml").to_string(), "xml/???/html");
    }

    #[test]
    fn test_dita_root_rules() {
        let dita = RawContent::new(b"", ".dita");
        assert_eq!(root_tag_mtype("concept", &dita, "text/xml").to_string(), "xml/cnt/concept");
        let map = RawContent::new(b"", ".ditamap");
        assert_eq!(root_tag_mtype("bookmap", &map, "text/xml").to_string(), "xml/map/bookmap");
        assert_eq!(root_tag_mtype("map", &map, "text/xml").to_string(), "xml/cnt/map");
        let xml = RawContent::new(b"", ".xml");
        assert_eq!(root_tag_mtype("bookmap", &xml, "text/xml").to_string(), "xml/cnt/bookmap");
        assert_eq!(
            root_tag_mtype("subjectscheme", &map, "text/xml").to_string(),
            "xml/cnt/subjectScheme"
        );
    }

    #[test]
    fn test_svg_and_fallback_rules() {
        let svg = RawContent::new(b"", ".svg");
        assert_eq!(root_tag_mtype("svg", &svg, "image/svg+xml").to_string(), "xml/cnt/svg");
        let topic = RawContent::new(b"", ".txt");
        assert_eq!(root_tag_mtype("Topic", &topic, "text/xml").to_string(), "xml/???/topic");
    }

    // ============================================================================
    // Whole Procedure
    // ============================================================================

    #[test]
    fn test_resolve_missing_root() {
        let raw = RawContent::new(b"<?xml version=\"1.0\"?>\n<!-- nothing -->", ".xml");
        let resolution = resolve(raw, &ClassifierOptions::default());
        assert_eq!(resolution.terminal, Some(ClassificationError::MissingRootTag));
        assert_eq!(resolution.record.outcome, Outcome::MissingRootTag);
        assert_eq!(resolution.record.mtype_string(), "xml/???/-");
        assert!(resolution.record.parsed_preamble.is_some());
    }

    #[test]
    fn test_resolve_dtd_markers_without_dtd_extension() {
        let raw = RawContent::new(b"<!ELEMENT foo (bar)>", ".txt");
        let resolution = resolve(raw, &ClassifierOptions::default());
        assert!(resolution.terminal.is_none());
        assert!(resolution.record.warnings.is_empty());
        assert_eq!(resolution.record.outcome, Outcome::Text);
        assert_eq!(resolution.record.mtype_string(), "-/-/-");
        assert!(!resolution.record.is_xml);
        assert!(resolution.record.meta_text_split.is_some());
    }

    #[test]
    fn test_resolve_preamble_with_dtd_markers_is_text() {
        let raw = RawContent::new(b"<?xml version=\"1.0\"?>\n<!ENTITY % a \"b\">", ".xml");
        let resolution = resolve(raw, &ClassifierOptions::default());
        assert!(resolution.terminal.is_none());
        assert_eq!(resolution.record.outcome, Outcome::Text);
    }

    #[test]
    fn test_resolve_peek_error_falls_back_to_text() {
        let raw = RawContent::new(b"<!-- never closed, just text", ".md");
        let resolution = resolve(raw, &ClassifierOptions::default());
        assert!(resolution.terminal.is_none());
        assert_eq!(resolution.record.outcome, Outcome::Text);
        assert!(matches!(
            resolution.record.warnings.first(),
            Some(ClassificationError::Peek { .. })
        ));
    }
}
