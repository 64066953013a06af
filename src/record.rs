//! Classification record
//!
//! The value handed back to callers. It is built once per call and never
//! mutated afterwards; it serializes to JSON for the FFI and corpus tooling.

use serde::Serialize;

use crate::doctype::ParsedDoctype;
use crate::error::ClassificationError;
use crate::front_matter::MetaTextSplit;
use crate::markdown::MarkdownFlavor;
use crate::mtype::MType;
use crate::preamble::ParsedPreamble;

/// Which branch of the decision procedure produced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Too short to classify
    Degenerate,
    Binary,
    /// Standalone DTD module
    DtdFragment,
    XmlWithDoctype,
    XmlWithoutDoctype,
    /// Not XML: Markdown or undetermined text
    Text,
    /// XML indicators without a root element
    MissingRootTag,
}

/// Structured classification of one piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    pub file_ext: String,
    pub outcome: Outcome,
    /// Library MIME type, or `application/xml-dtd` for DTD fragments
    pub mime_type: String,
    /// Heuristic sniffer's MIME type
    pub mime_type_as_sniffed: String,
    /// `None` only for degenerate records
    pub mtype: Option<MType>,
    pub is_xml: bool,
    pub is_binary: bool,
    /// The two MIME sniffers disagreed on text/binary
    pub signals_disagree: bool,
    pub charset: Option<String>,
    pub content_digest: Option<String>,
    pub root_tag: Option<String>,
    pub parsed_preamble: Option<ParsedPreamble>,
    pub parsed_doctype: Option<ParsedDoctype>,
    pub meta_text_split: Option<MetaTextSplit>,
    pub markdown_flavor: Option<MarkdownFlavor>,
    /// Recoverable conditions met along the way, in pipeline order
    pub warnings: Vec<ClassificationError>,
}

impl ClassificationRecord {
    /// Record for content too short to classify: only the extension is set.
    pub fn degenerate(file_ext: &str) -> Self {
        Self {
            file_ext: file_ext.to_string(),
            outcome: Outcome::Degenerate,
            mime_type: String::new(),
            mime_type_as_sniffed: String::new(),
            mtype: None,
            is_xml: false,
            is_binary: false,
            signals_disagree: false,
            charset: None,
            content_digest: None,
            root_tag: None,
            parsed_preamble: None,
            parsed_doctype: None,
            meta_text_split: None,
            markdown_flavor: None,
            warnings: Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.outcome == Outcome::Degenerate
    }

    /// Slash-joined tag, `""` for degenerate records
    pub fn mtype_string(&self) -> String {
        self.mtype.as_ref().map(MType::to_string).unwrap_or_default()
    }

    /// Serialize the record as a single JSON line.
    ///
    /// # Errors
    ///
    /// Propagates the `serde_json` error; the record's own types always
    /// serialize, so this only fails on writer-level problems.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
