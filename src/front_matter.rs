//! YAML front-matter splitting
//!
//! Plain text may open with a YAML block:
//!
//! ```text
//! ---
//! title: Foo
//! tags: [a, b]
//! ---
//! # Body starts here
//! ```
//!
//! The block ends at the first later line that is exactly `---` or `...`
//! (trailing spaces, tabs and `\r` allowed). Ranges are byte offsets into the
//! original content, so the meta range always starts at 0 (a UTF-8 BOM, if
//! present, belongs to it) and the text range always ends at the content
//! length.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;
use std::ops::Range;

use crate::error::ClassificationError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Format of the leading metadata block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaFormat {
    None,
    Yaml,
}

/// Division of content into a metadata header and body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTextSplit {
    pub meta_range: Range<usize>,
    pub text_range: Range<usize>,
    pub meta_format: MetaFormat,
    /// Top-level keys in document order
    pub meta_properties: IndexMap<String, String>,
}

impl MetaTextSplit {
    /// Whole content is text
    pub fn text_only(len: usize) -> Self {
        Self {
            meta_range: 0..0,
            text_range: 0..len,
            meta_format: MetaFormat::None,
            meta_properties: IndexMap::new(),
        }
    }

    pub fn has_meta(&self) -> bool {
        self.meta_format != MetaFormat::None
    }

    /// Body bytes of `content`
    pub fn text<'a>(&self, content: &'a [u8]) -> &'a [u8] {
        content.get(self.text_range.clone()).unwrap_or_default()
    }
}

/// Split leading YAML front matter from `content`.
///
/// A malformed header still splits; the returned warning carries the YAML
/// error and the properties are left empty.
///
/// # Examples
///
/// ```rust
/// use content_classifier::front_matter::{split_front_matter, MetaFormat};
///
/// let content = b"---\ntitle: Foo\n---\n# Hello";
/// let (split, warning) = split_front_matter(content);
/// assert!(warning.is_none());
/// assert_eq!(split.meta_format, MetaFormat::Yaml);
/// assert_eq!(split.meta_range, 0..19);
/// assert_eq!(split.text_range, 19..content.len());
/// assert_eq!(split.meta_properties["title"], "Foo");
/// ```
pub fn split_front_matter(content: &[u8]) -> (MetaTextSplit, Option<ClassificationError>) {
    let Some(header) = find_header(content) else {
        return (MetaTextSplit::text_only(content.len()), None);
    };

    let (meta_properties, warning) = match parse_properties(&content[header.interior]) {
        Ok(properties) => (properties, None),
        Err(reason) => {
            tracing::warn!(reason = %reason, "Front matter kept without properties");
            (IndexMap::new(), Some(ClassificationError::YamlParse(reason)))
        }
    };

    let split = MetaTextSplit {
        meta_range: 0..header.split,
        text_range: header.split..content.len(),
        meta_format: MetaFormat::Yaml,
        meta_properties,
    };
    (split, warning)
}

struct Header {
    /// Bytes between the delimiter lines
    interior: Range<usize>,
    /// First byte after the closing delimiter line
    split: usize,
}

fn find_header(content: &[u8]) -> Option<Header> {
    let start = if content.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
    let rest = &content[start..];
    let opening = if rest.starts_with(b"---\n") {
        4
    } else if rest.starts_with(b"---\r\n") {
        5
    } else {
        return None;
    };

    let body_start = start + opening;
    let mut line_start = body_start;
    while line_start < content.len() {
        let newline = content[line_start..].iter().position(|&b| b == b'\n');
        let line_end = newline.map_or(content.len(), |i| line_start + i);
        if is_closing_delimiter(&content[line_start..line_end]) {
            let split = newline.map_or(content.len(), |_| line_end + 1);
            return Some(Header {
                interior: body_start..line_start,
                split,
            });
        }
        line_start = line_end + 1;
    }
    None
}

fn is_closing_delimiter(line: &[u8]) -> bool {
    let trimmed = line
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map_or(&line[..0], |last| &line[..=last]);
    trimmed == b"---" || trimmed == b"..."
}

fn parse_properties(interior: &[u8]) -> Result<IndexMap<String, String>, String> {
    let text = std::str::from_utf8(interior).map_err(|e| format!("front matter is not UTF-8: {e}"))?;
    if text.trim().is_empty() {
        return Ok(IndexMap::new());
    }

    let value: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Mapping(mapping) => Ok(mapping
            .iter()
            .map(|(key, value)| (render_value(key), render_value(value)))
            .collect()),
        other => Err(format!("front matter is a {}, not a mapping", kind_of(&other))),
    }
}

/// Scalars as plain text, `null` as empty, collections as compact flow YAML
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => render_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .or_else(|_| serde_yaml::to_string(value).map(|s| s.trim_end().to_string()))
            .unwrap_or_default(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
