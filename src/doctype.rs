//! DOCTYPE parsing and family lookup
//!
//! The declaration is split into root name, public identifier, system
//! identifier and internal subset, then matched against the identifier
//! tables in [`crate::tables`] to find the document family.
//!
//! # Lookup Order
//!
//! 1. Public identifier (whitespace collapsed, case-insensitive, DITA
//!    version numbers removed). A public identifier that is present but not
//!    in the table maps to nothing; the lookup stops there.
//! 2. System identifier: the whole identifier, then its final path segment.
//! 3. Root element name.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::ClassificationError;
use crate::mtype::{Family, MType};
use crate::tables::{self, FamilyEntry};

/// Fields of a DOCTYPE declaration plus its mapped family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDoctype {
    pub root_tag: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    /// Semantic family label (`dita`, `html5`, `svg`, ...), `None` when unknown
    pub mapped_family: Option<String>,
    /// Tag implied by the mapped family
    pub mapped_mtype: Option<MType>,
    pub has_internal_subset: bool,
}

impl ParsedDoctype {
    /// Tag this declaration resolves to.
    ///
    /// Unknown declarations resolve to `xml/???/<root>`, or `html/???/html`
    /// when the declared root is `html`.
    pub fn resolved_mtype(&self) -> MType {
        if let Some(mtype) = &self.mapped_mtype {
            return mtype.clone();
        }
        let root = self.root_tag.to_lowercase();
        let family = if root == "html" { Family::Html } else { Family::Xml };
        MType::unresolved(family, &root)
    }
}

/// Parse a raw `<!DOCTYPE ...>` declaration and look up its family.
///
/// # Errors
///
/// Returns [`ClassificationError::DoctypeParse`] when `raw` does not match
/// the declaration grammar.
///
/// # Examples
///
/// ```rust
/// use content_classifier::doctype::parse_doctype;
///
/// let parsed = parse_doctype(
///     "<!DOCTYPE concept PUBLIC \"-//OASIS//DTD DITA 1.3 Concept//EN\" \"concept.dtd\">",
/// )
/// .unwrap();
/// assert_eq!(parsed.root_tag, "concept");
/// assert_eq!(parsed.mapped_family.as_deref(), Some("dita"));
/// assert_eq!(parsed.resolved_mtype().to_string(), "xml/cnt/concept");
/// ```
pub fn parse_doctype(raw: &str) -> Result<ParsedDoctype, ClassificationError> {
    static DOCTYPE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = DOCTYPE_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r#"(?is)^<!DOCTYPE\s+([^\s\[>]+)"#,
            r#"(?:\s+(?:PUBLIC\s+("[^"]*"|'[^']*')(?:\s+("[^"]*"|'[^']*'))?|SYSTEM\s+("[^"]*"|'[^']*')))?"#,
            r#"\s*(\[.*\])?\s*>$"#,
        ))
        .ok()
    });
    let regex = regex
        .as_ref()
        .ok_or_else(|| ClassificationError::DoctypeParse("declaration grammar unavailable".to_string()))?;

    let caps = regex
        .captures(raw)
        .ok_or_else(|| ClassificationError::DoctypeParse(raw.to_string()))?;

    let root_tag = caps
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ClassificationError::DoctypeParse(raw.to_string()))?;
    let public_id = caps.get(2).map(|m| unquote(m.as_str()));
    let system_id = caps.get(3).or_else(|| caps.get(4)).map(|m| unquote(m.as_str()));

    let mut parsed = ParsedDoctype {
        root_tag,
        public_id,
        system_id,
        mapped_family: None,
        mapped_mtype: None,
        has_internal_subset: caps.get(5).is_some(),
    };
    if let Some(entry) = lookup_family(&parsed) {
        parsed.mapped_family = Some(entry.family.to_string());
        parsed.mapped_mtype = Some(entry.mtype());
    }
    Ok(parsed)
}

/// Find the family table row for a parsed declaration
pub fn lookup_family(doctype: &ParsedDoctype) -> Option<&'static FamilyEntry> {
    if let Some(public_id) = &doctype.public_id {
        return tables::find_entry(tables::PUBLIC_ID_FAMILIES, &normalize_public_id(public_id));
    }

    if let Some(system_id) = &doctype.system_id {
        let system_id = system_id.trim();
        let file_name = system_id.rsplit(['/', '\\']).next().unwrap_or(system_id);
        if let Some(entry) = tables::find_entry(tables::SYSTEM_ID_FAMILIES, system_id)
            .or_else(|| tables::find_entry(tables::SYSTEM_ID_FAMILIES, file_name))
        {
            return Some(entry);
        }
    }

    tables::find_entry(tables::ROOT_TAG_FAMILIES, &doctype.root_tag)
}

/// Collapse whitespace runs and drop DITA version numbers
/// (`DITA 1.3 Topic` becomes `DITA Topic`).
pub fn normalize_public_id(public_id: &str) -> String {
    let collapsed = public_id.split_whitespace().collect::<Vec<_>>().join(" ");

    static DITA_VERSION_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = DITA_VERSION_REGEX.get_or_init(|| Regex::new(r"(?i)\bDITA [0-9]+(?:\.[0-9]+)* ").ok());
    match regex {
        Some(regex) => regex.replace_all(&collapsed, "DITA ").into_owned(),
        None => collapsed,
    }
}

/// Compare the declared root with the first element the peek found.
///
/// # Errors
///
/// Returns [`ClassificationError::RootTagMismatch`] when both are known and
/// differ (case-insensitive).
pub fn check_root_tag(doctype: &ParsedDoctype, peeked: Option<&str>) -> Result<(), ClassificationError> {
    match peeked {
        Some(peeked) if !peeked.eq_ignore_ascii_case(&doctype.root_tag) => {
            Err(ClassificationError::RootTagMismatch {
                declared: doctype.root_tag.clone(),
                peeked: peeked.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn unquote(literal: &str) -> String {
    literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string()
}
