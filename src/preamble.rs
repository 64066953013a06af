//! XML declaration parsing
//!
//! Accepts `<?xml version="1.x" encoding="..." standalone="yes|no"?>` with the
//! pseudo-attributes in that order; `encoding` and `standalone` are optional.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::ClassificationError;

/// Fields of an XML declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPreamble {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// Parse a raw `<?xml ... ?>` declaration.
///
/// # Errors
///
/// Returns [`ClassificationError::PreambleParse`] when `raw` does not match
/// the declaration grammar.
///
/// # Examples
///
/// ```rust
/// use content_classifier::preamble::parse_preamble;
///
/// let parsed = parse_preamble("<?xml version='1.0' standalone='yes'?>").unwrap();
/// assert_eq!(parsed.version, "1.0");
/// assert_eq!(parsed.encoding, None);
/// assert_eq!(parsed.standalone, Some(true));
/// ```
pub fn parse_preamble(raw: &str) -> Result<ParsedPreamble, ClassificationError> {
    static PREAMBLE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = PREAMBLE_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r#"^<\?xml\s+version\s*=\s*(?:"(1\.[0-9]+)"|'(1\.[0-9]+)')"#,
            r#"(?:\s+encoding\s*=\s*(?:"([A-Za-z][A-Za-z0-9._-]*)"|'([A-Za-z][A-Za-z0-9._-]*)'))?"#,
            r#"(?:\s+standalone\s*=\s*(?:"(yes|no)"|'(yes|no)'))?"#,
            r#"\s*\?>$"#,
        ))
        .ok()
    });
    let regex = regex
        .as_ref()
        .ok_or_else(|| ClassificationError::PreambleParse("declaration grammar unavailable".to_string()))?;

    let caps = regex
        .captures(raw)
        .ok_or_else(|| ClassificationError::PreambleParse(raw.to_string()))?;

    let version = either(&caps, 1, 2)
        .ok_or_else(|| ClassificationError::PreambleParse(raw.to_string()))?;

    Ok(ParsedPreamble {
        version: version.to_string(),
        encoding: either(&caps, 3, 4).map(str::to_string),
        standalone: either(&caps, 5, 6).map(|v| v == "yes"),
    })
}

// Double- and single-quoted alternatives capture into separate groups.
fn either<'t>(caps: &Captures<'t>, double: usize, single: usize) -> Option<&'t str> {
    caps.get(double)
        .or_else(|| caps.get(single))
        .map(|m| m.as_str())
}
