//! Three-part semantic content tag
//!
//! An [`MType`] names what a document *is* for downstream pipelines, as
//! `family/subfamily/specific`:
//!
//! - `xml/cnt/topic` - a DITA topic without a DOCTYPE
//! - `html/cnt/html5` - an HTML5 page
//! - `mkdn/tpcOrMap/?fmt` - Markdown whose flavor is not decided here
//! - `bin/img/jpeg` - a JPEG image
//! - `-/-/-` - text of undetermined type
//!
//! Family and subfamily are closed enums so a tag can never be half-filled or
//! carry an unknown family. Only the slash-joined form crosses the crate
//! boundary (logging, JSON, FFI).
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::mtype::{Family, MType, Specific, Subfamily};
//!
//! let tag = MType::new(Family::Xml, Subfamily::Content, Specific::new("topic"));
//! assert_eq!(tag.to_string(), "xml/cnt/topic");
//!
//! let parsed: MType = "bin/img/jpeg".parse().unwrap();
//! assert_eq!(parsed.family, Family::Binary);
//! ```

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Placeholder used for every undetermined part of a tag
const UNDETERMINED: &str = "-";

/// Top-level content family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// XML vocabularies (DITA, DocBook, SVG, DTDs, ...)
    Xml,
    /// HTML and XHTML
    Html,
    /// Markdown
    Markdown,
    /// Binary content
    Binary,
    /// Text-based formats that sniff as binary-adjacent (SVG, EPS)
    Text,
    /// Text whose type could not be determined
    Undetermined,
}

impl Family {
    /// Wire form of the family
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Xml => "xml",
            Family::Html => "html",
            Family::Markdown => "mkdn",
            Family::Binary => "bin",
            Family::Text => "txt",
            Family::Undetermined => UNDETERMINED,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "xml" => Some(Family::Xml),
            "html" => Some(Family::Html),
            "mkdn" => Some(Family::Markdown),
            "bin" => Some(Family::Binary),
            "txt" => Some(Family::Text),
            UNDETERMINED => Some(Family::Undetermined),
            _ => None,
        }
    }
}

/// Second-level content grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subfamily {
    /// Content documents (topics, pages)
    Content,
    /// Maps and bookmaps
    Map,
    /// Schemas and DTD modules
    Schema,
    /// Images
    Image,
    /// Markdown that may be a topic or a map
    TopicOrMap,
    /// Structure was found but no rule matched it
    Unresolved,
    /// Nothing is known
    Undetermined,
}

impl Subfamily {
    /// Wire form of the subfamily
    pub fn as_str(&self) -> &'static str {
        match self {
            Subfamily::Content => "cnt",
            Subfamily::Map => "map",
            Subfamily::Schema => "sch",
            Subfamily::Image => "img",
            Subfamily::TopicOrMap => "tpcOrMap",
            Subfamily::Unresolved => "???",
            Subfamily::Undetermined => UNDETERMINED,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "cnt" => Some(Subfamily::Content),
            "map" => Some(Subfamily::Map),
            "sch" => Some(Subfamily::Schema),
            "img" => Some(Subfamily::Image),
            "tpcOrMap" => Some(Subfamily::TopicOrMap),
            "???" => Some(Subfamily::Unresolved),
            UNDETERMINED => Some(Subfamily::Undetermined),
            _ => None,
        }
    }
}

/// Free-form third part of a tag (`topic`, `html5`, `jpeg`, ...)
///
/// Always non-empty and never contains `/`, so the joined form splits back
/// into exactly three parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specific(String);

impl Specific {
    /// Build a specific part, replacing characters that would break the tag.
    ///
    /// Empty or whitespace-only input becomes `-`.
    pub fn new(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            return Self::undetermined();
        }
        let cleaned: String = token
            .chars()
            .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
            .collect();
        Specific(cleaned)
    }

    /// `-`
    pub fn undetermined() -> Self {
        Specific(UNDETERMINED.to_string())
    }

    /// `?fmt`: format exists but is decided by a later stage
    pub fn unknown_format() -> Self {
        Specific("?fmt".to_string())
    }

    /// `??!`: a text-based image format that sniffed as binary
    pub fn text_image() -> Self {
        Specific("??!".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Three-part semantic content tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MType {
    pub family: Family,
    pub subfamily: Subfamily,
    pub specific: Specific,
}

impl MType {
    pub fn new(family: Family, subfamily: Subfamily, specific: Specific) -> Self {
        Self {
            family,
            subfamily,
            specific,
        }
    }

    /// `-/-/-`: text, type undetermined
    pub fn undetermined() -> Self {
        Self::new(
            Family::Undetermined,
            Subfamily::Undetermined,
            Specific::undetermined(),
        )
    }

    /// `<family>/???/<specific>`: structure seen, no rule matched
    pub fn unresolved(family: Family, specific: &str) -> Self {
        Self::new(family, Subfamily::Unresolved, Specific::new(specific))
    }
}

impl fmt::Display for MType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.family.as_str(),
            self.subfamily.as_str(),
            self.specific.as_str()
        )
    }
}

impl Serialize for MType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a string is not a well-formed tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed mtype '{0}'")]
pub struct MTypeParseError(pub String);

impl FromStr for MType {
    type Err = MTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MTypeParseError(s.to_string());
        let mut parts = s.splitn(3, '/');
        let family = parts.next().and_then(Family::from_token).ok_or_else(malformed)?;
        let subfamily = parts
            .next()
            .and_then(Subfamily::from_token)
            .ok_or_else(malformed)?;
        let specific = parts.next().filter(|p| !p.is_empty() && !p.contains('/'));
        let specific = specific.ok_or_else(malformed)?;
        Ok(MType::new(family, subfamily, Specific::new(specific)))
    }
}
