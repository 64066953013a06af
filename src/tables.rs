//! Static classification tables
//!
//! Known extension sets, DITA root elements, DOCTYPE identifier families and
//! the MIME parent hierarchy. These are fixed data, not configuration.

use crate::mtype::Family::{Html, Xml};
use crate::mtype::Subfamily::{Content, Map};
use crate::mtype::{Family, MType, Specific, Subfamily};
use self::KeyMatch::{Exact, Prefix};

/// Extensions of standalone DTD modules
pub const DTD_EXTENSIONS: &[&str] = &[".dtd", ".mod", ".ent"];

/// Extensions recognized as Markdown
pub const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".mdown", ".markdown", ".mkdn"];

/// Extensions of HTML5 pages
pub const HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Extension prefix shared by `.xht`, `.xhtml`, ...
pub const XHTML_EXTENSION_PREFIX: &str = ".xht";

/// Extensions used for DITA documents
pub const DITA_EXTENSIONS: &[&str] = &[".dita", ".ditamap", ".bookmap", ".xml"];

/// Extensions used for DITA maps
pub const MAP_EXTENSIONS: &[&str] = &[".ditamap", ".bookmap"];

/// Root element names of DITA document types
pub const DITA_ROOT_TAGS: &[&str] = &[
    "topic",
    "concept",
    "task",
    "reference",
    "glossentry",
    "glossgroup",
    "troubleshooting",
    "dita",
    "map",
    "bookmap",
    "subjectScheme",
    "learningAssessment",
    "learningContent",
    "learningOverview",
    "learningPlan",
    "learningSummary",
];

/// How a table key is compared against an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    Exact,
    Prefix,
}

/// One row of a DOCTYPE family table
#[derive(Debug, Clone, Copy)]
pub struct FamilyEntry {
    pub key: &'static str,
    pub key_match: KeyMatch,
    /// Semantic family label (`dita`, `html5`, `svg`, ...)
    pub family: &'static str,
    pub mtype_family: Family,
    pub subfamily: Subfamily,
    pub specific: &'static str,
}

impl FamilyEntry {
    pub fn mtype(&self) -> MType {
        MType::new(self.mtype_family, self.subfamily, Specific::new(self.specific))
    }
}

const fn entry(
    key: &'static str,
    key_match: KeyMatch,
    family: &'static str,
    mtype_family: Family,
    subfamily: Subfamily,
    specific: &'static str,
) -> FamilyEntry {
    FamilyEntry {
        key,
        key_match,
        family,
        mtype_family,
        subfamily,
        specific,
    }
}

/// Public identifiers, compared after whitespace collapsing, upper-casing and
/// removing DITA version numbers (`DITA 1.3 Topic` matches `DITA Topic`).
/// Order matters for prefix rows.
pub const PUBLIC_ID_FAMILIES: &[FamilyEntry] = &[
    entry("-//OASIS//DTD DITA Topic//EN", Exact, "dita", Xml, Content, "topic"),
    entry("-//OASIS//DTD DITA Concept//EN", Exact, "dita", Xml, Content, "concept"),
    entry("-//OASIS//DTD DITA Task//EN", Exact, "dita", Xml, Content, "task"),
    entry("-//OASIS//DTD DITA General Task//EN", Exact, "dita", Xml, Content, "task"),
    entry("-//OASIS//DTD DITA Machinery Task//EN", Exact, "dita", Xml, Content, "task"),
    entry("-//OASIS//DTD DITA Reference//EN", Exact, "dita", Xml, Content, "reference"),
    entry("-//OASIS//DTD DITA Glossary//EN", Exact, "dita", Xml, Content, "glossentry"),
    entry("-//OASIS//DTD DITA Glossary Entry//EN", Exact, "dita", Xml, Content, "glossentry"),
    entry("-//OASIS//DTD DITA Glossary Group//EN", Exact, "dita", Xml, Content, "glossgroup"),
    entry("-//OASIS//DTD DITA Troubleshooting//EN", Exact, "dita", Xml, Content, "troubleshooting"),
    entry("-//OASIS//DTD DITA Composite//EN", Exact, "dita", Xml, Content, "dita"),
    entry("-//OASIS//DTD DITA Learning Content//EN", Exact, "dita", Xml, Content, "learningContent"),
    entry("-//OASIS//DTD DITA Map//EN", Exact, "dita", Xml, Map, "map"),
    entry("-//OASIS//DTD DITA BookMap//EN", Exact, "dita", Xml, Map, "bookmap"),
    entry("-//OASIS//DTD DITA Subject Scheme Map//EN", Exact, "dita", Xml, Map, "subjectScheme"),
    entry("-//OASIS//DTD LIGHTWEIGHT DITA Topic//EN", Exact, "lwdita", Xml, Content, "xdita"),
    entry("-//OASIS//DTD LIGHTWEIGHT DITA Map//EN", Exact, "lwdita", Xml, Map, "xdita"),
    entry("-//W3C//DTD XHTML", Prefix, "xhtml", Html, Content, "xhtml"),
    entry("-//W3C//DTD HTML 4", Prefix, "html4", Html, Content, "html4"),
    entry("-//OASIS//DTD DocBook", Prefix, "docbook", Xml, Content, "docbook"),
    entry("-//W3C//DTD SVG", Prefix, "svg", Xml, Content, "svg"),
    entry("-//W3C//DTD MathML", Prefix, "mathml", Xml, Content, "mathml"),
];

/// System identifiers, matched against the whole identifier first and then
/// against its final path segment (case-insensitive)
pub const SYSTEM_ID_FAMILIES: &[FamilyEntry] = &[
    entry("about:legacy-compat", Exact, "html5", Html, Content, "html5"),
    entry("topic.dtd", Exact, "dita", Xml, Content, "topic"),
    entry("concept.dtd", Exact, "dita", Xml, Content, "concept"),
    entry("task.dtd", Exact, "dita", Xml, Content, "task"),
    entry("generalTask.dtd", Exact, "dita", Xml, Content, "task"),
    entry("machineryTask.dtd", Exact, "dita", Xml, Content, "task"),
    entry("reference.dtd", Exact, "dita", Xml, Content, "reference"),
    entry("glossentry.dtd", Exact, "dita", Xml, Content, "glossentry"),
    entry("glossgroup.dtd", Exact, "dita", Xml, Content, "glossgroup"),
    entry("troubleshooting.dtd", Exact, "dita", Xml, Content, "troubleshooting"),
    entry("ditabase.dtd", Exact, "dita", Xml, Content, "dita"),
    entry("map.dtd", Exact, "dita", Xml, Map, "map"),
    entry("bookmap.dtd", Exact, "dita", Xml, Map, "bookmap"),
    entry("subjectScheme.dtd", Exact, "dita", Xml, Map, "subjectScheme"),
    entry("lw-topic.dtd", Exact, "lwdita", Xml, Content, "xdita"),
    entry("lw-map.dtd", Exact, "lwdita", Xml, Map, "xdita"),
    entry("xhtml1-", Prefix, "xhtml", Html, Content, "xhtml"),
    entry("xhtml11.dtd", Exact, "xhtml", Html, Content, "xhtml"),
    entry("docbookx.dtd", Exact, "docbook", Xml, Content, "docbook"),
    entry("svg1", Prefix, "svg", Xml, Content, "svg"),
    entry("mathml2.dtd", Exact, "mathml", Xml, Content, "mathml"),
];

/// Root tag names consulted when a DOCTYPE carries no identifier
pub const ROOT_TAG_FAMILIES: &[FamilyEntry] = &[
    entry("html", Exact, "html5", Html, Content, "html5"),
    entry("svg", Exact, "svg", Xml, Content, "svg"),
    entry("math", Exact, "mathml", Xml, Content, "mathml"),
    entry("dmodule", Exact, "s1000d", Xml, Content, "dmodule"),
    entry("pm", Exact, "s1000d", Xml, Map, "pm"),
    entry("topic", Exact, "dita", Xml, Content, "topic"),
    entry("concept", Exact, "dita", Xml, Content, "concept"),
    entry("task", Exact, "dita", Xml, Content, "task"),
    entry("reference", Exact, "dita", Xml, Content, "reference"),
    entry("glossentry", Exact, "dita", Xml, Content, "glossentry"),
    entry("glossgroup", Exact, "dita", Xml, Content, "glossgroup"),
    entry("troubleshooting", Exact, "dita", Xml, Content, "troubleshooting"),
    entry("dita", Exact, "dita", Xml, Content, "dita"),
    entry("map", Exact, "dita", Xml, Map, "map"),
    entry("bookmap", Exact, "dita", Xml, Map, "bookmap"),
    entry("subjectScheme", Exact, "dita", Xml, Map, "subjectScheme"),
];

/// MIME sub-class relations (`child`, `parent`) beyond the generic rules
/// (`text/*` under `text/plain`, `*/*+xml` under `application/xml`)
pub const MIME_PARENTS: &[(&str, &str)] = &[
    ("application/xml", "text/plain"),
    ("application/xml-dtd", "text/plain"),
    ("application/xml-external-parsed-entity", "application/xml"),
    ("application/javascript", "text/plain"),
    ("application/ecmascript", "application/javascript"),
    ("application/json", "application/javascript"),
    ("application/x-yaml", "text/plain"),
    ("application/rtf", "text/plain"),
    ("application/x-sh", "text/plain"),
    ("application/x-tex", "text/plain"),
    ("image/x-eps", "application/postscript"),
];

/// Look up a table row; `key` must already be normalized by the caller.
pub fn find_entry(table: &'static [FamilyEntry], key: &str) -> Option<&'static FamilyEntry> {
    table.iter().find(|row| match row.key_match {
        KeyMatch::Exact => row.key.eq_ignore_ascii_case(key),
        KeyMatch::Prefix => key
            .get(..row.key.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(row.key)),
    })
}

/// Table spelling of `value`, compared case-insensitively
pub fn find_ignore_case(table: &[&'static str], value: &str) -> Option<&'static str> {
    table.iter().copied().find(|item| item.eq_ignore_ascii_case(value))
}
