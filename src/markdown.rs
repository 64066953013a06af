//! Markdown flavor hint
//!
//! A cheap line-oriented scan for constructs that only GitHub Flavored
//! Markdown defines. It does not render or validate anything; the result is a
//! hint for downstream converters.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Markdown flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkdownFlavor {
    /// CommonMark baseline
    #[serde(rename = "commonmark")]
    CommonMark,
    /// GitHub Flavored Markdown
    #[serde(rename = "gfm")]
    GitHubFlavoredMarkdown,
}

impl MarkdownFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkdownFlavor::CommonMark => "commonmark",
            MarkdownFlavor::GitHubFlavoredMarkdown => "gfm",
        }
    }
}

/// Pick a flavor for Markdown body text.
///
/// GFM when the text has a pipe-table delimiter row, a task-list item or
/// `~~strikethrough~~`; CommonMark otherwise.
///
/// ```rust
/// use content_classifier::markdown::{detect_flavor, MarkdownFlavor};
///
/// assert_eq!(detect_flavor("- [x] done\n- [ ] todo"), MarkdownFlavor::GitHubFlavoredMarkdown);
/// assert_eq!(detect_flavor("# Title\n\n---\n\ntext"), MarkdownFlavor::CommonMark);
/// ```
pub fn detect_flavor(text: &str) -> MarkdownFlavor {
    if gfm_patterns().iter().any(|re| re.is_match(text)) {
        MarkdownFlavor::GitHubFlavoredMarkdown
    } else {
        MarkdownFlavor::CommonMark
    }
}

fn gfm_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // table delimiter row: | --- | :-: |
            r"(?m)^[ \t]*\|?[ \t]*:?-+:?[ \t]*\|(?:[ \t]*:?-+:?[ \t]*\|?)*[ \t]*\r?$",
            // task list item
            r"(?m)^[ \t]*[-*+][ \t]+\[[ xX]\][ \t]",
            // strikethrough
            r"~~[^~\s](?:[^~\n]*[^~\s])?~~",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_gfm() {
        let text = "| a | b |\n|---|:-:|\n| 1 | 2 |\n";
        assert_eq!(detect_flavor(text), MarkdownFlavor::GitHubFlavoredMarkdown);
        let text = "a | b\n--- | ---\n1 | 2\n";
        assert_eq!(detect_flavor(text), MarkdownFlavor::GitHubFlavoredMarkdown);
    }

    #[test]
    fn test_strikethrough_is_gfm() {
        assert_eq!(
            detect_flavor("this is ~~gone~~ now"),
            MarkdownFlavor::GitHubFlavoredMarkdown
        );
        assert_eq!(detect_flavor("approx ~~ nothing"), MarkdownFlavor::CommonMark);
    }

    #[test]
    fn test_plain_commonmark() {
        let text = "# Heading\n\n* item\n* item\n\n---\n\n```\ncode\n```\n";
        assert_eq!(detect_flavor(text), MarkdownFlavor::CommonMark);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(MarkdownFlavor::CommonMark.as_str(), "commonmark");
        assert_eq!(
            serde_json::to_string(&MarkdownFlavor::GitHubFlavoredMarkdown).unwrap(),
            "\"gfm\""
        );
    }
}
