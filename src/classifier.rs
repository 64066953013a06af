//! Classifier entry point
//!
//! [`Classifier`] owns the per-instance options and runs the decision
//! procedure in [`crate::resolver`] for each call. It holds no other state, so
//! one instance can be shared across threads and reused for any number of
//! calls.
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::classifier::{Classifier, ClassifierOptions};
//!
//! // Create classifier with default options
//! let classifier = Classifier::new();
//! let result = classifier.classify(b"<!DOCTYPE html><html><body>Hi</body></html>", ".html");
//! assert!(result.error.is_none());
//! assert_eq!(result.record.mtype_string(), "html/cnt/html5");
//!
//! // Or with custom options
//! let options = ClassifierOptions {
//!     compute_digest: false,
//!     ..Default::default()
//! };
//! let classifier = Classifier::with_options(options);
//! let result = classifier.classify(b"---\ntitle: Foo\n---\n# Hello", "md");
//! assert_eq!(result.record.mtype_string(), "mkdn/tpcOrMap/?fmt");
//! assert!(result.record.content_digest.is_none());
//! ```

use tracing::debug;

use crate::content::{RawContent, normalize_extension};
use crate::error::ClassificationError;
use crate::record::ClassificationRecord;
use crate::resolver::resolve;

/// Classification options
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// Content shorter than this yields a degenerate record
    pub min_content_len: usize,
    /// Window of the heuristic MIME sniffer
    pub sniff_len: usize,
    /// XML constructs must start within this many bytes of decoded text
    pub peek_limit: usize,
    /// Fill `markdown_flavor` for Markdown content
    pub detect_markdown_flavor: bool,
    /// Fill `content_digest`
    pub compute_digest: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            min_content_len: 6,
            sniff_len: 512,
            peek_limit: 64 * 1024,
            detect_markdown_flavor: true,
            compute_digest: true,
        }
    }
}

/// Result of one call: always a record, plus the error that accompanies it
///
/// `error` is the terminal error when the call ended with one, otherwise the
/// first recoverable warning. Either way the record is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub record: ClassificationRecord,
    pub error: Option<ClassificationError>,
}

impl Classification {
    /// Whether the call ended with a terminal error
    pub fn is_terminal(&self) -> bool {
        self.error.as_ref().is_some_and(ClassificationError::is_terminal)
    }

    /// Record and accompanying error as a pair
    pub fn into_parts(self) -> (ClassificationRecord, Option<ClassificationError>) {
        (self.record, self.error)
    }

    /// The record, unless the call ended with a terminal error.
    ///
    /// # Errors
    ///
    /// Returns the terminal error ([`ClassificationError::MissingRootTag`] or
    /// [`ClassificationError::InternalInconsistency`]); the partial record is
    /// dropped. Use [`Classification::into_parts`] to keep it.
    pub fn into_result(self) -> Result<ClassificationRecord, ClassificationError> {
        match self.error {
            Some(error) if error.is_terminal() => Err(error),
            _ => Ok(self.record),
        }
    }
}

/// Content classifier
pub struct Classifier {
    options: ClassifierOptions,
}

impl Classifier {
    /// Create a new classifier with default options
    pub fn new() -> Self {
        Self {
            options: ClassifierOptions::default(),
        }
    }

    /// Create a new classifier with custom options
    pub fn with_options(options: ClassifierOptions) -> Self {
        Self { options }
    }

    /// Classify `content`, using `file_ext` (with or without the leading
    /// dot, any case) as a hint.
    pub fn classify(&self, content: &[u8], file_ext: &str) -> Classification {
        let file_ext = normalize_extension(file_ext);
        let resolution = resolve(RawContent::new(content, &file_ext), &self.options);

        let record = resolution.record;
        let error = resolution
            .terminal
            .or_else(|| record.warnings.first().cloned());

        debug!(
            file_ext = %record.file_ext,
            outcome = ?record.outcome,
            mtype = %record.mtype_string(),
            warnings = record.warnings.len(),
            terminal = error.as_ref().is_some_and(ClassificationError::is_terminal),
            "Classified content"
        );

        Classification { record, error }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with default options.
///
/// ```rust
/// let result = content_classifier::classify(b"<!ELEMENT foo (bar)>", ".dtd");
/// assert_eq!(result.record.mtype_string(), "xml/sch/dtd");
/// assert_eq!(result.record.mime_type, "application/xml-dtd");
/// ```
pub fn classify(content: &[u8], file_ext: &str) -> Classification {
    Classifier::new().classify(content, file_ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Outcome;

    #[test]
    fn test_default_options() {
        let options = ClassifierOptions::default();
        assert_eq!(options.min_content_len, 6);
        assert_eq!(options.sniff_len, 512);
        assert_eq!(options.peek_limit, 65536);
        assert!(options.detect_markdown_flavor);
        assert!(options.compute_digest);
    }

    #[test]
    fn test_extension_is_normalized() {
        let result = Classifier::new().classify(b"# Title\n\nBody text", "MD");
        assert_eq!(result.record.file_ext, ".md");
        assert_eq!(result.record.mtype_string(), "mkdn/tpcOrMap/?fmt");
    }

    #[test]
    fn test_custom_min_content_len() {
        let classifier = Classifier::with_options(ClassifierOptions {
            min_content_len: 64,
            ..Default::default()
        });
        let result = classifier.classify(b"<topic id=\"t\"/>", ".dita");
        assert_eq!(result.record.outcome, Outcome::Degenerate);
    }

    #[test]
    fn test_flavor_detection_can_be_disabled() {
        let classifier = Classifier::with_options(ClassifierOptions {
            detect_markdown_flavor: false,
            ..Default::default()
        });
        let result = classifier.classify(b"- [x] done\n", ".md");
        assert!(result.record.markdown_flavor.is_none());
    }

    #[test]
    fn test_first_warning_is_reported() {
        let content = b"<?xml version=\"9\"?><!DOCTYPE a><b/>";
        let result = classify(content, ".xml");
        assert!(matches!(result.error, Some(ClassificationError::PreambleParse(_))));
        assert_eq!(result.record.warnings.len(), 2);
        assert!(!result.is_terminal());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_terminal_error_wins_over_warnings() {
        let result = classify(b"<?xml version=\"x\"?>   ", ".xml");
        assert_eq!(result.error, Some(ClassificationError::MissingRootTag));
        assert_eq!(result.record.warnings.len(), 1);
        let (record, error) = result.clone().into_parts();
        assert_eq!(record.mtype_string(), "xml/???/-");
        assert!(error.is_some());
        assert_eq!(result.into_result(), Err(ClassificationError::MissingRootTag));
    }
}
