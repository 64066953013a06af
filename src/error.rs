//! Error types for classification

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Conditions raised while classifying content
///
/// Most variants are recoverable: they are collected on the record and
/// classification continues with defaults for the failed stage. Only
/// [`MissingRootTag`](ClassificationError::MissingRootTag) and
/// [`InternalInconsistency`](ClassificationError::InternalInconsistency) end a
/// call with an error, and even then a partial record is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// The structural peek hit unrecoverable lexical corruption
    #[error("Peek error at byte {offset}: {reason}")]
    Peek { offset: usize, reason: String },
    /// The `<?xml ...?>` preamble does not match the declaration grammar
    #[error("Preamble parse error: {0}")]
    PreambleParse(String),
    /// The `<!DOCTYPE ...>` declaration does not match the declaration grammar
    #[error("DOCTYPE parse error: {0}")]
    DoctypeParse(String),
    /// YAML front matter could not be parsed into key/value pairs
    #[error("YAML front matter error: {0}")]
    YamlParse(String),
    /// DOCTYPE root and the document's first element disagree
    #[error("Root tag mismatch: DOCTYPE declares '{declared}', document starts with '{peeked}'")]
    RootTagMismatch { declared: String, peeked: String },
    /// XML indicators were found but no root element
    #[error("Missing root tag: XML markup found but no root element")]
    MissingRootTag,
    /// Independent detectors disagree in a way that should be impossible
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
    /// Invalid input data (FFI boundary only)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClassificationError {
    /// Get numeric error code for FFI
    pub fn code(&self) -> u32 {
        match self {
            ClassificationError::Peek { .. } => 1,
            ClassificationError::PreambleParse(_) => 2,
            ClassificationError::DoctypeParse(_) => 3,
            ClassificationError::YamlParse(_) => 4,
            ClassificationError::RootTagMismatch { .. } => 5,
            ClassificationError::MissingRootTag => 6,
            ClassificationError::InvalidInput(_) => 7,
            ClassificationError::InternalInconsistency(_) => 99,
        }
    }

    /// Whether this condition ends the call with an error result
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClassificationError::MissingRootTag | ClassificationError::InternalInconsistency(_)
        )
    }
}

impl Serialize for ClassificationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_variants() {
        assert!(ClassificationError::MissingRootTag.is_terminal());
        assert!(ClassificationError::InternalInconsistency("x".into()).is_terminal());
        assert!(!ClassificationError::YamlParse("x".into()).is_terminal());
        assert!(
            !ClassificationError::RootTagMismatch {
                declared: "topic".into(),
                peeked: "concept".into()
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ClassificationError::Peek {
                offset: 0,
                reason: String::new(),
            },
            ClassificationError::PreambleParse(String::new()),
            ClassificationError::DoctypeParse(String::new()),
            ClassificationError::YamlParse(String::new()),
            ClassificationError::RootTagMismatch {
                declared: String::new(),
                peeked: String::new(),
            },
            ClassificationError::MissingRootTag,
            ClassificationError::InvalidInput(String::new()),
            ClassificationError::InternalInconsistency(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn test_display_mentions_both_tags() {
        let err = ClassificationError::RootTagMismatch {
            declared: "topic".into(),
            peeked: "concept".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("topic"));
        assert!(msg.contains("concept"));
    }
}
