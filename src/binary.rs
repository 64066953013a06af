//! Binary/text decision
//!
//! The library sniffer's hierarchy-based answer is authoritative. The
//! heuristic answer is advisory: when the two disagree the verdict records it
//! and a warning is logged, but classification proceeds.

use tracing::warn;

use crate::error::ClassificationError;
use crate::sniff::ContentSignals;

/// Prefixes that can only belong to text content
const TEXT_ONLY_PREFIXES: &[&[u8]] = &[b"---\n", b"<?xml"];

/// Outcome of reconciling the two binary signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryVerdict {
    pub is_binary: bool,
    /// The heuristic sniffer disagreed with the library
    pub disagreement: bool,
}

/// Resolve the two text/binary signals into one answer.
pub fn classify_binary(signals: &ContentSignals) -> BinaryVerdict {
    let disagreement = signals.heuristic_is_binary != signals.library_is_binary;
    if disagreement {
        warn!(
            heuristic_mime = %signals.heuristic_mime,
            library_mime = %signals.library_mime,
            library_is_binary = signals.library_is_binary,
            "MIME sniffers disagree on binary content; using library verdict"
        );
    }
    BinaryVerdict {
        is_binary: signals.library_is_binary,
        disagreement,
    }
}

/// Reject a binary verdict for content that starts like YAML or XML.
///
/// # Errors
///
/// Returns [`ClassificationError::InternalInconsistency`] when `is_binary`
/// is set for content starting with `---\n` or `<?xml`.
pub fn check_consistency(bytes: &[u8], is_binary: bool) -> Result<(), ClassificationError> {
    if !is_binary {
        return Ok(());
    }
    match TEXT_ONLY_PREFIXES.iter().find(|p| bytes.starts_with(p)) {
        Some(prefix) => Err(ClassificationError::InternalInconsistency(format!(
            "content starts with {:?} but was classified binary",
            String::from_utf8_lossy(prefix)
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(heuristic_is_binary: bool, library_is_binary: bool) -> ContentSignals {
        ContentSignals {
            heuristic_mime: "text/plain; charset=utf-8".to_string(),
            library_mime: "text/plain".to_string(),
            heuristic_is_binary,
            library_is_binary,
        }
    }

    #[test]
    fn test_library_signal_wins() {
        let verdict = classify_binary(&signals(false, true));
        assert!(verdict.is_binary);
        assert!(verdict.disagreement);

        let verdict = classify_binary(&signals(true, false));
        assert!(!verdict.is_binary);
        assert!(verdict.disagreement);
    }

    #[test]
    fn test_agreement_has_no_flag() {
        let verdict = classify_binary(&signals(true, true));
        assert!(verdict.is_binary);
        assert!(!verdict.disagreement);
    }

    #[test]
    fn test_consistency_rejects_binary_yaml_and_xml() {
        assert!(matches!(
            check_consistency(b"---\nkey: v\n", true),
            Err(ClassificationError::InternalInconsistency(_))
        ));
        assert!(matches!(
            check_consistency(b"<?xml version=\"1.0\"?>", true),
            Err(ClassificationError::InternalInconsistency(_))
        ));
    }

    #[test]
    fn test_consistency_accepts_other_cases() {
        assert!(check_consistency(b"---\nkey: v\n", false).is_ok());
        assert!(check_consistency(b"\xFF\xD8\xFF\xE0", true).is_ok());
    }
}
