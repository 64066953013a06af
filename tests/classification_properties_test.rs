//! Property-based tests for classification invariants

use content_classifier::{Family, Outcome, classify};
use proptest::prelude::*;

fn any_extension() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "", ".", ".md", ".MD", "markdown", ".dita", ".ditamap", ".xml", ".html", ".xhtml", ".dtd",
        ".mod", ".txt", ".jpg", ".svg",
    ])
    .prop_map(str::to_string)
}

/// Bytes biased towards the shapes the resolver branches on
fn structured_content() -> impl Strategy<Value = Vec<u8>> {
    let prefix: Vec<&'static [u8]> = vec![
        b"".as_slice(),
        b"---\n".as_slice(),
        b"---\ntitle: x\n---\n".as_slice(),
        b"<?xml version=\"1.0\"?>".as_slice(),
        b"<!DOCTYPE html>".as_slice(),
        b"<!DOCTYPE topic PUBLIC \"-//OASIS//DTD DITA Topic//EN\" \"topic.dtd\">".as_slice(),
        b"<!ELEMENT a (b)>".as_slice(),
        b"<!-- c -->".as_slice(),
        b"<topic id=\"t\">".as_slice(),
        b"\xEF\xBB\xBF".as_slice(),
        b"\x89PNG\r\n\x1a\n".as_slice(),
    ];
    (prop::sample::select(prefix), prop::collection::vec(any::<u8>(), 0..64)).prop_map(|(prefix, tail)| {
        let mut bytes = prefix.to_vec();
        bytes.extend(tail);
        bytes
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_short_content_is_degenerate(
        content in prop::collection::vec(any::<u8>(), 0..6),
        ext in any_extension(),
    ) {
        let result = classify(&content, &ext);
        prop_assert!(result.error.is_none());
        prop_assert_eq!(result.record.outcome, Outcome::Degenerate);
        prop_assert_eq!(result.record.mtype_string(), "");
    }

    #[test]
    fn prop_classification_is_idempotent(content in structured_content(), ext in any_extension()) {
        let first = classify(&content, &ext);
        let second = classify(&content, &ext);
        prop_assert_eq!(first.record.to_json().unwrap(), second.record.to_json().unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_family_is_never_empty(content in structured_content(), ext in any_extension()) {
        let result = classify(&content, &ext);
        if !result.record.is_degenerate() {
            let mtype = result.record.mtype.as_ref();
            prop_assert!(mtype.is_some());
            prop_assert!(!mtype.map(|m| m.family.as_str()).unwrap_or_default().is_empty());
        }
    }

    #[test]
    fn prop_binary_has_no_parsed_parts(content in structured_content(), ext in any_extension()) {
        let record = classify(&content, &ext).record;
        if record.is_binary {
            prop_assert!(record.parsed_preamble.is_none());
            prop_assert!(record.parsed_doctype.is_none());
            prop_assert!(record.meta_text_split.is_none());
        }
    }

    #[test]
    fn prop_text_split_covers_content(content in structured_content(), ext in any_extension()) {
        let record = classify(&content, &ext).record;
        if let Some(split) = &record.meta_text_split {
            prop_assert_eq!(record.outcome, Outcome::Text);
            prop_assert_eq!(split.meta_range.start, 0);
            prop_assert_eq!(split.meta_range.end, split.text_range.start);
            prop_assert_eq!(split.text_range.end, content.len());
        } else if record.outcome == Outcome::Text {
            prop_assert!(false, "text outcome without a split");
        }
    }

    #[test]
    fn prop_terminal_error_only_for_terminal_outcomes(content in structured_content(), ext in any_extension()) {
        let result = classify(&content, &ext);
        if result.is_terminal() {
            prop_assert!(matches!(
                result.record.outcome,
                Outcome::MissingRootTag | Outcome::Binary
            ));
        }
    }

    #[test]
    fn prop_binary_images_keep_subtype(
        tail in prop::collection::vec(any::<u8>(), 8..64),
    ) {
        let mut content = b"\xFF\xD8\xFF\xE0".to_vec();
        content.extend(tail);
        let record = classify(&content, ".jpg").record;
        prop_assert!(record.is_binary);
        prop_assert_eq!(record.mtype.map(|m| (m.family, m.to_string())), Some((Family::Binary, "bin/img/jpeg".to_string())));
    }
}
