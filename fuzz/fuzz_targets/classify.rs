#![no_main]
use content_classifier::{Outcome, classify};
use libfuzzer_sys::fuzz_target;

const EXTENSIONS: [&str; 8] = ["", ".md", ".xml", ".dita", ".ditamap", ".dtd", ".html", ".svg"];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, content)) = data.split_first() else {
        return;
    };
    let ext = EXTENSIONS[usize::from(selector) % EXTENSIONS.len()];

    let result = classify(content, ext);
    let record = &result.record;

    if record.outcome != Outcome::Degenerate {
        assert!(record.mtype.is_some());
    }
    if record.is_binary {
        assert!(record.parsed_preamble.is_none());
        assert!(record.meta_text_split.is_none());
    }
    if let Some(split) = &record.meta_text_split {
        assert_eq!(split.text_range.end, content.len());
    }
    assert!(record.to_json().is_ok());
});
