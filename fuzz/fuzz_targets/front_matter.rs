#![no_main]
use content_classifier::front_matter::split_front_matter;
use libfuzzer_sys::fuzz_target;

/// Max input size to keep YAML parse times bounded
const MAX_INPUT_SIZE: usize = 16 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE {
        return;
    }

    let mut content = b"---\n".to_vec();
    content.extend_from_slice(data);
    let (split, _warning) = split_front_matter(&content);

    assert_eq!(split.meta_range.start, 0);
    assert_eq!(split.meta_range.end, split.text_range.start);
    assert_eq!(split.text_range.end, content.len());
});
