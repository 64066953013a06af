#![no_main]
use content_classifier::ffi::{
    ClassificationResult, ClassifyOptions, ERROR_INTERNAL, ERROR_INVALID_INPUT,
    classification_result_free, content_classifier_free, content_classifier_new, content_classify,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the extension length, the rest splits into ext + content
    let Some((&ext_len, rest)) = data.split_first() else {
        return;
    };
    let ext_len = usize::from(ext_len % 8).min(rest.len());
    let (ext, content) = rest.split_at(ext_len);

    let handle = content_classifier_new();
    assert!(!handle.is_null());
    let options = ClassifyOptions {
        compute_digest: 1,
        detect_markdown_flavor: 1,
    };
    let mut result = ClassificationResult::empty();

    unsafe {
        content_classify(
            handle,
            content.as_ptr(),
            content.len(),
            ext.as_ptr(),
            ext.len(),
            &options,
            &mut result,
        );
    }

    if result.error_code == ERROR_INVALID_INPUT {
        assert!(std::str::from_utf8(ext).is_err());
        assert!(result.mtype.is_null());
    } else {
        assert!(!result.record_json.is_null());
        if result.error_code == ERROR_INTERNAL {
            assert_eq!(result.is_terminal, 1);
        }
    }

    unsafe {
        classification_result_free(&mut result);
        content_classifier_free(handle);
    }
});
