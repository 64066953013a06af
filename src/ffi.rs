//! FFI (Foreign Function Interface) layer for C integration
//!
//! C-compatible data structures and functions for calling the classifier
//! from document-processing pipelines written in C or anything that speaks
//! the C ABI.
//!
//! # FFI Boundary Contract
//!
//! ## CRITICAL: String Representation
//!
//! **All strings use UTF-8 bytes + length representation (NOT NUL-terminated C strings)**
//!
//! Every string field follows this pattern:
//! - Pointer field: `*mut u8` (points to UTF-8 bytes)
//! - Length field: `usize` with `_len` suffix (byte count, no NUL)
//!
//! ```c
//! // CORRECT: Use length field
//! fwrite(result.mtype, 1, result.mtype_len, stdout);
//!
//! // WRONG: Do NOT use strlen()
//! size_t len = strlen((char*)result.mtype);  // INCORRECT!
//! ```
//!
//! ## Memory Management
//!
//! - Rust allocates all output memory using `Box<[u8]>`
//! - C must call `classification_result_free()` exactly once per result
//! - After calling free, all pointers become invalid
//!
//! ```rust
//! use content_classifier::ffi::{
//!     classification_result_free, content_classifier_free, content_classifier_new,
//!     content_classify, ClassificationResult, ClassifyOptions,
//! };
//!
//! let handle = content_classifier_new();
//! let options = ClassifyOptions { compute_digest: 1, detect_markdown_flavor: 1 };
//! let mut result = ClassificationResult::empty();
//! let content = b"<!DOCTYPE html><html><body>Hi</body></html>";
//! let ext = b".html";
//!
//! unsafe {
//!     content_classify(handle, content.as_ptr(), content.len(), ext.as_ptr(), ext.len(), &options, &mut result);
//! }
//! assert_eq!(result.error_code, 0);
//! let mtype = unsafe { std::slice::from_raw_parts(result.mtype, result.mtype_len) };
//! assert_eq!(mtype, b"html/cnt/html5");
//!
//! unsafe {
//!     classification_result_free(&mut result);
//!     content_classifier_free(handle);
//! }
//! assert!(result.mtype.is_null());
//! ```
//!
//! ## Error Handling Contract
//!
//! Classification always produces a record, so the record fields are filled
//! whenever the call got as far as classifying, **including** when
//! `error_code != 0`:
//!
//! - `error_code = 0`: clean classification
//! - `error_code` 1-6: recoverable warning or terminal classification error
//!   (see `ERROR_*` constants); record fields are valid, `is_terminal` tells
//!   the two apart
//! - `ERROR_INVALID_INPUT` / `ERROR_INTERNAL`: the call failed before
//!   classifying; record fields are NULL
//!
//! **Panic Safety:** all FFI functions use `catch_unwind`; panics become
//! `ERROR_INTERNAL`.
//!
//! ## Thread Safety
//!
//! The classifier holds no mutable state. A handle may be shared across
//! threads as long as it is not freed while a call is in progress.

use std::panic;
use std::ptr;
use std::slice;

use crate::classifier::{Classification, Classifier, ClassifierOptions};
use crate::error::ClassificationError;
use crate::record::Outcome;

// ============================================================================
// Error Code Constants
// ============================================================================

/// Success - no error occurred
pub const ERROR_SUCCESS: u32 = 0;

/// Structural peek hit an unterminated construct
pub const ERROR_PEEK: u32 = 1;

/// Malformed XML declaration
pub const ERROR_PREAMBLE_PARSE: u32 = 2;

/// Malformed DOCTYPE declaration
pub const ERROR_DOCTYPE_PARSE: u32 = 3;

/// Malformed YAML front matter
pub const ERROR_YAML_PARSE: u32 = 4;

/// DOCTYPE root differs from the document root
pub const ERROR_ROOT_TAG_MISMATCH: u32 = 5;

/// XML markup without a root element (terminal)
pub const ERROR_MISSING_ROOT_TAG: u32 = 6;

/// Invalid input data (NULL pointers, non-UTF-8 extension)
pub const ERROR_INVALID_INPUT: u32 = 7;

/// Internal error (inconsistent detectors, panic caught)
pub const ERROR_INTERNAL: u32 = 99;

// ============================================================================
// FFI Data Structures
// ============================================================================

/// Per-call options passed from C to Rust
///
/// - `compute_digest`: 0 = skip, 1 = fill `content_digest` in the JSON record
/// - `detect_markdown_flavor`: 0 = skip, 1 = fill `markdown_flavor`
#[repr(C)]
pub struct ClassifyOptions {
    pub compute_digest: u8,
    pub detect_markdown_flavor: u8,
}

/// Classification result returned from Rust to C
///
/// # CRITICAL: String Representation
///
/// **All string fields use UTF-8 bytes + length (NOT NUL-terminated)**
///
/// # Field Descriptions
///
/// - `mtype`: `family/subfamily/specific` (empty, non-NULL, for degenerate content)
/// - `mime_type`: authoritative MIME type
/// - `mime_type_as_sniffed`: heuristic MIME type
/// - `record_json`: the full record as one JSON object
/// - `outcome`: see [`outcome_code`]
/// - `is_xml`, `is_binary`, `is_terminal`: 0 or 1
/// - `error_code`, `error_message`: see the module-level error contract
#[repr(C)]
pub struct ClassificationResult {
    pub mtype: *mut u8,
    pub mtype_len: usize,
    pub mime_type: *mut u8,
    pub mime_type_len: usize,
    pub mime_type_as_sniffed: *mut u8,
    pub mime_type_as_sniffed_len: usize,
    pub record_json: *mut u8,
    pub record_json_len: usize,
    pub outcome: u32,
    pub is_xml: u8,
    pub is_binary: u8,
    pub is_terminal: u8,
    /// Error code: 0=success, non-zero=error (see ERROR_* constants)
    pub error_code: u32,
    /// Error message (UTF-8 bytes, NULL if success)
    pub error_message: *mut u8,
    pub error_len: usize,
}

impl ClassificationResult {
    /// A result with every pointer NULL, ready to be passed to `content_classify`
    pub fn empty() -> Self {
        Self {
            mtype: ptr::null_mut(),
            mtype_len: 0,
            mime_type: ptr::null_mut(),
            mime_type_len: 0,
            mime_type_as_sniffed: ptr::null_mut(),
            mime_type_as_sniffed_len: 0,
            record_json: ptr::null_mut(),
            record_json_len: 0,
            outcome: 0,
            is_xml: 0,
            is_binary: 0,
            is_terminal: 0,
            error_code: ERROR_SUCCESS,
            error_message: ptr::null_mut(),
            error_len: 0,
        }
    }
}

/// Opaque handle to a Rust classifier instance
///
/// 1. Create: `content_classifier_new()`
/// 2. Use: `content_classify()` any number of times
/// 3. Destroy: `content_classifier_free()`
pub struct ContentClassifierHandle {
    base_options: ClassifierOptions,
}

/// Numeric form of [`Outcome`] used in [`ClassificationResult::outcome`]
pub fn outcome_code(outcome: Outcome) -> u32 {
    match outcome {
        Outcome::Degenerate => 0,
        Outcome::Binary => 1,
        Outcome::DtdFragment => 2,
        Outcome::XmlWithDoctype => 3,
        Outcome::XmlWithoutDoctype => 4,
        Outcome::Text => 5,
        Outcome::MissingRootTag => 6,
    }
}

fn into_raw_bytes(value: String) -> (*mut u8, usize) {
    let bytes = value.into_bytes().into_boxed_slice();
    let len = bytes.len();
    (Box::into_raw(bytes) as *mut u8, len)
}

fn reset_result(result: &mut ClassificationResult) {
    *result = ClassificationResult::empty();
}

fn set_error_result(result: &mut ClassificationResult, error_code: u32, error_message: String) {
    let (message, len) = into_raw_bytes(error_message);
    result.error_code = error_code;
    result.error_message = message;
    result.error_len = len;
}

fn set_classification_result(
    result: &mut ClassificationResult,
    classification: Classification,
) -> Result<(), ClassificationError> {
    let record = &classification.record;
    let json = record
        .to_json()
        .map_err(|e| ClassificationError::InternalInconsistency(format!("record serialization failed: {e}")))?;

    (result.mtype, result.mtype_len) = into_raw_bytes(record.mtype_string());
    (result.mime_type, result.mime_type_len) = into_raw_bytes(record.mime_type.clone());
    (result.mime_type_as_sniffed, result.mime_type_as_sniffed_len) =
        into_raw_bytes(record.mime_type_as_sniffed.clone());
    (result.record_json, result.record_json_len) = into_raw_bytes(json);
    result.outcome = outcome_code(record.outcome);
    result.is_xml = u8::from(record.is_xml);
    result.is_binary = u8::from(record.is_binary);
    result.is_terminal = u8::from(classification.is_terminal());

    if let Some(error) = &classification.error {
        set_error_result(result, error.code(), error.to_string());
    }
    Ok(())
}

fn required_ref<'a, T>(ptr: *const T, name: &str) -> Result<&'a T, ClassificationError> {
    if ptr.is_null() {
        return Err(ClassificationError::InvalidInput(format!(
            "{name} pointer is NULL"
        )));
    }

    // SAFETY: Caller provided a non-NULL pointer and accepts FFI contract
    // that this points to a valid, properly aligned value.
    Ok(unsafe { &*ptr })
}

fn required_bytes<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a [u8], ClassificationError> {
    if len == 0 {
        return Ok(&[]);
    }

    if ptr.is_null() {
        return Err(ClassificationError::InvalidInput(format!(
            "{name} pointer is NULL"
        )));
    }

    // SAFETY: Pointer was validated as non-NULL above; caller guarantees `len`
    // bytes are valid and readable for the duration of this call.
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

fn required_utf8<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a str, ClassificationError> {
    let bytes = required_bytes(ptr, len, name)?;
    std::str::from_utf8(bytes)
        .map_err(|e| ClassificationError::InvalidInput(format!("{name} is not UTF-8: {e}")))
}

fn classify_inner(
    handle_ref: &ContentClassifierHandle,
    content: &[u8],
    file_ext: &str,
    options_ref: &ClassifyOptions,
) -> Classification {
    let options = ClassifierOptions {
        compute_digest: options_ref.compute_digest != 0,
        detect_markdown_flavor: options_ref.detect_markdown_flavor != 0,
        ..handle_ref.base_options.clone()
    };
    Classifier::with_options(options).classify(content, file_ext)
}

fn free_buffer(ptr_field: &mut *mut u8, len_field: &mut usize) {
    if (*ptr_field).is_null() {
        return;
    }

    let raw = ptr::slice_from_raw_parts_mut(*ptr_field, *len_field);
    // SAFETY: `raw` was allocated by `Box<[u8]>` via `Box::into_raw`.
    let _ = unsafe { Box::from_raw(raw) };
    *ptr_field = ptr::null_mut();
    *len_field = 0;
}

// ============================================================================
// FFI Functions
// ============================================================================

/// Create a new classifier instance
///
/// # Returns
///
/// - Non-NULL pointer to `ContentClassifierHandle` on success
/// - NULL if a panic occurred during initialization
///
/// The returned handle must be freed with `content_classifier_free()`.
#[unsafe(no_mangle)]
pub extern "C" fn content_classifier_new() -> *mut ContentClassifierHandle {
    let result = panic::catch_unwind(|| {
        let handle = ContentClassifierHandle {
            base_options: ClassifierOptions::default(),
        };
        Box::into_raw(Box::new(handle))
    });

    result.unwrap_or(ptr::null_mut())
}

/// Classify content
///
/// # Parameters
///
/// - `handle`: classifier from `content_classifier_new()`, non-NULL
/// - `content` / `content_len`: bytes to classify; `content` may be NULL
///   only when `content_len == 0`
/// - `file_ext` / `file_ext_len`: UTF-8 extension hint (`".md"`, `"md"`, or
///   empty); may be NULL only when `file_ext_len == 0`
/// - `options`: non-NULL
/// - `result`: non-NULL; previous contents are overwritten without being
///   freed, so free earlier results first
///
/// # Error Codes
///
/// - `ERROR_INVALID_INPUT` (7): NULL pointer or non-UTF-8 extension
/// - 1-6: classification warning or terminal error; record fields are set
/// - `ERROR_INTERNAL` (99): inconsistent detectors or panic caught
///
/// # Safety
///
/// - All pointers are validated for NULL before dereferencing
/// - Invalid (non-NULL but bad) pointers cause undefined behavior
/// - Not calling `classification_result_free()` leaks memory (not UB)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn content_classify(
    handle: *const ContentClassifierHandle,
    content: *const u8,
    content_len: usize,
    file_ext: *const u8,
    file_ext_len: usize,
    options: *const ClassifyOptions,
    result: *mut ClassificationResult,
) {
    // Validate result pointer first so we can report errors.
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    reset_result(result_ref);

    let panic_result = panic::catch_unwind(|| -> Result<Classification, ClassificationError> {
        let handle_ref = required_ref(handle, "Classifier handle")?;
        let options_ref = required_ref(options, "Options")?;
        let content_slice = required_bytes(content, content_len, "Content")?;
        let file_ext_str = required_utf8(file_ext, file_ext_len, "File extension")?;
        Ok(classify_inner(handle_ref, content_slice, file_ext_str, options_ref))
    });

    let outcome = match panic_result {
        Ok(Ok(classification)) => set_classification_result(result_ref, classification),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ClassificationError::InternalInconsistency(
            "Internal panic during classification".to_string(),
        )),
    };

    if let Err(e) = outcome {
        // SAFETY: every field was produced by this module's allocation helpers.
        unsafe { classification_result_free(result_ref) };
        set_error_result(result_ref, e.code(), e.to_string());
    }
}

/// Free memory allocated in a classification result
///
/// Frees every non-NULL buffer, then sets pointers to NULL, lengths and
/// flags to 0. Safe to call more than once on the same result.
///
/// # Safety
///
/// - NULL `result` is a no-op
/// - The result must have been populated by `content_classify()` or built
///   with `ClassificationResult::empty()`
/// - Do NOT call C's `free()` on these pointers (allocator mismatch)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn classification_result_free(result: *mut ClassificationResult) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    free_buffer(&mut result_ref.mtype, &mut result_ref.mtype_len);
    free_buffer(&mut result_ref.mime_type, &mut result_ref.mime_type_len);
    free_buffer(
        &mut result_ref.mime_type_as_sniffed,
        &mut result_ref.mime_type_as_sniffed_len,
    );
    free_buffer(&mut result_ref.record_json, &mut result_ref.record_json_len);
    // NOTE: error_message is NOT a NUL-terminated C string, so no CString::from_raw().
    free_buffer(&mut result_ref.error_message, &mut result_ref.error_len);
    result_ref.outcome = 0;
    result_ref.is_xml = 0;
    result_ref.is_binary = 0;
    result_ref.is_terminal = 0;
    result_ref.error_code = ERROR_SUCCESS;
}

/// Destroy classifier instance
///
/// # Safety
///
/// - NULL handle is a no-op
/// - The handle must come from `content_classifier_new()` and must not be
///   used afterwards
#[unsafe(no_mangle)]
pub unsafe extern "C" fn content_classifier_free(handle: *mut ContentClassifierHandle) {
    if handle.is_null() {
        return;
    }

    // SAFETY: `handle` was validated as non-NULL above and was originally
    // created by `Box::into_raw` in `content_classifier_new`.
    unsafe { drop(Box::from_raw(handle)) };
}
