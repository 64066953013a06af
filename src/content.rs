//! Caller-supplied content and the normalizations applied before comparison
//!
//! Extensions are compared lower-cased with a leading dot; MIME types are
//! compared without parameters (`text/html; charset=utf-8` equals
//! `text/html`).
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::content::{normalize_extension, normalize_mime};
//!
//! assert_eq!(normalize_extension("MD"), ".md");
//! assert_eq!(normalize_extension("."), "");
//! assert_eq!(normalize_mime("Text/HTML; charset=UTF-8"), "text/html");
//! ```

/// Content bytes plus the normalized extension hint
///
/// Borrowed for the duration of one call; the engine never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct RawContent<'a> {
    bytes: &'a [u8],
    file_ext: &'a str,
}

impl<'a> RawContent<'a> {
    /// `file_ext` must already be normalized with [`normalize_extension`].
    pub fn new(bytes: &'a [u8], file_ext: &'a str) -> Self {
        Self { bytes, file_ext }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn file_ext(&self) -> &'a str {
        self.file_ext
    }

    /// Extension without its leading dot (`dtd` for `.dtd`)
    pub fn bare_ext(&self) -> &'a str {
        self.file_ext.trim_start_matches('.')
    }

    pub fn ext_is_one_of(&self, table: &[&str]) -> bool {
        table.contains(&self.file_ext)
    }
}

/// Normalize a file extension: trimmed, lower-cased, one leading dot.
///
/// An empty string or a lone dot normalizes to `""`.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return String::new();
    }
    format!(".{}", trimmed.to_lowercase())
}

/// Strip MIME parameters and lower-case the essence.
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Compare two MIME types ignoring parameters and case
pub fn mime_eq(a: &str, b: &str) -> bool {
    normalize_mime(a) == normalize_mime(b)
}

/// Subtype of a MIME essence (`jpeg` for `image/jpeg; q=1`)
pub fn mime_subtype(mime: &str) -> String {
    let essence = normalize_mime(mime);
    match essence.split_once('/') {
        Some((_, sub)) => sub.to_string(),
        None => essence,
    }
}
