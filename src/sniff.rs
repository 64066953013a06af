//! MIME signal gathering
//!
//! Two independent sniffers look at the raw bytes:
//!
//! 1. **Heuristic sniffer**: a fast signature table over a short prefix
//!    (default 512 bytes), in the manner of the WHATWG MIME sniffing rules.
//!    It only ever answers with a coarse type and is advisory.
//! 2. **Library sniffer**: magic-number detection via the `infer` crate over
//!    the whole buffer, refined for text-based markup (SVG, XHTML/HTML, XML,
//!    EPS). Text/binary is decided by walking the MIME parent hierarchy and
//!    testing whether the type descends from `text/plain`. This signal is
//!    authoritative.
//!
//! Neither sniffer fails: content that cannot be identified is reported as
//! `application/octet-stream`.
//!
//! # Examples
//!
//! ```rust
//! use content_classifier::sniff::gather_signals;
//!
//! let signals = gather_signals(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR", 512);
//! assert_eq!(signals.library_mime, "image/png");
//! assert!(signals.library_is_binary);
//!
//! let signals = gather_signals(b"plain words here", 512);
//! assert!(!signals.heuristic_is_binary);
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::content::normalize_mime;
use crate::tables::MIME_PARENTS;

/// Generic "unknown binary" answer
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Maximum bytes the library sniffer scans for binary control bytes
const LIBRARY_TEXT_SCAN_LIMIT: usize = 1 << 20;

/// Maximum bytes scanned when refining text markup (SVG, HTML)
const MARKUP_SCAN_LIMIT: usize = 4096;

/// Maximum hops when walking the MIME hierarchy
const MAX_HIERARCHY_DEPTH: usize = 8;

/// Per-call MIME signals; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSignals {
    /// Answer of the prefix signature table (may carry `; charset=`)
    pub heuristic_mime: String,
    /// Answer of the magic-number library plus markup refinement
    pub library_mime: String,
    pub heuristic_is_binary: bool,
    pub library_is_binary: bool,
}

/// Run both sniffers over `bytes`.
///
/// `sniff_len` bounds the heuristic sniffer's window.
pub fn gather_signals(bytes: &[u8], sniff_len: usize) -> ContentSignals {
    let heuristic_mime = sniff_heuristic(bytes, sniff_len);
    let library_mime = sniff_library(bytes);
    ContentSignals {
        heuristic_is_binary: !normalize_mime(&heuristic_mime).starts_with("text/"),
        library_is_binary: !is_text_descendant(&library_mime),
        heuristic_mime,
        library_mime,
    }
}

// ============================================================================
// Heuristic sniffer
// ============================================================================

/// One row of the signature table
enum Signature {
    /// Case-insensitive HTML tag opening, followed by space or `>`
    Html(&'static [u8]),
    /// `(data & mask) == pattern`, optionally after leading whitespace
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
        mime: &'static str,
    },
    /// Literal prefix
    Exact(&'static [u8], &'static str),
    /// ISO base media file with an `mp4` brand
    Mp4,
}

const HTML_MIME: &str = "text/html; charset=utf-8";

const SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_ws: true,
        mime: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    Signature::Exact(b"\xFE\xFF", "text/plain; charset=utf-16be"),
    Signature::Exact(b"\xFF\xFE", "text/plain; charset=utf-16le"),
    Signature::Exact(b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
    Signature::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_ws: false,
        mime: "image/webp",
    },
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_ws: false,
        mime: "audio/aiff",
    },
    Signature::Exact(b"ID3", "audio/mpeg"),
    Signature::Exact(b"OggS\x00", "application/ogg"),
    Signature::Exact(b"MThd\x00\x00\x00\x06", "audio/midi"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_ws: false,
        mime: "video/avi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_ws: false,
        mime: "audio/wave",
    },
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    Signature::Exact(b"\x00\x61\x73\x6D", "application/wasm"),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> Option<&'static str> {
        match self {
            Signature::Html(sig) => html_matches(sig, data).then_some(HTML_MIME),
            Signature::Masked {
                mask,
                pattern,
                skip_ws,
                mime,
            } => {
                let data = if *skip_ws { skip_whitespace(data) } else { data };
                if data.len() < pattern.len() {
                    return None;
                }
                let hit = pattern
                    .iter()
                    .zip(mask.iter())
                    .zip(data.iter())
                    .all(|((p, m), d)| d & m == *p);
                hit.then_some(*mime)
            }
            Signature::Exact(prefix, mime) => data.starts_with(prefix).then_some(*mime),
            Signature::Mp4 => mp4_matches(data).then_some("video/mp4"),
        }
    }
}

/// Sniff a coarse MIME type from at most `sniff_len` leading bytes.
pub fn sniff_heuristic(bytes: &[u8], sniff_len: usize) -> String {
    let window = &bytes[..bytes.len().min(sniff_len)];

    if let Some(mime) = SIGNATURES.iter().find_map(|sig| sig.matches(window)) {
        return mime.to_string();
    }

    if window.iter().any(|&b| is_binary_data_byte(b)) {
        OCTET_STREAM.to_string()
    } else {
        "text/plain; charset=utf-8".to_string()
    }
}

fn html_matches(sig: &[u8], data: &[u8]) -> bool {
    let data = skip_whitespace(data);
    if data.len() < sig.len() + 1 {
        return false;
    }
    let head_matches = sig.iter().zip(data.iter()).all(|(&s, &d)| {
        if s.is_ascii_uppercase() {
            d & 0xDF == s
        } else {
            d == s
        }
    });
    head_matches && matches!(data[sig.len()], b' ' | b'>')
}

fn mp4_matches(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size < 12 || data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if &data[4..8] != b"ftyp" {
        return false;
    }
    // Major brand at 8, minor version at 12, compatible brands after
    (8..box_size)
        .step_by(4)
        .filter(|&st| st != 12)
        .any(|st| data.get(st..st + 3) == Some(b"mp4".as_slice()))
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Control bytes that never occur in text
fn is_binary_data_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

// ============================================================================
// Library sniffer
// ============================================================================

/// Identify `bytes` with the magic-number library, refining text results.
pub fn sniff_library(bytes: &[u8]) -> String {
    // infer reports EPS as plain PostScript
    if let Some(mime) = postscript_mime(bytes) {
        return mime.to_string();
    }

    if let Some(kind) = infer::get(bytes)
        && kind.matcher_type() != infer::MatcherType::Text
    {
        return kind.mime_type().to_string();
    }

    if let Some(charset) = utf16_bom_charset(bytes) {
        return format!("text/plain; charset={charset}");
    }

    let scan = &bytes[..bytes.len().min(LIBRARY_TEXT_SCAN_LIMIT)];
    if scan.iter().any(|&b| is_binary_data_byte(b)) {
        return OCTET_STREAM.to_string();
    }

    refine_text_mime(bytes).to_string()
}

fn postscript_mime(bytes: &[u8]) -> Option<&'static str> {
    if !bytes.starts_with(b"%!PS-Adobe-") {
        return None;
    }
    let first_line = bytes.split(|&b| b == b'\n' || b == b'\r').next().unwrap_or_default();
    if first_line.windows(4).any(|w| w == b"EPSF") {
        Some("image/x-eps")
    } else {
        Some("application/postscript")
    }
}

fn utf16_bom_charset(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFE, 0xFF, ..] => Some("utf-16be"),
        [0xFF, 0xFE, ..] => Some("utf-16le"),
        _ => None,
    }
}

/// Pick a specific text type from the leading markup
fn refine_text_mime(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(MARKUP_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head);
    let trimmed = head.trim_start_matches('\u{feff}').trim_start();

    static HTML_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html = HTML_REGEX.get_or_init(|| Regex::new(r"(?i)^(<!doctype\s+html|<html[\s>])").ok());
    if let Some(html) = html.as_ref()
        && html.is_match(trimmed)
    {
        return "text/html";
    }

    static SVG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let svg = SVG_REGEX.get_or_init(|| Regex::new(r"(?i)<svg[\s>]").ok());
    if let Some(svg) = svg.as_ref()
        && trimmed.starts_with('<')
        && svg.is_match(trimmed)
    {
        return "image/svg+xml";
    }

    if trimmed.starts_with("<?xml") {
        return "text/xml";
    }

    "text/plain"
}

/// Whether `mime` descends from `text/plain` in the MIME hierarchy
///
/// # Examples
///
/// ```rust
/// use content_classifier::sniff::is_text_descendant;
///
/// assert!(is_text_descendant("image/svg+xml"));
/// assert!(is_text_descendant("text/html; charset=utf-8"));
/// assert!(!is_text_descendant("image/png"));
/// ```
pub fn is_text_descendant(mime: &str) -> bool {
    let mut current = normalize_mime(mime);
    for _ in 0..MAX_HIERARCHY_DEPTH {
        if current == "text/plain" {
            return true;
        }
        current = match parent_of(&current) {
            Some(parent) => parent,
            None => return false,
        };
    }
    false
}

fn parent_of(mime: &str) -> Option<String> {
    if let Some((_, parent)) = MIME_PARENTS.iter().find(|(child, _)| *child == mime) {
        return Some((*parent).to_string());
    }
    if mime.starts_with("text/") {
        return Some("text/plain".to_string());
    }
    if mime.ends_with("+xml") {
        return Some("application/xml".to_string());
    }
    None
}
