//! Content Classifier - Rust library with a C FFI
//!
//! Given a byte buffer and an optional file-extension hint, this library
//! determines what kind of document the content is (binary, XML/HTML with or
//! without a DOCTYPE, DITA/LwDITA flavors, Markdown, DTD fragment, or
//! undetermined text) and produces a structured classification record for
//! downstream document-processing pipelines.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `sniff`: heuristic and library MIME signals
//! - `binary`: text/binary decision
//! - `charset`: character encoding detection and decoding
//! - `peek`: lexical scan for preamble, DOCTYPE, root tag and DTD markup
//! - `preamble` / `doctype`: declaration parsing and DOCTYPE family lookup
//! - `front_matter`: YAML front-matter splitting
//! - `resolver`: the decision procedure producing the MType
//! - `classifier`: options and the public entry point
//! - `record` / `mtype`: output types
//! - `markdown` / `digest`: Markdown flavor hint and content digest
//! - `ffi`: C-compatible interface
//!
//! # Example
//!
//! ```rust
//! let result = content_classifier::classify(b"---\ntitle: Foo\n---\n# Hello", ".md");
//! assert!(result.error.is_none());
//!
//! let record = result.record;
//! assert_eq!(record.mtype_string(), "mkdn/tpcOrMap/?fmt");
//! let split = record.meta_text_split.unwrap();
//! assert_eq!(split.meta_properties["title"], "Foo");
//! ```
//!
//! # Safety
//!
//! All FFI functions are marked `unsafe` and include safety documentation.
//! Memory allocated by Rust must be freed by Rust via the provided cleanup
//! functions.

// Module declarations
pub mod binary;
pub mod charset;
pub mod classifier;
pub mod content;
pub mod digest;
pub mod doctype;
pub mod error;
pub mod ffi;
pub mod front_matter;
pub mod markdown;
pub mod mtype;
pub mod peek;
pub mod preamble;
pub mod record;
pub mod resolver;
pub mod sniff;
pub mod tables;

// Re-export main types for convenience
pub use classifier::{Classification, Classifier, ClassifierOptions, classify};
pub use error::ClassificationError;
pub use ffi::{ClassificationResult, ClassifyOptions};
pub use mtype::{Family, MType, Specific, Subfamily};
pub use record::{ClassificationRecord, Outcome};
