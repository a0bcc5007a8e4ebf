//! PPTX (OOXML) backend for presentation spell checking.
//!
//! Reads .pptx packages (ZIP archives of XML parts) into the core document
//! model, fetches them from URLs or paths, and writes corrections back.

pub mod apply;
pub mod package;
pub mod parser;
pub mod source;

#[cfg(test)]
mod fixtures;

pub use apply::{apply_corrections, ApplyReport};
pub use parser::PptxReader;
pub use source::{extract_from_source, fetch, DocumentSource, FetchOptions, LocalDocument};
