//! Error types for presentation extraction and spell checking.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting, checking, or rewriting a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read, or write a local file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The document could not be fetched from its source.
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// The file is not a presentation package we can read.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The completion service could not be reached or answered with an error.
    #[error("Completion request failed: {0}")]
    ProviderError(String),

    /// The completion service answered with something other than the expected JSON object.
    #[error("Invalid completion reply: {0}")]
    InvalidReply(String),

    /// Required configuration (such as the API key) is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
