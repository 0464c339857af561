//! Error types for the levha-core library.
//!
//! Only structurally unreadable input is an error. Missing fields are
//! represented in-band in [`crate::DocumentRecord`].

use thiserror::Error;

/// Main error type for the levha library.
#[derive(Error, Debug)]
pub enum LevhaError {
    /// Document container error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Identifier recovery could not start.
    #[error("recovery error: {0}")]
    Recovery(#[from] RecoveryError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the document container.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// No page yielded a content stream.
    #[error("no page content could be read")]
    ContentUnavailable,

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// Failed to extract the text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),
}

/// Errors raised before the recovery pipeline can run.
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// Input is neither a readable document nor a decodable raster.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Result type for the levha library.
pub type Result<T> = std::result::Result<T, LevhaError>;
