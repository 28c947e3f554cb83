//! Error types for the invex-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Entity recognition error.
    #[error("NER error: {0}")]
    Ner(#[from] NerError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The file extension is neither a known image type nor PDF.
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Errors related to PDF text-layer reading.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,
}

/// Errors related to OCR backends.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to initialize the engine or load its models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The requested engine was not compiled into this build.
    #[error("OCR engine '{0}' not available in this build")]
    NotAvailable(String),
}

/// Errors related to named entity recognition.
#[derive(Error, Debug)]
pub enum NerError {
    /// The recognizer failed to process the text.
    #[error("entity recognition failed: {0}")]
    Backend(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
