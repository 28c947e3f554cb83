//! PDF text-layer reading.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Reads the embedded text layer of a PDF, one string per page in page order.
///
/// Scanned PDFs without a text layer yield empty pages; no OCR is attempted.
pub trait PageReader: Send + Sync {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>>;
}

/// Returns fixed pages regardless of the path.
pub struct StaticPageReader {
    pages: Vec<String>,
}

impl StaticPageReader {
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageReader for StaticPageReader {
    fn read_pages(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}
