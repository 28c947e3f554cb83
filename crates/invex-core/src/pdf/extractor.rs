//! PDF text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PageReader, Result};
use crate::error::PdfError;

/// PDF text-layer extractor using lopdf.
#[derive(Default)]
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes. Documents encrypted with an empty password are decrypted.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes for its fallback pass.
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        debug!("Loaded PDF with {} pages", doc.get_pages().len());
        self.document = Some(doc);
        Ok(())
    }

    /// Get the number of pages in the loaded PDF.
    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Text of every page, in page order.
    ///
    /// Pages are read with lopdf. When that yields no text at all the whole
    /// document is handed to pdf-extract, which copes with more font
    /// encodings, and its output is returned as a single page.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        let mut pages = Vec::with_capacity(doc.get_pages().len());
        for page_num in doc.get_pages().keys() {
            let text = match doc.extract_text(&[*page_num]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
            };
            trace!("Page {}: {} chars", page_num, text.len());
            pages.push(text);
        }

        if pages.is_empty() || pages.iter().any(|p| !p.trim().is_empty()) {
            return Ok(pages);
        }

        debug!("lopdf found no text, trying pdf-extract");
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(vec![text])
    }
}

impl PageReader for PdfExtractor {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;

        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;
        extractor.page_texts()
    }
}
