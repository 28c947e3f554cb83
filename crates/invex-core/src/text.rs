//! Raw text extraction from classified documents.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::document::{InputKind, RawDocument};
use crate::error::{InvexError, Result};
use crate::ocr::{ImagePreprocessor, LayoutMode, OcrBackend};
use crate::pdf::PageReader;

/// Turns a document into one text blob: OCR for images, the embedded text
/// layer for PDFs.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrBackend>,
    pdf: Arc<dyn PageReader>,
    preprocessor: ImagePreprocessor,
    layout: LayoutMode,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrBackend>, pdf: Arc<dyn PageReader>) -> Self {
        Self {
            ocr,
            pdf,
            preprocessor: ImagePreprocessor::new(),
            layout: LayoutMode::UniformBlock,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Extract the text of `document`.
    ///
    /// OCR output is returned as the engine produced it. PDF pages are
    /// concatenated in order without separators; an image-only PDF yields
    /// an empty string.
    pub fn extract(&self, document: &RawDocument) -> Result<String> {
        let start = Instant::now();
        let text = match document.kind() {
            InputKind::Image => self.extract_image(document)?,
            InputKind::Pdf => self.extract_pdf(document)?,
            InputKind::Unknown => {
                return Err(InvexError::UnsupportedFormat(document.path().to_path_buf()));
            }
        };

        info!(
            "Extracted {} chars from {} in {}ms",
            text.len(),
            document.path().display(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn extract_image(&self, document: &RawDocument) -> Result<String> {
        let image = self.preprocessor.load(document.path())?;
        debug!(
            "Running OCR on {}x{} image ({:?})",
            image.width(),
            image.height(),
            self.layout
        );
        Ok(self.ocr.recognize(&image, self.layout)?)
    }

    fn extract_pdf(&self, document: &RawDocument) -> Result<String> {
        let pages = self.pdf.read_pages(document.path())?;
        debug!("Read {} PDF pages", pages.len());

        let text = pages.concat();
        if text.trim().is_empty() {
            warn!(
                "No text layer in {}; scanned PDFs are not OCR'd",
                document.path().display()
            );
        }
        Ok(text)
    }
}
