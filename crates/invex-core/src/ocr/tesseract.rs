//! Tesseract backend through `leptess`.

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, GrayImage};
use leptess::{LepTess, Variable};
use tracing::{debug, info};

use super::{LayoutMode, OcrBackend};
use crate::error::OcrError;

/// OCR backend backed by the system Tesseract library.
///
/// `LepTess` handles are not thread-safe, so each call opens its own; the
/// constructor opens one up front so a missing language pack fails at startup.
pub struct TesseractRecognizer {
    data_path: Option<String>,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(data_path: Option<PathBuf>, language: &str) -> Result<Self, OcrError> {
        let recognizer = Self {
            data_path: data_path.map(|p| p.to_string_lossy().into_owned()),
            language: language.to_string(),
        };
        recognizer.open()?;
        info!("Initialized Tesseract with language '{}'", recognizer.language);
        Ok(recognizer)
    }

    fn open(&self) -> Result<LepTess, OcrError> {
        LepTess::new(self.data_path.as_deref(), &self.language)
            .map_err(|e| OcrError::ModelLoad(format!("tesseract: {}", e)))
    }
}

impl OcrBackend for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage, layout: LayoutMode) -> Result<String, OcrError> {
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to encode image: {}", e)))?;

        let mut lt = self.open()?;
        lt.set_variable(Variable::TesseditPagesegMode, &layout.page_seg_mode().to_string())
            .map_err(|e| OcrError::Recognition(format!("failed to set layout mode: {}", e)))?;
        lt.set_image_from_mem(&png)
            .map_err(|e| OcrError::Recognition(format!("failed to set image: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        debug!("Tesseract returned {} chars (psm {})", text.len(), layout.page_seg_mode());
        Ok(text)
    }
}
