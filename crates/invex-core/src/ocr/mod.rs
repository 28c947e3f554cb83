//! OCR seam: image preprocessing and pluggable recognition backends.

mod preprocessing;
#[cfg(feature = "onnx")]
mod pure_engine;
#[cfg(feature = "tesseract")]
mod tesseract;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "onnx")]
pub use pure_engine::OnnxRecognizer;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OcrError;
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Expected arrangement of text on the page, passed to the engine as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Fully automatic page segmentation.
    Auto,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// A single uniform block of text. Suits tabular key-value invoices.
    UniformBlock,
    /// As much text as possible, in no particular order.
    SparseText,
}

impl LayoutMode {
    /// Tesseract page segmentation mode number.
    pub fn page_seg_mode(&self) -> u8 {
        match self {
            LayoutMode::Auto => 3,
            LayoutMode::SingleColumn => 4,
            LayoutMode::UniformBlock => 6,
            LayoutMode::SparseText => 11,
        }
    }
}

impl Default for LayoutMode {
    fn default() -> Self {
        Self::UniformBlock
    }
}

/// Abstraction over an OCR engine.
///
/// Implementations receive an already preprocessed grayscale image and
/// return the engine's raw text, including its recognition noise.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &GrayImage, layout: LayoutMode) -> Result<String, OcrError>;
}

/// Returns a preset string and counts calls. Used to exercise the pipeline
/// without an OCR engine installed.
pub struct MockRecognizer {
    text: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<((u32, u32), LayoutMode)>>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of `recognize` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Image dimensions and layout mode of the most recent call.
    pub fn last_request(&self) -> Option<((u32, u32), LayoutMode)> {
        self.last_request.lock().ok().and_then(|guard| *guard)
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, image: &GrayImage, layout: LayoutMode) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some((image.dimensions(), layout));
        }
        Ok(self.text.clone())
    }
}

/// Stands in for an engine that was not compiled into this build.
///
/// Every call fails, so PDF documents can still be processed while image
/// documents report a clear error.
pub struct UnavailableRecognizer {
    engine: OcrEngineKind,
}

impl UnavailableRecognizer {
    pub fn new(engine: OcrEngineKind) -> Self {
        Self { engine }
    }
}

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image: &GrayImage, _layout: LayoutMode) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable(self.engine.to_string()))
    }
}

/// Build the backend selected in the configuration.
///
/// Fails with [`OcrError::NotAvailable`] when the engine's cargo feature is
/// disabled, and with [`OcrError::ModelLoad`] when the engine cannot start.
pub fn create_backend(config: &OcrConfig) -> Result<Arc<dyn OcrBackend>, OcrError> {
    match config.engine {
        #[cfg(feature = "tesseract")]
        OcrEngineKind::Tesseract => Ok(Arc::new(TesseractRecognizer::new(
            config.data_path.clone(),
            &config.language,
        )?)),
        #[cfg(feature = "onnx")]
        OcrEngineKind::Onnx => Ok(Arc::new(OnnxRecognizer::from_dir(&config.model_dir)?)),
        #[allow(unreachable_patterns)]
        other => Err(OcrError::NotAvailable(other.to_string())),
    }
}

/// Like [`create_backend`], but degrades to an [`UnavailableRecognizer`]
/// with a warning instead of failing.
pub fn create_backend_or_unavailable(config: &OcrConfig) -> Arc<dyn OcrBackend> {
    match create_backend(config) {
        Ok(backend) => backend,
        Err(e) => {
            warn!("OCR engine unavailable, image documents will fail: {}", e);
            Arc::new(UnavailableRecognizer::new(config.engine))
        }
    }
}
