//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ocr::LayoutMode;

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Image preprocessing configuration.
    pub preprocessing: PreprocessConfig,

    /// Entity recognition configuration.
    pub ner: NerConfig,
}

/// OCR engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// Tesseract through `leptess` (feature `tesseract`).
    Tesseract,
    /// PaddleOCR ONNX models through `pure-onnx-ocr` (feature `onnx`).
    Onnx,
}

impl std::fmt::Display for OcrEngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrEngineKind::Tesseract => write!(f, "tesseract"),
            OcrEngineKind::Onnx => write!(f, "onnx"),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine used for image documents.
    pub engine: OcrEngineKind,

    /// Tesseract language(s), e.g. "eng" or "eng+deu".
    pub language: String,

    /// Tesseract data directory (tessdata). System default when unset.
    pub data_path: Option<PathBuf>,

    /// Directory containing det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,

    /// Layout hint passed to the engine.
    pub layout_mode: LayoutMode,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            language: "eng".to_string(),
            data_path: None,
            model_dir: PathBuf::from("models"),
            layout_mode: LayoutMode::UniformBlock,
        }
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Neighbourhood size for adaptive thresholding (odd, >= 3).
    pub block_size: u32,

    /// Constant subtracted from the weighted local mean.
    pub offset: f32,

    /// Gaussian blur kernel size (odd, >= 3).
    pub blur_kernel: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
            blur_kernel: 3,
        }
    }
}

/// Entity recognition configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Place names recognized in addition to the built-in gazetteer.
    pub extra_places: Vec<String>,
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = InvexConfig::default();
        assert_eq!(config.preprocessing.block_size, 11);
        assert_eq!(config.preprocessing.offset, 2.0);
        assert_eq!(config.preprocessing.blur_kernel, 3);
        assert_eq!(config.ocr.layout_mode, LayoutMode::UniformBlock);
        assert_eq!(config.ocr.engine, OcrEngineKind::Tesseract);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{"ocr": {"engine": "onnx"}, "ner": {"extra_places": ["Gdynia"]}}"#)
                .unwrap();
        assert_eq!(config.ocr.engine, OcrEngineKind::Onnx);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ner.extra_places, vec!["Gdynia".to_string()]);
        assert_eq!(config.preprocessing, PreprocessConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvexConfig::default();
        config.ocr.language = "eng+deu".to_string();
        config.save(&path).unwrap();

        let loaded = InvexConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.language, "eng+deu");
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = InvexConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
