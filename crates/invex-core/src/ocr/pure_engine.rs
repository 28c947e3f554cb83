//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use super::{LayoutMode, OcrBackend};
use crate::error::OcrError;

/// Rows closer than this many pixels are read as one line.
const ROW_HEIGHT: f64 = 20.0;

/// OCR backend running PaddleOCR ONNX models without an external runtime.
///
/// The detector finds its own text regions, so the layout hint is ignored.
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl OnnxRecognizer {
    /// Create a backend from `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` in a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl OcrBackend for OnnxRecognizer {
    fn recognize(&self, image: &GrayImage, layout: LayoutMode) -> Result<String, OcrError> {
        let start = Instant::now();
        debug!("Ignoring layout hint {:?} for onnx engine", layout);

        let rgb = DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(image.clone()).to_rgb8());
        let results = self
            .engine
            .run_from_image(&rgb)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut lines: Vec<((f64, f64), String)> = results
            .iter()
            .map(|r| (top_left(&r.bounding_box), r.text.replace("[UNK]", " ")))
            .collect();

        // Reading order: top-to-bottom by row band, then left-to-right.
        lines.sort_by(|(a, _), (b, _)| {
            let row_a = (a.1 / ROW_HEIGHT) as i64;
            let row_b = (b.1 / ROW_HEIGHT) as i64;
            row_a
                .cmp(&row_b)
                .then(a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        });

        let text = lines
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} text regions in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
