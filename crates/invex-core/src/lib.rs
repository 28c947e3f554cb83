//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - File classification by extension
//! - Image preprocessing and pluggable OCR backends
//! - PDF text-layer reading
//! - Regex field extraction (invoice number, date, total amount)
//! - Address resolution from named entities
//! - Strict field validation and the end-to-end pipeline

pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ner;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod text;

pub use document::{classify, InputKind, RawDocument};
pub use error::{InvexError, NerError, OcrError, PdfError, Result};
pub use invoice::FieldPatternSet;
pub use models::{FieldName, InvexConfig, InvoiceRecord};
pub use ner::{Entity, EntityCategory, EntityRecognizer, HeuristicRecognizer};
pub use ocr::{create_backend, create_backend_or_unavailable, ImagePreprocessor, LayoutMode, OcrBackend};
pub use pdf::{PageReader, PdfExtractor};
pub use pipeline::{ExtractionResult, InvoicePipeline, InvoicePipelineBuilder};
pub use text::TextExtractor;
