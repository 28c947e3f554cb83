//! End-to-end document processing.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::document::{InputKind, RawDocument};
use crate::error::Result;
use crate::invoice::{extract_fields, validate, AddressResolver, FieldPatternSet};
use crate::models::{FieldName, InvexConfig, InvoiceRecord};
use crate::ner::{EntityRecognizer, HeuristicRecognizer};
use crate::ocr::{create_backend_or_unavailable, ImagePreprocessor, OcrBackend};
use crate::pdf::{PageReader, PdfExtractor};
use crate::text::TextExtractor;

/// Record plus diagnostics for one processed document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Validated fields.
    pub record: InvoiceRecord,
    /// How the input was classified.
    pub kind: InputKind,
    /// Text the fields were extracted from.
    pub raw_text: String,
    /// Fields that were extracted but failed validation.
    pub rejected: Vec<FieldName>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Builder for [`InvoicePipeline`].
///
/// Collaborators left unset are created from the configuration: the OCR
/// engine it names (or an unavailable stand-in), [`PdfExtractor`] and
/// [`HeuristicRecognizer`].
pub struct InvoicePipelineBuilder {
    ocr: Option<Arc<dyn OcrBackend>>,
    pdf: Option<Arc<dyn PageReader>>,
    ner: Option<Arc<dyn EntityRecognizer>>,
    patterns: Option<FieldPatternSet>,
    config: InvexConfig,
}

impl InvoicePipelineBuilder {
    pub fn new() -> Self {
        Self {
            ocr: None,
            pdf: None,
            ner: None,
            patterns: None,
            config: InvexConfig::default(),
        }
    }

    /// Set the OCR backend.
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrBackend>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Set the PDF page reader.
    pub fn with_page_reader(mut self, pdf: Arc<dyn PageReader>) -> Self {
        self.pdf = Some(pdf);
        self
    }

    /// Set the entity recognizer.
    pub fn with_entity_recognizer(mut self, ner: Arc<dyn EntityRecognizer>) -> Self {
        self.ner = Some(ner);
        self
    }

    /// Replace the default field pattern catalog.
    pub fn with_patterns(mut self, patterns: FieldPatternSet) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// Set configuration.
    pub fn with_config(mut self, config: InvexConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline. Fails on invalid preprocessing settings or
    /// gazetteer entries.
    pub fn build(self) -> Result<InvoicePipeline> {
        let preprocessor = ImagePreprocessor::from_config(&self.config.preprocessing)?;

        let ocr: Arc<dyn OcrBackend> = match self.ocr {
            Some(ocr) => ocr,
            None => create_backend_or_unavailable(&self.config.ocr),
        };
        let pdf: Arc<dyn PageReader> = match self.pdf {
            Some(pdf) => pdf,
            None => Arc::new(PdfExtractor::new()),
        };
        let ner: Arc<dyn EntityRecognizer> = match self.ner {
            Some(ner) => ner,
            None => Arc::new(HeuristicRecognizer::with_places(
                &self.config.ner.extra_places,
            )?),
        };

        Ok(InvoicePipeline {
            text: TextExtractor::new(ocr, pdf)
                .with_preprocessor(preprocessor)
                .with_layout(self.config.ocr.layout_mode),
            address: AddressResolver::new(ner),
            patterns: self.patterns.unwrap_or_default(),
        })
    }
}

impl Default for InvoicePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify, extract text, pull fields, resolve the address and validate.
///
/// Collaborators are shared read-only, so one pipeline can serve many
/// threads.
#[derive(Clone)]
pub struct InvoicePipeline {
    text: TextExtractor,
    address: AddressResolver,
    patterns: FieldPatternSet,
}

impl InvoicePipeline {
    /// Create a new builder.
    pub fn builder() -> InvoicePipelineBuilder {
        InvoicePipelineBuilder::new()
    }

    /// Pipeline with every collaborator created from `config`.
    pub fn from_config(config: InvexConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Process one file.
    ///
    /// Returns `Ok(None)` for unsupported file types; no extraction stage
    /// runs for them. Fields that are missing or fail validation are absent
    /// in the record. Backend failures are returned as errors.
    pub fn process(&self, path: &Path) -> Result<Option<InvoiceRecord>> {
        Ok(self.process_detailed(path)?.map(|result| result.record))
    }

    /// Like [`process`](Self::process), with the raw text and diagnostics.
    pub fn process_detailed(&self, path: &Path) -> Result<Option<ExtractionResult>> {
        let start = Instant::now();
        let document = RawDocument::new(path);

        if !document.kind().is_supported() {
            info!("Unsupported file format: {}", path.display());
            return Ok(None);
        }

        info!("Processing {} as {}", path.display(), document.kind());
        let raw_text = self.text.extract(&document)?;
        debug!("Raw text:\n{}", raw_text);

        let (record, rejected) = self.analyze(&raw_text)?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {}/{} fields from {} in {}ms",
            record.present_count(),
            FieldName::ALL.len(),
            path.display(),
            processing_time_ms
        );

        Ok(Some(ExtractionResult {
            record,
            kind: document.kind(),
            raw_text,
            rejected,
            processing_time_ms,
        }))
    }

    /// Run field extraction, address resolution and validation on text that
    /// was already extracted.
    pub fn process_text(&self, text: &str) -> Result<InvoiceRecord> {
        Ok(self.analyze(text)?.0)
    }

    fn analyze(&self, text: &str) -> Result<(InvoiceRecord, Vec<FieldName>)> {
        let mut record = extract_fields(text, &self.patterns);
        record.set(FieldName::Address, self.address.resolve(text)?);
        debug!("Extracted record before validation: {:?}", record);

        let rejected = validate(&mut record);
        if !rejected.is_empty() {
            info!("Rejected invalid fields: {:?}", rejected);
        }
        Ok((record, rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvexError, NerError, OcrError};
    use crate::models::config::OcrEngineKind;
    use crate::ner::{Entity, EntityCategory, StaticRecognizer};
    use crate::ocr::{MockRecognizer, UnavailableRecognizer};
    use crate::pdf::StaticPageReader;
    use image::{GrayImage, Luma};
    use pretty_assertions::assert_eq;

    const INVOICE_TEXT: &str =
        "ACME LTD\nInvoice Number: 12345\nDate: 2024-01-15\nTotal Amount: $1250.00";

    fn pipeline(ocr: Arc<MockRecognizer>, pages: &[&str], entities: Vec<Entity>) -> InvoicePipeline {
        InvoicePipeline::builder()
            .with_ocr(ocr)
            .with_page_reader(Arc::new(StaticPageReader::new(pages.iter().copied())))
            .with_entity_recognizer(Arc::new(StaticRecognizer::new(entities)))
            .build()
            .unwrap()
    }

    fn scan(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        GrayImage::from_pixel(64, 32, Luma([230])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_image_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = scan(&dir, "invoice.png");
        let ocr = Arc::new(MockRecognizer::new(INVOICE_TEXT));
        let pipeline = pipeline(ocr.clone(), &[], vec![]);

        let record = pipeline.process(&path).unwrap().unwrap();

        assert_eq!(
            record,
            InvoiceRecord {
                invoice_number: Some("12345".to_string()),
                date: Some("2024-01-15".to_string()),
                total_amount: Some("1250.00".to_string()),
                address: None,
            }
        );
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn test_pdf_with_address() {
        let ocr = Arc::new(MockRecognizer::new(""));
        let pipeline = pipeline(
            ocr.clone(),
            &["Invoice No: A100\n", "Grand Total: 99.50\n"],
            vec![
                Entity::new("Berlin", EntityCategory::GeoPoliticalEntity, 30, 36),
                Entity::new("Acme GmbH", EntityCategory::Organization, 0, 9),
            ],
        );

        let result = pipeline
            .process_detailed(Path::new("invoice.pdf"))
            .unwrap()
            .unwrap();

        assert_eq!(result.kind, InputKind::Pdf);
        assert_eq!(result.raw_text, "Invoice No: A100\nGrand Total: 99.50\n");
        assert_eq!(result.record.invoice_number.as_deref(), Some("A100"));
        assert_eq!(result.record.total_amount.as_deref(), Some("99.50"));
        assert_eq!(result.record.date, None);
        assert_eq!(result.record.address.as_deref(), Some("Acme GmbH Berlin"));
        assert!(result.rejected.is_empty());
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn test_garbled_invoice_number_rejected() {
        let ocr = Arc::new(MockRecognizer::new(
            "Invoice No: INV 2024!!\nDate: 2024-01-15\nTotal: 10.00",
        ));
        let dir = tempfile::tempdir().unwrap();
        let path = scan(&dir, "noisy.jpg");

        let result = pipeline(ocr, &[], vec![])
            .process_detailed(&path)
            .unwrap()
            .unwrap();

        assert_eq!(result.record.invoice_number, None);
        assert_eq!(result.record.date.as_deref(), Some("2024-01-15"));
        assert_eq!(result.record.total_amount.as_deref(), Some("10.00"));
        assert_eq!(result.rejected, vec![FieldName::InvoiceNumber]);
    }

    #[test]
    fn test_unsupported_file_skips_every_stage() {
        struct Failing;
        impl EntityRecognizer for Failing {
            fn entities(&self, _text: &str) -> std::result::Result<Vec<Entity>, NerError> {
                Err(NerError::Backend("must not be called".to_string()))
            }
        }

        let ocr = Arc::new(MockRecognizer::new(INVOICE_TEXT));
        let pipeline = InvoicePipeline::builder()
            .with_ocr(ocr.clone())
            .with_page_reader(Arc::new(StaticPageReader::new(["Invoice No: 1"])))
            .with_entity_recognizer(Arc::new(Failing))
            .build()
            .unwrap();

        assert_eq!(pipeline.process(Path::new("scan.docx")).unwrap(), None);
        assert_eq!(pipeline.process(Path::new("no_extension")).unwrap(), None);
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn test_empty_text_gives_empty_record() {
        let pipeline = pipeline(Arc::new(MockRecognizer::new("")), &[""], vec![]);

        let record = pipeline.process(Path::new("scan.pdf")).unwrap().unwrap();
        assert!(record.is_empty());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "invoice_number": null,
                "date": null,
                "total_amount": null,
                "address": null,
            })
        );
    }

    #[test]
    fn test_ocr_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = scan(&dir, "invoice.tiff");
        let pipeline = InvoicePipeline::builder()
            .with_ocr(Arc::new(UnavailableRecognizer::new(OcrEngineKind::Onnx)))
            .with_entity_recognizer(Arc::new(StaticRecognizer::new(vec![])))
            .build()
            .unwrap();

        let result = pipeline.process(&path);
        assert!(matches!(result, Err(InvexError::Ocr(OcrError::NotAvailable(_)))));
    }

    #[test]
    fn test_process_text() {
        let pipeline = InvoicePipeline::builder()
            .with_ocr(Arc::new(MockRecognizer::new("")))
            .build()
            .unwrap();

        let record = pipeline
            .process_text("Bill ID: X9\nIssue Date: 01/02/2024\nAcme Widgets Inc.\nParis")
            .unwrap();

        assert_eq!(record.invoice_number.as_deref(), Some("X9"));
        assert_eq!(record.date.as_deref(), Some("01/02/2024"));
        assert_eq!(record.total_amount, None);
        assert_eq!(record.address.as_deref(), Some("Acme Widgets Inc. Paris"));
    }

    #[test]
    fn test_well_formed_text_survives_validation() {
        let pipeline = pipeline(Arc::new(MockRecognizer::new("")), &[], vec![]);

        let record = pipeline
            .process_text("Invoice Number: INV2024\nDate: 2024-05-01\nGrand Total: $123.45")
            .unwrap();

        assert_eq!(
            record,
            InvoiceRecord {
                invoice_number: Some("INV2024".to_string()),
                date: Some("2024-05-01".to_string()),
                total_amount: Some("123.45".to_string()),
                address: None,
            }
        );
    }

    #[test]
    fn test_garbled_text_nulls_only_bad_field() {
        let pipeline = pipeline(Arc::new(MockRecognizer::new("")), &[], vec![]);

        let record = pipeline.process_text("Invoice Number: INV 2024!!").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_invoice_number_found_in_common_layouts() {
        let pipeline = pipeline(Arc::new(MockRecognizer::new("")), &[], vec![]);

        for (text, expected) in [
            ("INVOICE\nInvoice No: 123\nDate: 2024-01-15", "123"),
            ("INVOICE\nBill ID: B7", "B7"),
            ("Invoice Date: 2024-01-15\nInvoice Number: INV2024", "INV2024"),
            ("Invoice No: 123 Date: 2024-01-15", "123"),
        ] {
            let record = pipeline.process_text(text).unwrap();
            assert_eq!(record.invoice_number.as_deref(), Some(expected), "{:?}", text);
        }
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = FieldPatternSet::builder()
            .rule(FieldName::InvoiceNumber, r"Ref:\s*(\w+)")
            .build()
            .unwrap();
        let pipeline = InvoicePipeline::builder()
            .with_ocr(Arc::new(MockRecognizer::new("")))
            .with_entity_recognizer(Arc::new(StaticRecognizer::new(vec![])))
            .with_patterns(patterns)
            .build()
            .unwrap();

        let record = pipeline.process_text("Ref: R77\nInvoice No: I1\nTotal: 5").unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("R77"));
        assert_eq!(record.total_amount, None);
    }

    #[test]
    fn test_invalid_preprocessing_config() {
        let mut config = InvexConfig::default();
        config.preprocessing.block_size = 10;

        let result = InvoicePipeline::builder()
            .with_ocr(Arc::new(MockRecognizer::new("")))
            .with_config(config)
            .build();
        assert!(matches!(result, Err(InvexError::Config(_))));
    }
}
