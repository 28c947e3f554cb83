//! Input file classification by extension.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Extensions read as raster images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Extensions read as PDF documents.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Kind of input document, decided by file extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Image,
    Pdf,
    Unknown,
}

impl InputKind {
    pub fn is_supported(&self) -> bool {
        !matches!(self, InputKind::Unknown)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Image => "image",
            InputKind::Pdf => "pdf",
            InputKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a path by its lowercased extension. The file is never opened.
pub fn classify(path: &Path) -> InputKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return InputKind::Unknown;
    };
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        InputKind::Image
    } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
        InputKind::Pdf
    } else {
        InputKind::Unknown
    }
}

/// A path paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    path: PathBuf,
    kind: InputKind,
}

impl RawDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = classify(&path);
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        for name in ["a.png", "a.jpg", "a.jpeg", "a.tiff", "a.bmp", "a.gif"] {
            assert_eq!(classify(Path::new(name)), InputKind::Image, "{}", name);
        }
    }

    #[test]
    fn test_extension_case_ignored() {
        assert_eq!(classify(Path::new("SCAN.PNG")), InputKind::Image);
        assert_eq!(classify(Path::new("Invoice.Pdf")), InputKind::Pdf);
    }

    #[test]
    fn test_unknown_inputs() {
        assert_eq!(classify(Path::new("scan.docx")), InputKind::Unknown);
        assert_eq!(classify(Path::new("README")), InputKind::Unknown);
        assert_eq!(classify(Path::new("archive.tif.zip")), InputKind::Unknown);
        assert_eq!(classify(Path::new(".png")), InputKind::Unknown);
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert_eq!(classify(Path::new("invoice.pdf.png")), InputKind::Image);
        assert_eq!(classify(Path::new("dir.png/invoice.pdf")), InputKind::Pdf);
    }

    #[test]
    fn test_raw_document() {
        let doc = RawDocument::new("inbox/scan.jpeg");
        assert_eq!(doc.kind(), InputKind::Image);
        assert_eq!(doc.path(), Path::new("inbox/scan.jpeg"));
        assert!(doc.kind().is_supported());
        assert!(!RawDocument::new("notes.txt").kind().is_supported());
    }
}
