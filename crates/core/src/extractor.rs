use crate::error::ExtractError;
use crate::office::{DocxExtractor, XlsxExtractor};
use crate::ocr::{build_ocr_extractor, OcrConfig};
use lopdf::Document;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "xlsx"];
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Turns the raw bytes of one document format into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Image,
}

impl AttachmentKind {
    /// Classifies a normalized (lowercase, dotless) extension.
    pub fn classify(extension: &str) -> Option<Self> {
        if DOCUMENT_EXTENSIONS.contains(&extension) {
            Some(Self::Document)
        } else if IMAGE_EXTENSIONS.contains(&extension) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Lookup table from extension to extractor. Supporting a new format
/// means registering another entry.
#[derive(Default, Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults(ocr: &OcrConfig) -> Self {
        let mut registry = Self::empty();
        registry.register("pdf", Arc::new(PdfExtractor));
        registry.register("docx", Arc::new(DocxExtractor));
        registry.register("txt", Arc::new(PlainTextExtractor));
        registry.register("xlsx", Arc::new(XlsxExtractor));

        let ocr = build_ocr_extractor(ocr);
        for extension in IMAGE_EXTENSIONS {
            registry.register(extension, Arc::clone(&ocr));
        }
        registry
    }

    pub fn register(&mut self, extension: &str, extractor: Arc<dyn TextExtractor>) {
        self.extractors
            .insert(extension.trim_start_matches('.').to_lowercase(), extractor);
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.extractors.contains_key(extension)
    }

    /// Extracts text, reporting any failure as empty text plus a warning.
    pub fn extract(&self, extension: &str, content: &[u8]) -> String {
        let Some(extractor) = self.extractors.get(extension) else {
            warn!(extension, "no extractor registered");
            return String::new();
        };

        match extractor.extract_text(content) {
            Ok(text) => {
                debug!(
                    extractor = extractor.name(),
                    chars = text.len(),
                    "extracted attachment text"
                );
                text
            }
            Err(error) => {
                warn!(extractor = extractor.name(), %error, "text extraction failed");
                String::new()
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        let document =
            Document::load_mem(content).map_err(|error| ExtractError::Pdf(error.to_string()))?;

        let mut text = String::new();
        for page_no in document.get_pages().into_keys() {
            let page = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractError::Pdf(error.to_string()))?;
            text.push_str(&page);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        Ok(decode_utf8_dropping_invalid(content))
    }

    fn name(&self) -> &str {
        "txt"
    }
}

fn decode_utf8_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return text;
            }
            Err(error) => {
                let (valid, rest) = bytes.split_at(error.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let skip = error.error_len().unwrap_or(rest.len());
                bytes = &rest[skip..];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract_text(&self, _content: &[u8]) -> Result<String, ExtractError> {
            Err(ExtractError::Pdf("broken container".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct UpperExtractor;

    impl TextExtractor for UpperExtractor {
        fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
            Ok(String::from_utf8_lossy(content).to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    #[test]
    fn classification_covers_documents_and_images() {
        for ext in ["pdf", "docx", "txt", "xlsx"] {
            assert_eq!(AttachmentKind::classify(ext), Some(AttachmentKind::Document));
        }
        for ext in ["png", "jpg", "jpeg", "tiff", "bmp", "gif"] {
            assert_eq!(AttachmentKind::classify(ext), Some(AttachmentKind::Image));
        }
        assert_eq!(AttachmentKind::classify("zip"), None);
        assert_eq!(AttachmentKind::classify(""), None);
    }

    #[test]
    fn failures_become_empty_text() {
        let mut registry = ExtractorRegistry::empty();
        registry.register("pdf", Arc::new(FailingExtractor));
        assert_eq!(registry.extract("pdf", b"%PDF-garbage"), "");
        assert_eq!(registry.extract("unknown", b"data"), "");
    }

    #[test]
    fn registered_extension_is_normalized() {
        let mut registry = ExtractorRegistry::empty();
        registry.register(".TXT", Arc::new(UpperExtractor));
        assert!(registry.supports("txt"));
        assert_eq!(registry.extract("txt", b"abc"), "ABC");
    }

    #[test]
    fn defaults_register_every_known_extension() {
        let registry = ExtractorRegistry::with_defaults(&OcrConfig::default());
        for ext in DOCUMENT_EXTENSIONS.iter().chain(IMAGE_EXTENSIONS) {
            assert!(registry.supports(ext), "missing {ext}");
        }
    }

    #[test]
    fn malformed_pdf_is_reported_as_empty() {
        let registry = ExtractorRegistry::with_defaults(&OcrConfig::default());
        assert_eq!(registry.extract("pdf", b"%PDF-1.4\n%broken"), "");
    }

    #[test]
    fn plain_text_drops_invalid_sequences() {
        let text = PlainTextExtractor
            .extract_text(b"caf\xc3\xa9 \xff\xfeok")
            .expect("txt never fails");
        assert_eq!(text, "café ok");
    }
}
