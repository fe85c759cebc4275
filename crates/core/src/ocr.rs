use crate::error::ExtractError;
use crate::extractor::TextExtractor;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TESSERACT: &str = "tesseract";
const OCR_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OcrEndpointConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub tesseract_bin: String,
    /// When set, images go to this multimodal OCR service instead of
    /// the local tesseract binary.
    pub endpoint: Option<OcrEndpointConfig>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_bin: DEFAULT_TESSERACT.to_string(),
            endpoint: None,
        }
    }
}

pub fn build_ocr_extractor(config: &OcrConfig) -> Arc<dyn TextExtractor> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(EndpointOcr::new(endpoint.clone())),
        None => Arc::new(TesseractOcr::new(config.tesseract_bin.clone())),
    }
}

/// Runs `tesseract stdin stdout`, piping the image through the process.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl TextExtractor for TesseractOcr {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| ExtractError::Ocr(format!("cannot start {}: {error}", self.binary)))?;

        // tesseract reads the whole image before writing anything, so
        // feeding stdin first cannot block on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(error) = stdin.write_all(content) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractError::Ocr(format!(
                    "cannot feed image to {}: {error}",
                    self.binary
                )));
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ExtractError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[derive(Debug, Clone, Serialize)]
struct OcrRequest {
    image_base64: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    pages: Option<Vec<OcrPage>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OcrPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    text: Option<String>,
}

/// Multimodal OCR over HTTP: posts the base64 image, reads back text.
pub struct EndpointOcr {
    client: Client,
    config: OcrEndpointConfig,
}

impl EndpointOcr {
    pub fn new(config: OcrEndpointConfig) -> Self {
        let client = Client::builder()
            .timeout(OCR_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }
}

impl TextExtractor for EndpointOcr {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        let payload = OcrRequest {
            image_base64: STANDARD.encode(content),
        };

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", "application/json")
            .json(&payload);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(ExtractError::Ocr(format!(
                "OCR request to {} returned {}",
                self.config.endpoint,
                response.status()
            )));
        }

        let payload: OcrResponse = response.json()?;
        payload_to_text(&payload)
    }

    fn name(&self) -> &str {
        "ocr-endpoint"
    }
}

fn payload_to_text(payload: &OcrResponse) -> Result<String, ExtractError> {
    if let Some(listed) = &payload.pages {
        let mut pages = listed
            .iter()
            .enumerate()
            .filter_map(|(index, page)| {
                let text = page.text.as_deref().map(str::trim).unwrap_or_default();
                (!text.is_empty()).then(|| (page.page.unwrap_or(index as u32 + 1), text))
            })
            .collect::<Vec<_>>();

        if !pages.is_empty() {
            pages.sort_by_key(|(number, _)| *number);
            return Ok(pages
                .into_iter()
                .map(|(_, text)| text)
                .collect::<Vec<_>>()
                .join("\n"));
        }
    }

    match payload.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ExtractError::Ocr("OCR response contained no text".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_payload_keeps_nonempty_text_in_page_order() {
        let response = OcrResponse {
            pages: Some(vec![
                OcrPage {
                    page: Some(3),
                    text: Some("third".to_string()),
                },
                OcrPage {
                    page: Some(2),
                    text: Some("  ".to_string()),
                },
                OcrPage {
                    page: Some(1),
                    text: Some(" first ".to_string()),
                },
            ]),
            text: None,
        };

        let text = payload_to_text(&response).expect("pages should be read");
        assert_eq!(text, "first\nthird");
    }

    #[test]
    fn flat_text_is_used_when_pages_are_empty() {
        let response = OcrResponse {
            pages: Some(Vec::new()),
            text: Some("Invoice 42\n".to_string()),
        };
        assert_eq!(payload_to_text(&response).expect("text"), "Invoice 42");
    }

    #[test]
    fn empty_payload_is_an_error() {
        let response = OcrResponse {
            pages: None,
            text: Some("   ".to_string()),
        };
        assert!(matches!(payload_to_text(&response), Err(ExtractError::Ocr(_))));
    }

    #[test]
    fn missing_binary_is_an_ocr_error() {
        let ocr = TesseractOcr::new("definitely-not-an-installed-binary");
        assert!(matches!(
            ocr.extract_text(b"\x89PNG"),
            Err(ExtractError::Ocr(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn child_that_stops_reading_is_reaped_with_an_ocr_error() {
        // `false` exits without touching stdin, so a large image hits a
        // closed pipe part way through.
        let ocr = TesseractOcr::new("false");
        let image = vec![0u8; 4 * 1024 * 1024];
        assert!(matches!(ocr.extract_text(&image), Err(ExtractError::Ocr(_))));
    }

    #[test]
    fn endpoint_request_carries_only_the_encoded_image() {
        let request = OcrRequest {
            image_base64: STANDARD.encode(b"img"),
        };
        let body = serde_json::to_value(&request).expect("serializable");
        assert_eq!(body, serde_json::json!({ "image_base64": "aW1n" }));
    }
}
