//! HTTP client for the OCR/vision service.
//!
//! Two endpoints are used:
//! - `POST /ocr/understand?preset=size_chart` runs the vision model and
//!   answers `{"result": ...}` with structured chart data.
//! - `POST /ocr/extract?language=..&psm=3&preprocess=true` runs plain OCR
//!   and answers `{"text": "..."}`.
//!
//! Both take the image as a multipart `file` field.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use sizechart_core::{
    ExtractionError, ExtractionResult, Extractor, FallbackExtractor, ImagePayload,
};
use url::Url;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::parse::ChartTextParser;

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Deserialize)]
struct UnderstandResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct OcrTextResponse {
    #[serde(default)]
    text: String,
}

/// Shared connection to the OCR service.
#[derive(Debug, Clone)]
pub struct OcrClient {
    inner: Arc<InnerClient>,
}

#[derive(Debug)]
struct InnerClient {
    http: Client,
    understand_url: Url,
    extract_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    parser: ChartTextParser,
}

impl OcrClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidUrl`] if the base URL is malformed.
    /// Returns [`ExtractError::Http`] if the HTTP client fails to build.
    pub fn new(config: &ExtractorConfig) -> ExtractResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ExtractError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ExtractError::InvalidUrl(config.base_url.clone()));
        }

        let mut understand_url = endpoint(&base, "ocr/understand")?;
        understand_url
            .query_pairs_mut()
            .append_pair("preset", "size_chart");

        let mut extract_url = endpoint(&base, "ocr/extract")?;
        extract_url
            .query_pairs_mut()
            .append_pair("language", &config.language)
            .append_pair("psm", "3")
            .append_pair("preprocess", "true");

        let http = Client::builder()
            .user_agent(concat!("sizechart-extract/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                understand_url,
                extract_url,
                api_key: config.api_key.clone(),
                timeout: config.timeout,
                parser: ChartTextParser::new()?,
            }),
        })
    }

    /// The AI understand endpoint.
    #[must_use]
    pub fn understand_url(&self) -> &Url {
        &self.inner.understand_url
    }

    /// The basic OCR endpoint.
    #[must_use]
    pub fn extract_url(&self) -> &Url {
        &self.inner.extract_url
    }

    /// Ask the vision model for structured chart data.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure, a non-success status
    /// or a body that is not the expected JSON envelope.
    pub async fn understand(&self, image: &ImagePayload) -> ExtractResult<ExtractionResult> {
        let body = self.post_image(&self.inner.understand_url, image).await?;
        let envelope: UnderstandResponse = serde_json::from_slice(&body)?;
        Ok(self.inner.parser.parse_understand(&envelope.result))
    }

    /// Run plain OCR and parse the recognised text.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure, a non-success status
    /// or a body that is not the expected JSON envelope.
    pub async fn basic_ocr(&self, image: &ImagePayload) -> ExtractResult<ExtractionResult> {
        let body = self.post_image(&self.inner.extract_url, image).await?;
        let envelope: OcrTextResponse = serde_json::from_slice(&body)?;
        tracing::debug!(chars = envelope.text.len(), "Basic OCR text received");
        Ok(self.inner.parser.parse_ocr_output(&envelope.text))
    }

    async fn post_image(&self, url: &Url, image: &ImagePayload) -> ExtractResult<Vec<u8>> {
        let timeout = self.inner.timeout;
        tracing::debug!(%url, ?image, "Posting image to OCR service");

        let exchange = async {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name())
                .mime_str(&image.mime)?;
            let mut request = self
                .inner
                .http
                .post(url.clone())
                .multipart(Form::new().part("file", part));
            if let Some(key) = &self.inner.api_key {
                request = request.header(API_KEY_HEADER, key);
            }

            let response = request.send().await?;
            let response = check_status(response).await?;
            Ok::<_, ExtractError>(response.bytes().await?.to_vec())
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ExtractError::Timeout(timeout))?
    }
}

fn endpoint(base: &Url, path: &str) -> ExtractResult<Url> {
    let root = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{root}/{path}")).map_err(|e| ExtractError::InvalidUrl(e.to_string()))
}

async fn check_status(response: Response) -> ExtractResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(ToString::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ExtractError::Status {
        status: status.as_u16(),
        detail,
    })
}

/// Extraction through the AI understand endpoint.
#[derive(Debug, Clone)]
pub struct UnderstandExtractor {
    client: OcrClient,
}

impl UnderstandExtractor {
    /// Wrap a client.
    #[must_use]
    pub fn new(client: OcrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for UnderstandExtractor {
    fn name(&self) -> &str {
        "ai-understand"
    }

    async fn extract(&self, image: &ImagePayload) -> Result<ExtractionResult, ExtractionError> {
        self.client
            .understand(image)
            .await
            .inspect_err(|e| {
                tracing::warn!(transient = e.is_transient(), "AI extraction failed: {e}");
            })
            .map_err(Into::into)
    }
}

/// Extraction through the basic OCR endpoint.
#[derive(Debug, Clone)]
pub struct BasicOcrExtractor {
    client: OcrClient,
}

impl BasicOcrExtractor {
    /// Wrap a client.
    #[must_use]
    pub fn new(client: OcrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for BasicOcrExtractor {
    fn name(&self) -> &str {
        "basic-ocr"
    }

    async fn extract(&self, image: &ImagePayload) -> Result<ExtractionResult, ExtractionError> {
        self.client
            .basic_ocr(image)
            .await
            .inspect_err(|e| tracing::warn!("Basic OCR failed: {e}"))
            .map_err(Into::into)
    }
}

/// Build the extractor described by `config`: the AI endpoint, chained to
/// one basic OCR attempt when fallback is enabled.
///
/// # Errors
///
/// Returns an error if the client cannot be created.
pub fn build_extractor(config: &ExtractorConfig) -> ExtractResult<Box<dyn Extractor>> {
    let client = OcrClient::new(config)?;
    let primary = UnderstandExtractor::new(client.clone());
    if config.fallback {
        Ok(Box::new(FallbackExtractor::new(
            primary,
            BasicOcrExtractor::new(client),
        )))
    } else {
        Ok(Box::new(primary))
    }
}
