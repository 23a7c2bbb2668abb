//! Contract with the OCR/vision extraction service.
//!
//! Implementations live outside this crate. The core only knows the
//! payload going in, the shape coming back and the error taxonomy.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::notes::NotesBlock;
use crate::table::TableData;

/// An uploaded image.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`.
    pub mime: String,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    /// Wrap raw bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Guess the MIME type from a file extension.
    #[must_use]
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            _ => "image/jpeg",
        }
    }

    /// File name to send in multipart uploads.
    #[must_use]
    pub fn file_name(&self) -> String {
        let ext = self
            .mime
            .strip_prefix("image/")
            .map_or("jpg", |e| if e == "jpeg" { "jpg" } else { e });
        format!("image.{ext}")
    }

    /// Parse a `data:<mime>;base64,<data>` URI.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the URI is not base64 data.
    pub fn from_data_uri(uri: &str) -> ChartResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ChartError::Validation("not a data URI".to_string()))?;
        let (meta, data) = rest
            .split_once(',')
            .ok_or_else(|| ChartError::Validation("data URI has no payload".to_string()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ChartError::Validation("data URI is not base64".to_string()))?;
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| ChartError::Validation(format!("invalid base64: {e}")))?;
        Ok(Self::new(bytes, mime))
    }

    /// Encode as a base64 data URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Structured data extracted from a size chart photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows keyed by header.
    pub rows: Vec<BTreeMap<String, String>>,
    /// Article number, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Notes found on the chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<NotesBlock>,
}

impl ExtractionResult {
    /// Whether the result has at least one header and one row.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }

    /// Table for the result, or the placeholder table if nothing usable
    /// came back.
    #[must_use]
    pub fn to_table(&self) -> TableData {
        if self.is_usable() {
            TableData::from_parts(self.headers.clone(), self.rows.clone())
        } else {
            TableData::placeholder()
        }
    }
}

/// Category of extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    /// The call exceeded its time limit.
    Timeout,
    /// The service answered with a non-success status.
    Service,
    /// The service answered but the payload was unusable.
    InvalidResponse,
    /// The request never reached the service.
    Transport,
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timed out",
            Self::Service => "service error",
            Self::InvalidResponse => "invalid response",
            Self::Transport => "connection failed",
        })
    }
}

/// A failed extraction, with a message suitable for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("Extraction {kind}: {message}")]
pub struct ExtractionError {
    /// Failure category.
    pub kind: ExtractionErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl ExtractionError {
    /// Create an error.
    #[must_use]
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Turns an image into size chart data.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Extract table data from an image.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] on timeout, service failure or an
    /// unusable response.
    async fn extract(&self, image: &ImagePayload) -> Result<ExtractionResult, ExtractionError>;
}

/// Tries `primary`, then `fallback` once if the primary fails.
#[derive(Debug, Clone)]
pub struct FallbackExtractor<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackExtractor<P, F> {
    /// Chain two extractors.
    #[must_use]
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Extractor, F: Extractor> Extractor for FallbackExtractor<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn extract(&self, image: &ImagePayload) -> Result<ExtractionResult, ExtractionError> {
        match self.primary.extract(image).await {
            Ok(result) => Ok(result),
            Err(primary_err) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "Extraction failed, falling back: {primary_err}"
                );
                self.fallback.extract(image).await.map_err(|e| {
                    ExtractionError::new(
                        e.kind,
                        format!("{} (after: {})", e.message, primary_err.message),
                    )
                })
            }
        }
    }
}
