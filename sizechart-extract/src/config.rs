//! Extraction client configuration.

use std::time::Duration;

/// Default OCR service host.
pub const DEFAULT_BASE_URL: &str = "https://ocr.muazaoski.online";

/// Upper bound on a single extraction call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the OCR/vision service client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Service host, e.g. `https://ocr.example.com`.
    pub base_url: String,
    /// Sent as `X-API-Key` when present.
    pub api_key: Option<String>,
    /// Per-request time limit.
    pub timeout: Duration,
    /// Try the basic OCR endpoint once if the AI endpoint fails.
    pub fallback: bool,
    /// Tesseract language code for the basic OCR endpoint.
    pub language: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            fallback: true,
            language: "ind".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Config pointing at `base_url` with default settings otherwise.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the basic OCR fallback.
    #[must_use]
    pub fn fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.fallback);
        assert!(config.api_key.is_none());
        assert_eq!(config.language, "ind");
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        assert!(ExtractorConfig::default().api_key("  ").api_key.is_none());
        assert_eq!(
            ExtractorConfig::default().api_key("k").api_key.as_deref(),
            Some("k")
        );
    }
}
