//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! One call per brand: the prompt from [`crate::prompt`] is sent with Google
//! Search grounding enabled and a JSON response schema, and the reply is
//! mapped into a fresh [`CompetitorData`] record.

use std::time::Duration;

use reqwest::{Client, Url};
use retailintel_core::{AnalyzerConfig, CompetitorData, GroundingSource};

use crate::error::AnalyzerError;
use crate::parse::{extract_sources, parse_assortment, response_text, to_record};
use crate::prompt::{build_prompt, response_schema};
use crate::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, Tool,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Result of one successful analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Fresh record for the brand; `record.sources` holds the same citations.
    pub record: CompetitorData,
    pub sources: Vec<GroundingSource>,
}

/// Client for grounded assortment analysis.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a client pointed at the public Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`AnalyzerError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("retailintel/0.1 (assortment-analysis)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalyzerError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Builds a client from application config.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AnalyzerConfig) -> Result<Option<Self>, AnalyzerError> {
        config
            .api_key
            .as_deref()
            .map(|key| {
                Self::with_base_url(key, &config.model, config.timeout_secs, &config.base_url)
            })
            .transpose()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs a grounded analysis of one brand's current full-price assortment.
    ///
    /// A reply that omits `data` or `totalStyles` yields an empty record
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::Http`] on network failure or timeout.
    /// - [`AnalyzerError::Provider`] when the service returns an error envelope.
    /// - [`AnalyzerError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`AnalyzerError::Deserialize`] when the response or its structured
    ///   body is malformed.
    pub async fn analyze(&self, name: &str, url: &str) -> Result<Analysis, AnalyzerError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_prompt(name, url)),
                }],
            }],
            tools: vec![Tool {
                google_search: serde_json::json!({}),
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let endpoint = self.endpoint()?;
        tracing::info!(brand = %name, model = %self.model, "requesting assortment analysis");

        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| AnalyzerError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        let sources = extract_sources(&parsed);
        let raw = parse_assortment(response_text(&parsed).as_deref())?;
        let record = to_record(name, url, raw, sources.clone());

        tracing::info!(
            brand = %name,
            total_styles = record.total_styles,
            categories = record.data.len(),
            sources = sources.len(),
            "assortment analysis complete"
        );

        Ok(Analysis { record, sources })
    }

    fn endpoint(&self) -> Result<Url, AnalyzerError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        self.base_url
            .join(&path)
            .map_err(|e| AnalyzerError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Prefers the provider's error envelope when the body carries one.
    fn status_error(status: u16, body: String) -> AnalyzerError {
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => AnalyzerError::Provider {
                status: if envelope.error.status.is_empty() {
                    status.to_string()
                } else {
                    envelope.error.status
                },
                message: envelope.error.message,
            },
            Err(_) => AnalyzerError::UnexpectedStatus { status, body },
        }
    }
}
