use thiserror::Error;

/// Errors returned by the assortment analyzer.
///
/// Every variant means the same thing to a caller: the analysis failed and
/// the previous data should stay in place.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status and no error envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The service returned an `error` envelope.
    #[error("provider error ({status}): {message}")]
    Provider { status: String, message: String },

    /// The response (or the structured JSON inside it) did not match the
    /// expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
