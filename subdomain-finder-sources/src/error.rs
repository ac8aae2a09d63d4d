use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for passive source queries.
///
/// Every variant except [`ClientBuild`](Self::ClientBuild) names the source that
/// produced it. The aggregator never propagates these: each one is folded into the
/// per-source [`SourceReport`](crate::SourceReport) and the source contributes an
/// empty set.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum SourceError {
    /// Connection refused, DNS failure of the upstream host, TLS failure, etc.
    #[error("[{source_name}] Network error: {detail}")]
    NetworkError {
        /// Source that produced the error.
        source_name: String,
        /// Error details.
        detail: String,
    },

    /// The request (or the whole source query) exceeded its time budget.
    #[error("[{source_name}] Timeout: {detail}")]
    Timeout {
        /// Source that produced the error.
        source_name: String,
        /// Error details.
        detail: String,
    },

    /// The upstream answered with a non-2xx status.
    #[error("[{source_name}] HTTP {status}")]
    HttpStatus {
        /// Source that produced the error.
        source_name: String,
        /// HTTP status code.
        status: u16,
        /// Truncated response body, if one could be read.
        body: Option<String>,
    },

    /// The response payload did not have the expected shape.
    #[error("[{source_name}] Parse error: {detail}")]
    ParseError {
        /// Source that produced the error.
        source_name: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// The source needs an API key and none was configured.
    #[error("[{source_name}] API key not configured")]
    MissingApiKey {
        /// Source that produced the error.
        source_name: String,
    },

    /// The shared HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {detail}")]
    ClientBuild {
        /// Error details.
        detail: String,
    },
}

impl SourceError {
    /// Whether this is an anticipated condition (missing key, 4xx answer), used for log levels.
    ///
    /// `true` → `warn`, `false` → `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MissingApiKey { .. } => true,
            Self::HttpStatus { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

/// Result alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
