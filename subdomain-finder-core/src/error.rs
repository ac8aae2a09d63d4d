//! Unified error type for the scan pipeline.

use serde::Serialize;
use subdomain_finder_sources::SourceError;
use thiserror::Error;

/// Errors returned by scan entry points.
///
/// Only session-level failures surface here. Per-host and per-source failures are
/// folded into [`LookupOutcome`](crate::LookupOutcome),
/// [`ProbeOutcome`](crate::ProbeOutcome) and
/// [`SourceStatus`](subdomain_finder_sources::SourceStatus) instead.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Invalid configuration value (domain, concurrency, timeout).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Wordlist missing, unreadable or empty.
    #[error("Wordlist error: {0}")]
    WordlistError(String),

    /// The HTTP client used for probing could not be built.
    #[error("HTTP client error: {0}")]
    HttpClientError(String),

    /// The admission gate was closed while tasks were still waiting.
    #[error("Admission gate closed")]
    GateClosed,

    /// Passive source layer failure that could not be recovered locally.
    #[error(transparent)]
    Sources(#[from] SourceError),
}

impl CoreError {
    /// Whether the error is a configuration problem the user can fix.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::WordlistError(_))
    }
}

/// Result alias for pipeline operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
