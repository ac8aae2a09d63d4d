//! HTTP liveness probing with scheme fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, redirect::Policy};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Schemes tried in order; the first one that answers wins.
pub const PROBE_SCHEMES: [&str; 2] = ["https", "http"];

const MAX_REDIRECTS: usize = 10;

/// Result of probing one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    /// Some scheme returned an HTTP response (any status).
    pub reachable: bool,
    /// Status of the final response after redirects.
    pub status: Option<u16>,
    /// URL of the final response after redirects.
    pub final_url: Option<String>,
    /// Transient failures seen on the way (timeouts, protocol errors). Refused
    /// connections are not recorded.
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// Nothing answered.
    pub fn unreachable(error: Option<String>) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

/// HTTP liveness probe.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Probe `host`, spending at most `timeout` on each scheme.
    async fn probe(&self, host: &str, timeout: Duration) -> ProbeOutcome;
}

/// [`HttpProbe`] over a shared `reqwest` client.
///
/// The client follows redirects and does not validate certificates, so hosts with
/// self-signed or mismatched certificates still count as reachable.
#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    /// Build the prober and its client.
    ///
    /// # Errors
    ///
    /// [`CoreError::HttpClientError`] if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str) -> CoreResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| CoreError::HttpClientError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProber {
    async fn probe(&self, host: &str, timeout: Duration) -> ProbeOutcome {
        let mut notes: Vec<String> = Vec::new();

        for scheme in PROBE_SCHEMES {
            let url = format!("{scheme}://{host}");
            match self.client.get(&url).timeout(timeout).send().await {
                Ok(response) => {
                    log::debug!("[probe] {url} -> {}", response.status());
                    return ProbeOutcome {
                        reachable: true,
                        status: Some(response.status().as_u16()),
                        final_url: Some(response.url().to_string()),
                        error: join_notes(notes),
                    };
                }
                Err(e) if e.is_timeout() => {
                    notes.push(format!("{scheme}: timed out after {}ms", timeout.as_millis()));
                }
                Err(e) if e.is_connect() => {
                    log::debug!("[probe] {url}: connection failed: {e}");
                }
                Err(e) => notes.push(format!("{scheme}: {e}")),
            }
        }

        ProbeOutcome::unreachable(join_notes(notes))
    }
}

fn join_notes(notes: Vec<String>) -> Option<String> {
    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}
