//! Shared HTTP execution for passive sources.
//!
//! Each source builds its own `RequestBuilder` (URL, query, form body); this module
//! owns the common part: sending, status classification, body reading and logging.
//! There is no retry loop: one request per source per scan.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helpers used by every source.
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx answers become [`SourceError::HttpStatus`], transport failures become
    /// [`SourceError::Timeout`] or [`SourceError::NetworkError`].
    pub async fn fetch_text(
        request_builder: RequestBuilder,
        source_name: &str,
        description: &str,
    ) -> Result<String, SourceError> {
        log::debug!("[passive:{source_name}] {description}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(&e, source_name))?;

        let status = response.status();
        log::debug!("[passive:{source_name}] Response status: {}", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.ok().map(|b| truncate_for_log(&b));
            return Err(SourceError::HttpStatus {
                source_name: source_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::NetworkError {
                source_name: source_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[passive:{source_name}] Response body: {}",
            truncate_for_log(&text)
        );
        Ok(text)
    }

    /// Deserialize a JSON payload, logging a preview of it on failure.
    pub fn parse_json<T>(text: &str, source_name: &str) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(text).map_err(|e| {
            log::debug!(
                "[passive:{source_name}] JSON parse failed ({e}), payload: {}",
                truncate_for_log(text)
            );
            SourceError::ParseError {
                source_name: source_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

/// Map a `reqwest` transport error onto the source taxonomy.
fn transport_error(e: &reqwest::Error, source_name: &str) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        }
    } else {
        SourceError::NetworkError {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        }
    }
}
