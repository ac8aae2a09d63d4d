use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;

/// Everything a source needs for one query.
///
/// The client is owned by the aggregation call and shared read-only by all sources.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    /// HTTP client scoped to the current aggregation.
    pub client: &'a Client,
    /// Target domain (already validated and lowercased by the caller).
    pub domain: &'a str,
}

/// A passive subdomain data source.
///
/// Implementations return raw hostname strings. They may include names outside the
/// target domain, wildcards or separators; cleaning is the normalizer's job.
#[async_trait]
pub trait PassiveSource: Send + Sync {
    /// Stable identifier, used in logs and reports.
    fn name(&self) -> &'static str;

    /// Query the source once for `ctx.domain`.
    async fn query(&self, ctx: &SourceContext<'_>) -> Result<HashSet<String>>;
}
