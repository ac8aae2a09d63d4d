//! Concurrent fan-out over every passive source.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::Client;
use tokio::time::timeout;

use crate::error::{Result, SourceError};
use crate::factory::{SourceCredentials, create_default_sources};
use crate::traits::{PassiveSource, SourceContext};
use crate::types::{PassiveScanResult, SourceReport, SourceStatus};

/// Default per-source time budget in seconds.
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
/// Default connect timeout of the shared client in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Tunables of an aggregation.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Upper bound for one source query, covering every request it makes.
    pub source_timeout: Duration,
    /// `User-Agent` sent to every source.
    pub user_agent: String,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            user_agent: concat!("subdomain-finder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Queries all sources for one domain and merges the answers.
///
/// Sources are fully isolated: any failure, timeout or malformed payload only
/// empties that source's contribution.
pub struct PassiveAggregator {
    sources: Vec<Arc<dyn PassiveSource>>,
    options: AggregatorOptions,
}

impl PassiveAggregator {
    pub fn new(sources: Vec<Arc<dyn PassiveSource>>, options: AggregatorOptions) -> Self {
        Self { sources, options }
    }

    /// Aggregator over every built-in source.
    pub fn with_default_sources(credentials: &SourceCredentials, options: AggregatorOptions) -> Self {
        Self::new(create_default_sources(credentials), options)
    }

    /// Union of all sources' raw hostnames.
    pub async fn scan(&self, domain: &str) -> Result<HashSet<String>> {
        Ok(self.scan_detailed(domain).await?.hostnames)
    }

    /// Like [`scan`](Self::scan), with one [`SourceReport`] per source.
    ///
    /// Only fails when the shared HTTP client cannot be built.
    pub async fn scan_detailed(&self, domain: &str) -> Result<PassiveScanResult> {
        log::info!(
            "[passive] Querying {} sources for {domain}",
            self.sources.len()
        );
        let start = Instant::now();

        // Lives for this call only; every source borrows it.
        let client = self.build_client()?;
        let ctx = SourceContext {
            client: &client,
            domain,
        };

        let futures: Vec<_> = self
            .sources
            .iter()
            .map(|source| self.run_source(source.as_ref(), ctx))
            .collect();
        let outcomes = join_all(futures).await;

        let mut hostnames = HashSet::new();
        let mut reports = Vec::with_capacity(outcomes.len());
        for (found, report) in outcomes {
            hostnames.extend(found);
            reports.push(report);
        }

        // u128 -> u64: an aggregation never runs for u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let total_time_ms = start.elapsed().as_millis() as u64;

        let result = PassiveScanResult {
            domain: domain.to_string(),
            hostnames,
            reports,
            total_time_ms,
        };
        log::info!(
            "[passive] Done in {total_time_ms}ms: {} raw hostnames from {}/{} sources",
            result.hostnames.len(),
            result.successful_sources(),
            result.reports.len()
        );
        Ok(result)
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(self.options.source_timeout)
            .user_agent(&self.options.user_agent)
            .build()
            .map_err(|e| SourceError::ClientBuild {
                detail: e.to_string(),
            })
    }

    async fn run_source(
        &self,
        source: &dyn PassiveSource,
        ctx: SourceContext<'_>,
    ) -> (HashSet<String>, SourceReport) {
        let started = Instant::now();
        let outcome = timeout(self.options.source_timeout, source.query(&ctx)).await;
        // u128 -> u64: bounded by the source timeout
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = outcome.unwrap_or_else(|_| {
            Err(SourceError::Timeout {
                source_name: source.name().to_string(),
                detail: format!(
                    "no answer within {}s",
                    self.options.source_timeout.as_secs_f32()
                ),
            })
        });

        match result {
            Ok(found) => {
                log::debug!("[passive:{}] {} hostnames", source.name(), found.len());
                let report = SourceReport {
                    source: source.name().to_string(),
                    status: SourceStatus::Success,
                    count: found.len(),
                    elapsed_ms,
                    error: None,
                };
                (found, report)
            }
            Err(e) => {
                let status = match &e {
                    SourceError::MissingApiKey { .. } => SourceStatus::Skipped,
                    SourceError::Timeout { .. } => SourceStatus::Timeout,
                    _ => SourceStatus::Failed,
                };
                if e.is_expected() {
                    log::warn!("[passive:{}] {e}", source.name());
                } else {
                    log::error!("[passive:{}] {e}", source.name());
                }
                let report = SourceReport {
                    source: source.name().to_string(),
                    status,
                    count: 0,
                    elapsed_ms,
                    error: Some(e.to_string()),
                };
                (HashSet::new(), report)
            }
        }
    }
}
