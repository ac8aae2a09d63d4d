//! Public types returned by the aggregator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Outcome class of one source query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// The source answered and its payload was parsed.
    Success,
    /// Network error, non-2xx answer or malformed payload.
    Failed,
    /// The source did not finish within the per-source timeout.
    Timeout,
    /// The source was not queried (e.g. no API key configured).
    Skipped,
}

/// Per-source entry of a [`PassiveScanResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    /// Source identifier.
    pub source: String,
    /// Outcome class.
    pub status: SourceStatus,
    /// Number of raw hostnames contributed.
    pub count: usize,
    /// Wall time spent on this source.
    pub elapsed_ms: u64,
    /// Failure description, when `status` is not `Success`.
    pub error: Option<String>,
}

/// Merged result of one aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveScanResult {
    /// Target domain.
    pub domain: String,
    /// Union of every source's raw hostnames.
    pub hostnames: HashSet<String>,
    /// One report per configured source, in configuration order.
    pub reports: Vec<SourceReport>,
    /// Wall time of the whole aggregation.
    pub total_time_ms: u64,
}

impl PassiveScanResult {
    /// Number of sources that answered successfully.
    pub fn successful_sources(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status == SourceStatus::Success)
            .count()
    }
}
