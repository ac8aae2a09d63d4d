//! Liveness verification: DNS resolution plus HTTP probing per host.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::CoreResult;
use crate::gate::AdmissionGate;
use crate::prober::HttpProbe;
use crate::resolver::DnsResolve;

/// Outcome of verifying one host. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub host: String,
    /// Resolved IPv4 addresses; empty when absent or failed.
    pub ips: Vec<IpAddr>,
    /// Some scheme answered over HTTP(S).
    pub http_ok: bool,
    pub http_status: Option<u16>,
    pub final_url: Option<String>,
    /// DNS and HTTP failure notes, either or both.
    pub error: Option<String>,
}

impl VerificationRecord {
    /// Resolved or answered over HTTP.
    pub fn is_alive(&self) -> bool {
        self.http_ok || !self.ips.is_empty()
    }
}

/// Verifies canonical hosts with bounded concurrency.
///
/// Each host gets one task holding one gate slot for the duration of both its DNS
/// lookup and its HTTP probe, which run concurrently. Records come back in completion
/// order; key them by [`VerificationRecord::host`].
pub struct Verifier {
    resolver: Arc<dyn DnsResolve>,
    prober: Arc<dyn HttpProbe>,
    gate: AdmissionGate,
    dns_timeout: Duration,
    http_timeout: Duration,
}

impl Verifier {
    pub fn new(
        resolver: Arc<dyn DnsResolve>,
        prober: Arc<dyn HttpProbe>,
        gate: AdmissionGate,
        dns_timeout: Duration,
        http_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            prober,
            gate,
            dns_timeout,
            http_timeout,
        }
    }

    /// Verifier using the session's verification concurrency and timeouts.
    ///
    /// # Errors
    ///
    /// [`CoreError::ValidationError`](crate::CoreError::ValidationError) for a zero
    /// concurrency limit.
    pub fn from_config(
        config: &ScanConfig,
        resolver: Arc<dyn DnsResolve>,
        prober: Arc<dyn HttpProbe>,
    ) -> CoreResult<Self> {
        Ok(Self::new(
            resolver,
            prober,
            AdmissionGate::new(config.verify_concurrency)?,
            config.dns_timeout,
            config.http_timeout,
        ))
    }

    /// Verify every host.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`](crate::CoreError::GateClosed) if the gate is closed.
    pub async fn verify_all(&self, hosts: &[String]) -> CoreResult<Vec<VerificationRecord>> {
        let started = Instant::now();
        log::info!(
            "[verify] verifying {} hosts (concurrency {})",
            hosts.len(),
            self.gate.limit()
        );

        let (dns_timeout, http_timeout) = (self.dns_timeout, self.http_timeout);
        let records = self
            .gate
            .run_all(hosts.iter().cloned(), |host| {
                let resolver = Arc::clone(&self.resolver);
                let prober = Arc::clone(&self.prober);
                async move {
                    verify_host(
                        resolver.as_ref(),
                        prober.as_ref(),
                        host,
                        dns_timeout,
                        http_timeout,
                    )
                    .await
                }
            })
            .await?;

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "[verify] finished: {} live out of {} in {elapsed_ms}ms",
            records.iter().filter(|r| r.is_alive()).count(),
            records.len()
        );
        Ok(records)
    }
}

/// DNS and HTTP for one host; neither phase's failure stops the other.
async fn verify_host(
    resolver: &dyn DnsResolve,
    prober: &dyn HttpProbe,
    host: String,
    dns_timeout: Duration,
    http_timeout: Duration,
) -> VerificationRecord {
    let (lookup, probe) = tokio::join!(
        resolver.resolve_a(&host, dns_timeout),
        prober.probe(&host, http_timeout)
    );

    let mut errors = Vec::new();
    if let Some(detail) = lookup.error() {
        errors.push(format!("DNS error: {detail}"));
    }
    if let Some(detail) = &probe.error {
        errors.push(format!("HTTP error: {detail}"));
    }
    let error = (!errors.is_empty()).then(|| errors.join("; "));
    if let Some(error) = &error {
        log::warn!("[verify] {host}: {error}");
    }

    VerificationRecord {
        ips: lookup.ips().to_vec(),
        http_ok: probe.reachable,
        http_status: probe.status,
        final_url: probe.final_url,
        error,
        host,
    }
}
