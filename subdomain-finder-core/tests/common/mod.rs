//! Test doubles for the pipeline.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use subdomain_finder_core::{DnsResolve, HttpProbe, LookupOutcome, ProbeOutcome};
use subdomain_finder_sources::{PassiveSource, SourceContext, SourceError};

/// Resolver answering from a fixed table; unknown names are absent.
#[derive(Default)]
pub struct FakeResolver {
    answers: HashMap<String, LookupOutcome>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(mut self, host: &str, ip: &str) -> Self {
        let ip: IpAddr = ip.parse().unwrap_or(IpAddr::from([0, 0, 0, 0]));
        self.answers
            .insert(host.to_string(), LookupOutcome::Found(vec![ip]));
        self
    }

    pub fn absent(mut self, host: &str) -> Self {
        self.answers.insert(host.to_string(), LookupOutcome::Absent);
        self
    }

    pub fn failing(mut self, host: &str, detail: &str) -> Self {
        self.answers
            .insert(host.to_string(), LookupOutcome::Failed(detail.to_string()));
        self
    }
}

#[async_trait]
impl DnsResolve for FakeResolver {
    async fn resolve_a(&self, host: &str, _timeout: Duration) -> LookupOutcome {
        self.answers
            .get(host)
            .cloned()
            .unwrap_or(LookupOutcome::Absent)
    }
}

/// Tracks how many calls are in flight and the highest value seen.
#[derive(Default)]
pub struct InFlight {
    active: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

impl InFlight {
    pub async fn enter_for(&self, hold: Duration) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(hold).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Resolver that holds each lookup for a while and records concurrency.
pub struct SlowResolver {
    pub in_flight: Arc<InFlight>,
    pub hold: Duration,
}

#[async_trait]
impl DnsResolve for SlowResolver {
    async fn resolve_a(&self, _host: &str, _timeout: Duration) -> LookupOutcome {
        self.in_flight.enter_for(self.hold).await;
        LookupOutcome::Found(vec![IpAddr::from([10, 0, 0, 1])])
    }
}

/// Prober with a fixed answer per host; unknown hosts are unreachable.
#[derive(Default)]
pub struct FakeProber {
    answers: HashMap<String, ProbeOutcome>,
    pub in_flight: Arc<InFlight>,
    pub hold: Duration,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn ok(mut self, host: &str, status: u16) -> Self {
        self.answers.insert(
            host.to_string(),
            ProbeOutcome {
                reachable: true,
                status: Some(status),
                final_url: Some(format!("https://{host}/")),
                error: None,
            },
        );
        self
    }
}

#[async_trait]
impl HttpProbe for FakeProber {
    async fn probe(&self, host: &str, _timeout: Duration) -> ProbeOutcome {
        self.in_flight.enter_for(self.hold).await;
        self.answers
            .get(host)
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::unreachable(None))
    }
}

/// Passive source with a fixed answer or a failure.
pub struct StaticSource {
    pub name: &'static str,
    pub hosts: Option<Vec<&'static str>>,
}

#[async_trait]
impl PassiveSource for StaticSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn query(
        &self,
        _ctx: &SourceContext<'_>,
    ) -> subdomain_finder_sources::Result<HashSet<String>> {
        match &self.hosts {
            Some(hosts) => Ok(hosts.iter().map(|h| (*h).to_string()).collect()),
            None => Err(SourceError::NetworkError {
                source_name: self.name.to_string(),
                detail: "unreachable".to_string(),
            }),
        }
    }
}

pub fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
