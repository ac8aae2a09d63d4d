//! Wordlist-driven DNS brute force.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::CoreResult;
use crate::gate::AdmissionGate;
use crate::resolver::{DnsResolve, LookupOutcome};

/// Lifecycle of a brute-force run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    /// Candidate stream being prepared.
    Chunking,
    /// Candidates being admitted and resolved.
    Resolving,
    Done,
}

impl ScanState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Chunking,
            2 => Self::Resolving,
            3 => Self::Done,
            _ => Self::Idle,
        }
    }
}

/// Live counters for a running scan. Poll with [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct BruteForceProgress {
    state: AtomicU8,
    total: AtomicUsize,
    resolved: AtomicUsize,
    hits: AtomicUsize,
}

/// Point-in-time copy of [`BruteForceProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub state: ScanState,
    pub total: usize,
    pub resolved: usize,
    pub hits: usize,
}

impl BruteForceProgress {
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            state: ScanState::from_u8(self.state.load(Ordering::Acquire)),
            total: self.total.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }

    fn reset(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.resolved.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }

    fn set_state(&self, state: ScanState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Resolves `{word}.{domain}` candidates through an [`AdmissionGate`].
///
/// At most `gate.limit()` lookups are in flight at any moment. Only names that
/// resolve to at least one address are kept; absent and failed lookups are dropped.
pub struct BruteForceEngine {
    resolver: Arc<dyn DnsResolve>,
    gate: AdmissionGate,
    dns_timeout: Duration,
    progress: Arc<BruteForceProgress>,
}

impl BruteForceEngine {
    pub fn new(resolver: Arc<dyn DnsResolve>, gate: AdmissionGate, dns_timeout: Duration) -> Self {
        Self {
            resolver,
            gate,
            dns_timeout,
            progress: Arc::new(BruteForceProgress::default()),
        }
    }

    /// Engine using the session's brute-force concurrency and DNS timeout.
    ///
    /// # Errors
    ///
    /// [`CoreError::ValidationError`](crate::CoreError::ValidationError) for a zero
    /// concurrency limit.
    pub fn from_config(config: &ScanConfig, resolver: Arc<dyn DnsResolve>) -> CoreResult<Self> {
        Ok(Self::new(
            resolver,
            AdmissionGate::new(config.concurrency)?,
            config.dns_timeout,
        ))
    }

    /// Shared progress handle; stays valid across scans.
    pub fn progress(&self) -> Arc<BruteForceProgress> {
        Arc::clone(&self.progress)
    }

    /// Resolve `{word}.{domain}` for every word and return the names that exist.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`](crate::CoreError::GateClosed) if the gate is closed.
    pub async fn scan(&self, domain: &str, wordlist: &[String]) -> CoreResult<HashSet<String>> {
        self.progress.set_state(ScanState::Chunking);
        let words: Vec<&str> = usable_words(wordlist).collect();
        let candidates = words.iter().map(|word| format!("{word}.{domain}"));
        log::info!(
            "[bruteforce] starting with {} candidates for {domain} (concurrency {})",
            words.len(),
            self.gate.limit()
        );
        self.resolve_all(candidates, words.len()).await
    }

    /// Resolve every two-level `{word1}.{word2}.{domain}` combination.
    ///
    /// The candidate space is the square of the wordlist size. Candidates are
    /// generated on demand, never materialised.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`](crate::CoreError::GateClosed) if the gate is closed.
    pub async fn scan_deep(
        &self,
        domain: &str,
        wordlist: &[String],
    ) -> CoreResult<HashSet<String>> {
        self.progress.set_state(ScanState::Chunking);
        let words: Vec<&str> = usable_words(wordlist).collect();
        let total = words.len().saturating_mul(words.len());
        let candidates = words.iter().flat_map(|outer| {
            words
                .iter()
                .map(move |inner| format!("{outer}.{inner}.{domain}"))
        });
        log::info!(
            "[bruteforce] starting deep scan with {total} combinations for {domain} (concurrency {})",
            self.gate.limit()
        );
        self.resolve_all(candidates, total).await
    }

    async fn resolve_all(
        &self,
        candidates: impl Iterator<Item = String>,
        total: usize,
    ) -> CoreResult<HashSet<String>> {
        let started = Instant::now();
        self.progress.reset(total);
        self.progress.set_state(ScanState::Resolving);

        let timeout = self.dns_timeout;
        let mut found = HashSet::new();
        let result = self
            .gate
            .for_each_completed(
                candidates,
                |host| {
                    let resolver = Arc::clone(&self.resolver);
                    let progress = Arc::clone(&self.progress);
                    async move {
                        let outcome = resolver.resolve_a(&host, timeout).await;
                        progress.resolved.fetch_add(1, Ordering::Relaxed);
                        match outcome {
                            LookupOutcome::Found(ips) => {
                                progress.hits.fetch_add(1, Ordering::Relaxed);
                                log::debug!("[bruteforce] found {host} -> {ips:?}");
                                Some(host)
                            }
                            LookupOutcome::Absent => None,
                            LookupOutcome::Failed(detail) => {
                                log::debug!("[bruteforce] {host}: {detail}");
                                None
                            }
                        }
                    }
                },
                |hit| {
                    if let Some(host) = hit {
                        found.insert(host);
                    }
                },
            )
            .await;

        self.progress.set_state(ScanState::Done);
        result?;

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "[bruteforce] finished: {} found out of {total} in {elapsed_ms}ms",
            found.len()
        );
        Ok(found)
    }
}

fn usable_words(wordlist: &[String]) -> impl Iterator<Item = &str> {
    wordlist
        .iter()
        .map(|word| word.trim().trim_matches('.'))
        .filter(|word| !word.is_empty())
}
