//! Pipeline façade chaining discovery, normalization and verification.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use subdomain_finder_sources::{
    AggregatorOptions, PassiveAggregator, SourceCredentials, SourceReport,
};

use crate::bruteforce::{BruteForceEngine, BruteForceProgress};
use crate::config::ScanConfig;
use crate::error::CoreResult;
use crate::normalize::clean_and_dedupe;
use crate::prober::{HttpProbe, ReqwestProber};
use crate::resolver::{DnsResolve, HickoryResolver};
use crate::verify::{VerificationRecord, Verifier};

/// Canonical results of the discovery stages.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub domain: String,
    /// Canonical hosts found by brute force.
    pub bruteforce: Vec<String>,
    /// Canonical hosts reported by passive sources.
    pub passive: Vec<String>,
    /// Sorted union of every stage plus externally supplied candidates.
    pub subdomains: Vec<String>,
    /// One entry per passive source; empty when the passive stage is off.
    pub sources: Vec<SourceReport>,
    pub elapsed_ms: u64,
}

/// Discovery followed by optional verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub discovery: DiscoveryReport,
    /// Present when verification is enabled.
    pub verification: Option<Vec<VerificationRecord>>,
}

/// Runs a whole scan for one [`ScanConfig`].
///
/// ```rust,no_run
/// use subdomain_finder_core::{ScanConfig, ScanService};
/// # async fn demo() -> subdomain_finder_core::CoreResult<()> {
/// let config = ScanConfig::new("example.com")
///     .with_wordlist(vec!["www".into(), "mail".into()])
///     .with_verify(true);
/// let service = ScanService::new(config)?;
/// let report = service.run(&[]).await?;
/// println!("{} subdomains", report.discovery.subdomains.len());
/// # Ok(())
/// # }
/// ```
pub struct ScanService {
    config: ScanConfig,
    bruteforce: BruteForceEngine,
    aggregator: PassiveAggregator,
    verifier: Verifier,
}

impl ScanService {
    /// Validate `config` and build the default stack: Hickory resolver over the
    /// configured nameservers, `reqwest` prober and every built-in passive source.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`ScanConfig::validate`], or
    /// [`CoreError::HttpClientError`](crate::CoreError::HttpClientError).
    pub fn new(config: ScanConfig) -> CoreResult<Self> {
        let resolver: Arc<dyn DnsResolve> = Arc::new(HickoryResolver::new(&config.nameservers));
        Self::with_resolver(config, resolver)
    }

    /// Default stack with a caller-chosen resolver, e.g. [`SystemResolver`](crate::SystemResolver).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_resolver(config: ScanConfig, resolver: Arc<dyn DnsResolve>) -> CoreResult<Self> {
        let prober: Arc<dyn HttpProbe> = Arc::new(ReqwestProber::new(&config.user_agent)?);
        let credentials = SourceCredentials {
            virustotal: config.virustotal_api_key.clone(),
        };
        let aggregator = PassiveAggregator::with_default_sources(
            &credentials,
            AggregatorOptions {
                source_timeout: config.source_timeout,
                user_agent: config.user_agent.clone(),
            },
        );
        Self::with_components(config, resolver, prober, aggregator)
    }

    /// Build from explicit collaborators after validating `config`.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`ScanConfig::validate`].
    pub fn with_components(
        config: ScanConfig,
        resolver: Arc<dyn DnsResolve>,
        prober: Arc<dyn HttpProbe>,
        aggregator: PassiveAggregator,
    ) -> CoreResult<Self> {
        let config = config.validate()?;
        let bruteforce = BruteForceEngine::from_config(&config, Arc::clone(&resolver))?;
        let verifier = Verifier::from_config(&config, resolver, prober)?;
        Ok(Self {
            config,
            bruteforce,
            aggregator,
            verifier,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Progress of the brute-force stage.
    pub fn progress(&self) -> Arc<BruteForceProgress> {
        self.bruteforce.progress()
    }

    /// Run the enabled discovery stages concurrently and normalize everything,
    /// including `external` raw candidates.
    ///
    /// # Errors
    ///
    /// Only session-level failures (closed gate, unbuildable HTTP client).
    pub async fn discover(&self, external: &[String]) -> CoreResult<DiscoveryReport> {
        let started = Instant::now();
        let domain = self.config.domain.as_str();

        let (brute, passive) = tokio::join!(self.run_bruteforce(), async {
            if self.config.passive {
                self.aggregator.scan_detailed(domain).await.map(Some)
            } else {
                Ok(None)
            }
        });
        let brute = brute?;
        let passive = passive?;

        let bruteforce = clean_and_dedupe(&brute, domain);
        let (passive, sources) = match passive {
            Some(result) => (clean_and_dedupe(&result.hostnames, domain), result.reports),
            None => (Vec::new(), Vec::new()),
        };
        let subdomains = clean_and_dedupe(
            bruteforce.iter().chain(&passive).chain(external),
            domain,
        );

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "[scan] {} subdomains for {domain} ({} brute force, {} passive, {} external candidates)",
            subdomains.len(),
            bruteforce.len(),
            passive.len(),
            external.len()
        );

        Ok(DiscoveryReport {
            domain: domain.to_string(),
            bruteforce,
            passive,
            subdomains,
            sources,
            elapsed_ms,
        })
    }

    /// Verify canonical hosts.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`](crate::CoreError::GateClosed) if the gate is closed.
    pub async fn verify(&self, hosts: &[String]) -> CoreResult<Vec<VerificationRecord>> {
        self.verifier.verify_all(hosts).await
    }

    /// [`discover`](Self::discover), then [`verify`](Self::verify) when enabled.
    ///
    /// # Errors
    ///
    /// See [`discover`](Self::discover) and [`verify`](Self::verify).
    pub async fn run(&self, external: &[String]) -> CoreResult<ScanReport> {
        let discovery = self.discover(external).await?;
        let verification = if self.config.verify {
            Some(self.verify(&discovery.subdomains).await?)
        } else {
            None
        };
        Ok(ScanReport {
            discovery,
            verification,
        })
    }

    async fn run_bruteforce(&self) -> CoreResult<HashSet<String>> {
        if !self.config.bruteforce {
            return Ok(HashSet::new());
        }
        if self.config.deep {
            self.bruteforce
                .scan_deep(&self.config.domain, &self.config.wordlist)
                .await
        } else {
            self.bruteforce
                .scan(&self.config.domain, &self.config.wordlist)
                .await
        }
    }
}
