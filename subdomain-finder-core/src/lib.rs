//! Concurrent subdomain discovery and verification.
//!
//! The pipeline has four stages, each usable on its own:
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | DNS brute force | [`BruteForceEngine::scan`], [`BruteForceEngine::scan_deep`] |
//! | Passive aggregation | [`PassiveAggregator::scan`] (re-exported from `subdomain-finder-sources`) |
//! | Normalization | [`clean_and_dedupe`] |
//! | Verification | [`Verifier::verify_all`] |
//!
//! [`ScanService`] wires them together for one [`ScanConfig`]. Brute force and
//! verification share one concurrency primitive, the [`AdmissionGate`]; no stage
//! ever has more than its configured number of lookups or probes in flight.
//!
//! Per-host and per-source failures never abort a scan. DNS lookups return a
//! [`LookupOutcome`], probes a [`ProbeOutcome`], passive sources a
//! [`SourceStatus`]. Only configuration problems are returned as [`CoreError`].

mod bruteforce;
mod config;
mod error;
mod gate;
mod normalize;
mod prober;
mod resolver;
mod service;
mod verify;

pub use bruteforce::{BruteForceEngine, BruteForceProgress, ProgressSnapshot, ScanState};
pub use config::{
    DEFAULT_CONCURRENCY, DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_NAMESERVERS,
    DEFAULT_VERIFY_CONCURRENCY, ScanConfig, load_wordlist, parse_wordlist, validate_domain,
};
pub use error::{CoreError, CoreResult};
pub use gate::AdmissionGate;
pub use normalize::{MAX_HOSTNAME_LEN, clean_and_dedupe, is_valid_hostname, normalize_candidate};
pub use prober::{HttpProbe, PROBE_SCHEMES, ProbeOutcome, ReqwestProber};
pub use resolver::{DnsResolve, HickoryResolver, LookupOutcome, SystemResolver};
pub use service::{DiscoveryReport, ScanReport, ScanService};
pub use verify::{VerificationRecord, Verifier};

pub use subdomain_finder_sources::{
    AggregatorOptions, DEFAULT_SOURCE_TIMEOUT_SECS, PassiveAggregator, PassiveScanResult, PassiveSource, SourceCredentials,
    SourceError, SourceReport, SourceStatus,
};
