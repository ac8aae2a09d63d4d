//! DNS resolution with explicit outcomes.
//!
//! [`HickoryResolver`] talks to a fixed nameserver pool built once per session.
//! [`SystemResolver`] goes through the operating system's `getaddrinfo`, which tokio
//! runs on its blocking pool so a slow lookup never stalls sibling tasks.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    ResolveError, TokioResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};

/// Result of one A-record lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The name resolved to at least one address.
    Found(Vec<IpAddr>),
    /// The name does not exist or has no A records.
    Absent,
    /// The lookup could not be completed (timeout, network failure, bad response).
    Failed(String),
}

impl LookupOutcome {
    /// Resolved addresses; empty unless [`Found`](Self::Found).
    pub fn ips(&self) -> &[IpAddr] {
        match self {
            Self::Found(ips) => ips,
            Self::Absent | Self::Failed(_) => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Failure detail, if the lookup was inconclusive.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(detail) => Some(detail),
            Self::Found(_) | Self::Absent => None,
        }
    }
}

/// A-record resolution.
///
/// Implementations never return errors: absence and failure are both outcomes, so a
/// single bad lookup cannot abort a scan.
#[async_trait]
pub trait DnsResolve: Send + Sync {
    /// Resolve the IPv4 addresses of `host`, giving up after `timeout`.
    async fn resolve_a(&self, host: &str, timeout: Duration) -> LookupOutcome;
}

/// Async resolver over a fixed nameserver pool.
pub struct HickoryResolver {
    inner: TokioResolver,
    nameservers: Vec<String>,
}

impl HickoryResolver {
    /// Build a resolver that queries `nameservers` over UDP/TCP port 53.
    ///
    /// An empty slice falls back to the host system configuration.
    pub fn new(nameservers: &[IpAddr]) -> Self {
        if nameservers.is_empty() {
            return Self::system();
        }
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(nameservers, 53, true),
        );
        let nameservers = dedup_ips(&config);
        let inner = TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(ResolverOpts::default())
            .build();
        Self { inner, nameservers }
    }

    /// Build a resolver from the system DNS configuration, or Hickory's defaults when
    /// it cannot be read.
    pub fn system() -> Self {
        #[cfg(any(unix, target_os = "windows"))]
        {
            match hickory_resolver::system_conf::read_system_conf() {
                Ok((config, opts)) => {
                    let nameservers = dedup_ips(&config);
                    let inner = TokioResolver::builder_with_config(
                        config,
                        TokioConnectionProvider::default(),
                    )
                    .with_options(opts)
                    .build();
                    return Self { inner, nameservers };
                }
                Err(e) => {
                    log::warn!(
                        "[resolver] Failed to load system DNS configuration, falling back to defaults: {e}"
                    );
                }
            }
        }

        let config = ResolverConfig::default();
        let nameservers = dedup_ips(&config);
        let inner = TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(ResolverOpts::default())
            .build();
        Self { inner, nameservers }
    }

    /// Distinct nameserver addresses in the pool.
    pub fn nameservers(&self) -> &[String] {
        &self.nameservers
    }
}

#[async_trait]
impl DnsResolve for HickoryResolver {
    async fn resolve_a(&self, host: &str, timeout: Duration) -> LookupOutcome {
        match tokio::time::timeout(timeout, self.inner.ipv4_lookup(host)).await {
            Err(_) => LookupOutcome::Failed(format!("DNS timeout after {}ms", timeout.as_millis())),
            Ok(Ok(lookup)) => {
                let ips: Vec<IpAddr> = lookup.iter().map(|a| IpAddr::V4(a.0)).collect();
                if ips.is_empty() {
                    LookupOutcome::Absent
                } else {
                    LookupOutcome::Found(ips)
                }
            }
            Ok(Err(e)) => classify_resolve_error(&e),
        }
    }
}

/// NXDOMAIN and empty answers mean the name is absent; anything else is a failure.
fn classify_resolve_error(err: &ResolveError) -> LookupOutcome {
    if err.is_no_records_found() || err.is_nx_domain() {
        LookupOutcome::Absent
    } else {
        LookupOutcome::Failed(err.to_string())
    }
}

/// Deduplicate nameserver IP addresses from a resolver configuration.
fn dedup_ips(config: &ResolverConfig) -> Vec<String> {
    let mut ips: Vec<String> = Vec::new();
    for ns in config.name_servers() {
        let ip = ns.socket_addr.ip().to_string();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
    ips
}

/// Resolver backed by the operating system's `getaddrinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl SystemResolver {
    /// `getaddrinfo` reports "no such host" as a generic I/O error; tell it apart by
    /// the gai message so real failures stay visible.
    fn classify(err: &io::Error) -> LookupOutcome {
        let message = err.to_string();
        let lower = message.to_lowercase();
        let absent = [
            "not known",
            "no address associated",
            "nodename nor servname",
            "no such host",
            "no data",
        ];
        if absent.iter().any(|needle| lower.contains(needle)) {
            LookupOutcome::Absent
        } else {
            LookupOutcome::Failed(message)
        }
    }
}

#[async_trait]
impl DnsResolve for SystemResolver {
    async fn resolve_a(&self, host: &str, timeout: Duration) -> LookupOutcome {
        match tokio::time::timeout(timeout, tokio::net::lookup_host((host, 0))).await {
            Err(_) => LookupOutcome::Failed(format!("DNS timeout after {}ms", timeout.as_millis())),
            Ok(Err(e)) => Self::classify(&e),
            Ok(Ok(addrs)) => {
                let mut ips: Vec<IpAddr> = Vec::new();
                for addr in addrs.filter(|a| a.is_ipv4()) {
                    if !ips.contains(&addr.ip()) {
                        ips.push(addr.ip());
                    }
                }
                if ips.is_empty() {
                    LookupOutcome::Absent
                } else {
                    LookupOutcome::Found(ips)
                }
            }
        }
    }
}
