//! Scan session configuration and wordlist loading.

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use subdomain_finder_sources::DEFAULT_SOURCE_TIMEOUT_SECS;

use crate::error::{CoreError, CoreResult};

/// Default number of in-flight DNS queries during brute force.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Default number of hosts verified at once.
pub const DEFAULT_VERIFY_CONCURRENCY: usize = 40;
/// Default per-query DNS timeout in seconds.
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;
/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 8;

/// Public recursive resolvers used when no nameserver is configured.
pub const DEFAULT_NAMESERVERS: [IpAddr; 3] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
];

const MAX_DOMAIN_LEN: usize = 253;

/// Immutable settings for one scan.
///
/// Build with [`ScanConfig::new`] and the `with_*` methods, then call
/// [`validate`](Self::validate) once before handing it to the pipeline. Every stage
/// reads from the same value; nothing mutates it during a scan.
#[derive(Clone)]
pub struct ScanConfig {
    /// Target domain (canonical after validation).
    pub domain: String,
    /// Brute-force words, already stripped.
    pub wordlist: Vec<String>,
    /// Admission limit for brute-force DNS queries.
    pub concurrency: usize,
    /// Admission limit for verification tasks.
    pub verify_concurrency: usize,
    /// Per-query DNS timeout.
    pub dns_timeout: Duration,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Whole-query timeout for each passive source.
    pub source_timeout: Duration,
    /// Nameserver pool for the DNS resolver. Empty means the system configuration.
    pub nameservers: Vec<IpAddr>,
    /// Generate two-level `{w1}.{w2}.{domain}` candidates instead of `{w}.{domain}`.
    pub deep: bool,
    /// Run the brute-force stage.
    pub bruteforce: bool,
    /// Run the passive stage.
    pub passive: bool,
    /// Run verification after discovery.
    pub verify: bool,
    /// VirusTotal API key; the source is skipped without one.
    pub virustotal_api_key: Option<String>,
    /// User agent for passive sources and probes.
    pub user_agent: String,
}

impl ScanConfig {
    /// Defaults for `domain`: brute force and passive enabled, verification off.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            wordlist: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            verify_concurrency: DEFAULT_VERIFY_CONCURRENCY,
            dns_timeout: Duration::from_secs(DEFAULT_DNS_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            nameservers: DEFAULT_NAMESERVERS.to_vec(),
            deep: false,
            bruteforce: true,
            passive: true,
            verify: false,
            virustotal_api_key: None,
            user_agent: concat!("subdomain-finder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    #[must_use]
    pub fn with_wordlist(mut self, wordlist: Vec<String>) -> Self {
        self.wordlist = wordlist;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_verify_concurrency(mut self, concurrency: usize) -> Self {
        self.verify_concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_nameservers(mut self, nameservers: Vec<IpAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    #[must_use]
    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    #[must_use]
    pub fn with_bruteforce(mut self, enabled: bool) -> Self {
        self.bruteforce = enabled;
        self
    }

    #[must_use]
    pub fn with_passive(mut self, enabled: bool) -> Self {
        self.passive = enabled;
        self
    }

    #[must_use]
    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    #[must_use]
    pub fn with_virustotal_api_key(mut self, key: Option<String>) -> Self {
        self.virustotal_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check every setting and canonicalize the domain.
    ///
    /// # Errors
    ///
    /// [`CoreError::ValidationError`] for a bad domain, a zero limit or a zero timeout;
    /// [`CoreError::WordlistError`] when brute force is enabled with an empty wordlist.
    pub fn validate(mut self) -> CoreResult<Self> {
        self.domain = validate_domain(&self.domain)?;

        if self.concurrency == 0 || self.verify_concurrency == 0 {
            return Err(CoreError::ValidationError(
                "Concurrency must be at least 1".to_string(),
            ));
        }
        for (name, timeout) in [
            ("DNS", self.dns_timeout),
            ("HTTP", self.http_timeout),
            ("source", self.source_timeout),
        ] {
            if timeout.is_zero() {
                return Err(CoreError::ValidationError(format!(
                    "{name} timeout must be greater than zero"
                )));
            }
        }
        if self.bruteforce && self.wordlist.is_empty() {
            return Err(CoreError::WordlistError(
                "Brute force enabled but the wordlist is empty".to_string(),
            ));
        }
        Ok(self)
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("domain", &self.domain)
            .field("wordlist_len", &self.wordlist.len())
            .field("concurrency", &self.concurrency)
            .field("verify_concurrency", &self.verify_concurrency)
            .field("dns_timeout", &self.dns_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("source_timeout", &self.source_timeout)
            .field("nameservers", &self.nameservers)
            .field("deep", &self.deep)
            .field("bruteforce", &self.bruteforce)
            .field("passive", &self.passive)
            .field("verify", &self.verify)
            .field(
                "virustotal_api_key",
                &self.virustotal_api_key.as_ref().map(|_| "***"),
            )
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Validate and canonicalize a target domain.
///
/// Trims whitespace and trailing dots, lowercases, converts internationalised names
/// to ASCII via IDNA 2008, and rejects IP addresses, single-label names and inputs
/// longer than 253 characters.
///
/// # Errors
///
/// [`CoreError::ValidationError`] describing the first problem found.
pub fn validate_domain(domain: &str) -> CoreResult<String> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return Err(CoreError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }
    if domain.parse::<IpAddr>().is_ok() {
        return Err(CoreError::ValidationError(format!(
            "Expected a domain name, got an IP address: {domain}"
        )));
    }
    check_domain_len(&domain)?;
    let ascii_domain = idna::domain_to_ascii_strict(&domain)
        .map_err(|_| CoreError::ValidationError(format!("Invalid domain name: {domain}")))?;
    // Punycode can push a short Unicode name past the limit.
    check_domain_len(&ascii_domain)?;
    if !ascii_domain.contains('.') {
        return Err(CoreError::ValidationError(format!(
            "Domain name must have at least two labels: {ascii_domain}"
        )));
    }
    Ok(ascii_domain)
}

fn check_domain_len(domain: &str) -> CoreResult<()> {
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(CoreError::ValidationError(format!(
            "Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
            domain.len()
        )));
    }
    Ok(())
}

/// Read a wordlist file.
///
/// Lines are stripped; blank lines and `#` comments are dropped; duplicates are
/// removed keeping the first occurrence.
///
/// # Errors
///
/// [`CoreError::WordlistError`] when the file is missing, unreadable or yields no words.
pub async fn load_wordlist(path: impl AsRef<Path>) -> CoreResult<Vec<String>> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::WordlistError(format!("Wordlist not found: {}", path.display()))
        } else {
            CoreError::WordlistError(format!("Failed to read {}: {e}", path.display()))
        }
    })?;
    let words = parse_wordlist(&String::from_utf8_lossy(&bytes));
    if words.is_empty() {
        return Err(CoreError::WordlistError(format!(
            "Wordlist is empty: {}",
            path.display()
        )));
    }
    log::debug!("[config] loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Parse wordlist text (see [`load_wordlist`]).
pub fn parse_wordlist(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_validate_domain_canonicalizes() {
        assert_eq!(validate_domain("  Example.COM. ").unwrap(), "example.com");
    }

    #[test]
    fn test_validate_domain_idn() {
        assert_eq!(validate_domain("münchen.de").unwrap(), "xn--mnchen-3ya.de");
    }

    #[test]
    fn test_validate_domain_rejects_empty() {
        assert!(matches!(
            validate_domain("   "),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_domain_rejects_ip() {
        assert!(validate_domain("192.168.1.1").is_err());
        assert!(validate_domain("::1").is_err());
    }

    #[test]
    fn test_validate_domain_rejects_single_label() {
        assert!(validate_domain("localhost").is_err());
    }

    #[test]
    fn test_validate_domain_rejects_too_long() {
        let long = format!("{}.com", vec!["a".repeat(60); 5].join("."));
        let err = validate_domain(&long).unwrap_err();
        assert!(err.to_string().contains("253"), "{err}");
        assert!(err.to_string().contains("got 308"), "{err}");
    }

    #[test]
    fn test_validate_domain_length_boundary() {
        let at_limit = format!("{}.{}.com", vec!["a".repeat(63); 3].join("."), "b".repeat(57));
        assert_eq!(at_limit.len(), 253);
        assert_eq!(validate_domain(&at_limit).unwrap(), at_limit);

        let over = format!("c{at_limit}");
        assert!(validate_domain(&over).unwrap_err().to_string().contains("253"));
    }

    #[test]
    fn test_validate_domain_checks_length_after_punycode() {
        // Each label is 57 bytes as UTF-8 and 63 characters once encoded.
        let label = format!("{}ü", "a".repeat(55));
        let unicode = format!("{}.de", vec![label; 4].join("."));
        assert!(unicode.len() <= 253);
        assert!(matches!(
            validate_domain(&unicode),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_domain_rejects_garbage() {
        assert!(validate_domain("exa mple.com").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::new("example.com");
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.verify_concurrency, 40);
        assert_eq!(config.dns_timeout, Duration::from_secs(5));
        assert_eq!(config.http_timeout, Duration::from_secs(8));
        assert_eq!(config.source_timeout, Duration::from_secs(10));
        assert_eq!(config.nameservers.len(), 3);
        assert!(config.bruteforce && config.passive && !config.verify);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = ScanConfig::new("Example.com")
            .with_wordlist(words(&["www"]))
            .validate()
            .unwrap();
        assert_eq!(config.domain, "example.com");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let result = ScanConfig::new("example.com")
            .with_wordlist(words(&["www"]))
            .with_concurrency(0)
            .validate();
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = ScanConfig::new("example.com")
            .with_wordlist(words(&["www"]))
            .with_http_timeout(Duration::ZERO)
            .validate();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("HTTP timeout"));
    }

    #[test]
    fn test_validate_requires_wordlist_for_bruteforce() {
        let result = ScanConfig::new("example.com").validate();
        assert!(matches!(result, Err(CoreError::WordlistError(_))));

        let passive_only = ScanConfig::new("example.com").with_bruteforce(false).validate();
        assert!(passive_only.is_ok());
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let config = ScanConfig::new("example.com").with_virustotal_api_key(Some("  ".into()));
        assert!(config.virustotal_api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            ScanConfig::new("example.com").with_virustotal_api_key(Some("sekrit".into()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("sekrit"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_parse_wordlist() {
        let text = "www\n  mail \n\n# comment\nwww\r\napi\n";
        assert_eq!(parse_wordlist(text), words(&["www", "mail", "api"]));
    }

    #[tokio::test]
    async fn test_load_wordlist_missing_file() {
        let err = load_wordlist("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, CoreError::WordlistError(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_load_wordlist_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "# only comments\n\n").unwrap();
        let err = load_wordlist(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_load_wordlist_reads_words() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "dev\nstaging\ndev\n").unwrap();
        let words = load_wordlist(file.path()).await.unwrap();
        assert_eq!(words, vec!["dev".to_string(), "staging".to_string()]);
    }
}
