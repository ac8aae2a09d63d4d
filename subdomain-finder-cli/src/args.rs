//! Command-line arguments.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use subdomain_finder_core::{
    DEFAULT_CONCURRENCY, DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_NAMESERVERS, DEFAULT_SOURCE_TIMEOUT_SECS, DEFAULT_VERIFY_CONCURRENCY, ScanConfig,
};

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "subdomain-finder",
    version,
    about = "Discover subdomains by DNS brute force and passive sources, then verify them"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Target domain to scan
    #[arg(short, long)]
    pub domain: String,

    /// Wordlist for brute force
    #[arg(short, long, default_value = "wordlists/default.txt")]
    pub wordlist: PathBuf,

    /// Concurrent DNS queries during brute force
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Try only two-level names ({word1}.{word2}.{domain}) instead of {word}.{domain}; the candidate count is the square of the wordlist size
    #[arg(long)]
    pub deep: bool,

    /// Skip DNS brute force
    #[arg(long)]
    pub no_bruteforce: bool,

    /// Skip passive sources
    #[arg(long)]
    pub no_passive: bool,

    /// Resolve and HTTP-probe every discovered subdomain
    #[arg(long)]
    pub verify: bool,

    /// Hosts verified at once
    #[arg(long, default_value_t = DEFAULT_VERIFY_CONCURRENCY)]
    pub verify_concurrency: usize,

    /// DNS timeout in seconds
    #[arg(long, default_value_t = DEFAULT_DNS_TIMEOUT_SECS)]
    pub dns_timeout: u64,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout: u64,

    /// Per-source timeout in seconds
    #[arg(long, default_value_t = DEFAULT_SOURCE_TIMEOUT_SECS)]
    pub source_timeout: u64,

    /// Nameserver to query (repeatable; defaults to 8.8.8.8, 8.8.4.4, 1.1.1.1)
    #[arg(long = "resolver", value_name = "IP")]
    pub resolvers: Vec<IpAddr>,

    /// Resolve through the operating system instead of a nameserver pool
    #[arg(long, conflicts_with = "resolvers")]
    pub system_resolver: bool,

    /// Existing results to clean and merge (JSON or plain text)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// VirusTotal API key
    #[arg(long, env = "VIRUSTOTAL_API_KEY", hide_env_values = true)]
    pub virustotal_key: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Brute force runs unless disabled.
    pub fn bruteforce_enabled(&self) -> bool {
        !self.no_bruteforce
    }

    pub fn to_config(&self, wordlist: Vec<String>) -> ScanConfig {
        let nameservers = if self.resolvers.is_empty() {
            DEFAULT_NAMESERVERS.to_vec()
        } else {
            self.resolvers.clone()
        };
        ScanConfig::new(self.domain.clone())
            .with_wordlist(wordlist)
            .with_concurrency(self.concurrency)
            .with_verify_concurrency(self.verify_concurrency)
            .with_dns_timeout(Duration::from_secs(self.dns_timeout))
            .with_http_timeout(Duration::from_secs(self.http_timeout))
            .with_source_timeout(Duration::from_secs(self.source_timeout))
            .with_nameservers(nameservers)
            .with_deep(self.deep)
            .with_bruteforce(self.bruteforce_enabled())
            .with_passive(!self.no_passive)
            .with_verify(self.verify)
            .with_virustotal_api_key(self.virustotal_key.clone())
    }
}
