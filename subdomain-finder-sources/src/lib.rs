//! # subdomain-finder-sources
//!
//! Passive subdomain data sources and the aggregator that queries them all at once.
//!
//! ## Built-in sources
//!
//! | Source | Kind | Needs key |
//! |--------|------|-----------|
//! | `crtsh` | Certificate transparency (crt.sh) | no |
//! | `wayback` | Web archive (Wayback Machine CDX) | no |
//! | `hackertarget` | DNS aggregation | no |
//! | `rapiddns` | DNS aggregation (HTML) | no |
//! | `bufferover` | DNS aggregation | no |
//! | `otx` | Threat intelligence (AlienVault OTX) | no |
//! | `virustotal` | Threat intelligence | `VIRUSTOTAL_API_KEY` |
//! | `dnsdumpster` | DNS aggregation (form + HTML) | no |
//!
//! Single-request sources are rows of a descriptor table (see [`SourceDescriptor`]);
//! custom rows can be added with [`DescriptorSource`]. Anything else implements
//! [`PassiveSource`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use subdomain_finder_sources::{AggregatorOptions, PassiveAggregator, SourceCredentials};
//!
//! # async fn demo() -> subdomain_finder_sources::Result<()> {
//! let aggregator = PassiveAggregator::with_default_sources(
//!     &SourceCredentials::default(),
//!     AggregatorOptions::default(),
//! );
//! let result = aggregator.scan_detailed("example.com").await?;
//! for report in &result.reports {
//!     println!("{}: {:?} ({})", report.source, report.status, report.count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure isolation
//!
//! A source that errors, times out or returns garbage contributes an empty set and a
//! report entry; it never aborts or delays the others. Hostnames are returned raw:
//! names outside the target domain are filtered downstream by the normalizer.

mod aggregator;
mod error;
mod factory;
mod http_client;
mod sources;
mod traits;
mod types;
mod utils;

pub use aggregator::{AggregatorOptions, DEFAULT_SOURCE_TIMEOUT_SECS, PassiveAggregator};
pub use error::{Result, SourceError};
pub use factory::{SourceCredentials, create_default_sources, default_source_names};
pub use sources::{
    API_KEY_PLACEHOLDER, DOMAIN_PLACEHOLDER, DescriptorSource, DnsDumpsterSource, ParseFn,
    SourceDescriptor, builtin_descriptors,
};
pub use traits::{PassiveSource, SourceContext};
pub use types::{PassiveScanResult, SourceReport, SourceStatus};
