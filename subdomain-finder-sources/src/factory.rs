//! Builds the default source set.

use std::sync::Arc;

use crate::sources::{DescriptorSource, DnsDumpsterSource, builtin_descriptors};
use crate::traits::PassiveSource;

/// API keys for sources that need them.
#[derive(Debug, Clone, Default)]
pub struct SourceCredentials {
    /// VirusTotal v2 API key (`VIRUSTOTAL_API_KEY`).
    pub virustotal: Option<String>,
}

/// Creates every built-in source.
///
/// Keyed sources without a key are still created; they report
/// [`SourceStatus::Skipped`](crate::SourceStatus::Skipped) when queried.
pub fn create_default_sources(credentials: &SourceCredentials) -> Vec<Arc<dyn PassiveSource>> {
    let mut sources: Vec<Arc<dyn PassiveSource>> = builtin_descriptors()
        .into_iter()
        .map(|descriptor| {
            let key = match descriptor.name {
                "virustotal" => credentials.virustotal.clone(),
                _ => None,
            };
            Arc::new(DescriptorSource::new(descriptor, key)) as Arc<dyn PassiveSource>
        })
        .collect();
    sources.push(Arc::new(DnsDumpsterSource::new()));
    sources
}

/// Names of every built-in source, in query order.
pub fn default_source_names() -> Vec<&'static str> {
    create_default_sources(&SourceCredentials::default())
        .iter()
        .map(|s| s.name())
        .collect()
}
