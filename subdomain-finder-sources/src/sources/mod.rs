//! Passive source implementations.
//!
//! Almost every source is a single GET whose body is turned into raw hostnames, so
//! they are described by a [`SourceDescriptor`] row (name, URL template, parser) and
//! executed by one generic [`DescriptorSource`]. Sources with a multi-step flow
//! implement [`PassiveSource`] directly.

mod bufferover;
mod crtsh;
mod dnsdumpster;
mod hackertarget;
mod otx;
mod rapiddns;
mod virustotal;
mod wayback;

use std::borrow::Cow;
use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use url::form_urlencoded;

use crate::error::{Result, SourceError};
use crate::http_client::HttpUtils;
use crate::traits::{PassiveSource, SourceContext};

pub use dnsdumpster::DnsDumpsterSource;

/// Placeholder replaced by the target domain in a URL template.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";
/// Placeholder replaced by the (URL-encoded) API key in a URL template.
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Turns a response body into raw hostnames. Receives the body and the target domain.
pub type ParseFn = fn(&str, &str) -> Result<HashSet<String>>;

/// One row of the source table.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Stable identifier.
    pub name: &'static str,
    /// Request URL with `{domain}` and optionally `{api_key}` placeholders.
    pub url_template: Cow<'static, str>,
    /// Response parser.
    pub parse: ParseFn,
}

impl SourceDescriptor {
    /// Whether the URL template needs an API key.
    pub fn requires_api_key(&self) -> bool {
        self.url_template.contains(API_KEY_PLACEHOLDER)
    }

    /// Expand the URL template for `domain`.
    ///
    /// Returns `None` when the template needs an API key and none was given.
    pub fn render_url(&self, domain: &str, api_key: Option<&str>) -> Option<String> {
        let url = self.url_template.replace(DOMAIN_PLACEHOLDER, domain);
        if !self.requires_api_key() {
            return Some(url);
        }
        let key: String = form_urlencoded::byte_serialize(api_key?.as_bytes()).collect();
        Some(url.replace(API_KEY_PLACEHOLDER, &key))
    }
}

/// Descriptors for every built-in single-request source.
pub fn builtin_descriptors() -> Vec<SourceDescriptor> {
    vec![
        crtsh::descriptor(),
        wayback::descriptor(),
        hackertarget::descriptor(),
        rapiddns::descriptor(),
        bufferover::descriptor(),
        otx::descriptor(),
        virustotal::descriptor(),
    ]
}

/// A source driven entirely by its [`SourceDescriptor`].
pub struct DescriptorSource {
    descriptor: SourceDescriptor,
    api_key: Option<String>,
}

impl DescriptorSource {
    pub fn new(descriptor: SourceDescriptor, api_key: Option<String>) -> Self {
        Self {
            descriptor,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl PassiveSource for DescriptorSource {
    fn name(&self) -> &'static str {
        self.descriptor.name
    }

    async fn query(&self, ctx: &SourceContext<'_>) -> Result<HashSet<String>> {
        let url = self
            .descriptor
            .render_url(ctx.domain, self.api_key.as_deref())
            .ok_or_else(|| SourceError::MissingApiKey {
                source_name: self.descriptor.name.to_string(),
            })?;

        let body = HttpUtils::fetch_text(
            ctx.client.get(&url),
            self.descriptor.name,
            &format!("GET {}", self.descriptor.url_template),
        )
        .await?;

        (self.descriptor.parse)(&body, ctx.domain)
    }
}

/// Pull every `<label>.<domain>` occurrence out of free text (HTML pages).
pub(crate) fn scrape_hostnames(text: &str, domain: &str, source_name: &str) -> Result<HashSet<String>> {
    let pattern = format!(r"(?i)([\w.-]+\.{})", regex::escape(domain));
    let re = Regex::new(&pattern).map_err(|e| SourceError::ParseError {
        source_name: source_name.to_string(),
        detail: e.to_string(),
    })?;
    Ok(re
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect())
}
