//! BufferOver forward/reverse DNS dataset.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::Deserialize;

use super::SourceDescriptor;
use crate::error::Result;
use crate::http_client::HttpUtils;

const NAME: &str = "bufferover";

#[derive(Debug, Default, Deserialize)]
struct BufferOverResponse {
    #[serde(rename = "FDNS_A", default)]
    fdns_a: Option<Vec<String>>,
    #[serde(rename = "RDNS", default)]
    rdns: Option<Vec<String>>,
}

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed("https://dns.bufferover.run/dns?q=.{domain}"),
        parse,
    }
}

/// Entries are `ip,hostname`.
fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    let response: BufferOverResponse = HttpUtils::parse_json(body, NAME)?;
    Ok(response
        .fdns_a
        .iter()
        .chain(response.rdns.iter())
        .flatten()
        .filter_map(|entry| entry.split(',').nth(1))
        .map(|host| host.trim().to_lowercase())
        .filter(|host| !host.is_empty())
        .collect())
}
