//! AlienVault OTX passive DNS.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::Deserialize;

use super::SourceDescriptor;
use crate::error::Result;
use crate::http_client::HttpUtils;

const NAME: &str = "otx";

#[derive(Debug, Deserialize)]
struct PassiveDnsResponse {
    #[serde(default)]
    passive_dns: Vec<PassiveDnsEntry>,
}

#[derive(Debug, Deserialize)]
struct PassiveDnsEntry {
    hostname: Option<String>,
}

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed(
            "https://otx.alienvault.com/api/v1/indicators/domain/{domain}/passive_dns",
        ),
        parse,
    }
}

fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    let response: PassiveDnsResponse = HttpUtils::parse_json(body, NAME)?;
    Ok(response
        .passive_dns
        .into_iter()
        .filter_map(|entry| entry.hostname)
        .map(|host| host.to_lowercase())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn collects_hostnames() {
        let body = r#"{"count": 3, "passive_dns": [
            {"hostname": "vpn.example.com", "address": "1.1.1.1"},
            {"address": "2.2.2.2"},
            {"hostname": "VPN.example.com"}
        ]}"#;
        let hosts = parse(body, "example.com").unwrap();
        assert_eq!(hosts, HashSet::from(["vpn.example.com".to_string()]));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        assert!(parse(r#"{"passive_dns": "nope"}"#, "example.com").is_err());
    }
}
