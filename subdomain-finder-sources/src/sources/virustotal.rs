//! VirusTotal v2 domain report. Needs an API key.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::Deserialize;

use super::SourceDescriptor;
use crate::error::Result;
use crate::http_client::HttpUtils;

const NAME: &str = "virustotal";

#[derive(Debug, Deserialize)]
struct DomainReport {
    #[serde(default)]
    subdomains: Vec<String>,
}

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed(
            "https://www.virustotal.com/vtapi/v2/domain/report?apikey={api_key}&domain={domain}",
        ),
        parse,
    }
}

fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    let report: DomainReport = HttpUtils::parse_json(body, NAME)?;
    Ok(report.subdomains.into_iter().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reads_subdomain_list() {
        let body = r#"{"response_code": 1, "subdomains": ["a.example.com", "b.example.com"]}"#;
        assert_eq!(parse(body, "example.com").unwrap().len(), 2);
    }

    #[test]
    fn unknown_domain_has_no_subdomains() {
        let body = r#"{"response_code": 0, "verbose_msg": "Domain not found"}"#;
        assert!(parse(body, "example.com").unwrap().is_empty());
    }
}
