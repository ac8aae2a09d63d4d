//! crt.sh certificate transparency search.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::Deserialize;

use super::SourceDescriptor;
use crate::error::Result;
use crate::http_client::HttpUtils;

const NAME: &str = "crtsh";

#[derive(Debug, Deserialize)]
struct CertificateEntry {
    #[serde(default)]
    name_value: String,
}

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed("https://crt.sh/?q=%25.{domain}&output=json"),
        parse,
    }
}

/// `name_value` holds one or more SAN entries separated by newlines.
fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    if body.trim().is_empty() {
        return Ok(HashSet::new());
    }
    let entries: Vec<CertificateEntry> = HttpUtils::parse_json(body, NAME)?;
    Ok(entries
        .iter()
        .flat_map(|e| e.name_value.lines())
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect())
}
