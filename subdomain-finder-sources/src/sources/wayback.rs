//! Wayback Machine CDX index.

use std::borrow::Cow;
use std::collections::HashSet;

use url::Url;

use super::SourceDescriptor;
use crate::error::Result;
use crate::http_client::HttpUtils;

const NAME: &str = "wayback";

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed(
            "https://web.archive.org/cdx/search/cdx?url=*.{domain}&output=json&fl=original&collapse=urlkey",
        ),
        parse,
    }
}

/// Rows are `[original]`; the first row is the header.
fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    if body.trim().is_empty() {
        return Ok(HashSet::new());
    }
    let rows: Vec<Vec<String>> = HttpUtils::parse_json(body, NAME)?;
    Ok(rows
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|original| Url::parse(original).ok())
        .filter_map(|url| url.host_str().map(str::to_lowercase))
        .collect())
}
