//! HackerTarget host search (`host,ip` lines).

use std::borrow::Cow;
use std::collections::HashSet;

use super::SourceDescriptor;
use crate::error::{Result, SourceError};

const NAME: &str = "hackertarget";

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed("https://api.hackertarget.com/hostsearch/?q={domain}"),
        parse,
    }
}

fn parse(body: &str, _domain: &str) -> Result<HashSet<String>> {
    let first = body.lines().next().unwrap_or_default().trim();
    // Quota and input errors come back as a 200 with a single message line.
    if first.starts_with("error") || first.contains("API count exceeded") {
        return Err(SourceError::ParseError {
            source_name: NAME.to_string(),
            detail: first.to_string(),
        });
    }
    Ok(body
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|host| host.trim().to_lowercase())
        .filter(|host| !host.is_empty())
        .collect())
}
