//! Hostname normalization, validation and de-duplication.
//!
//! Raw candidates come from brute force, passive sources and user-supplied files and
//! may hold anything: emails, wildcards, several names separated by commas or
//! newlines, stray whitespace. This stage turns them into Canonical Hostnames:
//! lowercase, no leading/trailing dots, strictly below the target domain, and
//! grammatically valid.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a canonical hostname.
pub const MAX_HOSTNAME_LEN: usize = 253;

static HOSTNAME_GRAMMAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9\-.]{0,251}[a-z0-9])?$").ok());

fn is_fragment_separator(c: char) -> bool {
    matches!(c, ',' | ';' | '\n' | '\r')
}

/// Split a raw candidate into lowercase tokens.
///
/// The candidate is split on runs of `,` `;` `\n` `\r`, each fragment is split on
/// whitespace, and every token is lowercased with leading/trailing dots removed.
/// Tokens are not validated.
pub fn normalize_candidate(candidate: &str) -> Vec<String> {
    candidate
        .split(is_fragment_separator)
        .flat_map(str::split_whitespace)
        .map(|token| token.trim_matches('.').to_lowercase())
        .collect()
}

/// Whether `host` ends with `.domain` and has at least one character before the dot.
fn has_label_suffix(host: &str, domain: &str) -> bool {
    let (h, d) = (host.as_bytes(), domain.as_bytes());
    if d.is_empty() || h.len() < d.len() + 2 {
        return false;
    }
    let boundary = h.len() - d.len();
    h[boundary..].eq_ignore_ascii_case(d) && h[boundary - 1] == b'.'
}

/// Whether a normalized token is a Canonical Hostname for `domain`.
///
/// Checks run cheapest first and stop at the first failure: empty, `@`, wildcard
/// prefix, label-boundary suffix match (the apex itself is rejected), then the
/// hostname grammar and length limit.
pub fn is_valid_hostname(token: &str, domain: &str) -> bool {
    if token.is_empty() || token.contains('@') || token.starts_with("*.") {
        return false;
    }
    if !has_label_suffix(token, domain) {
        return false;
    }
    if token.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    HOSTNAME_GRAMMAR
        .as_ref()
        .is_some_and(|grammar| grammar.is_match(token))
}

/// Normalize, validate and de-duplicate raw candidates.
///
/// Output is sorted ascending, so the same candidate multiset always yields the same
/// sequence regardless of input order. Running the output through again returns it
/// unchanged.
pub fn clean_and_dedupe<I, S>(candidates: I, domain: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let domain = domain.trim().trim_matches('.').to_lowercase();
    let canonical: BTreeSet<String> = candidates
        .into_iter()
        .flat_map(|candidate| normalize_candidate(candidate.as_ref()))
        .filter(|token| is_valid_hostname(token, &domain))
        .collect();
    canonical.into_iter().collect()
}
