//! DNSDumpster: fetch the search form, replay its CSRF token, scrape the result page.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::scrape_hostnames;
use crate::error::{Result, SourceError};
use crate::http_client::HttpUtils;
use crate::traits::{PassiveSource, SourceContext};

const NAME: &str = "dnsdumpster";
const DEFAULT_BASE_URL: &str = "https://dnsdumpster.com/";

static CSRF_INPUT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"name=["']csrfmiddlewaretoken["']\s+value=["']([^"']+)["']"#).ok()
});

/// Two-request source: GET for the token, POST for the results.
pub struct DnsDumpsterSource {
    base_url: String,
}

impl DnsDumpsterSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the source at another host (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for DnsDumpsterSource {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_csrf_token(html: &str) -> Result<String> {
    CSRF_INPUT
        .as_ref()
        .and_then(|re| re.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SourceError::ParseError {
            source_name: NAME.to_string(),
            detail: "csrfmiddlewaretoken not found in search form".to_string(),
        })
}

#[async_trait]
impl PassiveSource for DnsDumpsterSource {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn query(&self, ctx: &SourceContext<'_>) -> Result<HashSet<String>> {
        let form_page =
            HttpUtils::fetch_text(ctx.client.get(&self.base_url), NAME, "GET search form").await?;
        let token = extract_csrf_token(&form_page)?;

        let request = ctx
            .client
            .post(&self.base_url)
            .header("Referer", &self.base_url)
            .header("Cookie", format!("csrftoken={token}"))
            .form(&[("csrfmiddlewaretoken", token.as_str()), ("targetip", ctx.domain)]);
        let results_page = HttpUtils::fetch_text(request, NAME, "POST search").await?;

        scrape_hostnames(&results_page, ctx.domain, NAME)
    }
}
