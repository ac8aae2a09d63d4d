//! RapidDNS subdomain listing (HTML page).

use std::borrow::Cow;
use std::collections::HashSet;

use super::{SourceDescriptor, scrape_hostnames};
use crate::error::Result;

const NAME: &str = "rapiddns";

pub(super) fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME,
        url_template: Cow::Borrowed("https://rapiddns.io/subdomain/{domain}?full=1&down=1"),
        parse,
    }
}

fn parse(body: &str, domain: &str) -> Result<HashSet<String>> {
    scrape_hostnames(body, domain, NAME)
}
