//! Shared fakes for aggregator tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use subdomain_finder_sources::{PassiveSource, Result, SourceContext, SourceError};

/// What a [`FakeSource`] does when queried.
pub enum Behaviour {
    /// Answer with a fixed set.
    Fixed(Vec<&'static str>),
    /// Fail with a network error.
    Fail,
    /// Fail with a parse error (malformed payload).
    Malformed,
    /// Sleep, then answer with a fixed set.
    Slow(Duration, Vec<&'static str>),
    /// Report a missing API key.
    NoKey,
}

pub struct FakeSource {
    name: &'static str,
    behaviour: Behaviour,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name,
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }
}

pub fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[async_trait]
impl PassiveSource for FakeSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn query(&self, _ctx: &SourceContext<'_>) -> Result<HashSet<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Fixed(items) => Ok(set(items)),
            Behaviour::Fail => Err(SourceError::NetworkError {
                source_name: self.name.to_string(),
                detail: "connection reset by peer".to_string(),
            }),
            Behaviour::Malformed => Err(SourceError::ParseError {
                source_name: self.name.to_string(),
                detail: "expected array".to_string(),
            }),
            Behaviour::Slow(delay, items) => {
                tokio::time::sleep(*delay).await;
                Ok(set(items))
            }
            Behaviour::NoKey => Err(SourceError::MissingApiKey {
                source_name: self.name.to_string(),
            }),
        }
    }
}
