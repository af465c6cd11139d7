//! The probe collaborator.
//!
//! A [`ProbeClient`] routes a request for the verification page through one
//! candidate endpoint and decides whether the endpoint passes. Implementations
//! must enforce `request.timeout` themselves and release whatever they acquire
//! (client, child process) on every exit path, including the timeout.
//!
//! The result is tri-state from the caller's point of view:
//! * `Ok(true)`: the page loaded and showed no challenge.
//! * `Ok(false)`: the endpoint answered but was challenged or refused.
//! * `Err(_)`: the probe itself faulted (timeout, connect failure, spawn failure).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proxysift_common::config::{Config, ProbeBackend};

use crate::error::ProbeError;

mod browser;
mod http;

pub use browser::BrowserProbe;
pub use http::HttpProbe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub host: String,
    pub port: u16,
    pub target_url: String,
    pub timeout: Duration,
    pub debug: bool,
}

impl ProbeRequest {
    /// `host:port`, as handed to proxy settings.
    pub fn proxy_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool, ProbeError>;
}

/// Builds the probe selected by `probe.backend`.
pub fn from_config(cfg: &Config) -> Arc<dyn ProbeClient> {
    let probe = &cfg.probe;
    match probe.backend {
        ProbeBackend::Http => Arc::new(HttpProbe::new(
            probe.challenge_marker.clone(),
            probe.user_agent.clone(),
        )),
        ProbeBackend::Browser => Arc::new(BrowserProbe::new(
            probe.browser_path.clone(),
            probe.challenge_marker.clone(),
            probe.user_agent.clone(),
        )),
    }
}

/// Whether a loaded page shows no challenge.
pub(crate) fn page_passes(content: &str, challenge_marker: &str) -> bool {
    !content.contains(challenge_marker)
}
