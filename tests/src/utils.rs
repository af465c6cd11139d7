use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proxysift_core::error::{ProbeError, PublishError, SourceError};
use proxysift_core::pipeline::PipelineSettings;
use proxysift_core::probe::{ProbeClient, ProbeRequest};
use proxysift_core::publish::ResultPublisher;
use proxysift_core::scheduler::ProbeSettings;
use proxysift_core::source::SourceFetcher;

/// Serves fixed bodies by location. Unknown locations fail with 503.
pub struct StaticFetcher(HashMap<String, String>);

impl StaticFetcher {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(location, body)| (location.to_string(), body.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        self.0.get(location).cloned().ok_or_else(|| SourceError::Status {
            location: location.to_string(),
            status: 503,
        })
    }
}

/// Passes exactly the listed hosts and tracks concurrency.
#[derive(Default)]
pub struct AllowListProbe {
    allowed: HashSet<String>,
    delay: Duration,
    running: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl AllowListProbe {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|h| h.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ProbeClient for AllowListProbe {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool, ProbeError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(self.allowed.contains(&request.host))
    }
}

/// Waits out the request timeout and reports it, like an unresponsive endpoint.
pub struct TimeoutProbe;

#[async_trait]
impl ProbeClient for TimeoutProbe {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool, ProbeError> {
        tokio::time::sleep(request.timeout).await;
        Err(ProbeError::Timeout(request.timeout))
    }
}

/// Records every write and publish call.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub writes: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
    pub publishes: Arc<AtomicUsize>,
}

impl RecordingPublisher {
    pub fn written(&self) -> Vec<Vec<String>> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, lines)| lines.clone())
            .collect()
    }
}

#[async_trait]
impl ResultPublisher for RecordingPublisher {
    async fn write(&self, path: &Path, lines: &[String]) -> Result<(), PublishError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), lines.to_vec()));
        Ok(())
    }

    async fn publish(&self, _path: &Path) -> Result<(), PublishError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn settings(sources: &[&str], concurrency: usize, timeout: Duration) -> PipelineSettings {
    PipelineSettings {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        output_path: PathBuf::from("pyip.txt"),
        concurrency,
        probe: ProbeSettings::new(
            "https://cf-clearance.pages.dev".to_string(),
            443,
            timeout,
            false,
        ),
    }
}
