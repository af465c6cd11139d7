//! # Validation Pipeline
//!
//! Implements the one use case of the tool: collect candidate endpoints from
//! every source, probe them under a concurrency limit and persist the hosts
//! that passed.
//!
//! The pipeline depends on its collaborators only through traits
//! ([`SourceFetcher`], [`ProbeClient`], [`ResultPublisher`]), so tests and the
//! binary wire in different implementations.
//!
//! Nothing in a run is fatal. A failed source contributes nothing, a faulting
//! probe is counted as errored and write/publish failures are reported in the
//! [`RunSummary`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use proxysift_common::config::Config;
use proxysift_common::network::candidate::CandidateSet;
use proxysift_common::network::parser;
use proxysift_common::success;
use tracing::{debug, error, info, warn};

use crate::error::PublishError;
use crate::probe::{self, ProbeClient};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::publish::{self, ResultPublisher};
use crate::scheduler::{self, ProbeOutcome, ProbeSettings, ProbeTask};
use crate::source::{HttpSourceFetcher, SourceFetcher};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sources: Vec<String>,
    pub output_path: PathBuf,
    pub concurrency: usize,
    pub probe: ProbeSettings,
}

impl PipelineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            sources: cfg.source_locations(),
            output_path: cfg.output_path.clone(),
            concurrency: cfg.concurrency,
            probe: ProbeSettings::new(
                cfg.target_url.clone(),
                cfg.default_port,
                cfg.probe_timeout(),
                cfg.debug,
            ),
        }
    }
}

/// What a run did. Returned even when writing or publishing failed.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    /// Unique candidates after merging every source.
    pub candidates: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    /// Hosts that passed, in the order their probes finished.
    pub results: Vec<String>,
    pub elapsed: Duration,
    pub write_error: Option<PublishError>,
    pub publish_error: Option<PublishError>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.sources_failed == 0 && self.write_error.is_none() && self.publish_error.is_none()
    }
}

pub struct Pipeline {
    settings: PipelineSettings,
    fetcher: Box<dyn SourceFetcher>,
    probe: Arc<dyn ProbeClient>,
    publisher: Box<dyn ResultPublisher>,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        fetcher: Box<dyn SourceFetcher>,
        probe: Arc<dyn ProbeClient>,
        publisher: Box<dyn ResultPublisher>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            probe,
            publisher,
        }
    }

    /// Wires the production collaborators selected by `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            PipelineSettings::from_config(cfg),
            Box::new(HttpSourceFetcher::new(cfg.source_timeout())),
            probe::from_config(cfg),
            publish::from_config(&cfg.publish),
        )
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Fetches every source in order and merges what parses.
    ///
    /// Returns the merged set and the number of sources that failed.
    pub async fn collect_candidates(&self) -> (CandidateSet, usize) {
        let mut candidates = CandidateSet::new();
        let mut failed: usize = 0;

        for location in &self.settings.sources {
            match self.fetcher.fetch(location).await {
                Ok(body) => {
                    let before = candidates.len();
                    let mut accepted: usize = 0;
                    candidates.extend(parser::parse(&body).inspect(|_| accepted += 1));
                    info!(
                        "Fetched {location}: {accepted} candidates, {} new",
                        candidates.len() - before
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!("Skipping source: {e}");
                }
            }
        }

        (candidates, failed)
    }

    /// Runs the whole pipeline once.
    ///
    /// `on_progress` receives one report per finished probe.
    pub async fn run(&self, on_progress: Option<ProgressCallback>) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary {
            sources_attempted: self.settings.sources.len(),
            ..RunSummary::default()
        };

        let (candidates, sources_failed) = self.collect_candidates().await;
        summary.sources_failed = sources_failed;
        summary.candidates = candidates.len();
        info!("{} unique candidates to probe", candidates.len());

        let tracker = Arc::new(ProgressTracker::new());
        tracker.init(candidates.len());

        let settings = Arc::new(self.settings.probe.clone());
        let tasks: Vec<ProbeTask> = candidates
            .into_iter()
            .map(|c| ProbeTask::new(c, self.probe.clone(), settings.clone()))
            .collect();

        let outcomes = scheduler::run(tasks, self.settings.concurrency, tracker, on_progress).await;
        for outcome in outcomes {
            match outcome {
                ProbeOutcome::Passed(host) => summary.results.push(host),
                ProbeOutcome::Failed => summary.failed += 1,
                ProbeOutcome::Errored => summary.errored += 1,
            }
        }
        summary.passed = summary.results.len();
        debug!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            "probing finished"
        );
        success!("{} of {} endpoints passed", summary.passed, summary.candidates);

        self.persist(&mut summary).await;
        summary.elapsed = started.elapsed();
        summary
    }

    async fn persist(&self, summary: &mut RunSummary) {
        let path = self.settings.output_path.as_path();

        if let Err(e) = self.publisher.write(path, &summary.results).await {
            error!("{e}");
            summary.write_error = Some(e);
            return;
        }
        success!("Results written to {}", path.display());

        match self.publisher.publish(path).await {
            Ok(()) => debug!("publish step finished"),
            Err(e) => {
                error!("Publishing failed: {e}");
                summary.publish_error = Some(e);
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
