//! Bounded-concurrency execution of probe tasks.
//!
//! Tasks are dispatched in successive batches of at most `limit`. Every task of
//! a batch runs in parallel and the next batch starts only once the whole batch
//! has finished, so at no instant are more than `limit` probes running. A slow
//! probe delays its batch; it is never cancelled by the scheduler other than
//! through its own deadline.
//!
//! Outcomes come back in completion order, one per task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use proxysift_common::network::candidate::Candidate;
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, trace, warn};

use crate::error::ProbeError;
use crate::probe::{ProbeClient, ProbeRequest};
use crate::progress::{ProgressCallback, ProgressTracker};

/// Extra time granted on top of the probe timeout before the scheduler gives up on a probe.
pub const DEFAULT_DEADLINE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint passed; carries its host without the port.
    Passed(String),
    /// The endpoint was reached but did not pass.
    Failed,
    /// The probe faulted: timeout, connection error, bad port or panic.
    Errored,
}

impl ProbeOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ProbeOutcome::Passed(_))
    }

    /// Collapses the outcome to the host string on pass.
    pub fn into_host(self) -> Option<String> {
        match self {
            ProbeOutcome::Passed(host) => Some(host),
            ProbeOutcome::Failed | ProbeOutcome::Errored => None,
        }
    }
}

/// Settings shared by every probe of a run.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub target_url: String,
    pub default_port: u16,
    pub timeout: Duration,
    pub debug: bool,
    pub deadline_grace: Duration,
}

impl ProbeSettings {
    pub fn new(target_url: String, default_port: u16, timeout: Duration, debug: bool) -> Self {
        Self {
            target_url,
            default_port,
            timeout,
            debug,
            deadline_grace: DEFAULT_DEADLINE_GRACE,
        }
    }
}

/// One candidate bound to the probe. Nothing happens until it is executed.
pub struct ProbeTask {
    candidate: Candidate,
    probe: Arc<dyn ProbeClient>,
    settings: Arc<ProbeSettings>,
}

impl ProbeTask {
    pub fn new(candidate: Candidate, probe: Arc<dyn ProbeClient>, settings: Arc<ProbeSettings>) -> Self {
        Self {
            candidate,
            probe,
            settings,
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    async fn execute(self) -> ProbeOutcome {
        let host: String = self.candidate.host().to_string();
        let Ok(port) = self.candidate.port_or(self.settings.default_port) else {
            let err = ProbeError::InvalidPort {
                candidate: self.candidate.to_string(),
            };
            debug!(candidate = %self.candidate, "{err}");
            return ProbeOutcome::Errored;
        };

        let request = ProbeRequest {
            host,
            port,
            target_url: self.settings.target_url.clone(),
            timeout: self.settings.timeout,
            debug: self.settings.debug,
        };

        let deadline: Duration = self.settings.timeout + self.settings.deadline_grace;
        let result = match timeout(deadline, self.probe.probe(&request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ProbeError::Timeout(deadline)),
        };

        match result {
            Ok(true) => {
                trace!(candidate = %self.candidate, "passed");
                ProbeOutcome::Passed(request.host)
            }
            Ok(false) => {
                trace!(candidate = %self.candidate, "failed");
                ProbeOutcome::Failed
            }
            Err(err) => {
                debug!(candidate = %self.candidate, "probe error: {err}");
                ProbeOutcome::Errored
            }
        }
    }
}

/// Runs every task, at most `limit` at a time, and returns one outcome per task.
///
/// Every finished task, aborted ones included, is recorded once in `tracker`
/// and, when given, its fresh report goes to `on_progress`. A `limit` of 0 is treated as 1.
pub async fn run(
    tasks: Vec<ProbeTask>,
    limit: usize,
    tracker: Arc<ProgressTracker>,
    on_progress: Option<ProgressCallback>,
) -> Vec<ProbeOutcome> {
    let limit: usize = limit.max(1);
    let total: usize = tasks.len();
    let mut outcomes: Vec<ProbeOutcome> = Vec::with_capacity(total);
    let mut pending = tasks.into_iter().peekable();
    let mut batch_no: usize = 0;

    while pending.peek().is_some() {
        batch_no += 1;
        let mut batch: JoinSet<ProbeOutcome> = JoinSet::new();

        for task in pending.by_ref().take(limit) {
            batch.spawn(async move {
                let candidate: String = task.candidate().to_string();
                AssertUnwindSafe(task.execute())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!(%candidate, "{}", ProbeError::Panicked);
                        ProbeOutcome::Errored
                    })
            });
        }

        trace!(batch = batch_no, size = batch.len(), "batch dispatched");
        while let Some(joined) = batch.join_next().await {
            outcomes.push(settle(joined, &tracker, on_progress.as_ref()));
        }
    }

    debug!(tasks = total, batches = batch_no, "all probe batches finished");
    outcomes
}

/// Records one finished task and emits its report. A task that never
/// produced an outcome still counts as processed.
fn settle(
    joined: Result<ProbeOutcome, JoinError>,
    tracker: &ProgressTracker,
    on_progress: Option<&ProgressCallback>,
) -> ProbeOutcome {
    let outcome = joined.unwrap_or_else(|e| {
        error!("probe task aborted: {e}");
        ProbeOutcome::Errored
    });

    tracker.record(outcome.is_passed());
    if let Some(callback) = on_progress {
        callback(tracker.report());
    }
    outcome
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
