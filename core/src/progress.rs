//! Run progress counters.
//!
//! A [`ProgressTracker`] is created per run and shared by every probe task.
//! Counters only grow and are updated with atomic increments, so no
//! completion is lost or counted twice whatever the interleaving.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives one report per finished probe. Called from worker tasks.
pub type ProgressCallback = Arc<dyn Fn(ProgressReport) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub processed: usize,
    pub total: usize,
    /// `round(100 * processed / total)`, or 0 for an empty run.
    pub percent: u8,
    pub valid: usize,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "progress: {}/{} | {}% | valid: {}",
            self.processed, self.total, self.percent, self.valid
        )
    }
}

#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: AtomicUsize,
    processed: AtomicUsize,
    valid: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the counters for a run of `total` probes. Call before the first probe starts.
    pub fn init(&self, total: usize) {
        self.processed.store(0, Ordering::SeqCst);
        self.valid.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Records one finished probe.
    pub fn record(&self, passed: bool) {
        // processed is bumped first so a concurrent report never sees valid > processed
        self.processed.fetch_add(1, Ordering::SeqCst);
        if passed {
            self.valid.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn report(&self) -> ProgressReport {
        let valid = self.valid.load(Ordering::SeqCst);
        let processed = self.processed.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);

        ProgressReport {
            processed,
            total,
            percent: percent(processed, total),
            valid,
        }
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * processed as f64 / total as f64).round();
    pct.clamp(0.0, u8::MAX as f64) as u8
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
