use std::sync::Arc;

use console::Term;
use indicatif::ProgressStyle;
use proxysift_core::progress::{ProgressCallback, ProgressReport};
use tracing::{Span, info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const BAR_TEMPLATE: &str = "{spinner:.blue} [{bar:40.green/bright_black}] {pos}/{len} {msg}";

/// Whether a progress bar can be drawn: stderr must be an interactive terminal.
pub fn is_attended() -> bool {
    Term::stderr().features().is_attended()
}

/// Span that owns the run's progress bar. Without a terminal the span carries
/// no bar and progress is logged instead.
pub fn probing_span(attended: bool) -> anyhow::Result<Span> {
    if !attended {
        return Ok(info_span!("probing"));
    }

    let span = info_span!("probing", indicatif.pb_show = true);
    span.pb_set_style(&ProgressStyle::with_template(BAR_TEMPLATE)?.progress_chars("█▓░"));
    span.pb_set_message("valid: 0");
    Ok(span)
}

fn bar_message(report: &ProgressReport) -> String {
    format!("{}% | valid: {}", report.percent, report.valid)
}

/// Turns per-probe reports into bar updates or log lines.
pub fn reporter(span: &Span, attended: bool) -> ProgressCallback {
    if !attended {
        return Arc::new(|report: ProgressReport| info!("{report}"));
    }

    let span = span.clone();
    Arc::new(move |report: ProgressReport| {
        span.pb_set_length(report.total as u64);
        span.pb_inc(1);
        span.pb_set_message(&bar_message(&report));
    })
}
