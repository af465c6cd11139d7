use colored::*;
use proxysift_common::log::SUCCESS_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use super::print::PRINT_TARGET;

pub struct ProxysiftFormatter;

impl<S, N> FormatEvent<S, N> for ProxysiftFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        // raw terminal output, no prefix
        if meta.target() == PRINT_TARGET {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match (*meta.level(), meta.target() == SUCCESS_TARGET) {
                (Level::INFO, true) => ("[✓]", |s| s.bright_green().bold()),
                (Level::TRACE, _) => ("[ ]", |s| s.dimmed()),
                (Level::DEBUG, _) => ("[?]", |s| s.blue()),
                (Level::INFO, _) => ("[+]", |s| s.green().bold()),
                (Level::WARN, _) => ("[*]", |s| s.yellow().bold()),
                (Level::ERROR, _) => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Default directives for a verbosity level. `RUST_LOG` replaces them entirely.
fn directives(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    format!("warn,proxysift={level},{PRINT_TARGET}=info,{SUCCESS_TARGET}=info")
}

/// Installs the global subscriber. Log lines go through the progress bar
/// writer so they never tear an active bar.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbose, quiet)));

    let indicatif_layer = IndicatifLayer::new();
    let fmt_layer = fmt::layer()
        .event_format(ProxysiftFormatter)
        .with_writer(indicatif_layer.get_stderr_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxysift_common::success;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::Context;

    struct Counter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for Counter {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of events `emit` gets past the filter for the given verbosity.
    fn passed_filter(verbose: u8, quiet: bool, emit: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(directives(verbose, quiet)))
            .with(Counter(count.clone()));
        tracing::subscriber::with_default(subscriber, emit);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_verbosity_directives() {
        assert!(directives(0, false).contains("proxysift=info"));
        assert!(directives(1, false).contains("proxysift=debug"));
        assert!(directives(3, false).contains("proxysift=trace"));
        assert!(directives(0, true).contains("proxysift=warn"));
    }

    #[test]
    fn test_quiet_keeps_success_and_terminal_output() {
        assert_eq!(passed_filter(0, true, || success!("3 of 5 endpoints passed")), 1);
        assert_eq!(passed_filter(0, true, || tracing::info!(target: PRINT_TARGET, "line")), 1);
        assert_eq!(passed_filter(0, true, || tracing::warn!(target: "proxysift_core::pipeline", "skipped")), 1);
        assert_eq!(passed_filter(0, true, || tracing::info!(target: "proxysift_core::pipeline", "fetched")), 0);
    }

    #[test]
    fn test_default_level_hides_debug() {
        assert_eq!(passed_filter(0, false, || tracing::info!(target: "proxysift_core::pipeline", "fetched")), 1);
        assert_eq!(passed_filter(0, false, || tracing::debug!(target: "proxysift_core::pipeline", "detail")), 0);
        assert_eq!(passed_filter(1, false, || tracing::debug!(target: "proxysift_core::pipeline", "detail")), 1);
    }
}
