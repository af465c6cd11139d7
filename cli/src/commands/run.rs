use proxysift_common::config::Config;
use proxysift_core::pipeline::Pipeline;
use tracing::{Instrument, debug, warn};

use crate::terminal::{print, progress};

pub async fn run(cfg: Config, quiet: bool) -> anyhow::Result<()> {
    debug!(?cfg, "configuration loaded");
    print::header("collecting candidates", quiet);

    let pipeline = Pipeline::from_config(&cfg);
    let attended: bool = progress::is_attended();
    let span = progress::probing_span(attended)?;
    let reporter = progress::reporter(&span, attended);

    let summary = pipeline.run(Some(reporter)).instrument(span).await;

    if summary.passed == 0 {
        warn!("No endpoint passed the check");
    }
    print::summary(&summary, &cfg.output_path.display().to_string(), quiet);

    // Write and publish failures are already logged and do not change the exit code.
    Ok(())
}
