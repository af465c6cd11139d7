//! Persisting the result list.
//!
//! [`ResultPublisher::write`] always produces the output file. `publish` is an
//! optional second step (e.g. pushing the file to a repository); its failure
//! leaves the written file in place.

use std::path::Path;

use async_trait::async_trait;
use proxysift_common::config::PublishConfig;

use crate::error::PublishError;

mod git;

pub use git::GitPublisher;

#[async_trait]
pub trait ResultPublisher: Send + Sync {
    /// Writes one host per line, `\n`-joined, without a trailing newline.
    async fn write(&self, path: &Path, lines: &[String]) -> Result<(), PublishError>;

    async fn publish(&self, _path: &Path) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Plain file output. Publishing is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileWriter;

#[async_trait]
impl ResultPublisher for FileWriter {
    async fn write(&self, path: &Path, lines: &[String]) -> Result<(), PublishError> {
        tokio::fs::write(path, lines.join("\n"))
            .await
            .map_err(|source| PublishError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

pub fn from_config(cfg: &PublishConfig) -> Box<dyn ResultPublisher> {
    if cfg.enabled {
        Box::new(GitPublisher::new(cfg.clone()))
    } else {
        Box::new(FileWriter)
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
