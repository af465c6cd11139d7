use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use proxysift_common::config::PublishConfig;
use tokio::process::Command;
use tracing::{debug, info};

use super::{FileWriter, ResultPublisher};
use crate::error::PublishError;

/// Writes the file, then commits and pushes it with the configured identity.
pub struct GitPublisher {
    writer: FileWriter,
    cfg: PublishConfig,
    workdir: PathBuf,
}

impl GitPublisher {
    pub fn new(cfg: PublishConfig) -> Self {
        Self {
            writer: FileWriter,
            cfg,
            workdir: PathBuf::from("."),
        }
    }

    /// Runs git inside `workdir` instead of the current directory.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    async fn git(&self, args: &[&str]) -> Result<Output, PublishError> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, "running");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| PublishError::Spawn { command, source })
    }

    async fn git_checked(&self, args: &[&str]) -> Result<(), PublishError> {
        let output = self.git(args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(PublishError::Command {
            command: format!("git {}", args.join(" ")),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// `git diff --cached --quiet` exits non-zero when something is staged.
    async fn has_staged_changes(&self) -> Result<bool, PublishError> {
        let output = self.git(&["diff", "--cached", "--quiet"]).await?;
        Ok(!output.status.success())
    }
}

#[async_trait]
impl ResultPublisher for GitPublisher {
    async fn write(&self, path: &Path, lines: &[String]) -> Result<(), PublishError> {
        self.writer.write(path, lines).await
    }

    async fn publish(&self, path: &Path) -> Result<(), PublishError> {
        let path = path.to_string_lossy();

        self.git_checked(&["config", "--local", "user.email", &self.cfg.author_email])
            .await?;
        self.git_checked(&["config", "--local", "user.name", &self.cfg.author_name])
            .await?;
        self.git_checked(&["add", &path]).await?;

        if !self.has_staged_changes().await? {
            info!("{path} unchanged, nothing to publish");
            return Ok(());
        }

        self.git_checked(&["commit", "-m", &self.cfg.commit_message]).await?;
        self.git_checked(&["push"]).await?;
        Ok(())
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
