//! Probe that drives a headless Chromium-family browser through the candidate.
//!
//! The browser runs as a child process with `--dump-dom` and is spawned with
//! `kill_on_drop`, so it is reaped whether the probe finishes, fails or hits
//! its timeout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeClient, ProbeRequest, page_passes};
use crate::error::ProbeError;

/// Body class of Chromium's built-in network error page.
const NET_ERROR_MARKER: &str = "neterror";

pub struct BrowserProbe {
    browser_path: PathBuf,
    challenge_marker: String,
    user_agent: String,
}

impl BrowserProbe {
    pub fn new(browser_path: PathBuf, challenge_marker: String, user_agent: String) -> Self {
        Self {
            browser_path,
            challenge_marker,
            user_agent,
        }
    }

    fn command(&self, request: &ProbeRequest) -> Command {
        let mut command = Command::new(&self.browser_path);
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--proxy-server={}", request.proxy_addr()))
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--dump-dom")
            .arg(&request.target_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if request.debug {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ProbeClient for BrowserProbe {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool, ProbeError> {
        let child = self.command(request).spawn().map_err(ProbeError::Spawn)?;

        // On timeout the pending future, and the child with it, is dropped and killed.
        let output = match timeout(request.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(ProbeError::Spawn)?,
            Err(_elapsed) => return Err(ProbeError::Timeout(request.timeout)),
        };

        if !output.status.success() {
            return Err(ProbeError::BrowserExit(output.status));
        }

        let dom = String::from_utf8_lossy(&output.stdout);
        let passed = !dom.trim().is_empty()
            && !dom.contains(NET_ERROR_MARKER)
            && page_passes(&dom, &self.challenge_marker);

        if request.debug {
            debug!(
                endpoint = %request.proxy_addr(),
                bytes = dom.len(),
                passed,
                "browser dumped page"
            );
        }
        Ok(passed)
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
