//! Error taxonomy of a validation run.
//!
//! None of these abort a run. Source and probe errors shrink the result set,
//! publish errors are reported in the [`RunSummary`](crate::pipeline::RunSummary).
//! Configuration errors live in `proxysift_common::config` and are raised
//! before a run starts.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// A single source could not be fetched or read.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error fetching {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} answered with status {status}")]
    Status { location: String, status: u16 },

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

/// The probe itself faulted, as opposed to the endpoint failing the check.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("port of {candidate} is not a valid TCP port")]
    InvalidPort { candidate: String },

    #[error("failed to build proxied client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request through proxy failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to launch browser: {0}")]
    Spawn(#[source] io::Error),

    #[error("browser exited with {0}")]
    BrowserExit(ExitStatus),

    #[error("probe task panicked")]
    Panicked,
}

/// Persisting or publishing the result list failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}
