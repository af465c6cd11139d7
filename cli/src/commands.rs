pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use proxysift_common::config::{Config, ProbeBackend};

#[derive(Parser, Debug)]
#[command(name = "proxysift")]
#[command(version, about = "Collects candidate proxy endpoints and keeps the ones that load a page unchallenged.")]
pub struct CommandLine {
    /// Configuration file (defaults to ./proxysift.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Candidate source, URL or local path (repeatable, replaces configured sources)
    #[arg(short, long = "source", value_name = "LOCATION")]
    pub sources: Vec<String>,

    /// Page loaded through every candidate
    #[arg(long, value_name = "URL")]
    pub target_url: Option<String>,

    /// Port for candidates without one
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Where the passing hosts are written
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of probes in flight
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-probe timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Log per-probe details
    #[arg(long)]
    pub debug: bool,

    /// How candidates are probed
    #[arg(long, value_enum)]
    pub probe: Option<ProbeArg>,

    /// Browser executable for the browser probe
    #[arg(long, value_name = "PATH")]
    pub browser: Option<PathBuf>,

    /// Commit and push the output file after writing it
    #[arg(long)]
    pub publish: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeArg {
    Http,
    Browser,
}

impl From<ProbeArg> for ProbeBackend {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::Http => ProbeBackend::Http,
            ProbeArg::Browser => ProbeBackend::Browser,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Loads the file and environment layers, applies the flags on top and validates.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut cfg = Config::load(self.config.as_deref()).context("could not load configuration")?;
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut Config) {
        if !self.sources.is_empty() {
            cfg.sources = self.sources.clone();
        }
        if let Some(url) = &self.target_url {
            cfg.target_url = url.clone();
        }
        if let Some(port) = self.port {
            cfg.default_port = port;
        }
        if let Some(output) = &self.output {
            cfg.output_path = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            cfg.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            cfg.timeout_ms = timeout_ms;
        }
        if let Some(probe) = self.probe {
            cfg.probe.backend = probe.into();
        }
        if let Some(browser) = &self.browser {
            cfg.probe.browser_path = browser.clone();
        }
        cfg.debug |= self.debug;
        cfg.publish.enabled |= self.publish;
    }
}
