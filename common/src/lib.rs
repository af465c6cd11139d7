//! # proxysift common
//!
//! Types shared by every crate in the workspace:
//!
//! * **[`network`]**: the endpoint model ([`network::candidate::Candidate`],
//!   [`network::candidate::CandidateSet`]) and the line parser that extracts
//!   candidates from untrusted source text.
//! * **[`config`]**: the run configuration, its layered loading and validation.
//! * **[`log`]**: logging macros on top of `tracing`.

pub mod config;
pub mod log;
pub mod network;
