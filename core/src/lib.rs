//! # proxysift core
//!
//! The validation engine. [`pipeline::Pipeline`] drives a run: sources are
//! fetched through a [`source::SourceFetcher`], every unique candidate is
//! probed through a [`probe::ProbeClient`] by the bounded [`scheduler`], and
//! the passing hosts go to a [`publish::ResultPublisher`].

pub mod error;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod publish;
pub mod scheduler;
pub mod source;
