//! Datferry Copy Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Marker-driven transfer of raw dat files from acquisition scopes to
//! cluster storage.
//!
//! A scope signals that a dat file is fully written by dropping a "keep"
//! sentinel next to it. This crate treats the keep files on a scope as a
//! work queue: it discovers them over ssh, copies each referenced dat file
//! into an hourly-bucketed directory on the cluster, then deletes the
//! sentinel as the acknowledgment. Deleting the sentinel is the only
//! persisted state transition, so a crash anywhere before the delete just
//! means the same file is rediscovered and re-copied on the next pass.
//!
//! # Example
//!
//! ```no_run
//! use datferry_copy::drain::{drain, DrainOptions};
//! use datferry_copy::transport::SshTransport;
//! use datferry_common::types::load_transfer_jobs;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let jobs = load_transfer_jobs(std::path::Path::new("/groups/ferry/config"))?;
//!     let transport = SshTransport::new();
//!     let summary = drain(&jobs, &transport, &DrainOptions::default()).await?;
//!     tracing::info!(transferred = summary.transferred, "pass complete");
//!     Ok(())
//! }
//! ```

pub mod copy;
pub mod dat_path;
pub mod drain;
pub mod keep_file;
pub mod transport;
