//! Datferry Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the datferry project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all datferry
//! workspace members:
//!
//! - **Error Handling**: the [`FerryError`] taxonomy and [`Result`] alias
//! - **Logging**: `tracing` subscriber setup shared by all binaries
//! - **Types**: transfer-job configuration models
//!
//! # Example
//!
//! ```no_run
//! use datferry_common::{Result, types::load_transfer_jobs};
//!
//! fn pending_jobs() -> Result<usize> {
//!     let jobs = load_transfer_jobs(std::path::Path::new("/groups/ferry/config"))?;
//!     Ok(jobs.len())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{FerryError, Result};
