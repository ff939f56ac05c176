//! The bounded drain pass over configured jobs
//!
//! One invocation filters the configured jobs down to the eligible set,
//! then for each job discovers pending keep files and runs the
//! copy-then-acknowledge pair per item, strictly sequentially. An optional
//! wall-clock budget is checked after each completed pair — never
//! mid-transfer — and once exceeded the current job and all remaining jobs
//! are abandoned. Any remote failure aborts the whole run; items already
//! acknowledged stay acknowledged, everything else is rediscovered on the
//! next pass.

use crate::copy::{copy_dat_file, remove_keep_file};
use crate::keep_file::discover;
use crate::transport::RemoteTransport;
use datferry_common::types::{TransferJob, TransferTask};
use datferry_common::{FerryError, Result};
use std::time::{Duration, Instant};
use tracing::info;

/// Run parameters for one drain pass
#[derive(Debug, Clone, Default)]
pub struct DrainOptions {
    /// Only process jobs acquired on this scope host
    pub scope: Option<String>,

    /// Stop starting new items once this much wall-clock time has elapsed
    pub max_transfer: Option<Duration>,
}

/// Outcome of one drain pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of completed copy-and-acknowledge pairs
    pub transferred: usize,

    /// Wall-clock time spent in the pass
    pub elapsed: Duration,
}

/// Filter jobs down to the eligible set, logging each skip reason
///
/// A job is eligible only if it enables the copy task, defines cluster
/// root paths, has started acquiring, and matches the scope filter when
/// one is supplied. Skipped jobs are never queried via discovery.
pub fn select_jobs<'a>(jobs: &'a [TransferJob], scope: Option<&str>) -> Vec<&'a TransferJob> {
    jobs.iter().filter(|job| is_eligible(job, scope)).collect()
}

fn is_eligible(job: &TransferJob, scope: Option<&str>) -> bool {
    if !job.includes_task(TransferTask::CopyScopeDatToCluster) {
        info!(job = %job, "ignoring job: copy task not enabled");
        return false;
    }
    if job.cluster_root_paths.is_none() {
        info!(job = %job, "ignoring job: cluster_root_paths not defined");
        return false;
    }
    if !job.acquisition_started() {
        info!(job = %job, "ignoring job: acquisition has not started");
        return false;
    }
    if let Some(scope) = scope {
        if job.scope_data_set.host != scope {
            info!(job = %job, scope, "ignoring job: scope differs");
            return false;
        }
    }
    true
}

/// Run one drain pass over `jobs`
pub async fn drain(
    jobs: &[TransferJob],
    transport: &dyn RemoteTransport,
    options: &DrainOptions,
) -> Result<RunSummary> {
    let start = Instant::now();
    let eligible = select_jobs(jobs, options.scope.as_deref());

    let mut transferred = 0usize;

    'jobs: for job in eligible {
        info!(job = %job, "start processing");

        let raw_dat_root = match &job.cluster_root_paths {
            Some(paths) => paths.raw_dat.as_path(),
            // select_jobs already dropped jobs without cluster roots
            None => continue,
        };

        if !raw_dat_root.exists() {
            info!(raw_dat = %raw_dat_root.display(), "creating raw dat root");
            std::fs::create_dir_all(raw_dat_root)?;
        }
        if !raw_dat_root.is_dir() {
            return Err(FerryError::config(format!(
                "raw dat root {} is not a directory",
                raw_dat_root.display()
            )));
        }

        let keep_files = discover(
            transport,
            &job.scope_data_set.host,
            &job.scope_data_set.root_keep_path,
            &job.scope_data_set.data_set_id,
        )
        .await?;

        info!(
            job = %job,
            count = keep_files.len(),
            "found keep files"
        );
        if let (Some(first), Some(last)) = (keep_files.first(), keep_files.last()) {
            info!(
                first = %first.keep_path,
                last = %last.keep_path,
                "keep file range"
            );
        }

        for keep_file in &keep_files {
            info!(dat_path = %keep_file.dat_path, "copying");
            copy_dat_file(transport, keep_file, raw_dat_root).await?;

            info!(keep_path = %keep_file.keep_path, "removing keep file");
            remove_keep_file(transport, keep_file).await?;

            transferred += 1;

            if let Some(max) = options.max_transfer {
                if start.elapsed() > max {
                    info!(
                        elapsed_seconds = start.elapsed().as_secs(),
                        max_seconds = max.as_secs(),
                        "stopping: max transfer time exceeded"
                    );
                    break 'jobs;
                }
            }
        }
    }

    Ok(RunSummary {
        transferred,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use datferry_common::types::{ClusterRootPaths, ScopeDataSet};
    use std::path::PathBuf;

    fn copy_job(host: &str) -> TransferJob {
        TransferJob {
            scope_data_set: ScopeDataSet {
                host: host.to_string(),
                root_keep_path: PathBuf::from("/cygdrive/e/keep"),
                data_set_id: "X".to_string(),
                acquire_start: Some(Utc::now() - ChronoDuration::hours(1)),
                acquire_stop: None,
            },
            cluster_root_paths: Some(ClusterRootPaths {
                raw_dat: PathBuf::from("/nearline/ferry/X/dat"),
                archive: None,
            }),
            tasks: vec![TransferTask::CopyScopeDatToCluster],
        }
    }

    #[test]
    fn test_select_jobs_requires_copy_task() {
        let mut job = copy_job("scope1");
        job.tasks = vec![TransferTask::ArchiveDatToHdf5];
        assert!(select_jobs(&[job], None).is_empty());
    }

    #[test]
    fn test_select_jobs_requires_cluster_roots() {
        let mut job = copy_job("scope1");
        job.cluster_root_paths = None;
        assert!(select_jobs(&[job], None).is_empty());
    }

    #[test]
    fn test_select_jobs_requires_started_acquisition() {
        let mut job = copy_job("scope1");
        job.scope_data_set.acquire_start = Some(Utc::now() + ChronoDuration::days(1));
        assert!(select_jobs(std::slice::from_ref(&job), None).is_empty());

        job.scope_data_set.acquire_start = None;
        assert!(select_jobs(&[job], None).is_empty());
    }

    #[test]
    fn test_select_jobs_applies_scope_filter() {
        let jobs = vec![copy_job("scope1"), copy_job("scope2")];

        let selected = select_jobs(&jobs, Some("scope2"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].scope_data_set.host, "scope2");

        assert_eq!(select_jobs(&jobs, None).len(), 2);
    }
}
