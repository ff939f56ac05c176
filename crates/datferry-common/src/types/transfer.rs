//! Transfer-job configuration documents
//!
//! One [`TransferJob`] describes a single volume being acquired on a scope:
//! where its keep files live, which dataset they belong to, where on the
//! cluster the raw data lands, and which pipeline tasks are enabled for it.
//! Jobs are read-only configuration; the copy pass never mutates them.

use crate::error::{FerryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline responsibilities a job can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferTask {
    /// Copy raw dat files from the scope to cluster storage
    CopyScopeDatToCluster,
    /// Convert copied dat files into HDF5 archives (downstream tooling)
    ArchiveDatToHdf5,
    /// Generate alignment mipmaps from archives (downstream tooling)
    GenerateMipmaps,
}

/// The scope-side half of a job: where acquisition happens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDataSet {
    /// Remote acquisition host (e.g. "jeiss8.int.example.org")
    pub host: String,

    /// Remote directory containing keep files for this volume
    pub root_keep_path: PathBuf,

    /// Dataset identifier encoded in source file names
    pub data_set_id: String,

    /// When acquisition began; unset means it has not started
    #[serde(default)]
    pub acquire_start: Option<DateTime<Utc>>,

    /// When acquisition finished; unset while still running
    #[serde(default)]
    pub acquire_stop: Option<DateTime<Utc>>,
}

/// Cluster-side storage roots for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRootPaths {
    /// Root directory for copied raw dat files
    pub raw_dat: PathBuf,

    /// Root directory for converted archives (downstream tooling)
    #[serde(default)]
    pub archive: Option<PathBuf>,
}

/// One configured transfer job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    pub scope_data_set: ScopeDataSet,

    /// Unset when the job only covers scope-local tasks
    #[serde(default)]
    pub cluster_root_paths: Option<ClusterRootPaths>,

    /// Enabled responsibilities for this job
    #[serde(default)]
    pub tasks: Vec<TransferTask>,
}

impl TransferJob {
    /// Whether this job enables the given task
    pub fn includes_task(&self, task: TransferTask) -> bool {
        self.tasks.contains(&task)
    }

    /// Whether acquisition has begun (start time defined and in the past)
    pub fn acquisition_started(&self) -> bool {
        match self.scope_data_set.acquire_start {
            Some(start) => start <= Utc::now(),
            None => false,
        }
    }
}

impl std::fmt::Display for TransferJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            self.scope_data_set.data_set_id, self.scope_data_set.host
        )
    }
}

/// Load all `transfer*.json` job documents from `dir`, in file-name order
///
/// File-name order keeps the processing sequence stable across runs.
/// Fails with a configuration error when `dir` is missing or not a
/// directory, and with a serialization error when a document is malformed.
pub fn load_transfer_jobs(dir: &Path) -> Result<Vec<TransferJob>> {
    if !dir.is_dir() {
        return Err(FerryError::config(format!(
            "transfer dir {} is not a directory",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            name.starts_with("transfer") && name.ends_with(".json")
        })
        .collect();
    paths.sort();

    let mut jobs = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(&path)?;
        let job: TransferJob = serde_json::from_str(&contents)?;
        jobs.push(job);
    }

    Ok(jobs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_job_json() -> &'static str {
        r#"{
            "scope_data_set": {
                "host": "jeiss8.int.example.org",
                "root_keep_path": "/cygdrive/e/keep",
                "data_set_id": "jrc_liver-1",
                "acquire_start": "2022-05-01T06:00:00Z"
            },
            "cluster_root_paths": {
                "raw_dat": "/nearline/ferry/jrc_liver-1/dat"
            },
            "tasks": ["copy_scope_dat_to_cluster", "archive_dat_to_hdf5"]
        }"#
    }

    #[test]
    fn test_job_deserialization() {
        let job: TransferJob = serde_json::from_str(sample_job_json()).unwrap();
        assert_eq!(job.scope_data_set.host, "jeiss8.int.example.org");
        assert_eq!(job.scope_data_set.data_set_id, "jrc_liver-1");
        assert!(job.includes_task(TransferTask::CopyScopeDatToCluster));
        assert!(!job.includes_task(TransferTask::GenerateMipmaps));
        assert_eq!(
            job.cluster_root_paths.unwrap().raw_dat,
            PathBuf::from("/nearline/ferry/jrc_liver-1/dat")
        );
    }

    #[test]
    fn test_acquisition_started() {
        let mut job: TransferJob = serde_json::from_str(sample_job_json()).unwrap();
        assert!(job.acquisition_started());

        job.scope_data_set.acquire_start = Some(Utc::now() + Duration::days(7));
        assert!(!job.acquisition_started());

        job.scope_data_set.acquire_start = None;
        assert!(!job.acquisition_started());
    }

    #[test]
    fn test_display() {
        let job: TransferJob = serde_json::from_str(sample_job_json()).unwrap();
        assert_eq!(job.to_string(), "jrc_liver-1@jeiss8.int.example.org");
    }

    #[test]
    fn test_load_transfer_jobs_orders_by_file_name() {
        let dir = tempfile::tempdir().unwrap();

        let mut second: TransferJob = serde_json::from_str(sample_job_json()).unwrap();
        second.scope_data_set.data_set_id = "b-volume".to_string();
        let mut first: TransferJob = serde_json::from_str(sample_job_json()).unwrap();
        first.scope_data_set.data_set_id = "a-volume".to_string();

        std::fs::write(
            dir.path().join("transfer_b.json"),
            serde_json::to_string(&second).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("transfer_a.json"),
            serde_json::to_string(&first).unwrap(),
        )
        .unwrap();
        // Not a job document, must be ignored
        std::fs::write(dir.path().join("notes.txt"), "scratch").unwrap();

        let jobs = load_transfer_jobs(dir.path()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].scope_data_set.data_set_id, "a-volume");
        assert_eq!(jobs[1].scope_data_set.data_set_id, "b-volume");
    }

    #[test]
    fn test_load_transfer_jobs_rejects_missing_dir() {
        let err = load_transfer_jobs(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, FerryError::Config(_)));
    }
}
