//! Parsed view of a scope dat file path
//!
//! Scope software names dat files `<data_set_id>_<acquire-time>[...].dat`
//! with the acquisition time written as `YYYY-MM-DDTHH-MM-SS` (dashes
//! instead of colons, since colons are not valid on the scope's
//! filesystem). The acquisition time drives the hourly destination
//! bucketing on the cluster; nothing else in the name is load-bearing.

use chrono::NaiveDateTime;
use datferry_common::{FerryError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

const ACQUIRE_TIME_PATTERN: &str = r"\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}";
const ACQUIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// A dat file path with its embedded acquisition metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatPath {
    /// The path as it appears on the scope
    pub path: String,

    /// Dataset identifier (file-name text before the acquisition time)
    pub data_set: String,

    /// Acquisition time parsed from the file name
    pub acquire_time: NaiveDateTime,
}

impl DatPath {
    /// Parse a dat path, extracting the dataset id and acquisition time
    pub fn parse(path: &str) -> Result<Self> {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FerryError::parse(format!("dat path '{}' has no file name", path)))?;

        let pattern = Regex::new(ACQUIRE_TIME_PATTERN)
            .map_err(|e| FerryError::parse(format!("bad acquire time pattern: {}", e)))?;
        let matched = pattern.find(file_name).ok_or_else(|| {
            FerryError::parse(format!("no acquisition time in file name '{}'", file_name))
        })?;

        let acquire_time = NaiveDateTime::parse_from_str(matched.as_str(), ACQUIRE_TIME_FORMAT)
            .map_err(|e| {
                FerryError::parse(format!(
                    "invalid acquisition time '{}' in file name '{}': {}",
                    matched.as_str(),
                    file_name,
                    e
                ))
            })?;

        let data_set = file_name[..matched.start()]
            .trim_end_matches('_')
            .to_string();
        if data_set.is_empty() {
            return Err(FerryError::parse(format!(
                "no data set prefix in file name '{}'",
                file_name
            )));
        }

        Ok(Self {
            path: path.to_string(),
            data_set,
            acquire_time,
        })
    }

    /// Relative destination directory `YYYY/MM/DD/HH` for this file
    ///
    /// Hourly buckets bound directory fan-out and group files acquired in
    /// the same hour regardless of which scope produced them.
    pub fn hourly_relative_path(&self) -> PathBuf {
        PathBuf::from(self.acquire_time.format("%Y/%m/%d/%H").to_string())
    }
}
