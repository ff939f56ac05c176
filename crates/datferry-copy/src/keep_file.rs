//! Keep file discovery and parsing
//!
//! A keep file is the scope's completion marker: `keep_<dat-file-name>^keep`
//! written into the keep root once the dat file with that name is fully
//! flushed in the same directory. Its existence is the contract that the
//! dat file is safe to copy; its deletion is the transfer acknowledgment.

use crate::dat_path::DatPath;
use crate::transport::RemoteTransport;
use chrono::NaiveDateTime;
use datferry_common::Result;
use std::path::Path;
use tracing::{debug, warn};

/// Suffix every keep file name ends with
pub const KEEP_SUFFIX: &str = "^keep";

/// Prefix separating the marker from the dat file name it references
pub const KEEP_PREFIX: &str = "keep_";

/// One transfer-pending work item
///
/// Immutable once built from a remote listing entry. The acquire time is
/// carried so discovery can hand back items in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepFile {
    /// Scope the marker lives on
    pub host: String,

    /// Remote path of the marker itself
    pub keep_path: String,

    /// Dataset the referenced dat file belongs to
    pub data_set: String,

    /// Remote path of the dat file to transfer
    pub dat_path: String,

    /// Acquisition time embedded in the dat file name
    pub acquire_time: NaiveDateTime,
}

impl KeepFile {
    /// Parse one keep file listing entry into a work item
    ///
    /// Returns `None` for names that do not follow the convention; callers
    /// skip those rather than failing the whole discovery.
    pub fn parse(host: &str, keep_root: &Path, name: &str) -> Option<KeepFile> {
        let stem = name.strip_suffix(KEEP_SUFFIX)?;
        let dat_name = stem.strip_prefix(KEEP_PREFIX)?;

        let root = keep_root.to_string_lossy();
        let root = root.trim_end_matches('/');
        let dat_path = format!("{}/{}", root, dat_name);
        let parsed = DatPath::parse(&dat_path).ok()?;

        Some(KeepFile {
            host: host.to_string(),
            keep_path: format!("{}/{}", root, name),
            data_set: parsed.data_set,
            dat_path,
            acquire_time: parsed.acquire_time,
        })
    }
}

/// List pending work items for one dataset on one scope
///
/// Runs `ls` on the keep root over the transport, keeps entries with the
/// keep suffix that parse cleanly and belong to `data_set_id`, and returns
/// them sorted by acquisition time (keep path as tie-break) so draining is
/// chronological regardless of the remote listing's collation.
pub async fn discover(
    transport: &dyn RemoteTransport,
    host: &str,
    keep_root: &Path,
    data_set_id: &str,
) -> Result<Vec<KeepFile>> {
    let command = format!("ls \"{}\"", keep_root.display());
    let listing = transport.execute(host, &command).await?;

    let mut keep_files = Vec::new();
    for line in listing.lines() {
        let name = line.trim();
        if !name.ends_with(KEEP_SUFFIX) {
            continue;
        }
        match KeepFile::parse(host, keep_root, name) {
            Some(keep_file) if keep_file.data_set == data_set_id => keep_files.push(keep_file),
            Some(keep_file) => {
                debug!(
                    name,
                    data_set = %keep_file.data_set,
                    "skipping keep file for other data set"
                );
            },
            None => warn!(name, host, "skipping malformed keep file name"),
        }
    }

    keep_files.sort_by(|a, b| {
        a.acquire_time
            .cmp(&b.acquire_time)
            .then_with(|| a.keep_path.cmp(&b.keep_path))
    });

    Ok(keep_files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_keep_file() {
        let keep_file = KeepFile::parse(
            "jeiss8.int.example.org",
            Path::new("/cygdrive/e/keep"),
            "keep_X_2022-05-01T06-18-01.dat^keep",
        )
        .unwrap();

        assert_eq!(keep_file.host, "jeiss8.int.example.org");
        assert_eq!(
            keep_file.keep_path,
            "/cygdrive/e/keep/keep_X_2022-05-01T06-18-01.dat^keep"
        );
        assert_eq!(keep_file.data_set, "X");
        assert_eq!(
            keep_file.dat_path,
            "/cygdrive/e/keep/X_2022-05-01T06-18-01.dat"
        );
    }

    #[test]
    fn test_parse_trims_trailing_root_slash() {
        let keep_file = KeepFile::parse(
            "h",
            Path::new("/cygdrive/e/keep/"),
            "keep_X_2022-05-01T06-18-01.dat^keep",
        )
        .unwrap();
        assert_eq!(
            keep_file.dat_path,
            "/cygdrive/e/keep/X_2022-05-01T06-18-01.dat"
        );
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!(KeepFile::parse(
            "h",
            Path::new("/k"),
            "X_2022-05-01T06-18-01.dat^keep"
        )
        .is_none());
    }

    #[test]
    fn test_parse_rejects_name_without_acquire_time() {
        assert!(KeepFile::parse("h", Path::new("/k"), "keep_X_notes.dat^keep").is_none());
    }

    proptest! {
        #[test]
        fn prop_names_without_suffix_never_parse(name in "[A-Za-z0-9._-]{1,40}") {
            prop_assume!(!name.ends_with(KEEP_SUFFIX));
            prop_assert!(KeepFile::parse("h", Path::new("/k"), &name).is_none());
        }

        #[test]
        fn prop_valid_names_round_trip_data_set(
            data_set in "[a-z][a-z0-9-]{0,8}(_[a-z0-9-]{1,8})?",
        ) {
            let name = format!("keep_{}_2022-05-01T06-18-01.dat^keep", data_set);
            let keep_file = KeepFile::parse("h", Path::new("/k"), &name).unwrap();
            prop_assert_eq!(keep_file.data_set, data_set);
        }
    }
}
