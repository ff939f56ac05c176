//! Per-item transfer and acknowledgment
//!
//! The two operations here are the pipeline's correctness backbone:
//! [`copy_dat_file`] must return without error before [`remove_keep_file`]
//! runs for the same item. A crash between the two leaves the sentinel in
//! place, so the next pass re-copies the file to the same deterministic
//! destination — wasteful but safe. The copy itself is not verified
//! (no checksum, no temp-file-then-rename); a transfer killed mid-stream
//! can leave a truncated file that the re-copy overwrites.

use crate::dat_path::DatPath;
use crate::keep_file::KeepFile;
use crate::transport::RemoteTransport;
use datferry_common::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy one dat file into its hourly bucket under `dat_storage_root`
///
/// Creates the bucket directory if needed, then copies via the transport.
/// Returns the destination directory.
pub async fn copy_dat_file(
    transport: &dyn RemoteTransport,
    keep_file: &KeepFile,
    dat_storage_root: &Path,
) -> Result<PathBuf> {
    let dat_path = DatPath::parse(&keep_file.dat_path)?;
    let target_dir = dat_storage_root.join(dat_path.hourly_relative_path());
    std::fs::create_dir_all(&target_dir)?;

    debug!(
        dat_path = %keep_file.dat_path,
        target_dir = %target_dir.display(),
        "copying dat file"
    );
    transport
        .copy_file(&keep_file.host, &keep_file.dat_path, &target_dir)
        .await?;

    Ok(target_dir)
}

/// Delete the remote sentinel, acknowledging a completed transfer
///
/// Only call after [`copy_dat_file`] has succeeded for the same item.
pub async fn remove_keep_file(
    transport: &dyn RemoteTransport,
    keep_file: &KeepFile,
) -> Result<()> {
    let command = format!("rm \"{}\"", keep_file.keep_path);
    transport.execute(&keep_file.host, &command).await?;
    Ok(())
}
