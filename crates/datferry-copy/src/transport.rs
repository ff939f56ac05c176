//! Remote transport over ssh/scp subprocesses
//!
//! Every call spawns one external process; there is no connection reuse
//! and no retry. Timeouts are handled entirely by the ssh client options
//! (see <https://man.openbsd.org/ssh_config.5>), so a healthy but slow
//! transfer can run as long as it needs while a dead host is abandoned
//! after the connect timeout plus two missed liveness probes.

use async_trait::async_trait;
use datferry_common::{FerryError, Result};
use std::path::Path;
use tokio::process::Command;

/// Executes commands and file copies on remote scopes
///
/// Abstracted as a trait so the drain loop can be tested against an
/// in-memory double instead of real ssh sessions.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Run `command` on `host`, returning captured stdout on success
    ///
    /// Nonzero exit fails with [`FerryError::RemoteExecution`] carrying the
    /// exit status and stderr.
    async fn execute(&self, host: &str, command: &str) -> Result<String>;

    /// Copy one remote file into a local directory
    ///
    /// Nonzero exit fails with [`FerryError::RemoteCopy`].
    async fn copy_file(&self, host: &str, remote_path: &str, local_dir: &Path) -> Result<()>;
}

/// Production transport shelling out to `ssh` and `scp`
#[derive(Debug, Clone, Default)]
pub struct SshTransport;

impl SshTransport {
    pub fn new() -> Self {
        Self
    }

    /// Shared ssh client options for both shell and copy channels
    ///
    /// StrictHostKeyChecking is disabled because scopes get new IPs when
    /// their DHCP leases roll over, which would otherwise poison known_hosts.
    fn base_options() -> [&'static str; 4] {
        [
            "ConnectTimeout=10",
            "ServerAliveInterval=5",
            "ServerAliveCountMax=2",
            "StrictHostKeyChecking=no",
        ]
    }

    /// Build the `host:"path"` source spec for scp
    ///
    /// The remote path is quoted so spaces in scope save directories
    /// (e.g. "Merlin captures") survive the remote shell.
    fn scp_source(host: &str, remote_path: &str) -> String {
        format!("{}:\"{}\"", host, remote_path)
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    async fn execute(&self, host: &str, command: &str) -> Result<String> {
        let mut cmd = Command::new("ssh");
        for option in Self::base_options() {
            cmd.arg("-o").arg(option);
        }
        cmd.arg(host).arg(command);

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(FerryError::RemoteExecution {
                host: host.to_string(),
                command: command.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn copy_file(&self, host: &str, remote_path: &str, local_dir: &Path) -> Result<()> {
        let mut cmd = Command::new("scp");
        // -T disables scp's filename-pattern check, which rejects the
        // quoted source spec we need for paths with special characters
        cmd.arg("-T");
        cmd.arg("-o").arg("ConnectTimeout=10");
        cmd.arg("-o").arg("StrictHostKeyChecking=no");
        cmd.arg(Self::scp_source(host, remote_path));
        cmd.arg(local_dir);

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(FerryError::RemoteCopy {
                host: host.to_string(),
                source_path: remote_path.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scp_source_quotes_remote_path() {
        let source = SshTransport::scp_source(
            "jeiss8.int.example.org",
            "/cygdrive/e/Merlin captures/jrc_liver-1_2022-05-01T06-18-01.dat",
        );
        assert_eq!(
            source,
            "jeiss8.int.example.org:\"/cygdrive/e/Merlin captures/jrc_liver-1_2022-05-01T06-18-01.dat\""
        );
    }

    #[test]
    fn test_base_options_cover_liveness_and_host_key_policy() {
        let options = SshTransport::base_options();
        assert!(options.contains(&"ConnectTimeout=10"));
        assert!(options.contains(&"ServerAliveInterval=5"));
        assert!(options.contains(&"ServerAliveCountMax=2"));
        assert!(options.contains(&"StrictHostKeyChecking=no"));
    }

    #[tokio::test]
    async fn test_execute_failure_carries_context() {
        // The .invalid TLD never resolves, so ssh exits nonzero quickly;
        // Io covers machines without an ssh client on the path
        let transport = SshTransport::new();
        let err = transport
            .execute("scope.invalid", "true")
            .await
            .unwrap_err();
        match err {
            FerryError::RemoteExecution { host, .. } => assert_eq!(host, "scope.invalid"),
            FerryError::Io(_) => {},
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
