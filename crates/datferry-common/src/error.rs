//! Error types for datferry

use thiserror::Error;

/// Result type alias for datferry operations
pub type Result<T> = std::result::Result<T, FerryError>;

/// Main error type for datferry
///
/// Remote failures carry enough context (host, command, exit status,
/// captured stderr) to diagnose a dead scope or a bad path from the log
/// alone, without re-running the command by hand.
#[derive(Error, Debug)]
pub enum FerryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("remote command '{command}' on {host} exited with {status:?}: {stderr}")]
    RemoteExecution {
        host: String,
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("remote copy of {host}:{source_path} exited with {status:?}: {stderr}")]
    RemoteCopy {
        host: String,
        // Not named `source` because thiserror would treat that as the
        // error-source field, which must implement `Error`.
        source_path: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FerryError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_execution_display_includes_context() {
        let err = FerryError::RemoteExecution {
            host: "jeiss8.int.example.org".to_string(),
            command: "ls \"/cygdrive/e/keep\"".to_string(),
            status: Some(255),
            stderr: "Connection timed out".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("jeiss8.int.example.org"));
        assert!(message.contains("255"));
        assert!(message.contains("Connection timed out"));
    }

    #[test]
    fn test_config_helper() {
        let err = FerryError::config("transfer dir missing");
        assert!(matches!(err, FerryError::Config(_)));
        assert!(err.to_string().contains("transfer dir missing"));
    }
}
