//! Datferry Copy - scope to cluster dat transfer

use anyhow::Result;
use clap::Parser;
use datferry_common::logging::{init_logging, LogConfig, LogLevel};
use datferry_common::types::load_transfer_jobs;
use datferry_copy::drain::{drain, DrainOptions};
use datferry_copy::transport::SshTransport;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "datferry-copy")]
#[command(
    author,
    version,
    about = "Copies dat files identified by keep files on remote scopes"
)]
struct Cli {
    /// Directory containing transfer*.json job documents
    #[arg(long)]
    transfer_dir: PathBuf,

    /// Only process jobs being acquired on this scope host
    #[arg(long)]
    scope: Option<String>,

    /// Stop starting new copies after this many minutes have elapsed
    #[arg(long)]
    max_transfer_minutes: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment variables take precedence over the verbose flag
    let mut log_config = LogConfig::from_env()?;
    if cli.verbose && std::env::var("DATFERRY_LOG_LEVEL").is_err() {
        log_config.level = LogLevel::Debug;
    }
    log_config.file_prefix = "datferry-copy".to_string();
    init_logging(&log_config)?;

    let jobs = load_transfer_jobs(&cli.transfer_dir)?;
    info!(
        count = jobs.len(),
        transfer_dir = %cli.transfer_dir.display(),
        "loaded transfer jobs"
    );

    let options = DrainOptions {
        scope: cli.scope,
        max_transfer: cli.max_transfer_minutes.map(|m| Duration::from_secs(m * 60)),
    };

    let transport = SshTransport::new();
    let summary = drain(&jobs, &transport, &options).await?;

    info!(
        transferred = summary.transferred,
        elapsed_seconds = summary.elapsed.as_secs(),
        "transferred dat files"
    );
    Ok(())
}
