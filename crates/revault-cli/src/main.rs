#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;

use std::process;

use anyhow::Context;
use revault_storage::{FileStorage, GcsClient};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "revault_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "revault_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "revault_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "revault_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let client = if cli.anonymous {
        GcsClient::connect_anonymous(cli.gcs)
    } else {
        GcsClient::connect(cli.gcs)
            .await
            .context("failed to connect to storage")?
    };

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        bucket = %client.bucket(),
        project_id = %client.project_id(),
        credentials = ?client.credential_kind(),
        "storage client ready"
    );

    commands::execute(cli.command, &FileStorage::new(client)).await
}
