//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── gcs: GcsConfig     # Bucket, environment, credentials, endpoint
//! ├── anonymous: bool    # Skip authentication (emulators)
//! └── command: Command   # Storage operation to run
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use revault_storage::GcsConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "revault")]
#[command(about = "Revault research paper and profile picture storage")]
#[command(version)]
pub struct Cli {
    /// Storage bucket, environment and credential configuration.
    #[clap(flatten)]
    pub gcs: GcsConfig,

    /// Send unauthenticated requests (storage emulators only).
    #[arg(long = "gcs-anonymous", env = "GCS_ANONYMOUS", global = true)]
    pub anonymous: bool,

    /// Storage operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Storage operations exposed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Check that the configured bucket is reachable.
    Check,

    /// Upload a research paper (PDF).
    UploadPaper {
        /// File to upload.
        file: PathBuf,
        /// Original file name to record (defaults to the file's name).
        #[arg(long)]
        name: Option<String>,
    },

    /// Upload a user profile picture.
    UploadAvatar {
        /// Owner of the picture.
        #[arg(long)]
        user_id: String,
        /// File to upload.
        file: PathBuf,
        /// Original file name to record (defaults to the file's name).
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a stored profile picture.
    DeleteAvatar {
        /// Owner of the picture.
        #[arg(long)]
        user_id: String,
        /// Stored file name (last segment of the object key).
        file_name: String,
    },

    /// Log the objects stored in the bucket.
    List {
        /// Only list objects whose key starts with this prefix.
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Create the bucket with public read access if it does not exist.
    Provision,

    /// Grant public read access to every object in the bucket.
    MakePublic,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// variables act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            bucket = %self.gcs.bucket,
            environment = %self.gcs.environment,
            endpoint = %self.gcs.endpoint(),
            anonymous = self.anonymous,
            has_key_blob = self.gcs.credentials_base64.is_some(),
            "Storage configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
