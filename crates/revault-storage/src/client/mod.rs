//! Storage client with credential resolution and configuration.
//!
//! Credentials are resolved once per [`GcsClient`]; the resulting handle is
//! cheap to clone and shared by every bucket and object operation.

mod gcs_client;
mod gcs_config;
mod gcs_credentials;

pub use gcs_client::GcsClient;
pub use gcs_config::{
    DEFAULT_BUCKET, DEFAULT_ENDPOINT, DEFAULT_ENVIRONMENT, DEFAULT_KEY_FILE, DEFAULT_PROJECT_ID,
    GcsConfig,
};
pub use gcs_credentials::{CredentialKind, CredentialSource};
