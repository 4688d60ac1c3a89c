//! Google Cloud Storage client configuration.

use std::fmt;
use std::path::Path;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default bucket holding papers and profile pictures.
pub const DEFAULT_BUCKET: &str = "revault-files";

/// Project id used when the credential material does not name one.
pub const DEFAULT_PROJECT_ID: &str = "revault-system";

/// Key file looked up in development mode.
pub const DEFAULT_KEY_FILE: &str = "service-account-key.json";

/// Public storage endpoint, also the base of every produced object URL.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Runtime environment assumed when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "production";

const DEVELOPMENT_ENVIRONMENT: &str = "development";

/// Configuration for the storage client.
///
/// Credential fields are inspected by [`CredentialSource::resolve`] in a fixed
/// priority order; see its documentation for the rules.
///
/// [`CredentialSource::resolve`]: crate::CredentialSource::resolve
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GcsConfig {
    /// Bucket that stores every object
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-bucket", env = "GCS_BUCKET", default_value = DEFAULT_BUCKET)
    )]
    pub bucket: String,

    /// Runtime environment (`development` enables the local key file)
    #[cfg_attr(
        feature = "config",
        arg(long = "app-env", env = "APP_ENV", default_value = DEFAULT_ENVIRONMENT)
    )]
    pub environment: String,

    /// Path of the service-account key file used in development
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-key-file", env = "GCS_KEY_FILE", default_value = DEFAULT_KEY_FILE)
    )]
    pub key_file: String,

    /// Base64 encoded service-account JSON
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-credentials-base64", env = "GCS_CREDENTIALS_BASE64", hide_env_values = true)
    )]
    pub credentials_base64: Option<String>,

    /// Project id of the discrete service-account credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-project-id", env = "GCS_PROJECT_ID")
    )]
    pub project_id: Option<String>,

    /// Client email of the discrete service-account credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-client-email", env = "GCS_CLIENT_EMAIL")
    )]
    pub client_email: Option<String>,

    /// Private key of the discrete service-account credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-private-key", env = "GCS_PRIVATE_KEY", hide_env_values = true)
    )]
    pub private_key: Option<String>,

    /// Storage endpoint override (emulators, tests)
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-endpoint", env = "GCS_ENDPOINT")
    )]
    pub endpoint: Option<String>,
}

impl GcsConfig {
    /// Creates a configuration targeting the given bucket with every credential field unset.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            key_file: DEFAULT_KEY_FILE.to_string(),
            credentials_base64: None,
            project_id: None,
            client_email: None,
            private_key: None,
            endpoint: None,
        }
    }

    /// Returns the bucket name.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns whether the runtime environment is development (case-insensitive).
    pub fn is_development(&self) -> bool {
        self.environment
            .trim()
            .eq_ignore_ascii_case(DEVELOPMENT_ENVIRONMENT)
    }

    /// Returns the key file path.
    #[inline]
    pub fn key_file(&self) -> &Path {
        Path::new(&self.key_file)
    }

    /// Returns the storage endpoint, using the public endpoint if not set.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .map(|e| e.trim_end_matches('/'))
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Returns the public URL of an object in the configured bucket.
    ///
    /// URLs always point at the public endpoint, independent of any endpoint override.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", DEFAULT_ENDPOINT, self.bucket, key)
    }

    /// Sets the bucket name.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Sets the runtime environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the development key file path.
    #[must_use]
    pub fn with_key_file(mut self, key_file: impl Into<String>) -> Self {
        self.key_file = key_file.into();
        self
    }

    /// Sets the base64 encoded service-account JSON.
    #[must_use]
    pub fn with_credentials_base64(mut self, encoded: impl Into<String>) -> Self {
        self.credentials_base64 = Some(encoded.into());
        self
    }

    /// Sets the discrete service-account credentials.
    #[must_use]
    pub fn with_service_account(
        mut self,
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        self.project_id = Some(project_id.into());
        self.client_email = Some(client_email.into());
        self.private_key = Some(private_key.into());
        self
    }

    /// Sets the storage endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET)
    }
}

impl fmt::Debug for GcsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsConfig")
            .field("bucket", &self.bucket)
            .field("environment", &self.environment)
            .field("key_file", &self.key_file)
            .field(
                "credentials_base64",
                &self.credentials_base64.as_ref().map(|_| "***"),
            )
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
