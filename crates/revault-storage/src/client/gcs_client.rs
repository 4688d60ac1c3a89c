//! High-level Google Cloud Storage client.
//!
//! This module provides the long-lived client handle: credentials are resolved
//! once when it is built and every operation reuses the same authenticated
//! connection.

use std::fmt;
use std::sync::Arc;

use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use tracing::{debug, error, info, instrument, warn};

use super::gcs_config::DEFAULT_PROJECT_ID;
use super::gcs_credentials::{CredentialKind, CredentialSource};
use crate::operations::{BucketOperations, ObjectOperations};
use crate::{Error, GcsConfig, Result, TRACING_TARGET_BUCKETS, TRACING_TARGET_CLIENT};

/// Authenticated storage client handle.
///
/// Cloning is cheap and clones share the same underlying connection pool, so
/// a single handle built at startup can be passed to every consumer.
#[derive(Clone)]
pub struct GcsClient {
    inner: Client,
    config: Arc<GcsConfig>,
    project_id: Arc<str>,
    credential_kind: Option<CredentialKind>,
}

impl GcsClient {
    /// Resolves credentials and creates an authenticated client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The encoded credential blob cannot be decoded or parsed
    /// - The authentication layer rejects the credentials
    #[instrument(skip(config), target = TRACING_TARGET_CLIENT, fields(bucket = %config.bucket))]
    pub async fn connect(config: GcsConfig) -> Result<Self> {
        info!(target: TRACING_TARGET_CLIENT, "Initializing storage client");

        let source = CredentialSource::resolve(&config).map_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Credential resolution failed");
            e
        })?;
        let kind = source.kind();

        info!(
            target: TRACING_TARGET_CLIENT,
            credentials = %kind,
            "Resolved credential source"
        );

        let client_config = source
            .authenticate(Self::base_config(&config))
            .await
            .map_err(|e| {
                error!(
                    target: TRACING_TARGET_CLIENT,
                    credentials = %kind,
                    error = %e,
                    "Authentication failed"
                );
                e
            })?;

        let project_id = source
            .project_id()
            .map(str::to_string)
            .or_else(|| client_config.project_id.clone())
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        info!(
            target: TRACING_TARGET_CLIENT,
            credentials = %kind,
            project_id = %project_id,
            endpoint = %config.endpoint(),
            "Storage client initialized successfully"
        );

        Ok(Self::from_parts(client_config, config, project_id, Some(kind)))
    }

    /// Creates a client that sends unauthenticated requests.
    ///
    /// Intended for storage emulators and tests reached through the configured
    /// endpoint. The project id falls back to the default when unset.
    #[instrument(skip(config), target = TRACING_TARGET_CLIENT, fields(bucket = %config.bucket))]
    pub fn connect_anonymous(config: GcsConfig) -> Self {
        let project_id = config
            .project_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        warn!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint(),
            "Creating anonymous storage client"
        );

        let client_config = Self::base_config(&config).anonymous();
        Self::from_parts(client_config, config, project_id, None)
    }

    fn base_config(config: &GcsConfig) -> ClientConfig {
        ClientConfig {
            storage_endpoint: config.endpoint().to_string(),
            ..ClientConfig::default()
        }
    }

    fn from_parts(
        client_config: ClientConfig,
        config: GcsConfig,
        project_id: String,
        credential_kind: Option<CredentialKind>,
    ) -> Self {
        Self {
            inner: Client::new(client_config),
            config: Arc::new(config),
            project_id: project_id.into(),
            credential_kind,
        }
    }

    /// Checks that the configured bucket can be reached.
    ///
    /// Never fails: any error, including a missing bucket, is logged and
    /// reported as `false`.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %self.config.bucket))]
    pub async fn check_connectivity(&self) -> bool {
        debug!(target: TRACING_TARGET_BUCKETS, "Checking storage connectivity");

        let start = std::time::Instant::now();
        let request = GetBucketRequest {
            bucket: self.config.bucket.clone(),
            ..Default::default()
        };
        let result = self.inner.get_bucket(&request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(bucket) => {
                info!(
                    target: TRACING_TARGET_BUCKETS,
                    location = %bucket.location,
                    elapsed = ?elapsed,
                    "Storage connectivity check successful"
                );
                true
            }
            Err(e) => {
                let e = Error::from_storage(e, self.config.bucket.as_str());
                error!(
                    target: TRACING_TARGET_BUCKETS,
                    error = %e,
                    kind = e.kind(),
                    elapsed = ?elapsed,
                    "Storage connectivity check failed"
                );
                false
            }
        }
    }

    /// Creates a new BucketOperations instance.
    pub fn bucket_operations(&self) -> BucketOperations {
        BucketOperations::new(self.clone())
    }

    /// Creates a new ObjectOperations instance.
    pub fn object_operations(&self) -> ObjectOperations {
        ObjectOperations::new(self.clone())
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    /// Returns the configured bucket name.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Returns the resolved project id.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns the credential mode, or `None` for anonymous clients.
    pub fn credential_kind(&self) -> Option<CredentialKind> {
        self.credential_kind
    }

    /// Returns the public URL of an object in the configured bucket.
    pub fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    pub(crate) fn as_inner(&self) -> &Client {
        &self.inner
    }
}

impl fmt::Debug for GcsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsClient")
            .field("config", &self.config)
            .field("project_id", &self.project_id)
            .field("credential_kind", &self.credential_kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_connect_anonymous() {
        let config = GcsConfig::new("test-bucket").with_endpoint("http://127.0.0.1:4443");
        let client = GcsClient::connect_anonymous(config);

        assert_eq!(client.bucket(), "test-bucket");
        assert_eq!(client.project_id(), "revault-system");
        assert_eq!(client.credential_kind(), None);
        assert_eq!(
            client.public_url("profiles/u1/a.png"),
            "https://storage.googleapis.com/test-bucket/profiles/u1/a.png"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_blob() {
        let config = GcsConfig::default().with_credentials_base64("bm90IGpzb24=");
        let error = GcsClient::connect(config).await.unwrap_err();
        assert!(error.is_credentials_error());
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a key file").unwrap();

        let config = GcsConfig::default()
            .with_environment("development")
            .with_key_file(file.path().to_string_lossy());
        let error = GcsClient::connect(config).await.unwrap_err();

        assert!(error.is_credentials_error());
        assert_eq!(error.kind(), "auth");
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_private_key() {
        let config = GcsConfig::default().with_service_account(
            "triple-project",
            "svc@triple-project.iam.gserviceaccount.com",
            "not-a-private-key",
        );
        let error = GcsClient::connect(config).await.unwrap_err();

        assert!(error.is_credentials_error());
        assert_eq!(error.kind(), "auth");
    }

    #[tokio::test]
    async fn test_debug_masks_config_secrets() {
        let config = GcsConfig::default().with_service_account("p", "e", "SECRET");
        let client = GcsClient::connect_anonymous(config);
        assert!(!format!("{client:?}").contains("SECRET"));
        assert_eq!(client.project_id(), "p");
    }
}
