//! High-level file storage for research papers and profile pictures.

use std::time::Duration;

use bytes::Bytes;
use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::operations::{BucketOperations, ObjectOperations};
use crate::types::{ContentType, ObjectKey, ObjectMetadata};
use crate::{Error, GcsClient, Result, TRACING_TARGET_STORAGE};

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    /// Object key the file was stored under.
    pub key: String,
    /// Public URL of the stored file.
    pub url: String,
    /// Size of the uploaded file in bytes.
    pub size: u64,
    /// Content type the file was stored with.
    pub content_type: ContentType,
    /// Upload duration, including the connectivity check and verification.
    pub duration: Duration,
}

/// File storage facade over a single bucket.
///
/// Uploads and bucket provisioning propagate failures wrapped with the name
/// of the failed operation. Deletion and listing are best-effort: failures
/// are logged and reported as `false` or silently dropped.
#[derive(Debug, Clone)]
pub struct FileStorage {
    client: GcsClient,
    buckets: BucketOperations,
    objects: ObjectOperations,
}

impl FileStorage {
    /// Creates a file storage facade over an authenticated client.
    pub fn new(client: GcsClient) -> Self {
        Self {
            buckets: client.bucket_operations(),
            objects: client.object_operations(),
            client,
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &GcsClient {
        &self.client
    }

    /// Checks that the configured bucket can be reached.
    ///
    /// Never fails; see [`GcsClient::check_connectivity`].
    pub async fn check_connectivity(&self) -> bool {
        self.client.check_connectivity().await
    }

    /// Uploads a research paper as `papers/<UTC date>/<name>-<uuid><ext>`.
    ///
    /// # Errors
    ///
    /// Returns an error, prefixed with the operation name, if the storage is
    /// unreachable, the file name is invalid, or the upload or its
    /// verification fails.
    #[instrument(skip(self, data), target = TRACING_TARGET_STORAGE, fields(bucket = %self.client.bucket()))]
    pub async fn upload_research_paper(
        &self,
        data: impl Into<Bytes>,
        original_name: &str,
    ) -> Result<UploadResult> {
        const OPERATION: &str = "Failed to upload research paper";

        let start = std::time::Instant::now();
        self.ensure_connectivity()
            .await
            .map_err(|e| e.context(OPERATION))?;

        let uploaded_at = Timestamp::now();
        let date = uploaded_at.to_zoned(TimeZone::UTC).date();
        let key =
            ObjectKey::research_paper(original_name, date).map_err(|e| e.context(OPERATION))?;
        let metadata = ObjectMetadata::research_paper(original_name, uploaded_at);

        self.upload(key, metadata, data.into(), start)
            .await
            .map_err(|e| e.context(OPERATION))
    }

    /// Uploads a profile picture as `profiles/<user>/<name>-<uuid><ext>`.
    ///
    /// The content type is derived from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error, prefixed with the operation name, if the storage is
    /// unreachable, the user id or file name is invalid, or the upload or its
    /// verification fails.
    #[instrument(skip(self, data), target = TRACING_TARGET_STORAGE, fields(bucket = %self.client.bucket()))]
    pub async fn upload_profile_picture(
        &self,
        data: impl Into<Bytes>,
        original_name: &str,
        user_id: &str,
    ) -> Result<UploadResult> {
        const OPERATION: &str = "Failed to upload profile picture";

        let start = std::time::Instant::now();
        self.ensure_connectivity()
            .await
            .map_err(|e| e.context(OPERATION))?;

        let key = ObjectKey::profile_picture(user_id, original_name)
            .map_err(|e| e.context(OPERATION))?;
        let metadata = ObjectMetadata::profile_picture(original_name, user_id, Timestamp::now());

        self.upload(key, metadata, data.into(), start)
            .await
            .map_err(|e| e.context(OPERATION))
    }

    /// Deletes a stored profile picture.
    ///
    /// No existence check is made first. Returns `false` on any failure,
    /// including a missing object; the structured error is logged.
    #[instrument(skip(self), target = TRACING_TARGET_STORAGE, fields(bucket = %self.client.bucket()))]
    pub async fn delete_profile_picture(&self, user_id: &str, file_name: &str) -> bool {
        let result = match ObjectKey::existing_profile_picture(user_id, file_name) {
            Ok(key) => self
                .objects
                .delete_object(self.client.bucket(), &key.to_string())
                .await
                .map(|()| key),
            Err(e) => Err(e),
        };

        match result {
            Ok(key) => {
                info!(
                    target: TRACING_TARGET_STORAGE,
                    key = %key,
                    "Profile picture deleted"
                );
                true
            }
            Err(e) => {
                warn!(
                    target: TRACING_TARGET_STORAGE,
                    error = %e,
                    kind = e.kind(),
                    status = ?e.status_code(),
                    "Failed to delete profile picture"
                );
                false
            }
        }
    }

    /// Logs every object in the bucket.
    ///
    /// Failures are logged and swallowed.
    pub async fn list_files(&self) {
        self.log_files(None).await;
    }

    /// Logs every object whose key starts with `prefix`.
    ///
    /// Failures are logged and swallowed.
    pub async fn list_files_with_prefix(&self, prefix: &str) {
        self.log_files(Some(prefix)).await;
    }

    /// Creates the bucket with public read access if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error, prefixed with the operation name, if the existence
    /// check, the creation or the policy update fails.
    #[instrument(skip(self), target = TRACING_TARGET_STORAGE, fields(bucket = %self.client.bucket()))]
    pub async fn create_bucket_if_not_exists(&self) -> Result<()> {
        const OPERATION: &str = "Failed to create bucket";
        let bucket = self.client.bucket();

        let exists = self
            .buckets
            .bucket_exists(bucket)
            .await
            .map_err(|e| e.context(OPERATION))?;

        if exists {
            info!(target: TRACING_TARGET_STORAGE, "Bucket already exists");
            return Ok(());
        }

        self.buckets
            .create_bucket(bucket)
            .await
            .map_err(|e| e.context(OPERATION))?;
        self.buckets
            .make_public(bucket)
            .await
            .map_err(|e| e.context(OPERATION))?;

        info!(target: TRACING_TARGET_STORAGE, "Bucket created with public read access");
        Ok(())
    }

    /// Grants public read access to every object in the bucket.
    ///
    /// Replaces the existing IAM bindings.
    ///
    /// # Errors
    ///
    /// Returns an error, prefixed with the operation name, if the policy
    /// cannot be read or written.
    #[instrument(skip(self), target = TRACING_TARGET_STORAGE, fields(bucket = %self.client.bucket()))]
    pub async fn make_bucket_public(&self) -> Result<()> {
        self.buckets
            .make_public(self.client.bucket())
            .await
            .map_err(|e| e.context("Failed to make bucket public"))
    }

    async fn ensure_connectivity(&self) -> Result<()> {
        if self.check_connectivity().await {
            Ok(())
        } else {
            Err(Error::Connectivity {
                bucket: self.client.bucket().to_string(),
            })
        }
    }

    async fn upload(
        &self,
        key: ObjectKey,
        metadata: ObjectMetadata,
        data: Bytes,
        start: std::time::Instant,
    ) -> Result<UploadResult> {
        let bucket = self.client.bucket();
        let key = key.to_string();
        let size = data.len() as u64;

        self.objects
            .upload_object(bucket, &key, data, &metadata)
            .await?;

        if !self.objects.object_exists(bucket, &key).await? {
            error!(
                target: TRACING_TARGET_STORAGE,
                key = %key,
                "Uploaded object is not visible"
            );
            return Err(Error::UploadVerification { key });
        }

        let info = self.objects.get_object_info(bucket, &key).await?;
        debug!(
            target: TRACING_TARGET_STORAGE,
            key = %info.key,
            size = info.size,
            content_type = ?info.content_type,
            cache_control = ?info.cache_control,
            crc32c = ?info.crc32c,
            metadata = ?info.metadata,
            "Stored object metadata"
        );

        let url = self.client.public_url(&key);
        let duration = start.elapsed();

        info!(
            target: TRACING_TARGET_STORAGE,
            key = %key,
            url = %url,
            size = size,
            duration = ?duration,
            "File uploaded successfully"
        );

        Ok(UploadResult {
            key,
            url,
            size,
            content_type: metadata.content_type,
            duration,
        })
    }

    async fn log_files(&self, prefix: Option<&str>) {
        match self.objects.list_objects(self.client.bucket(), prefix).await {
            Ok(objects) => {
                for object in &objects {
                    info!(
                        target: TRACING_TARGET_STORAGE,
                        name = %object.key,
                        size = object.size,
                        content_type = object.content_type.as_deref().unwrap_or("unknown"),
                        "Stored file"
                    );
                }
                info!(
                    target: TRACING_TARGET_STORAGE,
                    prefix = ?prefix,
                    count = objects.len(),
                    "Listed files"
                );
            }
            Err(e) => {
                warn!(
                    target: TRACING_TARGET_STORAGE,
                    prefix = ?prefix,
                    error = %e,
                    kind = e.kind(),
                    "Failed to list files"
                );
            }
        }
    }
}
