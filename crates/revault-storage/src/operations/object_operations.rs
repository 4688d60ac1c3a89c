//! Object operations for Google Cloud Storage.
//!
//! This module provides uploads with checksums and metadata, existence and
//! metadata lookups, deletion and paginated listing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::upload::{UploadObjectRequest, UploadType};
use tracing::{debug, error, info, instrument};

use crate::types::{ObjectInfo, ObjectMetadata};
use crate::{Error, GcsClient, Result, TRACING_TARGET_OBJECTS};

/// Object operations with a required storage client.
#[derive(Debug, Clone)]
pub struct ObjectOperations {
    client: GcsClient,
}

impl ObjectOperations {
    /// Creates new ObjectOperations with a storage client.
    pub fn new(client: GcsClient) -> Self {
        Self { client }
    }

    /// Uploads an object in a single multipart request.
    ///
    /// The CRC32C checksum of `data` is sent with the metadata so the backend
    /// rejects corrupted payloads.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Name of the bucket
    /// * `key` - Object key
    /// * `data` - Object contents
    /// * `metadata` - Content type, cache directive and tags
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    #[instrument(skip(self, data, metadata), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket, key = %key))]
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: &ObjectMetadata,
    ) -> Result<ObjectInfo> {
        let size = data.len();
        let checksum = crc32c_base64(&data);

        debug!(
            target: TRACING_TARGET_OBJECTS,
            size = size,
            content_type = %metadata.content_type,
            crc32c = %checksum,
            "Uploading object"
        );

        let start = std::time::Instant::now();
        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };
        let object = Object {
            name: key.to_string(),
            content_type: Some(metadata.content_type.to_string()),
            cache_control: Some(metadata.cache_control.clone()),
            crc32c: Some(checksum),
            metadata: Some(metadata.to_hashmap()),
            ..Default::default()
        };
        let result = self
            .client
            .as_inner()
            .upload_object(&request, data, &UploadType::Multipart(Box::new(object)))
            .await;
        let elapsed = start.elapsed();

        match result {
            Ok(object) => {
                info!(
                    target: TRACING_TARGET_OBJECTS,
                    size = size,
                    generation = object.generation,
                    elapsed = ?elapsed,
                    "Object uploaded successfully"
                );
                Ok(ObjectInfo::from(object))
            }
            Err(e) => {
                let e = Error::from_storage(e, bucket);
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    error = %e,
                    elapsed = ?elapsed,
                    "Failed to upload object"
                );
                Err(e)
            }
        }
    }

    /// Returns the stored metadata of an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the object does not exist.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket, key = %key))]
    pub async fn get_object_info(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        let object = self
            .client
            .as_inner()
            .get_object(&request)
            .await
            .map_err(|e| Error::from_storage(e, key))?;

        debug!(
            target: TRACING_TARGET_OBJECTS,
            size = object.size,
            content_type = ?object.content_type,
            "Fetched object metadata"
        );

        Ok(ObjectInfo::from(object))
    }

    /// Checks whether an object exists.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than a missing object.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket, key = %key))]
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.get_object_info(bucket, key).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the object does not exist.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket, key = %key))]
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        debug!(target: TRACING_TARGET_OBJECTS, "Deleting object");

        let start = std::time::Instant::now();
        let request = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };
        let result = self.client.as_inner().delete_object(&request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(()) => {
                info!(
                    target: TRACING_TARGET_OBJECTS,
                    elapsed = ?elapsed,
                    "Object deleted successfully"
                );
                Ok(())
            }
            Err(e) => {
                let e = Error::from_storage(e, key);
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    error = %e,
                    kind = e.kind(),
                    elapsed = ?elapsed,
                    "Failed to delete object"
                );
                Err(e)
            }
        }
    }

    /// Lists every object in a bucket, optionally restricted to a prefix.
    ///
    /// Follows page tokens until the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket))]
    pub async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectInfo>> {
        debug!(target: TRACING_TARGET_OBJECTS, prefix = ?prefix, "Listing objects");

        let start = std::time::Instant::now();
        let mut objects = Vec::new();
        let mut page_token = None;
        let mut pages = 0_usize;

        loop {
            let request = ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: prefix.map(str::to_string),
                page_token: page_token.take(),
                ..Default::default()
            };

            let response = self
                .client
                .as_inner()
                .list_objects(&request)
                .await
                .map_err(|e| {
                    let e = Error::from_storage(e, bucket);
                    error!(
                        target: TRACING_TARGET_OBJECTS,
                        error = %e,
                        page = pages,
                        "Failed to list objects"
                    );
                    e
                })?;

            pages += 1;
            objects.extend(
                response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(ObjectInfo::from),
            );

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(
            target: TRACING_TARGET_OBJECTS,
            count = objects.len(),
            pages = pages,
            elapsed = ?start.elapsed(),
            "Objects listed successfully"
        );

        Ok(objects)
    }
}

/// Base64 encoded big-endian CRC32C checksum, the format the JSON API expects.
pub(crate) fn crc32c_base64(data: &[u8]) -> String {
    STANDARD.encode(crc32c::crc32c(data).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32c_base64_known_vector() {
        // CRC32C("123456789") = 0xE3069283
        assert_eq!(crc32c_base64(b"123456789"), "4waSgw==");
    }

    #[test]
    fn test_crc32c_base64_empty() {
        assert_eq!(crc32c_base64(b""), "AAAAAA==");
    }
}
