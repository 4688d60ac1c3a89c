//! Bucket operations for Google Cloud Storage.
//!
//! This module provides bucket existence checks, creation and IAM policy
//! management with a required storage client.

use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::buckets::get_iam_policy::GetIamPolicyRequest;
use google_cloud_storage::http::buckets::iam_configuration::UniformBucketLevelAccess;
use google_cloud_storage::http::buckets::insert::{
    BucketCreationConfig, InsertBucketParam, InsertBucketRequest,
};
use google_cloud_storage::http::buckets::set_iam_policy::SetIamPolicyRequest;
use google_cloud_storage::http::buckets::{Binding, IamConfiguration, Policy};
use tracing::{debug, error, info, instrument};

use crate::{Error, GcsClient, Result, TRACING_TARGET_BUCKETS};

/// Location of newly created buckets.
pub const DEFAULT_LOCATION: &str = "US";

/// Storage class of newly created buckets.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// Role granting read access to every object in a bucket.
pub const PUBLIC_READ_ROLE: &str = "roles/storage.objectViewer";

/// Principal representing anyone on the internet.
pub const PUBLIC_MEMBER: &str = "allUsers";

const POLICY_VERSION: i32 = 1;

/// Bucket operations with a required storage client.
#[derive(Debug, Clone)]
pub struct BucketOperations {
    client: GcsClient,
}

impl BucketOperations {
    /// Creates new BucketOperations with a storage client.
    pub fn new(client: GcsClient) -> Self {
        Self { client }
    }

    /// Checks whether a bucket exists.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than a missing bucket.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %bucket_name))]
    pub async fn bucket_exists(&self, bucket_name: &str) -> Result<bool> {
        debug!(target: TRACING_TARGET_BUCKETS, "Checking bucket existence");

        let request = GetBucketRequest {
            bucket: bucket_name.to_string(),
            ..Default::default()
        };

        match self.client.as_inner().get_bucket(&request).await {
            Ok(_) => Ok(true),
            Err(e) => match Error::from_storage(e, bucket_name) {
                Error::NotFound(_) => Ok(false),
                e => {
                    error!(
                        target: TRACING_TARGET_BUCKETS,
                        error = %e,
                        "Failed to check bucket existence"
                    );
                    Err(e)
                }
            },
        }
    }

    /// Creates a bucket with uniform bucket-level access in the client's project.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket creation fails.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %bucket_name))]
    pub async fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        debug!(
            target: TRACING_TARGET_BUCKETS,
            project_id = %self.client.project_id(),
            location = DEFAULT_LOCATION,
            storage_class = DEFAULT_STORAGE_CLASS,
            "Creating bucket"
        );

        let start = std::time::Instant::now();
        let request = InsertBucketRequest {
            name: bucket_name.to_string(),
            param: InsertBucketParam {
                project: self.client.project_id().to_string(),
                ..Default::default()
            },
            bucket: BucketCreationConfig {
                location: DEFAULT_LOCATION.to_string(),
                storage_class: Some(DEFAULT_STORAGE_CLASS.to_string()),
                iam_configuration: Some(IamConfiguration {
                    uniform_bucket_level_access: Some(UniformBucketLevelAccess {
                        enabled: true,
                        locked_time: None,
                    }),
                    public_access_prevention: None,
                }),
                ..Default::default()
            },
        };
        let result = self.client.as_inner().insert_bucket(&request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(bucket) => {
                info!(
                    target: TRACING_TARGET_BUCKETS,
                    location = %bucket.location,
                    storage_class = %bucket.storage_class,
                    elapsed = ?elapsed,
                    "Bucket created successfully"
                );
                Ok(())
            }
            Err(e) => {
                let e = Error::from_storage(e, bucket_name);
                error!(
                    target: TRACING_TARGET_BUCKETS,
                    error = %e,
                    kind = e.kind(),
                    elapsed = ?elapsed,
                    "Failed to create bucket"
                );
                Err(e)
            }
        }
    }

    /// Returns the IAM policy of a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the bucket does not exist.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %bucket_name))]
    pub async fn get_iam_policy(&self, bucket_name: &str) -> Result<Policy> {
        let request = GetIamPolicyRequest {
            resource: bucket_name.to_string(),
            ..Default::default()
        };

        self.client
            .as_inner()
            .get_iam_policy(&request)
            .await
            .map_err(|e| Error::from_storage(e, bucket_name))
    }

    /// Replaces the bucket IAM bindings with public read access for everyone.
    ///
    /// The current policy is read first so that its etag accompanies the
    /// replacement.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the policy fails.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %bucket_name))]
    pub async fn make_public(&self, bucket_name: &str) -> Result<()> {
        debug!(target: TRACING_TARGET_BUCKETS, "Applying public read policy");

        let start = std::time::Instant::now();
        let current = self.get_iam_policy(bucket_name).await?;
        let request = SetIamPolicyRequest {
            resource: bucket_name.to_string(),
            policy: public_read_policy(current.etag),
        };
        let result = self.client.as_inner().set_iam_policy(&request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(policy) => {
                info!(
                    target: TRACING_TARGET_BUCKETS,
                    bindings = policy.bindings.len(),
                    elapsed = ?elapsed,
                    "Bucket made public successfully"
                );
                Ok(())
            }
            Err(e) => {
                let e = Error::from_storage(e, bucket_name);
                error!(
                    target: TRACING_TARGET_BUCKETS,
                    error = %e,
                    elapsed = ?elapsed,
                    "Failed to make bucket public"
                );
                Err(e)
            }
        }
    }
}

/// Policy with a single binding granting object read access to `allUsers`.
fn public_read_policy(etag: String) -> Policy {
    Policy {
        version: POLICY_VERSION,
        bindings: vec![Binding {
            role: PUBLIC_READ_ROLE.to_string(),
            members: vec![PUBLIC_MEMBER.to_string()],
            condition: None,
        }],
        etag,
    }
}
