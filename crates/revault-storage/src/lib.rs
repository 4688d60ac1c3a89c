#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![allow(clippy::result_large_err)]

/// Tracing target for client construction and credential resolution.
pub const TRACING_TARGET_CLIENT: &str = "revault_storage::client";

/// Tracing target for bucket-level operations (existence, creation, IAM).
pub const TRACING_TARGET_BUCKETS: &str = "revault_storage::buckets";

/// Tracing target for object-level operations (upload, metadata, delete, list).
pub const TRACING_TARGET_OBJECTS: &str = "revault_storage::objects";

/// Tracing target for the high-level file storage facade.
pub const TRACING_TARGET_STORAGE: &str = "revault_storage::storage";

mod client;
mod error;
pub mod operations;
pub mod prelude;
mod storage;
pub mod types;

pub use crate::client::{CredentialKind, CredentialSource, GcsClient, GcsConfig};
pub use crate::error::{Error, Result};
pub use crate::operations::{BucketOperations, ObjectOperations};
pub use crate::storage::{FileStorage, UploadResult};
pub use crate::types::{ContentType, KeyCategory, ObjectInfo, ObjectKey, ObjectMetadata};
