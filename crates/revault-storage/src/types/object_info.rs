//! Information about stored objects.

use std::collections::HashMap;

use google_cloud_storage::http::objects::Object;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Information about a stored object, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Bucket containing the object.
    pub bucket: String,
    /// Object size in bytes.
    pub size: u64,
    /// Content type, if recorded.
    pub content_type: Option<String>,
    /// Cache-Control directive, if recorded.
    pub cache_control: Option<String>,
    /// Base64 encoded CRC32C checksum computed by the backend.
    pub crc32c: Option<String>,
    /// Custom metadata tags.
    pub metadata: HashMap<String, String>,
    /// Creation time.
    pub created_at: Option<Timestamp>,
    /// Last metadata update time.
    pub updated_at: Option<Timestamp>,
    /// Content generation.
    pub generation: i64,
}

impl From<Object> for ObjectInfo {
    fn from(object: Object) -> Self {
        Self {
            created_at: object
                .time_created
                .and_then(|dt| Timestamp::new(dt.unix_timestamp(), dt.nanosecond() as i32).ok()),
            updated_at: object
                .updated
                .and_then(|dt| Timestamp::new(dt.unix_timestamp(), dt.nanosecond() as i32).ok()),
            key: object.name,
            bucket: object.bucket,
            size: u64::try_from(object.size).unwrap_or_default(),
            content_type: object.content_type,
            cache_control: object.cache_control,
            crc32c: object.crc32c,
            metadata: object.metadata.unwrap_or_default(),
            generation: object.generation,
        }
    }
}
