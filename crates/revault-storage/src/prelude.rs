//! Commonly used items from revault-storage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use revault_storage::prelude::*;
//! ```

// Client and credentials
pub use crate::client::{CredentialKind, CredentialSource, GcsClient, GcsConfig};
// Low-level operations
pub use crate::operations::{BucketOperations, ObjectOperations};
// Facade
pub use crate::storage::{FileStorage, UploadResult};
// Key and metadata types
pub use crate::types::{ContentType, KeyCategory, ObjectInfo, ObjectKey, ObjectMetadata};
pub use crate::{Error, Result};
