//! Bucket and object operations.
//!
//! Each operation maps to a single storage API call wrapped in structured
//! logging and error translation. Backend 404 responses surface as
//! [`Error::NotFound`](crate::Error::NotFound).

mod bucket_operations;
mod object_operations;

pub use bucket_operations::{
    BucketOperations, DEFAULT_LOCATION, DEFAULT_STORAGE_CLASS, PUBLIC_MEMBER, PUBLIC_READ_ROLE,
};
pub use object_operations::ObjectOperations;
