//! File storage facade for research papers and profile pictures.
//!
//! [`FileStorage`] combines the bucket and object operations into the
//! use-case level API: uploads gated by a connectivity check and verified
//! afterwards, best-effort deletion and listing, and bucket provisioning.

mod file_storage;

pub use file_storage::{FileStorage, UploadResult};
