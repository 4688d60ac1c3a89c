//! Object keys, content types and metadata for stored files.

mod content_type;
mod object_info;
mod object_key;
mod object_metadata;

pub use content_type::ContentType;
pub use object_info::ObjectInfo;
pub use object_key::{KeyCategory, ObjectKey};
pub use object_metadata::{DEFAULT_CACHE_CONTROL, ObjectMetadata};
