//! Metadata attached to uploaded objects.

use std::collections::{BTreeMap, HashMap};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::ContentType;

/// Cache directive for public objects (one year).
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";

const TAG_UPLOADED_AT: &str = "uploadedAt";
const TAG_ORIGINAL_NAME: &str = "originalName";
const TAG_DOCUMENT_TYPE: &str = "documentType";
const TAG_USER_ID: &str = "userId";
const RESEARCH_PAPER: &str = "research-paper";

/// Content type, cache directive and descriptive tags of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// MIME type of the object.
    pub content_type: ContentType,
    /// Cache-Control directive served with the object.
    pub cache_control: String,
    /// Custom key/value tags.
    pub tags: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Creates metadata with the default cache directive and the common tags.
    pub fn new(content_type: ContentType, original_name: &str, uploaded_at: Timestamp) -> Self {
        let tags = BTreeMap::from([
            (TAG_UPLOADED_AT.to_string(), uploaded_at.to_string()),
            (TAG_ORIGINAL_NAME.to_string(), original_name.to_string()),
        ]);

        Self {
            content_type,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            tags,
        }
    }

    /// Metadata of an uploaded research paper.
    pub fn research_paper(original_name: &str, uploaded_at: Timestamp) -> Self {
        Self::new(ContentType::for_document(), original_name, uploaded_at)
            .with_tag(TAG_DOCUMENT_TYPE, RESEARCH_PAPER)
    }

    /// Metadata of an uploaded profile picture.
    pub fn profile_picture(original_name: &str, user_id: &str, uploaded_at: Timestamp) -> Self {
        Self::new(ContentType::for_image(original_name), original_name, uploaded_at)
            .with_tag(TAG_USER_ID, user_id)
    }

    /// Sets the cache directive.
    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    /// Adds a custom tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Returns the original file name tag.
    pub fn original_name(&self) -> Option<&str> {
        self.tags.get(TAG_ORIGINAL_NAME).map(String::as_str)
    }

    /// Returns the parsed upload timestamp tag.
    pub fn uploaded_at(&self) -> Option<Timestamp> {
        self.tags.get(TAG_UPLOADED_AT).and_then(|s| s.parse().ok())
    }

    /// Converts the tags to the map sent with the object.
    pub fn to_hashmap(&self) -> HashMap<String, String> {
        self.tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
