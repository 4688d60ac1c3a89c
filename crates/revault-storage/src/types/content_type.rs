//! MIME types of stored files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// MIME type attached to an uploaded object.
///
/// Research papers are always stored as PDF; profile pictures are classified
/// by file extension, falling back to JPEG for anything unrecognized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
pub enum ContentType {
    #[strum(serialize = "application/pdf")]
    #[serde(rename = "application/pdf")]
    Pdf,
    #[default]
    #[strum(serialize = "image/jpeg")]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/png")]
    #[serde(rename = "image/png")]
    Png,
    #[strum(serialize = "image/gif")]
    #[serde(rename = "image/gif")]
    Gif,
    #[strum(serialize = "image/webp")]
    #[serde(rename = "image/webp")]
    Webp,
}

impl ContentType {
    /// Content type of research papers.
    #[must_use]
    pub fn for_document() -> Self {
        Self::Pdf
    }

    /// Content type of a profile picture, derived from its file extension.
    #[must_use]
    pub fn for_image(file_name: &str) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("png") => Self::Png,
            Some("gif") => Self::Gif,
            Some("webp") => Self::Webp,
            _ => Self::Jpeg,
        }
    }

    /// Returns the MIME type string.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this content type is an image
    #[must_use]
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}
