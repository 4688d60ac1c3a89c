//! Object key type for stored papers and profile pictures.

use std::fmt;
use std::path::Path;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::{Error, Result};

/// Top-level key prefix grouping objects by use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeyCategory {
    /// Research-paper PDFs, partitioned by upload date.
    Papers,
    /// Profile pictures, partitioned by user id.
    Profiles,
}

/// A validated object key of the form `<category>/<partition>/<file name>`.
///
/// Keys built for uploads carry a fresh UUID suffix in the file name, so
/// uploads sharing an original file name never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    category: KeyCategory,
    partition: String,
    file_name: String,
}

impl ObjectKey {
    /// Creates a key for a research paper uploaded on the given date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the original file name is empty.
    pub fn research_paper(original_name: &str, date: Date) -> Result<Self> {
        Ok(Self {
            category: KeyCategory::Papers,
            partition: date.to_string(),
            file_name: unique_file_name(original_name, Uuid::new_v4())?,
        })
    }

    /// Creates a key for a newly uploaded profile picture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the user id or file name is invalid.
    pub fn profile_picture(user_id: &str, original_name: &str) -> Result<Self> {
        Ok(Self {
            category: KeyCategory::Profiles,
            partition: validate_user_id(user_id)?.to_string(),
            file_name: unique_file_name(original_name, Uuid::new_v4())?,
        })
    }

    /// Rebuilds the key of an already stored profile picture.
    ///
    /// Unlike [`ObjectKey::profile_picture`] the file name is used exactly as
    /// given, surrounding whitespace included.
    pub fn existing_profile_picture(user_id: &str, file_name: &str) -> Result<Self> {
        if file_name.trim().is_empty() || file_name.contains('/') {
            return Err(Error::InvalidRequest(format!(
                "Invalid profile picture file name '{}'",
                file_name
            )));
        }

        Ok(Self {
            category: KeyCategory::Profiles,
            partition: validate_user_id(user_id)?.to_string(),
            file_name: file_name.to_string(),
        })
    }

    /// Returns the key category.
    pub fn category(&self) -> KeyCategory {
        self.category
    }

    /// Returns the partition segment (upload date or user id).
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Returns the stored file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.partition, self.file_name)
    }
}

fn validate_user_id(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(Error::InvalidRequest("User id must not be empty".to_string()));
    }
    if user_id.contains('/') {
        return Err(Error::InvalidRequest(format!(
            "User id '{}' must not contain '/'",
            user_id
        )));
    }
    Ok(user_id)
}

/// Builds `<base>-<id><ext>` from the final path component of `original_name`.
fn unique_file_name(original_name: &str, id: Uuid) -> Result<String> {
    let path = Path::new(original_name.trim());
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            Error::InvalidRequest(format!("Invalid original file name '{}'", original_name))
        })?;

    Ok(match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", base, id, ext),
        None => format!("{}-{}", base, id),
    })
}
