//! Credential resolution for the storage client.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use google_cloud_storage::client::ClientConfig;
use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};

use super::gcs_config::{DEFAULT_PROJECT_ID, GcsConfig};
use crate::{Error, Result};

const SERVICE_ACCOUNT_TYPE: &str = "service_account";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Authentication mode selected for a client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialKind {
    KeyFile,
    EncodedServiceAccount,
    ServiceAccount,
    ApplicationDefault,
}

/// Service-account fields read out of an encoded credentials blob.
#[derive(Deserialize)]
struct ServiceAccountKey {
    project_id: Option<String>,
}

/// Credential material the storage client authenticates with.
///
/// Exactly one source is selected per client handle. Every variant carries
/// only the fields its authentication mode needs.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Local key file, used in development.
    KeyFile { path: PathBuf },
    /// Service-account JSON decoded from a base64 blob.
    EncodedServiceAccount { json: String, project_id: String },
    /// Service-account credentials supplied as discrete fields.
    ServiceAccount {
        project_id: String,
        client_email: String,
        private_key: String,
    },
    /// Ambient credentials of the hosting environment.
    ApplicationDefault { project_id: String },
}

impl CredentialSource {
    /// Selects the credential source for the given configuration.
    ///
    /// Branches are evaluated in order and the first satisfied one wins:
    ///
    /// 1. development environment and the key file exists
    /// 2. an encoded service-account blob is present and non-empty
    /// 3. project id, client email and private key are all present and non-empty
    /// 4. application default credentials
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credentials`] if the encoded blob is not valid base64
    /// or does not contain a service-account JSON object.
    pub fn resolve(config: &GcsConfig) -> Result<Self> {
        if config.is_development() && config.key_file().is_file() {
            return Ok(Self::key_file(config.key_file()));
        }

        if let Some(encoded) = non_empty(config.credentials_base64.as_deref()) {
            return Self::from_base64(encoded);
        }

        if let (Some(project_id), Some(client_email), Some(private_key)) = (
            non_empty(config.project_id.as_deref()),
            non_empty(config.client_email.as_deref()),
            non_empty(config.private_key.as_deref()),
        ) {
            return Ok(Self::service_account(project_id, client_email, private_key));
        }

        Ok(Self::ApplicationDefault {
            project_id: DEFAULT_PROJECT_ID.to_string(),
        })
    }

    /// Creates a key file source.
    pub fn key_file(path: impl AsRef<Path>) -> Self {
        Self::KeyFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Decodes a base64 service-account blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credentials`] if decoding or JSON parsing fails.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Credentials(format!("invalid base64 credentials: {e}")))?;
        let json = String::from_utf8(decoded)
            .map_err(|e| Error::Credentials(format!("credentials are not valid UTF-8: {e}")))?;
        let key: ServiceAccountKey = serde_json::from_str(&json)
            .map_err(|e| Error::Credentials(format!("invalid service account JSON: {e}")))?;

        let project_id = key
            .project_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        Ok(Self::EncodedServiceAccount { json, project_id })
    }

    /// Creates a discrete service-account source.
    ///
    /// Escaped `\n` sequences in the private key are replaced with newlines.
    pub fn service_account(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl AsRef<str>,
    ) -> Self {
        Self::ServiceAccount {
            project_id: project_id.into(),
            client_email: client_email.into(),
            private_key: private_key.as_ref().replace("\\n", "\n"),
        }
    }

    /// Returns the authentication mode of this source.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::KeyFile { .. } => CredentialKind::KeyFile,
            Self::EncodedServiceAccount { .. } => CredentialKind::EncodedServiceAccount,
            Self::ServiceAccount { .. } => CredentialKind::ServiceAccount,
            Self::ApplicationDefault { .. } => CredentialKind::ApplicationDefault,
        }
    }

    /// Returns the project id known before authentication, if any.
    ///
    /// Key files are only read during authentication, so their project id is
    /// taken from the authenticated client configuration instead.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::KeyFile { .. } => None,
            Self::EncodedServiceAccount { project_id, .. }
            | Self::ServiceAccount { project_id, .. }
            | Self::ApplicationDefault { project_id } => Some(project_id),
        }
    }

    /// Authenticates the given client configuration with this source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the credentials are rejected or, for
    /// application default credentials, none can be found.
    pub(crate) async fn authenticate(&self, config: ClientConfig) -> Result<ClientConfig> {
        let config = match self {
            Self::KeyFile { path } => {
                let file =
                    CredentialsFile::new_from_file(path.to_string_lossy().into_owned()).await?;
                config.with_credentials(file).await?
            }
            Self::EncodedServiceAccount { json, .. } => {
                let file = CredentialsFile::new_from_str(json).await?;
                config.with_credentials(file).await?
            }
            Self::ServiceAccount {
                project_id,
                client_email,
                private_key,
            } => {
                let json = serde_json::json!({
                    "type": SERVICE_ACCOUNT_TYPE,
                    "project_id": project_id,
                    "client_email": client_email,
                    "private_key": private_key,
                    "token_uri": TOKEN_URI,
                });
                let file = CredentialsFile::new_from_str(&json.to_string()).await?;
                config.with_credentials(file).await?
            }
            Self::ApplicationDefault { .. } => config.with_auth().await?,
        };

        Ok(config)
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyFile { path } => f.debug_struct("KeyFile").field("path", path).finish(),
            Self::EncodedServiceAccount { project_id, .. } => f
                .debug_struct("EncodedServiceAccount")
                .field("json", &"***")
                .field("project_id", project_id)
                .finish(),
            Self::ServiceAccount {
                project_id,
                client_email,
                ..
            } => f
                .debug_struct("ServiceAccount")
                .field("project_id", project_id)
                .field("client_email", client_email)
                .field("private_key", &"***")
                .finish(),
            Self::ApplicationDefault { project_id } => f
                .debug_struct("ApplicationDefault")
                .field("project_id", project_id)
                .finish(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
