//! Persistent login session state.
//!
//! The CLI keeps its bearer token, the logged-in user profile and the last
//! chosen patient filter in a small JSON file between invocations. A
//! missing file simply means "not logged in".

use std::fs;
use std::path::Path;

use posyandu_types::{PatientType, Role};
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

/// The profile the backend returns at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nama_lengkap: String,
    pub role: Role,
}

/// On-disk session state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_patient_filter: Option<PatientType>,
}

impl Session {
    /// Load the session from `path`. A missing file yields an empty
    /// session; a present but unreadable or malformed file is an error.
    pub fn load(path: &Path) -> ClientResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(ClientError::SessionRead(err)),
        };
        serde_json::from_str(&raw).map_err(ClientError::Deserialization)
    }

    /// Write the session to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ClientError::SessionDirCreation)?;
            }
        }
        let raw = serde_json::to_string_pretty(self).map_err(ClientError::Serialization)?;
        fs::write(path, raw).map_err(ClientError::SessionWrite)?;
        tracing::debug!(path = %path.display(), "session saved");
        Ok(())
    }

    /// Remove the session file. Absence is not an error, so logout always
    /// leaves a clean state.
    pub fn clear(path: &Path) -> ClientResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::SessionWrite(err)),
        }
    }

    /// The bearer token, or [`ClientError::MissingToken`] when logged out.
    pub fn bearer_token(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::MissingToken)
    }

    /// The role of the logged-in user; [`Role::Unknown`] when logged out.
    pub fn role(&self) -> Role {
        self.user.as_ref().map(|u| u.role).unwrap_or(Role::Unknown)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}
