//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in test harnesses.

use crate::{ClientError, ClientResult};
use posyandu_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Default backend address when no override is supplied.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Default session file name, resolved relative to the user's home
/// directory when possible.
pub const SESSION_FILE_NAME: &str = ".posyandu-session.json";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: NonEmptyText,
    session_path: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL must be an `http://` or `https://` address; a trailing
    /// slash is stripped so endpoint paths can always start with `/`.
    pub fn new(api_base_url: impl Into<String>, session_path: PathBuf) -> ClientResult<Self> {
        let api_base_url = api_base_url.into();
        let trimmed = api_base_url.trim();

        if trimmed.is_empty() {
            return Err(ClientError::InvalidInput(
                "API base URL cannot be empty".into(),
            ));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ClientError::InvalidInput(format!(
                "API base URL must start with http:// or https:// (got '{trimmed}')"
            )));
        }

        let api_base_url = NonEmptyText::new(trimmed.trim_end_matches('/'))
            .map_err(|err| ClientError::InvalidInput(err.to_string()))?;

        Ok(Self {
            api_base_url,
            session_path,
        })
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_str()
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }
}

/// Resolve the session file path without reading environment variables.
///
/// If `override_path` is provided it is used verbatim. Otherwise the file is
/// placed in `home_dir` when available, falling back to the current working
/// directory.
pub fn resolve_session_path(
    override_path: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    match home_dir {
        Some(home) => home.join(SESSION_FILE_NAME),
        None => PathBuf::from(SESSION_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let cfg = CoreConfig::new("http://localhost:3000/", PathBuf::from("s.json")).unwrap();
        assert_eq!(cfg.api_base_url(), "http://localhost:3000");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(CoreConfig::new("localhost:3000", PathBuf::from("s.json")).is_err());
        assert!(CoreConfig::new("   ", PathBuf::from("s.json")).is_err());
    }

    #[test]
    fn session_path_prefers_override_then_home() {
        let explicit = resolve_session_path(Some(PathBuf::from("/tmp/x.json")), None);
        assert_eq!(explicit, PathBuf::from("/tmp/x.json"));

        let home = resolve_session_path(None, Some(PathBuf::from("/home/kader")));
        assert_eq!(home, PathBuf::from("/home/kader").join(SESSION_FILE_NAME));

        let cwd = resolve_session_path(None, None);
        assert_eq!(cwd, PathBuf::from(SESSION_FILE_NAME));
    }
}
