use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::session::SessionIdPolicy;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/query";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid query endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("query endpoint '{0}' must use http or https")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    /// No timeout unless set; an outstanding request runs to completion or failure.
    pub request_timeout_ms: Option<u64>,
    pub session_id_policy: SessionIdPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            request_timeout_ms: None,
            session_id_policy: SessionIdPolicy::default(),
        }
    }
}

impl ClientSettings {
    pub fn endpoint_url(&self) -> Result<Url, SettingsError> {
        let url = Url::parse(self.endpoint.trim()).map_err(|source| {
            SettingsError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                source,
            }
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(SettingsError::UnsupportedScheme(self.endpoint.clone())),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    endpoint: Option<String>,
    request_timeout_ms: Option<u64>,
    session_id_policy: Option<SessionIdPolicy>,
}

/// Defaults, then the optional TOML file, then process environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_settings`], with environment lookups routed through `lookup`.
pub fn load_settings_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();

    if let Some(path) = path {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: display.clone(),
            source,
        })?;
        let file_cfg: SettingsFile = toml::from_str(&raw).map_err(|source| {
            SettingsError::Parse {
                path: display,
                source,
            }
        })?;
        merge_file(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, lookup);
    settings.endpoint_url()?;
    Ok(settings)
}

fn merge_file(settings: &mut ClientSettings, file_cfg: SettingsFile) {
    if let Some(v) = file_cfg.endpoint {
        settings.endpoint = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = Some(v);
    }
    if let Some(v) = file_cfg.session_id_policy {
        settings.session_id_policy = v;
    }
}

pub(crate) fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CHAT_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = lookup("APP__ENDPOINT") {
        settings.endpoint = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_ms = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_MS"),
        }
    }

    if let Some(v) = lookup("APP__SESSION_ID_POLICY") {
        match v.trim() {
            "accept_rotation" => settings.session_id_policy = SessionIdPolicy::AcceptRotation,
            "keep_first" => settings.session_id_policy = SessionIdPolicy::KeepFirst,
            _ => warn!(value = %v, "ignoring unknown APP__SESSION_ID_POLICY"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
