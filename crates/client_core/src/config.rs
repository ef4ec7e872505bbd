use std::{collections::HashMap, fs, path::Path, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_UPLOAD_FIELD: &str = "file";
pub const SETTINGS_FILE: &str = "tumordetect.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub request_timeout_secs: Option<u64>,
    pub upload_field: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: option_env!("TUMORDETECT_API_BASE")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
            request_timeout_secs: None,
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// Defaults, then the optional settings file, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in &file_cfg {
                    match toml_value_text(value) {
                        Some(text) => apply_setting(&mut settings, key, &text),
                        None => {
                            warn!(key = %key, "ignoring non-scalar value in {}", path.display())
                        }
                    }
                }
            }
            Err(err) => warn!("ignoring unreadable settings file {}: {err}", path.display()),
        },
        Err(err) => debug!("no settings file at {}: {err}", path.display()),
    }

    for name in ["API_BASE", "APP__API_BASE"] {
        if let Some(v) = env(name) {
            apply_setting(&mut settings, "api_base", &v);
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        apply_setting(&mut settings, "request_timeout_secs", &v);
    }
    if let Some(v) = env("APP__UPLOAD_FIELD") {
        apply_setting(&mut settings, "upload_field", &v);
    }

    settings
}

fn toml_value_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

fn apply_setting(settings: &mut Settings, key: &str, value: &str) {
    let value = value.trim();
    match key {
        "api_base" if !value.is_empty() => settings.api_base = value.to_string(),
        "upload_field" if !value.is_empty() => settings.upload_field = value.to_string(),
        "request_timeout_secs" => match value.parse::<u64>() {
            Ok(0) => settings.request_timeout_secs = None,
            Ok(secs) => settings.request_timeout_secs = Some(secs),
            Err(err) => warn!(value, "ignoring invalid request_timeout_secs: {err}"),
        },
        "api_base" | "upload_field" => warn!(key, "ignoring empty setting"),
        other => warn!(key = other, "ignoring unknown setting"),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("API base URL '{0}' must be an http or https URL")]
    UnsupportedBaseUrl(String),
    #[error("upload field name must not be empty")]
    EmptyUploadField,
}

/// Endpoint configuration injected into the analysis client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base: Url,
    request_timeout: Option<Duration>,
    upload_field: String,
}

impl ApiConfig {
    pub fn new(api_base: &str) -> Result<Self, ConfigError> {
        let trimmed = api_base.trim();
        let mut base = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            value: trimmed.to_string(),
            source,
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(trimmed.to_string()));
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            base,
            request_timeout: None,
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let config = Self::new(&settings.api_base)?
            .with_request_timeout(settings.request_timeout_secs.map(Duration::from_secs));
        config.with_upload_field(&settings.upload_field)
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_upload_field(mut self, field: &str) -> Result<Self, ConfigError> {
        let field = field.trim();
        if field.is_empty() {
            return Err(ConfigError::EmptyUploadField);
        }
        self.upload_field = field.to_string();
        Ok(self)
    }

    /// Base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn upload_field(&self) -> &str {
        &self.upload_field
    }

    pub fn upload_url(&self) -> Url {
        self.endpoint(&["upload"])
    }

    pub fn health_url(&self) -> Url {
        self.endpoint(&["health"])
    }

    /// Resolves a server-provided image reference to a fetchable URL.
    ///
    /// Absolute http(s) URLs pass through. Anything else is reduced to its
    /// last path component, whichever separator the server used, and served
    /// from `{api_base}/processed_images/`.
    pub fn processed_image_url(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(absolute) = Url::parse(raw) {
            if matches!(absolute.scheme(), "http" | "https") {
                return Some(absolute);
            }
        }
        let name = image_file_name(raw)?;
        Some(self.endpoint(&["processed_images", name]))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Last non-empty path component of `raw`; `.` and `..` name no file.
pub fn image_file_name(raw: &str) -> Option<&str> {
    raw.rsplit(|c| c == '\\' || c == '/')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .filter(|segment| !matches!(*segment, "." | ".."))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
