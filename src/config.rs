//! Service configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL, always ending in exactly one `/`.
    pub backend_base_url: String,
    pub port: u16,
    pub cookie_secure: bool,
    pub timeouts: BackendTimeouts,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `SERVER_ADDRESS`: backend base URL (`http://` or `https://`)
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: inferred from the `SERVER_ADDRESS` scheme when absent
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 15
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if `SERVER_ADDRESS` is missing or malformed, or if
    /// `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_address = std::env::var("SERVER_ADDRESS").map_err(|_| ConfigError::Missing("SERVER_ADDRESS"))?;
        let backend_base_url = normalize_base_url(&raw_address)?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid { var: "PORT", reason: e.to_string() })?,
            Err(_) => DEFAULT_PORT,
        };

        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| backend_base_url.starts_with("https://"));

        let timeouts = BackendTimeouts {
            request_secs: env_parse_u64("BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { backend_base_url, port, cookie_secure, timeouts })
    }
}

/// Trim the address and force a single trailing slash so relative backend
/// paths (`auth/signin`) can be appended directly.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: "SERVER_ADDRESS",
            reason: format!("expected an http(s) URL, got '{trimmed}'"),
        });
    }
    let host = trimmed.split_once("://").map_or("", |(_, rest)| rest);
    if host.is_empty() {
        return Err(ConfigError::Invalid { var: "SERVER_ADDRESS", reason: "missing host".into() });
    }
    Ok(format!("{trimmed}/"))
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
