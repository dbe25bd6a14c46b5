use std::fs;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const SETTINGS_FILE: &str = "server.toml";
const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub session_cookie_name: String,
    pub session_ttl_seconds: i64,
    pub max_sessions: usize,
    pub max_body_bytes: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:4567".into(),
            session_cookie_name: "todo_session".into(),
            session_ttl_seconds: 24 * 60 * 60,
            max_sessions: 10_000,
            max_body_bytes: 16 * 1024,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Keys accepted in `server.toml`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    session_cookie: Option<String>,
    session_ttl_seconds: Option<i64>,
    max_sessions: Option<usize>,
    max_body_bytes: Option<usize>,
    log_filter: Option<String>,
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment variables. Values that
/// fail to parse or fall out of range are skipped.
pub(crate) fn settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file_contents.and_then(|raw| toml::from_str::<FileSettings>(raw).ok()) {
        if let Some(v) = file_cfg.bind_addr {
            settings.server_bind = v;
        }
        if let Some(v) = file_cfg.session_cookie {
            settings.session_cookie_name = v;
        }
        if let Some(v) = file_cfg.session_ttl_seconds.filter(|v| valid_ttl(*v)) {
            settings.session_ttl_seconds = v;
        }
        if let Some(v) = file_cfg.max_sessions.filter(|v| *v > 0) {
            settings.max_sessions = v;
        }
        if let Some(v) = file_cfg.max_body_bytes {
            settings.max_body_bytes = v;
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__SESSION_COOKIE").filter(|v| !v.trim().is_empty()) {
        settings.session_cookie_name = v.trim().to_string();
    }

    if let Some(parsed) = env("APP__SESSION_TTL_SECONDS")
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| valid_ttl(*v))
    {
        settings.session_ttl_seconds = parsed;
    }

    if let Some(parsed) = env("APP__MAX_SESSIONS")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
    {
        settings.max_sessions = parsed;
    }

    if let Some(parsed) = env("APP__MAX_BODY_BYTES").and_then(|v| v.parse::<usize>().ok()) {
        settings.max_body_bytes = parsed;
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }

    settings
}

/// A session TTL must be positive and at most one year.
fn valid_ttl(seconds: i64) -> bool {
    (1..=MAX_SESSION_TTL_SECONDS).contains(&seconds)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
