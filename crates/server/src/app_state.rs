use chrono::Duration;
use storage::SessionStore;

use crate::config::Settings;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sessions: SessionStore,
    pub(crate) cookie_name: String,
}

impl AppState {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            sessions: SessionStore::new(
                Duration::seconds(settings.session_ttl_seconds),
                settings.max_sessions,
            ),
            cookie_name: settings.session_cookie_name.clone(),
        }
    }
}
