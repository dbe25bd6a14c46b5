use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::Flash;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ListStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionId)
    }
}

/// Everything one browsing session owns: its lists and the pending status
/// message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub lists: ListStore,
    pub flash: Option<Flash>,
}

impl SessionState {
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.flash = Some(Flash::success(message));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.flash = Some(Flash::error(message));
    }

    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }
}

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::default(),
            last_seen: now,
        }
    }
}

/// Process-wide registry of live sessions. Sessions idle for longer than the
/// TTL are dropped, which discards their lists. When the registry is full the
/// least recently seen session is evicted to make room.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<SessionId, SessionEntry>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Maps a cookie value to a live session. Returns the id to use and
    /// whether it was newly created (and so needs a fresh cookie).
    pub fn resolve(&self, candidate: Option<&str>) -> (SessionId, bool) {
        self.resolve_at(candidate, Utc::now())
    }

    pub(crate) fn resolve_at(&self, candidate: Option<&str>, now: DateTime<Utc>) -> (SessionId, bool) {
        let mut sessions = self.lock();
        prune(&mut sessions, self.ttl, now);

        if let Some(id) = candidate.and_then(|raw| raw.parse::<SessionId>().ok()) {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (id, false);
            }
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!(session_id = %oldest, max_sessions = self.max_sessions, "evicted idle session at capacity");
        }

        let id = SessionId::generate();
        sessions.insert(id, SessionEntry::fresh(now));
        info!(session_id = %id, live_sessions = sessions.len(), "session started");
        (id, true)
    }

    /// Runs `f` against the session's state while holding the registry lock,
    /// so one request's mutation is applied as a whole. A session that expired
    /// since it was resolved starts over empty.
    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let now = Utc::now();
        let mut sessions = self.lock();
        let entry = sessions
            .entry(id)
            .or_insert_with(|| SessionEntry::fresh(now));
        entry.last_seen = now;
        f(&mut entry.state)
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self, id: SessionId) -> Option<SessionState> {
        self.lock().get(&id).map(|entry| entry.state.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn prune(sessions: &mut HashMap<SessionId, SessionEntry>, ttl: Duration, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, entry| now - entry.last_seen <= ttl);
    let removed = before - sessions.len();
    if removed > 0 {
        debug!(removed, remaining = sessions.len(), "expired idle sessions");
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
