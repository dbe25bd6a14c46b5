//! Session cookie handling. The cookie carries only the session id; the
//! lists themselves stay in the server-side [`storage::SessionStore`].

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use storage::SessionId;

use crate::app_state::AppState;

/// Resolves (or starts) the caller's session, exposes its id to handlers as
/// a request extension, and issues a cookie when the session is new.
pub(crate) async fn session_layer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let candidate = cookie_value(request.headers(), &state.cookie_name);
    let (session_id, created) = state.sessions.resolve(candidate.as_deref());
    request.extensions_mut().insert(session_id);

    let mut response = next.run(request).await;
    if created {
        if let Ok(value) = HeaderValue::from_str(&set_cookie_value(&state.cookie_name, session_id)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

pub(crate) fn set_cookie_value(name: &str, session_id: SessionId) -> String {
    format!("{name}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}
