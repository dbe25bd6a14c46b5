use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use server_api::{CompletedForm, ListNameForm, TodoForm, View};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::lists_route,
};
use storage::SessionId;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

mod app_state;
mod config;
mod session;
mod views;

use app_state::AppState;
use config::load_settings;
use views::{render, respond};

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .init();

    let state = AppState::from_settings(&settings);
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        session_ttl_seconds = settings.session_ttl_seconds,
        max_sessions = settings.max_sessions,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    // Path parameters keep one name per segment position across routes.
    let pages = Router::new()
        .route("/", get(root))
        .route("/lists", get(lists_page).post(create_list))
        .route("/lists/new", get(new_list_page))
        .route("/lists/:list_id", get(list_page).post(rename_list))
        .route("/lists/:list_id/edit", get(edit_list_page))
        .route("/lists/:list_id/destroy", post(delete_list))
        .route("/lists/:list_id/todos", post(add_todo))
        .route("/lists/:list_id/complete_all", post(complete_all))
        .route("/lists/:list_id/todos/:todo_id", post(update_todo))
        .route("/lists/:list_id/todos/:todo_id/destroy", post(delete_todo))
        // Legacy singular path, kept for existing forms.
        .route("/list/:list_id/todos", post(complete_all))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_layer,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(pages)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn root() -> Redirect {
    Redirect::to(lists_route())
}

async fn lists_page(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Response, HttpError> {
    show(&state, session_id, |_| Ok(View::Lists))
}

async fn new_list_page(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Response, HttpError> {
    show(&state, session_id, |_| Ok(View::NewList))
}

async fn list_page(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
) -> Result<Response, HttpError> {
    show(&state, session_id, |session| {
        server_api::find_list(session, &list_id).map(View::List)
    })
}

async fn edit_list_page(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
) -> Result<Response, HttpError> {
    show(&state, session_id, |session| {
        server_api::find_list(session, &list_id).map(View::EditList)
    })
}

async fn create_list(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<ListNameForm>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::create_list(session, &form);
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn rename_list(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
    Form(form): Form<ListNameForm>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::rename_list(session, &list_id, &form)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn delete_list(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::delete_list(session, &list_id)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn add_todo(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
    Form(form): Form<TodoForm>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::add_todo(session, &list_id, &form)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path((list_id, todo_id)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::delete_todo(session, &list_id, &todo_id)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path((list_id, todo_id)): Path<(String, String)>,
    Form(form): Form<CompletedForm>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::update_todo(session, &list_id, &todo_id, &form)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

async fn complete_all(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(list_id): Path<String>,
    Form(form): Form<CompletedForm>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let outcome = server_api::complete_all(session, &list_id, &form)?;
            respond(session, outcome)
        })
        .map_err(http_error)
}

fn show(
    state: &AppState,
    session_id: SessionId,
    resolve: impl FnOnce(&storage::SessionState) -> Result<View, ApiError>,
) -> Result<Response, HttpError> {
    state
        .sessions
        .with_session(session_id, |session| {
            let view = resolve(&*session)?;
            render(session, view).map(IntoResponse::into_response)
        })
        .map_err(http_error)
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidLength | ErrorCode::DuplicateName => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
