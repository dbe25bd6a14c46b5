use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use crate::config::Settings;
use serde_json::Value;
use tower::ServiceExt;

fn test_app() -> Router {
    let settings = Settings::default();
    build_router(
        Arc::new(AppState::from_settings(&settings)),
        settings.max_body_bytes,
    )
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).expect("request")
}

fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii cookie");
    raw.split(';').next().expect("cookie pair").to_string()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("ascii location")
}

async fn json_body(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Opens a session by visiting the index and returns its cookie.
async fn open_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(get_request("/lists", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("response")
}

#[tokio::test]
async fn healthz_reports_ok_without_starting_a_session() {
    let app = test_app();
    let response = send(&app, get_request("/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn root_redirects_to_lists() {
    let app = test_app();
    let response = send(&app, get_request("/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lists");
}

#[tokio::test]
async fn create_list_then_flash_is_shown_once() {
    let app = test_app();
    let cookie = open_session(&app).await;

    let response = send(&app, post_form("/lists", Some(&cookie), "list_name=Groceries")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lists");
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let page = json_body(send(&app, get_request("/lists", Some(&cookie))).await).await;
    assert_eq!(page["flash"]["kind"], "success");
    assert_eq!(page["flash"]["message"], server_api::LIST_CREATED);
    assert_eq!(page["lists"][0]["name"], "Groceries");
    assert_eq!(page["lists"][0]["href"], "/lists/0");

    let page = json_body(send(&app, get_request("/lists", Some(&cookie))).await).await;
    assert!(page["flash"].is_null());
}

#[tokio::test]
async fn invalid_list_name_rerenders_new_list_form() {
    let app = test_app();
    let cookie = open_session(&app).await;

    let response = send(&app, post_form("/lists", Some(&cookie), "list_name=++")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert_eq!(page["action"], "/lists");
    assert_eq!(page["flash"]["kind"], "error");
    assert_eq!(page["flash"]["message"], storage::INVALID_LENGTH_MESSAGE);
}

#[tokio::test]
async fn duplicate_list_name_is_rejected() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=A")).await;

    let response = send(&app, post_form("/lists", Some(&cookie), "list_name=A")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert_eq!(page["flash"]["message"], storage::DUPLICATE_LIST_MESSAGE);
}

#[tokio::test]
async fn sessions_do_not_share_lists() {
    let app = test_app();
    let alice = open_session(&app).await;
    let bob = open_session(&app).await;
    assert_ne!(alice, bob);

    send(&app, post_form("/lists", Some(&alice), "list_name=Secret")).await;
    let page = json_body(send(&app, get_request("/lists", Some(&bob))).await).await;
    assert_eq!(page["lists"].as_array().expect("lists").len(), 0);
}

#[tokio::test]
async fn unknown_cookie_gets_a_fresh_session() {
    let app = test_app();
    let response = send(
        &app,
        get_request("/lists", Some("todo_session=00000000-0000-0000-0000-000000000000")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn todo_lifecycle_through_routes() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=Groceries")).await;

    let response = send(&app, post_form("/lists/0/todos", Some(&cookie), "todo=Milk")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lists/0");
    send(&app, post_form("/lists/0/todos", Some(&cookie), "todo=Eggs")).await;

    let response = send(
        &app,
        post_form("/lists/0/todos/0", Some(&cookie), "completed=true"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = json_body(send(&app, get_request("/lists/0", Some(&cookie))).await).await;
    assert_eq!(page["flash"]["message"], server_api::TODO_UPDATED);
    assert_eq!(page["list"]["todos_remaining"], 1);
    assert_eq!(page["todos"][0]["name"], "Eggs");
    assert_eq!(page["todos"][0]["todo_id"], 1);
    assert_eq!(page["todos"][1]["name"], "Milk");
    assert_eq!(page["todos"][1]["destroy_href"], "/lists/0/todos/0/destroy");

    let response = send(
        &app,
        post_form("/lists/0/todos/1/destroy", Some(&cookie), ""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = json_body(send(&app, get_request("/lists/0", Some(&cookie))).await).await;
    assert_eq!(page["list"]["complete"], true);
    assert_eq!(page["list"]["class"], "complete");
}

#[tokio::test]
async fn blank_todo_rerenders_list_page() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=Groceries")).await;

    let response = send(&app, post_form("/lists/0/todos", Some(&cookie), "todo=")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert_eq!(page["list"]["name"], "Groceries");
    assert_eq!(page["flash"]["kind"], "error");
}

#[tokio::test]
async fn both_complete_all_paths_update_every_todo() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=Chores")).await;
    for todo in ["todo=Dishes", "todo=Laundry"] {
        send(&app, post_form("/lists/0/todos", Some(&cookie), todo)).await;
    }

    let response = send(&app, post_form("/list/0/todos", Some(&cookie), "completed=true")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let page = json_body(send(&app, get_request("/lists/0", Some(&cookie))).await).await;
    assert_eq!(page["flash"]["message"], server_api::ALL_TODOS_UPDATED);
    assert_eq!(page["list"]["complete"], true);

    send(
        &app,
        post_form("/lists/0/complete_all", Some(&cookie), "completed=false"),
    )
    .await;
    let page = json_body(send(&app, get_request("/lists/0", Some(&cookie))).await).await;
    assert_eq!(page["list"]["todos_remaining"], 2);
}

#[tokio::test]
async fn rename_and_delete_list() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=Work")).await;

    let page = json_body(send(&app, get_request("/lists/0/edit", Some(&cookie))).await).await;
    assert_eq!(page["current_name"], "Work");
    assert_eq!(page["action"], "/lists/0");

    let response = send(&app, post_form("/lists/0", Some(&cookie), "list_name=Work")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert_eq!(page["flash"]["message"], storage::DUPLICATE_LIST_MESSAGE);

    let response = send(&app, post_form("/lists/0", Some(&cookie), "list_name=Office")).await;
    assert_eq!(location(&response), "/lists/0");

    let response = send(&app, post_form("/lists/0/destroy", Some(&cookie), "")).await;
    assert_eq!(location(&response), "/lists");
    let page = json_body(send(&app, get_request("/lists", Some(&cookie))).await).await;
    assert_eq!(page["flash"]["message"], server_api::LIST_DELETED);
    assert_eq!(page["lists"].as_array().expect("lists").len(), 0);
}

#[tokio::test]
async fn new_list_page_is_not_shadowed_by_list_route() {
    let app = test_app();
    let cookie = open_session(&app).await;
    let response = send(&app, get_request("/lists/new", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["action"], "/lists");
}

#[tokio::test]
async fn out_of_range_and_malformed_ids_are_not_found() {
    let app = test_app();
    let cookie = open_session(&app).await;
    send(&app, post_form("/lists", Some(&cookie), "list_name=Only")).await;

    for request in [
        get_request("/lists/1", Some(&cookie)),
        get_request("/lists/abc/edit", Some(&cookie)),
        post_form("/lists/5", Some(&cookie), "list_name=Renamed"),
        post_form("/lists/5/destroy", Some(&cookie), ""),
        post_form("/lists/5/todos", Some(&cookie), "todo=Milk"),
        post_form("/lists/0/todos/0", Some(&cookie), "completed=true"),
        post_form("/lists/0/todos/3/destroy", Some(&cookie), ""),
        post_form("/list/9/todos", Some(&cookie), "completed=true"),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = json_body(response).await;
        assert_eq!(error["code"], "not_found");
    }
}

#[tokio::test]
async fn deleting_a_list_shifts_later_list_urls() {
    let app = test_app();
    let cookie = open_session(&app).await;
    for name in ["list_name=First", "list_name=Second"] {
        send(&app, post_form("/lists", Some(&cookie), name)).await;
    }

    send(&app, post_form("/lists/0/destroy", Some(&cookie), "")).await;

    let page = json_body(send(&app, get_request("/lists/0", Some(&cookie))).await).await;
    assert_eq!(page["list"]["name"], "Second");
    let response = send(&app, get_request("/lists/1", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_lists_sort_after_open_ones() {
    let app = test_app();
    let cookie = open_session(&app).await;
    for name in ["list_name=Done", "list_name=Open"] {
        send(&app, post_form("/lists", Some(&cookie), name)).await;
    }
    send(&app, post_form("/lists/0/todos", Some(&cookie), "todo=Only")).await;
    send(&app, post_form("/lists/0/todos/0", Some(&cookie), "completed=true")).await;

    let page = json_body(send(&app, get_request("/lists", Some(&cookie))).await).await;
    assert_eq!(page["lists"][0]["name"], "Open");
    assert_eq!(page["lists"][0]["list_id"], 1);
    assert_eq!(page["lists"][1]["name"], "Done");
    assert_eq!(page["lists"][1]["list_id"], 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let settings = Settings {
        max_body_bytes: 64,
        ..Settings::default()
    };
    let app = build_router(
        Arc::new(AppState::from_settings(&settings)),
        settings.max_body_bytes,
    );
    let cookie = open_session(&app).await;
    let form = format!("list_name={}", "x".repeat(200));
    let response = send(&app, post_form("/lists", Some(&cookie), &form)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
