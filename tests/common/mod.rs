// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use contact_manager::config::Config;
use contact_manager::db::{seed, Db, FirestoreStore};
use contact_manager::routes::create_router;
use contact_manager::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("hlapointe", "Admin123!");
pub const USER: (&str, &str) = ("mbouchard", "User123!A");
pub const OTHER_USER: (&str, &str) = ("jsimard", "User123!A");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore store pointed at the emulator.
#[allow(dead_code)]
pub async fn test_store() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over an empty in-memory store with roles in place.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, Db::in_memory()));
    state
        .identity
        .ensure_roles()
        .await
        .expect("Failed to create roles");
    (create_router(state.clone()), state)
}

/// Create a test app holding the demo accounts and contacts.
#[allow(dead_code)]
pub async fn create_seeded_app() -> (Router, Arc<AppState>) {
    let (app, state) = create_test_app().await;
    seed::seed_demo_data(&state.db, &state.identity)
        .await
        .expect("Failed to seed demo data");
    (app, state)
}

/// Build a JSON request, optionally carrying a session cookie.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodiless request, optionally carrying a session cookie.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON (`Value::Null` when empty).
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).unwrap()
}

/// `Set-Cookie` header values of a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Sign in and return a `Cookie` header value carrying the session.
#[allow(dead_code)]
pub async fn login(app: &Router, (user_name, password): (&str, &str)) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/account/login",
            None,
            serde_json::json!({ "user_name": user_name, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login failed for {user_name}");

    let session = set_cookie_headers(&response)
        .into_iter()
        .find(|value| value.starts_with("cm_session="))
        .expect("missing session cookie");
    session
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Id of the first contact (by last name) of the signed-in user.
#[allow(dead_code)]
pub async fn first_contact_id(app: &Router, session: &str) -> String {
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/contacts", Some(session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await[0]["id"]
        .as_str()
        .expect("contact id")
        .to_string()
}
