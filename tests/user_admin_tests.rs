// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Administrator API tests: roles, account creation, password reset and
//! account deletion.

use axum::http::StatusCode;
use contact_manager::models::Role;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

mod common;
use common::{body_json, empty_request, json_request, login};

#[tokio::test]
async fn test_admin_routes_require_administrator() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;

    for uri in ["/api/users", "/api/roles", "/api/users/new"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri, Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let response = app
        .oneshot(empty_request("GET", "/api/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_and_roles() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/roles", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let roles = body_json(response).await;
    let names: Vec<&str> = roles
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Administrator", "User"]);

    let response = app
        .oneshot(empty_request("GET", "/api/users", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 4);
    assert_eq!(users[0]["user_name"], "agrenier");
    let admin = users.iter().find(|u| u["user_name"] == "hlapointe").unwrap();
    assert_eq!(admin["role_name"], "Administrator");
}

#[tokio::test]
async fn test_create_user_with_generated_password() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;
    let role = state.db.find_role(Role::Administrator).await.unwrap().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/users/new", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let form = body_json(response).await;
    let password = form["password"].as_str().unwrap().to_string();
    assert_eq!(password.len(), 10);
    assert_eq!(form["password_confirmation"], password.as_str());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&session),
            json!({
                "user_name": "cbernier",
                "role_id": role.id,
                "password": password,
                "password_confirmation": password
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["user_name"], "cbernier");
    assert_eq!(created["role_name"], "Administrator");

    // The new account can sign in with the generated password
    login(&app, ("cbernier", password.as_str())).await;
}

#[tokio::test]
async fn test_create_user_unknown_role() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&session),
            json!({
                "user_name": "cbernier",
                "role_id": Uuid::new_v4(),
                "password": "Secret123!",
                "password_confirmation": "Secret123!"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["details"], "Role not found.");
}

#[tokio::test]
async fn test_create_user_missing_role() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&session),
            json!({
                "user_name": "cbernier",
                "password": "Secret123!",
                "password_confirmation": "Secret123!"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["role_id"][0],
        "Please provide a RoleId."
    );
}

#[tokio::test]
async fn test_reset_password_revokes_sessions() {
    let (app, state) = common::create_seeded_app().await;
    let admin_session = login(&app, common::ADMIN).await;
    let user_session = login(&app, common::USER).await;
    let user = state.db.find_user_by_name("mbouchard").await.unwrap().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/users/{}/reset-password", user.id),
            Some(&admin_session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_name"], "mbouchard");
    let new_password = body["new_password"].as_str().unwrap().to_string();

    // Old session is gone
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/contacts", Some(&user_session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // New password works
    login(&app, ("mbouchard", new_password.as_str())).await;
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;
    let user = state.db.find_user_by_name("agrenier").await.unwrap().unwrap();
    let contacts = state.db.list_contacts_for_owner(user.id).await.unwrap();
    assert_eq!(contacts.len(), 4);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/users/{}", user.id),
            Some(&session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(state.db.get_user(user.id).await.unwrap().is_none());
    assert!(state
        .db
        .list_contacts_for_owner(user.id)
        .await
        .unwrap()
        .is_empty());
    for contact in contacts {
        assert!(state
            .db
            .list_addresses_for_contact(contact.id)
            .await
            .unwrap()
            .is_empty());
    }

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/users/{}", user.id),
            Some(&session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_user_id_is_json_bad_request() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::ADMIN).await;

    for (method, uri) in [
        ("DELETE", "/api/users/not-a-uuid"),
        ("POST", "/api/users/not-a-uuid/reset-password"),
    ] {
        let response = app
            .clone()
            .oneshot(empty_request(method, uri, Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.headers()["content-type"], "application/json", "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["details"], "Invalid user id");
    }
}
