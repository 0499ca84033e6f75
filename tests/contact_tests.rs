// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact API tests: listing, CRUD, validation and ownership.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

mod common;
use common::{body_json, empty_request, first_contact_id, json_request, login};

fn new_contact() -> serde_json::Value {
    json!({
        "first_name": "Zoé",
        "last_name": "Lefebvre",
        "date_of_birth": "1990-05-04",
        "street_number": 12,
        "street_name": "Rue Principale",
        "city_name": "Granby",
        "postal_code": "J2G 2V4",
        "terms_accepted": true
    })
}

#[tokio::test]
async fn test_list_is_ordered_and_scoped() {
    let (app, _) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;

    let response = app
        .oneshot(empty_request("GET", "/api/contacts", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Félix Cyr", "Léa Gauthier", "Ariane Leduc", "Thomas Paradis"]
    );
    assert!(body[0]["age"].as_i64().unwrap() > 30);
    assert!(body[0]["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_create_contact_with_address() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/contacts", Some(&session), new_contact()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["notification"]["message"], "Contact created successfully.");
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let contact = state.db.get_contact(id).await.unwrap().unwrap();
    let owner = state.db.find_user_by_name("mbouchard").await.unwrap().unwrap();
    assert_eq!(contact.owner_id, owner.id);

    let addresses = state.db.list_addresses_for_contact(id).await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].city_name, "Granby");
}

#[tokio::test]
async fn test_create_contact_validation() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;
    let owner = state.db.find_user_by_name("mbouchard").await.unwrap().unwrap();

    let mut body = new_contact();
    body["postal_code"] = json!("12345");
    body["date_of_birth"] = json!("2999-01-01");
    body["terms_accepted"] = json!(false);

    let response = app
        .oneshot(json_request("POST", "/api/contacts", Some(&session), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["fields"]["postal_code"][0], "Please provide a valid Postal Code.");
    assert_eq!(
        body["fields"]["date_of_birth"][0],
        "Please provide a valid Birth Date in the past."
    );
    assert_eq!(
        body["fields"]["terms_accepted"][0],
        "Make sure your contact accept the terms."
    );

    // Nothing was stored
    assert_eq!(state.db.list_contacts_for_owner(owner.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_get_and_update_contact() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;
    let contact_id = first_contact_id(&app, &session).await;
    let uri = format!("/api/contacts/{contact_id}");

    let response = app
        .clone()
        .oneshot(empty_request("GET", &uri, Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let form = body_json(response).await;
    assert_eq!(form["first_name"], "Félix");
    assert_eq!(form["date_of_birth"], "1990-06-12");

    let before = state
        .db
        .get_contact(contact_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &uri,
            Some(&session),
            json!({
                "first_name": "Félix-Antoine",
                "last_name": "Cyr",
                "date_of_birth": "1990-06-12"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["notification"]["message"],
        "Contact updated successfully."
    );

    let after = state.db.get_contact(before.id).await.unwrap().unwrap();
    assert_eq!(after.first_name, "Félix-Antoine");
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn test_delete_contact_cascades() {
    let (app, state) = common::create_seeded_app().await;
    let session = login(&app, common::USER).await;
    let contact_id = first_contact_id(&app, &session).await;
    let id: Uuid = contact_id.parse().unwrap();
    assert!(!state.db.list_addresses_for_contact(id).await.unwrap().is_empty());

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/contacts/{contact_id}"),
            Some(&session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["notification"]["message"],
        "Contact deleted successfully."
    );

    assert!(state.db.get_contact(id).await.unwrap().is_none());
    assert!(state.db.list_addresses_for_contact(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ownership_enforced() {
    let (app, _) = common::create_seeded_app().await;
    let owner_session = login(&app, common::USER).await;
    let other_session = login(&app, common::OTHER_USER).await;
    let contact_id = first_contact_id(&app, &owner_session).await;

    // Someone else's contact
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/contacts/{contact_id}"),
            Some(&other_session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/contacts/{contact_id}"),
            Some(&other_session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown contact
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/contacts/{}", Uuid::new_v4()),
            Some(&other_session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed id
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/contacts/not-a-uuid",
            Some(&other_session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No session at all
    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/contacts/{contact_id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
