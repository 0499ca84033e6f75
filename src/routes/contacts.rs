// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact routes. Every contact belongs to the signed-in user.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::middleware::OwnedContact;
use crate::models::{Address, Contact};
use crate::routes::NotificationResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::validation::{present, rules, ValidatedJson};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Contact routes (auth applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/{contact_id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

// ─── Request / Response Types ────────────────────────────────

/// New contact with its first address.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(
        required(message = "Please provide a first name."),
        custom(function = "rules::first_name")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Please provide a last name."),
        custom(function = "rules::last_name")
    )]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Please provide a date of birth."),
        custom(function = "rules::birth_date")
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(
        required(message = "Please provide a street number."),
        custom(function = "rules::street_number")
    )]
    pub street_number: Option<i32>,
    #[validate(
        required(message = "Please provide a street name."),
        custom(function = "rules::street_name")
    )]
    pub street_name: Option<String>,
    #[validate(
        required(message = "Please provide a city name."),
        custom(function = "rules::city_name")
    )]
    pub city_name: Option<String>,
    #[validate(
        required(message = "Please provide a postal code."),
        custom(function = "rules::postal_code")
    )]
    pub postal_code: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "rules::contact_terms_accepted"))]
    pub terms_accepted: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(
        required(message = "Please provide a first name."),
        custom(function = "rules::first_name")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Please provide a last name."),
        custom(function = "rules::last_name")
    )]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Please provide a Date Of Birth."),
        custom(function = "rules::birth_date")
    )]
    pub date_of_birth: Option<NaiveDate>,
}

/// Row in the contact list.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactItem {
    pub id: Uuid,
    pub full_name: String,
    pub age: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Contact> for ContactItem {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            full_name: contact.full_name(),
            age: contact.age(),
            created_at: format_utc_rfc3339(contact.created_at),
            updated_at: format_utc_rfc3339(contact.updated_at),
        }
    }
}

/// Editable fields of a contact.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}

// ─── Handlers ────────────────────────────────────────────────

/// Contacts of the current user, by last name then first name.
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ContactItem>>> {
    let contacts = state.db.list_contacts_for_owner(user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, count = contacts.len(), "Listed contacts");
    Ok(Json(contacts.iter().map(ContactItem::from).collect()))
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>)> {
    let first_name = present(req.first_name, "first_name")?;
    let last_name = present(req.last_name, "last_name")?;
    let date_of_birth = present(req.date_of_birth, "date_of_birth")?;
    let street_number = present(req.street_number, "street_number")?;
    let street_name = present(req.street_name, "street_name")?;
    let city_name = present(req.city_name, "city_name")?;
    let postal_code = present(req.postal_code, "postal_code")?;

    let contact = Contact::create_for_owner(user.user_id, &first_name, &last_name, date_of_birth)?;
    let address = Address::create(
        contact.id,
        street_number,
        &street_name,
        &city_name,
        &postal_code,
    )?;

    state.db.insert_contact(&contact, &[address]).await?;

    tracing::info!(user_id = %user.user_id, contact_id = %contact.id, "Contact created");
    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse::success("Contact created successfully.").with_id(contact.id)),
    ))
}

async fn get_contact(owned: OwnedContact) -> Json<ContactResponse> {
    let contact = owned.contact;
    Json(ContactResponse {
        id: contact.id,
        first_name: contact.first_name,
        last_name: contact.last_name,
        date_of_birth: contact.date_of_birth,
    })
}

async fn update_contact(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<NotificationResponse>> {
    let first_name = present(req.first_name, "first_name")?;
    let last_name = present(req.last_name, "last_name")?;
    let date_of_birth = present(req.date_of_birth, "date_of_birth")?;

    let mut contact = owned.contact;
    contact.update(&first_name, &last_name, date_of_birth)?;
    state.db.update_contact(&contact).await?;

    tracing::info!(user_id = %owned.user.user_id, contact_id = %contact.id, "Contact updated");
    Ok(Json(
        NotificationResponse::success("Contact updated successfully.").with_id(contact.id),
    ))
}

/// Delete a contact and its addresses.
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
) -> Result<Json<NotificationResponse>> {
    let deleted = state.db.delete_contact_cascade(owned.contact.id).await?;

    tracing::info!(
        user_id = %owned.user.user_id,
        contact_id = %owned.contact.id,
        deleted,
        "Contact deleted"
    );
    Ok(Json(NotificationResponse::success(
        "Contact deleted successfully.",
    )))
}
