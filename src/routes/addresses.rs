// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Address routes, nested under an owned contact.
//!
//! The `contact_id` in the path is authoritative: a `contact_id` in the
//! body is ignored, and an address reached through the wrong contact is
//! reported as missing.

use crate::error::{AppError, Result};
use crate::middleware::OwnedContact;
use crate::models::Address;
use crate::pagination::PaginatedList;
use crate::routes::{parse_path_id, NotificationResponse};
use crate::time_utils::format_utc_rfc3339;
use crate::validation::{present, rules, ValidatedJson};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub const PAGE_SIZE: u32 = 10;

/// Address routes (auth applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/contacts/{contact_id}/addresses",
            get(list_addresses).post(create_address),
        )
        .route(
            "/api/contacts/{contact_id}/addresses/{address_id}",
            get(get_address).put(update_address).delete(delete_address),
        )
}

// ─── Request / Response Types ────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
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
}

/// Validated address fields.
struct AddressFields {
    street_number: i32,
    street_name: String,
    city_name: String,
    postal_code: String,
}

impl AddressRequest {
    fn into_fields(self) -> Result<AddressFields> {
        Ok(AddressFields {
            street_number: present(self.street_number, "street_number")?,
            street_name: present(self.street_name, "street_name")?,
            city_name: present(self.city_name, "city_name")?,
            postal_code: present(self.postal_code, "postal_code")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddressItem {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub street_number: i32,
    pub street_name: String,
    pub city_name: String,
    pub postal_code: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Address> for AddressItem {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            contact_id: address.contact_id,
            street_number: address.street_number,
            street_name: address.street_name,
            city_name: address.city_name,
            postal_code: address.postal_code,
            created_at: format_utc_rfc3339(address.created_at),
            updated_at: format_utc_rfc3339(address.updated_at),
        }
    }
}

/// One page of a contact's addresses.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddressListResponse {
    pub contact_id: Uuid,
    pub contact_full_name: String,
    pub addresses: PaginatedList<AddressItem>,
}

// ─── Handlers ────────────────────────────────────────────────

/// Addresses by street name then street number, `PAGE_SIZE` per page.
async fn list_addresses(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    Query(query): Query<PageQuery>,
) -> Result<Json<AddressListResponse>> {
    let contact = owned.contact;
    let page = query.page.unwrap_or(1);

    let all = state.db.list_addresses_for_contact(contact.id).await?;
    let addresses = PaginatedList::from_slice(&all, page, PAGE_SIZE)?.map(AddressItem::from);

    tracing::debug!(
        contact_id = %contact.id,
        page,
        total = addresses.total_count,
        "Listed addresses"
    );
    Ok(Json(AddressListResponse {
        contact_id: contact.id,
        contact_full_name: contact.full_name(),
        addresses,
    }))
}

async fn create_address(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    ValidatedJson(req): ValidatedJson<AddressRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>)> {
    let fields = req.into_fields()?;
    let address = Address::create(
        owned.contact.id,
        fields.street_number,
        &fields.street_name,
        &fields.city_name,
        &fields.postal_code,
    )?;
    state.db.save_address(&address).await?;

    tracing::info!(contact_id = %owned.contact.id, address_id = %address.id, "Address added");
    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse::success("Address added successfully.").with_id(address.id)),
    ))
}

async fn get_address(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    Path((_, address_id)): Path<(String, String)>,
) -> Result<Json<AddressItem>> {
    let address = load_address(&state, &owned, &address_id).await?;
    Ok(Json(address.into()))
}

async fn update_address(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    Path((_, address_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<AddressRequest>,
) -> Result<Json<NotificationResponse>> {
    let fields = req.into_fields()?;
    let mut address = load_address(&state, &owned, &address_id).await?;

    address.update(
        fields.street_number,
        &fields.street_name,
        &fields.city_name,
        &fields.postal_code,
    )?;
    state.db.save_address(&address).await?;

    tracing::info!(contact_id = %owned.contact.id, address_id = %address.id, "Address updated");
    Ok(Json(
        NotificationResponse::success("Address updated successfully.").with_id(address.id),
    ))
}

async fn delete_address(
    State(state): State<Arc<AppState>>,
    owned: OwnedContact,
    Path((_, address_id)): Path<(String, String)>,
) -> Result<Json<NotificationResponse>> {
    let address = load_address(&state, &owned, &address_id).await?;
    state.db.delete_address(address.id).await?;

    tracing::info!(contact_id = %owned.contact.id, address_id = %address.id, "Address deleted");
    Ok(Json(NotificationResponse::success(
        "Address deleted successfully.",
    )))
}

/// The address, provided it belongs to the owned contact.
async fn load_address(state: &AppState, owned: &OwnedContact, address_id: &str) -> Result<Address> {
    let address_id = parse_path_id(address_id, "address")?;
    match state.db.get_address(address_id).await? {
        Some(address) if address.contact_id == owned.contact.id => Ok(address),
        _ => Err(AppError::NotFound("Address not found.".to_string())),
    }
}
