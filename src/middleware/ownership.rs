// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact ownership check for `/api/contacts/{contact_id}` routes.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{Contact, Owned};
use crate::routes::parse_path_id;
use crate::AppState;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The contact named by the `contact_id` path segment, loaded and verified
/// to belong to the signed-in user.
///
/// Rejections: 401 without a session, 400 for a malformed id, 404 for an
/// unknown contact, 403 for someone else's contact.
#[derive(Debug, Clone)]
pub struct OwnedContact {
    pub user: AuthUser,
    pub contact: Contact,
}

impl FromRequestParts<Arc<AppState>> for OwnedContact {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        let contact_id = contact_id_from_path(parts, state).await?;

        let contact = state
            .db
            .get_contact(contact_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact not found.".to_string()))?;

        if !contact.is_owned_by(user.user_id) {
            tracing::warn!(
                user_id = %user.user_id,
                %contact_id,
                "Access to another user's contact refused"
            );
            return Err(AppError::Forbidden);
        }

        Ok(Self { user, contact })
    }
}

async fn contact_id_from_path(parts: &mut Parts, state: &Arc<AppState>) -> Result<Uuid, AppError> {
    // Nested routes carry more params than `contact_id`; take them all and pick ours.
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|_| AppError::BadRequest("Missing contact id".to_string()))?;

    let raw = params
        .get("contact_id")
        .ok_or_else(|| AppError::BadRequest("Missing contact id".to_string()))?;
    parse_path_id(raw, "contact")
}
