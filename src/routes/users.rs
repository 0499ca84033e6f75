// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Administrator routes: accounts and roles.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{RoleRecord, User};
use crate::routes::parse_path_id;
use crate::services::password_generator;
use crate::validation::{present, rules, ValidatedJson};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Admin routes (auth and role check applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/roles", get(list_roles))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/new", get(new_user_form))
        .route("/api/users/{user_id}/reset-password", post(reset_password))
        .route("/api/users/{user_id}", delete(delete_user))
}

// ─── Request / Response Types ────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::user_name"))]
    pub user_name: String,
    #[validate(
        required(message = "Please provide a RoleId."),
        custom(function = "role_id_present")
    )]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    #[validate(custom(function = "rules::password"))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(
        other = "password",
        message = "The password and confirmation password do not match."
    ))]
    pub password_confirmation: String,
}

fn role_id_present(role_id: &Uuid) -> std::result::Result<(), ValidationError> {
    if role_id.is_nil() {
        return Err(ValidationError::new("role_id").with_message("Please provide a RoleId.".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoleItem {
    pub id: Uuid,
    pub name: String,
}

impl From<RoleRecord> for RoleItem {
    fn from(role: RoleRecord) -> Self {
        Self {
            id: role.id,
            name: role.name.name().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserItem {
    pub id: Uuid,
    pub user_name: String,
    pub role_name: String,
}

impl From<User> for UserItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.trim().to_string(),
            role_name: user.role.name().to_string(),
        }
    }
}

/// Prefilled form for a new account.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewUserForm {
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetPasswordResponse {
    pub user_name: String,
    pub new_password: String,
}

// ─── Handlers ────────────────────────────────────────────────

async fn list_roles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RoleItem>>> {
    let roles = state.db.list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleItem::from).collect()))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserItem>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserItem::from).collect()))
}

async fn new_user_form() -> Json<NewUserForm> {
    let password = password_generator::generate();
    Json(NewUserForm {
        password_confirmation: password.clone(),
        password,
    })
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserItem>)> {
    let role_id = present(req.role_id, "role_id")?;
    let role = state.identity.find_role(role_id).await?;

    let user = state
        .identity
        .create_user(&req.user_name, &req.password, &role)
        .await?;

    tracing::info!(
        admin_id = %admin.user_id,
        user_id = %user.id,
        role = %role.name,
        "Account created by administrator"
    );
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Replace a user's password with a generated one and return it once.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ResetPasswordResponse>> {
    let user_id = parse_path_id(&user_id, "user")?;
    let (user, new_password) = state.identity.reset_password(user_id).await?;

    tracing::info!(admin_id = %admin.user_id, %user_id, "Password reset by administrator");
    Ok(Json(ResetPasswordResponse {
        user_name: user.user_name.trim().to_string(),
        new_password,
    }))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    let user_id = parse_path_id(&user_id, "user")?;
    if admin.user_id == user_id {
        tracing::warn!(admin_id = %admin.user_id, "Administrator deleting own account");
    }

    state.identity.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
