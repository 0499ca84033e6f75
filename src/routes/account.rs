// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, sign-in, sign-out and the current user.

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_jwt, removal_cookie, session_cookie, AuthUser, PERSISTENT_SESSION_DAYS,
};
use crate::models::{Role, User};
use crate::routes::NotificationResponse;
use crate::validation::{rules, ValidatedJson};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Where a freshly registered user lands.
const AFTER_REGISTER: &str = "/contacts";
const HOME: &str = "/";

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/account/register", post(register))
        .route("/account/login", post(login))
        .route("/account/logout", post(logout))
}

/// Routes that need a session (auth applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

// ─── Request / Response Types ────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::user_name"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(custom(function = "rules::password"))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(
        other = "password",
        message = "The password and confirmation password do not match."
    ))]
    pub password_confirmation: String,
    #[serde(default)]
    #[validate(custom(function = "rules::account_terms_accepted"))]
    pub terms_accepted: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::user_name"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(custom(function = "rules::password"))]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    pub return_url: Option<String>,
}

/// Where the client should navigate next.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RedirectResponse {
    pub redirect_to: String,
}

/// Current user response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub id: Uuid,
    pub user_name: String,
    pub role: String,
    pub contact_count: usize,
}

// ─── Handlers ────────────────────────────────────────────────

/// Create an account with the `User` role and sign it in.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RedirectResponse>)> {
    let role = state.identity.role_named(Role::User).await.map_err(|_| {
        AppError::form(format!("Unable to add the user to the role {}.", Role::User))
    })?;

    let user = state
        .identity
        .create_user(&req.user_name, &req.password, &role)
        .await?;

    let jar = sign_in(&state, jar, &user, true)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RedirectResponse {
            redirect_to: AFTER_REGISTER.to_string(),
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<RedirectResponse>)> {
    let user = state
        .identity
        .password_sign_in(&req.user_name, &req.password)
        .await?;

    let jar = sign_in(&state, jar, &user, req.remember_me)?;

    let redirect_to = match req.return_url {
        Some(url) if is_local_url(&url) => url,
        _ => HOME.to_string(),
    };
    Ok((jar, Json(RedirectResponse { redirect_to })))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<NotificationResponse>) {
    let jar = jar.add(removal_cookie(state.config.secure_cookies));
    (jar, Json(NotificationResponse::success("Logout successful.")))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let contact_count = state.db.count_contacts_for_owner(user.user_id).await?;
    Ok(Json(MeResponse {
        id: user.user_id,
        user_name: user.user_name,
        role: user.role.name().to_string(),
        contact_count,
    }))
}

// ─── Helpers ─────────────────────────────────────────────────

/// Issue a session token and attach it as a cookie.
fn sign_in(state: &AppState, jar: CookieJar, user: &User, persistent: bool) -> Result<CookieJar> {
    let ttl = if persistent {
        chrono::Duration::try_days(PERSISTENT_SESSION_DAYS)
    } else {
        chrono::Duration::try_hours(state.config.session_ttl_hours)
    }
    .ok_or_else(|| anyhow::anyhow!("session lifetime out of range"))?;

    let token = create_jwt(user, ttl, &state.config.jwt_signing_key)?;
    let cookie = session_cookie(
        token,
        persistent.then_some(ttl),
        state.config.secure_cookies,
    );

    tracing::debug!(user_id = %user.id, persistent, "Session issued");
    Ok(jar.add(cookie))
}

/// True for same-origin paths such as `/contacts` or `~/contacts`.
///
/// Protocol-relative (`//host`) and backslash (`/\host`) forms are rejected
/// since browsers treat them as absolute.
pub fn is_local_url(url: &str) -> bool {
    if let Some(rest) = url.strip_prefix("~/") {
        return !rest.starts_with('/') && !rest.starts_with('\\');
    }
    match url.strip_prefix('/') {
        Some(rest) => !rest.starts_with('/') && !rest.starts_with('\\'),
        None => false,
    }
}
