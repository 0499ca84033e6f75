// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication.
//!
//! A session is an HS256 JWT carried in the `cm_session` cookie (or an
//! `Authorization: Bearer` header). Each token embeds the user's security
//! stamp, so rotating the stamp revokes every outstanding session.

use crate::error::AppError;
use crate::models::{Role, User};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "cm_session";

/// Lifetime of a "remember me" session.
pub const PERSISTENT_SESSION_DAYS: i64 = 30;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Security stamp of the user when the token was issued
    pub stamp: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub user_name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(&token, &key, &validation).map_err(|_| AppError::InvalidToken)?;
    let claims = token_data.claims;

    let user_id: Uuid = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;

    let Some(user) = state.db.get_user(user_id).await? else {
        tracing::debug!(%user_id, "Session for deleted user");
        return Err(AppError::InvalidToken);
    };

    let stamp_matches: bool = claims
        .stamp
        .as_bytes()
        .ct_eq(user.security_stamp.as_bytes())
        .into();
    if !stamp_matches {
        tracing::debug!(%user_id, "Session security stamp is stale");
        return Err(AppError::InvalidToken);
    }

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        user_name: user.user_name,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Middleware that rejects non-administrators. Must run after [`require_auth`].
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        tracing::warn!(user_id = %user.user_id, "Non-administrator refused");
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Create a JWT for a user session valid for `ttl`.
pub fn create_jwt(user: &User, ttl: chrono::Duration, signing_key: &[u8]) -> anyhow::Result<String> {
    use anyhow::Context;
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now();
    let expires = now
        .checked_add_signed(ttl)
        .context("session lifetime out of range")?;
    let claims = Claims {
        sub: user.id.to_string(),
        stamp: user.security_stamp.clone(),
        iat: usize::try_from(now.timestamp())?,
        exp: usize::try_from(expires.timestamp())?,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie for `token`.
///
/// Persistent cookies carry a `Max-Age`; otherwise the cookie ends with the
/// browser session (the token itself still expires after `ttl`).
pub fn session_cookie(token: String, ttl: Option<chrono::Duration>, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();

    if let Some(ttl) = ttl {
        cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    }
    cookie
}

/// Cookie that clears the session. Attributes match [`session_cookie`].
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), None, secure);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!!";

    fn user() -> User {
        User::create("hlapointe", "hash".to_string(), Role::Administrator).unwrap()
    }

    #[test]
    fn test_jwt_carries_stamp() {
        let user = user();
        let token = create_jwt(&user, chrono::Duration::hours(1), KEY).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(KEY),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user.id.to_string());
        assert_eq!(data.claims.stamp, user.security_stamp);
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn test_expired_jwt_rejected() {
        let token = create_jwt(&user(), chrono::Duration::hours(-2), KEY).unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(KEY),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_lifetime_out_of_range() {
        let ttl = chrono::Duration::try_days(100_000_000).unwrap();
        assert!(create_jwt(&user(), ttl, KEY).is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("t".to_string(), Some(chrono::Duration::days(30)), true);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("cm_session=t"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=2592000"));

        let browser_session = session_cookie("t".to_string(), None, false).to_string();
        assert!(!browser_session.contains("Max-Age"));
        assert!(!browser_session.contains("Secure"));
    }

    #[test]
    fn test_removal_cookie() {
        let rendered = removal_cookie(false).to_string();
        assert!(rendered.starts_with("cm_session=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("HttpOnly"));
    }
}
