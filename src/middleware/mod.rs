// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, ownership, security headers).

pub mod auth;
pub mod ownership;
pub mod security;

pub use auth::{require_admin, require_auth, AuthUser};
pub use ownership::OwnedContact;
