// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod password;
pub mod password_generator;

pub use identity::IdentityService;
pub use password::{hash_password, verify_password, PasswordHashError};
