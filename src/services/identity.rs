// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account management: roles, registration, sign-in and password resets.
//!
//! Password hashing is CPU-bound, so it runs on the blocking pool.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Role, RoleRecord, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::password_generator;
use crate::validation::FormErrors;
use uuid::Uuid;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Account operations on top of [`Db`].
#[derive(Clone)]
pub struct IdentityService {
    db: Db,
}

impl IdentityService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create the built-in roles that do not exist yet.
    pub async fn ensure_roles(&self) -> Result<Vec<RoleRecord>> {
        let existing = self.db.list_roles().await?;
        let mut roles = Vec::with_capacity(Role::ALL.len());

        for role in Role::ALL {
            match existing.iter().find(|record| record.name == role) {
                Some(record) => roles.push(record.clone()),
                None => {
                    let record = RoleRecord::new(role);
                    self.db.insert_role(&record).await?;
                    tracing::info!(role = %role, role_id = %record.id, "Created role");
                    roles.push(record);
                }
            }
        }

        Ok(roles)
    }

    /// Role by id, or `NotFound("Role not found.")`.
    pub async fn find_role(&self, role_id: Uuid) -> Result<RoleRecord> {
        self.db
            .get_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found.".to_string()))
    }

    /// Role record for a built-in role.
    pub async fn role_named(&self, role: Role) -> Result<RoleRecord> {
        self.db
            .find_role(role)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found.".to_string()))
    }

    /// Register a new account holding `role`.
    ///
    /// Policy and uniqueness failures come back as general form errors.
    pub async fn create_user(
        &self,
        user_name: &str,
        password: &str,
        role: &RoleRecord,
    ) -> Result<User> {
        let policy = password_policy_errors(password);
        if !policy.is_empty() {
            let mut errors = FormErrors::default();
            errors.add_generals(policy);
            return Err(AppError::Validation(errors));
        }

        if self.db.find_user_by_name(user_name).await?.is_some() {
            return Err(duplicate_user_name(user_name));
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = User::create(user_name, password_hash, role.name)?;

        if !self.db.insert_user(&user).await? {
            return Err(duplicate_user_name(user_name));
        }

        tracing::info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(user)
    }

    /// Check credentials. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn password_sign_in(&self, user_name: &str, password: &str) -> Result<User> {
        let Some(user) = self.db.find_user_by_name(user_name).await? else {
            tracing::debug!("Sign-in for unknown user name");
            return Err(AppError::form(INVALID_CREDENTIALS));
        };

        let encoded = user.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &encoded))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password check failed: {}", e)))?;

        if !valid {
            tracing::warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(AppError::form(INVALID_CREDENTIALS));
        }

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    /// Replace the password with a generated one and revoke existing sessions.
    ///
    /// Returns the updated user and the new plain-text password.
    pub async fn reset_password(&self, user_id: Uuid) -> Result<(User, String)> {
        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        let new_password = password_generator::generate();
        let password_hash = hash_blocking(new_password.clone()).await?;
        user.set_password_hash(password_hash);
        self.db.update_user(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok((user, new_password))
    }

    /// Delete an account together with its contacts and addresses.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<usize> {
        if self.db.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found.".to_string()));
        }

        let deleted = self.db.delete_user_cascade(user_id).await?;
        tracing::info!(%user_id, deleted, "Deleted user");
        Ok(deleted)
    }
}

async fn hash_blocking(password: String) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;
    hashed.map_err(|e| AppError::Internal(e.into()))
}

fn duplicate_user_name(user_name: &str) -> AppError {
    AppError::form(format!("Username '{}' is already taken.", user_name.trim()))
}

/// Membership password policy, every violated requirement reported.
pub fn password_policy_errors(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Passwords must be at least 8 characters.");
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Passwords must have at least one non alphanumeric character.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Passwords must have at least one digit ('0'-'9').");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Passwords must have at least one lowercase ('a'-'z').");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Passwords must have at least one uppercase ('A'-'Z').");
    }

    errors
}
