// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account model for storage and API.

use super::{require_text, DomainError, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Account ID (also used as document ID)
    pub id: Uuid,
    /// User name as entered at registration (trimmed)
    pub user_name: String,
    /// Upper-cased user name used for uniqueness and lookups
    pub normalized_user_name: String,
    /// PBKDF2 password hash (see `services::password`)
    pub password_hash: String,
    /// Rotated whenever credentials change; sessions carry a copy
    pub security_stamp: String,
    /// Single role held by the account
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn create(user_name: &str, password_hash: String, role: Role) -> Result<Self, DomainError> {
        require_text(user_name, "User name")?;

        let now = Utc::now();
        let user_name = user_name.trim().to_string();
        Ok(Self {
            id: Uuid::new_v4(),
            normalized_user_name: normalize_user_name(&user_name),
            user_name,
            password_hash,
            security_stamp: new_security_stamp(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the password hash and revoke outstanding sessions.
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.rotate_security_stamp();
    }

    pub fn rotate_security_stamp(&mut self) {
        self.security_stamp = new_security_stamp();
        self.updated_at = Utc::now();
    }
}

/// Canonical form used to compare user names.
pub fn normalize_user_name(user_name: &str) -> String {
    user_name.trim().to_uppercase()
}

fn new_security_stamp() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trims_and_normalizes() {
        let user = User::create("  hlapointe ", "hash".to_string(), Role::User).unwrap();
        assert_eq!(user.user_name, "hlapointe");
        assert_eq!(user.normalized_user_name, "HLAPOINTE");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let err = User::create("   ", "hash".to_string(), Role::User).unwrap_err();
        assert_eq!(err, DomainError::Blank("User name"));
    }

    #[test]
    fn test_set_password_rotates_stamp() {
        let mut user = User::create("mbouchard", "old".to_string(), Role::User).unwrap();
        let stamp = user.security_stamp.clone();
        user.set_password_hash("new".to_string());
        assert_eq!(user.password_hash, "new");
        assert_ne!(user.security_stamp, stamp);
    }
}
