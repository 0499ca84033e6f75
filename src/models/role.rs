// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to an account. Each account holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Administrator, Role::User];

    pub fn name(self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::User => "User",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.name() == name)
    }

    pub fn is_supported(name: &str) -> bool {
        Role::from_name(name).is_some()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stored role (also used as document ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: Role,
}

impl RoleRecord {
    pub fn new(name: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}
