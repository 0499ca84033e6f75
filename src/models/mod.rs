// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod address;
pub mod contact;
pub mod role;
pub mod user;

pub use address::Address;
pub use contact::Contact;
pub use role::{Role, RoleRecord};
pub use user::User;

use uuid::Uuid;

/// Entity invariant violations.
///
/// Request validation runs first, so reaching one of these from a handler
/// means the rules and the model disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("{0} cannot be empty.")]
    Blank(&'static str),

    #[error("{0} cannot be empty.")]
    EmptyId(&'static str),

    #[error("Street number must be at least 1.")]
    StreetNumberOutOfRange,

    #[error("Birth date must be in the past.")]
    BirthDateNotInPast,
}

/// An entity that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;

    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}

pub(crate) fn require_text(value: &str, what: &'static str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Blank(what));
    }
    Ok(())
}

pub(crate) fn require_id(value: Uuid, what: &'static str) -> Result<(), DomainError> {
    if value.is_nil() {
        return Err(DomainError::EmptyId(what));
    }
    Ok(())
}
