// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact model for storage and API.

use super::{require_id, require_text, DomainError, Owned};
use crate::time_utils::today_utc;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person in a user's address book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Contact ID (also used as document ID)
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn create_for_owner(
        owner_id: Uuid,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Self, DomainError> {
        require_id(owner_id, "Owner ID")?;
        check_fields(first_name, last_name, date_of_birth)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(
        &mut self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<(), DomainError> {
        check_fields(first_name, last_name, date_of_birth)?;

        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self.date_of_birth = date_of_birth;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in completed years today (UTC).
    pub fn age(&self) -> i32 {
        age_on(self.date_of_birth, today_utc())
    }
}

impl Owned for Contact {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Completed years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

fn check_fields(
    first_name: &str,
    last_name: &str,
    date_of_birth: NaiveDate,
) -> Result<(), DomainError> {
    require_text(first_name, "First name")?;
    require_text(last_name, "Last name")?;
    if date_of_birth >= today_utc() {
        return Err(DomainError::BirthDateNotInPast);
    }
    Ok(())
}
