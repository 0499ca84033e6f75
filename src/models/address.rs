// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postal address model.

use super::{require_id, require_text, DomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Postal address attached to a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Address ID (also used as document ID)
    pub id: Uuid,
    /// Parent contact
    pub contact_id: Uuid,
    pub street_number: i32,
    pub street_name: String,
    pub city_name: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn create(
        contact_id: Uuid,
        street_number: i32,
        street_name: &str,
        city_name: &str,
        postal_code: &str,
    ) -> Result<Self, DomainError> {
        require_id(contact_id, "Contact ID")?;
        check_fields(street_number, street_name, city_name, postal_code)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            contact_id,
            street_number,
            street_name: street_name.to_string(),
            city_name: city_name.to_string(),
            postal_code: postal_code.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(
        &mut self,
        street_number: i32,
        street_name: &str,
        city_name: &str,
        postal_code: &str,
    ) -> Result<(), DomainError> {
        check_fields(street_number, street_name, city_name, postal_code)?;

        self.street_number = street_number;
        self.street_name = street_name.to_string();
        self.city_name = city_name.to_string();
        self.postal_code = postal_code.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// True when every postal field matches.
    pub fn same_location(
        &self,
        street_number: i32,
        street_name: &str,
        city_name: &str,
        postal_code: &str,
    ) -> bool {
        self.street_number == street_number
            && self.street_name == street_name
            && self.city_name == city_name
            && self.postal_code == postal_code
    }
}

fn check_fields(
    street_number: i32,
    street_name: &str,
    city_name: &str,
    postal_code: &str,
) -> Result<(), DomainError> {
    if street_number < 1 {
        return Err(DomainError::StreetNumberOutOfRange);
    }
    require_text(street_name, "Street name")?;
    require_text(city_name, "City name")?;
    require_text(postal_code, "Postal code")?;
    Ok(())
}
