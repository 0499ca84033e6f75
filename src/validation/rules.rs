// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Property rules shared by request bodies.
//!
//! Each rule stops at the first failing check and reports that check's
//! message. Rules receive the value only when it is present; absence is
//! reported by `#[validate(required(...))]` on the field.

use crate::time_utils::today_utc;
use chrono::NaiveDate;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

const NAME_LENGTH_MIN: usize = 2;
const NAME_LENGTH_MAX: usize = 30;
const USER_NAME_LENGTH_MIN: usize = 6;
const PASSWORD_LENGTH_MIN: usize = 8;

static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}+([ '-]\p{L}+)*$").expect("person name pattern"));
static STREET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}0-9]+([ .,'/-][\p{L}0-9]+)*$").expect("street name pattern")
});
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z]\d[A-Z] ?\d[A-Z]\d$").expect("postal code pattern"));
static USER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_.-]+$").expect("user name pattern"));

fn fail(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Non-empty, bounded, untrimmed-free text matching `pattern`.
fn bounded_text(
    value: &str,
    code: &'static str,
    label: &str,
    pattern: &Regex,
    pattern_message: &str,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(fail(code, format!("Please provide a {}.", label)));
    }

    let length = trimmed.chars().count();
    if !(NAME_LENGTH_MIN..=NAME_LENGTH_MAX).contains(&length) {
        return Err(fail(
            code,
            format!(
                "Please provide a {} between {} and {} characters.",
                label, NAME_LENGTH_MIN, NAME_LENGTH_MAX
            ),
        ));
    }

    if trimmed != value {
        return Err(fail(
            code,
            format!("Please remove leading and trailing spaces from {}.", label),
        ));
    }

    if !pattern.is_match(value) {
        return Err(fail(code, pattern_message.to_string()));
    }

    Ok(())
}

// ─── Contact ─────────────────────────────────────────────────

pub fn first_name(value: &str) -> Result<(), ValidationError> {
    bounded_text(
        value,
        "first_name",
        "First Name",
        &PERSON_NAME,
        "Please provide a First Name that contains only letters.",
    )
}

pub fn last_name(value: &str) -> Result<(), ValidationError> {
    bounded_text(
        value,
        "last_name",
        "Last Name",
        &PERSON_NAME,
        "Please provide a Last Name that contains only letters.",
    )
}

pub fn birth_date(value: &NaiveDate) -> Result<(), ValidationError> {
    birth_date_on(value, today_utc())
}

/// Birth date rule evaluated against an explicit `today`.
pub fn birth_date_on(value: &NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if *value >= today {
        return Err(fail(
            "birth_date",
            "Please provide a valid Birth Date in the past.",
        ));
    }
    Ok(())
}

pub fn contact_terms_accepted(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(fail(
            "terms_accepted",
            "Make sure your contact accept the terms.",
        ));
    }
    Ok(())
}

// ─── Address ─────────────────────────────────────────────────

/// Takes the number by value; the validator derive passes integer fields unborrowed.
pub fn street_number(value: i32) -> Result<(), ValidationError> {
    match value {
        0 => Err(fail("street_number", "Please provide a Street Number.")),
        n if n < 0 => Err(fail(
            "street_number",
            "Please provide a positive Street Number.",
        )),
        _ => Ok(()),
    }
}

pub fn street_name(value: &str) -> Result<(), ValidationError> {
    bounded_text(
        value,
        "street_name",
        "Street Name",
        &STREET_NAME,
        "Please provide a Street Name that contains only valid characters.",
    )
}

pub fn city_name(value: &str) -> Result<(), ValidationError> {
    bounded_text(
        value,
        "city_name",
        "City Name",
        &PERSON_NAME,
        "Please provide a City Name that contains only letters and spaces.",
    )
}

pub fn postal_code(value: &str) -> Result<(), ValidationError> {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(fail("postal_code", "Please provide a Postal Code."));
    }
    if !POSTAL_CODE.is_match(&normalized) {
        return Err(fail("postal_code", "Please provide a valid Postal Code."));
    }
    Ok(())
}

// ─── Identity ────────────────────────────────────────────────

pub fn user_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(fail("user_name", "The UserName cannot be empty."));
    }
    if trimmed.chars().count() < USER_NAME_LENGTH_MIN {
        return Err(fail(
            "user_name",
            format!(
                "The UserName must have at least {} characters.",
                USER_NAME_LENGTH_MIN
            ),
        ));
    }
    if !USER_NAME.is_match(&trimmed.to_lowercase()) {
        return Err(fail("user_name", "The UserName contains invalid characters."));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(fail("password", "The Password cannot be empty."));
    }
    if value.chars().count() < PASSWORD_LENGTH_MIN {
        return Err(fail(
            "password",
            format!(
                "The Password must have at least {} characters.",
                PASSWORD_LENGTH_MIN
            ),
        ));
    }

    let checks: [(fn(char) -> bool, &'static str); 4] = [
        (
            |c| c.is_ascii_uppercase(),
            "The Password must have at least one uppercase letter.",
        ),
        (
            |c| c.is_ascii_lowercase(),
            "The Password must have at least one lowercase letter.",
        ),
        (
            |c| c.is_ascii_digit(),
            "The Password must have at least one digit.",
        ),
        (
            |c| !c.is_ascii_alphanumeric(),
            "The Password must have at least one special character.",
        ),
    ];
    for (predicate, message) in checks {
        if !value.chars().any(predicate) {
            return Err(fail("password", message));
        }
    }

    if value.chars().any(char::is_whitespace) {
        return Err(fail("password", "The Password cannot contain spaces."));
    }
    Ok(())
}

pub fn account_terms_accepted(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(fail("terms_accepted", "You must accept the Terms."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ValidationError>) -> String {
        result
            .unwrap_err()
            .message
            .map(|m| m.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_first_name_rules_in_order() {
        assert!(first_name("Sébastien").is_ok());
        assert!(first_name("Jean-François").is_ok());
        assert!(first_name("O'Neil").is_ok());
        assert_eq!(message(first_name("   ")), "Please provide a First Name.");
        assert_eq!(
            message(first_name("A")),
            "Please provide a First Name between 2 and 30 characters."
        );
        assert_eq!(
            message(first_name(&"a".repeat(31))),
            "Please provide a First Name between 2 and 30 characters."
        );
        assert_eq!(
            message(first_name(" Noah")),
            "Please remove leading and trailing spaces from First Name."
        );
        assert_eq!(
            message(first_name("R2D2")),
            "Please provide a First Name that contains only letters."
        );
        assert_eq!(
            message(first_name("Jean--Luc")),
            "Please provide a First Name that contains only letters."
        );
    }

    #[test]
    fn test_last_name_uses_own_label() {
        assert_eq!(message(last_name("")), "Please provide a Last Name.");
        assert!(last_name("Dubé").is_ok());
    }

    #[test]
    fn test_birth_date_must_be_past() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(birth_date_on(&NaiveDate::from_ymd_opt(1980, 2, 6).unwrap(), today).is_ok());
        assert_eq!(
            message(birth_date_on(&today, today)),
            "Please provide a valid Birth Date in the past."
        );
    }

    #[test]
    fn test_street_number() {
        assert!(street_number(3000).is_ok());
        assert_eq!(message(street_number(0)), "Please provide a Street Number.");
        assert_eq!(
            message(street_number(-4)),
            "Please provide a positive Street Number."
        );
    }

    #[test]
    fn test_street_and_city_names() {
        assert!(street_name("Boulevard Curé-Poirier").is_ok());
        assert!(street_name("Rue King Ouest").is_ok());
        assert!(street_name("Chemin 3e Rang").is_ok());
        assert_eq!(
            message(street_name("Rue  Double")),
            "Please provide a Street Name that contains only valid characters."
        );
        assert!(city_name("Saint-Hyacinthe").is_ok());
        assert_eq!(
            message(city_name("Montréal 2")),
            "Please provide a City Name that contains only letters and spaces."
        );
    }

    #[test]
    fn test_postal_code() {
        assert!(postal_code("J2S 1H9").is_ok());
        assert!(postal_code("j2s1h9").is_ok());
        assert!(postal_code(" G1R 2B6 ").is_ok());
        assert_eq!(message(postal_code(" ")), "Please provide a Postal Code.");
        assert_eq!(
            message(postal_code("12345")),
            "Please provide a valid Postal Code."
        );
    }

    #[test]
    fn test_user_name() {
        assert!(user_name("hlapointe").is_ok());
        assert!(user_name("Jean.Roy_2").is_ok());
        assert_eq!(message(user_name("")), "The UserName cannot be empty.");
        assert_eq!(
            message(user_name("abc")),
            "The UserName must have at least 6 characters."
        );
        assert_eq!(
            message(user_name("jean roy")),
            "The UserName contains invalid characters."
        );
    }

    #[test]
    fn test_password_rules_in_order() {
        assert!(password("Admin123!").is_ok());
        assert_eq!(message(password("")), "The Password cannot be empty.");
        assert_eq!(
            message(password("Ab1!")),
            "The Password must have at least 8 characters."
        );
        assert_eq!(
            message(password("admin123!")),
            "The Password must have at least one uppercase letter."
        );
        assert_eq!(
            message(password("ADMIN123!")),
            "The Password must have at least one lowercase letter."
        );
        assert_eq!(
            message(password("Adminabc!")),
            "The Password must have at least one digit."
        );
        assert_eq!(
            message(password("Admin1234")),
            "The Password must have at least one special character."
        );
        assert_eq!(
            message(password("Admin 1234")),
            "The Password cannot contain spaces."
        );
    }

    #[test]
    fn test_terms() {
        assert!(account_terms_accepted(&true).is_ok());
        assert_eq!(
            message(account_terms_accepted(&false)),
            "You must accept the Terms."
        );
        assert_eq!(
            message(contact_terms_accepted(&false)),
            "Make sure your contact accept the terms."
        );
    }
}
