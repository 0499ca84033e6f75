// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request validation.
//!
//! Property rules live in [`rules`] and are attached to request bodies with
//! `#[derive(Validate)]`. Failures are collected into [`FormErrors`], which
//! the error layer renders as a 422 response.

pub mod rules;

use crate::error::AppError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Key `validator` uses for struct-level errors.
const SCHEMA_KEY: &str = "__all__";

/// Validation failures keyed by field, plus general messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub general: Vec<String>,
}

impl FormErrors {
    pub fn general(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add_general(message);
        errors
    }

    /// Add a general message. Blank messages are ignored.
    pub fn add_general(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.general.push(message);
        }
    }

    pub fn add_generals<I, M>(&mut self, messages: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        for message in messages {
            self.add_general(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    /// Messages recorded for `field` (empty if none).
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut form = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors.iter().map(message_of).collect();
            if field == SCHEMA_KEY {
                form.add_generals(messages);
            } else {
                form.fields.insert(field.to_string(), messages);
            }
        }
        form
    }
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Take a field that `#[validate(required)]` has already checked.
pub fn present<T>(value: Option<T>, field: &'static str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", field)))
}

/// JSON body extractor that runs `Validate` before the handler sees the value.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_blank_general_messages_are_ignored() {
        let mut errors = FormErrors::general("Invalid username or password.");
        errors.add_generals(["", "   ", "Your account is locked out."]);
        assert_eq!(
            errors.general,
            vec!["Invalid username or password.", "Your account is locked out."]
        );
        assert!(errors.fields.is_empty());
    }

    #[test]
    fn test_from_validation_errors() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "first_name",
            ValidationError::new("first_name")
                .with_message(Cow::Borrowed("Please provide a First Name.")),
        );
        errors.add("last_name", ValidationError::new("required"));

        let form = FormErrors::from(&errors);
        assert_eq!(form.field("first_name"), ["Please provide a First Name."]);
        assert_eq!(form.field("last_name"), ["required"]);
        assert!(form.field("city_name").is_empty());
        assert!(!form.is_empty());
    }
}
