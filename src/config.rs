// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;

/// Minimum accepted length of the session signing key.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Upper bound for `SESSION_TTL_HOURS` (one year).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Where contacts, addresses and accounts are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local maps. Data is lost on restart.
    Memory,
    /// Google Cloud Firestore (or its emulator).
    Firestore,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            other => Err(ConfigError::Invalid(
                "STORAGE_BACKEND",
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL (CORS allow-list)
    pub frontend_url: String,
    /// Storage backend selection
    pub storage: StorageBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Seed demo accounts and contacts at startup
    pub seed_demo_data: bool,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    /// Lifetime of a non-persistent session
    pub session_ttl_hours: i64,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            storage: StorageBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            seed_demo_data: false,
            secure_cookies: false,
            session_ttl_hours: 12,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let gcp_project_id = match (storage, env::var("GCP_PROJECT_ID")) {
            (_, Ok(id)) => id,
            (StorageBackend::Firestore, Err(_)) => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"))
            }
            (StorageBackend::Memory, Err(_)) => "local-dev".to_string(),
        };

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "JWT_SIGNING_KEY",
                format!("must be at least {} bytes", MIN_SIGNING_KEY_LEN),
            ));
        }

        let secure_cookies = match env::var("SECURE_COOKIES") {
            Ok(raw) => parse_bool("SECURE_COOKIES", &raw)?,
            Err(_) => !is_local_url(&frontend_url),
        };

        Ok(Self {
            port: match env::var("PORT") {
                Ok(raw) => parse_port(&raw)?,
                Err(_) => 8080,
            },
            storage,
            gcp_project_id,
            seed_demo_data: match env::var("SEED_DEMO_DATA") {
                Ok(raw) => parse_bool("SEED_DEMO_DATA", &raw)?,
                Err(_) => false,
            },
            secure_cookies,
            session_ttl_hours: match env::var("SESSION_TTL_HOURS") {
                Ok(raw) => parse_session_ttl_hours(&raw)?,
                Err(_) => 12,
            },
            frontend_url,
            jwt_signing_key,
        })
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(
            var,
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid("PORT", format!("expected a port number, got '{}'", raw)))
}

fn parse_session_ttl_hours(raw: &str) -> Result<i64, ConfigError> {
    let hours: i64 = raw.trim().parse().map_err(|_| {
        ConfigError::Invalid(
            "SESSION_TTL_HOURS",
            format!("expected a number of hours, got '{}'", raw),
        )
    })?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid(
            "SESSION_TTL_HOURS",
            format!("must be between 1 and {}", MAX_SESSION_TTL_HOURS),
        ));
    }
    Ok(hours)
}

fn is_local_url(url: &str) -> bool {
    url.starts_with("http://localhost") || url.starts_with("http://127.0.0.1")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
