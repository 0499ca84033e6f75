// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact Manager: personal address books behind a JSON API.
//!
//! Users keep contacts and their postal addresses; administrators manage
//! accounts and roles.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::Db;
use services::IdentityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub identity: IdentityService,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let identity = IdentityService::new(db.clone());
        Self {
            config,
            db,
            identity,
        }
    }
}
