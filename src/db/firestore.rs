// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and roles (accounts)
//! - Contacts (owned by a user)
//! - Addresses (owned by a contact)
//!
//! Ordering is left to the caller; see [`crate::db::Db`].

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Address, Contact, RoleRecord, User};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

const MAX_CONCURRENT_READS: usize = 8;

fn db_error(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Claim on a normalized user name, one document per name.
#[derive(Debug, Serialize, Deserialize)]
struct UserNameReservation {
    user_id: Uuid,
}

/// Rewrites only `id` of an existing document so a transaction fails if
/// that document has been deleted.
#[derive(Serialize, Deserialize)]
struct ParentGuard {
    id: Uuid,
}

fn reservation_id(normalized: &str) -> String {
    // Keeps ids clear of the reserved `__name__` form
    format!("n-{normalized}")
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(db_error)
    }

    pub async fn find_user_by_normalized_name(
        &self,
        normalized: &str,
    ) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("normalized_user_name").eq(normalized)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_error)?;
        Ok(users.into_iter().next())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Insert a user unless the normalized name is taken.
    ///
    /// The name is reserved in `user_names` with a must-not-exist
    /// precondition in the same transaction as the user document, so only
    /// one of two concurrent registrations commits.
    pub async fn insert_user(&self, user: &User) -> Result<bool, AppError> {
        // Accounts created before reservations existed are only visible here
        if self
            .find_user_by_normalized_name(&user.normalized_user_name)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let reservation = UserNameReservation { user_id: user.id };
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collections::USER_NAMES)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(reservation_id(&user.normalized_user_name))
            .object(&reservation)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add name reservation to transaction: {}", e))
            })?;

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        match transaction.commit().await {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(user_name = %user.user_name, "User name already reserved");
                Ok(false)
            }
            Err(e) => Err(AppError::Database(format!("Transaction commit failed: {}", e))),
        }
    }

    /// Create or update a user.
    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Delete a user, its contacts and their addresses.
    ///
    /// Parents go first: once the user document is gone, guarded contact
    /// writes fail, so the listing below sees every contact that committed.
    pub async fn delete_user_cascade(&self, user_id: Uuid) -> Result<usize, AppError> {
        let user = self.get_user(user_id).await?;

        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id.to_string())
            .execute()
            .await
            .map_err(db_error)?;

        if let Some(user) = &user {
            self.client
                .fluent()
                .delete()
                .from(collections::USER_NAMES)
                .document_id(reservation_id(&user.normalized_user_name))
                .execute()
                .await
                .map_err(db_error)?;
        }

        let contacts = self.list_contacts_for_owner(user_id).await?;
        self.batch_delete(&contacts, collections::CONTACTS, |c: &Contact| {
            c.id.to_string()
        })
        .await?;

        let contact_ids: Vec<Uuid> = contacts.iter().map(|c| c.id).collect();
        let addresses: Vec<Address> = stream::iter(contact_ids)
            .map(|contact_id| self.list_addresses_for_contact(contact_id))
            .buffer_unordered(MAX_CONCURRENT_READS)
            .try_concat()
            .await?;

        self.batch_delete(&addresses, collections::ADDRESSES, |a: &Address| {
            a.id.to_string()
        })
        .await?;

        let deleted = addresses.len() + contacts.len() + usize::from(user.is_some());
        tracing::info!(%user_id, deleted, "User data deletion complete");
        Ok(deleted)
    }

    // ─── Role Operations ─────────────────────────────────────────

    pub async fn list_roles(&self) -> Result<Vec<RoleRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::ROLES)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    pub async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::ROLES)
            .obj()
            .one(&role_id.to_string())
            .await
            .map_err(db_error)
    }

    pub async fn save_role(&self, role: &RoleRecord) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ROLES)
            .document_id(role.id.to_string())
            .object(role)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    // ─── Contact Operations ──────────────────────────────────────

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::CONTACTS)
            .obj()
            .one(&contact_id.to_string())
            .await
            .map_err(db_error)
    }

    pub async fn list_contacts_for_owner(&self, owner_id: Uuid) -> Result<Vec<Contact>, AppError> {
        let owner_id = owner_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::CONTACTS)
            .filter(|q| q.for_all([q.field("owner_id").eq(owner_id.as_str())]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Atomically store a contact and its initial addresses.
    ///
    /// Returns `false` without writing when the owner no longer exists.
    pub async fn insert_contact(
        &self,
        contact: &Contact,
        addresses: &[Address],
    ) -> Result<bool, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let owner = ParentGuard {
            id: contact.owner_id,
        };
        self.guard_parent(&mut transaction, collections::USERS, &owner)?;

        self.client
            .fluent()
            .update()
            .in_col(collections::CONTACTS)
            .document_id(contact.id.to_string())
            .object(contact)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add contact to transaction: {}", e))
            })?;

        for address in addresses {
            self.client
                .fluent()
                .update()
                .in_col(collections::ADDRESSES)
                .document_id(address.id.to_string())
                .object(address)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add address to transaction: {}", e))
                })?;
        }

        let stored = commit_guarded(transaction).await?;
        if stored {
            tracing::debug!(
                contact_id = %contact.id,
                addresses = addresses.len(),
                "Contact stored atomically"
            );
        }
        Ok(stored)
    }

    /// Update an existing contact. Returns `false` if it has been deleted.
    pub async fn save_contact(&self, contact: &Contact) -> Result<bool, AppError> {
        let result: Result<(), FirestoreError> = self
            .client
            .fluent()
            .update()
            .in_col(collections::CONTACTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(contact.id.to_string())
            .object(contact)
            .execute()
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(e) => Err(db_error(e)),
        }
    }

    /// Delete a contact, then its addresses.
    pub async fn delete_contact_cascade(&self, contact_id: Uuid) -> Result<usize, AppError> {
        let existed = self.get_contact(contact_id).await?.is_some();

        self.client
            .fluent()
            .delete()
            .from(collections::CONTACTS)
            .document_id(contact_id.to_string())
            .execute()
            .await
            .map_err(db_error)?;

        let addresses = self.list_addresses_for_contact(contact_id).await?;
        self.batch_delete(&addresses, collections::ADDRESSES, |a: &Address| {
            a.id.to_string()
        })
        .await?;

        Ok(addresses.len() + usize::from(existed))
    }

    // ─── Address Operations ──────────────────────────────────────

    pub async fn get_address(&self, address_id: Uuid) -> Result<Option<Address>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::ADDRESSES)
            .obj()
            .one(&address_id.to_string())
            .await
            .map_err(db_error)
    }

    pub async fn list_addresses_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<Address>, AppError> {
        let contact_id = contact_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::ADDRESSES)
            .filter(|q| q.for_all([q.field("contact_id").eq(contact_id.as_str())]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Create or replace an address while its contact still exists.
    pub async fn save_address(&self, address: &Address) -> Result<bool, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let contact = ParentGuard {
            id: address.contact_id,
        };
        self.guard_parent(&mut transaction, collections::CONTACTS, &contact)?;

        self.client
            .fluent()
            .update()
            .in_col(collections::ADDRESSES)
            .document_id(address.id.to_string())
            .object(address)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add address to transaction: {}", e))
            })?;

        commit_guarded(transaction).await
    }

    pub async fn delete_address(&self, address_id: Uuid) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::ADDRESSES)
            .document_id(address_id.to_string())
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Add a must-exist write on the parent document to `transaction`.
    fn guard_parent(
        &self,
        transaction: &mut firestore::FirestoreTransaction<'_>,
        collection: &str,
        parent: &ParentGuard,
    ) -> Result<(), AppError> {
        self.client
            .fluent()
            .update()
            .fields(["id"])
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(parent.id.to_string())
            .object(parent)
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add {} guard to transaction: {}",
                    collection, e
                ))
            })?;
        Ok(())
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Commit a transaction holding a parent guard; `false` if the parent is gone.
async fn commit_guarded(transaction: firestore::FirestoreTransaction<'_>) -> Result<bool, AppError> {
    match transaction.commit().await {
        Ok(_) => Ok(true),
        Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
        Err(e) => Err(AppError::Database(format!("Transaction commit failed: {}", e))),
    }
}
