// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Db`] fronts either Firestore or an in-process store. Handlers only see
//! `Db`; ordering of list results is applied here so both backends agree.

pub mod firestore;
pub mod memory;
pub mod seed;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::user::normalize_user_name;
use crate::models::{Address, Contact, Role, RoleRecord, User};
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Name reservations keyed by normalized user name.
    pub const USER_NAMES: &str = "user_names";
    pub const ROLES: &str = "roles";
    pub const CONTACTS: &str = "contacts";
    pub const ADDRESSES: &str = "addresses";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

/// Storage handle shared by all requests.
#[derive(Clone)]
pub struct Db {
    backend: Backend,
}

impl Db {
    /// Connect to the backend selected in `config`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage {
            StorageBackend::Firestore => {
                let store = FirestoreStore::new(&config.gcp_project_id).await?;
                Ok(Self {
                    backend: Backend::Firestore(store),
                })
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data will not survive a restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Empty in-process store (tests and local development).
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::default()),
        }
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_user(user_id).await,
            Backend::Memory(store) => Ok(store.get_user(user_id)),
        }
    }

    /// Look a user up by name (case-insensitive).
    pub async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, AppError> {
        let normalized = normalize_user_name(user_name);
        match &self.backend {
            Backend::Firestore(store) => store.find_user_by_normalized_name(&normalized).await,
            Backend::Memory(store) => Ok(store.find_user_by_normalized_name(&normalized)),
        }
    }

    /// All users, ordered by user name.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users = match &self.backend {
            Backend::Firestore(store) => store.list_users().await?,
            Backend::Memory(store) => store.list_users(),
        };
        users.sort_by(|a, b| a.normalized_user_name.cmp(&b.normalized_user_name));
        Ok(users)
    }

    /// Insert a new user. Returns `false` if the user name is already taken.
    pub async fn insert_user(&self, user: &User) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.insert_user(user).await,
            Backend::Memory(store) => Ok(store.insert_user(user)),
        }
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.save_user(user).await,
            Backend::Memory(store) => {
                store.update_user(user);
                Ok(())
            }
        }
    }

    /// Delete a user with all of its contacts and their addresses.
    ///
    /// Returns the number of records deleted.
    pub async fn delete_user_cascade(&self, user_id: Uuid) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.delete_user_cascade(user_id).await,
            Backend::Memory(store) => Ok(store.delete_user_cascade(user_id)),
        }
    }

    // ─── Roles ───────────────────────────────────────────────────

    pub async fn list_roles(&self) -> Result<Vec<RoleRecord>, AppError> {
        let mut roles = match &self.backend {
            Backend::Firestore(store) => store.list_roles().await?,
            Backend::Memory(store) => store.list_roles(),
        };
        roles.sort_by(|a, b| a.name.name().cmp(b.name.name()));
        Ok(roles)
    }

    pub async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_role(role_id).await,
            Backend::Memory(store) => Ok(store.get_role(role_id)),
        }
    }

    pub async fn find_role(&self, role: Role) -> Result<Option<RoleRecord>, AppError> {
        Ok(self
            .list_roles()
            .await?
            .into_iter()
            .find(|record| record.name == role))
    }

    pub async fn insert_role(&self, role: &RoleRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.save_role(role).await,
            Backend::Memory(store) => {
                store.insert_role(role);
                Ok(())
            }
        }
    }

    // ─── Contacts ────────────────────────────────────────────────

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_contact(contact_id).await,
            Backend::Memory(store) => Ok(store.get_contact(contact_id)),
        }
    }

    /// Contacts owned by `owner_id`, ordered by last name then first name.
    pub async fn list_contacts_for_owner(&self, owner_id: Uuid) -> Result<Vec<Contact>, AppError> {
        let mut contacts = match &self.backend {
            Backend::Firestore(store) => store.list_contacts_for_owner(owner_id).await?,
            Backend::Memory(store) => store.list_contacts_for_owner(owner_id),
        };
        contacts.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(contacts)
    }

    pub async fn count_contacts_for_owner(&self, owner_id: Uuid) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Firestore(store) => Ok(store.list_contacts_for_owner(owner_id).await?.len()),
            Backend::Memory(store) => Ok(store.count_contacts_for_owner(owner_id)),
        }
    }

    /// Store a new contact together with its initial addresses.
    ///
    /// Fails with `NotFound` if the owner was deleted in the meantime.
    pub async fn insert_contact(
        &self,
        contact: &Contact,
        addresses: &[Address],
    ) -> Result<(), AppError> {
        let stored = match &self.backend {
            Backend::Firestore(store) => store.insert_contact(contact, addresses).await?,
            Backend::Memory(store) => store.insert_contact(contact, addresses),
        };
        parent_present(stored, "User not found.")
    }

    /// Replace an existing contact; `NotFound` if it has been deleted.
    pub async fn update_contact(&self, contact: &Contact) -> Result<(), AppError> {
        let stored = match &self.backend {
            Backend::Firestore(store) => store.save_contact(contact).await?,
            Backend::Memory(store) => store.update_contact(contact),
        };
        parent_present(stored, "Contact not found.")
    }

    /// Delete a contact and its addresses. Returns the number of records deleted.
    pub async fn delete_contact_cascade(&self, contact_id: Uuid) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.delete_contact_cascade(contact_id).await,
            Backend::Memory(store) => Ok(store.delete_contact_cascade(contact_id)),
        }
    }

    // ─── Addresses ───────────────────────────────────────────────

    pub async fn get_address(&self, address_id: Uuid) -> Result<Option<Address>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_address(address_id).await,
            Backend::Memory(store) => Ok(store.get_address(address_id)),
        }
    }

    /// Addresses of a contact, ordered by street name then street number.
    pub async fn list_addresses_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<Address>, AppError> {
        let mut addresses = match &self.backend {
            Backend::Firestore(store) => store.list_addresses_for_contact(contact_id).await?,
            Backend::Memory(store) => store.list_addresses_for_contact(contact_id),
        };
        addresses.sort_by(|a, b| {
            a.street_name
                .cmp(&b.street_name)
                .then_with(|| a.street_number.cmp(&b.street_number))
        });
        Ok(addresses)
    }

    /// Create or replace an address; `NotFound` if its contact has been deleted.
    pub async fn save_address(&self, address: &Address) -> Result<(), AppError> {
        let stored = match &self.backend {
            Backend::Firestore(store) => store.save_address(address).await?,
            Backend::Memory(store) => store.save_address(address),
        };
        parent_present(stored, "Contact not found.")
    }

    pub async fn delete_address(&self, address_id: Uuid) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.delete_address(address_id).await,
            Backend::Memory(store) => {
                store.delete_address(address_id);
                Ok(())
            }
        }
    }
}

fn parent_present(stored: bool, missing: &str) -> Result<(), AppError> {
    if stored {
        Ok(())
    } else {
        Err(AppError::NotFound(missing.to_string()))
    }
}
