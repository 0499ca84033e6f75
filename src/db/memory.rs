// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Never hold a map guard across a call that touches the same map.
//!
//! Child writes hold a read guard on the parent while inserting, and
//! cascades remove the parent before its children, so a child can never
//! outlive its parent.

use crate::models::{Address, Contact, RoleRecord, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: DashMap<Uuid, User>,
    /// normalized user name -> user id
    user_names: DashMap<String, Uuid>,
    roles: DashMap<Uuid, RoleRecord>,
    contacts: DashMap<Uuid, Contact>,
    addresses: DashMap<Uuid, Address>,
}

/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    // ─── Users ───────────────────────────────────────────────────

    pub fn get_user(&self, user_id: Uuid) -> Option<User> {
        self.tables.users.get(&user_id).map(|u| u.value().clone())
    }

    pub fn find_user_by_normalized_name(&self, normalized: &str) -> Option<User> {
        let user_id = *self.tables.user_names.get(normalized)?.value();
        self.get_user(user_id)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.tables
            .users
            .iter()
            .map(|u| u.value().clone())
            .collect()
    }

    /// Reserve the user name and store the user atomically.
    pub fn insert_user(&self, user: &User) -> bool {
        match self
            .tables
            .user_names
            .entry(user.normalized_user_name.clone())
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.tables.users.insert(user.id, user.clone());
                slot.insert(user.id);
                true
            }
        }
    }

    pub fn update_user(&self, user: &User) {
        self.tables.users.insert(user.id, user.clone());
    }

    pub fn delete_user_cascade(&self, user_id: Uuid) -> usize {
        let mut deleted = 0;
        if let Some((_, user)) = self.tables.users.remove(&user_id) {
            self.tables.user_names.remove(&user.normalized_user_name);
            deleted += 1;
        }

        let contact_ids: Vec<Uuid> = self
            .tables
            .contacts
            .iter()
            .filter(|c| c.owner_id == user_id)
            .map(|c| *c.key())
            .collect();

        deleted
            + contact_ids
                .into_iter()
                .map(|contact_id| self.delete_contact_cascade(contact_id))
                .sum::<usize>()
    }

    // ─── Roles ───────────────────────────────────────────────────

    pub fn list_roles(&self) -> Vec<RoleRecord> {
        self.tables
            .roles
            .iter()
            .map(|r| r.value().clone())
            .collect()
    }

    pub fn get_role(&self, role_id: Uuid) -> Option<RoleRecord> {
        self.tables.roles.get(&role_id).map(|r| r.value().clone())
    }

    pub fn insert_role(&self, role: &RoleRecord) {
        self.tables.roles.insert(role.id, role.clone());
    }

    // ─── Contacts ────────────────────────────────────────────────

    pub fn get_contact(&self, contact_id: Uuid) -> Option<Contact> {
        self.tables
            .contacts
            .get(&contact_id)
            .map(|c| c.value().clone())
    }

    pub fn list_contacts_for_owner(&self, owner_id: Uuid) -> Vec<Contact> {
        self.tables
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| c.value().clone())
            .collect()
    }

    pub fn count_contacts_for_owner(&self, owner_id: Uuid) -> usize {
        self.tables
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .count()
    }

    /// Store a contact and its addresses unless the owner is gone.
    pub fn insert_contact(&self, contact: &Contact, addresses: &[Address]) -> bool {
        let Some(_owner) = self.tables.users.get(&contact.owner_id) else {
            return false;
        };
        self.tables.contacts.insert(contact.id, contact.clone());
        for address in addresses {
            self.tables.addresses.insert(address.id, address.clone());
        }
        true
    }

    /// Replace an existing contact; `false` if it has been deleted.
    pub fn update_contact(&self, contact: &Contact) -> bool {
        match self.tables.contacts.get_mut(&contact.id) {
            Some(mut stored) => {
                *stored = contact.clone();
                true
            }
            None => false,
        }
    }

    pub fn delete_contact_cascade(&self, contact_id: Uuid) -> usize {
        let mut deleted = usize::from(self.tables.contacts.remove(&contact_id).is_some());

        let address_ids: Vec<Uuid> = self
            .tables
            .addresses
            .iter()
            .filter(|a| a.contact_id == contact_id)
            .map(|a| *a.key())
            .collect();

        for address_id in address_ids {
            if self.tables.addresses.remove(&address_id).is_some() {
                deleted += 1;
            }
        }
        deleted
    }

    // ─── Addresses ───────────────────────────────────────────────

    pub fn get_address(&self, address_id: Uuid) -> Option<Address> {
        self.tables
            .addresses
            .get(&address_id)
            .map(|a| a.value().clone())
    }

    pub fn list_addresses_for_contact(&self, contact_id: Uuid) -> Vec<Address> {
        self.tables
            .addresses
            .iter()
            .filter(|a| a.contact_id == contact_id)
            .map(|a| a.value().clone())
            .collect()
    }

    /// Create or replace an address unless its contact is gone.
    pub fn save_address(&self, address: &Address) -> bool {
        let Some(_contact) = self.tables.contacts.get(&address.contact_id) else {
            return false;
        };
        self.tables.addresses.insert(address.id, address.clone());
        true
    }

    pub fn delete_address(&self, address_id: Uuid) {
        self.tables.addresses.remove(&address_id);
    }
}
