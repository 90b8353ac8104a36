//! Contact use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for the CLI and interactive menu.
//! - Own id allocation so callers never pair `next_id` and `add` by hand.
//!
//! # Invariants
//! - Service APIs never bypass the `ContactStore` contract.
//! - Service layer remains backend-agnostic.

use crate::model::contact::{Contact, ContactId};
use crate::store::{ContactStore, StoreError, StoreResult};
use log::{info, warn};

/// Use-case service wrapper for contact CRUD operations.
pub struct ContactService<S: ContactStore> {
    store: S,
}

impl<S: ContactStore> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocates an id, persists the contact and returns it.
    ///
    /// The id stays reserved even when persistence fails.
    pub fn add_contact(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> StoreResult<Contact> {
        let contact = Contact::new(self.store.next_id()?, name, email);
        self.store.add(&contact).map_err(|err| {
            warn!(
                "event=contact_add module=service status=error backend={} id={} error={}",
                self.store.backend_name(),
                contact.id,
                err
            );
            err
        })?;
        info!(
            "event=contact_add module=service status=ok backend={} id={}",
            self.store.backend_name(),
            contact.id
        );
        Ok(contact)
    }

    /// Lists all contacts ordered by id.
    pub fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self.store.get_all()?.into_values().collect();
        contacts.sort_by_key(|contact| contact.id);
        Ok(contacts)
    }

    pub fn get_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        self.store.get_by_id(id)
    }

    /// Applies a partial update; empty values keep the stored field.
    pub fn update_contact(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()> {
        let result = self.store.update(id, name, email);
        log_outcome("contact_update", self.store.backend_name(), id, &result);
        result
    }

    pub fn remove_contact(&self, id: ContactId) -> StoreResult<()> {
        let result = self.store.remove(id);
        log_outcome("contact_remove", self.store.backend_name(), id, &result);
        result
    }
}

fn log_outcome(event: &str, backend: &str, id: ContactId, result: &StoreResult<()>) {
    match result {
        Ok(()) => info!("event={event} module=service status=ok backend={backend} id={id}"),
        Err(StoreError::NotFound(_)) => {
            info!("event={event} module=service status=not_found backend={backend} id={id}")
        }
        Err(err) => warn!(
            "event={event} module=service status=error backend={backend} id={id} error={err}"
        ),
    }
}
