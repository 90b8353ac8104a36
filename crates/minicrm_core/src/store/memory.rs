//! In-memory contact backend.
//!
//! Baseline implementation with no persistence: all state is lost when the
//! store is dropped. Interior mutability uses `RefCell`/`Cell`, so the store
//! is `!Sync` and meant for one logical caller at a time.

use super::{take_id, ContactStore, StoreError, StoreResult};
use crate::model::contact::{Contact, ContactId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug)]
pub struct MemoryContactStore {
    contacts: RefCell<HashMap<ContactId, Contact>>,
    next_id: Cell<ContactId>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self {
            contacts: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore for MemoryContactStore {
    fn add(&self, contact: &Contact) -> StoreResult<()> {
        self.contacts.borrow_mut().insert(contact.id, contact.clone());
        Ok(())
    }

    fn get_all(&self) -> StoreResult<HashMap<ContactId, Contact>> {
        Ok(self.contacts.borrow().clone())
    }

    fn get_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.contacts.borrow().get(&id).cloned())
    }

    fn remove(&self, id: ContactId) -> StoreResult<()> {
        match self.contacts.borrow_mut().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn update(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()> {
        let mut contacts = self.contacts.borrow_mut();
        let contact = contacts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        contact.apply_update(name, email);
        Ok(())
    }

    fn next_id(&self) -> StoreResult<ContactId> {
        let mut counter = self.next_id.get();
        let id = take_id(&mut counter)?;
        self.next_id.set(counter);
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
