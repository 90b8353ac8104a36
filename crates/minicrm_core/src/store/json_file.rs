//! JSON-file contact backend.
//!
//! # Responsibility
//! - Keep contacts in memory and mirror them to one pretty-printed JSON file.
//! - Rewrite the whole file after every mutation.
//!
//! # Invariants
//! - One `RwLock` guards the map, the id counter and the backing file.
//!   Mutations hold the write lock until the file rewrite has finished.
//! - After `open`, the id counter is `max(persisted id) + 1`.
//! - A failed rewrite is reported, but the in-memory mutation is kept.
//! - Single-process only: no cross-process file locking.

use super::{counter_after, take_id, ContactStore, StoreError, StoreResult};
use crate::model::contact::{Contact, ContactId};
use log::{debug, error, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct JsonState {
    contacts: HashMap<ContactId, Contact>,
    next_id: ContactId,
}

/// Contact store persisted as a JSON array on disk.
#[derive(Debug)]
pub struct JsonFileContactStore {
    path: PathBuf,
    state: RwLock<JsonState>,
}

impl JsonFileContactStore {
    /// Loads contacts from `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first mutation.
    ///
    /// # Errors
    /// - `StoreError::Io` when the file exists but cannot be read.
    /// - `StoreError::Parse` when the content is not a contact array.
    /// - `StoreError::IdsExhausted` when a persisted id is `ContactId::MAX`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let contacts = load_contacts(&path)?;
        let next_id = counter_after(contacts.keys().copied().max().unwrap_or(0))?;

        info!(
            "event=json_store_open module=store status=ok path={} contacts={} next_id={}",
            path.display(),
            contacts.len(),
            next_id
        );

        Ok(Self {
            path,
            state: RwLock::new(JsonState { contacts, next_id }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, state: &JsonState) -> StoreResult<()> {
        let mut contacts: Vec<&Contact> = state.contacts.values().collect();
        contacts.sort_by_key(|contact| contact.id);

        let data = serde_json::to_vec_pretty(&contacts).map_err(StoreError::Serialize)?;
        if let Err(err) = std::fs::write(&self.path, data) {
            error!(
                "event=json_store_flush module=store status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(StoreError::Io {
                path: self.path.clone(),
                source: err,
            });
        }

        debug!(
            "event=json_store_flush module=store status=ok path={} contacts={}",
            self.path.display(),
            contacts.len()
        );
        Ok(())
    }
}

impl ContactStore for JsonFileContactStore {
    fn add(&self, contact: &Contact) -> StoreResult<()> {
        let mut state = self.state.write();
        state.contacts.insert(contact.id, contact.clone());
        self.flush(&state)
    }

    fn get_all(&self) -> StoreResult<HashMap<ContactId, Contact>> {
        Ok(self.state.read().contacts.clone())
    }

    fn get_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.state.read().contacts.get(&id).cloned())
    }

    fn remove(&self, id: ContactId) -> StoreResult<()> {
        let mut state = self.state.write();
        if state.contacts.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.flush(&state)
    }

    fn update(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        let contact = state
            .contacts
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        contact.apply_update(name, email);
        self.flush(&state)
    }

    fn next_id(&self) -> StoreResult<ContactId> {
        take_id(&mut self.state.write().next_id)
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

fn load_contacts(path: &Path) -> StoreResult<HashMap<ContactId, Contact>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };

    let contacts: Vec<Contact> =
        serde_json::from_slice(&data).map_err(|err| StoreError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;

    Ok(contacts
        .into_iter()
        .map(|contact| (contact.id, contact))
        .collect())
}
