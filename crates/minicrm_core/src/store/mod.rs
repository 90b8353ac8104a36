//! Contact storage contract and backend implementations.
//!
//! # Responsibility
//! - Define the `ContactStore` contract every backend satisfies.
//! - Select and construct one backend from configuration.
//!
//! # Invariants
//! - Ids returned by `next_id` are never returned twice by one store
//!   instance, even when the id is never passed to `add`.
//! - Missing ids are reported as `StoreError::NotFound` by `remove`/`update`
//!   and as `Ok(None)` by `get_by_id`.
//! - Read APIs return owned copies; callers can only change stored state
//!   through `update`.

use crate::config::{StorageConfig, StorageType};
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId};
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileContactStore;
pub use memory::MemoryContactStore;
pub use sqlite::SqliteContactStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy shared by all contact backends.
#[derive(Debug)]
pub enum StoreError {
    /// `remove`/`update` against an id the store does not hold.
    NotFound(ContactId),
    /// Reading or writing the JSON backing file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The JSON backing file exists but does not hold a contact array.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
    Db(DbError),
    /// The id counter cannot advance past `ContactId::MAX`.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "contact with id {id} does not exist"),
            Self::Io { path, source } => {
                write!(f, "contact file `{}` I/O failed: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "contact file `{}` is malformed: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize contacts: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::IdsExhausted => write!(f, "contact id space is exhausted"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::IdsExhausted => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for contact CRUD.
///
/// All methods take `&self`; each backend picks its own interior mutability
/// (none shared, a reader/writer lock, or the SQLite engine).
pub trait ContactStore {
    /// Inserts a contact whose id was obtained from [`ContactStore::next_id`].
    fn add(&self, contact: &Contact) -> StoreResult<()>;
    /// Returns every stored contact keyed by id. No ordering is implied.
    fn get_all(&self) -> StoreResult<HashMap<ContactId, Contact>>;
    fn get_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>>;
    fn remove(&self, id: ContactId) -> StoreResult<()>;
    /// Overwrites the non-empty fields among `name`/`email`.
    fn update(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()>;
    /// Reserves and returns a fresh id.
    ///
    /// Fails with `StoreError::IdsExhausted` once the counter reaches
    /// `ContactId::MAX`; that value itself is never handed out.
    fn next_id(&self) -> StoreResult<ContactId>;
    /// Short backend label used in logs and diagnostics.
    fn backend_name(&self) -> &'static str;
}

impl<S: ContactStore + ?Sized> ContactStore for Box<S> {
    fn add(&self, contact: &Contact) -> StoreResult<()> {
        (**self).add(contact)
    }

    fn get_all(&self) -> StoreResult<HashMap<ContactId, Contact>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        (**self).get_by_id(id)
    }

    fn remove(&self, id: ContactId) -> StoreResult<()> {
        (**self).remove(id)
    }

    fn update(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()> {
        (**self).update(id, name, email)
    }

    fn next_id(&self) -> StoreResult<ContactId> {
        (**self).next_id()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// First counter value for a store whose highest persisted id is `max_id`.
pub(crate) fn counter_after(max_id: ContactId) -> StoreResult<ContactId> {
    max_id.checked_add(1).ok_or(StoreError::IdsExhausted)
}

/// Returns the current counter value and advances it by one.
pub(crate) fn take_id(counter: &mut ContactId) -> StoreResult<ContactId> {
    let id = *counter;
    *counter = counter_after(id)?;
    Ok(id)
}

/// Builds the backend selected by `config`.
///
/// # Errors
/// - JSON backend: the file exists but cannot be read or parsed.
/// - SQLite backend: the database cannot be opened or migrated.
pub fn open_store(config: &StorageConfig) -> StoreResult<Box<dyn ContactStore>> {
    let store: Box<dyn ContactStore> = match config.kind {
        StorageType::Memory => Box::new(MemoryContactStore::new()),
        StorageType::Json => Box::new(JsonFileContactStore::open(&config.json_file)?),
        StorageType::Sqlite => Box::new(SqliteContactStore::open(&config.db_path)?),
    };
    info!(
        "event=store_open module=store status=ok backend={}",
        store.backend_name()
    );
    Ok(store)
}
