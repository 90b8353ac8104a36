//! SQLite contact backend.
//!
//! # Responsibility
//! - Persist contacts in the single `contacts` table.
//! - Keep a local id counter derived from the highest persisted id.
//!
//! # Invariants
//! - Inserts use the id handed out by `next_id`; SQLite auto-increment is
//!   never consulted, so the counter and the primary key stay consistent only
//!   through this store.
//! - No application-level lock: the counter can drift if another process
//!   writes the same database.

use super::{counter_after, take_id, ContactStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::contact::{Contact, ContactId};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

const CONTACT_SELECT_SQL: &str = "SELECT id, name, email FROM contacts";

/// Relational contact store over one owned SQLite connection.
#[derive(Debug)]
pub struct SqliteContactStore {
    conn: Connection,
    next_id: Cell<ContactId>,
}

impl SqliteContactStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// The id counter starts right after the highest persisted id, or at 1
    /// for an empty table. Fails with `StoreError::IdsExhausted` when the
    /// highest persisted id is `ContactId::MAX`.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let max_id: ContactId =
            conn.query_row("SELECT COALESCE(MAX(id), 0) FROM contacts;", [], |row| {
                row.get(0)
            })?;
        let next_id = counter_after(max_id)?;

        info!("event=sqlite_store_open module=store status=ok next_id={next_id}");

        Ok(Self {
            conn,
            next_id: Cell::new(next_id),
        })
    }
}

impl ContactStore for SqliteContactStore {
    fn add(&self, contact: &Contact) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO contacts (id, name, email) VALUES (?1, ?2, ?3);",
            params![contact.id, contact.name.as_str(), contact.email.as_str()],
        )?;
        Ok(())
    }

    fn get_all(&self) -> StoreResult<HashMap<ContactId, Contact>> {
        let mut stmt = self.conn.prepare(CONTACT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut contacts = HashMap::new();

        while let Some(row) = rows.next()? {
            let contact = parse_contact_row(row)?;
            contacts.insert(contact.id, contact);
        }

        Ok(contacts)
    }

    fn get_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let contact = self
            .conn
            .query_row(
                &format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_contact_row,
            )
            .optional()?;
        Ok(contact)
    }

    fn remove(&self, id: ContactId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    fn update(&self, id: ContactId, name: &str, email: &str) -> StoreResult<()> {
        if self.get_by_id(id)?.is_none() {
            return Err(StoreError::NotFound(id));
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if !name.is_empty() {
            assignments.push("name = ?");
            bind_values.push(Value::Text(name.to_string()));
        }
        if !email.is_empty() {
            assignments.push("email = ?");
            bind_values.push(Value::Text(email.to_string()));
        }

        if assignments.is_empty() {
            debug!("event=sqlite_update module=store status=skipped id={id} reason=no_fields");
            return Ok(());
        }

        let sql = format!(
            "UPDATE contacts SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));
        self.conn.execute(&sql, params_from_iter(bind_values))?;

        Ok(())
    }

    fn next_id(&self) -> StoreResult<ContactId> {
        let mut counter = self.next_id.get();
        let id = take_id(&mut counter)?;
        self.next_id.set(counter);
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn parse_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}
