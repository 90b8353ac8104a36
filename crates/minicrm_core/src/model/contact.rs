//! Contact domain model.
//!
//! # Responsibility
//! - Define the record persisted by every `ContactStore` backend.
//! - Own the partial-update rule shared by all backends.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `name`/`email` are free text; empty strings are legal values.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned contact identifier. Allocation starts at 1.
pub type ContactId = i64;

/// Canonical contact record.
///
/// Serialized as `{"id": .., "name": .., "email": ..}`; the JSON backend
/// writes an array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn new(id: ContactId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Overwrites each field whose supplied value is non-empty.
    ///
    /// Returns `true` when at least one field was replaced. An empty string
    /// means "leave unchanged", so `apply_update("", "")` is always a no-op.
    pub fn apply_update(&mut self, name: &str, email: &str) -> bool {
        let mut changed = false;
        if !name.is_empty() {
            self.name = name.to_string();
            changed = true;
        }
        if !email.is_empty() {
            self.email = email.to_string();
            changed = true;
        }
        changed
    }
}

impl Display for Contact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id: {}, Name: {}, Email: {}", self.id, self.name, self.email)
    }
}
