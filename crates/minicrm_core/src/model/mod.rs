//! Domain model for contact records.
//!
//! # Responsibility
//! - Define the canonical contact shape shared by every storage backend.
//!
//! # Invariants
//! - Every contact is identified by a store-assigned `ContactId`.
//! - Deletion is a hard delete; ids are never handed out twice by one store.

pub mod contact;
