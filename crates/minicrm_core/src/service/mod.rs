//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI and menu code decoupled from the active backend.

pub mod contact_service;
