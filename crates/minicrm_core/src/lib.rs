//! Core library for the mini-CRM contact manager.
//! Owns the contact model, the storage contract and its three backends.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{
    config_info, load_config, load_config_from, Config, ConfigError, ConfigResult,
    LoggingConfig, StorageConfig, StorageType,
};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status, LoggingError};
pub use model::contact::{Contact, ContactId};
pub use service::contact_service::ContactService;
pub use store::{
    open_store, ContactStore, JsonFileContactStore, MemoryContactStore, SqliteContactStore,
    StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
