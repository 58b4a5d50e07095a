//! Error types shared across the crate.
//!
//! A missing preference key is never an error; it resolves to the default.
//! Only real storage, document and registry faults land here.

use thiserror::Error;

/// Faults raised by a [`PrefsBackend`](crate::resources::prefs::PrefsBackend).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load preferences: {0}")]
    Load(String),

    #[error("Stored value for '{key}' is unreadable: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Faults raised by the [`DocumentStore`](crate::values::document::DocumentStore).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document name: {0:?}")]
    InvalidName(String),

    #[error("Malformed document '{name}': {source}")]
    Format {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults raised by the [`Scriptables`](crate::resources::scriptables::Scriptables) registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Can't find scriptable {0}")]
    NotFound(&'static str),

    #[error("Scriptable {0} is already registered")]
    Duplicate(&'static str),
}

/// Faults raised while reading or writing the [`StoreConfig`](crate::resources::config::StoreConfig) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    Load(String),

    #[error("Invalid value for [{section}] {key}: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        reason: String,
    },

    #[error("Failed to save config file: {0}")]
    Save(#[from] std::io::Error),
}
