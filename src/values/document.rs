//! Structured documents persisted as files.
//!
//! [`DocumentStore`] maps a document name to `<root>/<name>.json`.
//! [`DocumentObject`] wraps one document: it loads on construction, falls
//! back to `T::default()` when the file is missing or malformed, and writes
//! back on [`DocumentObject::save`]. Load and save durations are logged.

use crate::error::DocumentError;
use bevy_ecs::prelude::Resource;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DOCUMENT_EXTENSION: &str = "json";

/// Directory of named JSON documents.
#[derive(Resource, Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DocumentStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `name`. Names must be a single plain path component.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, DocumentError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && Path::new(name).components().count() == 1;
        if !plain {
            warn!("Rejected document name {:?}", name);
            return Err(DocumentError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{DOCUMENT_EXTENSION}")))
    }

    /// Serialize `value` under `name`, creating the root directory if needed.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), DocumentError> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.root)?;
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| DocumentError::Format {
            name: name.to_string(),
            source,
        })?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Deserialize the document stored under `name`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, DocumentError> {
        let bytes = match std::fs::read(self.path_for(name)?) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DocumentError::NotFound(name.to_string()));
            }
            Err(e) => return Err(DocumentError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| DocumentError::Format {
            name: name.to_string(),
            source,
        })
    }

    /// Remove the document stored under `name`. Removing a missing document
    /// is not an error.
    pub fn remove(&self, name: &str) -> Result<(), DocumentError> {
        match std::fs::remove_file(self.path_for(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocumentError::Io(e)),
        }
    }

    /// Names of all stored documents, sorted.
    pub fn names(&self) -> Result<Vec<String>, DocumentError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DocumentError::Io(e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A named document held in memory.
#[derive(Debug)]
pub struct DocumentObject<T> {
    name: String,
    value: T,
    store: DocumentStore,
}

impl<T> DocumentObject<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Load `name` from `store`, or start from `T::default()` when it cannot
    /// be read.
    pub fn open(store: DocumentStore, name: impl Into<String>) -> Self {
        let name = name.into();
        let started = Instant::now();
        let value = match store.load::<T>(&name) {
            Ok(value) => {
                debug!(
                    "Deserialization of {} lasted {:.2} milliseconds.",
                    name,
                    started.elapsed().as_secs_f64() * 1000.0
                );
                value
            }
            Err(DocumentError::NotFound(_)) => {
                info!("Document {} not found, starting from defaults", name);
                T::default()
            }
            Err(e) => {
                warn!("{}; starting from defaults", e);
                T::default()
            }
        };
        DocumentObject { name, value, store }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Write the current value back to the store.
    pub fn save(&self) -> Result<(), DocumentError> {
        let started = Instant::now();
        self.store.save(&self.name, &self.value)?;
        debug!(
            "Serialization of {} lasted {:.2} milliseconds.",
            self.name,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Inventory {
        coins: u32,
        items: Vec<String>,
    }

    fn temp_store(name: &str) -> DocumentStore {
        let dir = std::env::temp_dir().join(format!(
            "smartvalues-docs-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        DocumentStore::new(dir)
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let store = temp_store("missing");
        let err = store.load::<Inventory>("inventory").unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(ref n) if n == "inventory"));
    }

    #[test]
    fn test_corrupt_document_is_format_error() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(store.path_for("inventory").unwrap(), b"{ not json").unwrap();
        let err = store.load::<Inventory>("inventory").unwrap_err();
        assert!(matches!(err, DocumentError::Format { .. }));
    }

    #[test]
    fn test_open_falls_back_to_default_on_corrupt_file() {
        let store = temp_store("fallback");
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(store.path_for("inventory").unwrap(), b"[1, 2").unwrap();
        let doc = DocumentObject::<Inventory>::open(store, "inventory");
        assert_eq!(doc.value(), &Inventory::default());
    }

    #[test]
    fn test_save_then_open_restores_value() {
        let store = temp_store("restore");
        let mut doc = DocumentObject::<Inventory>::open(store.clone(), "inventory");
        doc.value_mut().coins = 40;
        doc.value_mut().items.push("lantern".to_string());
        doc.save().unwrap();

        let reopened = DocumentObject::<Inventory>::open(store.clone(), "inventory");
        assert_eq!(reopened.value().coins, 40);
        assert_eq!(reopened.value().items, vec!["lantern".to_string()]);
        assert_eq!(store.names().unwrap(), vec!["inventory".to_string()]);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let store = temp_store("remove");
        store.remove("nothing").unwrap();
        assert!(store.names().unwrap().is_empty());
    }

    #[test]
    fn test_names_outside_root_are_rejected() {
        let store = temp_store("escape");
        for name in ["../x", "a/b", "a\\b", "..", ".", ""] {
            assert!(
                matches!(store.path_for(name), Err(DocumentError::InvalidName(ref n)) if n == name),
                "{name:?} should be rejected"
            );
            assert!(matches!(
                store.load::<Inventory>(name),
                Err(DocumentError::InvalidName(_))
            ));
        }
        assert!(matches!(
            store.save("../x", &Inventory::default()),
            Err(DocumentError::InvalidName(_))
        ));
        assert!(matches!(store.remove("../x"), Err(DocumentError::InvalidName(_))));
        assert!(!store.root().exists());
    }
}
