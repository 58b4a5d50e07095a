//! Key-value preference storage.
//!
//! [`PrefsBackend`] is the store behind every
//! [`PersistedValue`](crate::values::persisted::PersistedValue). Two
//! implementations ship with the crate:
//! - [`MemoryPrefs`] – in-process map, used by tests and throwaway sessions
//! - [`IniPrefs`] – INI file, rewritten on every set so values survive restarts
//!
//! # File Format
//!
//! ```ini
//! [int]
//! coins = 120
//! level = 3
//!
//! [string]
//! player_name = "Tars"
//! ```
//!
//! Strings are stored JSON-quoted, with `;` and `#` escaped, so comment
//! characters, newlines and surrounding whitespace round-trip.

use crate::error::PersistenceError;
use configparser::ini::Ini;
use log::{info, trace, warn};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const INT_SECTION: &str = "int";
const STRING_SECTION: &str = "string";

/// A stored preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    Int(i32),
    Str(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Int(v) => write!(f, "{v}"),
            PrefValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Durable string-keyed store of ints and strings.
///
/// Reads of a missing key (or a key holding the other kind of value) return
/// the supplied default; only real storage faults are errors.
pub trait PrefsBackend {
    fn get_int(&self, key: &str, default: i32) -> Result<i32, PersistenceError>;
    fn set_int(&self, key: &str, value: i32) -> Result<(), PersistenceError>;
    fn get_string(&self, key: &str, default: &str) -> Result<String, PersistenceError>;
    fn set_string(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn has_key(&self, key: &str) -> bool;
    fn delete_key(&self, key: &str) -> Result<(), PersistenceError>;
    /// All stored entries, sorted by key.
    fn entries(&self) -> Vec<(String, PrefValue)>;
}

/// Shared handle to the session's backend.
///
/// Stored as a non-send resource; clone the inner `Rc` to build values.
pub struct Prefs(pub Rc<dyn PrefsBackend>);

impl Prefs {
    pub fn new(backend: impl PrefsBackend + 'static) -> Self {
        Prefs(Rc::new(backend))
    }

    pub fn backend(&self) -> Rc<dyn PrefsBackend> {
        Rc::clone(&self.0)
    }
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    entries: RefCell<FxHashMap<String, PrefValue>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        MemoryPrefs::default()
    }
}

impl PrefsBackend for MemoryPrefs {
    fn get_int(&self, key: &str, default: i32) -> Result<i32, PersistenceError> {
        match self.entries.borrow().get(key) {
            Some(PrefValue::Int(v)) => Ok(*v),
            Some(PrefValue::Str(_)) => {
                trace!("Key '{}' holds a string, returning int default", key);
                Ok(default)
            }
            None => Ok(default),
        }
    }

    fn set_int(&self, key: &str, value: i32) -> Result<(), PersistenceError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), PrefValue::Int(value));
        Ok(())
    }

    fn get_string(&self, key: &str, default: &str) -> Result<String, PersistenceError> {
        match self.entries.borrow().get(key) {
            Some(PrefValue::Str(s)) => Ok(s.clone()),
            Some(PrefValue::Int(_)) => {
                trace!("Key '{}' holds an int, returning string default", key);
                Ok(default.to_string())
            }
            None => Ok(default.to_string()),
        }
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), PrefValue::Str(value.to_string()));
        Ok(())
    }

    fn has_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn delete_key(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn entries(&self) -> Vec<(String, PrefValue)> {
        let mut out: Vec<(String, PrefValue)> = self
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// INI-file backend.
///
/// Ints live in the `[int]` section and strings in `[string]`. Every set or
/// delete rewrites the file.
pub struct IniPrefs {
    path: PathBuf,
    ini: RefCell<Ini>,
}

impl IniPrefs {
    /// Open the preferences file at `path`, starting empty if it does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let mut ini = Ini::new_cs();
        if path.exists() {
            ini.load(&path).map_err(PersistenceError::Load)?;
            info!("Loaded preferences from {:?}", path);
        } else {
            info!("Preferences file {:?} not found, starting empty", path);
        }
        Ok(IniPrefs {
            path,
            ini: RefCell::new(ini),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.ini.borrow().write(&self.path)?;
        trace!("Wrote preferences to {:?}", self.path);
        Ok(())
    }

    /// Apply `change` and write the file. If the write fails the in-memory
    /// state goes back to what it was, so it never reports unsaved values.
    fn write_through(&self, change: impl FnOnce(&mut Ini)) -> Result<(), PersistenceError> {
        let previous = self.ini.borrow().clone();
        change(&mut *self.ini.borrow_mut());
        self.flush().inspect_err(|e| {
            warn!("Failed to write preferences to {:?}: {}", self.path, e);
            *self.ini.borrow_mut() = previous;
        })
    }
}

/// Quote a string as JSON so newlines and comment characters survive the
/// line-based INI format.
fn encode_string(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() + 2);
    for c in serde_json::Value::from(value).to_string().chars() {
        match c {
            ';' => encoded.push_str("\\u003b"),
            '#' => encoded.push_str("\\u0023"),
            c => encoded.push(c),
        }
    }
    encoded
}

/// Inverse of [`encode_string`]. Unquoted values (hand-edited files) are
/// returned as written.
fn decode_string(raw: &str) -> String {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string())
}

impl PrefsBackend for IniPrefs {
    fn get_int(&self, key: &str, default: i32) -> Result<i32, PersistenceError> {
        let stored = self
            .ini
            .borrow()
            .getint(INT_SECTION, key)
            .map_err(|reason| PersistenceError::Corrupt {
                key: key.to_string(),
                reason,
            })?;
        match stored {
            Some(v) => i32::try_from(v).map_err(|e| PersistenceError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn set_int(&self, key: &str, value: i32) -> Result<(), PersistenceError> {
        self.write_through(|ini| {
            ini.remove_key(STRING_SECTION, key);
            ini.set(INT_SECTION, key, Some(value.to_string()));
        })
    }

    fn get_string(&self, key: &str, default: &str) -> Result<String, PersistenceError> {
        Ok(self
            .ini
            .borrow()
            .get(STRING_SECTION, key)
            .map_or_else(|| default.to_string(), |raw| decode_string(&raw)))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.write_through(|ini| {
            ini.remove_key(INT_SECTION, key);
            ini.set(STRING_SECTION, key, Some(encode_string(value)));
        })
    }

    fn has_key(&self, key: &str) -> bool {
        let ini = self.ini.borrow();
        ini.get(INT_SECTION, key).is_some() || ini.get(STRING_SECTION, key).is_some()
    }

    fn delete_key(&self, key: &str) -> Result<(), PersistenceError> {
        self.write_through(|ini| {
            ini.remove_key(INT_SECTION, key);
            ini.remove_key(STRING_SECTION, key);
        })
    }

    fn entries(&self) -> Vec<(String, PrefValue)> {
        let ini = self.ini.borrow();
        let map = ini.get_map_ref();
        let mut out = Vec::new();
        if let Some(ints) = map.get(INT_SECTION) {
            for (key, value) in ints {
                match value.as_deref().map(str::parse::<i32>) {
                    Some(Ok(v)) => out.push((key.clone(), PrefValue::Int(v))),
                    _ => warn!("Skipping unreadable int preference '{}'", key),
                }
            }
        }
        if let Some(strings) = map.get(STRING_SECTION) {
            for (key, value) in strings {
                let value = value.as_deref().map(decode_string).unwrap_or_default();
                out.push((key.clone(), PrefValue::Str(value)));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
