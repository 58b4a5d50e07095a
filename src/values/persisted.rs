//! Values backed by the preference store.
//!
//! A [`PersistedValue`] reads its key lazily: the first [`get`] pulls the
//! stored value (or the default when the key is absent) and immediately
//! writes it back, so after first use the store always holds an explicit
//! entry. Later reads come from the cache. [`set`] writes through to the
//! store and then notifies subscribers.
//!
//! [`get`]: PersistedValue::get
//! [`set`]: PersistedValue::set

use super::observers::{Observable, Observers, Subscription};
use crate::error::PersistenceError;
use crate::resources::prefs::PrefsBackend;
use log::{debug, trace};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Types that know which slot of a [`PrefsBackend`] they live in.
pub trait Persisted: Clone + 'static {
    fn load(prefs: &dyn PrefsBackend, key: &str, default: &Self) -> Result<Self, PersistenceError>;
    fn store(prefs: &dyn PrefsBackend, key: &str, value: &Self) -> Result<(), PersistenceError>;
}

impl Persisted for i32 {
    fn load(prefs: &dyn PrefsBackend, key: &str, default: &Self) -> Result<Self, PersistenceError> {
        prefs.get_int(key, *default)
    }
    fn store(prefs: &dyn PrefsBackend, key: &str, value: &Self) -> Result<(), PersistenceError> {
        prefs.set_int(key, *value)
    }
}

impl Persisted for String {
    fn load(prefs: &dyn PrefsBackend, key: &str, default: &Self) -> Result<Self, PersistenceError> {
        prefs.get_string(key, default)
    }
    fn store(prefs: &dyn PrefsBackend, key: &str, value: &Self) -> Result<(), PersistenceError> {
        prefs.set_string(key, value)
    }
}

/// Reactive value stored under `key` in a preference backend.
pub struct PersistedValue<T: Persisted> {
    key: String,
    default: T,
    cached: RefCell<Option<T>>,
    prefs: Rc<dyn PrefsBackend>,
    observers: Observers<T>,
}

/// Persisted integer.
pub type SavedInt = PersistedValue<i32>;
/// Persisted string.
pub type SavedString = PersistedValue<String>;

impl<T: Persisted> PersistedValue<T> {
    pub fn new(prefs: Rc<dyn PrefsBackend>, key: impl Into<String>, default: T) -> Self {
        PersistedValue {
            key: key.into(),
            default,
            cached: RefCell::new(None),
            prefs,
            observers: Observers::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Current value, loading (and writing back) from the store on first use.
    pub fn get(&self) -> Result<T, PersistenceError> {
        if let Some(value) = self.cached.borrow().as_ref() {
            return Ok(value.clone());
        }
        let value = T::load(self.prefs.as_ref(), &self.key, &self.default)?;
        T::store(self.prefs.as_ref(), &self.key, &value)?;
        debug!("Loaded persisted value '{}'", self.key);
        *self.cached.borrow_mut() = Some(value.clone());
        Ok(value)
    }

    /// Persist `value`, cache it, then notify subscribers.
    ///
    /// When the store rejects the write the cache is left untouched and no
    /// notification is sent.
    pub fn set(&self, value: T) -> Result<(), PersistenceError> {
        T::store(self.prefs.as_ref(), &self.key, &value)?;
        *self.cached.borrow_mut() = Some(value.clone());
        trace!("Persisted value '{}' updated", self.key);
        self.observers.notify(&value);
        Ok(())
    }

    /// Write the default back through [`set`](Self::set).
    pub fn reset(&self) -> Result<(), PersistenceError> {
        self.set(self.default.clone())
    }

    /// Forget the cached value; the next [`get`](Self::get) reads the store.
    pub fn reload(&self) {
        self.cached.borrow_mut().take();
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.borrow().is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.observers.subscribe(listener)
    }
}

impl<T: Persisted> Observable<T> for PersistedValue<T> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.observers.subscribe(listener)
    }
}

impl<T: Persisted + fmt::Debug> fmt::Debug for PersistedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("cached", &self.cached.borrow())
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::prefs::{MemoryPrefs, PrefValue};
    use std::cell::Cell;

    /// Counts reads and can be told to fail writes.
    #[derive(Default)]
    struct ProbePrefs {
        inner: MemoryPrefs,
        reads: Cell<usize>,
        fail_writes: Cell<bool>,
    }

    impl PrefsBackend for ProbePrefs {
        fn get_int(&self, key: &str, default: i32) -> Result<i32, PersistenceError> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get_int(key, default)
        }
        fn set_int(&self, key: &str, value: i32) -> Result<(), PersistenceError> {
            if self.fail_writes.get() {
                return Err(PersistenceError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set_int(key, value)
        }
        fn get_string(&self, key: &str, default: &str) -> Result<String, PersistenceError> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get_string(key, default)
        }
        fn set_string(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
            self.inner.set_string(key, value)
        }
        fn has_key(&self, key: &str) -> bool {
            self.inner.has_key(key)
        }
        fn delete_key(&self, key: &str) -> Result<(), PersistenceError> {
            self.inner.delete_key(key)
        }
        fn entries(&self) -> Vec<(String, PrefValue)> {
            self.inner.entries()
        }
    }

    #[test]
    fn test_first_get_writes_default_back() {
        let prefs = Rc::new(MemoryPrefs::new());
        let coins = SavedInt::new(prefs.clone(), "coins", 25);
        assert!(!prefs.has_key("coins"));
        assert_eq!(coins.get().unwrap(), 25);
        assert_eq!(prefs.get_int("coins", -1).unwrap(), 25);
        assert!(coins.is_loaded());
    }

    #[test]
    fn test_existing_entry_wins_over_default() {
        let prefs = Rc::new(MemoryPrefs::new());
        prefs.set_string("name", "Kipp").unwrap();
        let name = SavedString::new(prefs, "name", String::new());
        assert_eq!(name.get().unwrap(), "Kipp");
    }

    #[test]
    fn test_get_after_set_uses_cache() {
        let prefs = Rc::new(ProbePrefs::default());
        let level = SavedInt::new(prefs.clone(), "level", 0);
        level.set(4).unwrap();
        assert_eq!(level.get().unwrap(), 4);
        assert_eq!(level.get().unwrap(), 4);
        assert_eq!(prefs.reads.get(), 0);
    }

    #[test]
    fn test_repeated_get_reads_store_once() {
        let prefs = Rc::new(ProbePrefs::default());
        let level = SavedInt::new(prefs.clone(), "level", 2);
        for _ in 0..3 {
            assert_eq!(level.get().unwrap(), 2);
        }
        assert_eq!(prefs.reads.get(), 1);
    }

    #[test]
    fn test_each_write_notifies_once_in_order() {
        let prefs = Rc::new(MemoryPrefs::new());
        let score = SavedInt::new(prefs, "score", 0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = score.subscribe(move |v| s.borrow_mut().push(*v));

        for v in [3, 1, 4, 1, 5] {
            score.set(v).unwrap();
        }

        assert_eq!(*seen.borrow(), vec![3, 1, 4, 1, 5]);
    }

    #[test]
    fn test_listener_sees_persisted_value() {
        let prefs = Rc::new(MemoryPrefs::new());
        let score = SavedInt::new(prefs.clone(), "score", 0);
        let stored = Rc::new(Cell::new(None));
        let (p, st) = (prefs.clone(), stored.clone());
        let _sub = score.subscribe(move |_| st.set(p.get_int("score", -1).ok()));
        score.set(9).unwrap();
        assert_eq!(stored.get(), Some(9));
    }

    #[test]
    fn test_failed_write_surfaces_error_and_keeps_state() {
        let prefs = Rc::new(ProbePrefs::default());
        let lives = SavedInt::new(prefs.clone(), "lives", 3);
        assert_eq!(lives.get().unwrap(), 3);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = lives.subscribe(move |_| h.set(h.get() + 1));

        prefs.fail_writes.set(true);
        assert!(matches!(lives.set(2), Err(PersistenceError::Io(_))));
        assert_eq!(lives.get().unwrap(), 3);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_reload_rereads_store() {
        let prefs = Rc::new(MemoryPrefs::new());
        let name = SavedString::new(prefs.clone(), "name", "anon".to_string());
        assert_eq!(name.get().unwrap(), "anon");
        prefs.set_string("name", "edited").unwrap();
        assert_eq!(name.get().unwrap(), "anon");
        name.reload();
        assert_eq!(name.get().unwrap(), "edited");
    }

    #[test]
    fn test_reset_restores_default() {
        let prefs = Rc::new(MemoryPrefs::new());
        let level = SavedInt::new(prefs.clone(), "level", 1);
        level.set(8).unwrap();
        level.reset().unwrap();
        assert_eq!(level.get().unwrap(), 1);
        assert_eq!(prefs.get_int("level", 0).unwrap(), 1);
    }
}
