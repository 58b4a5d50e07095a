//! Values derived from a driving integer.
//!
//! Both containers register a recompute callback on their source and keep
//! the returned [`Subscription`]; dropping the derived value detaches it
//! from the source.
//!
//! - [`DerivedThresholdValue`] maps the driving value to the index of the
//!   highest threshold it reaches (e.g. experience points to a rank).
//! - [`DerivedKeySet`] exposes the keys whose unlock level the driving value
//!   has reached (e.g. level to unlocked items).

use super::observers::{Observable, Observers, Subscription};
use super::persisted::PersistedValue;
use crate::error::PersistenceError;
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Index of the last threshold `<= value`, scanning in stored order and
/// stopping at the first threshold above `value`.
///
/// Thresholds are expected in non-decreasing order; with unordered input the
/// scan still stops at the first threshold above `value`.
pub fn resolve_threshold(thresholds: &[i32], value: i32) -> Option<usize> {
    thresholds
        .iter()
        .take_while(|threshold| **threshold <= value)
        .count()
        .checked_sub(1)
}

struct ThresholdState {
    thresholds: Vec<i32>,
    resolved: Cell<Option<usize>>,
    observers: Observers<usize>,
}

impl ThresholdState {
    fn apply(&self, value: i32) {
        match resolve_threshold(&self.thresholds, value) {
            Some(index) => {
                self.resolved.set(Some(index));
                self.observers.notify(&index);
            }
            None => debug!(
                "Driving value {} is below every threshold, keeping {:?}",
                value,
                self.resolved.get()
            ),
        }
    }
}

/// Threshold index that follows a driving integer.
pub struct DerivedThresholdValue {
    state: Rc<ThresholdState>,
    _source: Subscription,
}

impl DerivedThresholdValue {
    /// Follow `source`, resolving once from its current value.
    pub fn new(
        thresholds: impl Into<Vec<i32>>,
        source: &PersistedValue<i32>,
    ) -> Result<Self, PersistenceError> {
        let derived = Self::attach(thresholds.into(), source);
        derived.state.apply(source.get()?);
        Ok(derived)
    }

    /// Follow any integer source, resolving once from `current`.
    pub fn with_source(
        thresholds: impl Into<Vec<i32>>,
        source: &impl Observable<i32>,
        current: i32,
    ) -> Self {
        let derived = Self::attach(thresholds.into(), source);
        derived.state.apply(current);
        derived
    }

    fn attach(thresholds: Vec<i32>, source: &impl Observable<i32>) -> Self {
        let state = Rc::new(ThresholdState {
            thresholds,
            resolved: Cell::new(None),
            observers: Observers::new(),
        });
        let weak = Rc::downgrade(&state);
        let subscription = source.subscribe(move |value: &i32| {
            if let Some(state) = weak.upgrade() {
                state.apply(*value);
            }
        });
        DerivedThresholdValue {
            state,
            _source: subscription,
        }
    }

    /// Last resolved index; `None` until the driving value reached the first
    /// threshold.
    pub fn value(&self) -> Option<usize> {
        self.state.resolved.get()
    }

    pub fn thresholds(&self) -> &[i32] {
        &self.state.thresholds
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&usize) + 'static,
    {
        self.state.observers.subscribe(listener)
    }
}

impl Observable<usize> for DerivedThresholdValue {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&usize) + 'static,
    {
        self.state.observers.subscribe(listener)
    }
}

struct KeySetState<K: 'static> {
    levels: BTreeMap<K, i32>,
    keys: RefCell<BTreeSet<K>>,
    level: Cell<Option<i32>>,
    observers: Observers<BTreeSet<K>>,
}

impl<K: Ord + Clone + 'static> KeySetState<K> {
    fn apply(&self, level: i32) {
        let keys: BTreeSet<K> = self
            .levels
            .iter()
            .filter(|(_, required)| **required <= level)
            .map(|(key, _)| key.clone())
            .collect();
        self.level.set(Some(level));
        *self.keys.borrow_mut() = keys.clone();
        self.observers.notify(&keys);
    }
}

/// Set of keys unlocked by a driving level.
///
/// Keys are kept in their natural order.
pub struct DerivedKeySet<K: Ord + Clone + 'static> {
    state: Rc<KeySetState<K>>,
    _source: Subscription,
}

impl<K: Ord + Clone + 'static> DerivedKeySet<K> {
    /// Follow `source`. The set stays empty until the source first changes.
    pub fn new(mapping: impl IntoIterator<Item = (K, i32)>, source: &impl Observable<i32>) -> Self {
        let state = Rc::new(KeySetState {
            levels: mapping.into_iter().collect(),
            keys: RefCell::new(BTreeSet::new()),
            level: Cell::new(None),
            observers: Observers::new(),
        });
        let weak = Rc::downgrade(&state);
        let subscription = source.subscribe(move |level: &i32| {
            if let Some(state) = weak.upgrade() {
                state.apply(*level);
            }
        });
        DerivedKeySet {
            state,
            _source: subscription,
        }
    }

    /// Follow a persisted level and resolve once from its current value.
    pub fn resolved_from(
        mapping: impl IntoIterator<Item = (K, i32)>,
        source: &PersistedValue<i32>,
    ) -> Result<Self, PersistenceError> {
        let derived = Self::new(mapping, source);
        derived.resolve(source.get()?);
        Ok(derived)
    }

    /// Recompute for `level` and notify subscribers.
    pub fn resolve(&self, level: i32) {
        self.state.apply(level);
    }

    pub fn keys(&self) -> BTreeSet<K> {
        self.state.keys.borrow().clone()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.state.keys.borrow().contains(key)
    }

    /// Driving level of the last recompute.
    pub fn level(&self) -> Option<i32> {
        self.state.level.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&BTreeSet<K>) + 'static,
    {
        self.state.observers.subscribe(listener)
    }
}

impl<K: Ord + Clone + 'static> Observable<BTreeSet<K>> for DerivedKeySet<K> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&BTreeSet<K>) + 'static,
    {
        self.state.observers.subscribe(listener)
    }
}
