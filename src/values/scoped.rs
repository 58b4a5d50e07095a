//! Containers that reset at scope boundaries.
//!
//! - [`ScopedValue`] goes back to `T::default()` on every scope change. The
//!   reset is silent: its own subscribers are not notified.
//! - [`ScopedEvent`] drops all of its listeners on every scope change.
//!
//! Both keep the [`Subscription`] they hold on the [`Scope`]; dropping the
//! container unregisters it.

use super::observers::{Observable, Observers, Subscription};
use crate::resources::scope::Scope;
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

struct ScopedInner<T: 'static> {
    value: RefCell<T>,
    observers: Observers<T>,
}

/// Value that lives for one scope.
pub struct ScopedValue<T: Default + Clone + 'static> {
    inner: Rc<ScopedInner<T>>,
    _scope: Subscription,
}

impl<T: Default + Clone + 'static> ScopedValue<T> {
    pub fn new(scope: &Scope) -> Self {
        let inner = Rc::new(ScopedInner {
            value: RefCell::new(T::default()),
            observers: Observers::new(),
        });
        let weak = Rc::downgrade(&inner);
        let subscription = scope.on_change(move |change| {
            if let Some(inner) = weak.upgrade() {
                *inner.value.borrow_mut() = T::default();
                trace!("Scoped value reset on {:?} -> {:?}", change.from, change.to);
            }
        });
        ScopedValue {
            inner,
            _scope: subscription,
        }
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.observers.notify(&value);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let value = {
            let mut current = self.inner.value.borrow_mut();
            f(&mut *current);
            current.clone()
        };
        self.inner.observers.notify(&value);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.inner.observers.subscribe(listener)
    }
}

impl<T: Default + Clone + 'static> Observable<T> for ScopedValue<T> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.inner.observers.subscribe(listener)
    }
}

/// Event whose listeners are dropped at every scope change.
pub struct ScopedEvent<T: 'static = ()> {
    observers: Rc<Observers<T>>,
    _scope: Subscription,
}

impl<T: 'static> ScopedEvent<T> {
    pub fn new(scope: &Scope) -> Self {
        let observers = Rc::new(Observers::new());
        let weak = Rc::downgrade(&observers);
        let subscription = scope.on_change(move |_| {
            if let Some(observers) = weak.upgrade() {
                observers.clear();
            }
        });
        ScopedEvent {
            observers,
            _scope: subscription,
        }
    }

    pub fn invoke(&self, value: T) {
        self.observers.notify(&value);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }
}

impl ScopedEvent<()> {
    pub fn fire(&self) {
        self.invoke(());
    }
}

impl<T: 'static> Observable<T> for ScopedEvent<T> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.observers.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_scoped_value_resets_on_change() {
        let scope = Scope::new();
        let counter = ScopedValue::<i32>::new(&scope);
        counter.set(5);
        assert_eq!(counter.value(), 5);
        scope.change("level_1", "level_2");
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_scoped_value_reset_is_silent() {
        let scope = Scope::new();
        let picked = ScopedValue::<Vec<String>>::new(&scope);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = picked.subscribe(move |_| h.set(h.get() + 1));

        picked.update(|items| items.push("key".to_string()));
        assert_eq!(hits.get(), 1);
        scope.change("a", "b");
        assert_eq!(hits.get(), 1);
        assert!(picked.with(|items| items.is_empty()));

        picked.set(vec!["gem".to_string()]);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_dropped_scoped_value_unregisters() {
        let scope = Scope::new();
        let value = ScopedValue::<u8>::new(&scope);
        assert_eq!(scope.listener_count(), 1);
        drop(value);
        assert_eq!(scope.listener_count(), 0);
        scope.change("a", "b");
    }

    #[test]
    fn test_scoped_event_clears_listeners() {
        let scope = Scope::new();
        let died: ScopedEvent = ScopedEvent::new(&scope);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        died.subscribe(move |_| h.set(h.get() + 1)).detach();

        died.fire();
        scope.change("level", "level");
        died.fire();

        assert_eq!(hits.get(), 1);
        assert_eq!(died.listener_count(), 0);
    }

    #[test]
    fn test_scoped_event_accepts_new_listeners_after_change() {
        let scope = Scope::new();
        let scored = ScopedEvent::<u32>::new(&scope);
        scope.change("a", "b");
        let total = Rc::new(Cell::new(0));
        let t = total.clone();
        let _sub = scored.subscribe(move |points| t.set(t.get() + *points));
        scored.invoke(10);
        scored.invoke(5);
        assert_eq!(total.get(), 15);
    }
}
