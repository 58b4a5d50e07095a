//! Scene scope broadcaster.
//!
//! A [`Scope`] marks logical session boundaries. Scoped containers
//! ([`ScopedValue`](crate::values::scoped::ScopedValue),
//! [`ScopedEvent`](crate::values::scoped::ScopedEvent)) register on it and
//! reset when [`Scope::change`] is called. In an ECS world the scope is a
//! non-send resource and the scene observer calls `change` on every scene
//! transition; nothing subscribes to a hidden global.

use crate::values::observers::{Observable, Observers, Subscription};
use log::info;
use std::cell::Cell;
use std::rc::Rc;

/// Payload of a scope change: the scene being left and the one entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default)]
struct ScopeInner {
    observers: Observers<ScopeChange>,
    generation: Cell<u64>,
}

/// Cheaply clonable handle; clones share listeners.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Broadcast a transition from `from` to `to`.
    pub fn change(&self, from: impl Into<String>, to: impl Into<String>) {
        let change = ScopeChange {
            from: from.into(),
            to: to.into(),
        };
        self.inner.generation.set(self.inner.generation.get() + 1);
        info!(
            "Scope change {:?} -> {:?} ({} listeners)",
            change.from,
            change.to,
            self.inner.observers.len()
        );
        self.inner.observers.notify(&change);
    }

    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ScopeChange) + 'static,
    {
        self.inner.observers.subscribe(listener)
    }

    /// Number of changes broadcast so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.observers.len()
    }
}

impl Observable<ScopeChange> for Scope {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ScopeChange) + 'static,
    {
        self.on_change(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_change_passes_from_and_to() {
        let scope = Scope::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = scope.on_change(move |change| s.borrow_mut().push(change.clone()));

        scope.change("menu", "level_1");

        assert_eq!(
            *seen.borrow(),
            vec![ScopeChange {
                from: "menu".into(),
                to: "level_1".into()
            }]
        );
        assert_eq!(scope.generation(), 1);
    }

    #[test]
    fn test_clones_share_listeners() {
        let scope = Scope::new();
        let other = scope.clone();
        let _sub = other.on_change(|_| {});
        assert_eq!(scope.listener_count(), 1);
        other.change("a", "b");
        assert_eq!(scope.generation(), 1);
    }
}
