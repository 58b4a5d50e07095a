//! Observer lists and disposable subscriptions.
//!
//! [`Observers`] is the fan-out primitive every container in [`crate::values`]
//! is built on. Subscribing returns a [`Subscription`] handle; dropping the
//! handle removes the listener, so a component that listens to another one
//! stops listening as soon as it goes away.
//!
//! Notification works on a snapshot of the listener list taken before the
//! first callback runs:
//! - listeners added during a notification are first called on the next one
//! - listeners removed during a notification still receive the current one
//! - a listener that is already running (re-entrant notify) is skipped
//! - a listener that panics is logged and the remaining listeners still run

use log::{error, warn};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slot<T> {
    id: u64,
    listener: Listener<T>,
}

struct ListenerList<T> {
    next_id: u64,
    slots: SmallVec<[Slot<T>; 4]>,
}

/// Ordered list of listeners for values of type `T`.
pub struct Observers<T> {
    list: Rc<RefCell<ListenerList<T>>>,
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Observers<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Observers {
            list: Rc::new(RefCell::new(ListenerList {
                next_id: 0,
                slots: SmallVec::new(),
            })),
        }
    }

    /// Register `listener`; it is called after every listener registered
    /// before it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let listener: Listener<T> = Rc::new(RefCell::new(listener));
        let id = {
            let mut list = self.list.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.slots.push(Slot { id, listener });
            id
        };
        let weak: Weak<RefCell<ListenerList<T>>> = Rc::downgrade(&self.list);
        Subscription::new(move || {
            if let Some(list) = weak.upgrade() {
                list.borrow_mut().slots.retain(|slot| slot.id != id);
            }
        })
    }

    /// Call every registered listener with `value`, in registration order.
    pub fn notify(&self, value: &T) {
        let snapshot: SmallVec<[Listener<T>; 4]> = self
            .list
            .borrow()
            .slots
            .iter()
            .map(|slot| Rc::clone(&slot.listener))
            .collect();

        for listener in snapshot {
            let Ok(mut callback) = listener.try_borrow_mut() else {
                warn!("Skipping listener that is already running (re-entrant notification)");
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(value)));
            if outcome.is_err() {
                error!("Listener panicked during notification; remaining listeners still run");
            }
        }
    }

    /// Drop every listener. Outstanding [`Subscription`]s become no-ops.
    pub fn clear(&self) {
        self.list.borrow_mut().slots.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.list.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.list.borrow().slots.len())
            .finish()
    }
}

/// Something listeners can be attached to.
pub trait Observable<T> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static;
}

impl<T: 'static> Observable<T> for Observers<T> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        Observers::subscribe(self, listener)
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// listener. [`Subscription::detach`] leaves it registered for as long as the
/// list it was added to lives.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered without holding on to the handle.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_notify_in_registration_order() {
        let observers = Observers::<i32>::new();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let l1 = seen.clone();
        let _a = observers.subscribe(move |v| l1.borrow_mut().push(format!("a{v}")));
        let l2 = seen.clone();
        let _b = observers.subscribe(move |v| l2.borrow_mut().push(format!("b{v}")));

        observers.notify(&1);
        observers.notify(&2);

        assert_eq!(*seen.borrow(), vec!["a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let observers = Observers::<i32>::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = observers.subscribe(move |_| h.set(h.get() + 1));
        observers.notify(&0);
        drop(sub);
        observers.notify(&0);
        assert_eq!(hits.get(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_detach_keeps_listener() {
        let observers = Observers::<i32>::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        observers.subscribe(move |_| h.set(h.get() + 1)).detach();
        observers.notify(&0);
        observers.notify(&0);
        assert_eq!(hits.get(), 2);
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn test_subscription_outliving_list_is_harmless() {
        let observers = Observers::<i32>::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        sub.unsubscribe();
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let observers = Observers::<i32>::new();
        let hits = Rc::new(Cell::new(0));
        let _bad = observers.subscribe(|_| panic!("listener failure"));
        let h = hits.clone();
        let _good = observers.subscribe(move |_| h.set(h.get() + 1));
        observers.notify(&7);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_subscribe_during_notify_applies_next_time() {
        let observers = Rc::new(Observers::<i32>::new());
        let late_hits = Rc::new(Cell::new(0));
        let held: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let obs = Rc::downgrade(&observers);
        let late = late_hits.clone();
        let keep = held.clone();
        let _adder = observers.subscribe(move |_| {
            if let Some(obs) = obs.upgrade() {
                if keep.borrow().is_empty() {
                    let late = late.clone();
                    let sub = obs.subscribe(move |_| late.set(late.get() + 1));
                    keep.borrow_mut().push(sub);
                }
            }
        });

        observers.notify(&1);
        assert_eq!(late_hits.get(), 0);
        observers.notify(&2);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_notify_still_delivers_current() {
        let observers = Observers::<i32>::new();
        let second_hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let s = slot.clone();
        let _first = observers.subscribe(move |_| {
            s.borrow_mut().take();
        });
        let h = second_hits.clone();
        *slot.borrow_mut() = Some(observers.subscribe(move |_| h.set(h.get() + 1)));

        observers.notify(&1);
        assert_eq!(second_hits.get(), 1);
        observers.notify(&2);
        assert_eq!(second_hits.get(), 1);
    }

    #[test]
    fn test_reentrant_notify_skips_running_listener() {
        let observers = Rc::new(Observers::<i32>::new());
        let hits = Rc::new(Cell::new(0));
        let obs = Rc::downgrade(&observers);
        let h = hits.clone();
        let _sub = observers.subscribe(move |v| {
            h.set(h.get() + 1);
            if *v == 0 {
                if let Some(obs) = obs.upgrade() {
                    obs.notify(&1);
                }
            }
        });
        observers.notify(&0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_clear_removes_all() {
        let observers = Observers::<()>::new();
        let sub = observers.subscribe(|_| {});
        observers.subscribe(|_| {}).detach();
        observers.clear();
        assert!(observers.is_empty());
        drop(sub);
        assert!(observers.is_empty());
    }
}
