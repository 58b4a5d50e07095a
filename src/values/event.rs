//! Value-less fan-out events.
//!
//! A [`SubscribableEvent`] stores nothing; [`SubscribableEvent::invoke`]
//! hands the payload to every listener synchronously. The unit form
//! (`SubscribableEvent` with no type argument) is a plain signal.

use super::observers::{Observable, Observers, Subscription};

/// Synchronous broadcaster for payloads of type `T`.
#[derive(Debug)]
pub struct SubscribableEvent<T: 'static = ()> {
    observers: Observers<T>,
}

impl<T: 'static> Default for SubscribableEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SubscribableEvent<T> {
    pub fn new() -> Self {
        SubscribableEvent {
            observers: Observers::new(),
        }
    }

    /// Deliver `value` to every listener in registration order.
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

impl SubscribableEvent<()> {
    /// Fire a unit event.
    pub fn fire(&self) {
        self.invoke(());
    }
}

impl<T: 'static> Observable<T> for SubscribableEvent<T> {
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
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_invoke_reaches_all_listeners() {
        let event = SubscribableEvent::<String>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = seen.clone();
        let _a = event.subscribe(move |v: &String| s1.borrow_mut().push(format!("first:{v}")));
        let s2 = seen.clone();
        let _b = event.subscribe(move |v: &String| s2.borrow_mut().push(format!("second:{v}")));

        event.invoke("go".to_string());

        assert_eq!(*seen.borrow(), vec!["first:go", "second:go"]);
    }

    #[test]
    fn test_unit_event_fire() {
        let event: SubscribableEvent = SubscribableEvent::default();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = event.subscribe(move |_| h.set(h.get() + 1));
        event.fire();
        event.fire();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_invoke_without_listeners_is_noop() {
        let event = SubscribableEvent::<i32>::new();
        event.invoke(3);
        assert_eq!(event.listener_count(), 0);
    }
}
