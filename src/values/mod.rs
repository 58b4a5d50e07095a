//! Reactive value containers.
//!
//! Everything here is single-threaded and callback based: a write updates
//! the value, persists it where applicable, and synchronously notifies the
//! listeners registered through [`observers::Observers`].
//!
//! Submodules overview:
//! - [`observers`] – listener lists, [`Subscription`](observers::Subscription) handles, the [`Observable`](observers::Observable) trait
//! - [`event`] – value-less fan-out events
//! - [`persisted`] – values stored in a [`PrefsBackend`](crate::resources::prefs::PrefsBackend)
//! - [`derived`] – threshold index and key set derived from a driving integer
//! - [`scoped`] – values and events reset at scope (scene) boundaries
//! - [`document`] – structured documents persisted as JSON files

pub mod derived;
pub mod document;
pub mod event;
pub mod observers;
pub mod persisted;
pub mod scoped;
