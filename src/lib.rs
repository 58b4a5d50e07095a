//! SmartValues library.
//!
//! Reactive, persisted values: observable containers that store themselves
//! in a preferences backend, values derived from them, values and events
//! that reset on every scene change, and JSON documents on disk. The ECS
//! layer (resources, systems, events) ties these to a session world.

pub mod app;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
pub mod values;
