//! Event types and observers.
//!
//! Events give the host a decoupled way to drive the world: it triggers an
//! event and the matching observer mutates the relevant resources.
//!
//! Submodules:
//! - [`drag`] – pointer drag relay that pans the camera
//! - [`scene`] – scene transition notification that resets scoped state
pub mod drag;
pub mod scene;
