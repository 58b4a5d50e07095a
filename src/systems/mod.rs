//! ECS systems run by the update schedule.
//!
//! - [`camera`] – consume scroll input into camera zoom
//! - [`scene`] – emit the scene change event for pending transitions
pub mod camera;
pub mod scene;
