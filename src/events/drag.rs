//! Pointer drag event and camera pan observer.
//!
//! The host's UI layer triggers a [`DragEvent`] for every pointer drag step
//! with the screen-space delta. [`camera_drag_observer`] pans the
//! [`CameraRig`] so the world follows the pointer.

use crate::resources::camera::{CameraRig, Vec2};
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{trace, warn};

/// Screen-space drag delta in pixels.
#[derive(Event, Debug, Clone, Copy)]
pub struct DragEvent {
    pub delta: Vec2,
}

/// Observer that pans the camera opposite to the drag.
pub fn camera_drag_observer(trigger: On<DragEvent>, rig: Option<ResMut<CameraRig>>) {
    let Some(mut rig) = rig else {
        warn!("DragEvent received without a CameraRig resource");
        return;
    };
    let delta = trigger.event().delta;
    rig.pan_by_screen_delta(delta);
    trace!(
        "Camera panned by {:?} px to ({}, {})",
        delta, rig.position.x, rig.position.y
    );
}
