//! Camera zoom system.

use crate::resources::camera::{CameraRig, ScrollInput, Vec2};
use bevy_ecs::prelude::*;
use log::trace;

/// Apply the frame's vertical scroll to the camera zoom and consume it.
///
/// Positive scroll zooms out. The normalized zoom is clamped to `[0, 1]` and
/// the orthographic size follows linearly between the rig's min and max.
pub fn camera_zoom_system(mut scroll: ResMut<ScrollInput>, mut rig: ResMut<CameraRig>) {
    let amount = scroll.0.y;
    if amount == 0.0 {
        return;
    }
    rig.apply_scroll(amount);
    scroll.0 = Vec2::ZERO;
    trace!(
        "Camera zoom {} (ortho size {})",
        rig.zoom,
        rig.ortho_size()
    );
}
