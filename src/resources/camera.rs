//! Orthographic 2D camera rig.
//!
//! The rig owns the camera position and a normalized zoom in `[0, 1]` that
//! maps linearly onto an orthographic half-height between `min_size` and
//! `max_size`. Projection and rendering belong to the host; the rig only
//! answers "how many world units is one pixel" so drags can be converted.

use bevy_ecs::prelude::Resource;

/// Plain 2D vector in world or screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// Scroll wheel delta written by the host each frame.
///
/// Consumed (reset to zero) by `camera_zoom_system`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInput(pub Vec2);

/// Camera state shared by the pan and zoom handlers.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// World-space camera position.
    pub position: Vec2,
    /// Normalized zoom, `0` at `min_size`, `1` at `max_size`.
    pub zoom: f32,
    /// Zoom change per scroll unit.
    pub zoom_sensitivity: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
}

impl CameraRig {
    pub fn new(min_size: f32, max_size: f32, zoom_sensitivity: f32, viewport_height: f32) -> Self {
        CameraRig {
            position: Vec2::ZERO,
            zoom: 0.0,
            zoom_sensitivity,
            min_size,
            max_size,
            viewport_height,
        }
    }

    /// Orthographic half-height for the current zoom.
    pub fn ortho_size(&self) -> f32 {
        self.min_size + (self.max_size - self.min_size) * self.zoom
    }

    /// World units covered by one screen pixel.
    pub fn world_units_per_pixel(&self) -> f32 {
        if self.viewport_height <= 0.0 {
            return 0.0;
        }
        2.0 * self.ortho_size() / self.viewport_height
    }

    /// Apply a vertical scroll amount; positive scroll zooms out.
    pub fn apply_scroll(&mut self, amount: f32) {
        self.zoom = (self.zoom + amount * self.zoom_sensitivity).clamp(0.0, 1.0);
    }

    /// Move the camera opposite to a screen-space drag so the world follows
    /// the pointer.
    pub fn pan_by_screen_delta(&mut self, delta: Vec2) {
        let scale = self.world_units_per_pixel();
        self.position.x -= delta.x * scale;
        self.position.y -= delta.y * scale;
    }
}
