//! Active scene and pending scene transition.
//!
//! [`ActiveScene`] is the authoritative current scene. Callers request a
//! transition through [`NextScene`]; the scene observer
//! (`crate::events::scene::observe_scene_change_event`) applies it, clears
//! the request and fires the scope change.

use bevy_ecs::prelude::Resource;

/// Name of the scene currently loaded.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ActiveScene {
    name: String,
    loads: u64,
}

impl ActiveScene {
    pub fn new(name: impl Into<String>) -> Self {
        ActiveScene {
            name: name.into(),
            loads: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Switch to `name` immediately.
    ///
    /// Prefer requesting transitions through [`NextScene`] so scoped state
    /// is reset.
    pub fn set(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.loads += 1;
    }

    /// Number of transitions applied since startup, reloads included.
    pub fn load_count(&self) -> u64 {
        self.loads
    }
}

/// A requested scene transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneRequest {
    #[default]
    Unchanged,
    Load(String),
    Reload,
}

/// Intent to change scene.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct NextScene {
    next: SceneRequest,
}

impl NextScene {
    pub fn new() -> Self {
        NextScene::default()
    }

    pub fn get(&self) -> &SceneRequest {
        &self.next
    }

    /// Request loading the scene named `name`.
    pub fn load(&mut self, name: impl Into<String>) {
        self.next = SceneRequest::Load(name.into());
    }

    /// Request re-entering the active scene.
    pub fn reload(&mut self) {
        self.next = SceneRequest::Reload;
    }

    pub fn is_pending(&self) -> bool {
        self.next != SceneRequest::Unchanged
    }

    /// Reset to [`SceneRequest::Unchanged`].
    pub fn reset(&mut self) {
        self.next = SceneRequest::Unchanged;
    }
}
