use crate::events::scene::SceneChangedEvent;
use crate::resources::scene::NextScene;
use bevy_ecs::prelude::*;

/// Emit [`SceneChangedEvent`] when a scene transition has been requested.
pub fn check_pending_scene(mut commands: Commands, next_scene: Res<NextScene>) {
    if next_scene.is_pending() {
        commands.trigger(SceneChangedEvent {});
    }
}
