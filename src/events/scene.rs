//! Scene transition event and observer.
//!
//! Callers request a transition by updating [`NextScene`]. Emitting a
//! [`SceneChangedEvent`] then triggers [`observe_scene_change_event`], which
//! applies the transition to [`ActiveScene`] and broadcasts the change on the
//! [`Scope`] so scoped values and events reset.
//!
//! The [`check_pending_scene`](crate::systems::scene::check_pending_scene)
//! system emits the event for any pending request once per update.
use crate::resources::scene::{ActiveScene, NextScene, SceneRequest};
use crate::resources::scope::Scope;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

/// Event used to indicate that a pending scene transition should be applied.
///
/// If [`NextScene`] holds a request the observer applies it; if it is
/// [`SceneRequest::Unchanged`], nothing happens.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneChangedEvent {}

/// Observer that applies a pending scene transition.
///
/// Contract
/// - Reads the intention from [`NextScene`].
/// - If pending, resolves the target (a reload re-enters the active scene),
///   updates [`ActiveScene`], resets [`NextScene`], then calls
///   [`Scope::change`] with the scene left and the scene entered.
/// - If any required resource is missing, logs a diagnostic and returns.
pub fn observe_scene_change_event(
    _trigger: On<SceneChangedEvent>,
    mut next_scene: Option<ResMut<NextScene>>,
    mut active_scene: Option<ResMut<ActiveScene>>,
    scope: Option<NonSend<Scope>>,
) {
    debug!("SceneChangedEvent triggered");

    if let (Some(next_scene), Some(active_scene)) =
        (next_scene.as_deref_mut(), active_scene.as_deref_mut())
    {
        let target = match next_scene.get() {
            SceneRequest::Load(name) => name.clone(),
            SceneRequest::Reload => active_scene.name().to_string(),
            SceneRequest::Unchanged => {
                debug!("No scene change pending.");
                return;
            }
        };

        let from = active_scene.name().to_string();
        info!("Transitioning from scene {:?} to {:?}", from, target);
        active_scene.set(target.clone());
        next_scene.reset();

        match scope {
            Some(scope) => scope.change(from, target),
            None => warn!("No Scope resource; scoped values were not reset"),
        }
    } else {
        warn!(
            "One or more resources missing in observe_scene_change_event. next_scene: {:?}, active_scene: {:?}",
            next_scene.is_some(),
            active_scene.is_some()
        );
    }
}
