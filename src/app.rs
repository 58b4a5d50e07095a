//! World assembly and scene control.
//!
//! [`build_world`] wires every resource and observer a session needs:
//! - non-send [`Prefs`] and [`Scope`] (both hold `Rc` handles)
//! - [`Scriptables`], [`ActiveScene`], [`NextScene`]
//! - [`CameraRig`], [`ScrollInput`], [`DocumentStore`], [`StoreConfig`]
//! - the scene change and camera drag observers
//!
//! [`update_schedule`] returns the per-frame systems. [`load_scene`] and
//! [`reload_scene`] apply a transition immediately, the same way the host
//! would at startup.

use crate::error::PersistenceError;
use crate::events::drag::camera_drag_observer;
use crate::events::scene::{SceneChangedEvent, observe_scene_change_event};
use crate::resources::camera::ScrollInput;
use crate::resources::config::StoreConfig;
use crate::resources::prefs::{IniPrefs, PrefValue, Prefs, PrefsBackend};
use crate::resources::scene::{ActiveScene, NextScene};
use crate::resources::scope::Scope;
use crate::resources::scriptables::Scriptables;
use crate::systems::camera::camera_zoom_system;
use crate::systems::scene::check_pending_scene;
use crate::values::document::DocumentStore;
use crate::values::derived::resolve_threshold;
use crate::values::persisted::{SavedInt, SavedString};
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::{debug, info};

/// Build a world backed by the INI preferences file named in `config`.
pub fn build_world(config: &StoreConfig) -> Result<World, PersistenceError> {
    let prefs = IniPrefs::open(&config.prefs_path)?;
    Ok(build_world_with(prefs, config))
}

/// Build a world around an explicit preferences backend.
pub fn build_world_with(prefs: impl PrefsBackend + 'static, config: &StoreConfig) -> World {
    let mut world = World::new();
    world.insert_non_send_resource(Prefs::new(prefs));
    world.insert_non_send_resource(Scope::new());

    world.insert_resource(Scriptables::default());
    world.insert_resource(ActiveScene::new(config.initial_scene.clone()));
    world.insert_resource(NextScene::new());
    world.insert_resource(config.camera_rig());
    world.insert_resource(ScrollInput::default());
    world.insert_resource(DocumentStore::new(config.documents_dir.clone()));
    world.insert_resource(config.clone());

    world.spawn(Observer::new(observe_scene_change_event));
    world.spawn(Observer::new(camera_drag_observer));
    // Observers must be registered before anything triggers events.
    world.flush();

    info!("World ready in scene {:?}", config.initial_scene);
    world
}

/// Per-frame systems: scroll zoom and pending scene transitions.
pub fn update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(camera_zoom_system);
    update.add_systems(check_pending_scene);
    update
}

/// Switch to `name` now, resetting everything bound to the scope.
pub fn load_scene(world: &mut World, name: impl Into<String>) {
    world.resource_mut::<NextScene>().load(name);
    world.trigger(SceneChangedEvent {});
}

/// Re-enter the active scene now.
pub fn reload_scene(world: &mut World) {
    world.resource_mut::<NextScene>().reload();
    world.trigger(SceneChangedEvent {});
}

/// Scope handle of the world, for building scoped values.
pub fn scope(world: &World) -> Scope {
    world.non_send_resource::<Scope>().clone()
}

/// Persisted int bound to the world's preferences.
pub fn saved_int(world: &World, key: impl Into<String>, default: i32) -> SavedInt {
    SavedInt::new(world.non_send_resource::<Prefs>().backend(), key, default)
}

/// Persisted string bound to the world's preferences.
pub fn saved_string(
    world: &World,
    key: impl Into<String>,
    default: impl Into<String>,
) -> SavedString {
    SavedString::new(
        world.non_send_resource::<Prefs>().backend(),
        key,
        default.into(),
    )
}

/// Stored value of the int preference `key` and the threshold index it
/// reaches.
///
/// Read-only: a missing key, or one holding a string, yields `None` and
/// nothing is written back.
pub fn inspect_level(world: &World, key: &str, thresholds: &[i32]) -> Option<(i32, Option<usize>)> {
    let stored = world
        .non_send_resource::<Prefs>()
        .0
        .entries()
        .into_iter()
        .find(|(k, _)| k == key);
    match stored {
        Some((_, PrefValue::Int(value))) => Some((value, resolve_threshold(thresholds, value))),
        Some((_, PrefValue::Str(_))) => {
            debug!("Preference {:?} holds a string, not a level", key);
            None
        }
        None => {
            debug!("No preference {:?} to inspect", key);
            None
        }
    }
}
