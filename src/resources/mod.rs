//! Resources made available to the ECS world.
//!
//! This module groups the long-lived data a host inserts into its world and
//! that systems and observers read during execution. Each submodule
//! documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `camera` – orthographic 2D camera rig and per-frame scroll input
//! - `config` – store configuration loaded from an INI file
//! - `prefs` – key-value preference backends (non-send)
//! - `scene` – active scene and pending scene transition
//! - `scope` – scope broadcaster resetting scoped values (non-send)
//! - `scriptables` – type-keyed registry of shared assets and singletons
pub mod camera;
pub mod config;
pub mod prefs;
pub mod scene;
pub mod scope;
pub mod scriptables;
