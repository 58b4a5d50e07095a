//! Registry of shared data assets keyed by type.
//!
//! [`Scriptables`] holds at most one instance per type. Assets that need a
//! one-time setup implement [`Initable`]; [`Scriptables::init_all`] runs
//! those hooks once, in registration order. Lazily created singletons go
//! through [`Scriptables::get_or_insert_default`].

use crate::error::RegistryError;
use bevy_ecs::prelude::Resource;
use log::{debug, error, info};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::collections::hash_map::Entry;

/// One-time setup hook run by [`Scriptables::init_all`].
pub trait Initable {
    fn init(&mut self);
}

type InitFn = fn(&mut (dyn Any + Send + Sync + 'static));

fn init_erased<T: Initable + 'static>(value: &mut (dyn Any + Send + Sync + 'static)) {
    if let Some(value) = value.downcast_mut::<T>() {
        value.init();
    }
}

struct Slot {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    init: Option<InitFn>,
}

/// Type-keyed asset registry.
#[derive(Resource, Default)]
pub struct Scriptables {
    map: FxHashMap<TypeId, Slot>,
    order: Vec<TypeId>,
}

impl Scriptables {
    /// Create an empty registry.
    pub fn new() -> Self {
        Scriptables::default()
    }

    /// Register `value` under its type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Result<(), RegistryError> {
        self.insert_slot(value, None)
    }

    /// Register `value` and queue its [`Initable::init`] hook.
    pub fn insert_initable<T>(&mut self, value: T) -> Result<(), RegistryError>
    where
        T: Initable + Any + Send + Sync,
    {
        self.insert_slot(value, Some(init_erased::<T> as InitFn))
    }

    fn insert_slot<T: Any + Send + Sync>(
        &mut self,
        value: T,
        init: Option<InitFn>,
    ) -> Result<(), RegistryError> {
        let name = type_name::<T>();
        match self.map.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => {
                error!("Scriptable {} registered twice", name);
                Err(RegistryError::Duplicate(name))
            }
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    name,
                    value: Box::new(value),
                    init,
                });
                self.order.push(TypeId::of::<T>());
                debug!("Registered scriptable {}", name);
                Ok(())
            }
        }
    }

    /// Run every pending init hook once. Returns how many ran.
    pub fn init_all(&mut self) -> usize {
        let mut ran = 0;
        for id in &self.order {
            let Some(slot) = self.map.get_mut(id) else {
                continue;
            };
            if let Some(init) = slot.init.take() {
                debug!("Initializing scriptable {}", slot.name);
                init(&mut *slot.value);
                ran += 1;
            }
        }
        ran
    }

    pub fn get<T: Any>(&self) -> Result<&T, RegistryError> {
        match self
            .map
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<T>())
        {
            Some(value) => Ok(value),
            None => Err(Self::not_found::<T>()),
        }
    }

    pub fn get_mut<T: Any>(&mut self) -> Result<&mut T, RegistryError> {
        match self
            .map
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_mut::<T>())
        {
            Some(value) => Ok(value),
            None => Err(Self::not_found::<T>()),
        }
    }

    /// Singleton access: the registered instance, created with
    /// `T::default()` on first use.
    pub fn get_or_insert_default<T>(&mut self) -> Result<&mut T, RegistryError>
    where
        T: Any + Send + Sync + Default,
    {
        if !self.contains::<T>() {
            info!("Creating singleton {}", type_name::<T>());
            self.insert(T::default())?;
        }
        self.get_mut::<T>()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered type names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|slot| slot.name))
            .collect()
    }

    fn not_found<T>() -> RegistryError {
        let name = type_name::<T>();
        error!("Can't find scriptable {}", name);
        RegistryError::NotFound(name)
    }
}
