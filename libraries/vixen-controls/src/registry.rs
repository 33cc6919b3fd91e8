//! Controller lookup by resource
//!
//! Resources and controllers never point at each other; the registry is
//! the only link between a resource id and its controller.

use crate::controller::MediaController;
use crate::error::{ControlError, Result};
use std::collections::HashMap;
use vixen_core::ResourceId;

/// Controllers keyed by the resource they drive
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<ResourceId, MediaController>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its resource id
    pub fn attach(&mut self, controller: MediaController) -> Result<&mut MediaController> {
        let id = controller.id();
        if self.controllers.contains_key(&id) {
            return Err(ControlError::AlreadyAttached(id));
        }
        tracing::debug!(resource = %id, "controller registered");
        Ok(self.controllers.entry(id).or_insert(controller))
    }

    pub fn get(&self, id: ResourceId) -> Option<&MediaController> {
        self.controllers.get(&id)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut MediaController> {
        self.controllers.get_mut(&id)
    }

    /// Remove and return the controller of `id`
    pub fn detach(&mut self, id: ResourceId) -> Option<MediaController> {
        self.controllers.remove(&id)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.controllers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Registered resource ids, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.controllers.keys().copied()
    }
}
