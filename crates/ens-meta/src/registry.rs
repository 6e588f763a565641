//! Explicit descriptor registry.
//!
//! Descriptors are registered by type name during startup and looked up by
//! name afterwards. Lookups return a `Result`; an unregistered type is a
//! setup bug and callers treat it as fatal for that type.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::compare::Comparer;
use crate::descriptor::EntityDescriptor;
use crate::error::{MetaError, MetaResult};

/// Registry of entity descriptors keyed by type name.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    descriptors: RwLock<HashMap<String, Arc<EntityDescriptor>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    ///
    /// Registering the same shape twice returns the existing descriptor.
    /// Registering a different descriptor under a taken name fails with
    /// [`MetaError::DescriptorConflict`].
    pub fn register(&self, descriptor: EntityDescriptor) -> MetaResult<Arc<EntityDescriptor>> {
        let mut map = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = map.get(descriptor.name()) {
            if existing.same_shape(&descriptor) {
                return Ok(Arc::clone(existing));
            }
            return Err(MetaError::DescriptorConflict(descriptor.name().to_owned()));
        }

        debug!(
            entity = descriptor.name(),
            identity = ?descriptor.identity_fields(),
            feature = descriptor.feature().unwrap_or("<root>"),
            "registered entity descriptor"
        );
        let name = descriptor.name().to_owned();
        let descriptor = Arc::new(descriptor);
        map.insert(name, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up a descriptor by type name.
    pub fn resolve(&self, name: &str) -> MetaResult<Arc<EntityDescriptor>> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| MetaError::UnregisteredType(name.to_owned()))
    }

    /// The named comparer for a type, or its default when `comparer` is `None`.
    ///
    /// `Ok(None)` means no ordering is configured.
    pub fn comparer(&self, name: &str, comparer: Option<&str>) -> MetaResult<Option<Comparer>> {
        Ok(self.resolve(name)?.comparer(comparer).cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let map = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
