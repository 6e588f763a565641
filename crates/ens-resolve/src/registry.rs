use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::chain::LookupSource;
use crate::error::LookupError;
use crate::handler::EntityHandler;

/// Handlers registered for one scope: the application root or a feature.
pub struct ScopedRegistry {
    scope: String,
    handlers: RwLock<HashMap<String, Arc<dyn EntityHandler>>>,
}

impl ScopedRegistry {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register `handler` for `entity`, returning the handler it replaced.
    pub fn register(
        &self,
        entity: impl Into<String>,
        handler: Arc<dyn EntityHandler>,
    ) -> Option<Arc<dyn EntityHandler>> {
        let entity = entity.into();
        debug!(scope = %self.scope, entity = %entity, "registering entity handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity, handler)
    }

    pub fn unregister(&self, entity: &str) -> Option<Arc<dyn EntityHandler>> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(entity)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LookupSource for ScopedRegistry {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn lookup(&self, entity: &str) -> Result<Arc<dyn EntityHandler>, LookupError> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
            .cloned()
            .ok_or_else(|| LookupError::NotRegistered {
                scope: self.scope.clone(),
                entity: entity.to_owned(),
            })
    }
}

impl fmt::Debug for ScopedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entities: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        entities.sort();
        f.debug_struct("ScopedRegistry")
            .field("scope", &self.scope)
            .field("entities", &entities)
            .finish()
    }
}
