use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use ens_freshness::{StateSource, TrackedSnapshot};
use ens_store::{EntityEvent, NormalizedStore};
use ens_types::Timestamp;
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// A store whose record type has been erased so stores of different types
/// can live in one container.
trait ErasedStore: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn snapshot(&self) -> TrackedSnapshot;
}

impl<T> ErasedStore for NormalizedStore<T>
where
    T: Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> TrackedSnapshot {
        TrackedSnapshot::from(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StoreKey {
    feature: Option<String>,
    entity: String,
}

impl StoreKey {
    fn new(entity: &str, feature: Option<&str>) -> Self {
        Self {
            feature: feature.map(str::to_owned),
            entity: entity.to_owned(),
        }
    }

    fn partition(&self) -> String {
        partition_name(self.feature.as_deref())
    }
}

fn partition_name(feature: Option<&str>) -> String {
    match feature {
        Some(f) => format!("feature '{f}'"),
        None => "root".to_owned(),
    }
}

/// The application state container.
///
/// Holds one [`NormalizedStore`] per entity type, either in the root
/// partition or under a named feature. Writes take the lock for the length
/// of a single reduction.
#[derive(Default)]
pub struct AppState {
    stores: RwLock<HashMap<StoreKey, Box<dyn ErasedStore>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store for `entity` unless one already exists.
    ///
    /// Returns `true` if a store was created.
    pub fn register<T>(&self, entity: &str, feature: Option<&str>) -> bool
    where
        T: Send + Sync + 'static,
    {
        let key = StoreKey::new(entity, feature);
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        if stores.contains_key(&key) {
            return false;
        }
        debug!(entity, partition = %key.partition(), "creating entity store");
        stores.insert(key, Box::new(NormalizedStore::<T>::new()));
        true
    }

    pub fn contains(&self, entity: &str, feature: Option<&str>) -> bool {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&StoreKey::new(entity, feature))
    }

    /// Reduce `event` into the store for `entity`.
    pub fn apply<T>(
        &self,
        entity: &str,
        feature: Option<&str>,
        event: &EntityEvent<T>,
        now: Timestamp,
    ) -> RuntimeResult<()>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = StoreKey::new(entity, feature);
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let erased = stores.get_mut(&key).ok_or_else(|| RuntimeError::NoStore {
            entity: entity.to_owned(),
            partition: key.partition(),
        })?;
        let store = erased
            .as_any_mut()
            .downcast_mut::<NormalizedStore<T>>()
            .ok_or_else(|| RuntimeError::StoreTypeMismatch {
                entity: entity.to_owned(),
            })?;
        store.apply(event, now);
        Ok(())
    }

    /// Run `read` against the store for `entity`.
    pub fn read<T, R>(
        &self,
        entity: &str,
        feature: Option<&str>,
        read: impl FnOnce(&NormalizedStore<T>) -> R,
    ) -> RuntimeResult<R>
    where
        T: Send + Sync + 'static,
    {
        let key = StoreKey::new(entity, feature);
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let erased = stores.get(&key).ok_or_else(|| RuntimeError::NoStore {
            entity: entity.to_owned(),
            partition: key.partition(),
        })?;
        let store = erased
            .as_any()
            .downcast_ref::<NormalizedStore<T>>()
            .ok_or_else(|| RuntimeError::StoreTypeMismatch {
                entity: entity.to_owned(),
            })?;
        Ok(read(store))
    }

    /// A copy of the store for `entity`.
    pub fn store<T>(&self, entity: &str, feature: Option<&str>) -> RuntimeResult<NormalizedStore<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.read(entity, feature, NormalizedStore::<T>::clone)
    }

    /// Entity names held by `feature`'s partition, or the root's for `None`.
    pub fn entities(&self, feature: Option<&str>) -> Vec<String> {
        let mut names: Vec<String> = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|key| key.feature.as_deref() == feature)
            .map(|key| key.entity.clone())
            .collect();
        names.sort();
        names
    }

    pub fn features(&self) -> Vec<String> {
        let mut features: Vec<String> = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter_map(|key| key.feature.clone())
            .collect();
        features.sort();
        features.dedup();
        features
    }
}

impl StateSource for AppState {
    fn snapshot(&self, entity: &str, feature: Option<&str>) -> Option<TrackedSnapshot> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&StoreKey::new(entity, feature))
            .map(|store| store.snapshot())
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("root", &self.entities(None))
            .field("features", &self.features())
            .finish()
    }
}
