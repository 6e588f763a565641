use std::collections::HashSet;

use ens_store::NormalizedStore;
use ens_types::{Identity, Page, Range, Timestamp};

/// The slice of a store the staleness logic needs.
///
/// Independent of the record type, so a [`StateSource`] can hand it out for
/// any entity without knowing `T`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackedSnapshot {
    pub ids: HashSet<Identity>,
    pub loaded_at: Option<Timestamp>,
    pub current_page: Option<Page>,
    pub current_range: Option<Range>,
}

impl TrackedSnapshot {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<T> From<&NormalizedStore<T>> for TrackedSnapshot {
    fn from(store: &NormalizedStore<T>) -> Self {
        Self {
            ids: store.ids().iter().cloned().collect(),
            loaded_at: store.loaded_at(),
            current_page: store.current_page(),
            current_range: store.current_range(),
        }
    }
}

/// Read handle onto the application state container.
///
/// Finds the store for `entity` at the root or, when `feature` is given,
/// under that feature partition. `None` means no such store exists.
pub trait StateSource: Send + Sync {
    fn snapshot(&self, entity: &str, feature: Option<&str>) -> Option<TrackedSnapshot>;
}
