use std::collections::{HashMap, HashSet};

use ens_types::{Activity, Identity, Keyed, PageInfo, RangeInfo, Timestamp};
use serde::Serialize;

/// In-flight flags and last-completion stamps for one store.
///
/// Flags are plain booleans: two overlapping requests of the same activity
/// share one flag, and the first completion clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tracking {
    pub is_loading: bool,
    pub is_saving: bool,
    pub is_deleting: bool,
    pub loaded_at: Option<Timestamp>,
    pub saved_at: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub replaced_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl Tracking {
    pub(crate) fn set_flag(&mut self, activity: Activity, value: bool) {
        match activity {
            Activity::Loading => self.is_loading = value,
            Activity::Saving => self.is_saving = value,
            Activity::Deleting => self.is_deleting = value,
        }
    }

    pub fn flag(&self, activity: Activity) -> bool {
        match activity {
            Activity::Loading => self.is_loading,
            Activity::Saving => self.is_saving,
            Activity::Deleting => self.is_deleting,
        }
    }

    /// Stamp `slot` with `now`, never moving it backward.
    pub(crate) fn stamp(slot: &mut Option<Timestamp>, now: Timestamp) {
        *slot = Some(slot.map_or(now, |prev| prev.max(now)));
    }
}

/// An uncommitted edit, independent of the stored records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EditBuffer<T> {
    pub record: T,
    /// Set once a change event has touched the buffer.
    pub dirty: bool,
}

/// Live state for one record type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedStore<T> {
    pub(crate) by_id: HashMap<Identity, T>,
    pub(crate) order: Vec<Identity>,
    pub(crate) selected_id: Option<Identity>,
    pub(crate) selected_ids: Vec<Identity>,
    pub(crate) edit: Option<EditBuffer<T>>,
    pub(crate) paging: Option<PageInfo>,
    pub(crate) range_info: Option<RangeInfo>,
    pub(crate) tracking: Tracking,
}

impl<T> Default for NormalizedStore<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
            selected_id: None,
            selected_ids: Vec::new(),
            edit: None,
            paging: None,
            range_info: None,
            tracking: Tracking::default(),
        }
    }
}

impl<T> NormalizedStore<T> {
    /// An empty store, as created at application start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `by_id` and `order` are in bijection and `order`
    /// holds no duplicates.
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.by_id.len() {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.order.len());
        self.order
            .iter()
            .all(|id| seen.insert(id) && self.by_id.contains_key(id))
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    /// Insert or overwrite one record. New ids append to `order`.
    pub(crate) fn upsert(&mut self, keyed: Keyed<T>) {
        if self.by_id.insert(keyed.id.clone(), keyed.record).is_none() {
            self.order.push(keyed.id);
        }
    }

    pub(crate) fn upsert_many(&mut self, records: impl IntoIterator<Item = Keyed<T>>) {
        for keyed in records {
            self.upsert(keyed);
        }
    }

    /// Replace every record wholesale, keeping input order.
    ///
    /// A repeated id keeps its first position and its last record.
    pub(crate) fn replace_all(&mut self, records: impl IntoIterator<Item = Keyed<T>>) {
        self.by_id.clear();
        self.order.clear();
        self.upsert_many(records);
    }

    /// Remove one record. Absent ids are ignored.
    pub(crate) fn remove(&mut self, id: &Identity) -> bool {
        if self.by_id.remove(id).is_none() {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }
}
