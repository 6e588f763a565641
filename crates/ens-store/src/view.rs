//! Read-side projections over a [`NormalizedStore`].
//!
//! All of these are pure: they borrow the store and never mutate it.

use std::collections::HashMap;

use ens_meta::{Comparer, Record};
use ens_types::{Identity, Page, PageInfo, Range, RangeInfo, Timestamp};

use crate::store::NormalizedStore;

impl<T> NormalizedStore<T> {
    /// Records in store order.
    pub fn all(&self) -> Vec<&T> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    /// The identity-to-record dictionary.
    pub fn entities(&self) -> &HashMap<Identity, T> {
        &self.by_id
    }

    pub fn ids(&self) -> &[Identity] {
        &self.order
    }

    pub fn get(&self, id: &Identity) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of records held.
    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn current_id(&self) -> Option<&Identity> {
        self.selected_id.as_ref()
    }

    /// The selected record, if it is currently loaded.
    pub fn current(&self) -> Option<&T> {
        self.selected_id.as_ref().and_then(|id| self.by_id.get(id))
    }

    pub fn selected_ids(&self) -> &[Identity] {
        &self.selected_ids
    }

    /// Selected records that are currently loaded, in selection order.
    pub fn current_many(&self) -> Vec<&T> {
        self.selected_ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    pub fn edited(&self) -> Option<&T> {
        self.edit.as_ref().map(|buffer| &buffer.record)
    }

    pub fn is_dirty(&self) -> bool {
        self.edit.as_ref().is_some_and(|buffer| buffer.dirty)
    }

    pub fn paging(&self) -> Option<&PageInfo> {
        self.paging.as_ref()
    }

    pub fn current_page(&self) -> Option<Page> {
        self.paging.map(|info| info.current_page)
    }

    pub fn range_info(&self) -> Option<&RangeInfo> {
        self.range_info.as_ref()
    }

    pub fn current_range(&self) -> Option<Range> {
        self.range_info.map(|info| info.current_range)
    }

    /// Backend-reported total from the latest page load, else range load.
    pub fn total_count(&self) -> Option<u64> {
        self.paging
            .map(|info| info.total_count)
            .or_else(|| self.range_info.map(|info| info.total_count))
    }

    pub fn is_loading(&self) -> bool {
        self.tracking.is_loading
    }

    pub fn is_saving(&self) -> bool {
        self.tracking.is_saving
    }

    pub fn is_deleting(&self) -> bool {
        self.tracking.is_deleting
    }

    pub fn loaded_at(&self) -> Option<Timestamp> {
        self.tracking.loaded_at
    }

    pub fn saved_at(&self) -> Option<Timestamp> {
        self.tracking.saved_at
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        self.tracking.created_at
    }

    pub fn updated_at(&self) -> Option<Timestamp> {
        self.tracking.updated_at
    }

    pub fn replaced_at(&self) -> Option<Timestamp> {
        self.tracking.replaced_at
    }

    pub fn deleted_at(&self) -> Option<Timestamp> {
        self.tracking.deleted_at
    }
}

impl<T: Record> NormalizedStore<T> {
    /// Records ordered by `comparer`; ties keep store order.
    pub fn sorted(&self, comparer: &Comparer) -> Vec<&T> {
        let mut records = self.all();
        records.sort_by(|a, b| comparer.compare(*a, *b));
        records
    }

    /// Records ordered by `comparer` when one is configured, else store order.
    pub fn sorted_or_stored(&self, comparer: Option<&Comparer>) -> Vec<&T> {
        match comparer {
            Some(c) => self.sorted(c),
            None => self.all(),
        }
    }
}
