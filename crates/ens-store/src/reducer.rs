use ens_types::{PageInfo, RangeInfo, SaveKind, Timestamp};
use tracing::debug;

use crate::event::{EntityAction, EntityEvent};
use crate::store::{EditBuffer, NormalizedStore, Tracking};

/// Apply one event to a store and return the new store.
///
/// Total over [`EntityEvent`]: every event produces a store, none fails.
/// `now` is the instant success events stamp into the tracking timestamps.
pub fn reduce<T: Clone>(
    mut store: NormalizedStore<T>,
    event: &EntityEvent<T>,
    now: Timestamp,
) -> NormalizedStore<T> {
    store.apply(event, now);
    store
}

/// Reduce an action from a shared stream.
///
/// Actions that carry no event for `entity` return the store unchanged.
pub fn reduce_action<T, A>(
    store: NormalizedStore<T>,
    entity: &str,
    action: &A,
    now: Timestamp,
) -> NormalizedStore<T>
where
    T: Clone,
    A: EntityAction<T> + ?Sized,
{
    match action.entity_event(entity) {
        Some(event) => {
            debug!(entity, event = event.name(), "reducing entity event");
            reduce(store, event, now)
        }
        None => store,
    }
}

impl<T: Clone> NormalizedStore<T> {
    /// In-place form of [`reduce`].
    pub fn apply(&mut self, event: &EntityEvent<T>, now: Timestamp) {
        match event {
            EntityEvent::Requested(op) => self.tracking.set_flag(op.activity(), true),
            EntityEvent::Failed { operation, .. } => {
                self.tracking.set_flag(operation.activity(), false)
            }

            EntityEvent::Loaded(keyed) => {
                self.upsert(keyed.clone());
                self.finish_load(now);
            }
            EntityEvent::LoadedMany(records) => {
                self.upsert_many(records.iter().cloned());
                self.finish_load(now);
            }
            EntityEvent::LoadedAll(records) => {
                self.replace_all(records.iter().cloned());
                self.finish_load(now);
            }
            EntityEvent::LoadedPage {
                records,
                page,
                total,
            } => {
                self.replace_all(records.iter().cloned());
                self.paging = Some(PageInfo {
                    current_page: *page,
                    total_count: *total,
                });
                self.finish_load(now);
            }
            EntityEvent::LoadedRange {
                records,
                range,
                total,
            } => {
                self.upsert_many(records.iter().cloned());
                self.range_info = Some(RangeInfo {
                    current_range: *range,
                    total_count: *total,
                });
                self.finish_load(now);
            }

            EntityEvent::Saved { kind, records } => {
                self.upsert_many(records.iter().cloned());
                self.finish_save(*kind, now);
            }
            EntityEvent::Deleted { ids } => {
                for id in ids {
                    self.remove(id);
                }
                self.tracking.is_deleting = false;
                Tracking::stamp(&mut self.tracking.deleted_at, now);
            }

            EntityEvent::Select(id) => self.selected_id = Some(id.clone()),
            EntityEvent::SelectMany(ids) => {
                self.selected_ids.clear();
                self.extend_selection(ids);
            }
            EntityEvent::SelectMore(ids) => self.extend_selection(ids),
            EntityEvent::Deselect => self.selected_id = None,
            EntityEvent::DeselectMany(ids) => self.selected_ids.retain(|id| !ids.contains(id)),
            EntityEvent::DeselectAll => self.selected_ids.clear(),

            EntityEvent::Edit(record) => {
                self.edit = Some(EditBuffer {
                    record: record.clone(),
                    dirty: false,
                })
            }
            EntityEvent::Change(record) => {
                self.edit = Some(EditBuffer {
                    record: record.clone(),
                    dirty: true,
                })
            }
            EntityEvent::EndEdit => self.edit = None,

            EntityEvent::Clear => *self = Self::default(),
        }
        debug_assert!(self.is_consistent(), "by_id/order bijection broken");
    }

    fn finish_load(&mut self, now: Timestamp) {
        self.tracking.is_loading = false;
        Tracking::stamp(&mut self.tracking.loaded_at, now);
    }

    fn finish_save(&mut self, kind: SaveKind, now: Timestamp) {
        self.tracking.is_saving = false;
        Tracking::stamp(&mut self.tracking.saved_at, now);
        let specific = match kind {
            SaveKind::Create => Some(&mut self.tracking.created_at),
            SaveKind::Update => Some(&mut self.tracking.updated_at),
            SaveKind::Replace => Some(&mut self.tracking.replaced_at),
            SaveKind::Upsert => None,
        };
        if let Some(slot) = specific {
            Tracking::stamp(slot, now);
        }
    }

    fn extend_selection(&mut self, ids: &[ens_types::Identity]) {
        for id in ids {
            if !self.selected_ids.contains(id) {
                self.selected_ids.push(id.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Envelope;
    use ens_types::{Identity, Keyed, Operation, Page, Range};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn rec(id: &str) -> Keyed<Value> {
        Keyed::new(id, json!({ "id": id }))
    }

    fn ids(store: &NormalizedStore<Value>) -> Vec<String> {
        store.order.iter().map(ToString::to_string).collect()
    }

    fn t(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    // -----------------------------------------------------------------------
    // Upsert / replace / merge
    // -----------------------------------------------------------------------

    #[test]
    fn single_upsert_is_idempotent() {
        let event = EntityEvent::Loaded(rec("a"));
        let once = reduce(NormalizedStore::new(), &event, t(10));
        let twice = reduce(once.clone(), &event, t(10));
        assert_eq!(once, twice);
        assert_eq!(ids(&twice), vec!["a"]);
    }

    #[test]
    fn batch_upsert_keeps_existing_positions() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedMany(vec![rec("a"), rec("b")]),
            t(1),
        );
        let updated = Keyed::new("a", json!({"id": "a", "v": 2}));
        let store = reduce(
            store,
            &EntityEvent::LoadedMany(vec![rec("c"), updated]),
            t(2),
        );
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.by_id[&Identity::from("a")]["v"], json!(2));
    }

    #[test]
    fn full_replace_drops_unlisted_records() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedMany(vec![rec("a"), rec("b")]),
            t(1),
        );
        let store = reduce(
            store,
            &EntityEvent::LoadedAll(vec![rec("c"), rec("a")]),
            t(2),
        );
        assert_eq!(ids(&store), vec!["c", "a"]);
        assert!(!store.by_id.contains_key(&Identity::from("b")));
    }

    #[test]
    fn pages_replace_and_ranges_merge() {
        let page = |n| Page::new(n, 2).unwrap();
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedPage {
                records: vec![rec("A"), rec("B")],
                page: page(1),
                total: 4,
            },
            t(1),
        );
        let store = reduce(
            store,
            &EntityEvent::LoadedPage {
                records: vec![rec("C"), rec("D")],
                page: page(2),
                total: 4,
            },
            t(2),
        );
        assert_eq!(ids(&store), vec!["C", "D"]);
        assert_eq!(store.by_id.len(), 2);
        assert_eq!(store.paging.unwrap().current_page, page(2));

        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedRange {
                records: vec![rec("A"), rec("B"), rec("C")],
                range: Range::span(1, 3).unwrap(),
                total: 6,
            },
            t(1),
        );
        let store = reduce(
            store,
            &EntityEvent::LoadedRange {
                records: vec![rec("D"), rec("E"), rec("F")],
                range: Range::span(4, 6).unwrap(),
                total: 6,
            },
            t(2),
        );
        assert_eq!(ids(&store), vec!["A", "B", "C", "D", "E", "F"]);
        let info = store.range_info.unwrap();
        assert_eq!(info.current_range, Range::span(4, 6).unwrap());
        assert_eq!(info.total_count, 6);
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[test]
    fn delete_removes_from_both_indexes() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedAll(vec![rec("a"), rec("b"), rec("c")]),
            t(1),
        );
        let store = reduce(store, &EntityEvent::deleted_one("b"), t(2));
        assert_eq!(ids(&store), vec!["a", "c"]);
        assert!(store.is_consistent());
        assert_eq!(store.tracking.deleted_at, Some(t(2)));
    }

    #[test]
    fn delete_of_absent_key_leaves_records_untouched() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedAll(vec![rec("a"), rec("b")]),
            t(1),
        );
        let after = reduce(store.clone(), &EntityEvent::deleted_one("zzz"), t(2));
        assert_eq!(after.by_id, store.by_id);
        assert_eq!(after.order, store.order);
        assert_eq!(after.selected_ids, store.selected_ids);
        assert_eq!(after.paging, store.paging);
    }

    // -----------------------------------------------------------------------
    // Tracking
    // -----------------------------------------------------------------------

    #[test]
    fn requested_only_raises_flag() {
        let loaded = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedAll(vec![rec("a")]),
            t(1),
        );
        let requested = reduce(loaded.clone(), &EntityEvent::Requested(Operation::LoadAll), t(5));
        assert!(requested.tracking.is_loading);
        assert_eq!(requested.by_id, loaded.by_id);
        assert_eq!(requested.order, loaded.order);
        assert_eq!(requested.tracking.loaded_at, loaded.tracking.loaded_at);
    }

    #[test]
    fn failure_clears_flag_without_stamping() {
        let store = reduce(
            NormalizedStore::<Value>::new(),
            &EntityEvent::Requested(Operation::Update),
            t(1),
        );
        assert!(store.tracking.is_saving);
        let store = reduce(
            store,
            &EntityEvent::Failed {
                operation: Operation::Update,
                reason: "boom".into(),
            },
            t(2),
        );
        assert!(!store.tracking.is_saving);
        assert_eq!(store.tracking.saved_at, None);
        assert_eq!(store.tracking.updated_at, None);
    }

    #[test]
    fn success_timestamps_never_regress() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::Loaded(rec("a")),
            t(100),
        );
        let store = reduce(store, &EntityEvent::Loaded(rec("b")), t(40));
        assert_eq!(store.tracking.loaded_at, Some(t(100)));
    }

    #[test]
    fn saves_stamp_kind_specific_timestamps() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::saved_one(SaveKind::Create, rec("a")),
            t(1),
        );
        assert_eq!(store.tracking.created_at, Some(t(1)));
        assert_eq!(store.tracking.saved_at, Some(t(1)));

        let store = reduce(
            store,
            &EntityEvent::saved_one(SaveKind::Replace, rec("a")),
            t(2),
        );
        assert_eq!(store.tracking.replaced_at, Some(t(2)));
        assert_eq!(store.tracking.created_at, Some(t(1)));

        let store = reduce(
            store,
            &EntityEvent::Saved {
                kind: SaveKind::Upsert,
                records: vec![rec("b"), rec("c")],
            },
            t(3),
        );
        assert_eq!(store.tracking.saved_at, Some(t(3)));
        assert_eq!(store.tracking.updated_at, None);
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
    }

    // -----------------------------------------------------------------------
    // Selection / edit / clear
    // -----------------------------------------------------------------------

    #[test]
    fn selection_never_touches_records() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedAll(vec![rec("a")]),
            t(1),
        );
        let store = reduce(store, &EntityEvent::Select(Identity::from("ghost")), t(2));
        assert_eq!(store.selected_id, Some(Identity::from("ghost")));
        assert_eq!(ids(&store), vec!["a"]);

        let many = vec![Identity::from("a"), Identity::from("b")];
        let store = reduce(store, &EntityEvent::SelectMany(many), t(3));
        let store = reduce(
            store,
            &EntityEvent::SelectMore(vec![Identity::from("b"), Identity::from("c")]),
            t(4),
        );
        assert_eq!(
            store.selected_ids,
            vec![Identity::from("a"), Identity::from("b"), Identity::from("c")]
        );
        let store = reduce(
            store,
            &EntityEvent::DeselectMany(vec![Identity::from("b")]),
            t(5),
        );
        assert_eq!(store.selected_ids, vec![Identity::from("a"), Identity::from("c")]);
        let store = reduce(store, &EntityEvent::Deselect, t(6));
        let store = reduce(store, &EntityEvent::DeselectAll, t(7));
        assert_eq!(store.selected_id, None);
        assert!(store.selected_ids.is_empty());
    }

    #[test]
    fn edit_lifecycle() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::Edit(json!({"id": "a", "name": "x"})),
            t(1),
        );
        assert!(!store.edit.as_ref().unwrap().dirty);
        let store = reduce(
            store,
            &EntityEvent::Change(json!({"id": "a", "name": "y"})),
            t(2),
        );
        let buffer = store.edit.as_ref().unwrap();
        assert!(buffer.dirty);
        assert_eq!(buffer.record["name"], json!("y"));
        assert!(store.order.is_empty());
        let store = reduce(store, &EntityEvent::EndEdit, t(3));
        assert!(store.edit.is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedPage {
                records: vec![rec("a")],
                page: Page::new(1, 10).unwrap(),
                total: 1,
            },
            t(1),
        );
        let store = reduce(store, &EntityEvent::Select(Identity::from("a")), t(2));
        let store = reduce(store, &EntityEvent::Clear, t(3));
        assert_eq!(store, NormalizedStore::new());
    }

    // -----------------------------------------------------------------------
    // Pass-through
    // -----------------------------------------------------------------------

    #[test]
    fn foreign_envelopes_pass_through() {
        let store = reduce(
            NormalizedStore::new(),
            &EntityEvent::LoadedAll(vec![rec("a")]),
            t(1),
        );
        let foreign = Envelope::new("order", EntityEvent::Clear);
        let after = reduce_action(store.clone(), "customer", &foreign, t(2));
        assert_eq!(after, store);

        let own = Envelope::new("customer", EntityEvent::Clear);
        let after = reduce_action(store, "customer", &own, t(2));
        assert!(after.order.is_empty());
    }

    // -----------------------------------------------------------------------
    // Bijection property
    // -----------------------------------------------------------------------

    fn keyed_strategy() -> impl Strategy<Value = Keyed<Value>> {
        (0i64..8, any::<u8>()).prop_map(|(id, v)| Keyed::new(id, json!({ "id": id, "v": v })))
    }

    fn event_strategy() -> impl Strategy<Value = EntityEvent<Value>> {
        let batch = || prop::collection::vec(keyed_strategy(), 0..6);
        let id = || (0i64..8).prop_map(Identity::from);
        prop_oneof![
            keyed_strategy().prop_map(EntityEvent::Loaded),
            batch().prop_map(EntityEvent::LoadedMany),
            batch().prop_map(EntityEvent::LoadedAll),
            (batch(), 1u32..4).prop_map(|(records, p)| EntityEvent::LoadedPage {
                records,
                page: Page::new(p, 5).unwrap(),
                total: 20,
            }),
            (batch(), 0u64..10).prop_map(|(records, skip)| EntityEvent::LoadedRange {
                records,
                range: Range::skip(skip, 5),
                total: 20,
            }),
            batch().prop_map(|records| EntityEvent::Saved {
                kind: SaveKind::Upsert,
                records,
            }),
            prop::collection::vec(id(), 0..4).prop_map(|ids| EntityEvent::Deleted { ids }),
            id().prop_map(EntityEvent::Select),
            Just(EntityEvent::Requested(Operation::Load)),
            Just(EntityEvent::Clear),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn bijection_holds_after_every_step(events in prop::collection::vec(event_strategy(), 0..24)) {
            let mut store = NormalizedStore::new();
            for (i, event) in events.iter().enumerate() {
                store = reduce(store, event, t(i as u64));
                prop_assert!(store.is_consistent());
            }
        }
    }
}
