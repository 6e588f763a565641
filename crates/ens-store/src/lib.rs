//! Normalized entity store and CRUD reduction engine.
//!
//! A [`NormalizedStore`] holds the live state for one record type: records
//! keyed by [`Identity`](ens_types::Identity), an ordered id list, selection,
//! an edit buffer, paging/range windows and tracking flags.
//!
//! State only changes through [`reduce`] (or [`NormalizedStore::apply`]), a
//! pure total function over the [`EntityEvent`] enum. Events addressed to a
//! different entity type pass through untouched, so a store can sit on a
//! shared event stream.
//!
//! # Design Rules
//!
//! 1. `by_id` and `order` are always in bijection.
//! 2. `order` keeps insertion order except on wholesale replacement.
//! 3. Each event kind either replaces or merges, never both.
//! 4. Tracking timestamps never move backward.
//! 5. The reducer never fails and never extracts keys; events carry them.

pub mod event;
pub mod reducer;
pub mod store;
pub mod view;

pub use event::{EntityAction, EntityEvent, Envelope};
pub use reducer::{reduce, reduce_action};
pub use store::{EditBuffer, NormalizedStore, Tracking};
