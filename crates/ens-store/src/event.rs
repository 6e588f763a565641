use ens_types::{CorrelationId, Identity, Keyed, Operation, Page, Range, SaveKind};

/// Every state change a [`NormalizedStore`](crate::NormalizedStore) accepts.
///
/// Success events carry records already paired with their identity; the
/// reducer never extracts keys. Deleting by record and deleting by key both
/// arrive as [`EntityEvent::Deleted`] once the producer has keyed them.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityEvent<T> {
    /// An operation started. Raises its activity flag and nothing else.
    Requested(Operation),
    /// An operation failed. Clears its activity flag and nothing else.
    Failed { operation: Operation, reason: String },

    /// Single-record load: upsert.
    Loaded(Keyed<T>),
    /// Batch load: upsert each, existing ids keep their position.
    LoadedMany(Vec<Keyed<T>>),
    /// Full load: replace everything.
    LoadedAll(Vec<Keyed<T>>),
    /// Page load: replace everything and record the page.
    LoadedPage {
        records: Vec<Keyed<T>>,
        page: Page,
        total: u64,
    },
    /// Range load: merge and record the range.
    LoadedRange {
        records: Vec<Keyed<T>>,
        range: Range,
        total: u64,
    },

    /// Create/update/upsert/replace success, one record or many: upsert each.
    Saved { kind: SaveKind, records: Vec<Keyed<T>> },
    /// Delete success: remove each id, ignoring absent ones.
    Deleted { ids: Vec<Identity> },

    Select(Identity),
    /// Replace the multi-selection.
    SelectMany(Vec<Identity>),
    /// Extend the multi-selection.
    SelectMore(Vec<Identity>),
    Deselect,
    DeselectMany(Vec<Identity>),
    DeselectAll,

    /// Start editing: the buffer holds a copy, not yet dirty.
    Edit(T),
    /// Replace the buffer contents and mark it dirty.
    Change(T),
    EndEdit,

    /// Reset to the empty store.
    Clear,
}

impl<T> EntityEvent<T> {
    /// Short event name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Requested(_) => "requested",
            Self::Failed { .. } => "failed",
            Self::Loaded(_) => "loaded",
            Self::LoadedMany(_) => "loaded_many",
            Self::LoadedAll(_) => "loaded_all",
            Self::LoadedPage { .. } => "loaded_page",
            Self::LoadedRange { .. } => "loaded_range",
            Self::Saved { .. } => "saved",
            Self::Deleted { .. } => "deleted",
            Self::Select(_) => "select",
            Self::SelectMany(_) => "select_many",
            Self::SelectMore(_) => "select_more",
            Self::Deselect => "deselect",
            Self::DeselectMany(_) => "deselect_many",
            Self::DeselectAll => "deselect_all",
            Self::Edit(_) => "edit",
            Self::Change(_) => "change",
            Self::EndEdit => "end_edit",
            Self::Clear => "clear",
        }
    }

    /// A save of a single record.
    pub fn saved_one(kind: SaveKind, record: Keyed<T>) -> Self {
        Self::Saved {
            kind,
            records: vec![record],
        }
    }

    /// A delete of a single id.
    pub fn deleted_one(id: impl Into<Identity>) -> Self {
        Self::Deleted {
            ids: vec![id.into()],
        }
    }
}

/// An entity event addressed to one entity type.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope<T> {
    pub entity: String,
    pub correlation: CorrelationId,
    pub event: EntityEvent<T>,
}

impl<T> Envelope<T> {
    /// Address `event` to `entity` under a fresh correlation id.
    pub fn new(entity: impl Into<String>, event: EntityEvent<T>) -> Self {
        Self {
            entity: entity.into(),
            correlation: CorrelationId::new(),
            event,
        }
    }

    pub fn with_correlation(mut self, correlation: CorrelationId) -> Self {
        self.correlation = correlation;
        self
    }
}

/// Anything on a shared event stream that may or may not carry an entity
/// event for a given type.
///
/// The reducer asks each action for its event; `None` means "not mine" and
/// the store passes through unchanged.
pub trait EntityAction<T> {
    fn entity_event(&self, entity: &str) -> Option<&EntityEvent<T>>;
}

impl<T> EntityAction<T> for Envelope<T> {
    fn entity_event(&self, entity: &str) -> Option<&EntityEvent<T>> {
        (self.entity == entity).then_some(&self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_matches_only_its_entity() {
        let env: Envelope<i64> = Envelope::new("customer", EntityEvent::Clear);
        assert!(env.entity_event("customer").is_some());
        assert!(env.entity_event("order").is_none());
    }

    #[test]
    fn with_correlation_overrides_id() {
        let id = CorrelationId::new();
        let env: Envelope<i64> = Envelope::new("customer", EntityEvent::Deselect).with_correlation(id);
        assert_eq!(env.correlation, id);
    }

    #[test]
    fn helpers_build_single_item_events() {
        let saved = EntityEvent::saved_one(SaveKind::Create, Keyed::new(1, "x"));
        assert_eq!(saved.name(), "saved");
        let deleted: EntityEvent<&str> = EntityEvent::deleted_one(1);
        assert_eq!(
            deleted,
            EntityEvent::Deleted {
                ids: vec![Identity::from(1)]
            }
        );
    }
}
