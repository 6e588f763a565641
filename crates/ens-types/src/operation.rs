use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The closed set of backend operations an entity type supports.
///
/// Each operation belongs to exactly one [`Activity`], which decides which
/// tracking flag an initiating event raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    LoadAll,
    LoadMany,
    LoadPage,
    LoadRange,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Upsert,
    UpsertMany,
    Replace,
    ReplaceMany,
    Delete,
    DeleteMany,
    DeleteByKey,
    DeleteManyByKeys,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Load,
        Self::LoadAll,
        Self::LoadMany,
        Self::LoadPage,
        Self::LoadRange,
        Self::Create,
        Self::CreateMany,
        Self::Update,
        Self::UpdateMany,
        Self::Upsert,
        Self::UpsertMany,
        Self::Replace,
        Self::ReplaceMany,
        Self::Delete,
        Self::DeleteMany,
        Self::DeleteByKey,
        Self::DeleteManyByKeys,
    ];

    /// The tracking activity this operation reports under.
    pub const fn activity(&self) -> Activity {
        match self {
            Self::Load | Self::LoadAll | Self::LoadMany | Self::LoadPage | Self::LoadRange => {
                Activity::Loading
            }
            Self::Create
            | Self::CreateMany
            | Self::Update
            | Self::UpdateMany
            | Self::Upsert
            | Self::UpsertMany
            | Self::Replace
            | Self::ReplaceMany => Activity::Saving,
            Self::Delete | Self::DeleteMany | Self::DeleteByKey | Self::DeleteManyByKeys => {
                Activity::Deleting
            }
        }
    }

    /// Snake-case name, also used as the handler method name in errors.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::LoadAll => "load_all",
            Self::LoadMany => "load_many",
            Self::LoadPage => "load_page",
            Self::LoadRange => "load_range",
            Self::Create => "create",
            Self::CreateMany => "create_many",
            Self::Update => "update",
            Self::UpdateMany => "update_many",
            Self::Upsert => "upsert",
            Self::UpsertMany => "upsert_many",
            Self::Replace => "replace",
            Self::ReplaceMany => "replace_many",
            Self::Delete => "delete",
            Self::DeleteMany => "delete_many",
            Self::DeleteByKey => "delete_by_key",
            Self::DeleteManyByKeys => "delete_many_by_keys",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| TypeError::UnknownOperation(s.to_owned()))
    }
}

/// Which in-flight flag an operation raises on its store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Loading,
    Saving,
    Deleting,
}

/// The flavour of a successful save, deciding which extra timestamp it stamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    Create,
    Update,
    Upsert,
    Replace,
}

impl SaveKind {
    /// The operation that produced this save, single or batch form.
    pub const fn operation(&self, many: bool) -> Operation {
        match (self, many) {
            (Self::Create, false) => Operation::Create,
            (Self::Create, true) => Operation::CreateMany,
            (Self::Update, false) => Operation::Update,
            (Self::Update, true) => Operation::UpdateMany,
            (Self::Upsert, false) => Operation::Upsert,
            (Self::Upsert, true) => Operation::UpsertMany,
            (Self::Replace, false) => Operation::Replace,
            (Self::Replace, true) => Operation::ReplaceMany,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_partitions_operations() {
        let loading = Operation::ALL
            .iter()
            .filter(|op| op.activity() == Activity::Loading)
            .count();
        let saving = Operation::ALL
            .iter()
            .filter(|op| op.activity() == Activity::Saving)
            .count();
        let deleting = Operation::ALL
            .iter()
            .filter(|op| op.activity() == Activity::Deleting)
            .count();
        assert_eq!((loading, saving, deleting), (5, 8, 4));
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "fetch".parse::<Operation>(),
            Err(TypeError::UnknownOperation("fetch".into()))
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Operation::LoadAll).unwrap();
        assert_eq!(json, "\"load_all\"");
    }

    #[test]
    fn save_kind_maps_to_operation() {
        assert_eq!(SaveKind::Create.operation(false), Operation::Create);
        assert_eq!(SaveKind::Replace.operation(true), Operation::ReplaceMany);
    }
}
