use async_trait::async_trait;
use ens_types::{Identity, Operation, Page, Range};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HandlerError, HandlerResult};

/// Free-form query parameters passed through to the backend untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(Map<String, Value>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Criteria {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One page of records and the backend's total count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub records: Vec<Value>,
    pub total: u64,
}

/// One range of records and the backend's total count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeResult {
    pub records: Vec<Value>,
    pub total: u64,
}

/// The backend contract for one or more entity types.
///
/// Records cross this boundary as JSON already shaped for the backend
/// (outbound transforms applied). Deletes answer with unit: the caller
/// already knows which identities it asked to remove. Every method defaults to
/// [`HandlerError::NotImplemented`], so a handler only provides what its
/// backend supports.
#[async_trait]
pub trait EntityHandler: Send + Sync {
    async fn load(&self, entity: &str, _id: &Identity, _criteria: &Criteria) -> HandlerResult<Value> {
        Err(HandlerError::not_implemented(entity, Operation::Load))
    }

    async fn load_all(&self, entity: &str, _criteria: &Criteria) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::LoadAll))
    }

    async fn load_many(&self, entity: &str, _criteria: &Criteria) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::LoadMany))
    }

    async fn load_page(
        &self,
        entity: &str,
        _page: Page,
        _criteria: &Criteria,
    ) -> HandlerResult<PageResult> {
        Err(HandlerError::not_implemented(entity, Operation::LoadPage))
    }

    async fn load_range(
        &self,
        entity: &str,
        _range: Range,
        _criteria: &Criteria,
    ) -> HandlerResult<RangeResult> {
        Err(HandlerError::not_implemented(entity, Operation::LoadRange))
    }

    async fn create(&self, entity: &str, _record: Value, _criteria: &Criteria) -> HandlerResult<Value> {
        Err(HandlerError::not_implemented(entity, Operation::Create))
    }

    async fn create_many(
        &self,
        entity: &str,
        _records: Vec<Value>,
        _criteria: &Criteria,
    ) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::CreateMany))
    }

    async fn update(&self, entity: &str, _record: Value, _criteria: &Criteria) -> HandlerResult<Value> {
        Err(HandlerError::not_implemented(entity, Operation::Update))
    }

    async fn update_many(
        &self,
        entity: &str,
        _records: Vec<Value>,
        _criteria: &Criteria,
    ) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::UpdateMany))
    }

    async fn upsert(&self, entity: &str, _record: Value, _criteria: &Criteria) -> HandlerResult<Value> {
        Err(HandlerError::not_implemented(entity, Operation::Upsert))
    }

    async fn upsert_many(
        &self,
        entity: &str,
        _records: Vec<Value>,
        _criteria: &Criteria,
    ) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::UpsertMany))
    }

    async fn replace(&self, entity: &str, _record: Value, _criteria: &Criteria) -> HandlerResult<Value> {
        Err(HandlerError::not_implemented(entity, Operation::Replace))
    }

    async fn replace_many(
        &self,
        entity: &str,
        _records: Vec<Value>,
        _criteria: &Criteria,
    ) -> HandlerResult<Vec<Value>> {
        Err(HandlerError::not_implemented(entity, Operation::ReplaceMany))
    }

    async fn delete(&self, entity: &str, _record: Value, _criteria: &Criteria) -> HandlerResult<()> {
        Err(HandlerError::not_implemented(entity, Operation::Delete))
    }

    async fn delete_many(
        &self,
        entity: &str,
        _records: Vec<Value>,
        _criteria: &Criteria,
    ) -> HandlerResult<()> {
        Err(HandlerError::not_implemented(entity, Operation::DeleteMany))
    }

    async fn delete_by_key(
        &self,
        entity: &str,
        _id: &Identity,
        _criteria: &Criteria,
    ) -> HandlerResult<()> {
        Err(HandlerError::not_implemented(entity, Operation::DeleteByKey))
    }

    async fn delete_many_by_keys(
        &self,
        entity: &str,
        _ids: &[Identity],
        _criteria: &Criteria,
    ) -> HandlerResult<()> {
        Err(HandlerError::not_implemented(entity, Operation::DeleteManyByKeys))
    }
}
