use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ens_freshness::{Decision, FreshnessPolicy, LoadRequest, StateSource};
use ens_meta::{EntityDescriptor, EntityRegistry};
use ens_resolve::{Criteria, EntityHandler, LookupSource, ResolutionChain};
use ens_store::{EntityEvent, Envelope, NormalizedStore};
use ens_types::{Clock, CorrelationId, Identity, Operation, Page, Range, SaveKind, SystemClock, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::codec::{decode, decode_all, encode, encode_all, identify};
use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::outcome::Outcome;
use crate::state::AppState;

/// Anything the runtime can store and send to a backend.
pub trait EntityRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> EntityRecord for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Builder for [`EntityRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    clock: Arc<dyn Clock>,
    chain: ResolutionChain,
    feature_sources: HashMap<String, Arc<dyn LookupSource>>,
    registry: Option<Arc<EntityRegistry>>,
    state: Option<Arc<AppState>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            clock: Arc::new(SystemClock),
            chain: ResolutionChain::new(),
            feature_sources: HashMap::new(),
            registry: None,
            state: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Append a global lookup source. Sources added first are consulted first.
    pub fn source(mut self, source: Arc<dyn LookupSource>) -> Self {
        self.chain = self.chain.with_source(source);
        self
    }

    /// Set the source consulted ahead of the global chain for `feature`'s types.
    pub fn feature_source(mut self, feature: impl Into<String>, source: Arc<dyn LookupSource>) -> Self {
        self.feature_sources.insert(feature.into(), source);
        self
    }

    pub fn registry(mut self, registry: Arc<EntityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn state(mut self, state: Arc<AppState>) -> Self {
        self.state = Some(state);
        self
    }

    /// Register every configured entity type and finish.
    ///
    /// Configured types get descriptors only; call
    /// [`EntityRuntime::attach`] to give each one a typed store.
    pub fn build(self) -> RuntimeResult<EntityRuntime> {
        let registry = self.registry.unwrap_or_default();
        for descriptor in self.config.descriptors()? {
            registry.register(descriptor)?;
        }
        let state = self.state.unwrap_or_default();
        let source: Arc<dyn StateSource> = state.clone();
        let policy = FreshnessPolicy::with_source(self.config.freshness.clone(), source);

        debug!(
            entities = registry.len(),
            scopes = ?self.chain.scopes(),
            features = self.feature_sources.len(),
            "entity runtime ready"
        );
        Ok(EntityRuntime {
            registry,
            chain: self.chain,
            feature_sources: self.feature_sources,
            policy,
            state,
            clock: self.clock,
        })
    }
}

/// Drives entity operations end to end.
///
/// Each operation dispatches `Requested`, resolves the type's handler, calls
/// it, keys the result and dispatches the success event. Any failure after
/// `Requested` dispatches `Failed` so the activity flag clears.
pub struct EntityRuntime {
    registry: Arc<EntityRegistry>,
    chain: ResolutionChain,
    feature_sources: HashMap<String, Arc<dyn LookupSource>>,
    policy: FreshnessPolicy,
    state: Arc<AppState>,
    clock: Arc<dyn Clock>,
}

impl EntityRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ---- Registration ----

    /// Register `descriptor` and create its store.
    pub fn register<T: EntityRecord>(&self, descriptor: EntityDescriptor) -> RuntimeResult<Arc<EntityDescriptor>> {
        let descriptor = self.registry.register(descriptor)?;
        self.state.register::<T>(descriptor.name(), descriptor.feature());
        Ok(descriptor)
    }

    /// Create the store for an already registered type.
    pub fn attach<T: EntityRecord>(&self, entity: &str) -> RuntimeResult<Arc<EntityDescriptor>> {
        let descriptor = self.registry.resolve(entity)?;
        self.state.register::<T>(descriptor.name(), descriptor.feature());
        Ok(descriptor)
    }

    pub fn descriptor(&self, entity: &str) -> RuntimeResult<Arc<EntityDescriptor>> {
        Ok(self.registry.resolve(entity)?)
    }

    // ---- Events and reads ----

    /// Reduce an envelope into its type's store.
    pub fn dispatch<T: EntityRecord>(&self, envelope: &Envelope<T>) -> RuntimeResult<()> {
        let descriptor = self.registry.resolve(&envelope.entity)?;
        self.apply(&descriptor, envelope)
    }

    /// Wrap `event` in a fresh envelope and dispatch it.
    pub fn send<T: EntityRecord>(&self, entity: &str, event: EntityEvent<T>) -> RuntimeResult<CorrelationId> {
        let envelope = Envelope::new(entity, event);
        self.dispatch(&envelope)?;
        Ok(envelope.correlation)
    }

    /// Read from `entity`'s store.
    pub fn with_store<T, R>(&self, entity: &str, read: impl FnOnce(&NormalizedStore<T>) -> R) -> RuntimeResult<R>
    where
        T: EntityRecord,
    {
        let descriptor = self.registry.resolve(entity)?;
        self.state.read(descriptor.name(), descriptor.feature(), read)
    }

    /// A copy of `entity`'s store.
    pub fn store<T: EntityRecord>(&self, entity: &str) -> RuntimeResult<NormalizedStore<T>> {
        self.with_store(entity, NormalizedStore::<T>::clone)
    }

    /// Whether `request` for `entity` needs a backend call right now.
    pub fn decide(&self, entity: &str, request: &LoadRequest, max_age: Option<Duration>) -> RuntimeResult<Decision> {
        let descriptor = self.registry.resolve(entity)?;
        Ok(self.policy.decide(&descriptor, request, max_age, self.clock.now()))
    }

    // ---- Loads ----

    pub async fn load<T: EntityRecord>(
        &self,
        entity: &str,
        id: impl Into<Identity>,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<T>> {
        let id = id.into();
        self.perform(entity, Operation::Load, |d, h| async move {
            let wire = h.load(d.name(), &id, criteria).await?;
            let keyed = decode::<T>(&d, Operation::Load, wire)?;
            let record = keyed.record.clone();
            Ok::<_, RuntimeError>((EntityEvent::Loaded(keyed), record))
        })
        .await
    }

    pub async fn load_all<T: EntityRecord>(&self, entity: &str, criteria: &Criteria) -> RuntimeResult<Outcome<Vec<T>>> {
        self.perform(entity, Operation::LoadAll, |d, h| async move {
            let wire = h.load_all(d.name(), criteria).await?;
            let keyed = decode_all::<T>(&d, Operation::LoadAll, wire)?;
            let records = keyed.iter().map(|k| k.record.clone()).collect();
            Ok::<_, RuntimeError>((EntityEvent::LoadedAll(keyed), records))
        })
        .await
    }

    pub async fn load_many<T: EntityRecord>(&self, entity: &str, criteria: &Criteria) -> RuntimeResult<Outcome<Vec<T>>> {
        self.perform(entity, Operation::LoadMany, |d, h| async move {
            let wire = h.load_many(d.name(), criteria).await?;
            let keyed = decode_all::<T>(&d, Operation::LoadMany, wire)?;
            let records = keyed.iter().map(|k| k.record.clone()).collect();
            Ok::<_, RuntimeError>((EntityEvent::LoadedMany(keyed), records))
        })
        .await
    }

    pub async fn load_page<T: EntityRecord>(
        &self,
        entity: &str,
        page: Page,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.perform(entity, Operation::LoadPage, |d, h| async move {
            let result = h.load_page(d.name(), page, criteria).await?;
            let keyed = decode_all::<T>(&d, Operation::LoadPage, result.records)?;
            let records = keyed.iter().map(|k| k.record.clone()).collect();
            let event = EntityEvent::LoadedPage {
                records: keyed,
                page,
                total: result.total,
            };
            Ok::<_, RuntimeError>((event, records))
        })
        .await
    }

    pub async fn load_range<T: EntityRecord>(
        &self,
        entity: &str,
        range: Range,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.perform(entity, Operation::LoadRange, |d, h| async move {
            let result = h.load_range(d.name(), range, criteria).await?;
            let keyed = decode_all::<T>(&d, Operation::LoadRange, result.records)?;
            let records = keyed.iter().map(|k| k.record.clone()).collect();
            let event = EntityEvent::LoadedRange {
                records: keyed,
                range,
                total: result.total,
            };
            Ok::<_, RuntimeError>((event, records))
        })
        .await
    }

    /// Load only when the staleness policy says the stored data falls short.
    pub async fn load_if_necessary<T: EntityRecord>(
        &self,
        entity: &str,
        request: LoadRequest,
        max_age: Option<Duration>,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        let reason = match self.decide(entity, &request, max_age)? {
            Decision::Skip(reason) => return Ok(Outcome::Skipped(reason)),
            Decision::Load(reason) => reason,
        };
        debug!(entity, request = request.name(), reason = %reason, "stored data insufficient, loading");
        match request {
            LoadRequest::All => self.load_all(entity, criteria).await,
            LoadRequest::Many => self.load_many(entity, criteria).await,
            LoadRequest::One(id) => Ok(self.load(entity, id, criteria).await?.map(|r| vec![r])),
            LoadRequest::Page(page) => self.load_page(entity, page, criteria).await,
            LoadRequest::Range(range) => self.load_range(entity, range, criteria).await,
        }
    }

    // ---- Saves ----

    /// Send one record through the backend call matching `kind`.
    pub async fn save<T: EntityRecord>(
        &self,
        entity: &str,
        kind: SaveKind,
        record: &T,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<T>> {
        let operation = kind.operation(false);
        self.perform(entity, operation, |d, h| async move {
            let wire = encode(&d, record)?;
            let name = d.name();
            let returned = match kind {
                SaveKind::Create => h.create(name, wire, criteria).await?,
                SaveKind::Update => h.update(name, wire, criteria).await?,
                SaveKind::Upsert => h.upsert(name, wire, criteria).await?,
                SaveKind::Replace => h.replace(name, wire, criteria).await?,
            };
            let keyed = decode::<T>(&d, operation, returned)?;
            let record = keyed.record.clone();
            Ok::<_, RuntimeError>((EntityEvent::saved_one(kind, keyed), record))
        })
        .await
    }

    /// Send a batch through the `*_many` backend call matching `kind`.
    pub async fn save_many<T: EntityRecord>(
        &self,
        entity: &str,
        kind: SaveKind,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        let operation = kind.operation(true);
        self.perform(entity, operation, |d, h| async move {
            let wire = encode_all(&d, records)?;
            let name = d.name();
            let returned = match kind {
                SaveKind::Create => h.create_many(name, wire, criteria).await?,
                SaveKind::Update => h.update_many(name, wire, criteria).await?,
                SaveKind::Upsert => h.upsert_many(name, wire, criteria).await?,
                SaveKind::Replace => h.replace_many(name, wire, criteria).await?,
            };
            let keyed = decode_all::<T>(&d, operation, returned)?;
            let saved = keyed.iter().map(|k| k.record.clone()).collect();
            Ok::<_, RuntimeError>((EntityEvent::Saved { kind, records: keyed }, saved))
        })
        .await
    }

    pub async fn create<T: EntityRecord>(&self, entity: &str, record: &T, criteria: &Criteria) -> RuntimeResult<Outcome<T>> {
        self.save(entity, SaveKind::Create, record, criteria).await
    }

    pub async fn update<T: EntityRecord>(&self, entity: &str, record: &T, criteria: &Criteria) -> RuntimeResult<Outcome<T>> {
        self.save(entity, SaveKind::Update, record, criteria).await
    }

    pub async fn upsert<T: EntityRecord>(&self, entity: &str, record: &T, criteria: &Criteria) -> RuntimeResult<Outcome<T>> {
        self.save(entity, SaveKind::Upsert, record, criteria).await
    }

    pub async fn replace<T: EntityRecord>(&self, entity: &str, record: &T, criteria: &Criteria) -> RuntimeResult<Outcome<T>> {
        self.save(entity, SaveKind::Replace, record, criteria).await
    }

    pub async fn create_many<T: EntityRecord>(
        &self,
        entity: &str,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.save_many(entity, SaveKind::Create, records, criteria).await
    }

    pub async fn update_many<T: EntityRecord>(
        &self,
        entity: &str,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.save_many(entity, SaveKind::Update, records, criteria).await
    }

    pub async fn upsert_many<T: EntityRecord>(
        &self,
        entity: &str,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.save_many(entity, SaveKind::Upsert, records, criteria).await
    }

    pub async fn replace_many<T: EntityRecord>(
        &self,
        entity: &str,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<T>>> {
        self.save_many(entity, SaveKind::Replace, records, criteria).await
    }

    // ---- Deletes ----

    /// Delete by record. The record is keyed before the backend sees it.
    pub async fn delete<T: EntityRecord>(&self, entity: &str, record: &T, criteria: &Criteria) -> RuntimeResult<Outcome<Identity>> {
        self.perform::<T, _, _, _>(entity, Operation::Delete, |d, h| async move {
            let id = identify(&d, record)?;
            h.delete(d.name(), encode(&d, record)?, criteria).await?;
            Ok::<_, RuntimeError>((EntityEvent::deleted_one(id.clone()), id))
        })
        .await
    }

    pub async fn delete_many<T: EntityRecord>(
        &self,
        entity: &str,
        records: &[T],
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<Identity>>> {
        self.perform::<T, _, _, _>(entity, Operation::DeleteMany, |d, h| async move {
            let ids = records
                .iter()
                .map(|r| identify(&d, r))
                .collect::<RuntimeResult<Vec<_>>>()?;
            h.delete_many(d.name(), encode_all(&d, records)?, criteria).await?;
            Ok::<_, RuntimeError>((EntityEvent::Deleted { ids: ids.clone() }, ids))
        })
        .await
    }

    pub async fn delete_by_key<T: EntityRecord>(
        &self,
        entity: &str,
        id: impl Into<Identity>,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Identity>> {
        let id = id.into();
        self.perform::<T, _, _, _>(entity, Operation::DeleteByKey, |d, h| async move {
            h.delete_by_key(d.name(), &id, criteria).await?;
            Ok::<_, RuntimeError>((EntityEvent::deleted_one(id.clone()), id))
        })
        .await
    }

    pub async fn delete_many_by_keys<T: EntityRecord>(
        &self,
        entity: &str,
        ids: Vec<Identity>,
        criteria: &Criteria,
    ) -> RuntimeResult<Outcome<Vec<Identity>>> {
        self.perform::<T, _, _, _>(entity, Operation::DeleteManyByKeys, |d, h| async move {
            h.delete_many_by_keys(d.name(), &ids, criteria).await?;
            Ok::<_, RuntimeError>((EntityEvent::Deleted { ids: ids.clone() }, ids))
        })
        .await
    }

    // ---- Internals ----

    async fn perform<T, R, F, Fut>(&self, entity: &str, operation: Operation, work: F) -> RuntimeResult<Outcome<R>>
    where
        T: EntityRecord,
        F: FnOnce(Arc<EntityDescriptor>, Arc<dyn EntityHandler>) -> Fut,
        Fut: Future<Output = RuntimeResult<(EntityEvent<T>, R)>>,
    {
        let descriptor = self.registry.resolve(entity)?;
        let correlation = CorrelationId::new();
        let emit = |event: EntityEvent<T>| {
            self.apply(
                &descriptor,
                &Envelope::new(descriptor.name(), event).with_correlation(correlation),
            )
        };

        emit(EntityEvent::Requested(operation))?;
        if descriptor.is_excluded(operation) {
            debug!(
                entity,
                %operation,
                correlation = %correlation.short(),
                "operation excluded for this type, backend call skipped"
            );
            return Ok(Outcome::Excluded);
        }

        let result = match self.handler(&descriptor) {
            Ok(handler) => work(Arc::clone(&descriptor), handler).await,
            Err(e) => Err(e),
        };

        match result {
            Ok((event, value)) => {
                emit(event)?;
                Ok(Outcome::Completed(value))
            }
            Err(e) => {
                if e.is_key_error() {
                    error!(
                        entity,
                        %operation,
                        correlation = %correlation.short(),
                        error = %e,
                        "record could not be keyed, dropping success event"
                    );
                } else {
                    warn!(
                        entity,
                        %operation,
                        correlation = %correlation.short(),
                        error = %e,
                        "entity operation failed"
                    );
                }
                emit(EntityEvent::Failed {
                    operation,
                    reason: e.to_string(),
                })?;
                Err(e)
            }
        }
    }

    fn handler(&self, descriptor: &EntityDescriptor) -> RuntimeResult<Arc<dyn EntityHandler>> {
        let scoped = descriptor
            .feature()
            .and_then(|feature| self.feature_sources.get(feature));
        let handler = match scoped {
            Some(inner) => self.chain.nested(Arc::clone(inner)).resolve(descriptor.name())?,
            None => self.chain.resolve(descriptor.name())?,
        };
        Ok(handler)
    }

    fn apply<T: EntityRecord>(&self, descriptor: &EntityDescriptor, envelope: &Envelope<T>) -> RuntimeResult<()> {
        debug!(
            entity = %envelope.entity,
            event = envelope.event.name(),
            correlation = %envelope.correlation.short(),
            "dispatching entity event"
        );
        self.state.apply(
            descriptor.name(),
            descriptor.feature(),
            &envelope.event,
            self.clock.now(),
        )
    }
}

impl fmt::Debug for EntityRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRuntime")
            .field("entities", &self.registry.names())
            .field("chain", &self.chain)
            .field("features", &self.feature_sources.keys().collect::<Vec<_>>())
            .field("state", &self.state)
            .finish()
    }
}
