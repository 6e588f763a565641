use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use ens_meta::EntityDescriptor;
use ens_types::Timestamp;
use tracing::{debug, warn};

use crate::config::FreshnessConfig;
use crate::decision::{Decision, LoadRequest, Reason};
use crate::snapshot::{StateSource, TrackedSnapshot};
use crate::throttle::WarnThrottle;

/// Decide against a snapshot with an already-resolved window.
///
/// `max_age` of `None` means the data never expires once loaded.
pub fn evaluate(
    snapshot: &TrackedSnapshot,
    request: &LoadRequest,
    max_age: Option<Duration>,
    now: Timestamp,
) -> Decision {
    if snapshot.is_empty() {
        return Decision::Load(Reason::NothingLoaded);
    }
    let Some(loaded_at) = snapshot.loaded_at else {
        return Decision::Load(Reason::NeverStamped);
    };

    match request {
        LoadRequest::One(id) if !snapshot.ids.contains(id) => {
            return Decision::Load(Reason::RecordMissing);
        }
        LoadRequest::Page(page) if snapshot.current_page != Some(*page) => {
            return Decision::Load(Reason::PageChanged);
        }
        LoadRequest::Range(range)
            if !snapshot
                .current_range
                .is_some_and(|current| current.covers(range)) =>
        {
            return Decision::Load(Reason::RangeNotCovered);
        }
        _ => {}
    }

    let Some(max_age) = max_age else {
        return Decision::Skip(Reason::NeverExpires);
    };
    let expiry = loaded_at.saturating_add(max_age);
    let age = now.since(loaded_at);
    if now > expiry {
        Decision::Load(Reason::Expired { age, max_age })
    } else {
        Decision::Skip(Reason::Fresh { age, max_age })
    }
}

/// The staleness policy bound to an application state container.
pub struct FreshnessPolicy {
    source: RwLock<Option<Arc<dyn StateSource>>>,
    throttle: WarnThrottle,
    config: FreshnessConfig,
}

impl FreshnessPolicy {
    /// A policy with no state source yet. Every decision skips until
    /// [`Self::set_source`] is called.
    pub fn new(config: FreshnessConfig) -> Self {
        Self {
            source: RwLock::new(None),
            throttle: WarnThrottle::new(config.warn_interval()),
            config,
        }
    }

    pub fn with_source(config: FreshnessConfig, source: Arc<dyn StateSource>) -> Self {
        let policy = Self::new(config);
        policy.set_source(source);
        policy
    }

    pub fn set_source(&self, source: Arc<dyn StateSource>) {
        *self.source.write().unwrap_or_else(PoisonError::into_inner) = Some(source);
    }

    pub fn has_source(&self) -> bool {
        self.source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn config(&self) -> &FreshnessConfig {
        &self.config
    }

    /// Caller window, else the descriptor's, else the configured default.
    pub fn effective_max_age(
        &self,
        descriptor: &EntityDescriptor,
        caller: Option<Duration>,
    ) -> Option<Duration> {
        caller
            .or(descriptor.stale_window())
            .or(self.config.default_max_age())
    }

    /// Decide whether `request` for `descriptor`'s type needs a load.
    pub fn decide(
        &self,
        descriptor: &EntityDescriptor,
        request: &LoadRequest,
        max_age: Option<Duration>,
        now: Timestamp,
    ) -> Decision {
        let entity = descriptor.name();
        let source = self
            .source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(source) = source else {
            if self.throttle.permit() {
                warn!(
                    entity,
                    "no state source configured; cannot decide whether to load, skipping"
                );
            }
            return Decision::Skip(Reason::NoStateSource);
        };

        let Some(snapshot) = source.snapshot(entity, descriptor.feature()) else {
            if self.throttle.permit() {
                warn!(
                    entity,
                    feature = descriptor.feature().unwrap_or("<root>"),
                    "state source has no store for entity; skipping load"
                );
            }
            return Decision::Skip(Reason::NoStoreForType);
        };

        let decision = evaluate(
            &snapshot,
            request,
            self.effective_max_age(descriptor, max_age),
            now,
        );
        debug!(
            entity,
            request = request.name(),
            necessary = decision.is_necessary(),
            reason = %decision.reason(),
            "load-if-necessary decision"
        );
        decision
    }
}

impl fmt::Debug for FreshnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreshnessPolicy")
            .field("has_source", &self.has_source())
            .field("config", &self.config)
            .finish()
    }
}
