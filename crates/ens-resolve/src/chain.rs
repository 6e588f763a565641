use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{LookupError, ResolveError};
use crate::handler::EntityHandler;

/// One place a handler may be found.
pub trait LookupSource: Send + Sync {
    /// Scope name used in diagnostics.
    fn scope(&self) -> &str;

    fn lookup(&self, entity: &str) -> Result<Arc<dyn EntityHandler>, LookupError>;
}

type LookupFn = dyn Fn(&str) -> Option<Arc<dyn EntityHandler>> + Send + Sync;

/// A lookup source backed by a closure, for handlers produced on demand.
pub struct FnSource {
    scope: String,
    lookup: Box<LookupFn>,
}

impl FnSource {
    pub fn new<F>(scope: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<dyn EntityHandler>> + Send + Sync + 'static,
    {
        Self {
            scope: scope.into(),
            lookup: Box::new(lookup),
        }
    }
}

impl LookupSource for FnSource {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn lookup(&self, entity: &str) -> Result<Arc<dyn EntityHandler>, LookupError> {
        (self.lookup)(entity).ok_or_else(|| LookupError::NotRegistered {
            scope: self.scope.clone(),
            entity: entity.to_owned(),
        })
    }
}

/// Ordered lookup sources, innermost first.
///
/// The first source that yields a handler wins, so a feature scope placed
/// ahead of the root shadows the root's registration for the same type.
#[derive(Clone, Default)]
pub struct ResolutionChain {
    sources: Vec<Arc<dyn LookupSource>>,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outer source.
    pub fn with_source(mut self, source: Arc<dyn LookupSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// A new chain that consults `inner` before every source in this one.
    pub fn nested(&self, inner: Arc<dyn LookupSource>) -> Self {
        let mut sources = Vec::with_capacity(self.sources.len() + 1);
        sources.push(inner);
        sources.extend(self.sources.iter().cloned());
        Self { sources }
    }

    pub fn scopes(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.scope()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Find the handler for `entity`.
    pub fn resolve(&self, entity: &str) -> Result<Arc<dyn EntityHandler>, ResolveError> {
        let mut attempts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.lookup(entity) {
                Ok(handler) => {
                    debug!(entity, scope = source.scope(), "resolved entity handler");
                    return Ok(handler);
                }
                Err(e) => attempts.push(e),
            }
        }

        let failure = ResolveError::ResolutionFailure {
            entity: entity.to_owned(),
            attempts,
        };
        error!(
            entity,
            scopes = ?self.scopes(),
            cause = %failure,
            "no entity handler could be resolved"
        );
        Err(failure)
    }
}

impl fmt::Debug for ResolutionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionChain")
            .field("scopes", &self.scopes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Criteria;
    use crate::registry::ScopedRegistry;
    use crate::HandlerResult;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Tagged(&'static str);

    #[async_trait]
    impl EntityHandler for Tagged {
        async fn load_all(&self, _entity: &str, _criteria: &Criteria) -> HandlerResult<Vec<Value>> {
            Ok(vec![json!({"from": self.0})])
        }
    }

    fn scope(name: &str, entities: &[&str], tag: &'static str) -> Arc<ScopedRegistry> {
        let registry = ScopedRegistry::new(name);
        for entity in entities {
            registry.register(*entity, Arc::new(Tagged(tag)));
        }
        Arc::new(registry)
    }

    async fn origin(chain: &ResolutionChain, entity: &str) -> Value {
        let handler = chain.resolve(entity).unwrap();
        handler.load_all(entity, &Criteria::new()).await.unwrap()[0]["from"].clone()
    }

    #[tokio::test]
    async fn feature_scope_shadows_root() {
        let root = ResolutionChain::new().with_source(scope("root", &["customer", "order"], "root"));
        let feature = root.nested(scope("sales", &["order"], "sales"));

        assert_eq!(origin(&feature, "order").await, json!("sales"));
        assert_eq!(origin(&feature, "customer").await, json!("root"));
        assert_eq!(origin(&root, "order").await, json!("root"));
        assert_eq!(feature.scopes(), vec!["sales", "root"]);
    }

    #[test]
    fn unresolved_type_reports_every_attempt() {
        let chain = ResolutionChain::new()
            .with_source(scope("sales", &[], "sales"))
            .with_source(scope("root", &["customer"], "root"));
        let err = chain.resolve("invoice").err().unwrap();
        let ResolveError::ResolutionFailure { entity, attempts } = err;
        assert_eq!(entity, "invoice");
        assert_eq!(attempts.len(), 2);
        assert!(matches!(&attempts[0], LookupError::NotRegistered { scope, .. } if scope == "sales"));
    }

    #[test]
    fn empty_chain_has_no_fallback() {
        let err = ResolutionChain::new().resolve("customer").err().unwrap();
        assert!(err.to_string().starts_with("no handler for customer after 0 lookup(s)"));
    }

    #[tokio::test]
    async fn closure_sources_take_part() {
        let dynamic = FnSource::new("dynamic", |entity| {
            (entity == "report").then(|| Arc::new(Tagged("dynamic")) as Arc<dyn EntityHandler>)
        });
        let chain = ResolutionChain::new()
            .with_source(Arc::new(dynamic))
            .with_source(scope("root", &["report"], "root"));
        assert_eq!(origin(&chain, "report").await, json!("dynamic"));
        assert!(chain.resolve("missing").is_err());
    }
}
