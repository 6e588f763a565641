use std::fmt;
use std::sync::Arc;

use serde_json::Value;

type ValueMap = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A bidirectional mapping between wire values and stored values.
///
/// `inbound` runs on data coming back from a backend, `outbound` on data
/// about to be sent to one. The two halves should be inverses, but nothing
/// enforces it.
#[derive(Clone)]
pub struct Transformer {
    name: String,
    inbound: ValueMap,
    outbound: ValueMap,
}

impl Transformer {
    pub fn new<I, O>(name: impl Into<String>, inbound: I, outbound: O) -> Self
    where
        I: Fn(Value) -> Value + Send + Sync + 'static,
        O: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inbound: Arc::new(inbound),
            outbound: Arc::new(outbound),
        }
    }

    /// A transformer that only maps inbound data.
    pub fn inbound_only<I>(name: impl Into<String>, inbound: I) -> Self
    where
        I: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(name, inbound, |v| v)
    }

    /// A transformer that only maps outbound data.
    pub fn outbound_only<O>(name: impl Into<String>, outbound: O) -> Self
    where
        O: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(name, |v| v, outbound)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply_inbound(&self, value: Value) -> Value {
        (self.inbound)(value)
    }

    pub fn apply_outbound(&self, value: Value) -> Value {
        (self.outbound)(value)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An ordered list of transformers.
///
/// Inbound data flows through the list left-to-right; outbound data flows
/// right-to-left, so the last transformer applied on the way in is the
/// first one undone on the way out.
#[derive(Clone, Debug, Default)]
pub struct TransformChain {
    transformers: Vec<Transformer>,
}

impl TransformChain {
    pub fn new(transformers: Vec<Transformer>) -> Self {
        Self { transformers }
    }

    pub fn push(&mut self, transformer: Transformer) {
        self.transformers.push(transformer);
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Names in chain order.
    pub fn names(&self) -> Vec<&str> {
        self.transformers.iter().map(Transformer::name).collect()
    }

    /// Map a value received from a backend.
    pub fn inbound(&self, value: Value) -> Value {
        self.transformers
            .iter()
            .fold(value, |acc, t| t.apply_inbound(acc))
    }

    /// Map a value about to be sent to a backend.
    pub fn outbound(&self, value: Value) -> Value {
        self.transformers
            .iter()
            .rev()
            .fold(value, |acc, t| t.apply_outbound(acc))
    }
}
