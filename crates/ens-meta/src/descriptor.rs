use std::collections::BTreeSet;
use std::time::Duration;

use ens_types::Operation;

use crate::compare::Comparer;
use crate::error::{MetaError, MetaResult};
use crate::transform::{TransformChain, Transformer};

/// Static metadata for one record type.
///
/// Built once with [`EntityDescriptor::builder`] and registered at startup.
/// Descriptors are immutable after construction.
#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    name: String,
    plural_name: Option<String>,
    resource_name: Option<String>,
    identity_fields: Vec<String>,
    transformers: TransformChain,
    comparers: Vec<Comparer>,
    default_comparer: Option<String>,
    stale_window: Option<Duration>,
    excluded_operations: BTreeSet<Operation>,
    feature: Option<String>,
}

impl EntityDescriptor {
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(name)
    }

    /// Unique type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural_name(&self) -> Option<&str> {
        self.plural_name.as_deref()
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    /// Identity fields in key order.
    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    pub fn is_composite(&self) -> bool {
        self.identity_fields.len() > 1
    }

    pub fn transformers(&self) -> &TransformChain {
        &self.transformers
    }

    pub fn comparers(&self) -> &[Comparer] {
        &self.comparers
    }

    /// The named comparer, or the default one when `name` is `None`.
    ///
    /// `None` means no ordering is configured and callers should keep
    /// insertion order.
    pub fn comparer(&self, name: Option<&str>) -> Option<&Comparer> {
        let wanted = name.or(self.default_comparer.as_deref())?;
        self.comparers.iter().find(|c| c.name() == wanted)
    }

    /// Maximum age before loaded data counts as stale. `None` never expires.
    pub fn stale_window(&self) -> Option<Duration> {
        self.stale_window
    }

    pub fn excluded_operations(&self) -> &BTreeSet<Operation> {
        &self.excluded_operations
    }

    /// Whether the default backend call is suppressed for `op`.
    pub fn is_excluded(&self, op: Operation) -> bool {
        self.excluded_operations.contains(&op)
    }

    /// Feature partition the type's store lives under, if any.
    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    /// Compares everything that can be compared: all data fields plus the
    /// names of transformers and comparers.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.name == other.name
            && self.plural_name == other.plural_name
            && self.resource_name == other.resource_name
            && self.identity_fields == other.identity_fields
            && self.transformers.names() == other.transformers.names()
            && self.comparer_names() == other.comparer_names()
            && self.default_comparer == other.default_comparer
            && self.stale_window == other.stale_window
            && self.excluded_operations == other.excluded_operations
            && self.feature == other.feature
    }

    fn comparer_names(&self) -> Vec<&str> {
        self.comparers.iter().map(Comparer::name).collect()
    }
}

/// Builder for [`EntityDescriptor`].
#[derive(Debug)]
pub struct DescriptorBuilder {
    descriptor: EntityDescriptor,
}

impl DescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            descriptor: EntityDescriptor {
                name: name.into(),
                plural_name: None,
                resource_name: None,
                identity_fields: Vec::new(),
                transformers: TransformChain::default(),
                comparers: Vec::new(),
                default_comparer: None,
                stale_window: None,
                excluded_operations: BTreeSet::new(),
                feature: None,
            },
        }
    }

    /// Append an identity field. Call order is key order.
    pub fn identity(mut self, field: impl Into<String>) -> Self {
        self.descriptor.identity_fields.push(field.into());
        self
    }

    pub fn identities<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .identity_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.descriptor.plural_name = Some(plural.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.descriptor.resource_name = Some(resource.into());
        self
    }

    pub fn transformer(mut self, transformer: Transformer) -> Self {
        self.descriptor.transformers.push(transformer);
        self
    }

    pub fn comparer(mut self, comparer: Comparer) -> Self {
        self.descriptor.comparers.push(comparer);
        self
    }

    /// Add a comparer and flag it as the default.
    pub fn default_comparer(mut self, comparer: Comparer) -> Self {
        self.descriptor.default_comparer = Some(comparer.name().to_owned());
        self.descriptor.comparers.push(comparer);
        self
    }

    pub fn stale_after(mut self, window: Duration) -> Self {
        self.descriptor.stale_window = Some(window);
        self
    }

    pub fn stale_window(mut self, window: Option<Duration>) -> Self {
        self.descriptor.stale_window = window;
        self
    }

    pub fn exclude(mut self, op: Operation) -> Self {
        self.descriptor.excluded_operations.insert(op);
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.descriptor.feature = Some(feature.into());
        self
    }

    /// Validate and finish.
    ///
    /// A descriptor with no identity fields is accepted here; key
    /// extraction reports it as `NoIdentityFields` at first use.
    pub fn build(self) -> MetaResult<EntityDescriptor> {
        let d = self.descriptor;
        let invalid = |reason: &str| MetaError::InvalidDescriptor {
            entity: d.name.clone(),
            reason: reason.to_owned(),
        };

        if d.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        let unique_fields: BTreeSet<&String> = d.identity_fields.iter().collect();
        if unique_fields.len() != d.identity_fields.len() {
            return Err(invalid("duplicate identity field"));
        }
        let comparer_names = d.comparer_names();
        let unique_comparers: BTreeSet<&&str> = comparer_names.iter().collect();
        if unique_comparers.len() != comparer_names.len() {
            return Err(invalid("duplicate comparer name"));
        }
        if d.feature.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(invalid("feature name must not be empty"));
        }
        Ok(d)
    }
}
