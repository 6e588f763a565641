use std::time::Duration;

use ens_freshness::FreshnessConfig;
use ens_meta::{EntityDescriptor, MetaResult};
use ens_types::Operation;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeResult;

/// Top-level runtime settings, usually read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub freshness: FreshnessConfig,
    #[serde(rename = "entity")]
    pub entities: Vec<EntityConfig>,
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> RuntimeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build a descriptor for every declared entity type.
    pub fn descriptors(&self) -> MetaResult<Vec<EntityDescriptor>> {
        self.entities.iter().map(EntityConfig::descriptor).collect()
    }
}

/// Declarative metadata for one entity type.
///
/// Transformers and comparers are code, so types that need them are
/// registered through [`EntityDescriptor::builder`] instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub name: String,
    pub identity: Vec<String>,
    pub plural: Option<String>,
    pub resource: Option<String>,
    pub stale_window_secs: Option<u64>,
    pub excluded: Vec<Operation>,
    pub feature: Option<String>,
}

impl EntityConfig {
    pub fn descriptor(&self) -> MetaResult<EntityDescriptor> {
        let mut builder = EntityDescriptor::builder(self.name.clone())
            .identities(self.identity.iter().cloned())
            .stale_window(self.stale_window_secs.map(Duration::from_secs));
        if let Some(plural) = &self.plural {
            builder = builder.plural(plural.clone());
        }
        if let Some(resource) = &self.resource {
            builder = builder.resource(resource.clone());
        }
        if let Some(feature) = &self.feature {
            builder = builder.feature(feature.clone());
        }
        for op in &self.excluded {
            builder = builder.exclude(*op);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[freshness]
warn_interval_secs = 30
default_max_age_secs = 900

[[entity]]
name = "customer"
identity = ["id"]
plural = "customers"
stale_window_secs = 600

[[entity]]
name = "order_line"
identity = ["order_id", "line_no"]
feature = "sales"
excluded = ["delete_many", "load_range"]
"#;

    #[test]
    fn default_config() {
        let c = RuntimeConfig::default();
        assert_eq!(c.freshness.warn_interval_secs, 15);
        assert!(c.entities.is_empty());
    }

    #[test]
    fn parses_toml() {
        let c = RuntimeConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(c.freshness.warn_interval_secs, 30);
        assert_eq!(c.freshness.default_max_age_secs, Some(900));
        assert_eq!(c.entities.len(), 2);
        assert_eq!(c.entities[1].excluded, vec![Operation::DeleteMany, Operation::LoadRange]);
    }

    #[test]
    fn builds_descriptors() {
        let descriptors = RuntimeConfig::from_toml_str(SAMPLE)
            .unwrap()
            .descriptors()
            .unwrap();
        let customer = &descriptors[0];
        assert_eq!(customer.plural_name(), Some("customers"));
        assert_eq!(customer.stale_window(), Some(Duration::from_secs(600)));
        assert_eq!(customer.feature(), None);

        let line = &descriptors[1];
        assert!(line.is_composite());
        assert_eq!(line.feature(), Some("sales"));
        assert!(line.is_excluded(Operation::DeleteMany));
        assert!(!line.is_excluded(Operation::Delete));
    }

    #[test]
    fn unknown_operation_is_a_config_error() {
        let err = RuntimeConfig::from_toml_str("[[entity]]\nname = \"x\"\nexcluded = [\"purge\"]\n")
            .unwrap_err();
        assert!(matches!(err, crate::RuntimeError::Config(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let config = EntityConfig::default();
        assert!(config.descriptor().is_err());
    }
}
