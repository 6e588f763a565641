//! Entity metadata for the entity normalized store.
//!
//! A record type is described once by an [`EntityDescriptor`] and registered
//! in an [`EntityRegistry`] at startup. Everything downstream (key
//! extraction, reduction, staleness checks, handler resolution) looks the
//! descriptor up by type name instead of relying on anything attached to the
//! record type itself.
//!
//! # Pieces
//!
//! - [`Record`]: how the engine reads fields off a record
//! - [`EntityDescriptor`] / [`DescriptorBuilder`]: per-type metadata
//! - [`Transformer`] / [`TransformChain`]: bidirectional wire value mapping
//! - [`Comparer`]: named orderings for sorted views
//! - [`EntityRegistry`]: explicit registry keyed by type name
//! - [`extract_identity`] / [`keyed`]: the key extractor

pub mod compare;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod record;
pub mod registry;
pub mod transform;

pub use compare::Comparer;
pub use descriptor::{DescriptorBuilder, EntityDescriptor};
pub use error::{KeyError, MetaError, MetaResult};
pub use key::{extract_identity, keyed, keyed_all};
pub use record::Record;
pub use registry::EntityRegistry;
pub use transform::{TransformChain, Transformer};
