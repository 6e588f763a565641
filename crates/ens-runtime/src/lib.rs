//! In-process runtime for the entity normalized store.
//!
//! Owns the application state container (root and feature partitions),
//! the entity registry, the handler resolution chain and the staleness
//! policy, and drives every entity operation through them.

mod codec;
pub mod config;
pub mod error;
pub mod outcome;
pub mod runtime;
pub mod state;

pub use config::{EntityConfig, RuntimeConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use outcome::Outcome;
pub use runtime::{EntityRecord, EntityRuntime, RuntimeBuilder};
pub use state::AppState;

pub use ens_freshness::{Decision, LoadRequest, Reason};
pub use ens_meta::{Comparer, EntityDescriptor, Transformer};
pub use ens_resolve::{Criteria, EntityHandler, FnSource, LookupSource, ScopedRegistry};
pub use ens_store::{EntityEvent, Envelope, NormalizedStore};
pub use ens_types::{Identity, Operation, Page, Range, SaveKind, Timestamp};
