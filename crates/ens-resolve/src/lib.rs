//! Backend handler resolution.
//!
//! Each entity type is served by an [`EntityHandler`] found through a
//! [`ResolutionChain`]: an ordered list of lookup sources, innermost
//! (feature-scoped) first and global last. The first source that knows the
//! type wins. If none does, resolution fails loudly; there is no default
//! handler.

pub mod chain;
pub mod error;
pub mod handler;
pub mod registry;

pub use chain::{FnSource, LookupSource, ResolutionChain};
pub use error::{HandlerError, HandlerResult, LookupError, ResolveError};
pub use handler::{Criteria, EntityHandler, PageResult, RangeResult};
pub use registry::ScopedRegistry;
