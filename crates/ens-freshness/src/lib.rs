//! "Load if necessary": deciding whether a fetch should be issued at all.
//!
//! The decision reads a [`TrackedSnapshot`] of the type's store through a
//! configured [`StateSource`] and compares the last load time against the
//! effective staleness window.
//!
//! # Decision order
//!
//! 1. nothing loaded yet → load
//! 2. never stamped `loaded_at` → load
//! 3. request-specific gaps (missing record, other page, uncovered range) → load
//! 4. no effective window → skip; past `loaded_at + window` → load; else skip
//!
//! Without a state source, or without a store for the type, the policy
//! warns (throttled) and skips.

pub mod config;
pub mod decision;
pub mod policy;
pub mod snapshot;
pub mod throttle;

pub use config::FreshnessConfig;
pub use decision::{Decision, LoadRequest, Reason};
pub use policy::{evaluate, FreshnessPolicy};
pub use snapshot::{StateSource, TrackedSnapshot};
pub use throttle::WarnThrottle;
