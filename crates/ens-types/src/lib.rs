//! Foundation types for the entity normalized store (ENS).
//!
//! Every other ENS crate depends on `ens-types`. Nothing in here knows about
//! descriptors, stores or handlers; these are the words the rest of the
//! workspace is written in.
//!
//! # Key Types
//!
//! - [`Identity`]: the key a record is stored under (text, integer, or composite)
//! - [`Scalar`]: a single field value exposed by a record
//! - [`Keyed`]: a record paired with its extracted identity
//! - [`Timestamp`] / [`Clock`]: millisecond wall-clock stamps for tracking
//! - [`Operation`] / [`Activity`]: the closed set of backend operations
//! - [`Page`] / [`Range`]: windowed load requests
//! - [`CorrelationId`]: UUID v7 tying an initiating event to its completion

pub mod correlation;
pub mod error;
pub mod identity;
pub mod operation;
pub mod paging;
pub mod temporal;

pub use correlation::CorrelationId;
pub use error::TypeError;
pub use identity::{Identity, Keyed, Scalar};
pub use operation::{Activity, Operation, SaveKind};
pub use paging::{Page, PageInfo, Range, RangeInfo};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
