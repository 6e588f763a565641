use std::fmt;
use std::time::Duration;

use ens_types::{Identity, Page, Range};

/// What the caller is about to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    All,
    Many,
    One(Identity),
    Page(Page),
    Range(Range),
}

impl LoadRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Many => "many",
            Self::One(_) => "one",
            Self::Page(_) => "page",
            Self::Range(_) => "range",
        }
    }
}

/// Why a decision came out the way it did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    NothingLoaded,
    NeverStamped,
    RecordMissing,
    PageChanged,
    RangeNotCovered,
    Expired { age: Duration, max_age: Duration },
    Fresh { age: Duration, max_age: Duration },
    NeverExpires,
    NoStateSource,
    NoStoreForType,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingLoaded => f.write_str("nothing loaded"),
            Self::NeverStamped => f.write_str("no load timestamp"),
            Self::RecordMissing => f.write_str("requested record not loaded"),
            Self::PageChanged => f.write_str("different page requested"),
            Self::RangeNotCovered => f.write_str("requested range not covered"),
            Self::Expired { age, max_age } => {
                write!(f, "expired ({}s old, max {}s)", age.as_secs(), max_age.as_secs())
            }
            Self::Fresh { age, max_age } => {
                write!(f, "fresh ({}s old, max {}s)", age.as_secs(), max_age.as_secs())
            }
            Self::NeverExpires => f.write_str("no staleness window"),
            Self::NoStateSource => f.write_str("no state source configured"),
            Self::NoStoreForType => f.write_str("no store for type"),
        }
    }
}

/// Outcome of a load-if-necessary check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Issue the load.
    Load(Reason),
    /// Suppress it; nothing is emitted downstream.
    Skip(Reason),
}

impl Decision {
    pub fn is_necessary(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    pub fn reason(&self) -> &Reason {
        match self {
            Self::Load(r) | Self::Skip(r) => r,
        }
    }
}
