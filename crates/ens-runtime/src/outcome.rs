use ens_freshness::Reason;

/// What a runtime operation ended up doing.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<R> {
    /// The backend call ran and its result was dispatched.
    Completed(R),
    /// The type excludes this operation. The request event was dispatched and
    /// nothing else; completing it is up to the caller.
    Excluded,
    /// A load-if-necessary found the stored data good enough.
    Skipped(Reason),
}

impl<R> Outcome<R> {
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(r) => Some(r),
            Self::Excluded | Self::Skipped(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Outcome<U> {
        match self {
            Self::Completed(r) => Outcome::Completed(f(r)),
            Self::Excluded => Outcome::Excluded,
            Self::Skipped(reason) => Outcome::Skipped(reason),
        }
    }
}
