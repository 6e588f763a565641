use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A page request: 1-based page number and page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Page {
    pub fn new(page: u32, size: u32) -> Result<Self, TypeError> {
        if page == 0 {
            return Err(TypeError::InvalidPage("page numbers start at 1".into()));
        }
        if size == 0 {
            return Err(TypeError::InvalidPage("page size must be positive".into()));
        }
        Ok(Self { page, size })
    }

    /// Zero-based offset of the first record on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

/// The page a store currently holds, recorded after a page load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: Page,
    pub total_count: u64,
}

impl PageInfo {
    /// Number of pages needed to hold `total_count` records.
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.current_page.size))
    }
}

/// A range request.
///
/// `Span` is an inclusive start/end pair; `Skip` is offset plus count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    Span { start: i64, end: i64 },
    Skip { skip: u64, take: u64 },
}

impl Range {
    pub fn span(start: i64, end: i64) -> Result<Self, TypeError> {
        if start > end {
            return Err(TypeError::InvalidRange { start, end });
        }
        Ok(Self::Span { start, end })
    }

    pub const fn skip(skip: u64, take: u64) -> Self {
        Self::Skip { skip, take }
    }

    /// Returns `true` if every position of `other` lies inside `self`.
    ///
    /// Ranges of different shapes never cover each other.
    pub fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Span { start, end }, Self::Span { start: s2, end: e2 }) => {
                start <= s2 && end >= e2
            }
            (Self::Skip { skip, take }, Self::Skip { skip: k2, take: t2 }) => {
                skip <= k2 && skip.saturating_add(*take) >= k2.saturating_add(*t2)
            }
            _ => false,
        }
    }
}

/// The range a store currently holds, recorded after a range load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInfo {
    pub current_range: Range,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_validation() {
        assert!(Page::new(0, 10).is_err());
        assert!(Page::new(1, 0).is_err());
        assert_eq!(Page::new(3, 25).unwrap().offset(), 50);
    }

    #[test]
    fn page_count_rounds_up() {
        let info = PageInfo {
            current_page: Page::new(1, 10).unwrap(),
            total_count: 21,
        };
        assert_eq!(info.page_count(), 3);
    }

    #[test]
    fn span_rejects_inverted_bounds() {
        assert_eq!(
            Range::span(5, 1),
            Err(TypeError::InvalidRange { start: 5, end: 1 })
        );
    }

    #[test]
    fn covers_same_shape_only() {
        let wide = Range::span(1, 10).unwrap();
        assert!(wide.covers(&Range::span(2, 5).unwrap()));
        assert!(!wide.covers(&Range::span(5, 11).unwrap()));
        assert!(Range::skip(0, 20).covers(&Range::skip(10, 10)));
        assert!(!Range::skip(0, 20).covers(&Range::skip(10, 11)));
        assert!(!wide.covers(&Range::skip(1, 2)));
    }
}
