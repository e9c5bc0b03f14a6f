//! Offset pagination for message history.

use serde::Serialize;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the requested one is missing or out of range.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// A validated page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Clamp raw query values with the default limits.
    ///
    /// Pages below 1 become 1. Page sizes outside `1..=100` fall back to 50
    /// rather than being clamped to the nearest bound.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self::with_limits(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn with_limits(
        page: Option<i64>,
        page_size: Option<i64>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 && s <= i64::from(max_size) => s as u32,
            _ => default_size,
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}
