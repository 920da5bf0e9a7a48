//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Maximum number of items a single page may return.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Request parameters for paginated queries.
///
/// Callers supply `limit` and `offset`; `clamped` normalizes out-of-range
/// values instead of rejecting the request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Returns a copy with the limit forced into `1..=MAX_PAGE_LIMIT`.
    ///
    /// A zero limit falls back to the default page size.
    #[must_use]
    pub fn clamped(self) -> Self {
        let limit = if self.limit == 0 {
            default_limit()
        } else {
            self.limit.min(MAX_PAGE_LIMIT)
        };

        Self {
            limit,
            offset: self.offset,
        }
    }
}
