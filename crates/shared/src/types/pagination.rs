//! Offset pagination for list queries.

use serde::{Deserialize, Serialize};

/// Hard ceiling on a single page.
pub const MAX_LIMIT: u64 = 1000;

/// `skip`/`limit` window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Rows to skip.
    #[serde(default)]
    pub skip: u64,
    /// Rows to return, clamped to [`MAX_LIMIT`].
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    100
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Offset for the query.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.skip
    }

    /// Limit for the query; never zero, never above [`MAX_LIMIT`].
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}
