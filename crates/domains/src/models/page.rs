use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset/limit window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPage {
    #[error("skip must not be negative")]
    NegativeSkip,
    #[error("limit must be at least 1")]
    NonPositiveLimit,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 100;

    /// Builds a window, capping `limit` at [`Page::MAX_LIMIT`].
    pub fn new(skip: i64, limit: i64) -> Result<Self, InvalidPage> {
        if skip < 0 {
            return Err(InvalidPage::NegativeSkip);
        }
        if limit < 1 {
            return Err(InvalidPage::NonPositiveLimit);
        }
        Ok(Self { skip, limit: limit.min(Self::MAX_LIMIT) })
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: Self::DEFAULT_LIMIT }
    }
}
