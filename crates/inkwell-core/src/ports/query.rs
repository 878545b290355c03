//! Query parameters for listing resources.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Post;

/// Filters on the post list. Every supplied filter narrows the result.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author: Option<Uuid>,
    pub category: Option<Uuid>,
    pub tag: Option<Uuid>,
    pub search: Option<String>,
}

impl PostFilter {
    /// The trimmed search term, `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Evaluate the filter against a post already in memory.
    pub fn matches(&self, post: &Post) -> bool {
        if self.author.is_some_and(|author| post.author_id != author) {
            return false;
        }
        if self
            .category
            .is_some_and(|category| post.category_id != Some(category))
        {
            return false;
        }
        if self.tag.is_some_and(|tag| !post.has_tag(tag)) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                post.title.to_lowercase().contains(&term) || post.body.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// Limit/offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;
    /// Largest offset a SQL `OFFSET` (a signed 64-bit integer) accepts.
    pub const MAX_OFFSET: u64 = i64::MAX as u64;

    /// Build a page request, clamping the limit to `1..=MAX_LIMIT` and the
    /// offset to `MAX_OFFSET`.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).min(Self::MAX_OFFSET),
        }
    }

    /// Apply this page to an already-ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            limit: request.limit,
            offset: request.offset,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
