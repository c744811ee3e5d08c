//! Discussion retrieval.
//!
//! [`DiscussionSource`] is the seam between the retriever and the
//! Reddit API; [`RedditClient`] is the production implementation.

pub mod client;
pub mod listing;

pub use client::{RedditClient, MAX_PAGE_SIZE};

use crate::models::{Comment, PostSummary};
use anyhow::Result;
use async_trait::async_trait;

/// Parameters of one search across a channel union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Channels searched together.
    pub channels: Vec<String>,
    /// Result ordering, e.g. `relevance`.
    pub sort: String,
    /// Trailing time window, e.g. `month`.
    pub time_filter: String,
}

impl SearchRequest {
    /// The channel union in the `a+b+c` form the API expects.
    pub fn channel_path(&self) -> String {
        self.channels
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub posts: Vec<PostSummary>,
    /// Cursor for the next page; `None` when there are no more results.
    pub after: Option<String>,
}

/// A forum that can be searched and whose threads can be read.
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    /// Fetch one page of at most `page_size` results, continuing from `after`.
    async fn search(
        &self,
        request: &SearchRequest,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<SearchPage>;

    /// Read the comments of a post, flattened in service order with
    /// collapsed placeholders dropped.
    async fn comments(&self, post: &PostSummary) -> Result<Vec<Comment>>;
}
