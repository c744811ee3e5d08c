//! Search phrase → harvested posts.
//!
//! Pages through search results until the candidate limit is reached,
//! reading each post's comments as it goes. Any failure ends
//! collection early; what was gathered so far is kept.

use crate::config::RedditConfig;
use crate::models::{Harvest, Post, SearchPhrase};
use crate::reddit::{DiscussionSource, SearchRequest, MAX_PAGE_SIZE};
use tracing::{debug, info, warn};

/// Where and how much to search.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    pub channels: Vec<String>,
    pub sort: String,
    pub time_filter: String,
    /// Maximum number of candidate posts requested from search.
    pub limit: usize,
    pub comments_per_post: usize,
}

impl From<&RedditConfig> for RetrievalOptions {
    fn from(config: &RedditConfig) -> Self {
        Self {
            channels: config.subreddits.clone(),
            sort: config.sort.clone(),
            time_filter: config.time_filter.clone(),
            limit: config.limit,
            comments_per_post: config.comments_per_post,
        }
    }
}

impl RetrievalOptions {
    fn search_request(&self, phrase: &SearchPhrase) -> SearchRequest {
        SearchRequest {
            query: phrase.as_str().to_string(),
            channels: self.channels.clone(),
            sort: self.sort.clone(),
            time_filter: self.time_filter.clone(),
        }
    }
}

/// Collect posts for `phrase`.
pub async fn retrieve(
    source: &dyn DiscussionSource,
    phrase: &SearchPhrase,
    options: &RetrievalOptions,
) -> Harvest {
    let mut harvest = Harvest::default();

    if options.limit == 0 {
        debug!("Fetch limit is 0, skipping search");
        return harvest;
    }

    let request = options.search_request(phrase);
    let mut after: Option<String> = None;

    info!(
        "Searching r/{} for '{}' (up to {} posts)",
        request.channel_path(),
        phrase,
        options.limit
    );

    loop {
        let remaining = options.limit - harvest.candidates_seen;
        if remaining == 0 {
            break;
        }

        let page_size = remaining.min(MAX_PAGE_SIZE);
        let page = match source.search(&request, after.as_deref(), page_size).await {
            Ok(page) => page,
            Err(e) => {
                stop_early(&mut harvest, format!("{:#}", e));
                break;
            }
        };

        debug!(
            "Search page returned {} posts (cursor: {:?})",
            page.posts.len(),
            page.after
        );

        if page.posts.is_empty() {
            break;
        }

        for summary in page.posts.into_iter().take(remaining) {
            harvest.candidates_seen += 1;

            match source.comments(&summary).await {
                Ok(mut comments) => {
                    comments.truncate(options.comments_per_post);
                    harvest.posts.push(Post::from_summary(summary, comments));
                }
                Err(e) => {
                    stop_early(&mut harvest, format!("{:#}", e));
                    return harvest;
                }
            }
        }

        match page.after {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    info!("Collected {} posts", harvest.posts.len());
    harvest
}

fn stop_early(harvest: &mut Harvest, reason: String) {
    warn!(
        "Retrieval stopped after {} posts: {}",
        harvest.posts.len(),
        reason
    );
    harvest.failure = Some(reason);
}
