//! Data models for the research pipeline.
//!
//! This module contains the values that flow between the pipeline
//! stages: the user's topic, the translated search phrase, retrieved
//! posts, the serialized corpus and the final report.

use crate::error::TopicError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the text shown in place of a report when synthesis fails.
pub const ANALYSIS_FAILED_PREFIX: &str = "❌ Analysis failed";

/// The user-supplied subject, in any language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Create a topic from raw user input. Surrounding whitespace is
    /// removed; empty input is rejected.
    pub fn new(raw: &str) -> Result<Self, TopicError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TopicError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// English search phrase derived from a [`Topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchPhrase(String);

impl SearchPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub score: i64,
    pub body: String,
}

/// Summary of a post as returned by a search, before comments are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Service-side identifier used to fetch the comment tree.
    pub id: String,
    pub title: String,
    /// Name of the channel (subreddit) the post was made in.
    pub subreddit: String,
    pub score: i64,
}

/// A retrieved discussion thread with a bounded sample of its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub subreddit: String,
    pub score: i64,
    /// Comments in the order the service returned them.
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn from_summary(summary: PostSummary, comments: Vec<Comment>) -> Self {
        Self {
            title: summary.title,
            subreddit: summary.subreddit,
            score: summary.score,
            comments,
        }
    }
}

/// The serialized text of all collected posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    post_count: usize,
}

impl Corpus {
    pub(crate) fn new(text: String, post_count: usize) -> Self {
        Self { text, post_count }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn post_count(&self) -> usize {
        self.post_count
    }
}

/// Outcome of the retrieval stage: whatever was collected, plus the
/// reason collection stopped early, if it did.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub posts: Vec<Post>,
    /// Number of candidates the search returned, including any whose
    /// comments could not be read.
    pub candidates_seen: usize,
    pub failure: Option<String>,
}

impl Harvest {
    #[allow(dead_code)] // Convenience for callers inspecting a harvest
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    #[allow(dead_code)] // Convenience for callers inspecting a harvest
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Result of the analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Synthesis {
    /// The model produced a report.
    Report { text: String },
    /// The model call failed; `reason` describes why.
    Failed { reason: String },
}

impl Synthesis {
    pub fn is_report(&self) -> bool {
        matches!(self, Synthesis::Report { .. })
    }

    /// Text to show the user: the report itself, or the fixed failure
    /// message carrying the reason.
    pub fn render(&self) -> String {
        match self {
            Synthesis::Report { text } => text.clone(),
            Synthesis::Failed { reason } => format!("{}: {}", ANALYSIS_FAILED_PREFIX, reason),
        }
    }
}

/// Metadata describing one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub topic: Topic,
    pub search_phrase: SearchPhrase,
    /// Name of the language model used.
    pub model_used: String,
    pub generated_at: DateTime<Utc>,
    pub posts_collected: usize,
    /// Set when retrieval stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_warning: Option<String>,
    pub duration_seconds: f64,
}

/// A finished report together with its metadata, ready to be saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub metadata: ReportMetadata,
    pub synthesis: Synthesis,
}
