//! Serde types for Reddit listings and comment-tree flattening.

use crate::models::{Comment, PostSummary};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;

/// A `Listing` envelope: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<T>,
}

/// A `t3` (link) child of a search listing.
#[derive(Debug, Deserialize)]
pub struct LinkChild {
    pub data: LinkData,
}

#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
}

impl From<LinkData> for PostSummary {
    fn from(link: LinkData) -> Self {
        Self {
            id: link.id,
            title: link.title,
            subreddit: link.subreddit,
            score: link.score,
        }
    }
}

/// A node of a comment tree.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(CommentData),
    /// Collapsed placeholder standing in for unloaded replies.
    #[serde(rename = "more")]
    More {},
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default, deserialize_with = "deserialize_replies")]
    pub replies: Option<Box<Listing<CommentThing>>>,
}

/// Reddit sends `""` instead of a listing when a comment has no replies.
/// Anything else must parse as a comment listing.
fn deserialize_replies<'de, D>(
    deserializer: D,
) -> Result<Option<Box<Listing<CommentThing>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        other => serde_json::from_value::<Listing<CommentThing>>(other)
            .map(|listing| Some(Box::new(listing)))
            .map_err(de::Error::custom),
    }
}

/// Response of `GET /comments/{id}`: the post itself, then its comments.
pub type CommentsResponse = (Listing<serde::de::IgnoredAny>, Listing<CommentThing>);

/// Flatten a comment forest breadth-first, keeping service order within
/// each level. Collapsed placeholders are dropped, not expanded.
pub fn flatten_comments(roots: Vec<CommentThing>) -> Vec<Comment> {
    let mut queue: VecDeque<CommentThing> = roots.into();
    let mut flattened = Vec::new();

    while let Some(node) = queue.pop_front() {
        match node {
            CommentThing::More {} => continue,
            CommentThing::Comment(data) => {
                if let Some(listing) = data.replies {
                    queue.extend(listing.data.children);
                }
                flattened.push(Comment {
                    score: data.score,
                    body: data.body,
                });
            }
        }
    }

    flattened
}
