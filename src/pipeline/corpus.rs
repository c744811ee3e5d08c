//! Serialization of posts into the analysis corpus.
//!
//! The output is a pure function of the posts and the comment cap, so
//! the same input always yields byte-identical text.

use crate::models::{Corpus, Post};

pub const POST_START: &str = "--- POST START ---";
pub const POST_END: &str = "--- POST END ---";

/// Serialize one post into its delimited block, keeping at most
/// `max_comments` comments in their given order.
pub fn serialize_post(post: &Post, max_comments: usize) -> String {
    let mut block = format!(
        "{}\nTitle: {}\nSubreddit: {}\nScore: {}\nTop Comments:",
        POST_START, post.title, post.subreddit, post.score
    );

    for comment in post.comments.iter().take(max_comments) {
        block.push_str(&format!(
            "\n- Comment (Score {}): {}",
            comment.score, comment.body
        ));
    }

    block.push('\n');
    block.push_str(POST_END);
    block.push('\n');
    block
}

/// Build the corpus for a sequence of posts. Returns `None` when there
/// is nothing to analyze.
pub fn build_corpus(posts: &[Post], max_comments: usize) -> Option<Corpus> {
    if posts.is_empty() {
        return None;
    }

    let text = posts
        .iter()
        .map(|post| serialize_post(post, max_comments))
        .collect::<Vec<_>>()
        .join("\n");

    Some(Corpus::new(text, posts.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;

    fn post(title: &str, comment_count: usize) -> Post {
        Post {
            title: title.to_string(),
            subreddit: "PartyPlanning".to_string(),
            score: 128,
            comments: (0..comment_count)
                .map(|i| Comment {
                    score: (i as i64) * 7 - 3,
                    body: format!("comment #{}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_serialize_post_layout() {
        let block = serialize_post(&post("Halftime snack ideas", 2), 5);
        assert_eq!(
            block,
            "--- POST START ---\n\
             Title: Halftime snack ideas\n\
             Subreddit: PartyPlanning\n\
             Score: 128\n\
             Top Comments:\n\
             - Comment (Score -3): comment #0\n\
             - Comment (Score 4): comment #1\n\
             --- POST END ---\n"
        );
    }

    #[test]
    fn test_serialize_caps_comments_in_given_order() {
        let block = serialize_post(&post("Too many comments", 9), 5);

        assert_eq!(block.matches(POST_START).count(), 1);
        assert_eq!(block.matches(POST_END).count(), 1);

        let comment_lines: Vec<_> = block
            .lines()
            .filter(|line| line.starts_with("- Comment"))
            .collect();
        assert_eq!(comment_lines.len(), 5);
        assert!(comment_lines[0].ends_with("comment #0"));
        assert!(comment_lines[4].ends_with("comment #4"));
    }

    #[test]
    fn test_post_without_comments() {
        let block = serialize_post(&post("Quiet thread", 0), 5);
        assert!(block.contains("Top Comments:\n--- POST END ---\n"));
    }

    #[test]
    fn test_corpus_is_deterministic_and_ordered() {
        let posts = vec![post("first", 1), post("second", 3), post("third", 6)];

        let a = build_corpus(&posts, 5).unwrap();
        let b = build_corpus(&posts, 5).unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.post_count(), 3);

        let first = a.as_str().find("Title: first").unwrap();
        let second = a.as_str().find("Title: second").unwrap();
        let third = a.as_str().find("Title: third").unwrap();
        assert!(first < second && second < third);

        assert!(a.as_str().contains("--- POST END ---\n\n--- POST START ---"));
    }

    #[test]
    fn test_empty_posts_yield_no_corpus() {
        assert!(build_corpus(&[], 5).is_none());
    }
}
