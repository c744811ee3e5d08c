//! Typed errors that callers need to tell apart.
//!
//! Everything else in the crate travels as `anyhow::Error`.

use thiserror::Error;

/// Problems with the process configuration, detected before any
/// pipeline stage runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A credential was never supplied.
    #[error("missing credential `{name}` (set it in .trendscout.toml or via ${env})")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
    },

    /// A credential still holds the template placeholder.
    #[error("credential `{name}` still holds a placeholder value")]
    PlaceholderCredential { name: &'static str },

    /// An endpoint is not an http(s) URL.
    #[error("{name} must start with 'http://' or 'https://', got '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    /// The channel list is empty.
    #[error("at least one subreddit must be configured")]
    NoChannels,
}

/// Rejected user input for a topic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("topic must not be empty")]
    Empty,
}
