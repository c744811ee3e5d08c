//! Configuration file handling.
//!
//! This module handles loading `.trendscout.toml`, overlaying
//! credentials from the environment and merging CLI overrides.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".trendscout.toml";

pub const ENV_MODEL_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Language model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Reddit retrieval settings.
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Report prompt settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// File to save each report to. Reports are only printed when unset.
    #[serde(default)]
    pub output: Option<String>,
}

/// Language model (Gemini) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_model_api_url")]
    pub api_url: String,

    /// API key. Usually supplied through `GOOGLE_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature. The service default applies when unset.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds. No client-side timeout when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_model_api_url(),
            api_key: None,
            temperature: None,
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_model_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Reddit API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// OAuth application id. Usually supplied through `REDDIT_CLIENT_ID`.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth application secret. Usually supplied through `REDDIT_CLIENT_SECRET`.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Host that issues access tokens.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Host serving authenticated API calls.
    #[serde(default = "default_reddit_api_url")]
    pub api_url: String,

    /// Subreddits searched together as one union.
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,

    /// Search ordering.
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Trailing time window for search results.
    #[serde(default = "default_time_filter")]
    pub time_filter: String,

    /// Maximum number of candidate posts requested from search.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Comments kept per post.
    #[serde(default = "default_comments_per_post")]
    pub comments_per_post: usize,

    /// Request timeout in seconds. No client-side timeout when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: default_user_agent(),
            auth_url: default_auth_url(),
            api_url: default_reddit_api_url(),
            subreddits: default_subreddits(),
            sort: default_sort(),
            time_filter: default_time_filter(),
            limit: default_limit(),
            comments_per_post: default_comments_per_post(),
            timeout_seconds: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("TrendScout/{} (Gemini)", env!("CARGO_PKG_VERSION"))
}

fn default_auth_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_subreddits() -> Vec<String> {
    vec![
        "all",
        "NFL",
        "HomeDecorating",
        "Plushies",
        "Gifts",
        "PartyPlanning",
        "DIY",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sort() -> String {
    "relevance".to_string()
}

fn default_time_filter() -> String {
    "month".to_string()
}

fn default_limit() -> usize {
    60
}

fn default_comments_per_post() -> usize {
    5
}

/// Report prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Language the report is written in.
    #[serde(default = "default_language")]
    pub language: String,

    /// Product categories that each get one recommendation.
    #[serde(default = "default_product_categories")]
    pub product_categories: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            product_categories: default_product_categories(),
        }
    }
}

fn default_language() -> String {
    "Simplified Chinese".to_string()
}

fn default_product_categories() -> Vec<String> {
    vec!["Decorations".to_string(), "Plush Toys".to_string()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Overlay credentials from the environment.
    ///
    /// Environment values win over the file so secrets can stay out of it.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_MODEL_API_KEY) {
            self.model.api_key = Some(key);
        }
        if let Some(id) = non_empty(ENV_REDDIT_CLIENT_ID) {
            self.reddit.client_id = Some(id);
        }
        if let Some(secret) = non_empty(ENV_REDDIT_CLIENT_SECRET) {
            self.reddit.client_secret = Some(secret);
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(limit) = args.limit {
            self.reddit.limit = limit;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
    }

    /// Check that everything needed to talk to both services is present.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        require_credential(
            self.model.api_key.as_deref(),
            "model.api_key",
            ENV_MODEL_API_KEY,
        )?;
        require_credential(
            self.reddit.client_id.as_deref(),
            "reddit.client_id",
            ENV_REDDIT_CLIENT_ID,
        )?;
        require_credential(
            self.reddit.client_secret.as_deref(),
            "reddit.client_secret",
            ENV_REDDIT_CLIENT_SECRET,
        )?;

        require_http_url("model.api_url", &self.model.api_url)?;
        require_http_url("reddit.auth_url", &self.reddit.auth_url)?;
        require_http_url("reddit.api_url", &self.reddit.api_url)?;

        if self.reddit.subreddits.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoChannels);
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn require_credential(
    value: Option<&str>,
    name: &'static str,
    env: &'static str,
) -> std::result::Result<(), ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Err(ConfigError::MissingCredential { name, env }),
        Some(v) if is_placeholder(v) => Err(ConfigError::PlaceholderCredential { name }),
        Some(_) => Ok(()),
    }
}

fn require_http_url(name: &'static str, value: &str) -> std::result::Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        })
    }
}

/// Values copied verbatim from setup instructions.
fn is_placeholder(value: &str) -> bool {
    let upper = value.to_uppercase();
    upper.starts_with("YOUR_") || upper.starts_with("<") || value.starts_with("你的")
}
