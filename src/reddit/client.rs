//! Reddit OAuth API client.
//!
//! Uses the application-only (client credentials) grant, so no Reddit
//! account is needed. The access token is fetched on first use and
//! refreshed shortly before it expires.

use super::listing::{flatten_comments, CommentsResponse, LinkChild, Listing};
use super::{DiscussionSource, SearchPage, SearchRequest};
use crate::config::{RedditConfig, ENV_REDDIT_CLIENT_ID, ENV_REDDIT_CLIENT_SECRET};
use crate::error::ConfigError;
use crate::models::{Comment, PostSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Largest page the search endpoint will return.
pub const MAX_PAGE_SIZE: usize = 100;

/// Tokens are refreshed this long before their stated expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Settings for the Reddit client.
#[derive(Debug, Clone)]
pub struct RedditSettings {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
    pub timeout_seconds: Option<u64>,
}

impl TryFrom<&RedditConfig> for RedditSettings {
    type Error = ConfigError;

    fn try_from(config: &RedditConfig) -> std::result::Result<Self, Self::Error> {
        let client_id = non_empty(&config.client_id).ok_or(ConfigError::MissingCredential {
            name: "reddit.client_id",
            env: ENV_REDDIT_CLIENT_ID,
        })?;
        let client_secret =
            non_empty(&config.client_secret).ok_or(ConfigError::MissingCredential {
                name: "reddit.client_secret",
                env: ENV_REDDIT_CLIENT_SECRET,
            })?;

        Ok(Self {
            client_id,
            client_secret,
            user_agent: config.user_agent.clone(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

impl AccessToken {
    fn from_response(response: TokenResponse, now: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in);
        Self {
            value: response.access_token,
            refresh_at: now + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

/// HTTP client for the Reddit API.
pub struct RedditClient {
    settings: RedditSettings,
    http_client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Create a client. No request is made until the first search.
    pub fn new(settings: RedditSettings) -> Result<Self> {
        info!("Initializing Reddit client ({})", settings.user_agent);

        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(secs) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            settings,
            http_client,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, requesting a new one if needed.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
            debug!("Reddit access token expired, refreshing");
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let url = format!("{}/api/v1/access_token", self.settings.auth_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to request Reddit access token")?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            anyhow::bail!("Reddit rejected the client credentials (401)");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit token endpoint returned {status}: {body}");
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Reddit token response")?;

        debug!(expires_in = parsed.expires_in, "Obtained Reddit access token");
        Ok(AccessToken::from_response(parsed, Instant::now()))
    }

    /// Authenticated GET against the API host.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.settings.api_url, path);

        debug!(path = path, "Reddit GET request");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Reddit request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }
}

/// Query parameters for a search page.
fn search_params<'a>(
    request: &'a SearchRequest,
    after: Option<&'a str>,
    page_size: &'a str,
) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![
        ("q", request.query.as_str()),
        ("sort", request.sort.as_str()),
        ("t", request.time_filter.as_str()),
        ("limit", page_size),
        ("restrict_sr", "on"),
        ("type", "link"),
        ("raw_json", "1"),
    ];
    if let Some(cursor) = after {
        params.push(("after", cursor));
    }
    params
}

#[async_trait]
impl DiscussionSource for RedditClient {
    async fn search(
        &self,
        request: &SearchRequest,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<SearchPage> {
        let path = format!("/r/{}/search", request.channel_path());
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let params = search_params(request, after, &page_size);

        let listing: Listing<LinkChild> = self.get_json(&path, &params).await?;

        Ok(SearchPage {
            posts: listing
                .data
                .children
                .into_iter()
                .map(|child| child.data.into())
                .collect(),
            after: listing.data.after,
        })
    }

    async fn comments(&self, post: &PostSummary) -> Result<Vec<Comment>> {
        let path = format!("/comments/{}", post.id);
        let (_, comments): CommentsResponse = self
            .get_json(&path, &[("raw_json", "1")])
            .await
            .with_context(|| format!("Failed to load comments for post {}", post.id))?;

        Ok(flatten_comments(comments.data.children))
    }
}
