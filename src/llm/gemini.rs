//! Gemini `generateContent` client.

use super::LanguageModel;
use crate::config::ModelConfig;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Settings for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_url: String,
    pub model_name: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

impl TryFrom<&ModelConfig> for GeminiSettings {
    type Error = ConfigError;

    fn try_from(config: &ModelConfig) -> Result<Self, Self::Error> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingCredential {
                name: "model.api_key",
                env: crate::config::ENV_MODEL_API_KEY,
            })?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model_name: config.name.clone(),
            api_key,
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// HTTP client for Google's Generative Language API.
pub struct GeminiClient {
    settings: GeminiSettings,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client. Fails only if the HTTP client cannot be built.
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        info!("Initializing Gemini client with model {}", settings.model_name);

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_url, self.settings.model_name
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self
                .settings
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        debug!(
            model = %self.settings.model_name,
            prompt_chars = prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "Gemini request timed out after {}s",
                        self.settings.timeout_seconds.unwrap_or_default()
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to Gemini at {}", self.settings.api_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e.without_url())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API error {}: {}", status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.settings.model_name
    }
}

/// Join the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        anyhow::bail!("Prompt was blocked by Gemini: {}", reason);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        anyhow::bail!(
            "Gemini returned an empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(text)
}
