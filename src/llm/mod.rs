//! Language model access.
//!
//! The pipeline talks to the model only through [`LanguageModel`], so
//! stages can be exercised with an in-memory stand-in.

pub mod gemini;

pub use gemini::GeminiClient;

use anyhow::Result;
use async_trait::async_trait;

/// A service that completes a text prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Submit `prompt` and return the completion text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model, for report metadata.
    fn model_name(&self) -> &str;
}
