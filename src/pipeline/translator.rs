//! Topic → English search phrase.

use crate::llm::LanguageModel;
use crate::models::{SearchPhrase, Topic};
use anyhow::{Context, Result};
use tracing::info;

/// Build the translation instruction for a topic.
pub fn translation_prompt(topic: &Topic) -> String {
    format!(
        "You are a translator. Translate '{}' to a single English keyword or phrase \
         suitable for Reddit search. Only output the English text, nothing else.",
        topic
    )
}

/// Ask the model for a search phrase. The completion is trimmed and
/// otherwise returned as-is.
pub async fn translate(model: &dyn LanguageModel, topic: &Topic) -> Result<SearchPhrase> {
    let completion = model
        .generate(&translation_prompt(topic))
        .await
        .with_context(|| format!("Failed to translate topic '{}'", topic))?;

    let phrase = completion.trim();
    if phrase.is_empty() {
        anyhow::bail!("Model returned an empty translation for '{}'", topic);
    }

    info!("Search phrase: {}", phrase);
    Ok(SearchPhrase::new(phrase))
}
