//! Corpus + topic → insight report.
//!
//! The whole corpus is sent in a single request; nothing is chunked or
//! truncated, so the model's context window is the only limit.

use crate::config::AnalysisConfig;
use crate::llm::LanguageModel;
use crate::models::{Corpus, Synthesis, Topic};
use tracing::{error, info};

/// Headings the model is asked to produce, in order.
pub const SECTION_HEADINGS: [&str; 4] = [
    "1. 🔥 Trending Keywords (Top 5)",
    "2. 😫 Pain Points",
    "3. 💡 Actionable Products",
    "4. 🔍 Traffic Validation",
];

/// Settings that shape the report prompt.
#[derive(Debug, Clone)]
pub struct AnalysisPrompt {
    /// Language the report should be written in.
    pub language: String,
    /// Categories that each get one product recommendation.
    pub product_categories: Vec<String>,
}

impl From<&AnalysisConfig> for AnalysisPrompt {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            language: config.language.clone(),
            product_categories: config.product_categories.clone(),
        }
    }
}

impl AnalysisPrompt {
    /// Render the full prompt, with the corpus appended verbatim.
    pub fn render(&self, topic: &Topic, corpus: &Corpus) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are a professional Amazon product-sourcing analyst. Analyze the raw Reddit \
             discussion data below for the topic \"{}\".\n\n",
            topic
        ));
        prompt.push_str(&format!(
            "Write a clearly structured Amazon Product Sourcing Insight Report in {}, \
             with exactly these sections:\n\n",
            self.language
        ));

        prompt.push_str(&format!("**{}**\n", SECTION_HEADINGS[0]));
        prompt.push_str(
            "- Focus on adjective + noun combinations (e.g. \"Sparkly Helmet\", \"Weighted Plush\").\n",
        );
        prompt.push_str(
            "- Exclude broad terms such as the topic itself; find specific long-tail and \
             product-attribute phrases.\n\n",
        );

        prompt.push_str(&format!("**{}**\n", SECTION_HEADINGS[1]));
        prompt.push_str(
            "- What are users complaining about (e.g. can't find decorations in this color, \
             the plush is too stiff, gifts feel unoriginal)?\n",
        );
        prompt.push_str("- Quote one or two specific comments as evidence.\n\n");

        prompt.push_str(&format!("**{}**\n", SECTION_HEADINGS[2]));
        for category in &self.product_categories {
            prompt.push_str(&format!(
                "- For the **{}** category, recommend 1 concrete product direction \
                 (materials, colors, style, features, feel or target audience).\n",
                category
            ));
        }
        prompt.push_str("- *Each recommendation must state which pain point it solves.*\n\n");

        prompt.push_str(&format!("**{}**\n", SECTION_HEADINGS[3]));
        prompt.push_str(
            "- Give 3 English search terms I can check on Google Trends or Amazon ABA.\n\n",
        );

        prompt.push_str("Here is the Reddit data:\n");
        prompt.push_str(corpus.as_str());
        prompt.push('\n');

        prompt
    }
}

/// Ask the model for the report. Service failures become
/// [`Synthesis::Failed`] instead of errors.
pub async fn analyze(
    model: &dyn LanguageModel,
    corpus: &Corpus,
    topic: &Topic,
    prompt: &AnalysisPrompt,
) -> Synthesis {
    let prompt = prompt.render(topic, corpus);
    info!(
        "Requesting analysis of {} posts ({} prompt chars)",
        corpus.post_count(),
        prompt.chars().count()
    );

    match model.generate(&prompt).await {
        Ok(text) => Synthesis::Report { text },
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            Synthesis::Failed {
                reason: format!("{:#}", e),
            }
        }
    }
}
