//! The translate → retrieve → analyze pipeline.
//!
//! Stages run strictly in sequence. Clients are borrowed, never owned,
//! so the same handles serve every run in a session. Progress is
//! reported through a [`PipelineObserver`] so the console front ends
//! decide how it looks.

pub mod analyzer;
pub mod corpus;
pub mod retriever;
pub mod translator;

pub use analyzer::AnalysisPrompt;
pub use retriever::RetrievalOptions;

use crate::config::Config;
use crate::llm::LanguageModel;
use crate::models::{Harvest, SearchPhrase, Synthesis, Topic};
use crate::reddit::DiscussionSource;
use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translate,
    Retrieve,
    Analyze,
}

/// Progress notifications emitted by [`Pipeline::run`].
#[derive(Debug, Clone)]
pub enum PipelineEvent<'a> {
    Started { stage: Stage, detail: &'a str },
    Translated { phrase: &'a SearchPhrase },
    Retrieved { harvest: &'a Harvest },
    Analyzed { synthesis: &'a Synthesis },
    Failed { stage: Stage, reason: &'a str },
}

/// Receives pipeline progress.
pub trait PipelineObserver {
    fn on_event(&mut self, event: PipelineEvent<'_>);
}

/// Settings for all stages.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retrieval: RetrievalOptions,
    pub analysis: AnalysisPrompt,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            retrieval: RetrievalOptions::from(&config.reddit),
            analysis: AnalysisPrompt::from(&config.analysis),
        }
    }
}

/// A run that reached the analysis stage.
#[derive(Debug, Clone)]
pub struct Completed {
    pub search_phrase: SearchPhrase,
    pub harvest: Harvest,
    pub synthesis: Synthesis,
    pub duration_seconds: f64,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(Completed),
    /// Retrieval produced no posts; analysis was skipped.
    InsufficientData {
        search_phrase: SearchPhrase,
        harvest: Harvest,
    },
}

/// Borrowed clients plus settings.
pub struct Pipeline<'a> {
    model: &'a dyn LanguageModel,
    source: &'a dyn DiscussionSource,
    settings: &'a PipelineSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        model: &'a dyn LanguageModel,
        source: &'a dyn DiscussionSource,
        settings: &'a PipelineSettings,
    ) -> Self {
        Self {
            model,
            source,
            settings,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run all three stages for `topic`.
    ///
    /// Only a translation failure is returned as an error; retrieval and
    /// analysis problems are reported inside the [`Outcome`].
    pub async fn run(
        &self,
        topic: &Topic,
        observer: &mut dyn PipelineObserver,
    ) -> Result<Outcome> {
        let start_time = Instant::now();
        info!("Starting research run for '{}'", topic);

        observer.on_event(PipelineEvent::Started {
            stage: Stage::Translate,
            detail: topic.as_str(),
        });
        let search_phrase = match translator::translate(self.model, topic).await {
            Ok(phrase) => phrase,
            Err(e) => {
                let reason = format!("{:#}", e);
                observer.on_event(PipelineEvent::Failed {
                    stage: Stage::Translate,
                    reason: &reason,
                });
                return Err(e);
            }
        };
        observer.on_event(PipelineEvent::Translated {
            phrase: &search_phrase,
        });

        observer.on_event(PipelineEvent::Started {
            stage: Stage::Retrieve,
            detail: search_phrase.as_str(),
        });
        let harvest =
            retriever::retrieve(self.source, &search_phrase, &self.settings.retrieval).await;
        observer.on_event(PipelineEvent::Retrieved { harvest: &harvest });

        let corpus = match corpus::build_corpus(
            &harvest.posts,
            self.settings.retrieval.comments_per_post,
        ) {
            Some(corpus) => corpus,
            None => {
                warn!("No posts found for '{}', skipping analysis", search_phrase);
                return Ok(Outcome::InsufficientData {
                    search_phrase,
                    harvest,
                });
            }
        };

        observer.on_event(PipelineEvent::Started {
            stage: Stage::Analyze,
            detail: self.model.model_name(),
        });
        let synthesis =
            analyzer::analyze(self.model, &corpus, topic, &self.settings.analysis).await;
        observer.on_event(PipelineEvent::Analyzed {
            synthesis: &synthesis,
        });

        Ok(Outcome::Completed(Completed {
            search_phrase,
            harvest,
            synthesis,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        }))
    }
}

/// In-memory stand-ins for the external services.
#[cfg(test)]
pub(crate) mod fakes {
    use crate::llm::LanguageModel;
    use crate::models::{Comment, PostSummary};
    use crate::reddit::{DiscussionSource, SearchPage, SearchRequest};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::{PipelineEvent, PipelineObserver};

    /// Observer that ignores everything.
    pub struct Silent;

    impl PipelineObserver for Silent {
        fn on_event(&mut self, _event: PipelineEvent<'_>) {}
    }

    /// Replays canned completions and records every prompt.
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(responses: Vec<std::result::Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
                None => Err(anyhow::anyhow!("no scripted response left")),
            }
        }

        fn model_name(&self) -> &str {
            "scripted-model"
        }
    }

    pub fn summary(id: &str) -> PostSummary {
        PostSummary {
            id: id.to_string(),
            title: format!("Post {}", id),
            subreddit: "PartyPlanning".to_string(),
            score: 10,
        }
    }

    /// Serves fixed search pages; cursor `cursor-N` selects page N.
    pub struct FakeSource {
        pages: Vec<Vec<PostSummary>>,
        comments: HashMap<String, std::result::Result<Vec<Comment>, String>>,
        search_error: Option<String>,
        searches: Mutex<Vec<(SearchRequest, Option<String>, usize)>>,
        comment_requests: Mutex<usize>,
    }

    impl FakeSource {
        pub fn new(pages: Vec<Vec<PostSummary>>) -> Self {
            Self {
                pages,
                comments: HashMap::new(),
                search_error: None,
                searches: Mutex::new(Vec::new()),
                comment_requests: Mutex::new(0),
            }
        }

        pub fn with_comments(mut self, id: &str, comments: Vec<Comment>) -> Self {
            self.comments.insert(id.to_string(), Ok(comments));
            self
        }

        pub fn failing_comments(mut self, id: &str, reason: &str) -> Self {
            self.comments.insert(id.to_string(), Err(reason.to_string()));
            self
        }

        pub fn failing_search(mut self, reason: &str) -> Self {
            self.search_error = Some(reason.to_string());
            self
        }

        pub fn searches(&self) -> Vec<(SearchRequest, Option<String>, usize)> {
            self.searches.lock().unwrap().clone()
        }

        pub fn comment_requests(&self) -> usize {
            *self.comment_requests.lock().unwrap()
        }
    }

    #[async_trait]
    impl DiscussionSource for FakeSource {
        async fn search(
            &self,
            request: &SearchRequest,
            after: Option<&str>,
            page_size: usize,
        ) -> Result<SearchPage> {
            self.searches.lock().unwrap().push((
                request.clone(),
                after.map(String::from),
                page_size,
            ));

            if let Some(ref reason) = self.search_error {
                anyhow::bail!("{}", reason);
            }

            let index = match after {
                None => 0,
                Some(cursor) => cursor
                    .trim_start_matches("cursor-")
                    .parse::<usize>()
                    .unwrap_or(usize::MAX),
            };

            let posts = self
                .pages
                .get(index)
                .map(|page| page.iter().take(page_size).cloned().collect())
                .unwrap_or_default();
            let after = (index.saturating_add(1) < self.pages.len())
                .then(|| format!("cursor-{}", index + 1));

            Ok(SearchPage { posts, after })
        }

        async fn comments(&self, post: &PostSummary) -> Result<Vec<Comment>> {
            *self.comment_requests.lock().unwrap() += 1;
            match self.comments.get(&post.id) {
                Some(Ok(comments)) => Ok(comments.clone()),
                Some(Err(reason)) => anyhow::bail!("{}", reason),
                None => Ok(vec![Comment {
                    score: 1,
                    body: format!("comment on {}", post.id),
                }]),
            }
        }
    }
}
