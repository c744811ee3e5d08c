//! One-shot batch run with console narration.

use super::{
    insight_report, insufficient_data_message, print_report, prompt_line, save_if_requested,
    ReportOutput,
};
use crate::models::Topic;
use crate::pipeline::{Outcome, Pipeline, PipelineEvent, PipelineObserver, Stage};
use anyhow::Result;

/// Prints a line per pipeline step.
pub struct Narrator {
    limit: usize,
    quiet: bool,
    lines: Vec<String>,
}

impl Narrator {
    pub fn new(limit: usize, quiet: bool) -> Self {
        Self {
            limit,
            quiet,
            lines: Vec::new(),
        }
    }

    fn say(&mut self, line: String) {
        if !self.quiet {
            println!("{}", line);
        }
        self.lines.push(line);
    }
}

impl PipelineObserver for Narrator {
    fn on_event(&mut self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::Started {
                stage: Stage::Translate,
                detail,
            } => self.say(format!("🔄 Translating topic into a search phrase: {}...", detail)),
            PipelineEvent::Translated { phrase } => {
                self.say(format!("✅ English search phrase: {}", phrase))
            }
            PipelineEvent::Started {
                stage: Stage::Retrieve,
                detail,
            } => {
                let limit = self.limit;
                self.say(format!(
                    "🕵️ Mining Reddit for '{}' (top {} posts)...",
                    detail, limit
                ))
            }
            PipelineEvent::Retrieved { harvest } => {
                if let Some(ref reason) = harvest.failure {
                    self.say(format!(
                        "⚠️ Retrieval stopped early, continuing with what was collected: {}",
                        reason
                    ));
                }
                self.say(format!(
                    "📦 Collected {} discussion threads.",
                    harvest.posts.len()
                ));
            }
            PipelineEvent::Started {
                stage: Stage::Analyze,
                detail,
            } => self.say(format!("🧠 Running analysis with {}...", detail)),
            PipelineEvent::Analyzed { .. } => {}
            // Translation errors are reported by the caller.
            PipelineEvent::Failed { .. } => {}
        }
    }
}

/// Run the pipeline once.
///
/// The topic comes from `--topic`, or from a single prompt on stdin.
/// A translation failure is returned as an error.
pub async fn run_batch(
    pipeline: &Pipeline<'_>,
    topic_arg: Option<String>,
    limit: usize,
    output: &ReportOutput,
    quiet: bool,
) -> Result<()> {
    let raw = match topic_arg {
        Some(topic) => topic,
        None => match prompt_line(
            "Enter the topic to research (any language, e.g. 超级碗 / 情人节 / 露营): ",
        )? {
            Some(line) => line,
            None => String::new(),
        },
    };

    let topic = match Topic::new(&raw) {
        Ok(topic) => topic,
        Err(_) => {
            println!("No topic entered, nothing to do.");
            return Ok(());
        }
    };

    if !quiet {
        println!("{}", "=".repeat(50));
        println!("🚀 TrendScout starting - topic: {}", topic);
        println!("{}", "=".repeat(50));
    }

    let mut narrator = Narrator::new(limit, quiet);
    match pipeline.run(&topic, &mut narrator).await? {
        Outcome::InsufficientData {
            search_phrase,
            harvest,
        } => {
            println!("{}", insufficient_data_message(&topic, &search_phrase));
            if let Some(reason) = harvest.failure {
                println!("   Last error: {}", reason);
            }
        }
        Outcome::Completed(completed) => {
            let report = insight_report(&topic, completed, pipeline.model_name());
            print_report(&report);
            save_if_requested(&report, output)?;
            println!("✅ Done. Powered by {}.", pipeline.model_name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::config::Config;
    use crate::models::{Harvest, SearchPhrase};
    use crate::pipeline::fakes::{summary, FakeSource, ScriptedModel};
    use crate::pipeline::PipelineSettings;
    use tempfile::TempDir;

    #[test]
    fn test_narration_sequence() {
        let mut narrator = Narrator::new(60, true);
        let phrase = SearchPhrase::new("Super Bowl party");
        let harvest = Harvest {
            posts: vec![],
            candidates_seen: 1,
            failure: Some("HTTP 429".to_string()),
        };

        narrator.on_event(PipelineEvent::Started {
            stage: Stage::Translate,
            detail: "超级碗",
        });
        narrator.on_event(PipelineEvent::Translated { phrase: &phrase });
        narrator.on_event(PipelineEvent::Started {
            stage: Stage::Retrieve,
            detail: phrase.as_str(),
        });
        narrator.on_event(PipelineEvent::Retrieved { harvest: &harvest });

        assert_eq!(narrator.lines.len(), 5);
        assert!(narrator.lines[0].contains("超级碗"));
        assert!(narrator.lines[1].ends_with("Super Bowl party"));
        assert!(narrator.lines[2].contains("top 60 posts"));
        assert!(narrator.lines[3].contains("HTTP 429"));
        assert!(narrator.lines[4].contains("Collected 0"));
    }

    #[tokio::test]
    async fn test_run_batch_saves_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let model = ScriptedModel::new(vec![
            Ok("Super Bowl party".to_string()),
            Ok("the report".to_string()),
        ]);
        let source = FakeSource::new(vec![vec![summary("a")]]);
        let settings = PipelineSettings::from(&Config::default());
        let pipeline = Pipeline::new(&model, &source, &settings);
        let output = ReportOutput {
            path: Some(path.clone()),
            format: OutputFormat::Json,
        };

        run_batch(&pipeline, Some("超级碗".to_string()), 60, &output, true)
            .await
            .unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"text\": \"the report\""));
        assert!(saved.contains("\"posts_collected\": 1"));
    }

    #[tokio::test]
    async fn test_run_batch_without_data_does_not_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        let model = ScriptedModel::new(vec![Ok("Super Bowl party".to_string())]);
        let source = FakeSource::new(vec![]);
        let settings = PipelineSettings::from(&Config::default());
        let pipeline = Pipeline::new(&model, &source, &settings);
        let output = ReportOutput {
            path: Some(path.clone()),
            format: OutputFormat::Markdown,
        };

        run_batch(&pipeline, Some("超级碗".to_string()), 60, &output, true)
            .await
            .unwrap();

        assert!(!path.exists());
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_run_batch_propagates_translation_failure() {
        let model = ScriptedModel::new(vec![Err("API key not valid".to_string())]);
        let source = FakeSource::new(vec![vec![summary("a")]]);
        let settings = PipelineSettings::from(&Config::default());
        let pipeline = Pipeline::new(&model, &source, &settings);
        let output = ReportOutput {
            path: None,
            format: OutputFormat::Markdown,
        };

        let err = run_batch(&pipeline, Some("超级碗".to_string()), 60, &output, true)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("API key not valid"));
    }
}
