//! Interactive session: one topic after another, with a spinner per stage.
//!
//! The service clients behind the pipeline are built once for the whole
//! session and reused by every run.

use super::{
    insight_report, insufficient_data_message, print_report, prompt_line, save_if_requested,
    ReportOutput,
};
use crate::models::Topic;
use crate::pipeline::{Outcome, Pipeline, PipelineEvent, PipelineObserver, Stage};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Renders each stage as a spinner that turns into a status line.
pub struct StageSpinners {
    limit: usize,
    current: Option<ProgressBar>,
}

impl StageSpinners {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            current: None,
        }
    }

    fn start(&mut self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message);
        self.current = Some(pb);
    }

    fn finish(&mut self, message: String) {
        if let Some(pb) = self.current.take() {
            pb.finish_with_message(message);
        }
    }

    fn fail(&mut self, message: String) {
        if let Some(pb) = self.current.take() {
            pb.abandon_with_message(message);
        }
    }
}

impl PipelineObserver for StageSpinners {
    fn on_event(&mut self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::Started { stage, detail } => {
                let message = match stage {
                    Stage::Translate => format!("Translating '{}'...", detail),
                    Stage::Retrieve => format!(
                        "Searching Reddit for '{}' (up to {} posts)...",
                        detail, self.limit
                    ),
                    Stage::Analyze => format!("Generating report with {}...", detail),
                };
                self.start(message);
            }
            PipelineEvent::Translated { phrase } => {
                self.finish(format!("✅ Search phrase: {}", phrase))
            }
            PipelineEvent::Retrieved { harvest } => {
                let count = harvest.posts.len();
                match (count, harvest.failure.as_deref()) {
                    (0, Some(reason)) => self.fail(format!("❌ No posts collected: {}", reason)),
                    (0, None) => self.fail("❌ No posts found".to_string()),
                    (_, Some(reason)) => self.finish(format!(
                        "⚠️ Collected {} posts (stopped early: {})",
                        count, reason
                    )),
                    (_, None) => self.finish(format!("✅ Collected {} posts", count)),
                }
            }
            PipelineEvent::Analyzed { synthesis } => {
                if synthesis.is_report() {
                    self.finish("✅ Report generated".to_string());
                } else {
                    self.fail("❌ Analysis failed".to_string());
                }
            }
            PipelineEvent::Failed { stage, reason } => {
                self.fail(format!("❌ {:?} failed: {}", stage, reason))
            }
        }
    }
}

/// What the session should do with a line of input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Research(Topic),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        return Command::Quit;
    }
    match Topic::new(trimmed) {
        Ok(topic) => Command::Research(topic),
        Err(_) => Command::Quit,
    }
}

/// Research topics until the user quits.
///
/// Failures of a single run are shown and the session continues.
pub async fn run_session(pipeline: &Pipeline<'_>, limit: usize, output: &ReportOutput) -> Result<()> {
    println!("🤖 TrendScout interactive session (model: {})", pipeline.model_name());
    println!("   Enter a topic in any language. Empty line or 'quit' to exit.");

    let mut runs = 0usize;
    loop {
        let line = match prompt_line("\n🔎 Topic> ")? {
            Some(line) => line,
            None => break,
        };

        let topic = match parse_command(&line) {
            Command::Quit => break,
            Command::Research(topic) => topic,
        };

        runs += 1;
        let mut spinners = StageSpinners::new(limit);
        match pipeline.run(&topic, &mut spinners).await {
            Ok(Outcome::Completed(completed)) => {
                let report = insight_report(&topic, completed, pipeline.model_name());
                print_report(&report);
                if let Err(e) = save_if_requested(&report, output) {
                    eprintln!("⚠️ {:#}", e);
                }
                println!(
                    "✅ Report ready for '{}' ({:.1}s)",
                    topic, report.metadata.duration_seconds
                );
            }
            Ok(Outcome::InsufficientData { search_phrase, .. }) => {
                println!("{}", insufficient_data_message(&topic, &search_phrase));
            }
            Err(e) => {
                eprintln!("❌ {:#}", e);
            }
        }
    }

    debug!("Interactive session ended after {} runs", runs);
    println!("👋 Bye.");
    Ok(())
}
