//! Console front ends.
//!
//! Both the one-shot batch run and the interactive session drive the
//! same [`Pipeline`](crate::pipeline::Pipeline); they differ only in
//! how progress and results are shown.

pub mod batch;
pub mod interactive;

use crate::cli::OutputFormat;
use crate::models::{InsightReport, ReportMetadata, SearchPhrase, Topic};
use crate::pipeline::Completed;
use crate::report;
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// Where finished reports are saved, if anywhere.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub path: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Attach run metadata to a completed pipeline run.
pub fn insight_report(topic: &Topic, completed: Completed, model_used: &str) -> InsightReport {
    InsightReport {
        metadata: ReportMetadata {
            topic: topic.clone(),
            search_phrase: completed.search_phrase,
            model_used: model_used.to_string(),
            generated_at: Utc::now(),
            posts_collected: completed.harvest.posts.len(),
            retrieval_warning: completed.harvest.failure,
            duration_seconds: completed.duration_seconds,
        },
        synthesis: completed.synthesis,
    }
}

/// Line shown when retrieval found nothing to analyze.
pub fn insufficient_data_message(topic: &Topic, search_phrase: &SearchPhrase) -> String {
    format!(
        "❌ Not enough data found for '{}' (searched Reddit for '{}'). Try a broader topic.",
        topic, search_phrase
    )
}

/// Print the report body between banner lines.
pub fn print_report(report: &InsightReport) {
    let rule = "=".repeat(20);
    println!("\n{} 📊 Product Sourcing Report {}\n", rule, rule);
    println!("{}", report.synthesis.render());
    println!("\n{}", "=".repeat(60));
}

/// Save the report when an output path is configured.
pub fn save_if_requested(report: &InsightReport, output: &ReportOutput) -> Result<()> {
    if let Some(ref path) = output.path {
        report::save_report(report, path, output.format)?;
        info!("Report saved to {}", path.display());
        println!("💾 Report saved to: {}", path.display());
    }
    Ok(())
}

/// Print `prompt` and read one line from standard input.
///
/// Returns `None` at end of input.
pub fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    read_line_from(&mut std::io::stdin().lock())
}

fn read_line_from(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Harvest, Post, Synthesis};
    use std::io::Cursor;

    #[test]
    fn test_read_line_trims_and_detects_eof() {
        let mut input = Cursor::new("  露营 \nsecond\n");
        assert_eq!(read_line_from(&mut input).unwrap().as_deref(), Some("露营"));
        assert_eq!(read_line_from(&mut input).unwrap().as_deref(), Some("second"));
        assert_eq!(read_line_from(&mut input).unwrap(), None);
    }

    #[test]
    fn test_insufficient_data_message_names_search_phrase() {
        let topic = Topic::new("露营").unwrap();
        let phrase = SearchPhrase::new("camping gear");

        let message = insufficient_data_message(&topic, &phrase);

        assert!(message.starts_with("❌ Not enough data found"));
        assert!(message.contains("'露营'"));
        assert!(message.contains("'camping gear'"));
    }

    #[test]
    fn test_insight_report_carries_harvest_details() {
        let completed = Completed {
            search_phrase: SearchPhrase::new("camping gear"),
            harvest: Harvest {
                posts: vec![Post {
                    title: "t".to_string(),
                    subreddit: "all".to_string(),
                    score: 1,
                    comments: vec![],
                }],
                candidates_seen: 2,
                failure: Some("HTTP 500".to_string()),
            },
            synthesis: Synthesis::Report {
                text: "body".to_string(),
            },
            duration_seconds: 4.0,
        };
        let topic = Topic::new("露营").unwrap();

        let report = insight_report(&topic, completed, "gemini-1.5-flash");

        assert_eq!(report.metadata.posts_collected, 1);
        assert_eq!(report.metadata.retrieval_warning.as_deref(), Some("HTTP 500"));
        assert_eq!(report.metadata.search_phrase.as_str(), "camping gear");
        assert_eq!(report.metadata.model_used, "gemini-1.5-flash");
    }
}
