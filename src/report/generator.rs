//! Report file generation.
//!
//! This module renders a finished run as a Markdown or JSON document
//! and writes it to disk.

use crate::cli::OutputFormat;
use crate::models::{InsightReport, ReportMetadata, Synthesis};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &InsightReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# Product Sourcing Insight Report: {}\n\n",
        report.metadata.topic
    ));

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Report body
    output.push_str(&generate_body_section(&report.synthesis));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Topic:** {}\n", metadata.topic));
    section.push_str(&format!(
        "- **Search Phrase:** `{}`\n",
        metadata.search_phrase
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Posts Analyzed:** {}\n",
        metadata.posts_collected
    ));
    if let Some(ref warning) = metadata.retrieval_warning {
        section.push_str(&format!("- **Retrieval Stopped Early:** {}\n", warning));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the report body, or the failure notice.
fn generate_body_section(synthesis: &Synthesis) -> String {
    let mut section = String::new();

    section.push_str("## Report\n\n");
    section.push_str(synthesis.render().trim_end());
    section.push_str("\n\n");

    section
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by TrendScout from Reddit discussions*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &InsightReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render `report` in `format` and write it to `path`.
pub fn save_report(report: &InsightReport, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Markdown => generate_markdown_report(report),
        OutputFormat::Json => generate_json_report(report)?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchPhrase, Topic};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_report(synthesis: Synthesis) -> InsightReport {
        InsightReport {
            metadata: ReportMetadata {
                topic: Topic::new("超级碗").unwrap(),
                search_phrase: SearchPhrase::new("Super Bowl party"),
                model_used: "gemini-1.5-flash".to_string(),
                generated_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap(),
                posts_collected: 42,
                retrieval_warning: None,
                duration_seconds: 31.25,
            },
            synthesis,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(Synthesis::Report {
            text: "### 1. 🔥 Trending Keywords\n- Weighted Plush\n".to_string(),
        });
        let markdown = generate_markdown_report(&report);

        assert!(markdown.starts_with("# Product Sourcing Insight Report: 超级碗"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("`Super Bowl party`"));
        assert!(markdown.contains("2026-02-01 12:30:00 UTC"));
        assert!(markdown.contains("- **Posts Analyzed:** 42"));
        assert!(markdown.contains("Weighted Plush"));
        assert!(!markdown.contains("Retrieval Stopped Early"));
    }

    #[test]
    fn test_metadata_shows_retrieval_warning() {
        let mut report = create_test_report(Synthesis::Report {
            text: "body".to_string(),
        });
        report.metadata.retrieval_warning = Some("HTTP 429".to_string());

        let section = generate_metadata_section(&report.metadata);
        assert!(section.contains("Retrieval Stopped Early:** HTTP 429"));
    }

    #[test]
    fn test_failed_synthesis_renders_notice() {
        let report = create_test_report(Synthesis::Failed {
            reason: "quota exceeded".to_string(),
        });
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("❌ Analysis failed: quota exceeded"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(Synthesis::Report {
            text: "body".to_string(),
        });
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"search_phrase\": \"Super Bowl party\""));
        assert!(json.contains("\"status\": \"report\""));
        assert!(!json.contains("retrieval_warning"));
    }

    #[test]
    fn test_save_report_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        let report = create_test_report(Synthesis::Report {
            text: "body".to_string(),
        });

        save_report(&report, &path, OutputFormat::Markdown).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Report\n\nbody\n"));
    }
}
