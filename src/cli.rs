//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// TrendScout - Reddit-driven product research reports
///
/// Translates a topic into an English search phrase, mines recent Reddit
/// discussions about it and asks Gemini for a product-sourcing report.
///
/// Examples:
///   trendscout --topic 超级碗
///   trendscout --topic 露营 --limit 70 --output camping.md
///   trendscout --interactive
///   trendscout --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Topic to research, in any language
    ///
    /// Prompted for on standard input when omitted.
    #[arg(short, long, value_name = "TOPIC", conflicts_with = "interactive")]
    pub topic: Option<String>,

    /// Start an interactive session that researches one topic after another
    #[arg(short, long)]
    pub interactive: bool,

    /// Maximum number of candidate posts requested from Reddit
    #[arg(short, long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Gemini model to use
    ///
    /// Can also be set via TRENDSCOUT_MODEL env var or .trendscout.toml config.
    #[arg(short, long, env = "TRENDSCOUT_MODEL")]
    pub model: Option<String>,

    /// Save the report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Format of the saved report (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .trendscout.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .trendscout.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the saved report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref topic) = self.topic {
            if topic.trim().is_empty() {
                return Err("Topic must not be empty".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!(
                    "Output path is a directory: {}",
                    output.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            topic: Some("超级碗".to_string()),
            interactive: false,
            limit: None,
            model: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "trendscout",
            "--topic",
            "露营",
            "--limit",
            "70",
            "--format",
            "json",
        ]);
        assert_eq!(args.topic.as_deref(), Some("露营"));
        assert_eq!(args.limit, Some(70));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.interactive);
    }

    #[test]
    fn test_topic_conflicts_with_interactive() {
        let result = Args::try_parse_from(["trendscout", "--topic", "x", "--interactive"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_blank_topic() {
        let mut args = make_args();
        args.topic = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
