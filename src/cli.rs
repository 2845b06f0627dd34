//! CLI interface for the resume matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Explainable resume and job description matching")]
#[command(long_about = "Score a resume against a job description with embeddings and skill overlap, show the best matching resume lines, and build plain ATS-friendly resumes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a resume against a job description
    Match {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Number of evidence snippets to show
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Write a PDF match report, to this path or a name derived from the resume
        #[arg(long, num_args = 0..=1)]
        report: Option<Option<PathBuf>>,

        /// Print the pipeline trace
        #[arg(long)]
        trace: bool,

        /// Use the local hashing embeddings even when an API key is set
        #[arg(long)]
        local: bool,
    },

    /// Build an ATS resume PDF from a structured profile
    Build {
        /// Path to profile file (JSON, TOML)
        #[arg(short, long)]
        profile: PathBuf,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// Job description used for skill gap analysis
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Write a PDF gap analysis report to this path
        #[arg(long)]
        gap_report: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
