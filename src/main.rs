//! Resume matcher: explainable resume and job description matching

use clap::Parser;
use colored::Colorize;
use log::{error, info};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::config::{Config, ProviderChoice};
use resume_matcher::input::InputManager;
use resume_matcher::output::formatter::{
    generate_output, save_output_to_file, suggest_report_filename, ConsoleFormatter,
};
use resume_matcher::output::{MatchReportInput, PdfRenderer};
use resume_matcher::processing::facts::FactExtractor;
use resume_matcher::processing::gaps::analyze_gaps;
use resume_matcher::processing::pipeline::PipelineOrchestrator;
use resume_matcher::profile::ResumeProfile;
use resume_matcher::{Result, ResumeMatchError};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    // Load configuration
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{} {}", "Error:".red().bold(), e.user_message());
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e.user_message());
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Match {
            resume,
            job,
            top_k,
            output,
            report,
            trace,
            local,
        } => {
            info!("Starting resume match analysis");

            // Validate input files
            cli::validate_file_extension(&resume, &["pdf", "txt", "md"])
                .map_err(|e| ResumeMatchError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, &["txt", "md"])
                .map_err(|e| ResumeMatchError::InvalidInput(format!("Job description file: {}", e)))?;

            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ResumeMatchError::InvalidInput)?,
                None => config.output.format,
            };
            if local {
                config.embedding.provider = ProviderChoice::Local;
            }
            if let Some(k) = top_k {
                config.evidence.top_k = k;
            }

            let mut input_manager = InputManager::new();
            let resume_source = input_manager.load_resume(&resume).await?;
            let job_text = input_manager.load_job_text(&job).await?;

            // The remote provider does blocking HTTP, so the pipeline stays off the runtime threads.
            let pipeline_config = config.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let pipeline = PipelineOrchestrator::from_config(&pipeline_config);
                info!("Using {}", pipeline.embedding_backend());
                pipeline.run(&resume_source, &job_text)
            })
            .await
            .map_err(std::io::Error::from)??;

            let rendered = generate_output(&outcome, output_format, config.output.color_output, trace)?;
            println!("{}", rendered);

            if let Some(report_path) = report {
                let report_path = report_path.unwrap_or_else(|| {
                    PathBuf::from(suggest_report_filename(&resume.to_string_lossy(), false))
                });
                let input = MatchReportInput {
                    candidate: outcome
                        .resume
                        .name
                        .clone()
                        .unwrap_or_else(|| "Unknown candidate".to_string()),
                    match_result: &outcome.match_result,
                    snippets: &outcome.snippets,
                    gaps: None,
                    generated: chrono::Local::now().date_naive(),
                };
                let bytes = PdfRenderer::new().render_match_report(&input)?;
                save_output_to_file(&bytes, &report_path)?;
                info!("Match report written to {}", report_path.display());
                println!("Report saved to {}", report_path.display());
            }
        }

        Commands::Build {
            profile,
            output,
            job,
            gap_report,
        } => {
            info!("Building ATS resume from {}", profile.display());

            cli::validate_file_extension(&profile, &["json", "toml"])
                .map_err(|e| ResumeMatchError::InvalidInput(format!("Profile file: {}", e)))?;
            let resume_profile = ResumeProfile::load(&profile)?;

            let renderer = PdfRenderer::new();
            let bytes = renderer.render_ats_resume(&resume_profile)?;
            save_output_to_file(&bytes, &output)?;
            println!("Resume saved to {}", output.display());

            let job_skills = match job {
                Some(job_path) => {
                    let mut input_manager = InputManager::new();
                    let job_text = input_manager.load_job_text(&job_path).await?;
                    Some(FactExtractor::new().parse_job_description(&job_text).skills)
                }
                None => None,
            };

            let today = chrono::Local::now().date_naive();
            let gaps = analyze_gaps(&resume_profile, job_skills.as_ref(), today);
            let formatter = ConsoleFormatter::new(config.output.color_output, false);
            println!("{}", formatter.format_gap_report(&gaps));

            if let Some(path) = gap_report {
                let candidate = if resume_profile.name.trim().is_empty() {
                    "Unknown candidate"
                } else {
                    resume_profile.name.trim()
                };
                let bytes = renderer.render_gap_report(candidate, &gaps, today)?;
                save_output_to_file(&bytes, &path)?;
                println!("Gap report saved to {}", path.display());
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    ResumeMatchError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("Configuration ({})\n", config_path.display());
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults at {}", config_path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}
