//! Console and JSON rendering of analysis outcomes

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::gaps::{AssessmentKind, GapReport, Severity};
use crate::processing::pipeline::{AnalysisOutcome, PipelineTrace};
use colored::{Color, Colorize};
use std::path::Path;

const SNIPPET_PREVIEW_CHARS: usize = 120;

/// Trait for formatting analysis outcomes
pub trait OutputFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors and trace listing
pub struct ConsoleFormatter {
    use_colors: bool,
    show_trace: bool,
}

/// JSON formatter for piping results into other tools
pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, show_trace: bool) -> Self {
        Self {
            use_colors,
            show_trace,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f32) -> String {
        let (badge, color) = match score.round() as u8 {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_severity(&self, severity: Severity) -> String {
        match severity {
            Severity::High => self.colorize("[HIGH]", Color::Red),
            Severity::Medium => self.colorize("[MEDIUM]", Color::Yellow),
            Severity::Low => self.colorize("[LOW]", Color::BrightBlack),
        }
    }

    pub fn format_trace(&self, trace: &PipelineTrace) -> String {
        let mut output = self.format_header("Pipeline Trace", 2);

        for (i, stage) in trace.stages.iter().enumerate() {
            // Stages that took a fallback path stand out, as in the workflow graph.
            let color = if stage.mentions_fallback() {
                Color::TrueColor {
                    r: 255,
                    g: 127,
                    b: 14,
                }
            } else {
                Color::Blue
            };
            output.push_str(&format!(
                "{}. {}\n   {}\n",
                i + 1,
                self.colorize(stage.name.as_str(), color),
                stage.reasoning
            ));
        }

        let edges: Vec<String> = trace
            .edges
            .iter()
            .map(|(from, to)| format!("{} -> {}", from, to))
            .collect();
        output.push_str(&format!("Edges: {}\n", edges.join(", ")));
        output
    }

    pub fn format_gap_report(&self, report: &GapReport) -> String {
        let mut output = self.format_header("Gap Analysis", 2);

        if !report.experience_gaps.is_empty() {
            output.push_str(&self.format_header("Employment Gaps", 3));
            for gap in &report.experience_gaps {
                output.push_str(&format!(
                    "  • {} to {} ({} months): {}\n",
                    gap.from, gap.to, gap.duration_months, gap.description
                ));
            }
        }

        for (title, findings) in [
            ("Education", &report.education_gaps),
            ("Skills", &report.skill_gaps),
        ] {
            if findings.is_empty() {
                continue;
            }
            output.push_str(&self.format_header(title, 3));
            for finding in findings {
                output.push_str(&format!(
                    "  • {} {}: {}\n",
                    self.format_severity(finding.severity),
                    finding.kind.label(),
                    finding.description
                ));
            }
        }

        let color = match report.assessment.kind {
            AssessmentKind::Positive => Color::Green,
            AssessmentKind::Moderate => Color::Yellow,
            AssessmentKind::Concern => Color::Red,
        };
        output.push_str(&format!(
            "\nAssessment: {}\n",
            self.colorize(&report.assessment.description, color)
        ));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let mut output = String::new();
        let result = &outcome.match_result;

        output.push_str(&self.format_header("RESUME MATCH ANALYSIS", 1));
        if let Some(name) = &outcome.resume.name {
            output.push_str(&format!("Candidate: {}\n", name));
        }
        let contact: Vec<&str> = [&outcome.resume.email, &outcome.resume.phone]
            .iter()
            .filter_map(|field| field.as_deref())
            .collect();
        if !contact.is_empty() {
            output.push_str(&format!("Contact: {}\n", contact.join(" | ")));
        }
        output.push_str(&format!("Embeddings: {}\n", outcome.embedding_backend));

        output.push_str(&self.format_header("Score", 2));
        output.push_str(&format!(
            "Match Score: {:.1}% {}\n",
            result.score,
            self.format_score_badge(result.score)
        ));
        output.push_str(&format!("Confidence: {:.0}%\n", result.confidence * 100.0));
        output.push_str(&format!(
            "Semantic similarity: {:.2} | Skill overlap: {}/{} (Jaccard {:.2})\n",
            result.similarity, result.skill_overlap, result.skill_union, result.jaccard
        ));
        output.push_str(&format!("{}\n", self.colorize(&result.explanation, Color::Cyan)));

        output.push_str(&self.format_header("Skills", 2));
        let matched: Vec<&str> = outcome
            .resume
            .skills
            .iter()
            .filter(|s| outcome.job.skills.contains(*s))
            .map(String::as_str)
            .collect();
        if matched.is_empty() {
            output.push_str("Matched: none\n");
        } else {
            output.push_str(&format!(
                "Matched: {}\n",
                self.colorize(&matched.join(", "), Color::Green)
            ));
        }
        if result.missing_skills.is_empty() {
            output.push_str("Missing: none\n");
        } else {
            output.push_str(&format!(
                "Missing: {}\n",
                self.colorize(&result.missing_skills.join(", "), Color::Red)
            ));
        }

        if !outcome.snippets.is_empty() {
            output.push_str(&self.format_header("Top Matching Resume Snippets", 2));
            for (i, snippet) in outcome.snippets.iter().enumerate() {
                output.push_str(&format!(
                    "{}. [{:.2}] {}\n",
                    i + 1,
                    snippet.similarity,
                    preview(&snippet.text, SNIPPET_PREVIEW_CHARS)
                ));
            }
        }

        if self.show_trace {
            output.push_str(&self.format_trace(&outcome.trace));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(outcome)?)
        } else {
            Ok(serde_json::to_string(outcome)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

pub fn generate_output(
    outcome: &AnalysisOutcome,
    format: OutputFormat,
    use_colors: bool,
    show_trace: bool,
) -> Result<String> {
    let formatter: Box<dyn OutputFormatter> = match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, show_trace)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    };
    formatter.format_outcome(outcome)
}

/// First `max_chars` characters, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

pub fn save_output_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_report_filename(resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    format!("{}_match_report{}.pdf", base_name, timestamp_suffix)
}
