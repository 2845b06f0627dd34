//! Configuration management for the resume matcher

use crate::error::{Result, ResumeMatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub scoring: ScoringConfig,
    pub evidence: EvidenceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderChoice,
    /// Remote model name; `GEMINI_EMBED_MODEL` overrides it at runtime.
    pub model: String,
    /// Dimension of the local hashing fallback.
    pub dimension: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// Remote when a credential is present, local otherwise.
    Auto,
    Local,
    Remote,
}

/// Score weights. The defaults are the standard 0.7/0.3 formula; other
/// values are honoured but change every score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub semantic_weight: f32,
    pub skill_weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub top_k: usize,
    pub min_span_words: usize,
    pub max_candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Auto,
            model: "text-embedding-004".to_string(),
            dimension: 768,
            batch_size: 32,
            timeout_secs: 30,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            skill_weight: 0.3,
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_span_words: 3,
            max_candidates: 200,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first use.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeMatchError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeMatchError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(ResumeMatchError::Configuration(
                "embedding.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(ResumeMatchError::Configuration(
                "embedding.batch_size must be greater than zero".to_string(),
            ));
        }
        let weights = [self.scoring.semantic_weight, self.scoring.skill_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ResumeMatchError::Configuration(
                "scoring weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
