//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document format error: {0}")]
    DocumentFormat(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Embedding provider construction failed: {0}")]
    ProviderConstruction(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Content enhancement error: {0}")]
    Enhancement(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rendering error: {0}")]
    Rendering(String),
}

pub type Result<T> = std::result::Result<T, ResumeMatchError>;

impl ResumeMatchError {
    /// One short message per failure kind, safe to show to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResumeMatchError::Io(_) => "A file could not be read or written.",
            ResumeMatchError::DocumentFormat(_) => {
                "The uploaded resume could not be read as a PDF document."
            }
            ResumeMatchError::UnsupportedFormat(_) => "This file type is not supported.",
            ResumeMatchError::Embedding(_) | ResumeMatchError::DimensionMismatch { .. } => {
                "Text embedding failed; please try again."
            }
            ResumeMatchError::ProviderConstruction(_) => {
                "The embedding service is unavailable."
            }
            ResumeMatchError::Enhancement(_) => "Content enhancement failed.",
            ResumeMatchError::Configuration(_) => "The configuration file is invalid.",
            ResumeMatchError::Serialization(_) => "Data could not be serialized.",
            ResumeMatchError::InvalidInput(_) => "The provided input is invalid.",
            ResumeMatchError::Rendering(_) => "The PDF document could not be generated.",
        }
    }
}

impl From<printpdf::Error> for ResumeMatchError {
    fn from(err: printpdf::Error) -> Self {
        ResumeMatchError::Rendering(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_format_message_hides_detail() {
        let err = ResumeMatchError::DocumentFormat("invalid file header at byte 0".to_string());
        assert!(err.to_string().contains("invalid file header"));
        assert!(!err.user_message().contains("byte 0"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = ResumeMatchError::DimensionMismatch { expected: 768, actual: 256 };
        assert_eq!(err.to_string(), "Embedding dimension mismatch: expected 768, got 256");
    }
}
