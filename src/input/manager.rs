//! Input manager for résumé and job description files

use crate::error::{Result, ResumeMatchError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use crate::processing::pipeline::ResumeSource;
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Load a résumé. PDFs are handed to the pipeline as raw bytes so that
    /// extraction happens inside the `ParseResume` stage.
    pub async fn load_resume(&mut self, path: &Path) -> Result<ResumeSource> {
        Self::ensure_exists(path)?;

        match Self::detect_file_type(path)? {
            FileType::Pdf => {
                info!("Reading PDF resume: {}", path.display());
                let bytes = tokio::fs::read(path).await?;
                Ok(ResumeSource::Pdf(bytes))
            }
            FileType::Text | FileType::Markdown => {
                let text = self.load_text(path).await?;
                Ok(ResumeSource::PlainText(text))
            }
            FileType::Unknown => Err(Self::unsupported(path)),
        }
    }

    /// Load a job description as plain text.
    pub async fn load_job_text(&mut self, path: &Path) -> Result<String> {
        Self::ensure_exists(path)?;
        self.load_text(path).await
    }

    async fn load_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        let file_type = Self::detect_file_type(path)?;
        let bytes = tokio::fs::read(path).await?;

        let text = match file_type {
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(&bytes)?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(&bytes)?
            }
            FileType::Pdf | FileType::Unknown => return Err(Self::unsupported(path)),
        };

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    fn ensure_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ResumeMatchError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }
        Ok(())
    }

    fn detect_file_type(path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ResumeMatchError::InvalidInput(format!("File has no extension: {}", path.display()))
            })?;

        Ok(FileType::from_extension(extension))
    }

    fn unsupported(path: &Path) -> ResumeMatchError {
        ResumeMatchError::UnsupportedFormat(format!("Unsupported file type for: {}", path.display()))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_job_text_is_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, "Required: Rust and Docker").unwrap();

        let mut manager = InputManager::new();
        let first = manager.load_job_text(&path).await.unwrap();
        std::fs::write(&path, "changed on disk").unwrap();
        let second = manager.load_job_text(&path).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);

        manager.clear_cache();
        let third = manager.load_job_text(&path).await.unwrap();
        assert_eq!(third, "changed on disk");
    }

    #[tokio::test]
    async fn test_pdf_resume_stays_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 not really").unwrap();

        let mut manager = InputManager::new().with_cache(false);
        let source = manager.load_resume(&path).await.unwrap();
        assert!(matches!(source, ResumeSource::Pdf(ref bytes) if bytes.starts_with(b"%PDF")));
    }

    #[tokio::test]
    async fn test_pdf_job_description_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let mut manager = InputManager::new();
        let result = manager.load_job_text(&path).await;
        assert!(matches!(result, Err(ResumeMatchError::UnsupportedFormat(_))));
    }
}
