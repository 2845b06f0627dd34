//! Lightweight fact extraction: contact details and known skills

use crate::processing::text_processor::TextProcessor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Skills recognized in résumés and job descriptions. Every entry must be a
/// single token the skill tokenizer can produce.
pub const SKILL_VOCABULARY: &[&str] = &[
    // programming
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "sql",
    // data
    "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch", "nlp", "spacy", "nltk",
    // cloud/devops
    "aws", "azure", "gcp", "docker", "kubernetes", "git",
    // web
    "react", "node", "streamlit", "flask", "django",
];

const MAX_NAME_WORDS: usize = 5;
const MIN_NAME_WORDS: usize = 2;
const MAX_NAME_CHARS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub raw_text: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFacts {
    pub raw_text: String,
    pub skills: BTreeSet<String>,
}

pub struct FactExtractor {
    text_processor: TextProcessor,
    email_regex: Regex,
    phone_regex: Regex,
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FactExtractor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(r"\+?\d[\d\- \t]{7,}\d").expect("Invalid phone regex");

        Self {
            text_processor: TextProcessor::new(),
            email_regex,
            phone_regex,
        }
    }

    pub fn extract_facts(&self, raw_text: &str) -> ExtractedDocument {
        ExtractedDocument {
            raw_text: raw_text.to_string(),
            name: self.extract_name(raw_text),
            email: self.extract_email(raw_text),
            phone: self.extract_phone(raw_text),
            skills: self.extract_skills(raw_text),
        }
    }

    pub fn parse_job_description(&self, text: &str) -> JobFacts {
        JobFacts {
            raw_text: text.to_string(),
            skills: self.extract_skills(text),
        }
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email_regex.find(text).map(|m| m.as_str().to_string())
    }

    pub fn extract_phone(&self, text: &str) -> Option<String> {
        self.phone_regex.find(text).map(|m| m.as_str().to_string())
    }

    /// The first non-empty line, if it is shaped like a person's name.
    pub fn extract_name(&self, text: &str) -> Option<String> {
        let first_line = text.lines().map(str::trim).find(|line| !line.is_empty())?;

        let words = first_line.split_whitespace().count();
        if (MIN_NAME_WORDS..=MAX_NAME_WORDS).contains(&words)
            && first_line.chars().count() <= MAX_NAME_CHARS
        {
            Some(first_line.to_string())
        } else {
            None
        }
    }

    pub fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        let tokens = self.text_processor.skill_tokens(text);
        SKILL_VOCABULARY
            .iter()
            .filter(|skill| tokens.contains(**skill))
            .map(|skill| skill.to_string())
            .collect()
    }
}
