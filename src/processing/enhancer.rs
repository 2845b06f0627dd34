//! Résumé content enhancement

use crate::error::Result;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub text: String,
    /// Name of the implementation that produced `text`.
    pub enhancer: String,
    /// True when no language model was involved.
    pub used_fallback: bool,
}

/// Text in, text out. Implementations may call out to a language model.
pub trait ContentEnhancer: Send + Sync {
    fn enhance(&self, text: &str) -> Result<Enhancement>;
}

/// Deterministic cleanup used when no model is configured.
#[derive(Default)]
pub struct LocalContentEnhancer {
    text_processor: TextProcessor,
}

impl LocalContentEnhancer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentEnhancer for LocalContentEnhancer {
    fn enhance(&self, text: &str) -> Result<Enhancement> {
        let normalized = self.text_processor.normalize_unicode(text);

        let mut lines: Vec<String> = Vec::new();
        let mut previous_blank = true;
        for line in normalized.lines() {
            let line = self.text_processor.normalize_whitespace(line);
            if line.is_empty() {
                if !previous_blank {
                    lines.push(String::new());
                }
                previous_blank = true;
            } else {
                lines.push(line);
                previous_blank = false;
            }
        }
        while lines.last().map_or(false, |l| l.is_empty()) {
            lines.pop();
        }

        Ok(Enhancement {
            text: lines.join("\n"),
            enhancer: "local-normalizer".to_string(),
            used_fallback: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_enhancer_normalizes() {
        let enhancer = LocalContentEnhancer::new();
        let input = "\n\nJane   Doe\n\n\n\u{2022} Built\u{00A0}APIs \u{2014} fast\n   \n";
        let result = enhancer.enhance(input).unwrap();

        assert_eq!(result.text, "Jane Doe\n\n- Built APIs - fast");
        assert!(result.used_fallback);
        assert_eq!(result.enhancer, "local-normalizer");
    }

    #[test]
    fn test_local_enhancer_empty_input() {
        let result = LocalContentEnhancer::new().enhance("").unwrap();
        assert_eq!(result.text, "");
    }
}
