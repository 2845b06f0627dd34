//! Text processing and normalization

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Lines longer than this are split into sentences before ranking.
const LONG_SPAN_CHARS: usize = 160;

pub struct TextProcessor {
    skill_token_regex: Regex,
    embedding_token_regex: Regex,
    whitespace_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let skill_token_regex = Regex::new(r"[a-z0-9#+.\-]+").expect("Invalid skill token regex");

        let embedding_token_regex =
            Regex::new(r"[a-z0-9_#+.\-]+").expect("Invalid embedding token regex");

        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            skill_token_regex,
            embedding_token_regex,
            whitespace_regex,
        }
    }

    /// Lowercased candidate skill tokens, exactly as matched.
    ///
    /// Trailing punctuation that the token pattern accepts stays attached, so
    /// `"Python."` yields `python.` and never `python`.
    pub fn skill_tokens(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.skill_token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Tokens fed to the hashing embedder, in document order.
    pub fn embedding_tokens<'a>(&self, lowered: &'a str) -> Vec<&'a str> {
        self.embedding_token_regex
            .find_iter(lowered)
            .map(|m| m.as_str())
            .collect()
    }

    /// Split text into sentences
    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Candidate evidence spans for snippet ranking.
    ///
    /// Non-empty lines become spans; long lines are split into sentences.
    /// Spans with fewer than `min_words` words are dropped, duplicates keep
    /// their first occurrence, and at most `max_candidates` are returned.
    pub fn split_evidence_spans(
        &self,
        text: &str,
        min_words: usize,
        max_candidates: usize,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut spans = Vec::new();

        for line in text.lines() {
            let line = self.normalize_whitespace(line);
            if line.is_empty() {
                continue;
            }

            let pieces = if line.chars().count() > LONG_SPAN_CHARS {
                self.split_sentences(&line)
            } else {
                vec![line]
            };

            for piece in pieces {
                if spans.len() >= max_candidates {
                    return spans;
                }
                if piece.unicode_words().count() < min_words {
                    continue;
                }
                if seen.insert(piece.clone()) {
                    spans.push(piece);
                }
            }
        }

        spans
    }

    /// Collapse whitespace runs into single spaces and trim.
    pub fn normalize_whitespace(&self, text: &str) -> String {
        self.whitespace_regex.replace_all(text, " ").trim().to_string()
    }

    /// Map typographic punctuation to plain ASCII equivalents.
    pub fn normalize_unicode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
                '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
                '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => {
                    out.push('-')
                }
                '\u{2022}' | '\u{25AA}' | '\u{25CF}' | '\u{2043}' => out.push('-'),
                '\u{2026}' => out.push_str("..."),
                '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{2009}' => out.push(' '),
                '\u{200B}' | '\u{FEFF}' => {}
                _ => out.push(c),
            }
        }
        out
    }
}
