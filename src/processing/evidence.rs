//! Nearest-neighbour ranking of résumé spans against the job vector

use crate::processing::embeddings::cosine_similarity;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceRanker;

impl EvidenceRanker {
    /// Top `k` candidates by cosine similarity to `query`, best first.
    /// Ties keep their input order.
    ///
    /// Panics if `texts` and `vectors` differ in length.
    pub fn rank(&self, query: &[f32], texts: &[String], vectors: &[Vec<f32>], k: usize) -> Vec<Snippet> {
        assert_eq!(
            texts.len(),
            vectors.len(),
            "every candidate text needs exactly one vector"
        );

        let mut snippets: Vec<Snippet> = texts
            .iter()
            .zip(vectors.iter())
            .map(|(text, vector)| Snippet {
                text: text.clone(),
                similarity: cosine_similarity(query, vector),
            })
            .collect();

        snippets.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        snippets.truncate(k);
        snippets
    }
}
