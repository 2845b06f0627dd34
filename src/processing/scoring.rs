//! Weighted semantic + skill-overlap scoring

use crate::config::ScoringConfig;
use crate::processing::embeddings::cosine_similarity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weights of the combined score. The defaults (0.7 semantic, 0.3 skills)
/// are the standard formula; any other values change every score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f32,
    pub skills: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            skills: 0.3,
        }
    }
}

impl From<&ScoringConfig> for ScoringWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            semantic: config.semantic_weight,
            skills: config.skill_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Cosine similarity clamped to `[0, 1]`.
    pub similarity: f32,
    pub jaccard: f32,
    /// Percentage in `[0, 100]`.
    pub score: f32,
    /// In `[0.5, 1]`.
    pub confidence: f32,
    /// Job skills the résumé lacks, sorted.
    pub missing_skills: Vec<String>,
    pub skill_overlap: usize,
    pub skill_union: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        resume_vec: &[f32],
        job_vec: &[f32],
        resume_skills: &BTreeSet<String>,
        job_skills: &BTreeSet<String>,
    ) -> MatchResult {
        let similarity = cosine_similarity(resume_vec, job_vec).clamp(0.0, 1.0);

        let resume_skills = lowercase_set(resume_skills);
        let job_skills = lowercase_set(job_skills);
        let skill_overlap = resume_skills.intersection(&job_skills).count();
        let skill_union = resume_skills.union(&job_skills).count().max(1);
        let jaccard = jaccard(&resume_skills, &job_skills);

        let raw = self.weights.semantic * similarity + self.weights.skills * jaccard;
        let score = raw.clamp(0.0, 1.0) * 100.0;
        let confidence = 0.5 + 0.5 * similarity.min(1.0);

        let missing_skills: Vec<String> = job_skills.difference(&resume_skills).cloned().collect();

        let explanation = format!(
            "Semantic similarity: {:.2}. Skill overlap: {}/{}. Combined score: {:.1}%.",
            similarity, skill_overlap, skill_union, score
        );

        MatchResult {
            similarity,
            jaccard,
            score,
            confidence,
            missing_skills,
            skill_overlap,
            skill_union,
            explanation,
        }
    }
}

/// Jaccard index of two sets; two empty sets score 0.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

fn lowercase_set(skills: &BTreeSet<String>) -> BTreeSet<String> {
    skills.iter().map(|s| s.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_vectors_partial_skills() {
        let engine = ScoringEngine::default();
        let v = vec![0.6, 0.8, 0.0];
        let result = engine.score(&v, &v, &set(&["python", "sql"]), &set(&["python", "aws"]));

        assert_relative_eq!(result.similarity, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.jaccard, 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(result.score, 80.0, epsilon = 1e-3);
        assert_relative_eq!(result.confidence, 1.0, epsilon = 1e-6);
        assert_eq!(result.missing_skills, vec!["aws".to_string()]);
        assert_eq!(
            result.explanation,
            "Semantic similarity: 1.00. Skill overlap: 1/3. Combined score: 80.0%."
        );
    }

    #[test]
    fn test_zero_resume_vector_scores_only_skills() {
        let engine = ScoringEngine::default();
        let zero = vec![0.0; 4];
        let job = vec![0.5, 0.5, 0.5, 0.5];
        let result = engine.score(&zero, &job, &set(&[]), &set(&["docker"]));

        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.missing_skills, vec!["docker".to_string()]);
        assert_eq!(
            result.explanation,
            "Semantic similarity: 0.00. Skill overlap: 0/1. Combined score: 0.0%."
        );
    }

    #[test]
    fn test_degenerate_inputs_are_well_formed() {
        let engine = ScoringEngine::default();
        let result = engine.score(&[], &[], &set(&[]), &set(&[]));

        assert_eq!(result.score, 0.0);
        assert_eq!(result.jaccard, 0.0);
        assert!(result.missing_skills.is_empty());
        assert!(result.explanation.contains("0/1"));
    }

    #[test]
    fn test_negative_cosine_is_clamped() {
        let engine = ScoringEngine::default();
        let result = engine.score(&[1.0, 0.0], &[-1.0, 0.0], &set(&["go"]), &set(&["go"]));

        assert_eq!(result.similarity, 0.0);
        assert_relative_eq!(result.score, 30.0, epsilon = 1e-4);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_skill_case_is_ignored() {
        let engine = ScoringEngine::default();
        let v = vec![1.0];
        let result = engine.score(&v, &v, &set(&["Python"]), &set(&["python", "AWS"]));

        assert_eq!(result.skill_overlap, 1);
        assert_eq!(result.missing_skills, vec!["aws".to_string()]);
    }

    #[test]
    fn test_ranges_hold() {
        let engine = ScoringEngine::new(ScoringWeights {
            semantic: 0.9,
            skills: 0.9,
        });
        let v = vec![1.0, 1.0];
        let result = engine.score(&v, &v, &set(&["a"]), &set(&["a"]));
        assert!((0.0..=100.0).contains(&result.score));
        assert!((0.5..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_jaccard_properties() {
        let a = set(&["python", "sql"]);
        let b = set(&["python", "aws", "docker"]);

        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_relative_eq!(jaccard(&a, &b), 0.25);
    }

    #[test]
    fn test_score_uses_same_jaccard() {
        let engine = ScoringEngine::default();
        let v = vec![1.0, 0.0];
        let cases = [
            (set(&["Python", "SQL"]), set(&["python", "aws", "docker"])),
            (set(&[]), set(&[])),
            (set(&["go"]), set(&[])),
        ];
        for (resume, job) in &cases {
            let result = engine.score(&v, &v, resume, job);
            let expected = jaccard(&lowercase_set(resume), &lowercase_set(job));
            assert_eq!(result.jaccard, expected);
        }
    }

    #[test]
    fn test_no_resume_skills_scores_semantic_part_only() {
        let engine = ScoringEngine::default();
        let v = vec![0.6, 0.8];
        let result = engine.score(&v, &v, &set(&[]), &set(&["python", "aws"]));

        assert_eq!(result.jaccard, 0.0);
        assert_relative_eq!(result.score, 70.0, epsilon = 1e-3);
        assert_eq!(result.missing_skills, vec!["aws".to_string(), "python".to_string()]);
    }

    #[test]
    fn test_default_config_weights_are_standard_formula() {
        let weights = ScoringWeights::from(&ScoringConfig::default());
        assert_eq!(weights, ScoringWeights::default());
        assert_eq!(weights.semantic, 0.7);
        assert_eq!(weights.skills, 0.3);
    }
}
