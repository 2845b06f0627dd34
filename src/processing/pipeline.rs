//! Five-stage matching pipeline with an observable trace

use crate::config::{Config, EvidenceConfig};
use crate::error::{Result, ResumeMatchError};
use crate::input::text_extractor::{PdfExtractor, TextExtractor};
use crate::processing::embeddings::{select_provider, EmbeddingBackend, EmbeddingProvider};
use crate::processing::enhancer::{ContentEnhancer, Enhancement, LocalContentEnhancer};
use crate::processing::evidence::{EvidenceRanker, Snippet};
use crate::processing::facts::{ExtractedDocument, FactExtractor, JobFacts};
use crate::processing::scoring::{MatchResult, ScoringEngine, ScoringWeights};
use crate::processing::text_processor::TextProcessor;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageName {
    ParseResume,
    ParseJob,
    EnhanceContent,
    MatchAndScore,
    BuildTrace,
}

impl StageName {
    pub const ORDER: [StageName; 5] = [
        StageName::ParseResume,
        StageName::ParseJob,
        StageName::EnhanceContent,
        StageName::MatchAndScore,
        StageName::BuildTrace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ParseResume => "ParseResume",
            StageName::ParseJob => "ParseJob",
            StageName::EnhanceContent => "EnhanceContent",
            StageName::MatchAndScore => "MatchAndScore",
            StageName::BuildTrace => "BuildTrace",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: StageName,
    pub inputs: Map<String, Value>,
    pub outputs: Map<String, Value>,
    pub reasoning: String,
}

impl StageResult {
    fn new(name: StageName, inputs: Value, outputs: Value, reasoning: String) -> Self {
        Self {
            name,
            inputs: into_map(inputs),
            outputs: into_map(outputs),
            reasoning,
        }
    }

    /// Whether the stage reported taking a fallback path.
    pub fn mentions_fallback(&self) -> bool {
        self.reasoning.to_lowercase().contains("fallback")
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTrace {
    pub stages: Vec<StageResult>,
    pub edges: Vec<(StageName, StageName)>,
}

impl PipelineTrace {
    /// Edges are the consecutive pairs of stage names, in run order.
    pub fn from_stages(stages: Vec<StageResult>) -> Self {
        let edges = stages
            .windows(2)
            .map(|pair| (pair[0].name, pair[1].name))
            .collect();
        Self { stages, edges }
    }

    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|s| s.name).collect()
    }

    pub fn stage(&self, name: StageName) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// The résumé as handed to the pipeline.
#[derive(Clone)]
pub enum ResumeSource {
    Pdf(Vec<u8>),
    PlainText(String),
}

impl ResumeSource {
    fn kind(&self) -> &'static str {
        match self {
            ResumeSource::Pdf(_) => "pdf",
            ResumeSource::PlainText(_) => "text",
        }
    }

    fn len(&self) -> usize {
        match self {
            ResumeSource::Pdf(bytes) => bytes.len(),
            ResumeSource::PlainText(text) => text.len(),
        }
    }
}

impl fmt::Debug for ResumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResumeSource::{}({} bytes)", self.kind(), self.len())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub resume: ExtractedDocument,
    pub job: JobFacts,
    pub enhancement: Enhancement,
    pub match_result: MatchResult,
    pub snippets: Vec<Snippet>,
    pub embedding_backend: EmbeddingBackend,
    pub trace: PipelineTrace,
}

pub struct PipelineOrchestrator {
    pdf_extractor: PdfExtractor,
    facts: FactExtractor,
    text_processor: TextProcessor,
    embedder: Box<dyn EmbeddingProvider>,
    enhancer: Box<dyn ContentEnhancer>,
    scoring: ScoringEngine,
    ranker: EvidenceRanker,
    evidence: EvidenceConfig,
}

struct Scored {
    match_result: MatchResult,
    snippets: Vec<Snippet>,
}

impl PipelineOrchestrator {
    pub fn new(
        embedder: Box<dyn EmbeddingProvider>,
        enhancer: Box<dyn ContentEnhancer>,
        scoring: ScoringEngine,
        evidence: EvidenceConfig,
    ) -> Self {
        Self {
            pdf_extractor: PdfExtractor,
            facts: FactExtractor::new(),
            text_processor: TextProcessor::new(),
            embedder,
            enhancer,
            scoring,
            ranker: EvidenceRanker,
            evidence,
        }
    }

    /// Provider chosen from config and environment, local enhancer.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            select_provider(&config.embedding),
            Box::new(LocalContentEnhancer::new()),
            ScoringEngine::new(ScoringWeights::from(&config.scoring)),
            config.evidence.clone(),
        )
    }

    pub fn embedding_backend(&self) -> EmbeddingBackend {
        self.embedder.backend()
    }

    /// Run all stages in order. The first failing stage aborts the run.
    pub fn run(&self, resume: &ResumeSource, job_text: &str) -> Result<AnalysisOutcome> {
        let mut stages = Vec::with_capacity(StageName::ORDER.len());

        let (stage, document) = self.parse_resume(resume)?;
        stages.push(stage);

        let (stage, job) = self.parse_job(job_text);
        stages.push(stage);

        let (stage, enhancement) = self.enhance_content(&document)?;
        stages.push(stage);

        let (stage, scored) = self.match_and_score(&document, &job)?;
        stages.push(stage);

        let trace = self.build_trace(stages);

        Ok(AnalysisOutcome {
            resume: document,
            job,
            enhancement,
            match_result: scored.match_result,
            snippets: scored.snippets,
            embedding_backend: self.embedder.backend(),
            trace,
        })
    }

    fn parse_resume(&self, resume: &ResumeSource) -> Result<(StageResult, ExtractedDocument)> {
        info!("Stage {}: extracting resume facts", StageName::ParseResume);

        let raw_text = match resume {
            ResumeSource::Pdf(bytes) => self.pdf_extractor.extract(bytes)?,
            ResumeSource::PlainText(text) => text.clone(),
        };
        let document = self.facts.extract_facts(&raw_text);

        let reasoning = format!(
            "Read {} characters from the {} resume; {} of 3 contact fields found, {} known skills matched.",
            raw_text.chars().count(),
            resume.kind(),
            [&document.name, &document.email, &document.phone]
                .iter()
                .filter(|f| f.is_some())
                .count(),
            document.skills.len()
        );
        let stage = StageResult::new(
            StageName::ParseResume,
            json!({ "source": resume.kind(), "bytes": resume.len() }),
            json!({
                "name": document.name,
                "email": document.email,
                "phone": document.phone,
                "skills": document.skills,
                "characters": raw_text.chars().count(),
            }),
            reasoning,
        );
        debug!("{}: {}", stage.name, stage.reasoning);
        Ok((stage, document))
    }

    fn parse_job(&self, job_text: &str) -> (StageResult, JobFacts) {
        info!("Stage {}: extracting job requirements", StageName::ParseJob);

        let job = self.facts.parse_job_description(job_text);
        let reasoning = if job.skills.is_empty() {
            "No known skills found in the job description; skill overlap will not contribute."
                .to_string()
        } else {
            format!("Job description requires {} known skills.", job.skills.len())
        };
        let stage = StageResult::new(
            StageName::ParseJob,
            json!({ "characters": job_text.chars().count() }),
            json!({ "skills": job.skills }),
            reasoning,
        );
        debug!("{}: {}", stage.name, stage.reasoning);
        (stage, job)
    }

    fn enhance_content(&self, document: &ExtractedDocument) -> Result<(StageResult, Enhancement)> {
        info!("Stage {}: enhancing resume content", StageName::EnhanceContent);

        let enhancement = self.enhancer.enhance(&document.raw_text)?;
        let reasoning = if enhancement.used_fallback {
            format!(
                "No language model configured; {} fallback normalized the resume text.",
                enhancement.enhancer
            )
        } else {
            format!("Resume text rewritten by {}.", enhancement.enhancer)
        };
        let stage = StageResult::new(
            StageName::EnhanceContent,
            json!({ "characters": document.raw_text.chars().count() }),
            json!({
                "enhancer": enhancement.enhancer,
                "used_fallback": enhancement.used_fallback,
                "characters": enhancement.text.chars().count(),
            }),
            reasoning,
        );
        debug!("{}: {}", stage.name, stage.reasoning);
        Ok((stage, enhancement))
    }

    fn match_and_score(
        &self,
        document: &ExtractedDocument,
        job: &JobFacts,
    ) -> Result<(StageResult, Scored)> {
        info!("Stage {}: embedding and scoring", StageName::MatchAndScore);

        let spans = self.text_processor.split_evidence_spans(
            &document.raw_text,
            self.evidence.min_span_words,
            self.evidence.max_candidates,
        );

        let mut texts = Vec::with_capacity(spans.len() + 2);
        texts.push(document.raw_text.clone());
        texts.push(job.raw_text.clone());
        texts.extend(spans.iter().cloned());

        let vectors = self.embedder.embed(&texts)?;
        self.check_vectors(&vectors, texts.len())?;

        let match_result =
            self.scoring
                .score(&vectors[0], &vectors[1], &document.skills, &job.skills);
        let snippets = self
            .ranker
            .rank(&vectors[1], &spans, &vectors[2..], self.evidence.top_k);

        let backend = self.embedder.backend();
        let reasoning = format!(
            "Embedded {} texts with {}. {} Ranked {} of {} evidence spans.",
            texts.len(),
            backend,
            match_result.explanation,
            snippets.len(),
            spans.len()
        );
        let stage = StageResult::new(
            StageName::MatchAndScore,
            json!({
                "resume_skills": document.skills,
                "job_skills": job.skills,
                "candidate_spans": spans.len(),
                "top_k": self.evidence.top_k,
            }),
            json!({
                "embedding_backend": backend,
                "dimension": vectors[0].len(),
                "similarity": match_result.similarity,
                "jaccard": match_result.jaccard,
                "score": match_result.score,
                "confidence": match_result.confidence,
                "missing_skills": match_result.missing_skills,
                "snippets": snippets.len(),
            }),
            reasoning,
        );
        debug!("{}: {}", stage.name, stage.reasoning);

        Ok((
            stage,
            Scored {
                match_result,
                snippets,
            },
        ))
    }

    fn check_vectors(&self, vectors: &[Vec<f32>], expected_count: usize) -> Result<()> {
        if vectors.len() != expected_count {
            return Err(ResumeMatchError::Embedding(format!(
                "expected {} vectors, provider returned {}",
                expected_count,
                vectors.len()
            )));
        }

        let expected = match (self.embedder.dimension(), vectors.first()) {
            (Some(dimension), _) => dimension,
            (None, Some(first)) => first.len(),
            (None, None) => return Ok(()),
        };
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(ResumeMatchError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }
        Ok(())
    }

    fn build_trace(&self, mut stages: Vec<StageResult>) -> PipelineTrace {
        info!("Stage {}: assembling trace", StageName::BuildTrace);

        let fallbacks = stages.iter().filter(|s| s.mentions_fallback()).count();
        let completed: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        let stage = StageResult::new(
            StageName::BuildTrace,
            json!({ "stages": completed }),
            json!({ "stages": completed.len() + 1, "edges": completed.len() }),
            format!(
                "Linked {} stages into a linear trace; {} reported a fallback path.",
                completed.len() + 1,
                fallbacks
            ),
        );
        debug!("{}: {}", stage.name, stage.reasoning);
        stages.push(stage);

        PipelineTrace::from_stages(stages)
    }
}
