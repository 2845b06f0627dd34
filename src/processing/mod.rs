//! Matching pipeline: facts, embeddings, scoring, evidence and gap analysis

pub mod embeddings;
pub mod enhancer;
pub mod evidence;
pub mod facts;
pub mod gaps;
pub mod gemini;
pub mod pipeline;
pub mod scoring;
pub mod text_processor;
