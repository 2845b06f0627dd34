//! Embedding providers and vector similarity

use crate::config::{EmbeddingConfig, ProviderChoice};
use crate::error::{Result, ResumeMatchError};
use crate::processing::gemini::RemoteEmbeddingProvider;
use crate::processing::text_processor::TextProcessor;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

pub const DEFAULT_LOCAL_DIMENSION: usize = 768;

/// Which strategy produced the vectors of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbeddingBackend {
    Remote { model: String },
    LocalHashing { dimension: usize },
}

impl EmbeddingBackend {
    pub fn is_fallback(&self) -> bool {
        matches!(self, EmbeddingBackend::LocalHashing { .. })
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::Remote { model } => write!(f, "remote ({})", model),
            EmbeddingBackend::LocalHashing { dimension } => {
                write!(f, "local hashing fallback ({} dims)", dimension)
            }
        }
    }
}

/// Turns text into fixed-length vectors.
///
/// `embed` returns exactly one vector per input, in input order. Every
/// vector returned by one provider instance has the same length.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| ResumeMatchError::Embedding("provider returned no vector".to_string()))
    }

    /// Vector length, when known before the first call.
    fn dimension(&self) -> Option<usize>;

    fn backend(&self) -> EmbeddingBackend;
}

/// Deterministic bag-of-tokens embedding.
///
/// Each token is hashed with SHA-1; the first four digest bytes, read
/// big-endian, pick a bucket. The count vector is L2-normalized.
pub struct LocalHashingEmbeddingProvider {
    dimension: usize,
    text_processor: TextProcessor,
}

impl Default for LocalHashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_DIMENSION)
    }
}

impl LocalHashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "embedding dimension must be positive");
        Self {
            dimension,
            text_processor: TextProcessor::new(),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha1::digest(token.as_bytes());
        let index = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        index as usize % self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let lowered = text.trim().to_lowercase();
        let mut vector = vec![0.0f32; self.dimension];

        for token in self.text_processor.embedding_tokens(&lowered) {
            vector[self.bucket(token)] += 1.0;
        }

        let norm = l2_norm(&vector);
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

impl EmbeddingProvider for LocalHashingEmbeddingProvider {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn backend(&self) -> EmbeddingBackend {
        EmbeddingBackend::LocalHashing {
            dimension: self.dimension,
        }
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with a zero-norm denominator replaced by 1.
///
/// Panics if the vectors differ in length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine similarity requires vectors of equal dimension"
    );

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let denominator = l2_norm(a) * l2_norm(b);
    let denominator = if denominator == 0.0 { 1.0 } else { denominator };

    dot_product / denominator
}

/// Credentials and overrides read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct ProviderEnv {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl ProviderEnv {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY")),
            model: non_empty("GEMINI_EMBED_MODEL"),
        }
    }
}

pub fn select_provider(config: &EmbeddingConfig) -> Box<dyn EmbeddingProvider> {
    select_provider_with(config, &ProviderEnv::from_env())
}

/// Remote when requested (or `auto`) and a key is available, local otherwise.
/// A remote client that cannot be constructed degrades to local.
pub fn select_provider_with(config: &EmbeddingConfig, env: &ProviderEnv) -> Box<dyn EmbeddingProvider> {
    let local = || -> Box<dyn EmbeddingProvider> {
        Box::new(LocalHashingEmbeddingProvider::new(config.dimension))
    };

    if config.provider == ProviderChoice::Local {
        info!("Using local hashing embeddings (configured)");
        return local();
    }

    let api_key = match &env.api_key {
        Some(key) => key.clone(),
        None => {
            if config.provider == ProviderChoice::Remote {
                warn!("Remote embeddings requested but no API key is set; using local fallback");
            } else {
                info!("No embedding API key found; using local hashing embeddings");
            }
            return local();
        }
    };

    let model = env.model.clone().unwrap_or_else(|| config.model.clone());
    match RemoteEmbeddingProvider::new(api_key, &model, config) {
        Ok(provider) => {
            info!("Using remote embeddings: {}", provider.model());
            Box::new(provider)
        }
        Err(e) => {
            warn!("{}; using local fallback", e);
            local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_hot_bucket(provider: &LocalHashingEmbeddingProvider, text: &str) -> usize {
        let v = provider.embed_one(text).unwrap();
        v.iter().position(|x| *x > 0.0).unwrap()
    }

    #[test]
    fn test_local_buckets_are_stable() {
        let provider = LocalHashingEmbeddingProvider::default();
        assert_eq!(one_hot_bucket(&provider, "rust"), 271);
        assert_eq!(one_hot_bucket(&provider, "Python"), 123);
        assert_eq!(one_hot_bucket(&provider, "  c++  "), 426);
    }

    #[test]
    fn test_local_embedding_is_deterministic_and_normalized() {
        let provider = LocalHashingEmbeddingProvider::default();
        let text = "Senior Rust engineer, distributed systems, Kubernetes";
        let a = provider.embed_one(text).unwrap();
        let b = LocalHashingEmbeddingProvider::new(768).embed_one(text).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 768);
        assert_relative_eq!(l2_norm(&a), 1.0, epsilon = 1e-5);
        assert!(a.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let provider = LocalHashingEmbeddingProvider::new(16);
        let vectors = provider
            .embed(&["".to_string(), "   ".to_string(), "!!!".to_string()])
            .unwrap();

        assert_eq!(vectors.len(), 3);
        for v in vectors {
            assert_eq!(v, vec![0.0; 16]);
        }
    }

    #[test]
    fn test_repeated_tokens_accumulate() {
        let provider = LocalHashingEmbeddingProvider::default();
        let v = provider.embed_one("rust rust python").unwrap();
        assert_relative_eq!(v[271], 2.0 / 5.0f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(v[123], 1.0 / 5.0f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_properties() {
        let provider = LocalHashingEmbeddingProvider::default();
        let v = provider.embed_one("python sql docker").unwrap();
        let zero = vec![0.0; v.len()];

        assert_relative_eq!(cosine_similarity(&v, &v), 1.0, epsilon = 1e-5);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
    }

    #[test]
    #[should_panic(expected = "equal dimension")]
    fn test_cosine_rejects_mismatched_lengths() {
        cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_selection_without_key_is_local() {
        let config = EmbeddingConfig::default();
        let provider = select_provider_with(&config, &ProviderEnv::default());
        assert_eq!(provider.backend(), EmbeddingBackend::LocalHashing { dimension: 768 });
        assert!(provider.backend().is_fallback());
    }

    #[test]
    fn test_selection_with_key_is_remote() {
        let config = EmbeddingConfig::default();
        let env = ProviderEnv {
            api_key: Some("test-key".to_string()),
            model: Some("embedding-001".to_string()),
        };
        let provider = select_provider_with(&config, &env);
        assert_eq!(
            provider.backend(),
            EmbeddingBackend::Remote {
                model: "models/embedding-001".to_string()
            }
        );
    }

    #[test]
    fn test_configured_local_ignores_key() {
        let config = EmbeddingConfig {
            provider: ProviderChoice::Local,
            dimension: 64,
            ..EmbeddingConfig::default()
        };
        let env = ProviderEnv {
            api_key: Some("test-key".to_string()),
            model: None,
        };
        let provider = select_provider_with(&config, &env);
        assert_eq!(provider.dimension(), Some(64));
    }
}
