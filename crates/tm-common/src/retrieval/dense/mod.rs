pub mod config;
pub mod embedding;
pub mod hash_embedder;
#[cfg(feature = "semantic-search")]
pub mod minilm;
pub mod similarity;

pub use config::{EmbedderConfig, DEFAULT_EMBEDDING_DIMENSION};
pub use embedding::{Embedding, EmbeddingSource};
pub use hash_embedder::HashEmbedder;
#[cfg(feature = "semantic-search")]
pub use minilm::MiniLmEmbedder;
pub use similarity::cosine_similarity;

use thiserror::Error;
use tracing::{debug, warn};

use super::{rank_positions, validate_corpus, RetrievalError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("embedding inference failed: {0}")]
    Inference(String),
}

/// Text → vector model behind the dense index.
///
/// Implementations must be stateless for a fixed model: the same text always
/// maps to the same vector. `HashEmbedder` needs no model files;
/// `MiniLmEmbedder` (feature `semantic-search`) is the sentence model.
pub trait TextEmbedder: Send + Sync {
    /// 実装名（"hash" など）
    fn name(&self) -> &'static str;

    /// Model generation, logged with every index build.
    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str, source: EmbeddingSource) -> Result<Embedding, EmbedError>;

    /// Batch embedding; override when the backend has real batch inference.
    fn embed_batch(&self, texts: &[String], source: EmbeddingSource) -> Result<Vec<Embedding>, EmbedError> {
        texts.iter().map(|t| self.embed(t, source)).collect()
    }
}

/// Builds an embedder by name (`hash`, `minilm`). Unknown names, and a
/// `minilm` that cannot be loaded, fall back to the hash embedder.
pub fn create_embedder(name: &str, config: EmbedderConfig) -> Box<dyn TextEmbedder> {
    match name {
        "hash" => Box::new(HashEmbedder::new(config)),
        "minilm" => minilm_or_hash(config),
        other => {
            warn!(embedder = other, "unknown embedder; falling back to hash");
            Box::new(HashEmbedder::new(config))
        }
    }
}

#[cfg(feature = "semantic-search")]
fn minilm_or_hash(config: EmbedderConfig) -> Box<dyn TextEmbedder> {
    match MiniLmEmbedder::try_new() {
        Ok(model) => {
            if config.dimension != minilm::MINILM_DIMENSION {
                warn!(
                    configured = config.dimension,
                    model = minilm::MINILM_DIMENSION,
                    "minilm dimension is fixed; ignoring configured dimension"
                );
            }
            Box::new(model)
        }
        Err(err) => {
            warn!(error = %err, "failed to load minilm; falling back to hash");
            Box::new(HashEmbedder::new(config))
        }
    }
}

#[cfg(not(feature = "semantic-search"))]
fn minilm_or_hash(config: EmbedderConfig) -> Box<dyn TextEmbedder> {
    warn!("minilm needs the semantic-search feature; falling back to hash");
    Box::new(HashEmbedder::new(config))
}

struct DenseState {
    ids: Vec<String>,
    vectors: Vec<Embedding>,
}

/// Semantic index: one embedding per document, queried by cosine similarity.
pub struct DenseIndex {
    embedder: Box<dyn TextEmbedder>,
    state: Option<DenseState>,
}

impl DenseIndex {
    pub fn new(embedder: Box<dyn TextEmbedder>) -> Self {
        Self {
            embedder,
            state: None,
        }
    }

    pub fn embedder(&self) -> &dyn TextEmbedder {
        self.embedder.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    pub fn len(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> &[String] {
        self.state.as_ref().map_or(&[], |s| s.ids.as_slice())
    }

    /// Replaces the index content. Vectors from a previous build are dropped
    /// before the new ones become visible.
    pub fn index(&mut self, documents: &[String], ids: &[String]) -> Result<(), RetrievalError> {
        validate_corpus(documents, ids)?;

        let vectors = self.embedder.embed_batch(documents, EmbeddingSource::Document)?;

        if let Some(stale) = self.state.take() {
            debug!(stale_vectors = stale.ids.len(), "cleared dense index");
        }

        debug!(
            documents = documents.len(),
            embedder = self.embedder.name(),
            embedder_version = self.embedder.version(),
            dimension = self.embedder.dimension(),
            "built dense index"
        );

        self.state = Some(DenseState {
            ids: ids.to_vec(),
            vectors,
        });
        Ok(())
    }

    /// Cosine similarity of the query against every document, aligned to `ids()`.
    pub fn similarities(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let state = self.state.as_ref().ok_or(RetrievalError::IndexNotBuilt)?;
        let query_emb = self.embedder.embed(query, EmbeddingSource::Query)?;

        Ok(state
            .vectors
            .iter()
            .map(|doc| cosine_similarity(&query_emb.vector, &doc.vector))
            .collect())
    }

    /// Ids of the `k` most similar documents, most similar first.
    pub fn nearest(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let scores: Vec<f64> = self
            .similarities(query)?
            .into_iter()
            .map(f64::from)
            .collect();
        let ids = self.ids();

        Ok(rank_positions(&scores, k)
            .into_iter()
            .map(|i| ids[i].clone())
            .collect())
    }
}
