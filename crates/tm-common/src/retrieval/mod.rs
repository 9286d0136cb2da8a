//! Hybrid candidate retrieval.
//!
//! The sparse (BM25) and dense (embedding) indexes are queried independently
//! and their top-k id sets are unioned. Union favors recall: a candidate that
//! only matches on keywords, or only on meaning, still reaches the scoring
//! stage, which is where precision is decided.

pub mod dense;
pub mod sparse;
pub mod tokenizer;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, info};

pub use dense::{create_embedder, DenseIndex, EmbedError, EmbedderConfig, HashEmbedder, TextEmbedder};
pub use sparse::{Bm25Index, Bm25Params};
pub use tokenizer::tokenize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("search called before index was built")]
    IndexNotBuilt,
    #[error("corpus has {documents} documents but {ids} ids")]
    LengthMismatch { documents: usize, ids: usize },
    #[error("duplicate candidate id in corpus: {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Embedding(#[from] EmbedError),
}

/// Rejects corpora that would leave the index in an inconsistent state.
/// Runs before either index touches its existing content.
pub(crate) fn validate_corpus(documents: &[String], ids: &[String]) -> Result<(), RetrievalError> {
    if documents.len() != ids.len() {
        return Err(RetrievalError::LengthMismatch {
            documents: documents.len(),
            ids: ids.len(),
        });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(RetrievalError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

/// Positions of the `k` highest scores, best first; ties keep corpus order.
pub(crate) fn rank_positions(scores: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(k.min(scores.len()));
    order
}

/// Owns both indexes for one matching run.
pub struct HybridRetriever {
    sparse: Bm25Index,
    dense: DenseIndex,
}

impl HybridRetriever {
    pub fn new(sparse: Bm25Index, dense: DenseIndex) -> Self {
        Self { sparse, dense }
    }

    pub fn sparse(&self) -> &Bm25Index {
        &self.sparse
    }

    pub fn dense(&self) -> &DenseIndex {
        &self.dense
    }

    pub fn is_built(&self) -> bool {
        self.sparse.is_built() && self.dense.is_built()
    }

    /// Rebuilds both indexes from scratch. An invalid corpus is rejected
    /// before either index is modified. The dense index goes first since
    /// embedding can fail; BM25 cannot once the corpus is valid.
    pub fn index(&mut self, documents: &[String], ids: &[String]) -> Result<(), RetrievalError> {
        validate_corpus(documents, ids)?;

        if documents.is_empty() {
            info!("indexing empty corpus; searches will return no candidates");
        } else {
            info!(documents = documents.len(), "indexing candidate corpus");
        }

        self.dense.index(documents, ids)?;
        self.sparse.index(documents, ids)?;
        Ok(())
    }

    /// Union of the sparse top-k and dense top-k ids. `top_k` is clamped to
    /// the corpus size.
    pub fn search(&self, query: &str, top_k: usize) -> Result<BTreeSet<String>, RetrievalError> {
        if !self.is_built() {
            return Err(RetrievalError::IndexNotBuilt);
        }

        let k = top_k.min(self.sparse.len());
        let sparse_ids = self.sparse.top_k(&tokenize(query), k)?;
        let dense_ids = self.dense.nearest(query, k)?;

        debug!(?sparse_ids, "bm25 hits");
        debug!(?dense_ids, "dense hits");

        let fused: BTreeSet<String> = sparse_ids.into_iter().chain(dense_ids).collect();

        info!(
            top_k = k,
            fused = fused.len(),
            "hybrid retrieval selected candidates for scoring"
        );
        Ok(fused)
    }
}
