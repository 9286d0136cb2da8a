//! all-MiniLM-L6-v2 sentence embeddings through fastembed (ONNX Runtime).
//!
//! Requires the `semantic-search` feature. The model is fetched into the
//! fastembed cache on first use.

use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{EmbedError, Embedding, EmbeddingSource, TextEmbedder};

/// Output size of all-MiniLM-L6-v2; not configurable.
pub const MINILM_DIMENSION: usize = 384;

pub struct MiniLmEmbedder {
    model: Mutex<TextEmbedding>,
}

impl MiniLmEmbedder {
    pub fn try_new() -> Result<Self, EmbedError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options).map_err(|err| EmbedError::ModelUnavailable(err.to_string()))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }

    fn infer(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>, EmbedError> {
        let model = self
            .model
            .lock()
            .map_err(|_| EmbedError::Inference("model lock poisoned".into()))?;
        model
            .embed(texts, None)
            .map_err(|err| EmbedError::Inference(err.to_string()))
    }
}

impl TextEmbedder for MiniLmEmbedder {
    fn name(&self) -> &'static str {
        "minilm"
    }

    fn version(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed(&self, text: &str, source: EmbeddingSource) -> Result<Embedding, EmbedError> {
        let vector = self
            .infer(vec![text])?
            .pop()
            .ok_or_else(|| EmbedError::Inference("model returned no vector".into()))?;
        Ok(Embedding { vector, source })
    }

    fn embed_batch(&self, texts: &[String], source: EmbeddingSource) -> Result<Vec<Embedding>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.infer(texts.iter().map(String::as_str).collect())?;
        if vectors.len() != texts.len() {
            return Err(EmbedError::Inference(format!(
                "model returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors
            .into_iter()
            .map(|vector| Embedding { vector, source })
            .collect())
    }
}
