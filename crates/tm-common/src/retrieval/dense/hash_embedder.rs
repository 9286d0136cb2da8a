use super::{EmbedError, Embedding, EmbeddingSource, EmbedderConfig, TextEmbedder};
use crate::retrieval::tokenizer::{embedding_features, WeightedToken};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// 固定 seed（決定論的 hash のため）
/// Changing these changes every embedding: bump `version()` when you do.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

/// Deterministic text embedder based on signed feature hashing.
///
/// - no model weights, nothing to download, stable across Rust versions
///   (SipHash-1-3 with fixed keys)
/// - word features carry exact-term signal, character trigrams give partial
///   credit for morphological variants ("develop", "developer")
/// - vectors are L2-normalized, so dot product equals cosine similarity
pub struct HashEmbedder {
    config: EmbedderConfig,
}

impl HashEmbedder {
    pub fn new(config: EmbedderConfig) -> Self {
        let mut cfg = config;
        cfg.dimension = cfg.dimension.max(1);
        Self { config: cfg }
    }

    fn hash_token(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn features_to_embedding(&self, features: &[WeightedToken], source: EmbeddingSource) -> Embedding {
        let dimension = self.config.dimension;
        let mut vector = vec![0.0f32; dimension];

        for feature in features {
            let hash = self.hash_token(&feature.token);
            let idx = (hash % dimension as u64) as usize;
            // The top bit decides the sign so collisions tend to cancel out.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign * feature.weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Embedding { vector, source }
    }
}

impl TextEmbedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        "hash-v1"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn embed(&self, text: &str, source: EmbeddingSource) -> Result<Embedding, EmbedError> {
        Ok(self.features_to_embedding(&embedding_features(text), source))
    }
}
