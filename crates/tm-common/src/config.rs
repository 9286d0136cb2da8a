//! Run configuration read from the environment.
//!
//! | variable                 | default          |
//! |--------------------------|------------------|
//! | `TM_TOP_K_RETRIEVAL`     | 10               |
//! | `TM_SCORING_WEIGHTS`     | built-in weights |
//! | `TM_EMBEDDER`            | `hash`           |
//! | `TM_EMBEDDING_DIMENSION` | 384              |
//!
//! `TM_SCORING_WEIGHTS` is a JSON object with all six named weights.
//! `TM_EMBEDDER` is `hash` or `minilm` (the latter needs the
//! `semantic-search` feature and falls back to `hash` without it).
//! Unset variables take the default; set but invalid variables are errors.

use thiserror::Error;

use crate::retrieval::dense::{EmbedderConfig, DEFAULT_EMBEDDING_DIMENSION};
use crate::scoring::{ScoringWeights, DEFAULT_WEIGHTS};

pub const DEFAULT_TOP_K_RETRIEVAL: usize = 10;
pub const DEFAULT_EMBEDDER: &str = "hash";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid scoring weights: {0}")]
    InvalidWeights(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Per-index retrieval depth before fusion.
    pub top_k_retrieval: usize,
    pub weights: ScoringWeights,
    pub embedder: String,
    pub embedding: EmbedderConfig,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k_retrieval: DEFAULT_TOP_K_RETRIEVAL,
            weights: DEFAULT_WEIGHTS,
            embedder: DEFAULT_EMBEDDER.into(),
            embedding: EmbedderConfig::default(),
        }
    }
}

fn env_value(key: &'static str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_positive(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = env_value(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "must be positive".into(),
        }),
        Err(err) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: err.to_string(),
        }),
    }
}

fn parse_weights(key: &'static str) -> Result<ScoringWeights, ConfigError> {
    let Some(raw) = env_value(key) else {
        return Ok(DEFAULT_WEIGHTS);
    };

    serde_json::from_str(&raw).map_err(|err| ConfigError::InvalidValue {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}

impl MatchingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            top_k_retrieval: parse_positive("TM_TOP_K_RETRIEVAL", DEFAULT_TOP_K_RETRIEVAL)?,
            weights: parse_weights("TM_SCORING_WEIGHTS")?,
            embedder: env_value("TM_EMBEDDER").unwrap_or_else(|| DEFAULT_EMBEDDER.into()),
            embedding: EmbedderConfig {
                dimension: parse_positive("TM_EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k_retrieval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "top_k_retrieval",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }
        self.weights.validate()
    }
}
