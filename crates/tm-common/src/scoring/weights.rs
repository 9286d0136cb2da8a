use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

const SUM_TOLERANCE: f64 = 1e-6;

/// 既定の重み: skills dominate, then experience, recency, domain.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    must_have_skills: 0.35,
    important_skills: 0.25,
    nice_to_have_skills: 0.10,
    experience_relevance: 0.15,
    recency: 0.10,
    domain_match: 0.05,
};

/// Weights of the six sub-scores in the final score. A valid set is a convex
/// combination: every weight non-negative and the total equal to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringWeights {
    pub must_have_skills: f64,
    pub important_skills: f64,
    pub nice_to_have_skills: f64,
    pub experience_relevance: f64,
    pub recency: f64,
    pub domain_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("must_have_skills", self.must_have_skills),
            ("important_skills", self.important_skills),
            ("nice_to_have_skills", self.nice_to_have_skills),
            ("experience_relevance", self.experience_relevance),
            ("recency", self.recency),
            ("domain_match", self.domain_match),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in self.named() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((DEFAULT_WEIGHTS.sum() - 1.0).abs() < 1e-9);
        assert!(DEFAULT_WEIGHTS.validate().is_ok());
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let weights = ScoringWeights {
            recency: 0.2,
            ..DEFAULT_WEIGHTS
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn negative_weight_is_rejected_even_if_sum_is_one() {
        let weights = ScoringWeights {
            must_have_skills: 0.45,
            domain_match: -0.05,
            ..DEFAULT_WEIGHTS
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("domain_match"), "{err}");
    }

    #[test]
    fn deserializes_named_mapping_and_rejects_unknown_keys() {
        let raw = r#"{
            "must_have_skills": 0.4, "important_skills": 0.2, "nice_to_have_skills": 0.1,
            "experience_relevance": 0.1, "recency": 0.1, "domain_match": 0.1
        }"#;
        let weights: ScoringWeights = serde_json::from_str(raw).unwrap();
        assert!(weights.validate().is_ok());

        let unknown = raw.replace("domain_match", "domain");
        assert!(serde_json::from_str::<ScoringWeights>(&unknown).is_err());
    }
}
