pub mod recency;
pub mod skills;
pub mod weights;

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;
use crate::records::{ParsedJob, ParsedResume};

pub use recency::score_recency;
pub use skills::score_skill_coverage;
pub use weights::{ScoringWeights, DEFAULT_WEIGHTS};

/// Domain score when the job names no domain: not enough signal either way.
pub const NEUTRAL_DOMAIN_SCORE: f64 = 50.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("candidate {candidate_id} is malformed: {reason}")]
    MalformedRecord {
        candidate_id: String,
        reason: String,
    },
}

/// Experience match, 0–100: proportional below the requirement, capped at
/// 100 once it is met. No requirement is always a full match.
pub fn score_experience(required_years: u32, candidate_years: u32) -> f64 {
    if required_years == 0 {
        return 100.0;
    }
    (f64::from(candidate_years) / f64::from(required_years) * 100.0).min(100.0)
}

/// Binary domain fit: 100 on any case-insensitive keyword overlap, else 0.
/// Jobs without domain keywords get the neutral score.
pub fn score_domain(job_keywords: &[String], candidate_keywords: &[String]) -> f64 {
    if job_keywords.is_empty() {
        return NEUTRAL_DOMAIN_SCORE;
    }

    let job_set: HashSet<String> = job_keywords.iter().map(|k| k.to_lowercase()).collect();
    let overlaps = candidate_keywords
        .iter()
        .any(|k| job_set.contains(&k.to_lowercase()));

    if overlaps {
        100.0
    } else {
        0.0
    }
}

/// The six dimension scores, each in 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub must_have_score: f64,
    pub important_score: f64,
    pub nice_to_have_score: f64,
    pub experience_score: f64,
    pub recency_score: f64,
    pub domain_score: f64,
}

impl SubScores {
    /// Weighted sum, unrounded.
    pub fn weighted_total(&self, weights: &ScoringWeights) -> f64 {
        self.must_have_score * weights.must_have_skills
            + self.important_score * weights.important_skills
            + self.nice_to_have_score * weights.nice_to_have_skills
            + self.experience_score * weights.experience_relevance
            + self.recency_score * weights.recency
            + self.domain_score * weights.domain_match
    }
}

/// One scored candidate. Serializes flat: the sub-scores sit next to
/// `final_score`, which is what the explanation and display layers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub candidate_id: String,
    pub name: String,
    /// Weighted total rounded to two decimals.
    pub final_score: f64,
    #[serde(flatten)]
    pub scores: SubScores,
    pub job_summary: String,
    pub resume_summary: String,
}

/// Two-decimal rounding with ties to even: 0.125 becomes 0.12, not 0.13.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Sorts reports best first; equal scores are ordered by candidate id so the
/// output is stable across runs.
pub fn rank_reports(reports: &mut [ScoreReport]) {
    reports.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}

/// Six-dimension scorer. Holds only the weights and the calendar year used
/// for recency, both fixed at construction, so scoring a candidate is a pure
/// function of the job and that candidate.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
    reference_year: i32,
}

impl ScoringEngine {
    /// Fails unless `weights` is a convex combination (see `ScoringWeights::validate`).
    pub fn new(weights: ScoringWeights) -> Result<Self, ConfigError> {
        Self::with_reference_year(weights, Utc::now().year())
    }

    pub fn with_reference_year(weights: ScoringWeights, reference_year: i32) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self {
            weights,
            reference_year,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn sub_scores(&self, job: &ParsedJob, candidate: &ParsedResume) -> SubScores {
        let tiers = &job.skills;

        SubScores {
            must_have_score: score_skill_coverage(&tiers.must_have, candidate.keywords()),
            important_score: score_skill_coverage(&tiers.important, candidate.keywords()),
            nice_to_have_score: score_skill_coverage(&tiers.nice_to_have, candidate.keywords()),
            experience_score: score_experience(
                job.required_years_experience,
                candidate.total_years_experience,
            ),
            recency_score: score_recency(&candidate.experience, self.reference_year),
            domain_score: score_domain(&job.domain_keywords, &candidate.domain_keywords),
        }
    }

    pub fn score_candidate(
        &self,
        job: &ParsedJob,
        candidate_id: &str,
        candidate: &ParsedResume,
    ) -> Result<ScoreReport, ScoringError> {
        if candidate.name.trim().is_empty() {
            return Err(ScoringError::MalformedRecord {
                candidate_id: candidate_id.to_string(),
                reason: "name is blank".into(),
            });
        }

        let scores = self.sub_scores(job, candidate);
        let final_score = round2(scores.weighted_total(&self.weights).clamp(0.0, 100.0));

        debug!(
            candidate_id,
            name = %candidate.name,
            final_score,
            must_have = scores.must_have_score,
            important = scores.important_score,
            nice_to_have = scores.nice_to_have_score,
            experience = scores.experience_score,
            recency = scores.recency_score,
            domain = scores.domain_score,
            "scored candidate"
        );

        Ok(ScoreReport {
            candidate_id: candidate_id.to_string(),
            name: candidate.name.clone(),
            final_score,
            scores,
            job_summary: job.responsibilities_summary.clone(),
            resume_summary: candidate.full_text_summary.clone(),
        })
    }
}
