//! Seam for the natural-language explanation of a score report.
//!
//! An `Explainer` is an external collaborator (typically a hosted language
//! model). Nothing here talks to one; callers plug in their own
//! implementation and `explain_report` wraps it with retries and a fixed
//! fallback so that a failing explainer never loses a scored candidate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::RetryPolicy;
use crate::scoring::{ScoreReport, SubScores};

pub const FALLBACK_STRENGTHS: &str = "Error generating AI analysis.";
pub const FALLBACK_GAPS: &str = "Error generating AI analysis.";
pub const FALLBACK_NOTES: &str = "System error.";

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("explainer unavailable: {0}")]
    Unavailable(String),
    #[error("malformed explanation: {0}")]
    Malformed(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// What an explainer gets to see about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationRequest {
    pub candidate_id: String,
    pub job_summary: String,
    pub resume_summary: String,
    pub final_score: f64,
    #[serde(flatten)]
    pub scores: SubScores,
}

impl ExplanationRequest {
    pub fn from_report(report: &ScoreReport) -> Self {
        Self {
            candidate_id: report.candidate_id.clone(),
            job_summary: report.job_summary.clone(),
            resume_summary: report.resume_summary.clone(),
            final_score: report.final_score,
            scores: report.scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub overall_fit_score: u8,
    pub confidence: Confidence,
    pub strengths: String,
    pub gaps: String,
    pub notes: String,
}

impl Explanation {
    /// Parses an explainer's JSON reply and checks the score range.
    pub fn from_json(raw: &str) -> Result<Self, ExplainError> {
        let explanation: Self = serde_json::from_str(raw)?;
        explanation.validate()?;
        Ok(explanation)
    }

    pub fn validate(&self) -> Result<(), ExplainError> {
        if self.overall_fit_score > 100 {
            return Err(ExplainError::Malformed(format!(
                "overall_fit_score {} is above 100",
                self.overall_fit_score
            )));
        }
        Ok(())
    }
}

pub trait Explainer: Send + Sync {
    fn explain(&self, request: &ExplanationRequest) -> Result<Explanation, ExplainError>;
}

/// A score report with its explanation attached. `confidence` and
/// `overall_fit_score` are absent when the explainer gave up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedReport {
    #[serde(flatten)]
    pub report: ScoreReport,
    pub overall_fit_score: Option<u8>,
    pub confidence: Option<Confidence>,
    pub strengths: String,
    pub gaps: String,
    pub notes: String,
}

impl ExplainedReport {
    pub fn is_fallback(&self) -> bool {
        self.confidence.is_none()
    }
}

pub fn explain_report(
    explainer: &dyn Explainer,
    report: ScoreReport,
    policy: &RetryPolicy,
) -> ExplainedReport {
    let request = ExplanationRequest::from_report(&report);
    let outcome = policy.run(|_| explainer.explain(&request).and_then(|e| e.validate().map(|_| e)));

    match outcome {
        Ok(explanation) => {
            debug!(
                candidate_id = %report.candidate_id,
                confidence = ?explanation.confidence,
                "explanation attached"
            );
            ExplainedReport {
                report,
                overall_fit_score: Some(explanation.overall_fit_score),
                confidence: Some(explanation.confidence),
                strengths: explanation.strengths,
                gaps: explanation.gaps,
                notes: explanation.notes,
            }
        }
        Err(err) => {
            warn!(
                candidate_id = %report.candidate_id,
                attempts = err.attempts,
                error = %err.last_error,
                "explanation failed; using fallback text"
            );
            ExplainedReport {
                report,
                overall_fit_score: None,
                confidence: None,
                strengths: FALLBACK_STRENGTHS.into(),
                gaps: FALLBACK_GAPS.into(),
                notes: FALLBACK_NOTES.into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct FlakyExplainer {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    impl FlakyExplainer {
        fn new(failures_before_success: u32) -> Self {
            Self {
                failures_before_success,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Explainer for FlakyExplainer {
        fn explain(&self, request: &ExplanationRequest) -> Result<Explanation, ExplainError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures_before_success {
                return Err(ExplainError::Unavailable(format!("call {call}")));
            }
            Ok(Explanation {
                overall_fit_score: request.final_score.round() as u8,
                confidence: Confidence::High,
                strengths: "Deep Rust background".into(),
                gaps: "No Kafka".into(),
                notes: "Strong hire".into(),
            })
        }
    }

    fn report() -> ScoreReport {
        ScoreReport {
            candidate_id: "ada.json".into(),
            name: "Ada".into(),
            final_score: 78.0,
            scores: SubScores {
                must_have_score: 100.0,
                important_score: 50.0,
                nice_to_have_score: 0.0,
                experience_score: 100.0,
                recency_score: 100.0,
                domain_score: 100.0,
            },
            job_summary: "Build services".into(),
            resume_summary: "Built services".into(),
        }
    }

    #[test]
    fn attaches_explanation_after_transient_failures() {
        let explainer = FlakyExplainer::new(2);
        let explained = explain_report(&explainer, report(), &RetryPolicy::immediate(3));

        assert!(!explained.is_fallback());
        assert_eq!(explained.overall_fit_score, Some(78));
        assert_eq!(explained.confidence, Some(Confidence::High));
        assert_eq!(explained.strengths, "Deep Rust background");
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn falls_back_but_keeps_report_after_final_failure() {
        let explainer = FlakyExplainer::new(u32::MAX);
        let explained = explain_report(&explainer, report(), &RetryPolicy::immediate(3));

        assert!(explained.is_fallback());
        assert_eq!(explained.report, report());
        assert_eq!(explained.strengths, FALLBACK_STRENGTHS);
        assert_eq!(explained.gaps, FALLBACK_GAPS);
        assert_eq!(explained.notes, FALLBACK_NOTES);
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn parses_explanation_json() {
        let raw = r#"{"overall_fit_score":82,"confidence":"Medium","strengths":"a","gaps":"b","notes":"c"}"#;
        let explanation = Explanation::from_json(raw).unwrap();
        assert_eq!(explanation.overall_fit_score, 82);
        assert_eq!(explanation.confidence, Confidence::Medium);
    }

    #[test]
    fn rejects_out_of_range_or_unknown_confidence() {
        let too_high = r#"{"overall_fit_score":150,"confidence":"High","strengths":"","gaps":"","notes":""}"#;
        assert!(matches!(Explanation::from_json(too_high), Err(ExplainError::Malformed(_))));

        let bad_confidence = r#"{"overall_fit_score":50,"confidence":"Certain","strengths":"","gaps":"","notes":""}"#;
        assert!(matches!(Explanation::from_json(bad_confidence), Err(ExplainError::Json(_))));
    }

    #[test]
    fn explained_report_serializes_flat() {
        let explainer = FlakyExplainer::new(0);
        let explained = explain_report(&explainer, report(), &RetryPolicy::immediate(1));
        let value = serde_json::to_value(&explained).unwrap();

        assert_eq!(value["candidate_id"], "ada.json");
        assert_eq!(value["must_have_score"], 100.0);
        assert_eq!(value["confidence"], "High");
        assert_eq!(value["notes"], "Strong hire");
    }
}
