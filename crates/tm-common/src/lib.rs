pub mod config;
pub mod explain;
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod retrieval;
pub mod retry;
pub mod run_id;
pub mod scoring;

pub use config::{ConfigError, MatchingConfig};
pub use explain::{explain_report, ExplainError, ExplainedReport, Explainer, Explanation, ExplanationRequest};
pub use pipeline::{CandidatePool, MatchOutcome, MatchingPipeline, PipelineError};
pub use records::{ExperienceEntry, ParsedJob, ParsedResume, RecordError, SkillCluster};
pub use retrieval::{HybridRetriever, RetrievalError};
pub use retry::{RetryError, RetryPolicy};
pub use scoring::{rank_reports, ScoreReport, ScoringEngine, ScoringError, ScoringWeights};
