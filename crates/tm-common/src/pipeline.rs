//! One matching run: rebuild indexes, fuse retrieval, score, rank.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, info_span, warn};

use crate::config::{ConfigError, MatchingConfig};
use crate::records::{ParsedJob, ParsedResume};
use crate::retrieval::{create_embedder, Bm25Index, DenseIndex, HybridRetriever, RetrievalError};
use crate::run_id;
use crate::scoring::{rank_reports, ScoreReport, ScoringEngine};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("duplicate candidate id: {0}")]
    DuplicateCandidate(String),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Candidate arena for one run, keyed by caller-assigned id.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: BTreeMap<String, ParsedResume>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, candidate: ParsedResume) -> Result<(), PipelineError> {
        let id = id.into();
        if self.candidates.contains_key(&id) {
            return Err(PipelineError::DuplicateCandidate(id));
        }
        self.candidates.insert(id, candidate);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ParsedResume> {
        self.candidates.get(id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParsedResume)> {
        self.candidates.iter()
    }

    /// Retrieval documents (candidate summaries) and their ids, in id order.
    pub fn corpus(&self) -> (Vec<String>, Vec<String>) {
        self.candidates
            .iter()
            .map(|(id, c)| (c.full_text_summary.clone(), id.clone()))
            .unzip()
    }
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub run_id: String,
    /// How many candidates retrieval handed to scoring.
    pub retrieved: usize,
    /// Best first.
    pub reports: Vec<ScoreReport>,
}

pub struct MatchingPipeline {
    retriever: HybridRetriever,
    scorer: ScoringEngine,
    top_k: usize,
}

impl MatchingPipeline {
    pub fn new(retriever: HybridRetriever, scorer: ScoringEngine, top_k: usize) -> Self {
        Self {
            retriever,
            scorer,
            top_k,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let dense = DenseIndex::new(create_embedder(&config.embedder, config.embedding.clone()));
        Ok(Self::new(
            HybridRetriever::new(Bm25Index::default(), dense),
            ScoringEngine::new(config.weights)?,
            config.top_k_retrieval,
        ))
    }

    pub fn scorer(&self) -> &ScoringEngine {
        &self.scorer
    }

    /// Scores the retrieved ids in parallel. Ids absent from `pool` and
    /// candidates that fail to score are logged and left out; order is
    /// unspecified.
    pub fn score_retrieved(
        &self,
        job: &ParsedJob,
        pool: &CandidatePool,
        retrieved: &BTreeSet<String>,
    ) -> Vec<ScoreReport> {
        let scorer = &self.scorer;
        retrieved
            .par_iter()
            .filter_map(|id| {
                let Some(candidate) = pool.get(id) else {
                    warn!(candidate_id = %id, "retrieved candidate missing from pool; skipping");
                    return None;
                };
                match scorer.score_candidate(job, id, candidate) {
                    Ok(report) => Some(report),
                    Err(err) => {
                        warn!(candidate_id = %id, error = %err, "failed to score candidate; skipping");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn run(&mut self, job: &ParsedJob, pool: &CandidatePool) -> Result<MatchOutcome, PipelineError> {
        let run_id = run_id::generate();
        let span = info_span!("match_run", %run_id, job_title = %job.job_title);
        let _enter = span.enter();

        let (documents, ids) = pool.corpus();
        self.retriever.index(&documents, &ids)?;

        if pool.is_empty() {
            info!("no candidates to match");
            return Ok(MatchOutcome {
                run_id,
                retrieved: 0,
                reports: Vec::new(),
            });
        }

        let k = pool.len().min(self.top_k);
        let fused = self.retriever.search(&job.responsibilities_summary, k)?;
        info!(candidates = pool.len(), top_k = k, retrieved = fused.len(), "re-ranking retrieved candidates");

        let mut reports = self.score_retrieved(job, pool, &fused);
        rank_reports(&mut reports);

        info!(
            scored = reports.len(),
            best = reports.first().map(|r| r.final_score),
            "matching run finished"
        );

        Ok(MatchOutcome {
            run_id,
            retrieved: fused.len(),
            reports,
        })
    }
}
