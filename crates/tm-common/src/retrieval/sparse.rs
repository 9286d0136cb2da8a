//! Okapi BM25 over the tokenized candidate corpus.

use std::collections::HashMap;

use tracing::debug;

use super::{rank_positions, tokenizer::tokenize, validate_corpus, RetrievalError};

const DEFAULT_K1: f64 = 1.5;
const DEFAULT_B: f64 = 0.75;
/// Floor for terms whose raw idf is negative (present in more than half of
/// the documents), expressed as a fraction of the mean idf.
const DEFAULT_EPSILON: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

#[derive(Debug, Clone)]
struct Bm25State {
    ids: Vec<String>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

/// Sparse (lexical) index. `index` is the only mutation and always replaces
/// the previous state wholesale.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    state: Option<Bm25State>,
}

impl Bm25Index {
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            state: None,
        }
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

    /// Ids in corpus order; `score` output is aligned to this slice.
    pub fn ids(&self) -> &[String] {
        self.state.as_ref().map_or(&[], |s| s.ids.as_slice())
    }

    pub fn index(&mut self, documents: &[String], ids: &[String]) -> Result<(), RetrievalError> {
        validate_corpus(documents, ids)?;

        let mut term_freqs = Vec::with_capacity(documents.len());
        let mut doc_lens = Vec::with_capacity(documents.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let total_len: usize = doc_lens.iter().sum();
        let avg_doc_len = if documents.is_empty() {
            0.0
        } else {
            total_len as f64 / documents.len() as f64
        };

        let idf = self.compute_idf(documents.len(), doc_freq);

        debug!(
            documents = documents.len(),
            vocabulary = idf.len(),
            avg_doc_len,
            "built bm25 index"
        );

        self.state = Some(Bm25State {
            ids: ids.to_vec(),
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
        });
        Ok(())
    }

    fn compute_idf(&self, corpus_size: usize, doc_freq: HashMap<String, usize>) -> HashMap<String, f64> {
        let n = corpus_size as f64;
        let mut idf = HashMap::with_capacity(doc_freq.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();

        for (term, freq) in doc_freq {
            let freq = freq as f64;
            let value = (n - freq + 0.5).ln() - (freq + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }

        if !idf.is_empty() {
            let floor = self.params.epsilon * (idf_sum / idf.len() as f64);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        idf
    }

    /// BM25 score of every indexed document for the query, aligned to `ids()`.
    pub fn score(&self, query_tokens: &[String]) -> Result<Vec<f64>, RetrievalError> {
        let state = self.state.as_ref().ok_or(RetrievalError::IndexNotBuilt)?;
        let Bm25Params { k1, b, .. } = self.params;

        let mut scores = vec![0.0; state.ids.len()];
        for token in query_tokens {
            let Some(&idf) = state.idf.get(token) else {
                continue;
            };

            for (i, freqs) in state.term_freqs.iter().enumerate() {
                let tf = freqs.get(token).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    continue;
                }
                let len_ratio = if state.avg_doc_len > 0.0 {
                    state.doc_lens[i] as f64 / state.avg_doc_len
                } else {
                    0.0
                };
                scores[i] += idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * len_ratio));
            }
        }

        Ok(scores)
    }

    /// Ids of the `k` best-scoring documents, best first.
    pub fn top_k(&self, query_tokens: &[String], k: usize) -> Result<Vec<String>, RetrievalError> {
        let scores = self.score(query_tokens)?;
        let ids = self.ids();
        Ok(rank_positions(&scores, k)
            .into_iter()
            .map(|i| ids[i].clone())
            .collect())
    }
}
