use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lexical tokenizer shared by the sparse index and its queries:
/// drop punctuation, lower-case, split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(text, "")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 重み付きトークン (hash embedding features)
#[derive(Debug, Clone)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Embedding features for a document.
///
/// - `w:<word>`  every lexical token
/// - `c:<tri>`   character trigrams of each token padded with `^`/`$`,
///   so "developer" and "development" still share most of their mass
pub fn embedding_features(text: &str) -> Vec<WeightedToken> {
    let mut features = Vec::new();

    for word in tokenize(text) {
        let padded: Vec<char> = format!("^{word}$").chars().collect();
        for window in padded.windows(3) {
            features.push(WeightedToken::new(
                format!("c:{}", window.iter().collect::<String>()),
                TRIGRAM_WEIGHT,
            ));
        }
        features.push(WeightedToken::new(format!("w:{word}"), WORD_WEIGHT));
    }

    features
}
