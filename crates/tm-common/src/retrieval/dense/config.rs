/// Output size of the all-MiniLM sentence model; the hash embedder matches it.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedderConfig {
    /// 埋め込み次元数
    pub dimension: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}
