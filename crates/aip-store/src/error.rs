#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    RecordNotFound(String),
    #[error("recommendation {0} not found")]
    RecommendationNotFound(String),
    #[error("backend unavailable: {0}")]
    Backend(String),
}
