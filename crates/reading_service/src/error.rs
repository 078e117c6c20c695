use reading_core::ValidationError;
use thiserror::Error;

/// Failure reported by a [`ReadingStore`](crate::store::ReadingStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Why a save, edit or delete did not go through.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to persist reading: {0}")]
    Persistence(#[from] StoreError),
}
