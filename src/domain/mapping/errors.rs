use crate::domain::shared::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Invalid button number: {0} (expected 1-6)")]
    InvalidSlot(i64),

    #[error("Invalid button number: {0:?}")]
    UnparsableSlot(String),

    #[error("Invalid color: {0} (expected a preset name or #rrggbb)")]
    InvalidColor(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
