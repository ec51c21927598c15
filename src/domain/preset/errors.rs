use crate::domain::shared::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Preset name is required")]
    EmptyName,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
