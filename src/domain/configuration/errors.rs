use crate::domain::shared::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("You must select a USB port")]
    NoPortSelected,

    #[error("You must map at least one button")]
    NoMappings,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ConfigurationError {
    /// 送信前の確認で止まったか (バックエンドへは何も送っていない)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ConfigurationError::NoPortSelected | ConfigurationError::NoMappings
        )
    }
}
