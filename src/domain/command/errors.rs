use crate::domain::shared::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command name is required")]
    EmptyName,

    #[error("Value must be a number between 0 and 65535 (got {0})")]
    ValueOutOfRange(i64),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CommandError {
    /// 入力の修正で解決できるエラーか (バックエンドへは送信されない)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommandError::EmptyName | CommandError::ValueOutOfRange(_)
        )
    }
}
