use super::{Command, CommandDraft, CommandId};
use crate::domain::shared::RepositoryError;
use async_trait::async_trait;

/// コマンドレジストリの永続化 (`/commands`)
#[async_trait]
pub trait CommandRepository: Send + Sync {
    async fn list_commands(&self) -> Result<Vec<Command>, RepositoryError>;
    async fn create_command(&self, draft: &CommandDraft) -> Result<Option<Command>, RepositoryError>;
    async fn update_command(&self, id: CommandId, draft: &CommandDraft) -> Result<(), RepositoryError>;
    async fn delete_command(&self, id: CommandId) -> Result<(), RepositoryError>;
}
