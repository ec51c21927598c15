use super::{BackendHealth, PushOutcome, PushRequest};
use crate::domain::shared::RepositoryError;
use async_trait::async_trait;

/// 設定のデバイス送信 (`/configuration`) とバックエンドの死活確認 (`/health`)
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    async fn push_configuration(&self, request: &PushRequest) -> Result<PushOutcome, RepositoryError>;
    async fn check_health(&self) -> Result<BackendHealth, RepositoryError>;
}
