use crate::application::{SharedSession, StatusSummary};
use crate::domain::configuration::{BackendHealth, ConfigurationRepository};
use crate::domain::shared::RepositoryError;
use std::sync::Arc;
use tracing::{debug, warn};

/// バックエンドの死活確認とセッションの要約
pub struct CheckBackendUseCase {
    repo: Arc<dyn ConfigurationRepository>,
    session: SharedSession,
}

impl CheckBackendUseCase {
    pub fn new(repo: Arc<dyn ConfigurationRepository>, session: SharedSession) -> Self {
        Self { repo, session }
    }

    pub async fn health(&self) -> Result<BackendHealth, RepositoryError> {
        let health = self.repo.check_health().await.inspect_err(|e| {
            warn!(error = %e, "Backend health check failed");
        })?;
        debug!(status = %health.status, "Backend health checked");
        Ok(health)
    }

    pub async fn summary(&self) -> StatusSummary {
        self.session.read().await.summary()
    }
}
