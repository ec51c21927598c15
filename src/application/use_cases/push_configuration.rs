use crate::application::ports::{Notifier, failure_notice};
use crate::application::SharedSession;
use crate::domain::configuration::{
    ConfigurationError, ConfigurationRepository, ConnectionStatus, DeviceConfig, PushOutcome,
    check_push_preconditions,
};
use crate::domain::shared::Notice;
use std::sync::Arc;
use tracing::{info, warn};

/// 現在のマッピングをデバイスへ送る
///
/// 送信前にポート選択と割り当ての有無をローカルで確認する。再送はしない。
pub struct PushConfigurationUseCase {
    repo: Arc<dyn ConfigurationRepository>,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
}

impl PushConfigurationUseCase {
    pub fn new(
        repo: Arc<dyn ConfigurationRepository>,
        session: SharedSession,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            session,
            notifier,
        }
    }

    pub async fn execute(&self) -> Result<PushOutcome, ConfigurationError> {
        let request = {
            let session = self.session.read().await;
            check_push_preconditions(session.selected_port(), session.mappings())
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.notifier.notify(Notice::warning(e.to_string()));
                return Err(e);
            }
        };

        info!(port = %request.usb_port, "Sending configuration to device");
        match self.repo.push_configuration(&request).await {
            Ok(outcome) => {
                self.session
                    .write()
                    .await
                    .set_connection(ConnectionStatus::Connected);
                self.notifier.notify(outcome.notice());
                Ok(outcome)
            }
            Err(e) => {
                warn!(port = %request.usb_port, error = %e, "Configuration push failed");
                self.session
                    .write()
                    .await
                    .set_connection(ConnectionStatus::Disconnected);
                self.notifier
                    .notify(failure_notice("Failed to send configuration", &e));
                Err(e.into())
            }
        }
    }

    /// バックエンドがデバイスに送る `set_config` メッセージを組み立てる (送信はしない)
    pub async fn preview(&self) -> DeviceConfig {
        let session = self.session.read().await;
        DeviceConfig::build(session.mappings(), session.commands())
    }
}
